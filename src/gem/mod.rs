pub mod address;
pub mod context;
pub mod engine;
pub mod extension;
pub mod probe;
pub mod query;

use crate::drm::DrmFd;
use crate::drm::device;
use std::io;

pub use context::ContextCreateFlags;

/// i915 GEM operations on a caller-owned DRM device handle.
///
/// `GemDevice` holds no state beyond the handle, so it is `Send`/`Sync` exactly when
/// the handle is. Wrapping a `BorrowedFd<'fd>` ties its lifetime to the open handle.
#[derive(Debug, Clone, Copy)]
pub struct GemDevice<F> {
    fd: F,
}

impl<F: DrmFd> GemDevice<F> {
    pub const fn new(fd: F) -> Self {
        Self { fd }
    }

    /// The underlying device handle.
    pub const fn fd(&self) -> &F {
        &self.fd
    }

    /// Gives the handle back to the caller.
    pub fn into_inner(self) -> F {
        self.fd
    }

    /// # Safety
    /// `arg` must be the argument structure `request` was encoded for, and every
    /// user pointer inside it must stay valid for the call.
    unsafe fn ioctl<T>(&self, request: u32, arg: &mut T) -> io::Result<()> {
        unsafe { device::ioctl(&self.fd, request, arg) }
    }
}
