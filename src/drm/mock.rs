//! Scripted stand-in for a DRM device node.

use super::DrmFd;
use std::cell::RefCell;
use std::ffi::c_void;
use std::io;

type Handler = Box<dyn FnMut(u32, *mut c_void) -> io::Result<()>>;

pub(crate) struct MockFd {
    requests: RefCell<Vec<u32>>,
    handler: RefCell<Handler>,
}

impl MockFd {
    pub(crate) fn new(handler: impl FnMut(u32, *mut c_void) -> io::Result<()> + 'static) -> Self {
        Self {
            requests: RefCell::new(Vec::new()),
            handler: RefCell::new(Box::new(handler)),
        }
    }

    /// Every request code issued so far, in order.
    pub(crate) fn requests(&self) -> Vec<u32> {
        self.requests.borrow().clone()
    }

    pub(crate) fn call_count(&self, request: u32) -> usize {
        self.requests.borrow().iter().filter(|&&r| r == request).count()
    }
}

impl DrmFd for MockFd {
    unsafe fn raw_ioctl(&self, request: u32, arg: *mut c_void) -> io::Result<()> {
        self.requests.borrow_mut().push(request);
        let mut handler = self.handler.borrow_mut();
        (&mut *handler)(request, arg)
    }
}

pub(crate) fn errno(code: i32) -> io::Error {
    io::Error::from_raw_os_error(code)
}

/// Reinterprets an ioctl argument pointer.
///
/// # Safety
/// `arg` must point to a live `T`.
pub(crate) unsafe fn arg_mut<'a, T>(arg: *mut c_void) -> &'a mut T {
    unsafe { &mut *arg.cast::<T>() }
}
