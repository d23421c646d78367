use std::ffi::c_void;
use std::fs::File;
use std::io;
use std::os::fd::{AsRawFd, BorrowedFd, OwnedFd, RawFd};
use std::ptr;

/// An open DRM device node the ioctl layer can talk to.
///
/// The crate never opens or closes the underlying handle. Whether a handle may be
/// shared between threads is a property of the kernel driver behind it; the i915
/// driver serializes internally, so sharing a render node is fine.
pub trait DrmFd {
    /// Issues exactly one ioctl, without any retry.
    ///
    /// # Safety
    /// `arg` must point to live memory laid out as `request` expects, including any
    /// user pointers embedded in it.
    unsafe fn raw_ioctl(&self, request: u32, arg: *mut c_void) -> io::Result<()>;
}

unsafe fn libc_ioctl(fd: RawFd, request: u32, arg: *mut c_void) -> io::Result<()> {
    let ret = unsafe { libc::ioctl(fd, request as _, arg) };
    if ret < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

impl DrmFd for BorrowedFd<'_> {
    unsafe fn raw_ioctl(&self, request: u32, arg: *mut c_void) -> io::Result<()> {
        unsafe { libc_ioctl(self.as_raw_fd(), request, arg) }
    }
}

impl DrmFd for OwnedFd {
    unsafe fn raw_ioctl(&self, request: u32, arg: *mut c_void) -> io::Result<()> {
        unsafe { libc_ioctl(self.as_raw_fd(), request, arg) }
    }
}

impl DrmFd for File {
    unsafe fn raw_ioctl(&self, request: u32, arg: *mut c_void) -> io::Result<()> {
        unsafe { libc_ioctl(self.as_raw_fd(), request, arg) }
    }
}

impl<T: DrmFd + ?Sized> DrmFd for &T {
    unsafe fn raw_ioctl(&self, request: u32, arg: *mut c_void) -> io::Result<()> {
        unsafe { (**self).raw_ioctl(request, arg) }
    }
}

/// Issues an ioctl, restarting it while it is interrupted (`EINTR`) or the driver
/// asks to try again (`EAGAIN`).
///
/// Every ioctl in the crate goes through here.
///
/// # Safety
/// `T` must be the argument structure `request` was encoded for.
pub unsafe fn ioctl<F: DrmFd + ?Sized, T>(fd: &F, request: u32, arg: &mut T) -> io::Result<()> {
    let arg = ptr::from_mut(arg).cast::<c_void>();
    loop {
        match unsafe { fd.raw_ioctl(request, arg) } {
            Err(e) if matches!(e.raw_os_error(), Some(libc::EINTR | libc::EAGAIN)) => {}
            result => return result,
        }
    }
}
