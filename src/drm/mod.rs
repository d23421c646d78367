pub mod device;
pub mod ioctl;

#[cfg(test)]
pub(crate) mod mock;

pub use device::DrmFd;
