#![allow(clippy::used_underscore_items, clippy::cast_possible_truncation)]

const _IOC_NRBITS: u32 = 8;
const _IOC_TYPEBITS: u32 = 8;
const _IOC_SIZEBITS: u32 = 14;

const _IOC_NRSHIFT: u32 = 0;
const _IOC_TYPESHIFT: u32 = _IOC_NRSHIFT + _IOC_NRBITS;
const _IOC_SIZESHIFT: u32 = _IOC_TYPESHIFT + _IOC_TYPEBITS;
const _IOC_DIRSHIFT: u32 = _IOC_SIZESHIFT + _IOC_SIZEBITS;

const _IOC_WRITE: u32 = 1;
const _IOC_READ: u32 = 2;

/// `'d'`, the ioctl type shared by every DRM driver.
pub const DRM_IOCTL_BASE: u32 = 0x64;
/// First request number reserved for driver-private ioctls.
pub const DRM_COMMAND_BASE: u32 = 0x40;

#[must_use]
pub const fn _ioc(dir: u32, type_: u32, nr: u32, size: usize) -> u32 {
    (dir << _IOC_DIRSHIFT)
        | (type_ << _IOC_TYPESHIFT)
        | (nr << _IOC_NRSHIFT)
        | ((size as u32) << _IOC_SIZESHIFT)
}

#[must_use]
pub const fn iow<T>(type_: u32, nr: u32) -> u32 {
    _ioc(_IOC_WRITE, type_, nr, std::mem::size_of::<T>())
}

#[must_use]
pub const fn iowr<T>(type_: u32, nr: u32) -> u32 {
    _ioc(_IOC_READ | _IOC_WRITE, type_, nr, std::mem::size_of::<T>())
}

/// `DRM_IOW` for a core DRM request number.
#[must_use]
pub const fn drm_iow<T>(nr: u32) -> u32 {
    iow::<T>(DRM_IOCTL_BASE, nr)
}

/// `DRM_IOWR` for a core DRM request number.
#[must_use]
pub const fn drm_iowr<T>(nr: u32) -> u32 {
    iowr::<T>(DRM_IOCTL_BASE, nr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    struct Sixteen([u64; 2]);

    #[test]
    fn encodes_read_write_requests() {
        // DRM_IOWR(0x79, 16-byte struct) as produced by the C macros.
        assert_eq!(drm_iowr::<Sixteen>(DRM_COMMAND_BASE + 0x39), 0xC010_6479);
        assert_eq!(drm_iow::<u64>(DRM_COMMAND_BASE + 0x2e), 0x4008_646E);
    }
}
