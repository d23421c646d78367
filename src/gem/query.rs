#![allow(clippy::cast_sign_loss)]

use super::GemDevice;
use crate::drm::DrmFd;
use crate::drm::ioctl::{DRM_I915_QUERY_ENGINE_INFO, DRM_IOCTL_I915_QUERY, QueryArgs, QueryItem};
use crate::error::{GemError, GemResult};
use crate::gem::engine::EngineInfo;
use std::ptr;

impl<F: DrmFd> GemDevice<F> {
    /// A wrapper around `DRM_IOCTL_I915_QUERY` for a single item.
    ///
    /// With `buffer == None` the kernel only reports the size it needs. On success the
    /// returned value is the item length the kernel wrote back, which may be zero.
    ///
    /// # Errors
    /// [`GemError::Io`] if the ioctl itself fails, [`GemError::QueryItem`] if the kernel
    /// rejected the item by returning a negative length.
    pub fn query_flags(
        &self,
        query_id: u64,
        flags: u32,
        buffer: Option<&mut [u8]>,
    ) -> GemResult<usize> {
        let (data_ptr, length) = match buffer {
            Some(buf) => {
                let length =
                    i32::try_from(buf.len()).map_err(|_| GemError::BufferTooLarge(buf.len()))?;
                (buf.as_mut_ptr() as u64, length)
            }
            None => (0, 0),
        };

        let mut item = QueryItem {
            query_id,
            length,
            flags,
            data_ptr,
        };
        let mut args = QueryArgs {
            num_items: 1,
            flags: 0,
            items_ptr: ptr::from_mut(&mut item) as u64,
        };

        unsafe { self.ioctl(DRM_IOCTL_I915_QUERY, &mut args)? };

        if item.length < 0 {
            return Err(GemError::QueryItem {
                query_id,
                status: item.length,
            });
        }
        Ok(item.length as usize)
    }

    /// [`Self::query_flags`] without flags.
    pub fn query(&self, query_id: u64, buffer: Option<&mut [u8]>) -> GemResult<usize> {
        self.query_flags(query_id, 0, buffer)
    }

    /// Queries `query_id`, allocating a buffer of exactly the size the kernel asks for.
    ///
    /// An empty `Vec` is a valid, empty answer.
    ///
    /// # Errors
    /// Fails if either query call fails, if the buffer cannot be allocated, or with
    /// [`GemError::QueryLengthMismatch`] if the kernel fills a different length than it
    /// first reported.
    pub fn query_alloc(&self, query_id: u64) -> GemResult<Vec<u8>> {
        let expected = self.query(query_id, None)?;

        let mut data = Vec::new();
        data.try_reserve_exact(expected)
            .map_err(|_| GemError::OutOfMemory)?;
        data.resize(expected, 0);

        let actual = self.query(query_id, Some(data.as_mut_slice())).inspect_err(|e| {
            log::error!("query {query_id:#x} failed after reporting {expected} bytes: {e}");
        })?;
        if actual != expected {
            log::error!("query {query_id:#x} reported {expected} bytes but filled {actual}");
            return Err(GemError::QueryLengthMismatch {
                query_id,
                expected,
                actual,
            });
        }

        Ok(data)
    }

    /// Fetches and decodes the engine list of the device.
    pub fn query_engine_info(&self) -> GemResult<EngineInfo> {
        let data = self.query_alloc(DRM_I915_QUERY_ENGINE_INFO)?;
        EngineInfo::parse(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drm::ioctl::{DRM_I915_QUERY_MEMORY_REGIONS, I915_ENGINE_CLASS_RENDER};
    use crate::drm::mock::{MockFd, arg_mut, errno};
    use crate::gem::engine::{EngineClass, encode_engine_info};
    use std::ffi::c_void;
    use std::io;

    const PAYLOAD: &[u8] = b"simulated query payload";

    /// The query item behind a `DRM_IOCTL_I915_QUERY` argument.
    unsafe fn item<'a>(arg: *mut c_void) -> &'a mut QueryItem {
        let args = unsafe { arg_mut::<QueryArgs>(arg) };
        assert_eq!(args.num_items, 1);
        unsafe { &mut *(args.items_ptr as *mut QueryItem) }
    }

    /// Reports `payload.len()` on a size probe and copies `payload` otherwise.
    fn backend(payload: Vec<u8>) -> impl FnMut(u32, *mut c_void) -> io::Result<()> {
        move |request, arg| {
            assert_eq!(request, DRM_IOCTL_I915_QUERY);
            let item = unsafe { item(arg) };
            if item.length == 0 {
                item.length = payload.len() as i32;
                return Ok(());
            }
            assert_eq!(item.length as usize, payload.len());
            unsafe {
                ptr::copy_nonoverlapping(payload.as_ptr(), item.data_ptr as *mut u8, payload.len());
            }
            Ok(())
        }
    }

    #[test]
    fn size_probe_passes_null_buffer() {
        let dev = GemDevice::new(MockFd::new(|_, arg| {
            let item = unsafe { item(arg) };
            assert_eq!(item.data_ptr, 0);
            assert_eq!(item.query_id, DRM_I915_QUERY_MEMORY_REGIONS);
            assert_eq!(item.flags, 3);
            item.length = 64;
            Ok(())
        }));

        assert_eq!(
            dev.query_flags(DRM_I915_QUERY_MEMORY_REGIONS, 3, None).unwrap(),
            64
        );
    }

    #[test]
    fn alloc_fetches_exactly_the_reported_size() {
        let dev = GemDevice::new(MockFd::new(backend(PAYLOAD.to_vec())));

        let data = dev.query_alloc(DRM_I915_QUERY_MEMORY_REGIONS).unwrap();
        assert_eq!(data, PAYLOAD);
        assert_eq!(dev.fd().call_count(DRM_IOCTL_I915_QUERY), 2);
    }

    #[test]
    fn alloc_of_empty_result_succeeds() {
        let dev = GemDevice::new(MockFd::new(|_, arg| {
            unsafe { item(arg) }.length = 0;
            Ok(())
        }));

        let data = dev.query_alloc(DRM_I915_QUERY_MEMORY_REGIONS).unwrap();
        assert!(data.is_empty());
    }

    #[test]
    fn failed_size_probe_aborts_alloc() {
        let dev = GemDevice::new(MockFd::new(|_, _| Err(errno(libc::ENODEV))));

        let err = dev.query_alloc(DRM_I915_QUERY_MEMORY_REGIONS).unwrap_err();
        assert!(matches!(err, GemError::Io(_)));
        assert_eq!(err.errno(), -libc::ENODEV);
        assert_eq!(dev.fd().requests().len(), 1);
    }

    #[test]
    fn negative_item_length_is_an_item_failure() {
        let dev = GemDevice::new(MockFd::new(|_, arg| {
            let item = unsafe { item(arg) };
            item.length = if item.length == 0 { 16 } else { -libc::EINVAL };
            Ok(())
        }));

        let mut buf = [0u8; 16];
        let err = dev
            .query(DRM_I915_QUERY_MEMORY_REGIONS, Some(&mut buf[..]))
            .unwrap_err();
        assert!(matches!(
            err,
            GemError::QueryItem { status, .. } if status == -libc::EINVAL
        ));
        assert_eq!(err.errno(), -libc::EINVAL);

        assert!(dev.query_alloc(DRM_I915_QUERY_MEMORY_REGIONS).is_err());
    }

    #[test]
    fn length_change_between_calls_is_a_hard_error() {
        let dev = GemDevice::new(MockFd::new(|_, arg| {
            let item = unsafe { item(arg) };
            item.length = if item.length == 0 { 32 } else { 8 };
            Ok(())
        }));

        assert!(matches!(
            dev.query_alloc(DRM_I915_QUERY_MEMORY_REGIONS),
            Err(GemError::QueryLengthMismatch {
                expected: 32,
                actual: 8,
                ..
            })
        ));
    }

    #[test]
    fn interrupted_query_is_retried() {
        let mut interrupted = false;
        let dev = GemDevice::new(MockFd::new(move |_, arg| {
            if !interrupted {
                interrupted = true;
                return Err(errno(libc::EINTR));
            }
            unsafe { item(arg) }.length = 4;
            Ok(())
        }));

        assert_eq!(dev.query(DRM_I915_QUERY_MEMORY_REGIONS, None).unwrap(), 4);
        assert_eq!(dev.fd().requests().len(), 2);
    }

    #[test]
    fn engine_info_is_decoded() {
        let payload = encode_engine_info(&[(I915_ENGINE_CLASS_RENDER, 0)]);
        let dev = GemDevice::new(MockFd::new(backend(payload)));

        let info = dev.query_engine_info().unwrap();
        assert_eq!(info.count(EngineClass::Render), 1);
    }
}
