use super::GemDevice;
use crate::drm::DrmFd;
use crate::drm::ioctl::{
    DRM_IOCTL_I915_GETPARAM, DRM_IOCTL_I915_REG_READ, DRM_IOCTL_SYNCOBJ_CREATE,
    DRM_IOCTL_SYNCOBJ_DESTROY, DRM_IOCTL_SYNCOBJ_WAIT, DRM_SYNCOBJ_WAIT_FLAGS_WAIT_FOR_SUBMIT,
    GetParamArgs, I915_PARAM_PXP_STATUS, I915_REG_READ_8B_WA, RCS_TIMESTAMP, RegReadArgs,
    SyncobjCreateArgs, SyncobjDestroyArgs, SyncobjWaitArgs,
};
use crate::error::GemResult;
use std::ptr;

impl<F: DrmFd> GemDevice<F> {
    /// Read a device-wide `I915_PARAM_*` value.
    pub fn get_param(&self, param: i32) -> GemResult<i32> {
        let mut value = 0i32;
        let mut args = GetParamArgs {
            param,
            value: &raw mut value,
        };
        unsafe { self.ioctl(DRM_IOCTL_I915_GETPARAM, &mut args)? };
        Ok(value)
    }

    /// Whether `DRM_IOCTL_SYNCOBJ_WAIT` exists and understands `WAIT_FOR_SUBMIT`.
    pub fn supports_syncobj_wait(&self) -> bool {
        let mut create = SyncobjCreateArgs::default();
        if let Err(e) = unsafe { self.ioctl(DRM_IOCTL_SYNCOBJ_CREATE, &mut create) } {
            log::debug!("syncobj creation unavailable: {e}");
            return false;
        }

        let handle = create.handle;
        let mut wait = SyncobjWaitArgs {
            handles: ptr::from_ref(&handle) as u64,
            timeout_nsec: 0,
            count_handles: 1,
            flags: DRM_SYNCOBJ_WAIT_FLAGS_WAIT_FOR_SUBMIT,
            ..Default::default()
        };
        let waited = unsafe { self.ioctl(DRM_IOCTL_SYNCOBJ_WAIT, &mut wait) };

        let mut destroy = SyncobjDestroyArgs { handle, pad: 0 };
        if let Err(e) = unsafe { self.ioctl(DRM_IOCTL_SYNCOBJ_DESTROY, &mut destroy) } {
            log::warn!("failed to destroy probe syncobj {handle}: {e}");
        }

        // An unsignaled syncobj with no fence can only time out.
        matches!(waited, Err(e) if e.raw_os_error() == Some(libc::ETIME))
    }

    /// Whether protected (PXP) contexts can be created, from `I915_PARAM_PXP_STATUS`.
    ///
    /// "Not supported" answers from the kernel are `Ok(false)`.
    ///
    /// # Errors
    /// Any other failure of the parameter read.
    pub fn probe_protected_context(&self) -> GemResult<bool> {
        match self.get_param(I915_PARAM_PXP_STATUS) {
            // 1: ready, 2: will be ready once firmware init completes.
            Ok(status) => Ok(status > 0),
            Err(e) if e.is_not_supported() => {
                log::debug!("protected content unsupported: {e}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub fn supports_protected_context(&self) -> bool {
        self.probe_protected_context().unwrap_or_else(|e| {
            log::warn!("protected content probe failed: {e}");
            false
        })
    }

    /// Read the 64-bit render engine timestamp register.
    pub fn read_render_timestamp(&self) -> GemResult<u64> {
        let mut args = RegReadArgs {
            offset: RCS_TIMESTAMP | I915_REG_READ_8B_WA,
            val: 0,
        };
        unsafe { self.ioctl(DRM_IOCTL_I915_REG_READ, &mut args)? };
        Ok(args.val)
    }
}
