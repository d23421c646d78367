use super::GemDevice;
use crate::drm::DrmFd;
use crate::drm::ioctl::{
    ContextCreateArgs, ContextCreateExtArgs, ContextCreateExtSetparam, ContextDestroyArgs,
    ContextParam, ContextParamEnginesHeader, DRM_IOCTL_I915_GEM_CONTEXT_CREATE,
    DRM_IOCTL_I915_GEM_CONTEXT_CREATE_EXT, DRM_IOCTL_I915_GEM_CONTEXT_DESTROY,
    DRM_IOCTL_I915_GEM_CONTEXT_GETPARAM, DRM_IOCTL_I915_GEM_CONTEXT_SETPARAM,
    EngineClassInstance, I915_CONTEXT_CREATE_EXT_SETPARAM,
    I915_CONTEXT_CREATE_FLAGS_USE_EXTENSIONS, I915_CONTEXT_PARAM_ENGINES,
    I915_CONTEXT_PARAM_PROTECTED_CONTENT, I915_CONTEXT_PARAM_RECOVERABLE,
};
use crate::error::{GemError, GemResult};
use crate::gem::engine::{EngineClass, EngineInfo};
use crate::gem::extension::ExtensionChain;
use bitflags::bitflags;
use std::mem::size_of;
use std::slice;

bitflags! {
    /// Optional properties requested at context creation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ContextCreateFlags: u32 {
        /// The kernel may recover the context after a GPU hang instead of banning it.
        const RECOVERABLE = 1 << 0;
        /// The context may access protected (PXP) content.
        const PROTECTED = 1 << 1;
    }
}

// ===============================================================================================
// Engine Map
// ===============================================================================================

/// An `i915_context_param_engines` value: a fixed header followed by one
/// class/instance pair per engine slot.
///
/// The index of an entry is the engine index used later at execbuf time.
#[derive(Debug, Clone)]
pub struct EngineMap {
    // u64 storage keeps the header 8-byte aligned.
    words: Vec<u64>,
    len: usize,
}

impl EngineMap {
    const HEADER_SIZE: usize = size_of::<ContextParamEnginesHeader>();
    const ENTRY_SIZE: usize = size_of::<EngineClassInstance>();

    #[must_use]
    pub fn new(engines: &[EngineClassInstance]) -> Self {
        let bytes = Self::HEADER_SIZE + engines.len() * Self::ENTRY_SIZE;
        let mut words = vec![0u64; bytes.div_ceil(size_of::<u64>())];
        let entries = unsafe { words.as_mut_ptr().add(1).cast::<EngineClassInstance>() };
        for (i, engine) in engines.iter().enumerate() {
            unsafe { entries.add(i).write(*engine) };
        }

        Self {
            words,
            len: engines.len(),
        }
    }

    /// Builds the map for `classes`, in that order.
    ///
    /// Repeated classes cycle through the instances `info` reports for them.
    ///
    /// # Errors
    /// [`GemError::EngineUnavailable`] if `info` has no engine of a requested class.
    pub fn for_classes(info: &EngineInfo, classes: &[EngineClass]) -> GemResult<Self> {
        let mut used = [0usize; EngineClass::ALL.len()];
        let mut engines = Vec::with_capacity(classes.len());

        for &class in classes {
            let available = info.count(class);
            if available == 0 {
                return Err(GemError::EngineUnavailable(class));
            }

            let next = &mut used[usize::from(class.raw())];
            let instance = info
                .instances(class)
                .nth(*next)
                .ok_or(GemError::EngineUnavailable(class))?
                .instance;
            *next = (*next + 1) % available;

            engines.push(EngineClassInstance {
                engine_class: class.raw(),
                engine_instance: instance,
            });
        }

        Ok(Self::new(&engines))
    }

    #[must_use]
    pub fn engines(&self) -> &[EngineClassInstance] {
        unsafe {
            slice::from_raw_parts(
                self.words.as_ptr().add(1).cast::<EngineClassInstance>(),
                self.len,
            )
        }
    }

    /// Size in bytes the kernel reads, header included.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        Self::HEADER_SIZE + self.len * Self::ENTRY_SIZE
    }

    fn user_ptr(&self) -> u64 {
        self.words.as_ptr() as u64
    }
}

fn setparam(param: u64, size: u32, value: u64) -> ContextCreateExtSetparam {
    ContextCreateExtSetparam {
        param: ContextParam {
            ctx_id: 0,
            size,
            param,
            value,
        },
        ..Default::default()
    }
}

// ===============================================================================================
// Context Lifecycle
// ===============================================================================================

impl<F: DrmFd> GemDevice<F> {
    /// Create a context with default parameters.
    pub fn create_context(&self) -> GemResult<u32> {
        let mut args = ContextCreateArgs::default();
        unsafe { self.ioctl(DRM_IOCTL_I915_GEM_CONTEXT_CREATE, &mut args)? };
        log::debug!("created context {}", args.ctx_id);
        Ok(args.ctx_id)
    }

    /// Create a context whose engine map holds one engine per entry of `classes`.
    ///
    /// # Errors
    /// Fails before any ioctl if `info` lacks one of the requested classes.
    pub fn create_context_engines(
        &self,
        info: &EngineInfo,
        classes: &[EngineClass],
    ) -> GemResult<u32> {
        let map = EngineMap::for_classes(info, classes)?;
        let size = u32::try_from(map.size_bytes())
            .map_err(|_| GemError::BufferTooLarge(map.size_bytes()))?;
        let mut set_engines = setparam(I915_CONTEXT_PARAM_ENGINES, size, map.user_ptr());

        let mut create = ContextCreateExtArgs {
            flags: I915_CONTEXT_CREATE_FLAGS_USE_EXTENSIONS,
            ..Default::default()
        };
        ExtensionChain::new(&mut create.extensions)
            .push(I915_CONTEXT_CREATE_EXT_SETPARAM, &mut set_engines);

        self.create_context_with_extensions(&mut create)
    }

    /// Create a context with the given [`ContextCreateFlags`].
    ///
    /// Recoverability is always set explicitly since the kernel default is recoverable
    /// and protected contexts must not be.
    ///
    /// # Errors
    /// [`GemError::ProtectedContextUnsupported`] without creating anything if
    /// `PROTECTED` is requested on a device without protected content support.
    pub fn create_context_ext(&self, flags: ContextCreateFlags) -> GemResult<u32> {
        let protected = flags.contains(ContextCreateFlags::PROTECTED);
        if protected && !self.probe_protected_context()? {
            return Err(GemError::ProtectedContextUnsupported);
        }

        let mut recoverable_param = setparam(
            I915_CONTEXT_PARAM_RECOVERABLE,
            0,
            u64::from(flags.contains(ContextCreateFlags::RECOVERABLE)),
        );
        let mut protected_param = setparam(I915_CONTEXT_PARAM_PROTECTED_CONTENT, 0, 1);

        let mut create = ContextCreateExtArgs {
            flags: I915_CONTEXT_CREATE_FLAGS_USE_EXTENSIONS,
            ..Default::default()
        };
        let mut chain = ExtensionChain::new(&mut create.extensions);
        chain.push(I915_CONTEXT_CREATE_EXT_SETPARAM, &mut recoverable_param);
        if protected {
            chain.push(I915_CONTEXT_CREATE_EXT_SETPARAM, &mut protected_param);
        }

        self.create_context_with_extensions(&mut create)
    }

    /// Every record linked from `create.extensions` must outlive this call.
    fn create_context_with_extensions(&self, create: &mut ContextCreateExtArgs) -> GemResult<u32> {
        unsafe { self.ioctl(DRM_IOCTL_I915_GEM_CONTEXT_CREATE_EXT, create)? };
        log::debug!("created context {} with extensions", create.ctx_id);
        Ok(create.ctx_id)
    }

    /// Destroy a context. `ctx_id` must not be used again afterwards.
    pub fn destroy_context(&self, ctx_id: u32) -> GemResult<()> {
        let mut args = ContextDestroyArgs { ctx_id, pad: 0 };
        unsafe { self.ioctl(DRM_IOCTL_I915_GEM_CONTEXT_DESTROY, &mut args)? };
        log::debug!("destroyed context {ctx_id}");
        Ok(())
    }

    pub fn set_context_param(&self, ctx_id: u32, param: u64, value: u64) -> GemResult<()> {
        let mut args = ContextParam {
            ctx_id,
            size: 0,
            param,
            value,
        };
        unsafe { self.ioctl(DRM_IOCTL_I915_GEM_CONTEXT_SETPARAM, &mut args)? };
        Ok(())
    }

    pub fn get_context_param(&self, ctx_id: u32, param: u64) -> GemResult<u64> {
        let mut args = ContextParam {
            ctx_id,
            size: 0,
            param,
            value: 0,
        };
        unsafe { self.ioctl(DRM_IOCTL_I915_GEM_CONTEXT_GETPARAM, &mut args)? };
        Ok(args.value)
    }
}
