use crate::utils::{DRM_COMMAND_BASE, drm_iow, drm_iowr};
use static_assertions::const_assert_eq;
use std::mem::size_of;

// ===============================================================================================
// Generic Parameters
// ===============================================================================================

pub const I915_PARAM_PXP_STATUS: i32 = 58;

/// `drm_i915_getparam_t`. `value` is a user pointer the kernel writes through.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GetParamArgs {
    pub param: i32,
    pub value: *mut i32,
}

// ===============================================================================================
// Query
// ===============================================================================================

pub const DRM_I915_QUERY_TOPOLOGY_INFO: u64 = 1;
pub const DRM_I915_QUERY_ENGINE_INFO: u64 = 2;
pub const DRM_I915_QUERY_PERF_CONFIG: u64 = 3;
pub const DRM_I915_QUERY_MEMORY_REGIONS: u64 = 4;
pub const DRM_I915_QUERY_HWCONFIG_BLOB: u64 = 5;
pub const DRM_I915_QUERY_GEOMETRY_SUBSLICES: u64 = 6;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct QueryItem {
    pub query_id: u64,
    /// Buffer size on input; required or written size on output, negative on error.
    pub length: i32,
    pub flags: u32,
    pub data_ptr: u64,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct QueryArgs {
    pub num_items: u32,
    pub flags: u32,
    pub items_ptr: u64,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct EngineClassInstance {
    pub engine_class: u16,
    pub engine_instance: u16,
}

pub const I915_ENGINE_CLASS_RENDER: u16 = 0;
pub const I915_ENGINE_CLASS_COPY: u16 = 1;
pub const I915_ENGINE_CLASS_VIDEO: u16 = 2;
pub const I915_ENGINE_CLASS_VIDEO_ENHANCE: u16 = 3;
pub const I915_ENGINE_CLASS_COMPUTE: u16 = 4;
pub const I915_ENGINE_CLASS_INVALID: u16 = u16::MAX;

pub const I915_ENGINE_INFO_HAS_LOGICAL_INSTANCE: u64 = 1 << 0;

/// Header of the `DRM_I915_QUERY_ENGINE_INFO` payload, followed by `num_engines`
/// [`EngineInfoEntry`] records.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct QueryEngineInfoHeader {
    pub num_engines: u32,
    pub rsvd: [u32; 3],
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct EngineInfoEntry {
    pub engine: EngineClassInstance,
    pub rsvd0: u32,
    pub flags: u64,
    pub capabilities: u64,
    pub logical_instance: u16,
    pub rsvd1: [u16; 3],
    pub rsvd2: [u64; 3],
}

// ===============================================================================================
// User Extensions
// ===============================================================================================

/// Common head of every chainable extension record (`struct i915_user_extension`).
#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct UserExtensionBase {
    pub next_extension: u64,
    pub name: u32,
    pub flags: u32,
    pub rsvd: [u32; 4],
}

// ===============================================================================================
// Contexts
// ===============================================================================================

pub const I915_CONTEXT_CREATE_FLAGS_USE_EXTENSIONS: u32 = 1 << 0;
pub const I915_CONTEXT_CREATE_EXT_SETPARAM: u32 = 0;

pub const I915_CONTEXT_PARAM_BAN_PERIOD: u64 = 0x1;
pub const I915_CONTEXT_PARAM_NO_ZEROMAP: u64 = 0x2;
pub const I915_CONTEXT_PARAM_GTT_SIZE: u64 = 0x3;
pub const I915_CONTEXT_PARAM_NO_ERROR_CAPTURE: u64 = 0x4;
pub const I915_CONTEXT_PARAM_BANNABLE: u64 = 0x5;
pub const I915_CONTEXT_PARAM_PRIORITY: u64 = 0x6;
pub const I915_CONTEXT_PARAM_SSEU: u64 = 0x7;
pub const I915_CONTEXT_PARAM_RECOVERABLE: u64 = 0x8;
pub const I915_CONTEXT_PARAM_VM: u64 = 0x9;
pub const I915_CONTEXT_PARAM_ENGINES: u64 = 0xa;
pub const I915_CONTEXT_PARAM_PERSISTENCE: u64 = 0xb;
pub const I915_CONTEXT_PARAM_RINGSIZE: u64 = 0xc;
pub const I915_CONTEXT_PARAM_PROTECTED_CONTENT: u64 = 0xd;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct ContextCreateArgs {
    pub ctx_id: u32,
    pub pad: u32,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct ContextCreateExtArgs {
    pub ctx_id: u32,
    pub flags: u32,
    pub extensions: u64,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct ContextDestroyArgs {
    pub ctx_id: u32,
    pub pad: u32,
}

/// `struct drm_i915_gem_context_param`, shared by get/set and by the setparam extension.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct ContextParam {
    pub ctx_id: u32,
    pub size: u32,
    pub param: u64,
    pub value: u64,
}

/// `struct drm_i915_gem_context_create_ext_setparam`.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct ContextCreateExtSetparam {
    pub base: UserExtensionBase,
    pub param: ContextParam,
}

/// Fixed head of `struct i915_context_param_engines`; the engine entries follow it.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct ContextParamEnginesHeader {
    pub extensions: u64,
}

// ===============================================================================================
// Register Read
// ===============================================================================================

pub const RCS_TIMESTAMP: u64 = 0x2358;
pub const I915_REG_READ_8B_WA: u64 = 1 << 0;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct RegReadArgs {
    pub offset: u64,
    pub val: u64,
}

// ===============================================================================================
// Sync Objects (core DRM)
// ===============================================================================================

pub const DRM_SYNCOBJ_WAIT_FLAGS_WAIT_ALL: u32 = 1 << 0;
pub const DRM_SYNCOBJ_WAIT_FLAGS_WAIT_FOR_SUBMIT: u32 = 1 << 1;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SyncobjCreateArgs {
    pub handle: u32,
    pub flags: u32,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SyncobjDestroyArgs {
    pub handle: u32,
    pub pad: u32,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone)]
pub struct SyncobjWaitArgs {
    pub handles: u64,
    pub timeout_nsec: i64,
    pub count_handles: u32,
    pub flags: u32,
    pub first_signaled: u32,
    pub pad: u32,
}

// ===============================================================================================
// ABI Layout
// ===============================================================================================

const_assert_eq!(size_of::<QueryItem>(), 24);
const_assert_eq!(size_of::<QueryArgs>(), 16);
const_assert_eq!(size_of::<EngineClassInstance>(), 4);
const_assert_eq!(size_of::<QueryEngineInfoHeader>(), 16);
const_assert_eq!(size_of::<EngineInfoEntry>(), 56);
const_assert_eq!(size_of::<UserExtensionBase>(), 32);
const_assert_eq!(size_of::<ContextCreateExtArgs>(), 16);
const_assert_eq!(size_of::<ContextParam>(), 24);
const_assert_eq!(size_of::<ContextCreateExtSetparam>(), 56);
const_assert_eq!(size_of::<RegReadArgs>(), 16);
const_assert_eq!(size_of::<SyncobjWaitArgs>(), 32);

// ===============================================================================================
// IOCTL Command Definitions
// ===============================================================================================

pub const DRM_IOCTL_SYNCOBJ_CREATE: u32 = drm_iowr::<SyncobjCreateArgs>(0xBF);
pub const DRM_IOCTL_SYNCOBJ_DESTROY: u32 = drm_iowr::<SyncobjDestroyArgs>(0xC0);
pub const DRM_IOCTL_SYNCOBJ_WAIT: u32 = drm_iowr::<SyncobjWaitArgs>(0xC3);

pub const DRM_IOCTL_I915_GETPARAM: u32 = drm_iowr::<GetParamArgs>(DRM_COMMAND_BASE + 0x06);
pub const DRM_IOCTL_I915_GEM_CONTEXT_CREATE: u32 =
    drm_iowr::<ContextCreateArgs>(DRM_COMMAND_BASE + 0x2d);
pub const DRM_IOCTL_I915_GEM_CONTEXT_CREATE_EXT: u32 =
    drm_iowr::<ContextCreateExtArgs>(DRM_COMMAND_BASE + 0x2d);
pub const DRM_IOCTL_I915_GEM_CONTEXT_DESTROY: u32 =
    drm_iow::<ContextDestroyArgs>(DRM_COMMAND_BASE + 0x2e);
pub const DRM_IOCTL_I915_REG_READ: u32 = drm_iowr::<RegReadArgs>(DRM_COMMAND_BASE + 0x31);
pub const DRM_IOCTL_I915_GEM_CONTEXT_GETPARAM: u32 =
    drm_iowr::<ContextParam>(DRM_COMMAND_BASE + 0x34);
pub const DRM_IOCTL_I915_GEM_CONTEXT_SETPARAM: u32 =
    drm_iowr::<ContextParam>(DRM_COMMAND_BASE + 0x35);
pub const DRM_IOCTL_I915_QUERY: u32 = drm_iowr::<QueryArgs>(DRM_COMMAND_BASE + 0x39);
