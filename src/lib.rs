//! Capability discovery and context lifecycle plumbing for the i915 DRM driver.
//!
//! Everything goes through a [`GemDevice`] wrapping a caller-owned DRM handle:
//!
//! ```no_run
//! use i915_rs::{ContextCreateFlags, GemDevice};
//! use std::fs::OpenOptions;
//!
//! let file = OpenOptions::new().read(true).write(true).open("/dev/dri/renderD128")?;
//! let dev = GemDevice::new(&file);
//! let ctx = dev.create_context_ext(ContextCreateFlags::RECOVERABLE)?;
//! dev.destroy_context(ctx)?;
//! # Ok::<(), i915_rs::GemError>(())
//! ```

pub mod drm;
pub mod error;
pub mod gem;
pub mod utils;

pub use drm::DrmFd;
pub use error::{GemError, GemResult};
pub use gem::address::{address_48b, canonical_address};
pub use gem::engine::{Engine, EngineClass, EngineInfo};
pub use gem::extension::{ExtensionChain, UserExtension};
pub use gem::{ContextCreateFlags, GemDevice};
