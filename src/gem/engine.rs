use crate::drm::ioctl::{
    EngineClassInstance, EngineInfoEntry, I915_ENGINE_CLASS_COMPUTE, I915_ENGINE_CLASS_COPY,
    I915_ENGINE_CLASS_RENDER, I915_ENGINE_CLASS_VIDEO, I915_ENGINE_CLASS_VIDEO_ENHANCE,
    I915_ENGINE_INFO_HAS_LOGICAL_INSTANCE, QueryEngineInfoHeader,
};
use crate::error::{GemError, GemResult};
use std::mem::{offset_of, size_of};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum EngineClass {
    Render = I915_ENGINE_CLASS_RENDER,
    Copy = I915_ENGINE_CLASS_COPY,
    Video = I915_ENGINE_CLASS_VIDEO,
    VideoEnhance = I915_ENGINE_CLASS_VIDEO_ENHANCE,
    Compute = I915_ENGINE_CLASS_COMPUTE,
}

impl EngineClass {
    pub const ALL: [Self; 5] = [
        Self::Render,
        Self::Copy,
        Self::Video,
        Self::VideoEnhance,
        Self::Compute,
    ];

    #[must_use]
    pub const fn from_raw(class: u16) -> Option<Self> {
        match class {
            I915_ENGINE_CLASS_RENDER => Some(Self::Render),
            I915_ENGINE_CLASS_COPY => Some(Self::Copy),
            I915_ENGINE_CLASS_VIDEO => Some(Self::Video),
            I915_ENGINE_CLASS_VIDEO_ENHANCE => Some(Self::VideoEnhance),
            I915_ENGINE_CLASS_COMPUTE => Some(Self::Compute),
            _ => None,
        }
    }

    #[must_use]
    pub const fn raw(self) -> u16 {
        self as u16
    }
}

/// One physical engine reported by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    pub class: EngineClass,
    pub instance: u16,
    /// Present only when the kernel reports one.
    pub logical_instance: Option<u16>,
    pub capabilities: u64,
}

/// The engines of a device, as returned by `DRM_I915_QUERY_ENGINE_INFO`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineInfo {
    pub engines: Vec<Engine>,
}

impl EngineInfo {
    #[must_use]
    pub fn new(engines: Vec<Engine>) -> Self {
        Self { engines }
    }

    /// Engines of `class`, in kernel order.
    pub fn instances(&self, class: EngineClass) -> impl Iterator<Item = &Engine> {
        self.engines.iter().filter(move |e| e.class == class)
    }

    #[must_use]
    pub fn count(&self, class: EngineClass) -> usize {
        self.instances(class).count()
    }

    /// Decodes a `drm_i915_query_engine_info` payload.
    ///
    /// Engines of classes this crate does not know about are skipped.
    ///
    /// # Errors
    /// Returns [`GemError::Malformed`] if `data` is shorter than the header claims.
    pub fn parse(data: &[u8]) -> GemResult<Self> {
        let header_len = size_of::<QueryEngineInfoHeader>();
        let entry_len = size_of::<EngineInfoEntry>();

        let num_engines = read_u32(data, 0)
            .ok_or_else(|| GemError::Malformed(format!("engine info of {} bytes", data.len())))?
            as usize;
        let needed = num_engines
            .checked_mul(entry_len)
            .and_then(|n| n.checked_add(header_len))
            .ok_or_else(|| GemError::Malformed(format!("{num_engines} engines")))?;
        if data.len() < needed {
            return Err(GemError::Malformed(format!(
                "{num_engines} engines need {needed} bytes, got {}",
                data.len()
            )));
        }

        let mut engines = Vec::with_capacity(num_engines);
        for entry in data[header_len..needed].chunks_exact(entry_len) {
            let class = read_u16(entry, offset_of!(EngineClassInstance, engine_class));
            let instance = read_u16(entry, offset_of!(EngineClassInstance, engine_instance));
            let flags = read_u64(entry, offset_of!(EngineInfoEntry, flags));
            let capabilities = read_u64(entry, offset_of!(EngineInfoEntry, capabilities));
            let logical = read_u16(entry, offset_of!(EngineInfoEntry, logical_instance));

            let (Some(class), Some(instance)) = (class.and_then(EngineClass::from_raw), instance)
            else {
                continue;
            };
            let logical_instance = if flags.unwrap_or(0) & I915_ENGINE_INFO_HAS_LOGICAL_INSTANCE != 0
            {
                logical
            } else {
                None
            };

            engines.push(Engine {
                class,
                instance,
                logical_instance,
                capabilities: capabilities.unwrap_or(0),
            });
        }

        Ok(Self { engines })
    }
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_ne_bytes(bytes.try_into().ok()?))
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_ne_bytes(bytes.try_into().ok()?))
}

fn read_u64(data: &[u8], offset: usize) -> Option<u64> {
    let bytes = data.get(offset..offset + 8)?;
    Some(u64::from_ne_bytes(bytes.try_into().ok()?))
}

/// Serializes engine records the way the kernel lays them out. Test helper.
#[cfg(test)]
pub(crate) fn encode_engine_info(engines: &[(u16, u16)]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&(engines.len() as u32).to_ne_bytes());
    data.extend_from_slice(&[0u8; 12]);
    for &(class, instance) in engines {
        let mut entry = [0u8; size_of::<EngineInfoEntry>()];
        entry[0..2].copy_from_slice(&class.to_ne_bytes());
        entry[2..4].copy_from_slice(&instance.to_ne_bytes());
        entry[8..16].copy_from_slice(&I915_ENGINE_INFO_HAS_LOGICAL_INSTANCE.to_ne_bytes());
        entry[24..26].copy_from_slice(&instance.to_ne_bytes());
        data.extend_from_slice(&entry);
    }
    data
}
