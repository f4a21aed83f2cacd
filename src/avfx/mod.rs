//! AVFX particle-effect definitions
//!
//! An AVFX file is one outer `AVFX` block whose payload is a flat sequence
//! of inner blocks; there is no nesting beyond that one level. Every block
//! is a FourCC tag, a u32 logical size, and a payload padded on disk to a
//! multiple of 4 bytes.
//!
//! # Block layout
//! ```text
//! 0x00: tag     [u8; 4]  (FourCC)
//! 0x04: size    u32      (logical payload size, unpadded)
//! 0x08: payload [u8; round_up4(size)]
//! ```
//!
//! Scalar fields are optional: a field the effect does not set simply has
//! no block. In memory that is `Option<T>`; on the read side the legacy
//! sentinel encodings (u32::MAX, 0xFF bools, NaN floats) are folded to
//! `None` so old files decode to the same value as files that omit the
//! block entirely.
//!
//! Arrays (schedulers, timelines, emitters, particles, effectors, binders,
//! textures, models) are written as a count block followed by one block
//! per element. Only texture payloads are interpreted (NUL-trimmed UTF-8
//! paths); the other element payloads are carried as raw bytes.

mod read;
mod write;

#[cfg(test)]
mod tests;

use glam::Vec3;

use crate::error::Result;

/// Outer block tag.
pub const AVFX_MAGIC: [u8; 4] = *b"AVFX";

// Scalar field tags, in the fixed order encode emits them.
pub(crate) const TAG_VERSION: [u8; 4] = *b"Ver ";
pub(crate) const TAG_DELAY_FAST_PARTICLE: [u8; 4] = *b"bDFP";
pub(crate) const TAG_FIT_GROUND: [u8; 4] = *b"bFG ";
pub(crate) const TAG_TRANSFORM_SKIP: [u8; 4] = *b"bTS ";
pub(crate) const TAG_ALL_STOP_ON_HIDE: [u8; 4] = *b"bASH";
pub(crate) const TAG_CAN_BE_CLIPPED_OUT: [u8; 4] = *b"bCBC";
pub(crate) const TAG_CLIP_BOX_ENABLED: [u8; 4] = *b"bCul";
pub(crate) const TAG_CLIP_BOX_X: [u8; 4] = *b"CBPx";
pub(crate) const TAG_CLIP_BOX_Y: [u8; 4] = *b"CBPy";
pub(crate) const TAG_CLIP_BOX_Z: [u8; 4] = *b"CBPz";
pub(crate) const TAG_CLIP_BOX_SIZE_X: [u8; 4] = *b"CBSx";
pub(crate) const TAG_CLIP_BOX_SIZE_Y: [u8; 4] = *b"CBSy";
pub(crate) const TAG_CLIP_BOX_SIZE_Z: [u8; 4] = *b"CBSz";
pub(crate) const TAG_BIAS_Z_MAX_SCALE: [u8; 4] = *b"ZBMs";
pub(crate) const TAG_BIAS_Z_MAX_DISTANCE: [u8; 4] = *b"ZBMd";
pub(crate) const TAG_CAMERA_SPACE: [u8; 4] = *b"bCmS";
pub(crate) const TAG_FULL_ENV_LIGHT: [u8; 4] = *b"bFEL";
pub(crate) const TAG_SOFT_PARTICLE_FADE_RANGE: [u8; 4] = *b"SPFR";
pub(crate) const TAG_SORT_KEY_OFFSET: [u8; 4] = *b"SKO ";
pub(crate) const TAG_DRAW_LAYER: [u8; 4] = *b"DwLy";
pub(crate) const TAG_DRAW_ORDER: [u8; 4] = *b"DwOT";
pub(crate) const TAG_LIGHT_SOURCE: [u8; 4] = *b"DLST";

// Array count tags and their element tags.
pub(crate) const TAG_SCHEDULER_COUNT: [u8; 4] = *b"ScCn";
pub(crate) const TAG_SCHEDULER: [u8; 4] = *b"Schd";
pub(crate) const TAG_TIMELINE_COUNT: [u8; 4] = *b"TlCn";
pub(crate) const TAG_TIMELINE: [u8; 4] = *b"TmLn";
pub(crate) const TAG_EMITTER_COUNT: [u8; 4] = *b"EmCn";
pub(crate) const TAG_EMITTER: [u8; 4] = *b"Emit";
pub(crate) const TAG_PARTICLE_COUNT: [u8; 4] = *b"PrCn";
pub(crate) const TAG_PARTICLE: [u8; 4] = *b"Ptcl";
pub(crate) const TAG_EFFECTOR_COUNT: [u8; 4] = *b"EfCn";
pub(crate) const TAG_EFFECTOR: [u8; 4] = *b"Efct";
pub(crate) const TAG_BINDER_COUNT: [u8; 4] = *b"BdCn";
pub(crate) const TAG_BINDER: [u8; 4] = *b"Bind";
pub(crate) const TAG_TEXTURE_COUNT: [u8; 4] = *b"TxCn";
pub(crate) const TAG_TEXTURE: [u8; 4] = *b"Tex ";
pub(crate) const TAG_MODEL_COUNT: [u8; 4] = *b"MdCn";
pub(crate) const TAG_MODEL: [u8; 4] = *b"Modl";

/// Decoded AVFX effect definition.
///
/// `None` scalar fields produce no block on encode; `Some` fields produce
/// exactly one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Avfx {
    pub version: Option<u32>,
    pub is_delay_fast_particle: Option<bool>,
    pub is_fit_ground: Option<bool>,
    pub is_transform_skip: Option<bool>,
    pub is_all_stop_on_hide: Option<bool>,
    pub can_be_clipped_out: Option<bool>,
    pub clip_box_enabled: Option<bool>,
    /// Assembled from the three per-component position blocks.
    pub clip_box_position: Option<Vec3>,
    /// Assembled from the three per-component size blocks.
    pub clip_box_size: Option<Vec3>,
    pub bias_z_max_scale: Option<f32>,
    pub bias_z_max_distance: Option<f32>,
    pub is_camera_space: Option<bool>,
    pub is_full_env_light: Option<bool>,
    pub soft_particle_fade_range: Option<f32>,
    pub sort_key_offset: Option<i32>,
    pub draw_layer: Option<u32>,
    pub draw_order: Option<u32>,
    pub light_source: Option<u32>,

    /// Raw scheduler payloads in file order.
    pub schedulers: Vec<Vec<u8>>,
    pub timelines: Vec<Vec<u8>>,
    pub emitters: Vec<Vec<u8>>,
    pub particles: Vec<Vec<u8>>,
    pub effectors: Vec<Vec<u8>>,
    pub binders: Vec<Vec<u8>>,
    /// Texture paths (NUL-trimmed UTF-8).
    pub textures: Vec<String>,
    pub models: Vec<Vec<u8>>,
}

impl Avfx {
    /// Decode an AVFX buffer.
    pub fn decode(data: &[u8]) -> Result<Self> {
        read::decode(data)
    }

    /// Serialize back to AVFX bytes.
    ///
    /// Blocks are emitted in the fixed field order; the outer block's
    /// logical size is recomputed after all inner blocks are written.
    pub fn encode(&self) -> Vec<u8> {
        write::encode(self)
    }
}
