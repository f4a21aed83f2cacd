//! MTRL material files
//!
//! A material binds a shader package to textures, UV sets and color sets,
//! and carries the shader's per-material state: key/value selectors,
//! constant buffer contents and sampler configuration.
//!
//! Layout: version u32, a fixed 12-byte header, descriptor tables of
//! `(string offset, value)` pairs, the string table, opaque additional
//! data, the color set row block, and the shader-package tail. Descriptor
//! offsets index the string table and are recomputed on encode as
//! cumulative string lengths in texture, UV-set, color-set, shader-name
//! order; `file_size` is patched once the total length is known.

mod read;
mod rows;
mod write;

#[cfg(test)]
mod tests;

pub use rows::{ColorSetRow, DyeSetRow};

use crate::error::Result;

/// Rows per color set.
pub const COLOR_SET_ROW_COUNT: usize = 16;

/// Byte size of the color row block when present.
pub(crate) const COLOR_SET_BYTES: usize = COLOR_SET_ROW_COUNT * 32;

/// Byte size of the dye row block when present.
pub(crate) const DYE_SET_BYTES: usize = COLOR_SET_ROW_COUNT * 2;

/// Texture reference: a path plus sampler-independent flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Texture {
    pub path: String,
    pub flags: u16,
}

/// Named UV set slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UvSet {
    pub name: String,
    pub index: u16,
}

/// Named color set slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorSet {
    pub name: String,
    pub index: u16,
}

/// Shader branch selector pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShaderKey {
    pub category: u32,
    pub value: u32,
}

/// Constant definition: a byte window into the shader value array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Constant {
    pub id: u32,
    pub offset: u16,
    pub size: u16,
}

/// Sampler state. `texture_index` points into `textures`; 0xFF means no
/// texture bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sampler {
    pub id: u32,
    pub flags: u32,
    pub texture_index: u8,
}

/// Decoded MTRL material.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mtrl {
    pub version: u32,
    pub textures: Vec<Texture>,
    pub uv_sets: Vec<UvSet>,
    pub color_sets: Vec<ColorSet>,
    /// Opaque bytes between the string table and the row block.
    pub additional_data: Vec<u8>,
    /// Present iff the data set carries the 512-byte row block.
    pub color_set_rows: Option<[ColorSetRow; COLOR_SET_ROW_COUNT]>,
    /// Present iff the data set also carries the dye rows.
    pub dye_set_rows: Option<[DyeSetRow; COLOR_SET_ROW_COUNT]>,
    pub shader_package_name: String,
    pub shader_keys: Vec<ShaderKey>,
    pub constants: Vec<Constant>,
    pub samplers: Vec<Sampler>,
    /// Backing store the constants' byte windows index into.
    pub shader_values: Vec<f32>,
    pub flags: u32,
}

impl Mtrl {
    /// Decode an MTRL buffer.
    pub fn decode(data: &[u8]) -> Result<Self> {
        read::decode(data)
    }

    /// Serialize back to MTRL bytes, recomputing string offsets, the
    /// data-set size and the patched `file_size` field.
    pub fn encode(&self) -> Vec<u8> {
        write::encode(self)
    }
}
