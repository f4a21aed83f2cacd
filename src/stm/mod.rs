//! STM dye/staining lookup tables
//!
//! An STM file maps dye template ids to lookup tables of material color
//! adjustments. Each template carries five independent lists (diffuse,
//! specular and emissive triples, gloss, specular power), all with 128
//! logical entries addressed by dye index 1..=128, and each list picks
//! the smallest of three storage layouts on disk (see [`DyeTable`]).
//!
//! Layout: header word, entry count u32, a table of u16 template ids,
//! a parallel table of u16 entry offsets (in 2-byte units past the end
//! of the offset table), then entry data. An entry is five cumulative
//! u16 end markers delimiting the five lists' byte ranges, followed by
//! the range bytes.
//!
//! The game ships this file; tooling mostly reads it. Encode is still
//! symmetric: it re-derives the end markers, re-selects storage density,
//! and shares byte-identical entry bodies between templates.

mod read;
mod table;
mod write;

#[cfg(test)]
mod tests;

pub use table::{DyeTable, DyeTriple, DyeValue};

use std::collections::BTreeMap;

use glam::Vec3;
use half::f16;

use crate::error::Result;

/// Logical entries per dye list; dye indices run 1..=128.
pub const DYE_COUNT: usize = 128;

/// Largest value pool an indexed list may carry (index byte 0 is
/// reserved for the default).
pub(crate) const INDEXED_POOL_MAX: usize = 127;

/// Decoded STM staining template file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stm {
    /// Leading header word, carried verbatim.
    pub header: u32,
    /// Templates by id. Key order is encode order.
    pub entries: BTreeMap<u16, StainingTemplateEntry>,
}

impl Stm {
    /// Decode an STM buffer.
    pub fn decode(data: &[u8]) -> Result<Self> {
        read::decode(data)
    }

    /// Serialize back to STM bytes, re-deriving entry offsets and end
    /// markers and re-selecting each list's storage density.
    pub fn encode(&self) -> Vec<u8> {
        write::encode(self)
    }

    /// All five channels of one template at `dye_index`, or `None` if
    /// the template id is unknown.
    pub fn dye(&self, template: u16, dye_index: usize) -> Option<DyeValues> {
        self.entries.get(&template).map(|e| e.dye(dye_index))
    }
}

/// One dye template: five independently stored lookup lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StainingTemplateEntry {
    pub diffuse: DyeTable<DyeTriple>,
    pub specular: DyeTable<DyeTriple>,
    pub emissive: DyeTable<DyeTriple>,
    pub gloss: DyeTable<f16>,
    pub specular_power: DyeTable<f16>,
}

impl StainingTemplateEntry {
    /// All five channels at `dye_index`, widened to single precision.
    /// Index 0 and anything past 128 yield the defaults.
    pub fn dye(&self, dye_index: usize) -> DyeValues {
        DyeValues {
            diffuse: to_vec3(self.diffuse.get(dye_index)),
            specular: to_vec3(self.specular.get(dye_index)),
            emissive: to_vec3(self.emissive.get(dye_index)),
            gloss: self.gloss.get(dye_index).to_f32(),
            specular_power: self.specular_power.get(dye_index).to_f32(),
        }
    }
}

/// One dye's material color adjustments, as single-precision values.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DyeValues {
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub emissive: Vec3,
    pub gloss: f32,
    pub specular_power: f32,
}

fn to_vec3(t: DyeTriple) -> Vec3 {
    Vec3::new(t[0].to_f32(), t[1].to_f32(), t[2].to_f32())
}
