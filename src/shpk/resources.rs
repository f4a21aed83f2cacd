//! Resource reconciliation from shader disassembly
//!
//! The package's resource tables reference bindings by numeric id.
//! Re-disassembling bytecode yields names, not ids, so reconciliation
//! derives each binding's id by ordered fallback: an existing same-name
//! resource in the shader, then one anywhere in the package, then a
//! CRC-32 of the name. Prior ids always win, which keeps external
//! references to resources stable across repeated disassembly passes.

use std::collections::BTreeMap;

use super::types::{Resource, Shader, Stage};
use super::ShaderPackage;
use crate::error::Result;

/// Default slot for sampler resources first seen in disassembly.
const DEFAULT_SAMPLER_SLOT: u16 = 2;

/// Default slot for constant buffers first seen in disassembly.
const DEFAULT_CONSTANT_SLOT: u16 = 65535;

/// External bytecode disassembler.
///
/// The codec never interprets bytecode itself; callers supply an
/// implementation (a DXBC/DXSO decompiler binding, typically) when they
/// need resource reconciliation.
pub trait Disassembler {
    fn disassemble(&self, bytecode: &[u8]) -> Result<Disassembly>;
}

/// What a binding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Constant,
    Sampler,
    Texture,
    Uav,
}

/// One resource binding reported by the disassembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub kind: BindingKind,
    /// Raw name as it appears in the bytecode, suffixes included.
    pub name: String,
    pub slot: u16,
    /// Registers the binding spans (constant buffers) or 1.
    pub register_count: u16,
    /// Per-component usage mask.
    pub used: u16,
    /// Per-component dynamic-indexing mask.
    pub used_dynamically: u16,
}

/// Disassembler output for one shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disassembly {
    pub stage: Stage,
    /// Shader model as (major, minor).
    pub shader_model: (u8, u8),
    pub bindings: Vec<Binding>,
}

impl Disassembly {
    pub(crate) fn sampler_slots(&self) -> Vec<u16> {
        self.slots_of(BindingKind::Sampler)
    }

    pub(crate) fn texture_slots(&self) -> Vec<u16> {
        self.slots_of(BindingKind::Texture)
    }

    fn slots_of(&self, kind: BindingKind) -> Vec<u16> {
        self.bindings
            .iter()
            .filter(|b| b.kind == kind)
            .map(|b| b.slot)
            .collect()
    }
}

impl ShaderPackage {
    /// Rebuild every disassembled shader's resource tables from its
    /// bindings and re-aggregate the package-level tables.
    ///
    /// Ids are stable: a name already known to the shader or the package
    /// keeps its id, only genuinely new names get a hashed one. Constant
    /// buffer sizes take the maximum register count observed anywhere;
    /// slots and sizes of resources already in the package tables are
    /// never overwritten.
    pub fn update_resources(&mut self) {
        let package_ids = self.known_ids();

        for shader in self
            .vertex_shaders
            .iter_mut()
            .chain(self.pixel_shaders.iter_mut())
        {
            let Some(disassembly) = shader.disassembly.clone() else {
                continue;
            };
            let own_ids = shader_ids(shader);

            let mut constants = Vec::new();
            let mut samplers = Vec::new();
            let mut uavs = Vec::new();
            let mut textures = Vec::new();
            for binding in &disassembly.bindings {
                let name = normalize_name(&binding.name);
                let id = own_ids
                    .get(name)
                    .or_else(|| package_ids.get(name))
                    .copied()
                    .unwrap_or_else(|| crc32(name.as_bytes()));
                let resource = Resource {
                    id,
                    name: name.to_owned(),
                    slot: binding.slot,
                    size: binding.register_count,
                    used: Some(binding.used),
                    used_dynamically: Some(binding.used_dynamically),
                };
                match binding.kind {
                    BindingKind::Constant => constants.push(resource),
                    BindingKind::Sampler => samplers.push(resource),
                    BindingKind::Texture => textures.push(resource),
                    BindingKind::Uav => uavs.push(resource),
                }
            }
            shader.constants = constants;
            shader.samplers = samplers;
            shader.uavs = uavs;
            shader.textures = textures;
        }

        self.aggregate_constants();
        self.aggregate_slotted(|s| &s.samplers, |p| &mut p.samplers, DEFAULT_SAMPLER_SLOT);
        self.aggregate_slotted(|s| &s.uavs, |p| &mut p.uavs, DEFAULT_SAMPLER_SLOT);
        self.update_used();
    }

    /// Recompute the package tables' usage masks: the bitwise union of
    /// every disassembled shader's masks per id. Ids referenced by no
    /// disassembly get `None` (unknown), not an all-clear mask.
    pub fn update_used(&mut self) {
        let mut masks: BTreeMap<u32, (u16, u16)> = BTreeMap::new();
        for shader in self.vertex_shaders.iter().chain(self.pixel_shaders.iter()) {
            for resource in shader_resources(shader) {
                if let (Some(used), Some(dynamic)) = (resource.used, resource.used_dynamically) {
                    let entry = masks.entry(resource.id).or_insert((0, 0));
                    entry.0 |= used;
                    entry.1 |= dynamic;
                }
            }
        }
        for resource in self
            .constants
            .iter_mut()
            .chain(self.samplers.iter_mut())
            .chain(self.uavs.iter_mut())
        {
            match masks.get(&resource.id) {
                Some(&(used, dynamic)) => {
                    resource.used = Some(used);
                    resource.used_dynamically = Some(dynamic);
                }
                None => {
                    resource.used = None;
                    resource.used_dynamically = None;
                }
            }
        }
    }

    /// Every name-to-id association currently known anywhere in the
    /// package, package tables taking precedence over shader tables.
    fn known_ids(&self) -> BTreeMap<String, u32> {
        let mut ids = BTreeMap::new();
        for shader in self.vertex_shaders.iter().chain(self.pixel_shaders.iter()) {
            for resource in shader_resources(shader) {
                ids.entry(resource.name.clone()).or_insert(resource.id);
            }
        }
        for resource in self
            .constants
            .iter()
            .chain(self.samplers.iter())
            .chain(self.uavs.iter())
        {
            ids.insert(resource.name.clone(), resource.id);
        }
        ids
    }

    fn aggregate_constants(&mut self) {
        // Max register count per constant buffer across all shaders.
        let mut sizes: BTreeMap<u32, (String, u16)> = BTreeMap::new();
        for shader in self.vertex_shaders.iter().chain(self.pixel_shaders.iter()) {
            for constant in &shader.constants {
                let entry = sizes
                    .entry(constant.id)
                    .or_insert_with(|| (constant.name.clone(), 0));
                entry.1 = entry.1.max(constant.size);
            }
        }
        for (id, (name, size)) in sizes {
            match self.constants.iter_mut().find(|c| c.id == id) {
                Some(existing) => existing.size = size,
                None => self.constants.push(Resource {
                    id,
                    name,
                    slot: DEFAULT_CONSTANT_SLOT,
                    size,
                    used: None,
                    used_dynamically: None,
                }),
            }
        }
    }

    fn aggregate_slotted(
        &mut self,
        of_shader: fn(&Shader) -> &Vec<Resource>,
        of_package: fn(&mut Self) -> &mut Vec<Resource>,
        default_slot: u16,
    ) {
        let mut seen: Vec<Resource> = Vec::new();
        for shader in self.vertex_shaders.iter().chain(self.pixel_shaders.iter()) {
            for resource in of_shader(shader) {
                if !seen.iter().any(|r| r.id == resource.id) {
                    seen.push(resource.clone());
                }
            }
        }
        let table = of_package(self);
        for resource in seen {
            // A prior entry keeps its slot and size.
            if !table.iter().any(|r| r.id == resource.id) {
                table.push(Resource {
                    slot: default_slot,
                    used: None,
                    used_dynamically: None,
                    ..resource
                });
            }
        }
    }
}

fn shader_resources(shader: &Shader) -> impl Iterator<Item = &Resource> {
    shader
        .constants
        .iter()
        .chain(shader.samplers.iter())
        .chain(shader.uavs.iter())
        .chain(shader.textures.iter())
}

fn shader_ids(shader: &Shader) -> BTreeMap<String, u32> {
    shader_resources(shader)
        .map(|r| (r.name.clone(), r.id))
        .collect()
}

/// Strip the suffixes disassemblers append to binding names: a `.N`
/// swizzle index, or the `_S`/`_T` pair suffix on split sampler/texture
/// bindings.
pub(crate) fn normalize_name(name: &str) -> &str {
    if let Some(dot) = name.rfind('.') {
        let suffix = &name[dot + 1..];
        if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
            return &name[..dot];
        }
    }
    if let Some(stripped) = name.strip_suffix("_S").or_else(|| name.strip_suffix("_T")) {
        return stripped;
    }
    name
}

/// IEEE CRC-32 (reflected, polynomial 0xEDB88320), the hash the format
/// uses for resource and parameter ids.
pub(crate) fn crc32(bytes: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in bytes {
        crc ^= byte as u32;
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}
