//! MDL record types
//!
//! Every struct here maps one-to-one onto an on-disk record and is fully
//! public; the headers are read field by field rather than through any
//! struct-casting shortcut, so no field needs to stay private.

use glam::Vec4;

/// Fixed 68-byte file header.
///
/// The three-lane offset/size arrays are indexed by LOD. Offsets are held
/// logical in memory; the on-disk form adds `runtime size` to non-zero
/// lanes (a zero lane means "no buffer at this LOD" and stays zero).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FileHeader {
    pub version: u32,
    /// Byte size of the vertex declaration block.
    pub stack_size: u32,
    /// Byte size of the runtime section; recomputed on encode.
    pub runtime_size: u32,
    pub vertex_declaration_count: u16,
    pub material_count: u16,
    pub vertex_offset: [u32; 3],
    pub index_offset: [u32; 3],
    pub vertex_buffer_size: [u32; 3],
    pub index_buffer_size: [u32; 3],
    pub lod_count: u8,
    pub enable_index_buffer_streaming: bool,
    pub enable_edge_geometry: bool,
}

/// One vertex input element (8 bytes on disk, 3 of them padding).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexElement {
    pub stream: u8,
    pub offset: u8,
    pub kind: u8,
    pub usage: u8,
    pub usage_index: u8,
}

/// Vertex declaration: a variable-length element list stored in a fixed
/// 17-slot region, terminated by a stream value of 255.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexDeclaration {
    pub elements: Vec<VertexElement>,
}

/// 56-byte model header holding the counts every following array obeys.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModelHeader {
    pub radius: f32,
    pub mesh_count: u16,
    pub attribute_count: u16,
    pub submesh_count: u16,
    pub material_count: u16,
    pub bone_count: u16,
    pub bone_table_count: u16,
    pub shape_count: u16,
    pub shape_mesh_count: u16,
    pub shape_value_count: u16,
    pub lod_count: u8,
    pub flags1: u8,
    pub element_id_count: u16,
    pub terrain_shadow_mesh_count: u8,
    pub flags2: u8,
    pub model_clip_out_distance: f32,
    pub shadow_clip_out_distance: f32,
    pub unknown4: u16,
    pub terrain_shadow_submesh_count: u16,
    pub unknown5: u8,
    pub bg_change_material_index: u8,
    pub bg_crest_change_material_index: u8,
    pub unknown6: u8,
    pub unknown7: u16,
    pub unknown8: u16,
    pub unknown9: u16,
}

/// Attach-point record; `parent_bone_name` is an id, not a string offset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElementId {
    pub element_id: u32,
    pub parent_bone_name: u32,
    pub translate: [f32; 3],
    pub rotate: [f32; 3],
}

/// Level-of-detail record (60 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Lod {
    pub mesh_index: u16,
    pub mesh_count: u16,
    pub model_lod_range: f32,
    pub texture_lod_range: f32,
    pub water_mesh_index: u16,
    pub water_mesh_count: u16,
    pub shadow_mesh_index: u16,
    pub shadow_mesh_count: u16,
    pub terrain_shadow_mesh_index: u16,
    pub terrain_shadow_mesh_count: u16,
    pub vertical_fog_mesh_index: u16,
    pub vertical_fog_mesh_count: u16,
    pub edge_geometry_size: u32,
    pub edge_geometry_data_offset: u32,
    pub polygon_count: u32,
    pub unknown1: u32,
    pub vertex_buffer_size: u32,
    pub index_buffer_size: u32,
    pub vertex_data_offset: u32,
    pub index_data_offset: u32,
}

/// Extra LOD record, present only with the extra-LOD flag (40 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtraLod {
    pub light_shaft_mesh_index: u16,
    pub light_shaft_mesh_count: u16,
    pub glass_mesh_index: u16,
    pub glass_mesh_count: u16,
    pub material_change_mesh_index: u16,
    pub material_change_mesh_count: u16,
    pub crest_change_mesh_index: u16,
    pub crest_change_mesh_count: u16,
    pub unknown: [u16; 12],
}

/// Mesh record (36 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mesh {
    pub vertex_count: u16,
    pub padding: u16,
    pub index_count: u32,
    pub material_index: u16,
    pub submesh_index: u16,
    pub submesh_count: u16,
    pub bone_table_index: u16,
    pub start_index: u32,
    pub vertex_buffer_offset: [u32; 3],
    pub vertex_buffer_stride: [u8; 3],
    pub vertex_stream_count: u8,
}

/// Terrain shadow mesh record (20 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerrainShadowMesh {
    pub index_count: u32,
    pub start_index: u32,
    pub vertex_buffer_offset: u32,
    pub vertex_count: u16,
    pub submesh_index: u16,
    pub submesh_count: u16,
    pub vertex_buffer_stride: u8,
    pub padding: u8,
}

/// Submesh record (16 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Submesh {
    pub index_offset: u32,
    pub index_count: u32,
    pub attribute_index_mask: u32,
    pub bone_start_index: u16,
    pub bone_count: u16,
}

/// Terrain shadow submesh record (12 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerrainShadowSubmesh {
    pub index_offset: u32,
    pub index_count: u32,
    pub unknown1: u16,
    pub unknown2: u16,
}

/// Bone table: a fixed 64-slot index array plus the used count (132 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoneTable {
    pub bone_index: [u16; 64],
    pub bone_count: u32,
}

impl Default for BoneTable {
    fn default() -> Self {
        Self {
            bone_index: [0; 64],
            bone_count: 0,
        }
    }
}

/// Shape record. The name lives in the shared string table on disk; in
/// memory it is owned here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shape {
    pub name: String,
    pub shape_mesh_start_index: [u16; 3],
    pub shape_mesh_count: [u16; 3],
}

/// Shape mesh record (12 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeMesh {
    pub mesh_index_offset: u32,
    pub shape_value_count: u32,
    pub shape_value_offset: u32,
}

/// Shape value record (4 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeValue {
    pub base_indices_index: u16,
    pub replacing_vertex_index: u16,
}

/// Axis-aligned bounding box stored as two Vec4 corners (32 bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
    pub min: Vec4,
    pub max: Vec4,
}
