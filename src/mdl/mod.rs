//! MDL 3D model files
//!
//! An MDL file is a strict linear protocol: a fixed 68-byte file header,
//! vertex declarations, a shared string table, a model header full of
//! counts, and a dozen parallel typed arrays cross-referenced by
//! string-table offsets and index arithmetic. Everything after the
//! per-bone bounding boxes (vertex/index buffer payloads among it) is
//! carried as raw trailing bytes.
//!
//! String-bearing records store file-relative byte offsets into one flat
//! table shared by attributes, bones, materials and shape names, in that
//! concatenation order. Decode resolves offsets to owned `String`s;
//! encode rebuilds the table from current string content with a fresh
//! [`StringPool`](crate::StringPool), so renames never leave stale table
//! entries behind.
//!
//! The header's four vertex/index buffer offset fields are stored on disk
//! as `logical + runtime_size`, where `runtime_size` is only known once
//! the body is serialized. Decode subtracts it immediately so in-memory
//! offsets are always logical; encode writes the body first, derives
//! `runtime_size`, and patches the header in front.

mod read;
mod types;
mod write;


pub use types::{
    BoneTable, BoundingBox, ElementId, ExtraLod, FileHeader, Lod, Mesh, ModelHeader, Shape,
    ShapeMesh, ShapeValue, Submesh, TerrainShadowMesh, TerrainShadowSubmesh, VertexDeclaration,
    VertexElement,
};

use crate::error::Result;

/// Size of the fixed file header in bytes.
pub const FILE_HEADER_SIZE: usize = 0x44;

/// Slots reserved per vertex declaration; unused slots are padding.
pub const VERTEX_DECLARATION_SLOTS: usize = 17;

/// Stream value marking the end of a declaration's element list.
pub(crate) const VERTEX_ELEMENT_END: u8 = 255;

/// Model flag (second flag byte): three extra LOD records follow the LODs.
pub const FLAGS2_EXTRA_LOD_ENABLED: u8 = 0x10;

/// Filler pattern for the alignment padding before the bounding boxes.
/// Recognizable in hex dumps; the engine never reads it.
pub(crate) const PADDING_FILLER: u64 = 0xDEAD_BEEF_F00D_CAFE;

/// Decoded MDL model.
///
/// The whole graph is owned by this one value; sub-arrays are replaced
/// wholesale on structural edits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mdl {
    /// File header with buffer offsets held in logical form
    /// (`runtime_size` already subtracted).
    pub file_header: FileHeader,
    pub vertex_declarations: Vec<VertexDeclaration>,
    pub model_header: ModelHeader,
    pub element_ids: Vec<ElementId>,
    /// Always 3 records on disk regardless of `lod_count`.
    pub lods: Vec<Lod>,
    /// Present only when `model_header.flags2` has the extra-LOD bit.
    pub extra_lods: Vec<ExtraLod>,
    pub meshes: Vec<Mesh>,
    pub attributes: Vec<String>,
    pub terrain_shadow_meshes: Vec<TerrainShadowMesh>,
    pub submeshes: Vec<Submesh>,
    pub terrain_shadow_submeshes: Vec<TerrainShadowSubmesh>,
    pub materials: Vec<String>,
    pub bones: Vec<String>,
    pub bone_tables: Vec<BoneTable>,
    pub shapes: Vec<Shape>,
    pub shape_meshes: Vec<ShapeMesh>,
    pub shape_values: Vec<ShapeValue>,
    pub submesh_bone_map: Vec<u16>,
    pub bounding_boxes: BoundingBox,
    pub model_bounding_boxes: BoundingBox,
    pub water_bounding_boxes: BoundingBox,
    pub vertical_fog_bounding_boxes: BoundingBox,
    /// One per bone, parallel to `bones`.
    pub bone_bounding_boxes: Vec<BoundingBox>,
    /// Unmodeled tail (vertex/index buffer payloads among it), carried
    /// verbatim.
    pub remaining_data: Vec<u8>,
}

impl Mdl {
    /// Decode an MDL buffer. Any truncation is fatal; there is no
    /// partial-file recovery.
    pub fn decode(data: &[u8]) -> Result<Self> {
        read::decode(data)
    }

    /// Serialize back to MDL bytes, recomputing the string table, the
    /// alignment padding and the runtime-size-adjusted header offsets.
    pub fn encode(&self) -> Vec<u8> {
        write::encode(self)
    }
}
