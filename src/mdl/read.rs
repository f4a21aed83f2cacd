//! MDL decoding

use glam::Vec4;

use super::types::*;
use super::*;
use crate::bytes::Reader;
use crate::error::{FormatError, Result};
use crate::strings::StringPool;

pub(super) fn decode(data: &[u8]) -> Result<Mdl> {
    let mut r = Reader::new(data);

    let mut file_header = read_file_header(&mut r)?;

    // In-memory buffer offsets are always logical; a zero lane means no
    // buffer at that LOD and stays zero.
    let runtime_size = file_header.runtime_size;
    for lane in file_header
        .vertex_offset
        .iter_mut()
        .chain(file_header.index_offset.iter_mut())
    {
        if *lane != 0 {
            *lane = lane
                .checked_sub(runtime_size)
                .ok_or(FormatError::BadBufferOffset {
                    offset: *lane,
                    runtime_size,
                })?;
        }
    }

    let mut vertex_declarations =
        Vec::with_capacity(file_header.vertex_declaration_count as usize);
    for _ in 0..file_header.vertex_declaration_count {
        vertex_declarations.push(read_vertex_declaration(&mut r)?);
    }

    // String table header: count u16, pad u16, byte size u32.
    let _string_count = r.read_u16()?;
    r.skip(2)?;
    let string_size = r.read_u32()? as usize;
    let strings = StringPool::from_table(r.take(string_size)?);

    let model_header = read_model_header(&mut r)?;

    let mut element_ids = Vec::with_capacity(model_header.element_id_count as usize);
    for _ in 0..model_header.element_id_count {
        element_ids.push(read_element_id(&mut r)?);
    }

    // Three LOD records are always present on disk.
    let mut lods = Vec::with_capacity(3);
    for _ in 0..3 {
        lods.push(read_lod(&mut r)?);
    }
    let mut extra_lods = Vec::new();
    if model_header.flags2 & FLAGS2_EXTRA_LOD_ENABLED != 0 {
        for _ in 0..3 {
            extra_lods.push(read_extra_lod(&mut r)?);
        }
    }

    let mut meshes = Vec::with_capacity(model_header.mesh_count as usize);
    for _ in 0..model_header.mesh_count {
        meshes.push(read_mesh(&mut r)?);
    }

    let attributes = read_name_offsets(&mut r, &strings, model_header.attribute_count as usize)?;

    let mut terrain_shadow_meshes =
        Vec::with_capacity(model_header.terrain_shadow_mesh_count as usize);
    for _ in 0..model_header.terrain_shadow_mesh_count {
        terrain_shadow_meshes.push(read_terrain_shadow_mesh(&mut r)?);
    }

    let mut submeshes = Vec::with_capacity(model_header.submesh_count as usize);
    for _ in 0..model_header.submesh_count {
        submeshes.push(read_submesh(&mut r)?);
    }

    let mut terrain_shadow_submeshes =
        Vec::with_capacity(model_header.terrain_shadow_submesh_count as usize);
    for _ in 0..model_header.terrain_shadow_submesh_count {
        terrain_shadow_submeshes.push(read_terrain_shadow_submesh(&mut r)?);
    }

    let materials = read_name_offsets(&mut r, &strings, model_header.material_count as usize)?;
    let bones = read_name_offsets(&mut r, &strings, model_header.bone_count as usize)?;

    let mut bone_tables = Vec::with_capacity(model_header.bone_table_count as usize);
    for _ in 0..model_header.bone_table_count {
        bone_tables.push(read_bone_table(&mut r)?);
    }

    let mut shapes = Vec::with_capacity(model_header.shape_count as usize);
    for _ in 0..model_header.shape_count {
        shapes.push(read_shape(&mut r, &strings)?);
    }

    let mut shape_meshes = Vec::with_capacity(model_header.shape_mesh_count as usize);
    for _ in 0..model_header.shape_mesh_count {
        shape_meshes.push(ShapeMesh {
            mesh_index_offset: r.read_u32()?,
            shape_value_count: r.read_u32()?,
            shape_value_offset: r.read_u32()?,
        });
    }

    let mut shape_values = Vec::with_capacity(model_header.shape_value_count as usize);
    for _ in 0..model_header.shape_value_count {
        shape_values.push(ShapeValue {
            base_indices_index: r.read_u16()?,
            replacing_vertex_index: r.read_u16()?,
        });
    }

    // Submesh bone map, prefixed by its byte length.
    let bone_map_size = r.read_u32()? as usize;
    let mut submesh_bone_map = Vec::with_capacity(bone_map_size / 2);
    for _ in 0..bone_map_size / 2 {
        submesh_bone_map.push(r.read_u16()?);
    }

    // Alignment padding: one count byte, then that many filler bytes.
    let padding = r.read_u8()? as usize;
    r.skip(padding)?;

    let bounding_boxes = read_bounding_box(&mut r)?;
    let model_bounding_boxes = read_bounding_box(&mut r)?;
    let water_bounding_boxes = read_bounding_box(&mut r)?;
    let vertical_fog_bounding_boxes = read_bounding_box(&mut r)?;
    let mut bone_bounding_boxes = Vec::with_capacity(model_header.bone_count as usize);
    for _ in 0..model_header.bone_count {
        bone_bounding_boxes.push(read_bounding_box(&mut r)?);
    }

    let remaining_data = r.rest().to_vec();

    tracing::debug!(
        meshes = meshes.len(),
        bones = bones.len(),
        materials = materials.len(),
        shapes = shapes.len(),
        "decoded MDL"
    );

    Ok(Mdl {
        file_header,
        vertex_declarations,
        model_header,
        element_ids,
        lods,
        extra_lods,
        meshes,
        attributes,
        terrain_shadow_meshes,
        submeshes,
        terrain_shadow_submeshes,
        materials,
        bones,
        bone_tables,
        shapes,
        shape_meshes,
        shape_values,
        submesh_bone_map,
        bounding_boxes,
        model_bounding_boxes,
        water_bounding_boxes,
        vertical_fog_bounding_boxes,
        bone_bounding_boxes,
        remaining_data,
    })
}

fn read_file_header(r: &mut Reader) -> Result<FileHeader> {
    Ok(FileHeader {
        version: r.read_u32()?,
        stack_size: r.read_u32()?,
        runtime_size: r.read_u32()?,
        vertex_declaration_count: r.read_u16()?,
        material_count: r.read_u16()?,
        vertex_offset: [r.read_u32()?, r.read_u32()?, r.read_u32()?],
        index_offset: [r.read_u32()?, r.read_u32()?, r.read_u32()?],
        vertex_buffer_size: [r.read_u32()?, r.read_u32()?, r.read_u32()?],
        index_buffer_size: [r.read_u32()?, r.read_u32()?, r.read_u32()?],
        lod_count: r.read_u8()?,
        enable_index_buffer_streaming: r.read_bool()?,
        enable_edge_geometry: {
            let v = r.read_bool()?;
            r.skip(1)?; // padding
            v
        },
    })
}

/// Read one declaration: elements until the 255 stream sentinel, then
/// skip the unused remainder of the fixed 17-slot region.
fn read_vertex_declaration(r: &mut Reader) -> Result<VertexDeclaration> {
    let mut elements = Vec::new();
    let mut slots_read = 0;
    while slots_read < VERTEX_DECLARATION_SLOTS {
        let stream = r.read_u8()?;
        slots_read += 1;
        if stream == VERTEX_ELEMENT_END {
            r.skip(7)?;
            break;
        }
        elements.push(VertexElement {
            stream,
            offset: r.read_u8()?,
            kind: r.read_u8()?,
            usage: r.read_u8()?,
            usage_index: {
                let v = r.read_u8()?;
                r.skip(3)?; // padding
                v
            },
        });
    }
    r.skip((VERTEX_DECLARATION_SLOTS - slots_read) * 8)?;
    Ok(VertexDeclaration { elements })
}

fn read_model_header(r: &mut Reader) -> Result<ModelHeader> {
    let header = ModelHeader {
        radius: r.read_f32()?,
        mesh_count: r.read_u16()?,
        attribute_count: r.read_u16()?,
        submesh_count: r.read_u16()?,
        material_count: r.read_u16()?,
        bone_count: r.read_u16()?,
        bone_table_count: r.read_u16()?,
        shape_count: r.read_u16()?,
        shape_mesh_count: r.read_u16()?,
        shape_value_count: r.read_u16()?,
        lod_count: r.read_u8()?,
        flags1: r.read_u8()?,
        element_id_count: r.read_u16()?,
        terrain_shadow_mesh_count: r.read_u8()?,
        flags2: r.read_u8()?,
        model_clip_out_distance: r.read_f32()?,
        shadow_clip_out_distance: r.read_f32()?,
        unknown4: r.read_u16()?,
        terrain_shadow_submesh_count: r.read_u16()?,
        unknown5: r.read_u8()?,
        bg_change_material_index: r.read_u8()?,
        bg_crest_change_material_index: r.read_u8()?,
        unknown6: r.read_u8()?,
        unknown7: r.read_u16()?,
        unknown8: r.read_u16()?,
        unknown9: r.read_u16()?,
    };
    r.skip(6)?; // trailing padding
    Ok(header)
}

fn read_element_id(r: &mut Reader) -> Result<ElementId> {
    Ok(ElementId {
        element_id: r.read_u32()?,
        parent_bone_name: r.read_u32()?,
        translate: [r.read_f32()?, r.read_f32()?, r.read_f32()?],
        rotate: [r.read_f32()?, r.read_f32()?, r.read_f32()?],
    })
}

fn read_lod(r: &mut Reader) -> Result<Lod> {
    Ok(Lod {
        mesh_index: r.read_u16()?,
        mesh_count: r.read_u16()?,
        model_lod_range: r.read_f32()?,
        texture_lod_range: r.read_f32()?,
        water_mesh_index: r.read_u16()?,
        water_mesh_count: r.read_u16()?,
        shadow_mesh_index: r.read_u16()?,
        shadow_mesh_count: r.read_u16()?,
        terrain_shadow_mesh_index: r.read_u16()?,
        terrain_shadow_mesh_count: r.read_u16()?,
        vertical_fog_mesh_index: r.read_u16()?,
        vertical_fog_mesh_count: r.read_u16()?,
        edge_geometry_size: r.read_u32()?,
        edge_geometry_data_offset: r.read_u32()?,
        polygon_count: r.read_u32()?,
        unknown1: r.read_u32()?,
        vertex_buffer_size: r.read_u32()?,
        index_buffer_size: r.read_u32()?,
        vertex_data_offset: r.read_u32()?,
        index_data_offset: r.read_u32()?,
    })
}

fn read_extra_lod(r: &mut Reader) -> Result<ExtraLod> {
    let mut lod = ExtraLod {
        light_shaft_mesh_index: r.read_u16()?,
        light_shaft_mesh_count: r.read_u16()?,
        glass_mesh_index: r.read_u16()?,
        glass_mesh_count: r.read_u16()?,
        material_change_mesh_index: r.read_u16()?,
        material_change_mesh_count: r.read_u16()?,
        crest_change_mesh_index: r.read_u16()?,
        crest_change_mesh_count: r.read_u16()?,
        unknown: [0; 12],
    };
    for lane in &mut lod.unknown {
        *lane = r.read_u16()?;
    }
    Ok(lod)
}

fn read_mesh(r: &mut Reader) -> Result<Mesh> {
    Ok(Mesh {
        vertex_count: r.read_u16()?,
        padding: r.read_u16()?,
        index_count: r.read_u32()?,
        material_index: r.read_u16()?,
        submesh_index: r.read_u16()?,
        submesh_count: r.read_u16()?,
        bone_table_index: r.read_u16()?,
        start_index: r.read_u32()?,
        vertex_buffer_offset: [r.read_u32()?, r.read_u32()?, r.read_u32()?],
        vertex_buffer_stride: {
            let b = r.take(3)?;
            [b[0], b[1], b[2]]
        },
        vertex_stream_count: r.read_u8()?,
    })
}

fn read_terrain_shadow_mesh(r: &mut Reader) -> Result<TerrainShadowMesh> {
    Ok(TerrainShadowMesh {
        index_count: r.read_u32()?,
        start_index: r.read_u32()?,
        vertex_buffer_offset: r.read_u32()?,
        vertex_count: r.read_u16()?,
        submesh_index: r.read_u16()?,
        submesh_count: r.read_u16()?,
        vertex_buffer_stride: r.read_u8()?,
        padding: r.read_u8()?,
    })
}

fn read_submesh(r: &mut Reader) -> Result<Submesh> {
    Ok(Submesh {
        index_offset: r.read_u32()?,
        index_count: r.read_u32()?,
        attribute_index_mask: r.read_u32()?,
        bone_start_index: r.read_u16()?,
        bone_count: r.read_u16()?,
    })
}

fn read_terrain_shadow_submesh(r: &mut Reader) -> Result<TerrainShadowSubmesh> {
    Ok(TerrainShadowSubmesh {
        index_offset: r.read_u32()?,
        index_count: r.read_u32()?,
        unknown1: r.read_u16()?,
        unknown2: r.read_u16()?,
    })
}

fn read_bone_table(r: &mut Reader) -> Result<BoneTable> {
    let mut table = BoneTable::default();
    for slot in &mut table.bone_index {
        *slot = r.read_u16()?;
    }
    table.bone_count = r.read_u32()?;
    Ok(table)
}

fn read_shape(r: &mut Reader, strings: &StringPool) -> Result<Shape> {
    let name_offset = r.read_u32()? as usize;
    Ok(Shape {
        name: strings.resolve(name_offset)?,
        shape_mesh_start_index: [r.read_u16()?, r.read_u16()?, r.read_u16()?],
        shape_mesh_count: [r.read_u16()?, r.read_u16()?, r.read_u16()?],
    })
}

fn read_bounding_box(r: &mut Reader) -> Result<BoundingBox> {
    Ok(BoundingBox {
        min: Vec4::new(r.read_f32()?, r.read_f32()?, r.read_f32()?, r.read_f32()?),
        max: Vec4::new(r.read_f32()?, r.read_f32()?, r.read_f32()?, r.read_f32()?),
    })
}

/// Read `count` 4-byte string offsets and resolve each against the table.
fn read_name_offsets(r: &mut Reader, strings: &StringPool, count: usize) -> Result<Vec<String>> {
    let mut names = Vec::with_capacity(count);
    for _ in 0..count {
        let offset = r.read_u32()? as usize;
        names.push(strings.resolve(offset)?);
    }
    Ok(names)
}
