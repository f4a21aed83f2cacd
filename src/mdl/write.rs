//! MDL encoding
//!
//! Two-pass write: the body goes into a growable buffer first (the file
//! header region left zeroed), `runtime_size` is measured once the modeled
//! body is complete, and the header is patched in front with the buffer
//! offsets converted back to their on-disk `logical + runtime_size` form.

use super::types::*;
use super::*;
use crate::bytes::Writer;
use crate::strings::StringPool;

pub(super) fn encode(mdl: &Mdl) -> Vec<u8> {
    let mut w = Writer::with_capacity(FILE_HEADER_SIZE + mdl.remaining_data.len() + 1024);

    // Header region; patched once the body length is known.
    w.write_bytes(&[0u8; FILE_HEADER_SIZE]);

    for decl in &mdl.vertex_declarations {
        write_vertex_declaration(&mut w, decl);
    }
    let stack_size = (w.len() - FILE_HEADER_SIZE) as u32;

    // String table rebuilt from current string content, in the fixed
    // Attributes, Bones, Materials, Shape-names concatenation order.
    let mut pool = StringPool::new();
    let attribute_offsets: Vec<u32> = mdl
        .attributes
        .iter()
        .map(|s| pool.intern(s) as u32)
        .collect();
    let bone_offsets: Vec<u32> = mdl.bones.iter().map(|s| pool.intern(s) as u32).collect();
    let material_offsets: Vec<u32> = mdl
        .materials
        .iter()
        .map(|s| pool.intern(s) as u32)
        .collect();
    let shape_offsets: Vec<u32> = mdl
        .shapes
        .iter()
        .map(|s| pool.intern(&s.name) as u32)
        .collect();

    // Table is padded to an 8-byte boundary; the declared size includes
    // the padding.
    let table_size = (pool.len() + 7) & !7;
    w.write_u16(pool.entries().count() as u16);
    w.write_u16(0);
    w.write_u32(table_size as u32);
    w.write_bytes(pool.as_bytes());
    for _ in pool.len()..table_size {
        w.write_u8(0);
    }

    write_model_header(&mut w, &mdl.model_header);

    for id in &mdl.element_ids {
        w.write_u32(id.element_id);
        w.write_u32(id.parent_bone_name);
        for v in id.translate.iter().chain(id.rotate.iter()) {
            w.write_f32(*v);
        }
    }

    for lod in &mdl.lods {
        write_lod(&mut w, lod);
    }
    if mdl.model_header.flags2 & FLAGS2_EXTRA_LOD_ENABLED != 0 {
        for lod in &mdl.extra_lods {
            write_extra_lod(&mut w, lod);
        }
    }

    for mesh in &mdl.meshes {
        write_mesh(&mut w, mesh);
    }

    for offset in &attribute_offsets {
        w.write_u32(*offset);
    }

    for mesh in &mdl.terrain_shadow_meshes {
        w.write_u32(mesh.index_count);
        w.write_u32(mesh.start_index);
        w.write_u32(mesh.vertex_buffer_offset);
        w.write_u16(mesh.vertex_count);
        w.write_u16(mesh.submesh_index);
        w.write_u16(mesh.submesh_count);
        w.write_u8(mesh.vertex_buffer_stride);
        w.write_u8(mesh.padding);
    }

    for sub in &mdl.submeshes {
        w.write_u32(sub.index_offset);
        w.write_u32(sub.index_count);
        w.write_u32(sub.attribute_index_mask);
        w.write_u16(sub.bone_start_index);
        w.write_u16(sub.bone_count);
    }

    for sub in &mdl.terrain_shadow_submeshes {
        w.write_u32(sub.index_offset);
        w.write_u32(sub.index_count);
        w.write_u16(sub.unknown1);
        w.write_u16(sub.unknown2);
    }

    for offset in material_offsets.iter().chain(bone_offsets.iter()) {
        w.write_u32(*offset);
    }

    for table in &mdl.bone_tables {
        for index in &table.bone_index {
            w.write_u16(*index);
        }
        w.write_u32(table.bone_count);
    }

    for (shape, offset) in mdl.shapes.iter().zip(&shape_offsets) {
        w.write_u32(*offset);
        for v in shape
            .shape_mesh_start_index
            .iter()
            .chain(shape.shape_mesh_count.iter())
        {
            w.write_u16(*v);
        }
    }

    for mesh in &mdl.shape_meshes {
        w.write_u32(mesh.mesh_index_offset);
        w.write_u32(mesh.shape_value_count);
        w.write_u32(mesh.shape_value_offset);
    }

    for value in &mdl.shape_values {
        w.write_u16(value.base_indices_index);
        w.write_u16(value.replacing_vertex_index);
    }

    w.write_u32((mdl.submesh_bone_map.len() * 2) as u32);
    for entry in &mdl.submesh_bone_map {
        w.write_u16(*entry);
    }

    // Padding so the bounding boxes land on an 8-byte boundary; one count
    // byte followed by that many filler bytes. The filler pattern is
    // recognizable in hex dumps but never read back.
    let padding = (8 - (w.len() + 1) % 8) % 8;
    w.write_u8(padding as u8);
    let filler = PADDING_FILLER.to_be_bytes();
    for i in 0..padding {
        w.write_u8(filler[i % filler.len()]);
    }

    write_bounding_box(&mut w, &mdl.bounding_boxes);
    write_bounding_box(&mut w, &mdl.model_bounding_boxes);
    write_bounding_box(&mut w, &mdl.water_bounding_boxes);
    write_bounding_box(&mut w, &mdl.vertical_fog_bounding_boxes);
    for bbox in &mdl.bone_bounding_boxes {
        write_bounding_box(&mut w, bbox);
    }

    // Runtime section ends here; the unmodeled tail is excluded from the
    // stored buffer offsets.
    let runtime_size = (w.len() - stack_size as usize - FILE_HEADER_SIZE) as u32;

    w.write_bytes(&mdl.remaining_data);

    patch_file_header(&mut w, &mdl.file_header, stack_size, runtime_size);
    w.into_inner()
}

fn patch_file_header(w: &mut Writer, header: &FileHeader, stack_size: u32, runtime_size: u32) {
    let mut h = Writer::with_capacity(FILE_HEADER_SIZE);
    h.write_u32(header.version);
    h.write_u32(stack_size);
    h.write_u32(runtime_size);
    h.write_u16(header.vertex_declaration_count);
    h.write_u16(header.material_count);
    // Buffer offsets go back to their on-disk form; zero lanes stay zero.
    for lane in header.vertex_offset.iter().chain(header.index_offset.iter()) {
        h.write_u32(if *lane != 0 { *lane + runtime_size } else { 0 });
    }
    for lane in header
        .vertex_buffer_size
        .iter()
        .chain(header.index_buffer_size.iter())
    {
        h.write_u32(*lane);
    }
    h.write_u8(header.lod_count);
    h.write_bool(header.enable_index_buffer_streaming);
    h.write_bool(header.enable_edge_geometry);
    h.write_u8(0);

    w.patch_bytes(0, &h.into_inner());
}

fn write_vertex_declaration(w: &mut Writer, decl: &VertexDeclaration) {
    for element in &decl.elements {
        w.write_u8(element.stream);
        w.write_u8(element.offset);
        w.write_u8(element.kind);
        w.write_u8(element.usage);
        w.write_u8(element.usage_index);
        w.write_bytes(&[0; 3]);
    }
    // Sentinel slot (omitted when every slot is an element), then
    // zero-fill the unused remainder of the region.
    let mut slots = decl.elements.len();
    if slots < VERTEX_DECLARATION_SLOTS {
        w.write_u8(VERTEX_ELEMENT_END);
        w.write_bytes(&[0; 7]);
        slots += 1;
    }
    for _ in slots..VERTEX_DECLARATION_SLOTS {
        w.write_bytes(&[0; 8]);
    }
}

fn write_model_header(w: &mut Writer, h: &ModelHeader) {
    w.write_f32(h.radius);
    w.write_u16(h.mesh_count);
    w.write_u16(h.attribute_count);
    w.write_u16(h.submesh_count);
    w.write_u16(h.material_count);
    w.write_u16(h.bone_count);
    w.write_u16(h.bone_table_count);
    w.write_u16(h.shape_count);
    w.write_u16(h.shape_mesh_count);
    w.write_u16(h.shape_value_count);
    w.write_u8(h.lod_count);
    w.write_u8(h.flags1);
    w.write_u16(h.element_id_count);
    w.write_u8(h.terrain_shadow_mesh_count);
    w.write_u8(h.flags2);
    w.write_f32(h.model_clip_out_distance);
    w.write_f32(h.shadow_clip_out_distance);
    w.write_u16(h.unknown4);
    w.write_u16(h.terrain_shadow_submesh_count);
    w.write_u8(h.unknown5);
    w.write_u8(h.bg_change_material_index);
    w.write_u8(h.bg_crest_change_material_index);
    w.write_u8(h.unknown6);
    w.write_u16(h.unknown7);
    w.write_u16(h.unknown8);
    w.write_u16(h.unknown9);
    w.write_bytes(&[0; 6]);
}

fn write_lod(w: &mut Writer, lod: &Lod) {
    w.write_u16(lod.mesh_index);
    w.write_u16(lod.mesh_count);
    w.write_f32(lod.model_lod_range);
    w.write_f32(lod.texture_lod_range);
    w.write_u16(lod.water_mesh_index);
    w.write_u16(lod.water_mesh_count);
    w.write_u16(lod.shadow_mesh_index);
    w.write_u16(lod.shadow_mesh_count);
    w.write_u16(lod.terrain_shadow_mesh_index);
    w.write_u16(lod.terrain_shadow_mesh_count);
    w.write_u16(lod.vertical_fog_mesh_index);
    w.write_u16(lod.vertical_fog_mesh_count);
    w.write_u32(lod.edge_geometry_size);
    w.write_u32(lod.edge_geometry_data_offset);
    w.write_u32(lod.polygon_count);
    w.write_u32(lod.unknown1);
    w.write_u32(lod.vertex_buffer_size);
    w.write_u32(lod.index_buffer_size);
    w.write_u32(lod.vertex_data_offset);
    w.write_u32(lod.index_data_offset);
}

fn write_extra_lod(w: &mut Writer, lod: &ExtraLod) {
    w.write_u16(lod.light_shaft_mesh_index);
    w.write_u16(lod.light_shaft_mesh_count);
    w.write_u16(lod.glass_mesh_index);
    w.write_u16(lod.glass_mesh_count);
    w.write_u16(lod.material_change_mesh_index);
    w.write_u16(lod.material_change_mesh_count);
    w.write_u16(lod.crest_change_mesh_index);
    w.write_u16(lod.crest_change_mesh_count);
    for lane in &lod.unknown {
        w.write_u16(*lane);
    }
}

fn write_mesh(w: &mut Writer, mesh: &Mesh) {
    w.write_u16(mesh.vertex_count);
    w.write_u16(mesh.padding);
    w.write_u32(mesh.index_count);
    w.write_u16(mesh.material_index);
    w.write_u16(mesh.submesh_index);
    w.write_u16(mesh.submesh_count);
    w.write_u16(mesh.bone_table_index);
    w.write_u32(mesh.start_index);
    for offset in &mesh.vertex_buffer_offset {
        w.write_u32(*offset);
    }
    w.write_bytes(&mesh.vertex_buffer_stride);
    w.write_u8(mesh.vertex_stream_count);
}

fn write_bounding_box(w: &mut Writer, bbox: &BoundingBox) {
    for v in [bbox.min, bbox.max] {
        w.write_f32(v.x);
        w.write_f32(v.y);
        w.write_f32(v.z);
        w.write_f32(v.w);
    }
}
