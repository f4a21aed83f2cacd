//! MTRL encoding

use super::*;
use crate::bytes::Writer;
use crate::strings::StringPool;

pub(super) fn encode(mtrl: &Mtrl) -> Vec<u8> {
    // Descriptor offsets are cumulative string lengths, so the table has
    // to be assembled before any descriptor is written: textures first,
    // then UV sets, color sets, and the shader package name last.
    let mut pool = StringPool::new();
    let texture_offsets: Vec<u16> = mtrl
        .textures
        .iter()
        .map(|t| pool.intern(&t.path) as u16)
        .collect();
    let uv_set_offsets: Vec<u16> = mtrl
        .uv_sets
        .iter()
        .map(|s| pool.intern(&s.name) as u16)
        .collect();
    let color_set_offsets: Vec<u16> = mtrl
        .color_sets
        .iter()
        .map(|s| pool.intern(&s.name) as u16)
        .collect();
    let shader_name_offset = pool.intern(&mtrl.shader_package_name) as u16;

    let data_set_size = mtrl.color_set_rows.map_or(0, |_| COLOR_SET_BYTES)
        + mtrl.dye_set_rows.map_or(0, |_| DYE_SET_BYTES);

    let mut w = Writer::with_capacity(128 + pool.len() + data_set_size);
    w.write_u32(mtrl.version);
    w.write_u16(0); // file size, patched below
    w.write_u16(data_set_size as u16);
    w.write_u16(pool.len() as u16);
    w.write_u16(shader_name_offset);
    w.write_u8(mtrl.textures.len() as u8);
    w.write_u8(mtrl.uv_sets.len() as u8);
    w.write_u8(mtrl.color_sets.len() as u8);
    w.write_u8(mtrl.additional_data.len() as u8);

    for (texture, offset) in mtrl.textures.iter().zip(&texture_offsets) {
        w.write_u16(*offset);
        w.write_u16(texture.flags);
    }
    for (uv_set, offset) in mtrl.uv_sets.iter().zip(&uv_set_offsets) {
        w.write_u16(*offset);
        w.write_u16(uv_set.index);
    }
    for (color_set, offset) in mtrl.color_sets.iter().zip(&color_set_offsets) {
        w.write_u16(*offset);
        w.write_u16(color_set.index);
    }

    w.write_bytes(pool.as_bytes());
    w.write_bytes(&mtrl.additional_data);

    if let Some(rows) = &mtrl.color_set_rows {
        for row in rows {
            w.write_bytes(&row.0);
        }
    }
    if let Some(rows) = &mtrl.dye_set_rows {
        for row in rows {
            w.write_u16(row.0);
        }
    }

    w.write_u16((mtrl.shader_values.len() * 4) as u16);
    w.write_u16(mtrl.shader_keys.len() as u16);
    w.write_u16(mtrl.constants.len() as u16);
    w.write_u16(mtrl.samplers.len() as u16);
    w.write_u32(mtrl.flags);

    for key in &mtrl.shader_keys {
        w.write_u32(key.category);
        w.write_u32(key.value);
    }
    for constant in &mtrl.constants {
        w.write_u32(constant.id);
        w.write_u16(constant.offset);
        w.write_u16(constant.size);
    }
    for sampler in &mtrl.samplers {
        w.write_u32(sampler.id);
        w.write_u32(sampler.flags);
        w.write_u8(sampler.texture_index);
        w.write_bytes(&[0; 3]);
    }
    for value in &mtrl.shader_values {
        w.write_f32(*value);
    }

    w.patch_u16(4, w.len() as u16);
    w.into_inner()
}
