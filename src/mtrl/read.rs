//! MTRL decoding

use bytemuck::Zeroable;

use super::rows::{ColorSetRow, DyeSetRow};
use super::*;
use crate::bytes::Reader;
use crate::error::Result;
use crate::strings::StringPool;

pub(super) fn decode(data: &[u8]) -> Result<Mtrl> {
    let mut r = Reader::new(data);

    let version = r.read_u32()?;
    let _file_size = r.read_u16()?;
    let data_set_size = r.read_u16()? as usize;
    let string_table_size = r.read_u16()? as usize;
    let shader_package_name_offset = r.read_u16()? as usize;
    let texture_count = r.read_u8()? as usize;
    let uv_set_count = r.read_u8()? as usize;
    let color_set_count = r.read_u8()? as usize;
    let additional_data_size = r.read_u8()? as usize;

    let texture_infos = read_pairs(&mut r, texture_count)?;
    let uv_set_infos = read_pairs(&mut r, uv_set_count)?;
    let color_set_infos = read_pairs(&mut r, color_set_count)?;

    let strings = StringPool::from_table(r.take(string_table_size)?);
    let additional_data = r.take(additional_data_size)?.to_vec();

    let textures = texture_infos
        .iter()
        .map(|&(offset, flags)| {
            Ok(Texture {
                path: strings.resolve(offset as usize)?,
                flags,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let uv_sets = uv_set_infos
        .iter()
        .map(|&(offset, index)| {
            Ok(UvSet {
                name: strings.resolve(offset as usize)?,
                index,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let color_sets = color_set_infos
        .iter()
        .map(|&(offset, index)| {
            Ok(ColorSet {
                name: strings.resolve(offset as usize)?,
                index,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let shader_package_name = strings.resolve(shader_package_name_offset)?;

    // Data set: the 512-byte row block, then the dye rows, when the
    // declared size covers them. Unrecognized leftover bytes are skipped.
    let mut consumed = 0;
    let color_set_rows = if data_set_size >= COLOR_SET_BYTES {
        let mut rows = [ColorSetRow::zeroed(); COLOR_SET_ROW_COUNT];
        for row in &mut rows {
            row.0.copy_from_slice(r.take(32)?);
        }
        consumed += COLOR_SET_BYTES;
        Some(rows)
    } else {
        None
    };
    let dye_set_rows = if data_set_size >= COLOR_SET_BYTES + DYE_SET_BYTES {
        let mut rows = [DyeSetRow::zeroed(); COLOR_SET_ROW_COUNT];
        for row in &mut rows {
            row.0 = r.read_u16()?;
        }
        consumed += DYE_SET_BYTES;
        Some(rows)
    } else {
        None
    };
    if data_set_size > consumed {
        tracing::trace!(extra = data_set_size - consumed, "skipping data set tail");
        r.skip(data_set_size - consumed)?;
    }

    let shader_value_size = r.read_u16()? as usize;
    let shader_key_count = r.read_u16()? as usize;
    let constant_count = r.read_u16()? as usize;
    let sampler_count = r.read_u16()? as usize;
    let flags = r.read_u32()?;

    let mut shader_keys = Vec::with_capacity(shader_key_count);
    for _ in 0..shader_key_count {
        shader_keys.push(ShaderKey {
            category: r.read_u32()?,
            value: r.read_u32()?,
        });
    }
    let mut constants = Vec::with_capacity(constant_count);
    for _ in 0..constant_count {
        constants.push(Constant {
            id: r.read_u32()?,
            offset: r.read_u16()?,
            size: r.read_u16()?,
        });
    }
    let mut samplers = Vec::with_capacity(sampler_count);
    for _ in 0..sampler_count {
        samplers.push(Sampler {
            id: r.read_u32()?,
            flags: r.read_u32()?,
            texture_index: {
                let v = r.read_u8()?;
                r.skip(3)?; // padding
                v
            },
        });
    }
    let mut shader_values = Vec::with_capacity(shader_value_size / 4);
    for _ in 0..shader_value_size / 4 {
        shader_values.push(r.read_f32()?);
    }

    tracing::debug!(
        shader = %shader_package_name,
        textures = textures.len(),
        constants = constants.len(),
        "decoded MTRL"
    );

    Ok(Mtrl {
        version,
        textures,
        uv_sets,
        color_sets,
        additional_data,
        color_set_rows,
        dye_set_rows,
        shader_package_name,
        shader_keys,
        constants,
        samplers,
        shader_values,
        flags,
    })
}

/// Read `count` descriptor pairs `(string offset, value)`.
fn read_pairs(r: &mut Reader, count: usize) -> Result<Vec<(u16, u16)>> {
    let mut pairs = Vec::with_capacity(count);
    for _ in 0..count {
        pairs.push((r.read_u16()?, r.read_u16()?));
    }
    Ok(pairs)
}
