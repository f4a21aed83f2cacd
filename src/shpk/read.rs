//! SHPK decoding

use super::types::*;
use super::*;
use crate::bytes::Reader;
use crate::error::{FormatError, Result};
use crate::strings::StringPool;

pub(super) fn decode(data: &[u8]) -> Result<ShaderPackage> {
    let mut r = Reader::new(data);

    let magic = r.read_tag()?;
    if magic != SHPK_MAGIC {
        return Err(FormatError::InvalidMagic {
            expected: SHPK_MAGIC,
            found: magic,
        });
    }
    let version = r.read_u32()?;
    let directx = DxVersion::from_magic(r.read_tag()?)?;
    let file_size = r.read_u32()? as usize;
    if file_size != data.len() {
        return Err(FormatError::FileSizeMismatch {
            declared: file_size,
            actual: data.len(),
        });
    }
    let blobs_offset = r.read_u32()? as usize;
    let strings_offset = r.read_u32()? as usize;
    let vertex_shader_count = r.read_u32()? as usize;
    let pixel_shader_count = r.read_u32()? as usize;
    let material_params_size = r.read_u32()?;
    let material_param_count = r.read_u32()? as usize;
    let constant_count = r.read_u32()? as usize;
    let sampler_count = r.read_u32()? as usize;
    let uav_count = r.read_u32()? as usize;

    // The tail is carved into the blob region and the string region.
    if strings_offset > data.len() || blobs_offset > strings_offset {
        return Err(FormatError::FileSizeMismatch {
            declared: strings_offset.max(blobs_offset),
            actual: data.len(),
        });
    }
    let blobs = &data[blobs_offset..strings_offset];
    let strings = StringPool::from_table(&data[strings_offset..]);

    let mut vertex_shaders = Vec::with_capacity(vertex_shader_count);
    for _ in 0..vertex_shader_count {
        vertex_shaders.push(read_shader(&mut r, Stage::Vertex, directx, blobs, &strings)?);
    }
    let mut pixel_shaders = Vec::with_capacity(pixel_shader_count);
    for _ in 0..pixel_shader_count {
        pixel_shaders.push(read_shader(&mut r, Stage::Pixel, directx, blobs, &strings)?);
    }

    let mut material_params = Vec::with_capacity(material_param_count);
    for _ in 0..material_param_count {
        material_params.push(MaterialParam {
            id: r.read_u32()?,
            byte_offset: r.read_u16()?,
            byte_size: r.read_u16()?,
        });
    }
    let constants = read_resources(&mut r, constant_count, &strings)?;
    let samplers = read_resources(&mut r, sampler_count, &strings)?;
    let uavs = read_resources(&mut r, uav_count, &strings)?;

    tracing::debug!(
        directx = directx.as_str(),
        vertex = vertex_shaders.len(),
        pixel = pixel_shaders.len(),
        params = material_params.len(),
        "decoded SHPK"
    );

    Ok(ShaderPackage {
        version,
        directx,
        vertex_shaders,
        pixel_shaders,
        material_params_size,
        material_params,
        constants,
        samplers,
        uavs,
    })
}

fn read_shader(
    r: &mut Reader,
    stage: Stage,
    directx: DxVersion,
    blobs: &[u8],
    strings: &StringPool,
) -> Result<Shader> {
    let blob_offset = r.read_u32()? as usize;
    let blob_size = r.read_u32()? as usize;
    let constant_count = r.read_u16()? as usize;
    let sampler_count = r.read_u16()? as usize;
    let uav_count = r.read_u16()? as usize;
    let texture_count = r.read_u16()? as usize;

    if blob_offset + blob_size > blobs.len() {
        return Err(FormatError::UnexpectedEof {
            offset: blob_offset,
            needed: blob_size,
            remaining: blobs.len().saturating_sub(blob_offset),
        });
    }
    let blob = &blobs[blob_offset..blob_offset + blob_size];
    let prefix_len = stage.blob_prefix_len(directx).min(blob.len());

    Ok(Shader {
        stage,
        blob_prefix: blob[..prefix_len].to_vec(),
        bytecode: blob[prefix_len..].to_vec(),
        constants: read_resources(r, constant_count, strings)?,
        samplers: read_resources(r, sampler_count, strings)?,
        uavs: read_resources(r, uav_count, strings)?,
        textures: read_resources(r, texture_count, strings)?,
        disassembly: None,
    })
}

fn read_resources(r: &mut Reader, count: usize, strings: &StringPool) -> Result<Vec<Resource>> {
    let mut resources = Vec::with_capacity(count);
    for _ in 0..count {
        let id = r.read_u32()?;
        let name_offset = r.read_u32()? as usize;
        let _name_size = r.read_u32()?;
        resources.push(Resource {
            id,
            name: strings.resolve(name_offset)?,
            slot: r.read_u16()?,
            size: r.read_u16()?,
            used: None,
            used_dynamically: None,
        });
    }
    Ok(resources)
}
