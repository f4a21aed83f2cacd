//! SHPK encoding

use super::types::*;
use super::*;
use crate::bytes::Writer;
use crate::strings::StringPool;

pub(super) fn encode(package: &ShaderPackage) -> Vec<u8> {
    let mut w = Writer::new();
    let mut blobs = Writer::new();
    let mut pool = StringPool::new();

    w.write_tag(SHPK_MAGIC);
    w.write_u32(package.version);
    w.write_tag(package.directx.magic());
    w.write_u32(0); // file size, patched below
    w.write_u32(0); // blob region offset, patched below
    w.write_u32(0); // string region offset, patched below
    w.write_u32(package.vertex_shaders.len() as u32);
    w.write_u32(package.pixel_shaders.len() as u32);
    w.write_u32(package.material_params_size);
    w.write_u32(package.material_params.len() as u32);
    w.write_u32(package.constants.len() as u32);
    w.write_u32(package.samplers.len() as u32);
    w.write_u32(package.uavs.len() as u32);
    debug_assert_eq!(w.len(), HEADER_SIZE);

    for shader in package
        .vertex_shaders
        .iter()
        .chain(package.pixel_shaders.iter())
    {
        write_shader(&mut w, &mut blobs, &mut pool, shader);
    }

    for param in &package.material_params {
        w.write_u32(param.id);
        w.write_u16(param.byte_offset);
        w.write_u16(param.byte_size);
    }
    write_resources(&mut w, &mut pool, &package.constants);
    write_resources(&mut w, &mut pool, &package.samplers);
    write_resources(&mut w, &mut pool, &package.uavs);

    let blobs_offset = w.len();
    w.write_bytes(&blobs.into_inner());
    let strings_offset = w.len();
    w.write_bytes(pool.as_bytes());

    w.patch_u32(12, w.len() as u32);
    w.patch_u32(16, blobs_offset as u32);
    w.patch_u32(20, strings_offset as u32);
    w.into_inner()
}

fn write_shader(w: &mut Writer, blobs: &mut Writer, pool: &mut StringPool, shader: &Shader) {
    w.write_u32(blobs.len() as u32);
    w.write_u32((shader.blob_prefix.len() + shader.bytecode.len()) as u32);
    blobs.write_bytes(&shader.blob_prefix);
    blobs.write_bytes(&shader.bytecode);

    w.write_u16(shader.constants.len() as u16);
    w.write_u16(shader.samplers.len() as u16);
    w.write_u16(shader.uavs.len() as u16);
    w.write_u16(shader.textures.len() as u16);
    write_resources(w, pool, &shader.constants);
    write_resources(w, pool, &shader.samplers);
    write_resources(w, pool, &shader.uavs);
    write_resources(w, pool, &shader.textures);
}

fn write_resources(w: &mut Writer, pool: &mut StringPool, resources: &[Resource]) {
    for resource in resources {
        w.write_u32(resource.id);
        w.write_u32(pool.intern(&resource.name) as u32);
        w.write_u32(resource.name.len() as u32);
        w.write_u16(resource.slot);
        w.write_u16(resource.size);
    }
}
