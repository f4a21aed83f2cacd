//! Tests for the SHPK codec

use super::resources::crc32;
use super::*;
use crate::error::FormatError;

/// Canned disassembler: hands back a fixed result regardless of the
/// bytecode it is shown.
struct Canned(Disassembly);

impl Disassembler for Canned {
    fn disassemble(&self, _bytecode: &[u8]) -> crate::Result<Disassembly> {
        Ok(self.0.clone())
    }
}

fn constant_binding(name: &str, register_count: u16) -> Binding {
    Binding {
        kind: BindingKind::Constant,
        name: name.into(),
        slot: 0,
        register_count,
        used: 0x000F,
        used_dynamically: 0,
    }
}

fn sample_package() -> ShaderPackage {
    ShaderPackage {
        version: 0x0D01,
        directx: DxVersion::Dx11,
        vertex_shaders: vec![Shader {
            stage: Stage::Vertex,
            blob_prefix: vec![1, 2, 3, 4, 5, 6, 7, 8],
            bytecode: vec![0xAA; 24],
            constants: vec![Resource {
                id: 0x1111,
                name: "g_CameraParameter".into(),
                slot: 0,
                size: 4,
                used: None,
                used_dynamically: None,
            }],
            ..Default::default()
        }],
        pixel_shaders: vec![Shader {
            stage: Stage::Pixel,
            blob_prefix: Vec::new(),
            bytecode: vec![0xBB; 16],
            samplers: vec![Resource {
                id: 0x2222,
                name: "g_SamplerNormal".into(),
                slot: 1,
                size: 1,
                used: None,
                used_dynamically: None,
            }],
            ..Default::default()
        }],
        material_params_size: 32,
        material_params: vec![MaterialParam {
            id: crc32(b"g_DiffuseColor"),
            byte_offset: 0,
            byte_size: 12,
        }],
        constants: vec![Resource {
            id: 0x1111,
            name: "g_CameraParameter".into(),
            slot: 65535,
            size: 4,
            used: None,
            used_dynamically: None,
        }],
        samplers: Vec::new(),
        uavs: Vec::new(),
    }
}

#[test]
fn test_round_trip() {
    let package = sample_package();
    let encoded = package.encode();
    let decoded = ShaderPackage::decode(&encoded).unwrap();
    assert_eq!(decoded, package);
    assert_eq!(decoded.encode(), encoded);
}

#[test]
fn test_header_validation() {
    let encoded = sample_package().encode();

    let mut bad_magic = encoded.clone();
    bad_magic[0] = b'X';
    assert!(matches!(
        ShaderPackage::decode(&bad_magic),
        Err(FormatError::InvalidMagic { .. })
    ));

    let mut bad_dx = encoded.clone();
    bad_dx[8..12].copy_from_slice(b"DX12");
    assert!(matches!(
        ShaderPackage::decode(&bad_dx),
        Err(FormatError::UnknownDirectXMagic(_))
    ));

    let mut truncated = encoded.clone();
    truncated.pop();
    assert!(matches!(
        ShaderPackage::decode(&truncated),
        Err(FormatError::FileSizeMismatch { .. })
    ));
}

#[test]
fn test_blob_prefix_split() {
    // DX11 vertex blobs carry an 8-byte prefix, pixel blobs none.
    let decoded = ShaderPackage::decode(&sample_package().encode()).unwrap();
    assert_eq!(decoded.vertex_shaders[0].blob_prefix.len(), 8);
    assert_eq!(decoded.vertex_shaders[0].bytecode, vec![0xAA; 24]);
    assert!(decoded.pixel_shaders[0].blob_prefix.is_empty());

    // DX9 vertex blobs carry 4 bytes.
    let mut dx9 = sample_package();
    dx9.directx = DxVersion::Dx9;
    dx9.vertex_shaders[0].blob_prefix = vec![1, 2, 3, 4];
    let decoded = ShaderPackage::decode(&dx9.encode()).unwrap();
    assert_eq!(decoded.vertex_shaders[0].blob_prefix, vec![1, 2, 3, 4]);
}

#[test]
fn test_stage_mismatch_rejected() {
    let canned = Canned(Disassembly {
        stage: Stage::Pixel,
        shader_model: (5, 0),
        bindings: Vec::new(),
    });
    let mut package = sample_package();
    let err = package.vertex_shaders[0]
        .disassemble(DxVersion::Dx11, &canned)
        .unwrap_err();
    assert_eq!(
        err,
        FormatError::StageMismatch {
            declared: "vertex",
            found: "pixel",
        }
    );
    assert!(package.vertex_shaders[0].disassembly.is_none());

    // decode_with still succeeds structurally.
    let decoded = ShaderPackage::decode_with(&package.encode(), &canned).unwrap();
    assert!(decoded.vertex_shaders[0].disassembly.is_none());
    assert!(decoded.pixel_shaders[0].disassembly.is_some());
}

#[test]
fn test_rejected_blob_leaves_shader_unchanged() {
    let wrong_stage = Canned(Disassembly {
        stage: Stage::Pixel,
        shader_model: (5, 0),
        bindings: Vec::new(),
    });
    let mut package = sample_package();
    let shader = &mut package.vertex_shaders[0];
    let before = shader.clone();

    let err = shader
        .set_blob(&[0xCC; 24], DxVersion::Dx11, Some(&wrong_stage))
        .unwrap_err();
    assert!(matches!(err, FormatError::StageMismatch { .. }));
    // The rejected bytecode is not stored; the prior blob survives.
    assert_eq!(*shader, before);

    // A blob the disassembler accepts replaces it and keeps the result.
    let right_stage = Canned(Disassembly {
        stage: Stage::Vertex,
        shader_model: (5, 0),
        bindings: Vec::new(),
    });
    shader
        .set_blob(&[0xCC; 24], DxVersion::Dx11, Some(&right_stage))
        .unwrap();
    assert_eq!(shader.blob_prefix, vec![0xCC; 8]);
    assert_eq!(shader.bytecode, vec![0xCC; 16]);
    assert!(shader.disassembly.is_some());
}

#[test]
fn test_shader_model_mismatch_rejected() {
    let canned = Canned(Disassembly {
        stage: Stage::Vertex,
        shader_model: (3, 0),
        bindings: Vec::new(),
    });
    let mut package = sample_package();
    let err = package.vertex_shaders[0]
        .disassemble(DxVersion::Dx11, &canned)
        .unwrap_err();
    assert_eq!(
        err,
        FormatError::ShaderModelMismatch {
            declared: "DX11",
            major: 3,
            minor: 0,
        }
    );
}

#[test]
fn test_sampler_texture_slots_must_match_on_sm5() {
    let mut bindings = vec![
        Binding {
            kind: BindingKind::Sampler,
            name: "g_SamplerNormal_S".into(),
            slot: 0,
            register_count: 1,
            used: 1,
            used_dynamically: 0,
        },
        Binding {
            kind: BindingKind::Texture,
            name: "g_SamplerNormal_T".into(),
            slot: 3,
            register_count: 1,
            used: 1,
            used_dynamically: 0,
        },
    ];
    let canned = Canned(Disassembly {
        stage: Stage::Pixel,
        shader_model: (5, 0),
        bindings: bindings.clone(),
    });
    let mut package = sample_package();
    let err = package.pixel_shaders[0]
        .disassemble(DxVersion::Dx11, &canned)
        .unwrap_err();
    assert!(matches!(err, FormatError::SamplerTextureMismatch { .. }));

    // Matching slot sets pass.
    bindings[1].slot = 0;
    let canned = Canned(Disassembly {
        stage: Stage::Pixel,
        shader_model: (5, 0),
        bindings,
    });
    package.pixel_shaders[0]
        .disassemble(DxVersion::Dx11, &canned)
        .unwrap();
    assert!(package.pixel_shaders[0].disassembly.is_some());
}

#[test]
fn test_update_resources_merges_constants() {
    // Both stages reference g_Foo with different register counts: the
    // package ends up with exactly one entry sized to the larger count.
    let mut package = sample_package();
    package.constants.clear();
    package.vertex_shaders[0].constants.clear();
    package.vertex_shaders[0].disassembly = Some(Disassembly {
        stage: Stage::Vertex,
        shader_model: (5, 0),
        bindings: vec![constant_binding("g_Foo", 4)],
    });
    package.pixel_shaders[0].disassembly = Some(Disassembly {
        stage: Stage::Pixel,
        shader_model: (5, 0),
        bindings: vec![constant_binding("g_Foo", 7)],
    });

    package.update_resources();

    let matching: Vec<_> = package
        .constants
        .iter()
        .filter(|c| c.name == "g_Foo")
        .collect();
    assert_eq!(matching.len(), 1);
    assert_eq!(matching[0].size, 7);
    assert_eq!(matching[0].slot, 65535);
    assert_eq!(matching[0].id, crc32(b"g_Foo"));
    // Both shaders resolved the name to the same id.
    assert_eq!(
        package.vertex_shaders[0].constants[0].id,
        package.pixel_shaders[0].constants[0].id
    );
}

#[test]
fn test_update_resources_ids_are_stable() {
    let mut package = sample_package();
    package.vertex_shaders[0].disassembly = Some(Disassembly {
        stage: Stage::Vertex,
        shader_model: (5, 0),
        bindings: vec![
            constant_binding("g_CameraParameter", 4),
            constant_binding("g_Foo.0", 2),
        ],
    });

    package.update_resources();
    let first: Vec<u32> = package.vertex_shaders[0]
        .constants
        .iter()
        .map(|c| c.id)
        .collect();
    // Prior name keeps its prior id; the swizzle suffix is stripped
    // before hashing the new one.
    assert_eq!(first[0], 0x1111);
    assert_eq!(first[1], crc32(b"g_Foo"));

    package.update_resources();
    let second: Vec<u32> = package.vertex_shaders[0]
        .constants
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(first, second);
}

#[test]
fn test_update_used_unions_masks() {
    let mut package = sample_package();
    package.vertex_shaders[0].constants[0].used = Some(0x0003);
    package.vertex_shaders[0].constants[0].used_dynamically = Some(0x0001);
    package.pixel_shaders[0].constants = vec![Resource {
        id: 0x1111,
        name: "g_CameraParameter".into(),
        slot: 0,
        size: 4,
        used: Some(0x000C),
        used_dynamically: Some(0),
    }];
    package.samplers = vec![Resource {
        id: 0x9999,
        name: "g_SamplerUnseen".into(),
        slot: 2,
        size: 1,
        used: Some(1),
        used_dynamically: Some(1),
    }];

    package.update_used();

    assert_eq!(package.constants[0].used, Some(0x000F));
    assert_eq!(package.constants[0].used_dynamically, Some(0x0001));
    // No disassembled shader references this id: unknown, not zero.
    assert_eq!(package.samplers[0].used, None);
    assert_eq!(package.samplers[0].used_dynamically, None);
}
