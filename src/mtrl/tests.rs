//! Tests for the MTRL codec

use glam::{Vec2, Vec3};

use super::*;
use crate::error::FormatError;

fn sample_mtrl() -> Mtrl {
    let mut rows = [ColorSetRow::default(); COLOR_SET_ROW_COUNT];
    rows[0].set_diffuse(Vec3::new(1.0, 0.5, 0.0));
    rows[0].set_specular(Vec3::ONE);
    rows[0].set_gloss(20.0);
    rows[0].set_tile_set(5);
    rows[0].set_material_repeat(Vec2::splat(16.0));

    let mut dyes = [DyeSetRow::default(); COLOR_SET_ROW_COUNT];
    dyes[0].set_template(17);
    dyes[0].set_dyes_diffuse(true);

    Mtrl {
        version: 0x0103_0000,
        textures: vec![
            Texture {
                path: "common/tex/a.tex".into(),
                flags: 0,
            },
            Texture {
                path: "common/tex/n.tex".into(),
                flags: 0x8000,
            },
        ],
        uv_sets: vec![UvSet {
            name: "uv0".into(),
            index: 0,
        }],
        color_sets: vec![ColorSet {
            name: "cs0".into(),
            index: 0,
        }],
        additional_data: vec![1, 2, 3, 4],
        color_set_rows: Some(rows),
        dye_set_rows: Some(dyes),
        shader_package_name: "character.shpk".into(),
        shader_keys: vec![ShaderKey {
            category: 0xB616_DC5A,
            value: 1,
        }],
        constants: vec![Constant {
            id: 0x2C2A_34DD,
            offset: 0,
            size: 12,
        }],
        samplers: vec![Sampler {
            id: 0x0C5E_C1F1,
            flags: 0x0001_D000,
            texture_index: 0,
        }],
        shader_values: vec![1.0, 0.5, 0.25],
        flags: 0x11,
    }
}

#[test]
fn test_round_trip() {
    let mtrl = sample_mtrl();
    let encoded = mtrl.encode();
    let decoded = Mtrl::decode(&encoded).unwrap();
    assert_eq!(decoded, mtrl);
    assert_eq!(decoded.encode(), encoded);
}

#[test]
fn test_diffuse_survives_half_precision() {
    // A written diffuse reads back within half-float precision.
    let encoded = sample_mtrl().encode();
    let decoded = Mtrl::decode(&encoded).unwrap();
    let diffuse = decoded.color_set_rows.unwrap()[0].diffuse();
    let expected = Vec3::new(1.0, 0.5, 0.0);
    assert!((diffuse - expected).abs().max_element() < 1e-3);
}

#[test]
fn test_descriptor_offsets_are_cumulative() {
    let encoded = sample_mtrl().encode();

    // Table content order: textures, UV sets, color sets, shader name.
    // "common/tex/a.tex\0" is 17 bytes, "common/tex/n.tex\0" 17,
    // "uv0\0" 4, "cs0\0" 4.
    let shader_name_offset = u16::from_le_bytes([encoded[10], encoded[11]]);
    assert_eq!(shader_name_offset, 17 + 17 + 4 + 4);

    let texture1_offset = u16::from_le_bytes([encoded[16], encoded[17]]);
    let texture2_offset = u16::from_le_bytes([encoded[20], encoded[21]]);
    assert_eq!(texture1_offset, 0);
    assert_eq!(texture2_offset, 17);
}

#[test]
fn test_file_size_is_patched() {
    let encoded = sample_mtrl().encode();
    let file_size = u16::from_le_bytes([encoded[4], encoded[5]]);
    assert_eq!(file_size as usize, encoded.len());
}

#[test]
fn test_rows_are_optional() {
    let mut mtrl = sample_mtrl();
    mtrl.dye_set_rows = None;
    let decoded = Mtrl::decode(&mtrl.encode()).unwrap();
    assert!(decoded.color_set_rows.is_some());
    assert!(decoded.dye_set_rows.is_none());

    mtrl.color_set_rows = None;
    let decoded = Mtrl::decode(&mtrl.encode()).unwrap();
    assert!(decoded.color_set_rows.is_none());
    // Declared data set size is zero without the row block.
    assert_eq!(&mtrl.encode()[6..8], &[0, 0]);
}

#[test]
fn test_tile_set_round_trips() {
    let mut row = ColorSetRow::default();
    for index in [0u16, 1, 5, 63, 64, 500, 1023] {
        row.set_tile_set(index);
        let back = row.tile_set();
        assert!(back.abs_diff(index) <= 1, "index {index} read as {back}");
    }
}

#[test]
fn test_dye_row_bitfield() {
    let mut row = DyeSetRow::default();
    row.set_template(0x7FF);
    row.set_dyes_gloss(true);
    row.set_dyes_specular_strength(true);
    assert_eq!(row.template(), 0x7FF);
    assert!(row.dyes_gloss());
    assert!(row.dyes_specular_strength());
    assert!(!row.dyes_diffuse());

    // Template and flags do not bleed into each other.
    row.set_template(0);
    assert!(row.dyes_gloss());
    row.set_dyes_gloss(false);
    row.set_template(42);
    assert_eq!(row.template(), 42);
    assert_eq!(row.0, 42 << 5 | 0x10);
}

#[test]
fn test_untouched_row_bytes_survive() {
    // Decode then encode leaves lanes bit-identical even when they hold
    // values a float pass would re-round.
    let mut mtrl = sample_mtrl();
    let mut rows = mtrl.color_set_rows.unwrap();
    rows[3].0 = [0xA5; 32];
    mtrl.color_set_rows = Some(rows);
    let decoded = Mtrl::decode(&mtrl.encode()).unwrap();
    assert_eq!(decoded.color_set_rows.unwrap()[3].0, [0xA5; 32]);
}

#[test]
fn test_truncated_input_fails() {
    let encoded = sample_mtrl().encode();
    assert!(matches!(
        Mtrl::decode(&encoded[..20]),
        Err(FormatError::UnexpectedEof { .. })
    ));
}

#[test]
fn test_bad_string_offset_fails() {
    let mut encoded = sample_mtrl().encode();
    // Point the shader name past the string table.
    encoded[10] = 0xFF;
    encoded[11] = 0x7F;
    assert!(matches!(
        Mtrl::decode(&encoded),
        Err(FormatError::BadStringOffset { .. })
    ));
}
