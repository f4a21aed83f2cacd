//! Tests for the AVFX codec

use glam::Vec3;

use super::*;

/// Append one block (tag, logical size, padded payload) to `out`.
fn push_block(out: &mut Vec<u8>, tag: [u8; 4], payload: &[u8]) {
    out.extend_from_slice(&tag);
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    while out.len() % 4 != 0 {
        out.push(0);
    }
}

/// Wrap inner blocks in the outer AVFX block.
fn wrap(inner: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&AVFX_MAGIC);
    out.extend_from_slice(&(inner.len() as u32).to_le_bytes());
    out.extend_from_slice(inner);
    out
}

#[test]
fn test_version_and_textures() {
    // Version=3, two textures "a.tex" and "bb.tex".
    let mut inner = Vec::new();
    push_block(&mut inner, TAG_VERSION, &3u32.to_le_bytes());
    push_block(&mut inner, TAG_TEXTURE_COUNT, &2u32.to_le_bytes());
    push_block(&mut inner, TAG_TEXTURE, b"a.tex\0");
    push_block(&mut inner, TAG_TEXTURE, b"bb.tex\0");
    let data = wrap(&inner);

    let fx = Avfx::decode(&data).unwrap();
    assert_eq!(fx.version, Some(3));
    assert_eq!(fx.textures.len(), 2);
    assert_eq!(fx.textures[1], "bb.tex");

    // The re-encoded block sequence is byte-identical to the input.
    let encoded = fx.encode();
    assert_eq!(&encoded[8..], &data[8..]);
}

#[test]
fn test_bad_magic() {
    let data = wrap(&[]);
    let mut bad = data.clone();
    bad[0] = b'X';
    assert!(matches!(
        Avfx::decode(&bad),
        Err(crate::FormatError::InvalidMagic { .. })
    ));
}

#[test]
fn test_sentinel_reads_as_unset() {
    let mut inner = Vec::new();
    push_block(&mut inner, TAG_VERSION, &u32::MAX.to_le_bytes());
    push_block(&mut inner, TAG_FIT_GROUND, &[0xFF]);
    push_block(&mut inner, TAG_BIAS_Z_MAX_SCALE, &f32::NAN.to_le_bytes());
    let fx = Avfx::decode(&wrap(&inner)).unwrap();
    assert_eq!(fx.version, None);
    assert_eq!(fx.is_fit_ground, None);
    assert_eq!(fx.bias_z_max_scale, None);
}

#[test]
fn test_unset_fields_emit_no_block() {
    let fx = Avfx {
        version: Some(7),
        ..Default::default()
    };
    let encoded = fx.encode();
    // Outer header + exactly one 12-byte block.
    assert_eq!(encoded.len(), 8 + 12);
    assert_eq!(&encoded[8..12], &TAG_VERSION);

    // Setting a previously-unset field adds exactly one block.
    let fx2 = Avfx {
        version: Some(7),
        is_fit_ground: Some(true),
        ..Default::default()
    };
    let encoded2 = fx2.encode();
    assert_eq!(encoded2.len(), 8 + 12 + 12);
    let tags: Vec<&[u8]> = vec![&encoded2[8..12], &encoded2[20..24]];
    assert_eq!(tags, vec![&TAG_VERSION[..], &TAG_FIT_GROUND[..]]);
}

#[test]
fn test_vector_components_assemble() {
    let mut inner = Vec::new();
    push_block(&mut inner, TAG_CLIP_BOX_X, &1.0f32.to_le_bytes());
    push_block(&mut inner, TAG_CLIP_BOX_Y, &2.0f32.to_le_bytes());
    push_block(&mut inner, TAG_CLIP_BOX_Z, &3.0f32.to_le_bytes());
    let fx = Avfx::decode(&wrap(&inner)).unwrap();
    assert_eq!(fx.clip_box_position, Some(Vec3::new(1.0, 2.0, 3.0)));
}

#[test]
fn test_odd_payload_is_padded_but_logical_size_kept() {
    let mut inner = Vec::new();
    push_block(&mut inner, TAG_TEXTURE_COUNT, &1u32.to_le_bytes());
    push_block(&mut inner, TAG_TEXTURE, b"ab\0"); // 3 bytes, padded to 4
    let data = wrap(&inner);
    let fx = Avfx::decode(&data).unwrap();
    assert_eq!(fx.textures, ["ab"]);

    let encoded = fx.encode();
    // Logical size stays 3 even though 4 payload bytes are on disk.
    let size_field = &encoded[encoded.len() - 8..encoded.len() - 4];
    assert_eq!(size_field, &3u32.to_le_bytes());
}

#[test]
fn test_round_trip_full() {
    let fx = Avfx {
        version: Some(0x20110913),
        is_delay_fast_particle: Some(false),
        is_fit_ground: Some(true),
        can_be_clipped_out: Some(true),
        clip_box_position: Some(Vec3::new(0.0, 1.5, -2.0)),
        clip_box_size: Some(Vec3::splat(4.0)),
        bias_z_max_scale: Some(0.25),
        sort_key_offset: Some(-3),
        draw_layer: Some(2),
        schedulers: vec![vec![1, 2, 3, 4]],
        timelines: vec![vec![5, 6, 7, 8], vec![9, 10, 11, 12]],
        emitters: vec![vec![0; 16]],
        particles: vec![vec![1; 8]],
        textures: vec!["vfx/common/a.atex".into()],
        models: vec![vec![2; 4]],
        ..Default::default()
    };

    let decoded = Avfx::decode(&fx.encode()).unwrap();
    assert_eq!(decoded, fx);

    // Second generation is byte-stable.
    assert_eq!(decoded.encode(), fx.encode());
}

#[test]
fn test_unknown_blocks_are_skipped() {
    let mut inner = Vec::new();
    push_block(&mut inner, *b"XyZw", &[1, 2, 3, 4]);
    push_block(&mut inner, TAG_VERSION, &1u32.to_le_bytes());
    let fx = Avfx::decode(&wrap(&inner)).unwrap();
    assert_eq!(fx.version, Some(1));
}
