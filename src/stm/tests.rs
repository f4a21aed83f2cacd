//! Tests for the STM codec

use glam::Vec3;
use half::f16;

use super::*;
use crate::error::FormatError;

fn triple(r: f32, g: f32, b: f32) -> DyeTriple {
    [f16::from_f32(r), f16::from_f32(g), f16::from_f32(b)]
}

/// Build a one-template file by hand: header, count, key/offset tables,
/// then the entry's five end markers and range bytes.
fn raw_stm(key: u16, ends: [u16; 5], ranges: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&101u32.to_le_bytes());
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&key.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    for end in ends {
        data.extend_from_slice(&end.to_le_bytes());
    }
    data.extend_from_slice(ranges);
    data
}

fn sample_stm() -> Stm {
    // Repeating diffuse, indexed specular, direct gloss.
    let mut specular = [triple(1.0, 1.0, 1.0); DYE_COUNT];
    for value in specular.iter_mut().skip(1).step_by(2) {
        *value = triple(0.5, 0.5, 0.5);
    }
    let mut gloss = [f16::ZERO; DYE_COUNT];
    for (i, value) in gloss.iter_mut().enumerate() {
        *value = f16::from_f32(i as f32);
    }

    let worn = StainingTemplateEntry {
        diffuse: DyeTable::from_values(&[triple(0.8, 0.2, 0.1); DYE_COUNT]),
        specular: DyeTable::from_values(&specular),
        emissive: DyeTable::default(),
        gloss: DyeTable::from_values(&gloss),
        specular_power: DyeTable::Repeating(f16::from_f32(20.0)),
    };

    let mut entries = BTreeMap::new();
    entries.insert(1000, worn);
    entries.insert(2000, StainingTemplateEntry::default());
    Stm {
        header: 101,
        entries,
    }
}

#[test]
fn test_round_trip() {
    let stm = sample_stm();
    let encoded = stm.encode();
    let decoded = Stm::decode(&encoded).unwrap();
    assert_eq!(decoded, stm);
    assert_eq!(decoded.encode(), encoded);
}

#[test]
fn test_density_selection() {
    let stm = sample_stm();
    let entry = &stm.entries[&1000];
    assert!(matches!(entry.diffuse, DyeTable::Repeating(_)));
    assert!(matches!(
        &entry.specular,
        DyeTable::Indexed { values, .. } if values.len() == 2
    ));
    assert!(matches!(entry.gloss, DyeTable::Direct(_)));
}

#[test]
fn test_length_one_list_repeats_for_every_index() {
    // Diffuse range of one triple (3 u16 units), all other lists empty.
    let mut ranges = Vec::new();
    for lane in triple(1.0, 0.5, 0.25) {
        ranges.extend_from_slice(&lane.to_le_bytes());
    }
    let stm = Stm::decode(&raw_stm(7, [3, 3, 3, 3, 3], &ranges)).unwrap();

    let expected = Vec3::new(1.0, 0.5, 0.25);
    for idx in 1..=DYE_COUNT {
        let dye = stm.dye(7, idx).unwrap();
        assert!((dye.diffuse - expected).abs().max_element() < 1e-3);
    }
    assert_eq!(stm.dye(7, 0).unwrap(), DyeValues::default());
    assert_eq!(stm.dye(7, 129).unwrap(), DyeValues::default());
}

#[test]
fn test_empty_entry_resolves_defaults() {
    let stm = Stm::decode(&raw_stm(7, [0; 5], &[])).unwrap();
    for idx in [0, 1, 64, 128, 129] {
        assert_eq!(stm.dye(7, idx).unwrap(), DyeValues::default());
    }
    assert_eq!(stm.dye(8, 1), None);
}

#[test]
fn test_list_of_129_elements_fails() {
    // 129 triples = 774 bytes = 387 u16 units; cannot be indexed either.
    let err = Stm::decode(&raw_stm(7, [387; 5], &vec![0; 774])).unwrap_err();
    assert_eq!(
        err,
        FormatError::DyeListTooLong {
            count: 129,
            max: DYE_COUNT,
        }
    );
}

#[test]
fn test_out_of_range_index_clamps_to_default() {
    // Gloss list: 2-value pool + 128 index bytes = 132 bytes = 66 units.
    let mut ranges = Vec::new();
    ranges.extend_from_slice(&f16::from_f32(2.0).to_le_bytes());
    ranges.extend_from_slice(&f16::from_f32(3.0).to_le_bytes());
    let mut indices = [0u8; DYE_COUNT];
    indices[0] = 1;
    indices[1] = 200; // past the pool
    indices[2] = 2;
    ranges.extend_from_slice(&indices);

    let stm = Stm::decode(&raw_stm(7, [0, 0, 0, 66, 66], &ranges)).unwrap();
    assert_eq!(stm.dye(7, 1).unwrap().gloss, 2.0);
    assert_eq!(stm.dye(7, 2).unwrap().gloss, 0.0);
    assert_eq!(stm.dye(7, 3).unwrap().gloss, 3.0);
}

#[test]
fn test_decreasing_end_markers_fail() {
    let err = Stm::decode(&raw_stm(7, [3, 2, 3, 3, 3], &vec![0; 6])).unwrap_err();
    assert_eq!(err, FormatError::BadDyeMarkers { prev: 3, next: 2 });
}

#[test]
fn test_identical_entries_share_one_body() {
    let mut stm = sample_stm();
    let worn = stm.entries[&1000].clone();
    stm.entries.insert(2000, worn);
    let encoded = stm.encode();

    // Both offsets point at the same body.
    let first = u16::from_le_bytes([encoded[12], encoded[13]]);
    let second = u16::from_le_bytes([encoded[14], encoded[15]]);
    assert_eq!(first, second);

    let decoded = Stm::decode(&encoded).unwrap();
    assert_eq!(decoded.entries[&1000], decoded.entries[&2000]);
}

#[test]
fn test_truncated_input_fails() {
    let encoded = sample_stm().encode();
    assert!(matches!(
        Stm::decode(&encoded[..10]),
        Err(FormatError::UnexpectedEof { .. })
    ));
}
