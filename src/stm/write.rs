//! STM encoding

use super::table::DyeValue;
use super::*;
use crate::bytes::Writer;

pub(super) fn encode(stm: &Stm) -> Vec<u8> {
    let mut w = Writer::new();
    w.write_u32(stm.header);
    w.write_u32(stm.entries.len() as u32);
    for &key in stm.entries.keys() {
        w.write_u16(key);
    }

    // Entry bodies follow the offset table; byte-identical bodies are
    // shared, the same way the shipped file shares entries between
    // template ids.
    let mut bodies: Vec<u8> = Vec::new();
    let mut emitted: Vec<(usize, usize)> = Vec::new(); // (offset, len)
    for entry in stm.entries.values() {
        let body = encode_entry(entry);
        let offset = emitted
            .iter()
            .find(|&&(at, len)| bodies[at..at + len] == body[..])
            .map(|&(at, _)| at)
            .unwrap_or_else(|| {
                let at = bodies.len();
                bodies.extend_from_slice(&body);
                emitted.push((at, body.len()));
                at
            });
        w.write_u16((offset / 2) as u16);
    }
    w.write_bytes(&bodies);
    w.into_inner()
}

fn encode_entry(entry: &StainingTemplateEntry) -> Vec<u8> {
    let ranges = [
        encode_table(&entry.diffuse),
        encode_table(&entry.specular),
        encode_table(&entry.emissive),
        encode_table(&entry.gloss),
        encode_table(&entry.specular_power),
    ];

    // Cumulative end markers in 2-byte units, then the range bytes.
    let mut out = Vec::new();
    let mut end = 0u16;
    for range in &ranges {
        end += (range.len() / 2) as u16;
        out.extend_from_slice(&end.to_le_bytes());
    }
    for range in &ranges {
        out.extend_from_slice(range);
    }
    out
}

fn encode_table<T: DyeValue>(table: &DyeTable<T>) -> Vec<u8> {
    let mut out = Vec::new();
    match table {
        DyeTable::Repeating(value) if *value == T::default() => {}
        DyeTable::Repeating(value) => value.extend_bytes(&mut out),
        DyeTable::Direct(values) => {
            for value in values.iter() {
                value.extend_bytes(&mut out);
            }
        }
        DyeTable::Indexed { values, indices } => {
            for value in values {
                value.extend_bytes(&mut out);
            }
            out.extend_from_slice(&indices[..]);
        }
    }
    out
}
