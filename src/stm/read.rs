//! STM decoding

use std::collections::BTreeMap;

use super::table::DyeValue;
use super::*;
use crate::bytes::Reader;
use crate::error::{FormatError, Result};

pub(super) fn decode(data: &[u8]) -> Result<Stm> {
    let mut r = Reader::new(data);

    let header = r.read_u32()?;
    let count = r.read_u32()? as usize;

    let mut keys = Vec::with_capacity(count);
    for _ in 0..count {
        keys.push(r.read_u16()?);
    }
    let mut offsets = Vec::with_capacity(count);
    for _ in 0..count {
        offsets.push(r.read_u16()? as usize);
    }

    // Entry offsets are in 2-byte units past the end of the offset table.
    let base = r.position();
    let mut entries = BTreeMap::new();
    for (&key, &offset) in keys.iter().zip(&offsets) {
        let start = base + offset * 2;
        if start > data.len() {
            return Err(FormatError::UnexpectedEof {
                offset: base,
                needed: offset * 2,
                remaining: data.len() - base,
            });
        }
        entries.insert(key, read_entry(&data[start..])?);
    }

    tracing::debug!(templates = entries.len(), "decoded STM");

    Ok(Stm { header, entries })
}

/// Decode one entry from the start of `data`. Entries may overlap or be
/// shared between templates; each is carved out independently by its end
/// markers.
fn read_entry(data: &[u8]) -> Result<StainingTemplateEntry> {
    let mut r = Reader::new(data);

    // Five cumulative end markers in 2-byte units, measured past the
    // marker block itself.
    let mut ends = [0usize; 5];
    for end in &mut ends {
        *end = r.read_u16()? as usize;
    }

    let mut ranges: [&[u8]; 5] = [&[]; 5];
    let mut prev = 0;
    for (range, &end) in ranges.iter_mut().zip(&ends) {
        if end < prev {
            return Err(FormatError::BadDyeMarkers { prev, next: end });
        }
        *range = r.take((end - prev) * 2)?;
        prev = end;
    }

    Ok(StainingTemplateEntry {
        diffuse: read_table(ranges[0])?,
        specular: read_table(ranges[1])?,
        emissive: read_table(ranges[2])?,
        gloss: read_table(ranges[3])?,
        specular_power: read_table(ranges[4])?,
    })
}

/// Decode one list from its byte range. The logical element count picks
/// the storage layout: 0 repeats the default, 1 repeats the stored
/// value, 128 is direct, anything else must parse as pool-plus-indices.
fn read_table<T: DyeValue>(bytes: &[u8]) -> Result<DyeTable<T>> {
    match bytes.len() / T::SIZE {
        0 => Ok(DyeTable::Repeating(T::default())),
        1 => Ok(DyeTable::Repeating(T::from_bytes(bytes))),
        DYE_COUNT => {
            let mut values = Box::new([T::default(); DYE_COUNT]);
            for (i, value) in values.iter_mut().enumerate() {
                *value = T::from_bytes(&bytes[i * T::SIZE..]);
            }
            Ok(DyeTable::Direct(values))
        }
        count => {
            if bytes.len() > DYE_COUNT && (bytes.len() - DYE_COUNT) % T::SIZE == 0 {
                let pool_len = (bytes.len() - DYE_COUNT) / T::SIZE;
                if (1..=INDEXED_POOL_MAX).contains(&pool_len) {
                    return read_indexed(bytes, pool_len);
                }
            }
            if count > DYE_COUNT {
                Err(FormatError::DyeListTooLong {
                    count,
                    max: DYE_COUNT,
                })
            } else {
                Err(FormatError::BadDyeRange {
                    bytes: bytes.len(),
                    elem_size: T::SIZE,
                })
            }
        }
    }
}

fn read_indexed<T: DyeValue>(bytes: &[u8], pool_len: usize) -> Result<DyeTable<T>> {
    let mut values = Vec::with_capacity(pool_len);
    for i in 0..pool_len {
        values.push(T::from_bytes(&bytes[i * T::SIZE..]));
    }
    let mut indices = Box::new([0u8; DYE_COUNT]);
    indices.copy_from_slice(&bytes[pool_len * T::SIZE..pool_len * T::SIZE + DYE_COUNT]);
    // An index byte past the pool is normalized to the default, not an
    // error; the game tolerates these.
    for index in indices.iter_mut() {
        if *index as usize > pool_len {
            tracing::trace!(index = *index, pool_len, "clamping out-of-range dye index");
            *index = 0;
        }
    }
    Ok(DyeTable::Indexed { values, indices })
}
