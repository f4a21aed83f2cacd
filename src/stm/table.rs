//! Variable-density dye lists
//!
//! Every list in a staining template has 128 logical entries, but the
//! format stores each one in whichever of three layouts is smallest:
//! one value repeated, all 128 values, or a small value pool plus one
//! index byte per entry.

use half::f16;

use super::{DYE_COUNT, INDEXED_POOL_MAX};

/// Element stored in a dye list: a binary16 scalar or triple.
pub trait DyeValue: Copy + Default + PartialEq {
    /// On-disk element size in bytes.
    const SIZE: usize;

    /// Decode one element from its first `SIZE` bytes.
    fn from_bytes(bytes: &[u8]) -> Self;

    /// Append the element's `SIZE` bytes to `out`.
    fn extend_bytes(&self, out: &mut Vec<u8>);
}

impl DyeValue for f16 {
    const SIZE: usize = 2;

    fn from_bytes(bytes: &[u8]) -> Self {
        f16::from_le_bytes([bytes[0], bytes[1]])
    }

    fn extend_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

/// RGB triple of binary16 lanes.
pub type DyeTriple = [f16; 3];

impl DyeValue for DyeTriple {
    const SIZE: usize = 6;

    fn from_bytes(bytes: &[u8]) -> Self {
        [
            f16::from_le_bytes([bytes[0], bytes[1]]),
            f16::from_le_bytes([bytes[2], bytes[3]]),
            f16::from_le_bytes([bytes[4], bytes[5]]),
        ]
    }

    fn extend_bytes(&self, out: &mut Vec<u8>) {
        for lane in self {
            out.extend_from_slice(&lane.to_le_bytes());
        }
    }
}

/// One dye list: 128 logical entries in one of three storage layouts.
///
/// Dye indices run 1..=128; index 0 and anything past 128 resolve to the
/// element default. In `Indexed` storage, index byte 0 is reserved for
/// the default and byte `k` selects `values[k - 1]`, so the pool holds at
/// most 127 values.
#[derive(Debug, Clone, PartialEq)]
pub enum DyeTable<T> {
    /// One value (or the default) standing in for every entry.
    Repeating(T),
    /// All 128 values stored.
    Direct(Box<[T; DYE_COUNT]>),
    /// Value pool plus one index byte per entry.
    Indexed {
        values: Vec<T>,
        indices: Box<[u8; DYE_COUNT]>,
    },
}

impl<T: Default> Default for DyeTable<T> {
    fn default() -> Self {
        Self::Repeating(T::default())
    }
}

impl<T: DyeValue> DyeTable<T> {
    /// Value at `dye_index`. Total: 0 and anything past 128 yield the
    /// default, as does an index byte pointing outside the pool.
    pub fn get(&self, dye_index: usize) -> T {
        if dye_index == 0 || dye_index > DYE_COUNT {
            return T::default();
        }
        match self {
            Self::Repeating(value) => *value,
            Self::Direct(values) => values[dye_index - 1],
            Self::Indexed { values, indices } => match indices[dye_index - 1] as usize {
                0 => T::default(),
                k => values.get(k - 1).copied().unwrap_or_default(),
            },
        }
    }

    /// Pick the densest storage for 128 concrete values.
    pub fn from_values(values: &[T; DYE_COUNT]) -> Self {
        let first = values[0];
        if values.iter().all(|v| *v == first) {
            return Self::Repeating(first);
        }
        let mut pool: Vec<T> = Vec::new();
        let mut indices = Box::new([0u8; DYE_COUNT]);
        for (slot, value) in indices.iter_mut().zip(values.iter()) {
            if *value == T::default() {
                continue;
            }
            let at = match pool.iter().position(|p| p == value) {
                Some(at) => at,
                None if pool.len() == INDEXED_POOL_MAX => {
                    return Self::Direct(Box::new(*values));
                }
                None => {
                    pool.push(*value);
                    pool.len() - 1
                }
            };
            *slot = (at + 1) as u8;
        }
        if pool.len() * T::SIZE + DYE_COUNT < DYE_COUNT * T::SIZE {
            Self::Indexed {
                values: pool,
                indices,
            }
        } else {
            Self::Direct(Box::new(*values))
        }
    }
}
