//! Deduplicated, offset-addressed string storage
//!
//! MDL, MTRL and SHPK all store their strings in one flat table of
//! NUL-terminated runs and reference them by byte offset. Each format uses
//! its own offset base (file-relative for MDL/MTRL, pool-relative for
//! SHPK); the pool itself only ever deals in pool-relative offsets.

use crate::error::{FormatError, Result};

/// Append-only buffer of NUL-terminated strings with exact-match dedup.
///
/// `intern` never stores the same byte sequence twice: looking up existing
/// content always returns the prior offset, so interning is idempotent and
/// the pool never grows on repeated identical calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringPool {
    data: Vec<u8>,
    starts: Vec<usize>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a pool from a decoded string table, recording a start offset
    /// at the beginning and after every NUL terminator.
    pub fn from_table(table: &[u8]) -> Self {
        let mut starts = Vec::new();
        let mut at_start = true;
        for (i, &b) in table.iter().enumerate() {
            if at_start {
                starts.push(i);
                at_start = false;
            }
            if b == 0 {
                at_start = true;
            }
        }
        Self {
            data: table.to_vec(),
            starts,
        }
    }

    /// Resolve an offset to the NUL-terminated string starting there.
    ///
    /// The offset does not have to be a recorded start; any position
    /// inside the buffer with a terminator ahead of it is valid.
    pub fn resolve(&self, offset: usize) -> Result<String> {
        if offset >= self.data.len() {
            return Err(FormatError::BadStringOffset {
                offset,
                table_len: self.data.len(),
            });
        }
        let run = &self.data[offset..];
        let end = run
            .iter()
            .position(|&b| b == 0)
            .ok_or(FormatError::MalformedString { offset })?;
        std::str::from_utf8(&run[..end])
            .map(str::to_owned)
            .map_err(|_| FormatError::MalformedString { offset })
    }

    /// Return the offset of `s`, appending it (plus terminator) if the
    /// exact content is not already present.
    pub fn intern(&mut self, s: &str) -> usize {
        let bytes = s.as_bytes();
        for &start in &self.starts {
            let candidate = &self.data[start..];
            if candidate.len() > bytes.len()
                && &candidate[..bytes.len()] == bytes
                && candidate[bytes.len()] == 0
            {
                return start;
            }
        }
        let start = self.data.len();
        self.data.extend_from_slice(bytes);
        self.data.push(0);
        self.starts.push(start);
        start
    }

    /// Entries in pool order as `(offset, string)` pairs.
    ///
    /// Entries with invalid UTF-8 are skipped; decoders that care resolve
    /// offsets individually and get the error.
    pub fn entries(&self) -> impl Iterator<Item = (usize, String)> + '_ {
        self.starts
            .iter()
            .filter_map(|&start| Some((start, self.resolve(start).ok()?)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_idempotent() {
        let mut pool = StringPool::new();
        let a = pool.intern("j_root");
        let b = pool.intern("mat_a");
        assert_eq!(pool.intern("j_root"), a);
        assert_eq!(pool.intern("mat_a"), b);
        assert_eq!(pool.len(), "j_root".len() + "mat_a".len() + 2);
    }

    #[test]
    fn test_exact_match_only() {
        let mut pool = StringPool::new();
        let long = pool.intern("material");
        // A prefix of an existing entry is a different string.
        let short = pool.intern("mat");
        assert_ne!(long, short);
        assert_eq!(pool.resolve(long).unwrap(), "material");
        assert_eq!(pool.resolve(short).unwrap(), "mat");
    }

    #[test]
    fn test_from_table_round_trip() {
        let mut pool = StringPool::new();
        pool.intern("a");
        pool.intern("bb");
        let reloaded = StringPool::from_table(pool.as_bytes());
        let entries: Vec<_> = reloaded.entries().map(|(_, s)| s).collect();
        assert_eq!(entries, ["a", "bb"]);
    }

    #[test]
    fn test_resolve_errors() {
        let pool = StringPool::from_table(b"abc\0");
        assert_eq!(pool.resolve(1).unwrap(), "bc");
        assert!(matches!(
            pool.resolve(10),
            Err(FormatError::BadStringOffset { .. })
        ));
        let unterminated = StringPool::from_table(b"abc");
        assert!(matches!(
            unterminated.resolve(0),
            Err(FormatError::MalformedString { .. })
        ));
    }
}
