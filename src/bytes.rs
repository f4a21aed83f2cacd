//! Little-endian byte plumbing shared by all codecs
//!
//! `Reader` wraps a borrowed slice with a cursor and typed reads that fail
//! with positional context instead of panicking. `Writer` grows a `Vec<u8>`
//! and supports back-patching, which is how the header-after-body formats
//! (MDL, MTRL, SHPK) are written without real file seeking.

use half::f16;

use crate::error::{FormatError, Result};

/// Round `n` up to the next multiple of 4.
#[inline]
pub const fn round_up4(n: usize) -> usize {
    (n + 3) & !3
}

/// Cursor over a borrowed byte slice.
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current cursor position in bytes.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left between the cursor and the end of the slice.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Borrow `n` bytes and advance. All typed reads go through here.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(FormatError::UnexpectedEof {
                offset: self.pos,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Advance without looking at the bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.take(n).map(|_| ())
    }

    /// Everything from the cursor to the end of the slice.
    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos..];
        self.pos = self.data.len();
        slice
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    pub fn read_f16(&mut self) -> Result<f16> {
        Ok(f16::from_bits(self.read_u16()?))
    }

    /// Read a 4-byte FourCC tag.
    pub fn read_tag(&mut self) -> Result<[u8; 4]> {
        let b = self.take(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }
}

/// Growable little-endian output buffer.
#[derive(Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_f16(&mut self, v: f16) {
        self.write_u16(v.to_bits());
    }

    pub fn write_tag(&mut self, tag: [u8; 4]) {
        self.buf.extend_from_slice(&tag);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Overwrite 2 bytes at `at` with `v`. `at + 2` must already be written.
    pub fn patch_u16(&mut self, at: usize, v: u16) {
        self.buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
    }

    /// Overwrite 4 bytes at `at` with `v`. `at + 4` must already be written.
    pub fn patch_u32(&mut self, at: usize, v: u32) {
        self.buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
    }

    /// Overwrite `bytes.len()` bytes at `at`. The range must already be
    /// written.
    pub fn patch_bytes(&mut self, at: usize, bytes: &[u8]) {
        self.buf[at..at + bytes.len()].copy_from_slice(bytes);
    }

    /// Pad with `fill` until the length is a multiple of `align`.
    pub fn align_to(&mut self, align: usize, fill: u8) {
        while self.buf.len() % align != 0 {
            self.buf.push(fill);
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_eof_context() {
        let mut r = Reader::new(&[1, 2, 3]);
        r.read_u8().unwrap();
        let err = r.read_u32().unwrap_err();
        assert_eq!(
            err,
            FormatError::UnexpectedEof {
                offset: 1,
                needed: 4,
                remaining: 2,
            }
        );
    }

    #[test]
    fn test_typed_round_trip() {
        let mut w = Writer::new();
        w.write_u16(0xBEEF);
        w.write_u32(0xDEADBEEF);
        w.write_f32(1.5);
        w.write_f16(f16::from_f32(0.25));
        let bytes = w.into_inner();

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_u16().unwrap(), 0xBEEF);
        assert_eq!(r.read_u32().unwrap(), 0xDEADBEEF);
        assert_eq!(r.read_f32().unwrap(), 1.5);
        assert_eq!(r.read_f16().unwrap(), f16::from_f32(0.25));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_patch_and_align() {
        let mut w = Writer::new();
        w.write_u32(0);
        w.write_u8(7);
        w.align_to(4, 0xAA);
        w.patch_u32(0, w.len() as u32);
        let bytes = w.into_inner();
        assert_eq!(bytes, [8, 0, 0, 0, 7, 0xAA, 0xAA, 0xAA]);
    }

    #[test]
    fn test_finite_f16_bits_survive_f32_round_trip() {
        for bits in 0..=u16::MAX {
            let h = f16::from_bits(bits);
            if h.is_finite() {
                assert_eq!(f16::from_f32(h.to_f32()).to_bits(), bits);
            }
        }
    }

    #[test]
    fn test_round_up4() {
        assert_eq!(round_up4(0), 0);
        assert_eq!(round_up4(1), 4);
        assert_eq!(round_up4(4), 4);
        assert_eq!(round_up4(5), 8);
    }
}
