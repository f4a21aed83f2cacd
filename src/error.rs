//! Codec error types
//!
//! Every decode failure is fatal: a codec either returns a fully populated
//! value or one of these errors. There is no partial recovery.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, FormatError>;

/// Errors raised by the format codecs.
///
/// Variants fall into three groups:
/// - format errors: bad magic, bad version, a size field disagreeing with
///   the buffer,
/// - truncation: fewer bytes available than a fixed-length read requires,
/// - integrity errors: a domain invariant violated by otherwise
///   well-framed data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A magic number did not match.
    #[error("invalid magic: expected {expected:?}, found {found:?}")]
    InvalidMagic { expected: [u8; 4], found: [u8; 4] },

    /// A DirectX version magic was neither of the two recognized values.
    #[error("unrecognized DirectX magic {0:?}")]
    UnknownDirectXMagic([u8; 4]),

    /// A declared total file size disagrees with the buffer length.
    #[error("declared file size {declared} does not match buffer length {actual}")]
    FileSizeMismatch { declared: usize, actual: usize },

    /// Fewer bytes available than a fixed-length read requires.
    #[error("unexpected end of data at offset {offset}: needed {needed} bytes, {remaining} left")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    /// An MDL buffer offset lane is smaller than the declared runtime
    /// size it should include.
    #[error("buffer offset {offset} is smaller than runtime size {runtime_size}")]
    BadBufferOffset { offset: u32, runtime_size: u32 },

    /// A string table offset points outside the table.
    #[error("string offset {offset} out of range (table is {table_len} bytes)")]
    BadStringOffset { offset: usize, table_len: usize },

    /// A string table run is not valid UTF-8 or is missing its terminator.
    #[error("malformed string at table offset {offset}")]
    MalformedString { offset: usize },

    /// An STM list range does not fit any of the three storage modes.
    #[error("dye template list of {bytes} bytes is not a valid {elem_size}-byte-element range")]
    BadDyeRange { bytes: usize, elem_size: usize },

    /// An STM list declares more logical elements than the format allows.
    #[error("dye template list declares {count} elements (maximum {max})")]
    DyeListTooLong { count: usize, max: usize },

    /// An STM entry's range end markers decrease.
    #[error("dye template end markers decrease ({prev} then {next})")]
    BadDyeMarkers { prev: usize, next: usize },

    /// Shader bytecode disassembled to a different stage than declared.
    #[error("shader stage mismatch: declared {declared}, bytecode is {found}")]
    StageMismatch {
        declared: &'static str,
        found: &'static str,
    },

    /// Shader bytecode targets a shader model the declared DirectX
    /// version cannot contain.
    #[error("shader model {major}.{minor} does not match declared {declared}")]
    ShaderModelMismatch {
        declared: &'static str,
        major: u8,
        minor: u8,
    },

    /// SM 5.0+ bytecode whose sampler and texture slot sets differ.
    #[error("sampler/texture slot mismatch: {samplers} samplers vs {textures} textures")]
    SamplerTextureMismatch { samplers: usize, textures: usize },
}
