//! SHPK compiled shader packages
//!
//! A package holds every compiled permutation of one shader effect for
//! one DirectX generation: vertex and pixel shader blobs, their resource
//! tables, and package-level material parameter and resource tables.
//!
//! Layout: a 13-field header (package magic, version, DirectX magic,
//! file size, blob and string region offsets, six counts), shader
//! sub-headers with inline resource tables, the package tables, then the
//! blob region and the string region. Resource string offsets are
//! pool-relative into the string region. The file size must equal the
//! buffer length; decode rejects anything else.
//!
//! Bytecode is opaque to the codec. Disassembly, and the resource
//! reconciliation built on it, go through the caller-supplied
//! [`Disassembler`] trait.

mod read;
mod resources;
mod types;
mod write;

#[cfg(test)]
mod tests;

pub use resources::{Binding, BindingKind, Disassembler, Disassembly};
pub use types::{DxVersion, MaterialParam, Resource, Shader, Stage};

use crate::error::Result;

pub(crate) const SHPK_MAGIC: [u8; 4] = *b"ShPk";

/// Byte size of the fixed header.
pub(crate) const HEADER_SIZE: usize = 52;

/// Decoded SHPK shader package.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderPackage {
    pub version: u32,
    pub directx: DxVersion,
    pub vertex_shaders: Vec<Shader>,
    pub pixel_shaders: Vec<Shader>,
    /// Byte size of the material constant buffer the params index into.
    pub material_params_size: u32,
    pub material_params: Vec<MaterialParam>,
    pub constants: Vec<Resource>,
    pub samplers: Vec<Resource>,
    pub uavs: Vec<Resource>,
}

impl ShaderPackage {
    /// Decode an SHPK buffer. Structural only; every shader's
    /// `disassembly` is left unset.
    pub fn decode(data: &[u8]) -> Result<Self> {
        read::decode(data)
    }

    /// Decode, then disassemble every shader. A shader whose bytecode
    /// fails validation keeps `disassembly = None`; the decode itself
    /// still succeeds.
    pub fn decode_with(data: &[u8], disassembler: &dyn Disassembler) -> Result<Self> {
        let mut package = read::decode(data)?;
        let directx = package.directx;
        for shader in package
            .vertex_shaders
            .iter_mut()
            .chain(package.pixel_shaders.iter_mut())
        {
            if let Err(err) = shader.disassemble(directx, disassembler) {
                tracing::warn!(stage = shader.stage.as_str(), %err, "shader not disassembled");
            }
        }
        Ok(package)
    }

    /// Serialize back to SHPK bytes, rebuilding the blob and string
    /// regions and patching the three header offsets.
    pub fn encode(&self) -> Vec<u8> {
        write::encode(self)
    }
}
