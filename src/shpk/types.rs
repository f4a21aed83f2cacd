//! SHPK record types

use crate::error::{FormatError, Result};
use crate::shpk::resources::{Disassembler, Disassembly};

/// DirectX generation the package was compiled for. Anything other than
/// the two known magics is fatal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DxVersion {
    Dx9,
    #[default]
    Dx11,
}

impl DxVersion {
    pub(crate) fn from_magic(magic: [u8; 4]) -> Result<Self> {
        match &magic {
            b"DX9\0" => Ok(Self::Dx9),
            b"DX11" => Ok(Self::Dx11),
            _ => Err(FormatError::UnknownDirectXMagic(magic)),
        }
    }

    pub(crate) fn magic(self) -> [u8; 4] {
        match self {
            Self::Dx9 => *b"DX9\0",
            Self::Dx11 => *b"DX11",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dx9 => "DX9",
            Self::Dx11 => "DX11",
        }
    }

    /// Shader model major version this generation compiles to.
    pub(crate) fn shader_model_major(self) -> u8 {
        match self {
            Self::Dx9 => 3,
            Self::Dx11 => 5,
        }
    }
}

/// Pipeline stage of a shader blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Vertex,
    Pixel,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Pixel => "pixel",
        }
    }

    /// Bytes of fixed per-stage header at the front of the blob: vertex
    /// shaders carry 4 (DX9) or 8 (DX11), pixel shaders none.
    pub(crate) fn blob_prefix_len(self, directx: DxVersion) -> usize {
        match (self, directx) {
            (Self::Pixel, _) => 0,
            (Self::Vertex, DxVersion::Dx9) => 4,
            (Self::Vertex, DxVersion::Dx11) => 8,
        }
    }
}

/// One named resource binding: a constant buffer, sampler, texture or
/// UAV slot.
///
/// `used` and `used_dynamically` are per-component masks recomputed from
/// disassembly; `None` means no disassembly has reported on this
/// resource. They are never serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    pub id: u32,
    pub name: String,
    pub slot: u16,
    pub size: u16,
    pub used: Option<u16>,
    pub used_dynamically: Option<u16>,
}

/// Material parameter: a byte window into the material constant buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialParam {
    pub id: u32,
    pub byte_offset: u16,
    pub byte_size: u16,
}

/// One compiled shader with its resource tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Shader {
    pub stage: Stage,
    /// Fixed per-stage header split off the front of the blob.
    pub blob_prefix: Vec<u8>,
    pub bytecode: Vec<u8>,
    pub constants: Vec<Resource>,
    pub samplers: Vec<Resource>,
    pub uavs: Vec<Resource>,
    pub textures: Vec<Resource>,
    /// Populated by a [`Disassembler`]; structural decode leaves it unset.
    pub disassembly: Option<Disassembly>,
}

impl Shader {
    /// Replace this shader's blob. The prefix split depends on the stage
    /// and DirectX generation; when a disassembler is supplied the new
    /// bytecode is disassembled and validated before anything is stored,
    /// so a rejected blob leaves the shader unchanged.
    pub fn set_blob(
        &mut self,
        blob: &[u8],
        directx: DxVersion,
        disassembler: Option<&dyn Disassembler>,
    ) -> Result<()> {
        let prefix_len = self.stage.blob_prefix_len(directx).min(blob.len());
        let disassembly = match disassembler {
            Some(disassembler) => {
                let disassembly = disassembler.disassemble(&blob[prefix_len..])?;
                self.check_disassembly(&disassembly, directx)?;
                Some(disassembly)
            }
            None => None,
        };
        self.blob_prefix = blob[..prefix_len].to_vec();
        self.bytecode = blob[prefix_len..].to_vec();
        self.disassembly = disassembly;
        Ok(())
    }

    /// Disassemble the current bytecode and keep the result, rejecting it
    /// when it disagrees with the declared stage or DirectX generation,
    /// or when SM 5.0+ sampler and texture slot sets differ.
    pub fn disassemble(
        &mut self,
        directx: DxVersion,
        disassembler: &dyn Disassembler,
    ) -> Result<()> {
        let disassembly = disassembler.disassemble(&self.bytecode)?;
        self.check_disassembly(&disassembly, directx)?;
        self.disassembly = Some(disassembly);
        Ok(())
    }

    fn check_disassembly(&self, disassembly: &Disassembly, directx: DxVersion) -> Result<()> {
        if disassembly.stage != self.stage {
            return Err(FormatError::StageMismatch {
                declared: self.stage.as_str(),
                found: disassembly.stage.as_str(),
            });
        }
        let (major, minor) = disassembly.shader_model;
        if major != directx.shader_model_major() {
            return Err(FormatError::ShaderModelMismatch {
                declared: directx.as_str(),
                major,
                minor,
            });
        }
        if major >= 5 {
            let mut sampler_slots = disassembly.sampler_slots();
            let mut texture_slots = disassembly.texture_slots();
            sampler_slots.sort_unstable();
            texture_slots.sort_unstable();
            if sampler_slots != texture_slots {
                return Err(FormatError::SamplerTextureMismatch {
                    samplers: sampler_slots.len(),
                    textures: texture_slots.len(),
                });
            }
        }
        Ok(())
    }
}
