//! Binary codecs for FFXIV game-asset file formats
//!
//! Each codec converts a raw byte buffer into a typed value that tooling
//! can inspect and mutate, and converts it back into bytes the game
//! engine will load:
//!
//! - [`avfx`] — particle-effect definitions (tagged-block stream)
//! - [`mdl`] — 3D models (fixed header, string table, parallel arrays)
//! - [`mtrl`] — materials (color rows, dye rows, shader bindings)
//! - [`shpk`] — compiled shader packages (blobs plus resource tables)
//! - [`stm`] — dye/staining lookup tables
//!
//! All codecs are pure transforms: `decode(&[u8]) -> Result<T>` and
//! `encode(&T) -> Vec<u8>`, no I/O, no shared state. Decoding is all or
//! nothing; any failure means the asset cannot be used, not that a retry
//! might help.
//!
//! # Usage
//!
//! ```ignore
//! use xiv_formats::Mtrl;
//!
//! let bytes = std::fs::read("item.mtrl")?;
//! let mut mtrl = Mtrl::decode(&bytes)?;
//! mtrl.shader_package_name = "characterglass.shpk".into();
//! std::fs::write("item.mtrl", mtrl.encode())?;
//! ```

pub mod avfx;
pub mod mdl;
pub mod mtrl;
pub mod shpk;
pub mod stm;

mod bytes;
mod error;
mod strings;

pub use avfx::Avfx;
pub use error::{FormatError, Result};
pub use mdl::Mdl;
pub use mtrl::Mtrl;
pub use shpk::ShaderPackage;
pub use stm::Stm;
pub use strings::StringPool;
