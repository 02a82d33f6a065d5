//! A decoder for GPU textures.
//!
//! The crate reads DDS, KTX 1.1 and KTX2 containers and decodes their
//! block compressed (BC1-BC7, ETC1/ETC2) or uncompressed surfaces into plain
//! pixel buffers.
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = BufReader::new(File::open("texture.dds")?);
//! let texture = texdec::read(file)?;
//! if let Some(main) = texture.main() {
//!     println!("{}x{} {:?}", main.width(), main.height(), main.image_format());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The containers can also be read directly through [`DdsDecoder`],
//! [`KtxDecoder`] and [`Ktx2Decoder`], and raw surfaces without any container
//! through [`read_flat`], [`read_cubemap`] and [`read_volume`].

#![forbid(unsafe_code)]

mod assemble;
mod bcn_data;
mod dds;
mod decode;
pub mod detect;
mod dxgi_format;
mod error;
mod format;
mod header;
#[cfg(feature = "image")]
mod image_integration;
mod ktx;
mod ktx2;
mod kvd;
mod mipmap;
mod texture;
mod util;

use std::io::{Read, Seek, SeekFrom};

pub use assemble::{read_cubemap, read_flat, read_volume, FaceOrder, SurfaceDesc};
pub use dds::*;
pub use dxgi_format::*;
pub use error::*;
pub use format::*;
pub use header::*;
pub use ktx::*;
pub use ktx2::*;
pub use kvd::{find_key, KeyValue};
pub use mipmap::*;
pub use texture::*;

/// Options for reading textures.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Options {
    /// Whether surfaces are decoded while reading.
    ///
    /// If `false`, every [`MipMap`] keeps the raw block data of the file and
    /// can be decoded later with [`MipMap::decode`].
    ///
    /// Defaults to `true`.
    pub decompress: bool,

    /// The maximum number of array elements a texture may declare.
    ///
    /// DDS files declare it in `array_size` (for cube maps this is the number
    /// of cube maps, so the file contains `array_size * 6` faces), KTX and
    /// KTX2 in their layer count. Since this value comes from the file, a
    /// malicious or corrupted file may contain a very large value.
    ///
    /// To disable this limit, set this to `u32::MAX`.
    ///
    /// Defaults to `4096`.
    pub max_array_size: u32,

    /// The maximum number of bytes reading a texture may allocate.
    ///
    /// Each surface counts with the larger of its encoded and decoded size
    /// (the latter only if [`Options::decompress`] is set), plus the
    /// bookkeeping for every surface and depth slice.
    ///
    /// Textures above the limit fail with
    /// [`DecodeError::MemoryLimitExceeded`] before anything is allocated.
    ///
    /// Defaults to 1 GiB.
    pub memory_limit: u64,
}
impl Default for Options {
    fn default() -> Self {
        Self {
            decompress: true,
            max_array_size: 4096,
            memory_limit: 1 << 30,
        }
    }
}

/// The container formats [`read`] understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    Dds,
    Ktx,
    Ktx2,
}

impl Container {
    /// Identifies the container from the first bytes of a file.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&Header::MAGIC) {
            Some(Container::Dds)
        } else if bytes.starts_with(&KtxHeader::IDENTIFIER) {
            Some(Container::Ktx)
        } else if bytes.starts_with(&Ktx2Header::IDENTIFIER) {
            Some(Container::Ktx2)
        } else {
            None
        }
    }
}

/// Reads a DDS, KTX or KTX2 texture with default options.
///
/// This is equivalent to `read_with(reader, &Options::default())`.
pub fn read<R: Read + Seek>(reader: R) -> Result<Texture, DecodeError> {
    read_with(reader, &Options::default())
}

/// Reads a DDS, KTX or KTX2 texture.
///
/// The container is detected from the first bytes of the stream. The reader
/// is expected to be positioned at the start of the file.
pub fn read_with<R: Read + Seek>(mut reader: R, options: &Options) -> Result<Texture, DecodeError> {
    let start = reader.stream_position()?;
    let mut head = Vec::with_capacity(12);
    (&mut reader).take(12).read_to_end(&mut head)?;
    reader.seek(SeekFrom::Start(start))?;

    match Container::sniff(&head) {
        Some(Container::Dds) => DdsDecoder::new_with(reader, options)?.read_texture(),
        Some(Container::Ktx) => KtxDecoder::new_with(reader, options)?.read_texture(),
        Some(Container::Ktx2) => Ktx2Decoder::new_with(reader, options)?.read_texture(),
        None => {
            let mut magic = [0; 4];
            let len = head.len().min(4);
            magic[..len].copy_from_slice(&head[..len]);
            Err(HeaderError::UnknownContainer(magic).into())
        }
    }
}
