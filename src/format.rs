use crate::{
    decode::{
        bc,
        bc6::{self, Bc6Variant},
        bc7,
        convert::rgba_to_bgra,
        decode_block_with, decode_surface_with, etc, infallible, per_pixel, uncompressed,
    },
    util::div_ceil,
    BlockError,
};

/// The encoding of the pixels of a mip level.
///
/// Block compressed formats store 4x4 pixels per block. Uncompressed formats
/// are treated as blocks with an edge length of 1, so both share the same
/// decoding contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockFormat {
    /// BC1 without alpha.
    Dxt1,
    /// BC1 where index 3 of a 3-color block is transparent.
    Dxt1Alpha,
    /// BC2. DXT2 (premultiplied alpha) decodes the same way.
    Dxt3,
    /// BC3. DXT4 (premultiplied alpha) decodes the same way.
    Dxt5,
    Bc4,
    Bc4S,
    Bc5,
    Bc5S,
    /// Unsigned half float RGB.
    Bc6H,
    /// Signed half float RGB.
    Bc6HS,
    Bc7,
    Etc1,
    Etc2Rgb,
    /// ETC2 with 1-bit punch-through alpha.
    Etc2RgbA1,
    /// ETC2 with an EAC alpha block.
    Etc2Rgba,
    Uncompressed(UncompressedFormat),
}

/// Uncompressed pixel layouts, named from the least significant bit up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UncompressedFormat {
    L8,
    A8,
    L8A8,
    B5G6R5,
    B5G5R5X1,
    B5G5R5A1,
    B4G4R4A4,
    B8G8R8,
    R8G8B8,
    B8G8R8A8,
    B8G8R8X8,
    R8G8B8A8,
    R8G8B8X8,
    R10G10B10A2,
    R16G16B16A16,
    R16G16B16A16Float,
    R32G32B32Float,
    R32G32B32A32Float,
}
impl UncompressedFormat {
    pub const ALL: [UncompressedFormat; 18] = [
        Self::L8,
        Self::A8,
        Self::L8A8,
        Self::B5G6R5,
        Self::B5G5R5X1,
        Self::B5G5R5A1,
        Self::B4G4R4A4,
        Self::B8G8R8,
        Self::R8G8B8,
        Self::B8G8R8A8,
        Self::B8G8R8X8,
        Self::R8G8B8A8,
        Self::R8G8B8X8,
        Self::R10G10B10A2,
        Self::R16G16B16A16,
        Self::R16G16B16A16Float,
        Self::R32G32B32Float,
        Self::R32G32B32A32Float,
    ];

    pub const fn bytes_per_pixel(self) -> u8 {
        match self {
            Self::L8 | Self::A8 => 1,
            Self::L8A8 | Self::B5G6R5 | Self::B5G5R5X1 | Self::B5G5R5A1 | Self::B4G4R4A4 => 2,
            Self::B8G8R8 | Self::R8G8B8 => 3,
            Self::B8G8R8A8
            | Self::B8G8R8X8
            | Self::R8G8B8A8
            | Self::R8G8B8X8
            | Self::R10G10B10A2 => 4,
            Self::R16G16B16A16 | Self::R16G16B16A16Float => 8,
            Self::R32G32B32Float => 12,
            Self::R32G32B32A32Float => 16,
        }
    }
}

/// The size of the blocks of a [`BlockFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockGeometry {
    pub bytes_per_block: u8,
    /// Blocks are `edge x edge` pixels.
    pub edge: u8,
    /// Encoded bits per pixel.
    pub bits_per_pixel: u8,
    pub compressed: bool,
}
impl BlockGeometry {
    const fn block_4x4(bytes_per_block: u8) -> Self {
        Self {
            bytes_per_block,
            edge: 4,
            bits_per_pixel: bytes_per_block * 8 / 16,
            compressed: true,
        }
    }
    const fn pixel(bytes_per_pixel: u8) -> Self {
        Self {
            bytes_per_block: bytes_per_pixel,
            edge: 1,
            bits_per_pixel: bytes_per_pixel * 8,
            compressed: false,
        }
    }
}

/// The pixel layout of decoded data.
///
/// Multi-byte channels are little endian. Half floats are stored as their
/// IEEE 754 bit patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Gray8,
    Bgr8,
    Bgra8,
    Rgb16Float,
    Rgba16Float,
    Rgb32Float,
    Rgba32Float,
}
impl ImageFormat {
    pub const fn bytes_per_pixel(self) -> u8 {
        match self {
            Self::Gray8 => 1,
            Self::Bgr8 => 3,
            Self::Bgra8 => 4,
            Self::Rgb16Float => 6,
            Self::Rgba16Float => 8,
            Self::Rgb32Float => 12,
            Self::Rgba32Float => 16,
        }
    }
    pub const fn channels(self) -> u8 {
        match self {
            Self::Gray8 => 1,
            Self::Bgr8 | Self::Rgb16Float | Self::Rgb32Float => 3,
            Self::Bgra8 | Self::Rgba16Float | Self::Rgba32Float => 4,
        }
    }
}

/// Expands to a `match` that calls `$run(args..., decode_fn)` with the block
/// function of `$format`.
macro_rules! with_block_fn {
    ($format:expr, $run:ident($($arg:expr),*)) => {
        match $format {
            BlockFormat::Dxt1 => $run($($arg,)* infallible(bc::dxt1)),
            BlockFormat::Dxt1Alpha => $run($($arg,)* infallible(bc::dxt1_alpha)),
            BlockFormat::Dxt3 => $run($($arg,)* infallible(bc::dxt3)),
            BlockFormat::Dxt5 => $run($($arg,)* infallible(bc::dxt5)),
            BlockFormat::Bc4 => $run($($arg,)* infallible(bc::bc4)),
            BlockFormat::Bc4S => $run($($arg,)* infallible(bc::bc4s)),
            BlockFormat::Bc5 => $run($($arg,)* infallible(bc::bc5)),
            BlockFormat::Bc5S => $run($($arg,)* infallible(bc::bc5s)),
            BlockFormat::Bc6H => $run($($arg,)* |block| {
                bc6::decode_bc6_block(block, Bc6Variant::Unsigned)
            }),
            BlockFormat::Bc6HS => $run($($arg,)* |block| {
                bc6::decode_bc6_block(block, Bc6Variant::Signed)
            }),
            BlockFormat::Bc7 => $run($($arg,)* |block| {
                bc7::decode_bc7_block(block).map(|pixels| pixels.map(rgba_to_bgra))
            }),
            BlockFormat::Etc1 => $run($($arg,)* etc::etc1),
            BlockFormat::Etc2Rgb => $run($($arg,)* etc::etc2_rgb),
            BlockFormat::Etc2RgbA1 => $run($($arg,)* etc::etc2_rgb_a1),
            BlockFormat::Etc2Rgba => $run($($arg,)* etc::etc2_rgba),
            BlockFormat::Uncompressed(format) => {
                use uncompressed as u;
                match format {
                    UncompressedFormat::L8 => $run($($arg,)* per_pixel(u::l8)),
                    UncompressedFormat::A8 => $run($($arg,)* per_pixel(u::a8)),
                    UncompressedFormat::L8A8 => $run($($arg,)* per_pixel(u::l8a8)),
                    UncompressedFormat::B5G6R5 => $run($($arg,)* per_pixel(u::b5g6r5)),
                    UncompressedFormat::B5G5R5X1 => $run($($arg,)* per_pixel(u::b5g5r5x1)),
                    UncompressedFormat::B5G5R5A1 => $run($($arg,)* per_pixel(u::b5g5r5a1)),
                    UncompressedFormat::B4G4R4A4 => $run($($arg,)* per_pixel(u::b4g4r4a4)),
                    UncompressedFormat::B8G8R8 => $run($($arg,)* per_pixel(u::b8g8r8)),
                    UncompressedFormat::R8G8B8 => $run($($arg,)* per_pixel(u::r8g8b8)),
                    UncompressedFormat::B8G8R8A8 => $run($($arg,)* per_pixel(u::b8g8r8a8)),
                    UncompressedFormat::B8G8R8X8 => $run($($arg,)* per_pixel(u::b8g8r8x8)),
                    UncompressedFormat::R8G8B8A8 => $run($($arg,)* per_pixel(u::r8g8b8a8)),
                    UncompressedFormat::R8G8B8X8 => $run($($arg,)* per_pixel(u::r8g8b8x8)),
                    UncompressedFormat::R10G10B10A2 => {
                        $run($($arg,)* per_pixel(u::r10g10b10a2))
                    }
                    UncompressedFormat::R16G16B16A16 => {
                        $run($($arg,)* per_pixel(u::r16g16b16a16))
                    }
                    UncompressedFormat::R16G16B16A16Float => {
                        $run($($arg,)* per_pixel(u::r16g16b16a16_float))
                    }
                    UncompressedFormat::R32G32B32Float => {
                        $run($($arg,)* per_pixel(u::r32g32b32_float))
                    }
                    UncompressedFormat::R32G32B32A32Float => {
                        $run($($arg,)* per_pixel(u::r32g32b32a32_float))
                    }
                }
            }
        }
    };
}

impl BlockFormat {
    /// The block size of this format.
    pub const fn geometry(self) -> BlockGeometry {
        match self {
            Self::Dxt1
            | Self::Dxt1Alpha
            | Self::Bc4
            | Self::Bc4S
            | Self::Etc1
            | Self::Etc2Rgb
            | Self::Etc2RgbA1 => BlockGeometry::block_4x4(8),
            Self::Dxt3
            | Self::Dxt5
            | Self::Bc5
            | Self::Bc5S
            | Self::Bc6H
            | Self::Bc6HS
            | Self::Bc7
            | Self::Etc2Rgba => BlockGeometry::block_4x4(16),
            Self::Uncompressed(format) => BlockGeometry::pixel(format.bytes_per_pixel()),
        }
    }

    /// The layout of the pixels [`BlockFormat::decode_block`] writes.
    pub const fn image_format(self) -> ImageFormat {
        match self {
            Self::Bc6H | Self::Bc6HS => ImageFormat::Rgb16Float,
            Self::Uncompressed(format) => match format {
                UncompressedFormat::L8 => ImageFormat::Gray8,
                UncompressedFormat::B5G6R5
                | UncompressedFormat::B8G8R8
                | UncompressedFormat::R8G8B8 => ImageFormat::Bgr8,
                UncompressedFormat::R16G16B16A16Float => ImageFormat::Rgba16Float,
                UncompressedFormat::R32G32B32Float => ImageFormat::Rgb32Float,
                UncompressedFormat::R32G32B32A32Float => ImageFormat::Rgba32Float,
                _ => ImageFormat::Bgra8,
            },
            _ => ImageFormat::Bgra8,
        }
    }

    /// The number of encoded bytes of a `width x height` surface.
    ///
    /// `None` if the size does not fit into a `u64`.
    pub fn level_byte_len(self, width: u32, height: u32) -> Option<u64> {
        let geometry = self.geometry();
        let edge = geometry.edge as u64;
        div_ceil(width as u64, edge)
            .checked_mul(div_ceil(height as u64, edge))?
            .checked_mul(geometry.bytes_per_block as u64)
    }

    /// The number of decoded bytes of a `width x height` surface.
    ///
    /// `None` if the size does not fit into a `u64`.
    pub fn decoded_len(self, width: u32, height: u32) -> Option<u64> {
        (width as u64)
            .checked_mul(height as u64)?
            .checked_mul(self.image_format().bytes_per_pixel() as u64)
    }

    /// Decodes the block at `src[src_index..]` into `dst`.
    ///
    /// All `edge x edge` pixels of the block are written, starting at byte
    /// `dst_index`, with rows `dst_stride` bytes apart. Returns the index of
    /// the next block in `src`.
    ///
    /// # Panics
    ///
    /// If `src` does not contain a complete block at `src_index` or if `dst`
    /// cannot hold the block's pixels. Callers are expected to size their
    /// buffers with [`BlockFormat::geometry`].
    pub fn decode_block(
        self,
        src: &[u8],
        src_index: usize,
        dst: &mut [u8],
        dst_index: usize,
        dst_stride: usize,
    ) -> Result<usize, BlockError> {
        with_block_fn!(
            self,
            decode_block_with(src, src_index, dst, dst_index, dst_stride)
        )
    }

    /// Decodes a `width x height` surface into a tightly packed buffer of
    /// [`BlockFormat::image_format`] pixels.
    ///
    /// # Panics
    ///
    /// If `src` is shorter than [`BlockFormat::level_byte_len`].
    pub fn decode_surface(self, src: &[u8], width: u32, height: u32) -> Result<Vec<u8>, BlockError> {
        with_block_fn!(self, decode_surface_with(src, width, height))
    }
}
