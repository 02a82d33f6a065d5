//! Block decoders and the loops that drive them.
//!
//! Every format is a function from one encoded block (`[u8; N]`) to its
//! decoded pixels (`[P; PIXELS]`). The loops below are generic over that
//! function, so each format gets its own monomorphized copy with the block
//! size and pixel type known at compile time.

pub(crate) mod bc;
pub(crate) mod bc6;
pub(crate) mod bc7;
mod bcn_util;
pub(crate) mod convert;
pub(crate) mod etc;
pub(crate) mod uncompressed;

use crate::{util::div_ceil, BlockError};

/// A decoded pixel that can be written as little-endian bytes.
pub(crate) trait Pixel: Copy {
    /// The number of bytes of one pixel in the output.
    const BYTES: usize;

    fn write_le(self, out: &mut [u8]);
}

macro_rules! impl_pixel {
    ($t:ty, $n:literal) => {
        impl Pixel for [$t; $n] {
            const BYTES: usize = std::mem::size_of::<$t>() * $n;

            #[inline(always)]
            fn write_le(self, out: &mut [u8]) {
                const SIZE: usize = std::mem::size_of::<$t>();
                for (value, out) in self.iter().zip(out.chunks_exact_mut(SIZE)) {
                    out.copy_from_slice(&value.to_le_bytes());
                }
            }
        }
    };
}
impl_pixel!(u8, 1);
impl_pixel!(u8, 3);
impl_pixel!(u8, 4);
impl_pixel!(u16, 3);
impl_pixel!(u16, 4);
impl_pixel!(f32, 3);
impl_pixel!(f32, 4);

/// The edge length of a block with the given number of pixels.
const fn edge_of(pixels: usize) -> usize {
    match pixels {
        1 => 1,
        16 => 4,
        _ => panic!("blocks are either 1x1 or 4x4"),
    }
}

#[inline(always)]
fn read_block<const N: usize>(src: &[u8], index: usize) -> [u8; N] {
    let mut block = [0; N];
    block.copy_from_slice(&src[index..index + N]);
    block
}

/// Decodes a single block and writes all of its pixels to `dst`.
///
/// `dst_index` is the byte offset of the top-left pixel and `dst_stride` the
/// byte distance between two rows. Returns the index of the next block in
/// `src`.
///
/// # Panics
///
/// If `src` does not contain a whole block at `src_index` or `dst` is too
/// short for the block's pixels.
pub(crate) fn decode_block_with<const N: usize, const PIXELS: usize, P: Pixel>(
    src: &[u8],
    src_index: usize,
    dst: &mut [u8],
    dst_index: usize,
    dst_stride: usize,
    decode: impl Fn([u8; N]) -> Result<[P; PIXELS], BlockError>,
) -> Result<usize, BlockError> {
    let edge = edge_of(PIXELS);
    let row_bytes = edge * P::BYTES;

    assert!(
        src_index + N <= src.len(),
        "a block needs {} bytes at index {}, but the source has only {} bytes",
        N,
        src_index,
        src.len()
    );
    let required = dst_index + dst_stride * (edge - 1) + row_bytes;
    assert!(
        required <= dst.len(),
        "a {}x{} block at index {} with stride {} needs {} bytes, but the destination has only {} bytes",
        edge,
        edge,
        dst_index,
        dst_stride,
        required,
        dst.len()
    );

    let pixels = decode(read_block(src, src_index))?;
    for y in 0..edge {
        let row_start = dst_index + y * dst_stride;
        let row = &mut dst[row_start..row_start + row_bytes];
        for (pixel, out) in pixels[y * edge..].iter().zip(row.chunks_exact_mut(P::BYTES)) {
            pixel.write_le(out);
        }
    }

    Ok(src_index + N)
}

/// Decodes a whole `width x height` surface into a tightly packed buffer.
///
/// Blocks on the right and bottom edge that extend past the surface are
/// cropped.
///
/// # Panics
///
/// If `src` holds fewer blocks than the surface needs.
pub(crate) fn decode_surface_with<const N: usize, const PIXELS: usize, P: Pixel>(
    src: &[u8],
    width: u32,
    height: u32,
    decode: impl Fn([u8; N]) -> Result<[P; PIXELS], BlockError>,
) -> Result<Vec<u8>, BlockError> {
    let edge = edge_of(PIXELS);
    let width = width as usize;
    let height = height as usize;

    let blocks_x = div_ceil(width, edge);
    let blocks_y = div_ceil(height, edge);
    let encoded_len = blocks_x * blocks_y * N;
    assert!(
        encoded_len <= src.len(),
        "a {}x{} surface needs {} bytes of blocks, but only {} bytes were given",
        width,
        height,
        encoded_len,
        src.len()
    );

    let stride = width * P::BYTES;
    let mut decoded = vec![0_u8; stride * height];

    for block_y in 0..blocks_y {
        let y0 = block_y * edge;
        let rows = edge.min(height - y0);

        for block_x in 0..blocks_x {
            let x0 = block_x * edge;
            let columns = edge.min(width - x0);

            let block_index = (block_y * blocks_x + block_x) * N;
            let pixels = decode(read_block(src, block_index))?;

            for y in 0..rows {
                let row_start = (y0 + y) * stride + x0 * P::BYTES;
                let row = &mut decoded[row_start..row_start + columns * P::BYTES];
                for (pixel, out) in pixels[y * edge..].iter().zip(row.chunks_exact_mut(P::BYTES)) {
                    pixel.write_le(out);
                }
            }
        }
    }

    Ok(decoded)
}

/// Adapts an infallible block function to the signature of the loops.
#[inline(always)]
pub(crate) fn infallible<const N: usize, T>(
    f: impl Fn([u8; N]) -> T,
) -> impl Fn([u8; N]) -> Result<T, BlockError> {
    move |block| Ok(f(block))
}

/// Adapts a per-pixel function to a 1x1 block.
#[inline(always)]
pub(crate) fn per_pixel<const N: usize, P>(
    f: impl Fn([u8; N]) -> P,
) -> impl Fn([u8; N]) -> Result<[P; 1], BlockError> {
    move |pixel| Ok([f(pixel)])
}
