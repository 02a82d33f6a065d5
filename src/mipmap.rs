use std::io::Read;

use crate::{
    util::{read_exact_counted, skip_bytes},
    BlockError, BlockFormat, DecodeError, ImageFormat,
};

/// The size of mip level `level` of a `width x height` surface.
///
/// Every level halves the previous one, rounding down, but never goes below 1.
pub const fn mip_dimensions(width: u32, height: u32, level: u32) -> (u32, u32) {
    (mip_size(width, level), mip_size(height, level))
}

pub(crate) const fn mip_size(size: u32, level: u32) -> u32 {
    if level >= 32 {
        return 1;
    }
    let size = size >> level;
    if size == 0 {
        1
    } else {
        size
    }
}

/// The number of levels of a full mip chain down to 1x1.
pub const fn max_mip_levels(width: u32, height: u32) -> u32 {
    let largest = if width > height { width } else { height };
    if largest == 0 {
        return 0;
    }
    32 - largest.leading_zeros()
}

/// One mip level of a surface.
///
/// The pixel data is either raw (the encoded blocks as read from the file) or
/// decoded into [`BlockFormat::image_format`] pixels.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MipMap {
    format: BlockFormat,
    width: u32,
    height: u32,
    data: Vec<u8>,
    decoded: bool,
}

impl MipMap {
    /// Wraps the encoded bytes of a level.
    ///
    /// Bytes past [`BlockFormat::level_byte_len`] are dropped. Fewer bytes are
    /// a [`DecodeError::Truncated`] error.
    pub fn from_raw(
        format: BlockFormat,
        width: u32,
        height: u32,
        mut data: Vec<u8>,
    ) -> Result<Self, DecodeError> {
        let expected = format
            .level_byte_len(width, height)
            .ok_or(crate::LayoutError::DataLayoutTooBig)?;
        if (data.len() as u64) < expected {
            return Err(DecodeError::Truncated {
                expected,
                actual: data.len() as u64,
            });
        }
        data.truncate(expected as usize);

        Ok(Self {
            format,
            width,
            height,
            data,
            decoded: false,
        })
    }

    /// Reads exactly one level from `reader` and optionally decodes it.
    ///
    /// With `pad_rows`, every row of an uncompressed level is followed by
    /// padding up to a multiple of 4 bytes, as in KTX files.
    pub(crate) fn read<R: Read + ?Sized>(
        reader: &mut R,
        format: BlockFormat,
        width: u32,
        height: u32,
        pad_rows: bool,
        decompress: bool,
    ) -> Result<Self, DecodeError> {
        let len = format
            .level_byte_len(width, height)
            .and_then(|len| usize::try_from(len).ok())
            .ok_or(crate::LayoutError::DataLayoutTooBig)?;
        let mut data = vec![0_u8; len];

        let geometry = format.geometry();
        let row_len = width as usize * geometry.bytes_per_block as usize;
        let padding = row_padding(row_len as u64);
        if pad_rows && geometry.edge == 1 && padding != 0 {
            for row in data.chunks_exact_mut(row_len) {
                read_exact_counted(reader, row)?;
                skip_bytes(reader, padding)?;
            }
        } else {
            read_exact_counted(reader, &mut data)?;
        }

        let mut mipmap = Self {
            format,
            width,
            height,
            data,
            decoded: false,
        };
        if decompress {
            mipmap.decode()?;
        }
        Ok(mipmap)
    }

    pub fn format(&self) -> BlockFormat {
        self.format
    }
    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn is_decoded(&self) -> bool {
        self.decoded
    }

    /// The layout of [`MipMap::data`] once the level is decoded.
    ///
    /// `None` while the data is still raw.
    pub fn image_format(&self) -> Option<ImageFormat> {
        self.decoded.then(|| self.format.image_format())
    }

    /// The raw block bytes or the decoded pixels, see [`MipMap::is_decoded`].
    pub fn data(&self) -> &[u8] {
        &self.data
    }
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Replaces the raw block bytes with the decoded pixels.
    ///
    /// Does nothing if the level is already decoded. On error, the raw data is
    /// kept.
    pub fn decode(&mut self) -> Result<(), BlockError> {
        if self.decoded {
            return Ok(());
        }

        let decoded = self
            .format
            .decode_surface(&self.data, self.width, self.height)?;
        log::trace!(
            "decoded {}x{} {:?} level into {} bytes",
            self.width,
            self.height,
            self.format,
            decoded.len()
        );

        self.data = decoded;
        self.decoded = true;
        Ok(())
    }
}

impl std::fmt::Debug for MipMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MipMap")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("decoded", &self.decoded)
            .field("len", &self.data.len())
            .finish()
    }
}

const fn row_padding(row_len: u64) -> u64 {
    crate::util::align4(row_len) - row_len
}
