//! KTX 2.0 files.
//!
//! https://registry.khronos.org/KTX/specs/2.0/ktxspec.v2.html

use std::io::{Read, Seek, SeekFrom};

use crate::{
    assemble::{read_texture, FaceOrder, LevelHooks, SurfaceDesc, TextureShape},
    detect::{block_format, CompressionScheme, PixelMasks},
    kvd::{self, KeyValue},
    util::{read_exact_counted, read_u32_le_array, read_u64_le_array},
    BlockFormat, DecodeError, FormatError, HeaderError, LayoutError, Options, Texture,
};

/// Where one mip level is stored in a KTX2 file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LevelIndex {
    /// Offset from the start of the file.
    pub byte_offset: u64,
    pub byte_length: u64,
    pub uncompressed_byte_length: u64,
}

/// The parsed header, index and level index of a KTX2 file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ktx2Header {
    pub vk_format: u32,
    pub type_size: u32,
    pub pixel_width: u32,
    /// 0 for 1D textures.
    pub pixel_height: u32,
    /// 0 for everything but 3D textures.
    pub pixel_depth: u32,
    /// 0 if the texture is not an array.
    pub layer_count: u32,
    /// 1 or 6.
    pub face_count: u32,
    /// 0 asks the loader to generate mipmaps, which is read as 1 level.
    pub level_count: u32,
    pub supercompression_scheme: u32,

    pub dfd_byte_offset: u32,
    pub dfd_byte_length: u32,
    pub kvd_byte_offset: u32,
    pub kvd_byte_length: u32,
    pub sgd_byte_offset: u64,
    pub sgd_byte_length: u64,

    /// `max(1, level_count)` entries, starting with the base level.
    pub levels: Vec<LevelIndex>,
}

impl Ktx2Header {
    pub const IDENTIFIER: [u8; 12] = [
        0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
    ];

    /// Reads the identifier, the header, the index and the level index.
    pub fn read<R: Read + ?Sized>(reader: &mut R) -> Result<Self, HeaderError> {
        let mut identifier = [0; 12];
        reader.read_exact(&mut identifier)?;
        if identifier != Self::IDENTIFIER {
            return Err(HeaderError::InvalidKtxIdentifier(identifier));
        }

        let header: [u32; 9] = read_u32_le_array(reader)?;
        let index32: [u32; 4] = read_u32_le_array(reader)?;
        let index64: [u64; 2] = read_u64_le_array(reader)?;

        let level_count = header[7];
        let mut levels = Vec::with_capacity(level_count.clamp(1, 32) as usize);
        for _ in 0..level_count.max(1) {
            let [byte_offset, byte_length, uncompressed_byte_length] = read_u64_le_array(reader)?;
            levels.push(LevelIndex {
                byte_offset,
                byte_length,
                uncompressed_byte_length,
            });
        }

        Ok(Self {
            vk_format: header[0],
            type_size: header[1],
            pixel_width: header[2],
            pixel_height: header[3],
            pixel_depth: header[4],
            layer_count: header[5],
            face_count: header[6],
            level_count,
            supercompression_scheme: header[8],
            dfd_byte_offset: index32[0],
            dfd_byte_length: index32[1],
            kvd_byte_offset: index32[2],
            kvd_byte_length: index32[3],
            sgd_byte_offset: index64[0],
            sgd_byte_length: index64[1],
            levels,
        })
    }
}

/// A decoder for KTX2 files.
///
/// Levels are located through the level index, so the reader must be
/// seekable. All offsets are relative to the position of the reader when the
/// decoder was created.
pub struct Ktx2Decoder<R> {
    reader: R,
    start: u64,
    header: Ktx2Header,
    key_values: Vec<KeyValue>,
    shape: TextureShape,
    options: Options,
}

impl<R: Read + Seek> Ktx2Decoder<R> {
    pub fn new(reader: R) -> Result<Self, DecodeError> {
        Self::new_with(reader, &Options::default())
    }

    pub fn new_with(mut reader: R, options: &Options) -> Result<Self, DecodeError> {
        let start = reader.stream_position()?;
        let header = Ktx2Header::read(&mut reader)?;

        if header.supercompression_scheme != 0 {
            return Err(FormatError::UnsupportedSupercompression(header.supercompression_scheme).into());
        }

        let shape = texture_shape(&header, options)?;
        shape.validate()?;

        let end = reader.seek(SeekFrom::End(0))?;
        let file_len = end - start;
        check_level_index(&header, &shape, file_len)?;

        let mut key_values = Vec::new();
        if header.kvd_byte_length > 0 {
            let offset = header.kvd_byte_offset as u64;
            let length = header.kvd_byte_length as u64;
            if offset.saturating_add(length) > file_len {
                return Err(HeaderError::InvalidKeyValueData.into());
            }
            reader.seek(SeekFrom::Start(start + offset))?;
            let mut bytes = vec![0; length as usize];
            read_exact_counted(&mut reader, &mut bytes)?;
            key_values = kvd::parse(&bytes)?;
        }

        log::debug!(
            "KTX2 {}x{}x{} {:?}, {} mip levels, {} faces, {:?} layers, {} key/value pairs",
            shape.desc.width,
            shape.desc.height,
            shape.depth,
            shape.desc.format,
            shape.desc.mip_count,
            shape.faces,
            shape.layers,
            key_values.len()
        );

        Ok(Self {
            reader,
            start,
            header,
            key_values,
            shape,
            options: options.clone(),
        })
    }

    pub fn header(&self) -> &Ktx2Header {
        &self.header
    }
    pub fn format(&self) -> BlockFormat {
        self.shape.desc.format
    }
    pub fn key_values(&self) -> &[KeyValue] {
        &self.key_values
    }

    pub fn read_texture(mut self) -> Result<Texture, DecodeError> {
        let mut hooks = SeekToLevel {
            start: self.start,
            levels: &self.header.levels,
        };
        read_texture(
            &mut self.reader,
            &self.shape,
            FaceOrder::LevelMajor,
            &mut hooks,
            &self.options,
        )
    }
}

fn texture_shape(header: &Ktx2Header, options: &Options) -> Result<TextureShape, DecodeError> {
    let format = block_format(
        CompressionScheme::Vulkan(header.vk_format),
        &PixelMasks::default(),
        false,
    )?;

    let mip_count = match header.level_count {
        0 => {
            log::warn!("KTX2 header asks for generated mipmaps, reading 1 level");
            1
        }
        count => count,
    };

    let faces = match header.face_count {
        1 => 1,
        6 => 6,
        _ => return Err(LayoutError::PartialCubeMap.into()),
    };

    let layers = match header.layer_count {
        0 => None,
        n if n > options.max_array_size => return Err(LayoutError::ArraySizeTooBig(n).into()),
        n => Some(n),
    };

    Ok(TextureShape {
        desc: SurfaceDesc::new(
            format,
            header.pixel_width,
            header.pixel_height.max(1),
            mip_count,
        ),
        depth: header.pixel_depth.max(1),
        faces,
        layers,
        pad_rows: false,
    })
}

/// Every level must lie inside the file and be large enough for all of its
/// layers, faces and slices.
fn check_level_index(
    header: &Ktx2Header,
    shape: &TextureShape,
    file_len: u64,
) -> Result<(), DecodeError> {
    for (level, entry) in header.levels.iter().enumerate() {
        let needed = shape
            .level_stream_len(level as u32)
            .ok_or(LayoutError::DataLayoutTooBig)?;
        let end = entry.byte_offset.checked_add(entry.byte_length);
        if entry.byte_length < needed || end.map_or(true, |end| end > file_len) {
            return Err(HeaderError::InvalidLevelIndex {
                level,
                offset: entry.byte_offset,
                length: entry.byte_length,
            }
            .into());
        }
    }
    Ok(())
}

struct SeekToLevel<'a> {
    start: u64,
    levels: &'a [LevelIndex],
}

impl<R: Read + Seek + ?Sized> LevelHooks<R> for SeekToLevel<'_> {
    fn begin_level(
        &mut self,
        reader: &mut R,
        level: u32,
        _shape: &TextureShape,
    ) -> Result<(), DecodeError> {
        let entry = self.levels[level as usize];
        reader.seek(SeekFrom::Start(self.start + entry.byte_offset))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A 4x4 BC1 file with the given level index.
    fn file(levels: &[(u64, u64)], data_len: usize) -> Vec<u8> {
        let mut out = Ktx2Header::IDENTIFIER.to_vec();
        let header = [131_u32, 1, 4, 4, 0, 0, 1, levels.len() as u32, 0];
        for word in header.into_iter().chain([0; 4]) {
            out.extend(word.to_le_bytes());
        }
        out.extend([0; 16]);
        for &(offset, length) in levels {
            for word in [offset, length, length] {
                out.extend(word.to_le_bytes());
            }
        }
        out.resize(out.len() + data_len, 0);
        out
    }

    #[test]
    fn header_and_level_index() {
        let bytes = file(&[(104, 8)], 8);
        let header = Ktx2Header::read(&mut bytes.as_slice()).unwrap();
        assert_eq!(header.vk_format, 131);
        assert_eq!(header.face_count, 1);
        assert_eq!(
            header.levels,
            [LevelIndex {
                byte_offset: 104,
                byte_length: 8,
                uncompressed_byte_length: 8
            }]
        );
    }

    #[test]
    fn level_outside_of_file() {
        let bytes = file(&[(200, 8)], 8);
        let err = Ktx2Decoder::new(Cursor::new(bytes)).err().unwrap();
        assert!(matches!(
            err,
            DecodeError::Header(HeaderError::InvalidLevelIndex { level: 0, .. })
        ));
    }

    #[test]
    fn level_too_short() {
        let bytes = file(&[(104, 4)], 8);
        let err = Ktx2Decoder::new(Cursor::new(bytes)).err().unwrap();
        assert!(matches!(
            err,
            DecodeError::Header(HeaderError::InvalidLevelIndex {
                level: 0,
                offset: 104,
                length: 4
            })
        ));
    }

    #[test]
    fn supercompression_is_rejected() {
        let mut bytes = file(&[(104, 8)], 8);
        // supercompressionScheme = zstd
        bytes[44..48].copy_from_slice(&2_u32.to_le_bytes());
        let err = Ktx2Decoder::new(Cursor::new(bytes)).err().unwrap();
        assert!(matches!(
            err,
            DecodeError::Format(FormatError::UnsupportedSupercompression(2))
        ));
    }
}
