//! KTX 1.1 files.
//!
//! https://registry.khronos.org/KTX/specs/1.0/ktxspec.v1.html

use std::io::Read;

use crate::{
    assemble::{read_texture, FaceOrder, LevelHooks, SurfaceDesc, TextureShape},
    detect::{block_format, CompressionScheme, PixelMasks},
    kvd::{self, KeyValue},
    util::{align4, read_exact_counted, read_u32_le_array, skip_bytes},
    BlockFormat, DecodeError, HeaderError, LayoutError, Options, Texture,
};

/// The parsed header of a KTX 1.1 file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KtxHeader {
    pub gl_type: u32,
    pub gl_type_size: u32,
    pub gl_format: u32,
    pub gl_internal_format: u32,
    pub gl_base_internal_format: u32,
    pub pixel_width: u32,
    /// 0 for 1D textures.
    pub pixel_height: u32,
    /// 0 for everything but 3D textures.
    pub pixel_depth: u32,
    /// 0 if the texture is not an array.
    pub number_of_array_elements: u32,
    /// 1 or 6.
    pub number_of_faces: u32,
    /// 0 asks the loader to generate mipmaps, which is read as 1 level.
    pub number_of_mipmap_levels: u32,
    pub bytes_of_key_value_data: u32,
}

impl KtxHeader {
    pub const IDENTIFIER: [u8; 12] = [
        0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
    ];
    const ENDIANNESS: u32 = 0x04030201;

    /// Reads the identifier and the header.
    pub fn read<R: Read + ?Sized>(reader: &mut R) -> Result<Self, HeaderError> {
        let mut identifier = [0; 12];
        reader.read_exact(&mut identifier)?;
        if identifier != Self::IDENTIFIER {
            return Err(HeaderError::InvalidKtxIdentifier(identifier));
        }

        let [endianness] = read_u32_le_array(reader)?;
        if endianness == Self::ENDIANNESS.swap_bytes() {
            return Err(HeaderError::BigEndian);
        }
        if endianness != Self::ENDIANNESS {
            return Err(HeaderError::InvalidEndianness(endianness));
        }

        let words: [u32; 12] = read_u32_le_array(reader)?;
        Ok(Self {
            gl_type: words[0],
            gl_type_size: words[1],
            gl_format: words[2],
            gl_internal_format: words[3],
            gl_base_internal_format: words[4],
            pixel_width: words[5],
            pixel_height: words[6],
            pixel_depth: words[7],
            number_of_array_elements: words[8],
            number_of_faces: words[9],
            number_of_mipmap_levels: words[10],
            bytes_of_key_value_data: words[11],
        })
    }
}

/// A decoder for KTX 1.1 files.
pub struct KtxDecoder<R> {
    reader: R,
    header: KtxHeader,
    key_values: Vec<KeyValue>,
    shape: TextureShape,
    options: Options,
}

impl<R: Read> KtxDecoder<R> {
    pub fn new(reader: R) -> Result<Self, DecodeError> {
        Self::new_with(reader, &Options::default())
    }

    /// Reads the header and the key/value data.
    pub fn new_with(mut reader: R, options: &Options) -> Result<Self, DecodeError> {
        let header = KtxHeader::read(&mut reader)?;

        let kvd_len = header.bytes_of_key_value_data as u64;
        if kvd_len > options.memory_limit {
            return Err(DecodeError::MemoryLimitExceeded {
                required: kvd_len,
                limit: options.memory_limit,
            });
        }
        let mut kvd_bytes = vec![0; header.bytes_of_key_value_data as usize];
        read_exact_counted(&mut reader, &mut kvd_bytes)?;
        let key_values = kvd::parse(&kvd_bytes)?;

        let shape = texture_shape(&header, options)?;
        log::debug!(
            "KTX {}x{}x{} {:?}, {} mip levels, {} faces, {:?} layers, {} key/value pairs",
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
            header,
            key_values,
            shape,
            options: options.clone(),
        })
    }

    pub fn header(&self) -> &KtxHeader {
        &self.header
    }
    pub fn format(&self) -> BlockFormat {
        self.shape.desc.format
    }
    pub fn key_values(&self) -> &[KeyValue] {
        &self.key_values
    }

    pub fn read_texture(mut self) -> Result<Texture, DecodeError> {
        read_texture(
            &mut self.reader,
            &self.shape,
            FaceOrder::LevelMajor,
            &mut ImageSizes,
            &self.options,
        )
    }
}

fn texture_shape(header: &KtxHeader, options: &Options) -> Result<TextureShape, DecodeError> {
    let scheme = CompressionScheme::Gl {
        internal_format: header.gl_internal_format,
        format: header.gl_format,
        ty: header.gl_type,
    };
    let format = block_format(scheme, &PixelMasks::default(), false)?;

    let mip_count = match header.number_of_mipmap_levels {
        0 => {
            log::warn!("KTX header asks for generated mipmaps, reading 1 level");
            1
        }
        count => count,
    };

    let faces = match header.number_of_faces {
        1 => 1,
        6 => 6,
        _ => return Err(LayoutError::PartialCubeMap.into()),
    };

    let layers = match header.number_of_array_elements {
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
        pad_rows: true,
    })
}

/// The `imageSize` prefix and the padding of KTX levels.
struct ImageSizes;

impl ImageSizes {
    /// Non-array cube maps give the size of a single face.
    fn is_face_size(shape: &TextureShape) -> bool {
        shape.faces == 6 && shape.layers.is_none()
    }
}

impl<R: Read + ?Sized> LevelHooks<R> for ImageSizes {
    fn begin_level(
        &mut self,
        reader: &mut R,
        level: u32,
        shape: &TextureShape,
    ) -> Result<(), DecodeError> {
        let [image_size] = read_u32_le_array(reader)?;
        let expected = if Self::is_face_size(shape) {
            shape.face_stream_len(level)
        } else {
            shape.level_stream_len(level)
        }
        .ok_or(LayoutError::DataLayoutTooBig)?;
        if image_size as u64 != expected {
            return Err(HeaderError::InvalidImageSize {
                level,
                expected,
                actual: image_size as u64,
            }
            .into());
        }
        Ok(())
    }

    fn end_face(
        &mut self,
        reader: &mut R,
        level: u32,
        shape: &TextureShape,
    ) -> Result<(), DecodeError> {
        if Self::is_face_size(shape) {
            let len = shape
                .face_stream_len(level)
                .ok_or(LayoutError::DataLayoutTooBig)?;
            skip_bytes(reader, align4(len) - len)?;
        }
        Ok(())
    }

    fn end_level(
        &mut self,
        reader: &mut R,
        level: u32,
        shape: &TextureShape,
    ) -> Result<(), DecodeError> {
        let len = shape
            .level_stream_len(level)
            .ok_or(LayoutError::DataLayoutTooBig)?;
        // the last level may omit its padding
        if level + 1 < shape.desc.mip_count {
            skip_bytes(reader, align4(len) - len)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(words: [u32; 12]) -> Vec<u8> {
        let mut out = KtxHeader::IDENTIFIER.to_vec();
        out.extend(0x04030201_u32.to_le_bytes());
        for word in words {
            out.extend(word.to_le_bytes());
        }
        out
    }

    #[test]
    fn endianness() {
        let mut bytes = header_bytes([0; 12]);
        bytes[12..16].copy_from_slice(&0x04030201_u32.to_be_bytes());
        assert!(matches!(
            KtxHeader::read(&mut bytes.as_slice()),
            Err(HeaderError::BigEndian)
        ));

        bytes[12..16].copy_from_slice(&[1, 1, 1, 1]);
        assert!(matches!(
            KtxHeader::read(&mut bytes.as_slice()),
            Err(HeaderError::InvalidEndianness(0x01010101))
        ));
    }

    #[test]
    fn header_fields() {
        let bytes = header_bytes([0, 1, 0, 0x9274, 0x1907, 8, 4, 0, 0, 1, 2, 0]);
        let header = KtxHeader::read(&mut bytes.as_slice()).unwrap();
        assert_eq!(header.gl_internal_format, 0x9274);
        assert_eq!(header.pixel_width, 8);
        assert_eq!(header.number_of_mipmap_levels, 2);

        let shape = texture_shape(&header, &Options::default()).unwrap();
        assert_eq!(shape.desc.format, BlockFormat::Etc2Rgb);
        assert_eq!((shape.desc.width, shape.desc.height), (8, 4));
        assert_eq!(shape.depth, 1);
        assert_eq!(shape.layers, None);
    }

    #[test]
    fn image_size_must_match() {
        // 4x4 ETC1, one level of 8 bytes, but imageSize says 16
        let mut bytes = header_bytes([0, 1, 0, 0x8D64, 0x1907, 4, 4, 0, 0, 1, 1, 0]);
        bytes.extend(16_u32.to_le_bytes());
        bytes.extend([0; 16]);
        let err = KtxDecoder::new(bytes.as_slice())
            .unwrap()
            .read_texture()
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Header(HeaderError::InvalidImageSize {
                level: 0,
                expected: 8,
                actual: 16
            })
        ));
    }
}
