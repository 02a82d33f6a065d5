use crate::{dxgi_format::DxgiFormat, header::FourCC};

/// The container describes a pixel format that no [`crate::BlockFormat`]
/// can decode.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FormatError {
    UnsupportedDxgiFormat(DxgiFormat),
    UnsupportedFourCC(FourCC),
    /// No uncompressed layout matches the bit count and channel masks.
    UnsupportedPixelMasks {
        bit_count: u32,
        masks: [u32; 4],
    },
    /// The KTX `glInternalFormat` (and `glFormat`/`glType` for uncompressed
    /// data) has no decoder.
    UnsupportedGlFormat {
        internal_format: u32,
        format: u32,
        ty: u32,
    },
    UnsupportedVkFormat(u32),
    /// KTX2 supercompression (zstd, BasisLZ, ...) is not supported.
    UnsupportedSupercompression(u32),
}
impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::UnsupportedDxgiFormat(format) => {
                write!(f, "DXGI format {:?} is not supported for decoding", format)
            }
            FormatError::UnsupportedFourCC(four_cc) => {
                write!(f, "Unsupported {:?} in the DDS pixel format", four_cc)
            }
            FormatError::UnsupportedPixelMasks { bit_count, masks } => {
                write!(
                    f,
                    "Unsupported {}-bit pixel layout with masks R={:#x} G={:#x} B={:#x} A={:#x}",
                    bit_count, masks[0], masks[1], masks[2], masks[3]
                )
            }
            FormatError::UnsupportedGlFormat {
                internal_format,
                format,
                ty,
            } => {
                write!(
                    f,
                    "Unsupported GL format (internal format {:#x}, format {:#x}, type {:#x})",
                    internal_format, format, ty
                )
            }
            FormatError::UnsupportedVkFormat(format) => {
                write!(f, "Unsupported Vulkan format {}", format)
            }
            FormatError::UnsupportedSupercompression(scheme) => {
                write!(f, "Unsupported KTX2 supercompression scheme {}", scheme)
            }
        }
    }
}
impl std::error::Error for FormatError {}

/// A single block could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BlockError {
    /// The block selects a mode that the format reserves.
    ///
    /// This is BC7 mode 8 (a block starting with a zero byte) and the BC6H
    /// modes `10011`, `10111`, `11011` and `11111`.
    ReservedMode { format: &'static str, mode: u8 },
    /// The block uses an encoding that only a later revision of the format
    /// defines, e.g. the T, H and planar modes of ETC2 inside an ETC1 stream.
    UnsupportedMode { format: &'static str },
}
impl std::fmt::Display for BlockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockError::ReservedMode { format, mode } => {
                write!(f, "{} block uses reserved mode {:#b}", format, mode)
            }
            BlockError::UnsupportedMode { format } => {
                write!(f, "{} block uses an unsupported mode", format)
            }
        }
    }
}
impl std::error::Error for BlockError {}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LayoutError {
    /// The header declares more mip levels than the base dimensions allow.
    TooManyMipMaps { mipmaps: u32, max: u32 },
    /// A volume/texture 3D without a depth.
    MissingDepth,
    /// The width, height, or depth of the texture is zero.
    ZeroDimension,
    /// The array size is too large.
    ///
    /// It either exceeds [`crate::Options::max_array_size`] or causes an
    /// overflow for cube map faces.
    ArraySizeTooBig(u32),
    /// The data described by the header needs more than 2^64 bytes.
    DataLayoutTooBig,
    /// A texture was assembled from zero mip levels or zero slices.
    Empty,
    /// A mip level does not have half the size of the previous level.
    MipMapDimensions {
        level: usize,
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// Not all levels of a texture share the same block format.
    MixedFormats,
    /// The six cube map faces do not have identical mip chains.
    MismatchedCubeMapFaces,
    /// A depth slice of a volume differs from the first slice in format or
    /// size, or does not hold the levels its depth calls for.
    MismatchedVolumeSlices { slice: usize },
    /// The faces of a cube map must always be square 2D textures.
    InvalidCubeMapDimensions,
    /// Only some of the six cube map faces are present.
    PartialCubeMap,
}
impl std::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutError::TooManyMipMaps { mipmaps, max } => {
                write!(f, "Too many mipmaps ({}), at most {} fit the size", mipmaps, max)
            }
            LayoutError::MissingDepth => write!(f, "Missing depth for a texture 3D/volume"),
            LayoutError::ZeroDimension => {
                write!(f, "The width, height, or depth of the texture is zero")
            }
            LayoutError::ArraySizeTooBig(size) => write!(f, "Array size {} is too large", size),
            LayoutError::DataLayoutTooBig => {
                write!(f, "Data layout described by the header is too large")
            }
            LayoutError::Empty => write!(f, "A texture needs at least one mip level and slice"),
            LayoutError::MipMapDimensions {
                level,
                expected,
                actual,
            } => write!(
                f,
                "Mip level {} is {}x{}, expected {}x{}",
                level, actual.0, actual.1, expected.0, expected.1
            ),
            LayoutError::MixedFormats => {
                write!(f, "All mip levels of a texture must share one format")
            }
            LayoutError::MismatchedCubeMapFaces => {
                write!(f, "Cube map faces must have identical mip chains")
            }
            LayoutError::MismatchedVolumeSlices { slice } => {
                write!(f, "Slice {} does not match the other slices of the volume", slice)
            }
            LayoutError::InvalidCubeMapDimensions => {
                write!(f, "Cube map faces must be square 2D textures")
            }
            LayoutError::PartialCubeMap => write!(f, "Partial cube maps are not supported"),
        }
    }
}
impl std::error::Error for LayoutError {}

#[derive(Debug)]
#[non_exhaustive]
pub enum HeaderError {
    InvalidMagicBytes([u8; 4]),
    InvalidHeaderSize(u32),
    InvalidPixelFormatSize(u32),
    InvalidDxgiFormat(u32),
    InvalidResourceDimension(u32),
    InvalidArraySizeForTexture3D(u32),

    /// The 12-byte KTX or KTX2 identifier is wrong.
    InvalidKtxIdentifier([u8; 12]),
    /// The KTX endianness field is neither `0x04030201` nor its swapped form.
    InvalidEndianness(u32),
    /// Big endian KTX files are not supported.
    BigEndian,
    /// A KTX2 level index entry points outside of the file or is too short.
    InvalidLevelIndex {
        level: usize,
        offset: u64,
        length: u64,
    },
    /// A KTX `imageSize` does not match the size of the level.
    InvalidImageSize {
        level: u32,
        expected: u64,
        actual: u64,
    },
    /// The key/value data section is malformed.
    InvalidKeyValueData,
    /// The data starts with neither the DDS magic bytes nor a KTX or KTX2
    /// identifier.
    UnknownContainer([u8; 4]),

    Io(std::io::Error),
}

impl std::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderError::InvalidMagicBytes(bytes) => {
                write!(
                    f,
                    "Invalid magic bytes {:?}, expected {:?} (ASCII: 'DDS ')",
                    bytes,
                    crate::header::Header::MAGIC
                )
            }
            HeaderError::InvalidHeaderSize(size) => {
                write!(f, "Invalid DDS header size of {}, expected 124", size)
            }
            HeaderError::InvalidPixelFormatSize(size) => {
                write!(
                    f,
                    "Invalid DDS header pixel format size of {}, expected 32",
                    size
                )
            }
            HeaderError::InvalidDxgiFormat(format) => {
                write!(f, "Invalid DXGI format {} in DX10 header extension", format)
            }
            HeaderError::InvalidResourceDimension(dimension) => {
                let label = match dimension {
                    0 => " (Unknown)",
                    1 => " (Buffer)",
                    _ => "",
                };
                write!(
                    f,
                    "Invalid resource dimension {}{} in DX10 header extension",
                    dimension, label
                )
            }
            HeaderError::InvalidArraySizeForTexture3D(array_size) => {
                write!(
                    f,
                    "Invalid array size {} for a texture 3D in DX10 header extension",
                    array_size
                )
            }
            HeaderError::InvalidKtxIdentifier(bytes) => {
                write!(f, "Invalid KTX identifier {:02x?}", bytes)
            }
            HeaderError::InvalidEndianness(value) => {
                write!(f, "Invalid KTX endianness marker {:#010x}", value)
            }
            HeaderError::BigEndian => write!(f, "Big endian KTX files are not supported"),
            HeaderError::InvalidLevelIndex {
                level,
                offset,
                length,
            } => write!(
                f,
                "Invalid KTX2 level index for level {} (offset {}, length {})",
                level, offset, length
            ),
            HeaderError::InvalidImageSize {
                level,
                expected,
                actual,
            } => write!(
                f,
                "Invalid KTX image size {} for level {}, expected {}",
                actual, level, expected
            ),
            HeaderError::InvalidKeyValueData => write!(f, "Malformed key/value data"),
            HeaderError::UnknownContainer(bytes) => {
                write!(f, "Unknown texture container starting with {:02x?}", bytes)
            }

            HeaderError::Io(error) => write!(f, "I/O error: {}", error),
        }
    }
}

impl From<std::io::Error> for HeaderError {
    fn from(error: std::io::Error) -> Self {
        HeaderError::Io(error)
    }
}
impl std::error::Error for HeaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HeaderError::Io(error) => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub enum DecodeError {
    /// The stream ended before a mip level was complete.
    ///
    /// `expected` is the number of bytes the level needs according to its
    /// format and size, `actual` is the number of bytes that were available.
    Truncated { expected: u64, actual: u64 },

    /// Decoding the texture would need more memory than
    /// [`crate::Options::memory_limit`] allows.
    MemoryLimitExceeded { required: u64, limit: u64 },

    Block(BlockError),
    Layout(LayoutError),
    Format(FormatError),
    Header(HeaderError),
    Io(std::io::Error),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Truncated { expected, actual } => {
                write!(
                    f,
                    "Unexpected end of data: expected {} bytes, got {}",
                    expected, actual
                )
            }
            DecodeError::MemoryLimitExceeded { required, limit } => {
                write!(
                    f,
                    "Memory limit exceeded: {} bytes required, limit is {}",
                    required, limit
                )
            }

            DecodeError::Block(error) => write!(f, "Malformed block: {}", error),
            DecodeError::Layout(error) => write!(f, "{}", error),
            DecodeError::Format(error) => write!(f, "{}", error),
            DecodeError::Header(error) => write!(f, "Header error: {}", error),
            DecodeError::Io(error) => write!(f, "I/O error: {}", error),
        }
    }
}

impl From<BlockError> for DecodeError {
    fn from(error: BlockError) -> Self {
        DecodeError::Block(error)
    }
}
impl From<LayoutError> for DecodeError {
    fn from(error: LayoutError) -> Self {
        DecodeError::Layout(error)
    }
}
impl From<FormatError> for DecodeError {
    fn from(error: FormatError) -> Self {
        DecodeError::Format(error)
    }
}
impl From<HeaderError> for DecodeError {
    fn from(error: HeaderError) -> Self {
        DecodeError::Header(error)
    }
}
impl From<std::io::Error> for DecodeError {
    fn from(error: std::io::Error) -> Self {
        DecodeError::Io(error)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Block(error) => Some(error),
            DecodeError::Layout(error) => Some(error),
            DecodeError::Format(error) => Some(error),
            DecodeError::Header(error) => Some(error),
            DecodeError::Io(error) => Some(error),
            _ => None,
        }
    }
}
