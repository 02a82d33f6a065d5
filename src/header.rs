//! The DDS file header.
//!
//! https://learn.microsoft.com/en-us/windows/win32/direct3ddds/dds-header

use crate::{dxgi_format::DxgiFormat, util::read_u32_le_array, HeaderError};
use bitflags::bitflags;
use std::io::Read;

/// The DDS header and the DX10 extension header if any.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Header {
    pub flags: DdsFlags,
    pub height: u32,
    pub width: u32,
    /// Depth of a volume texture. Only present if [`DdsFlags::DEPTH`] is set.
    pub depth: Option<u32>,
    /// Number of mip levels, including the base level.
    ///
    /// `None` if neither the flags nor the caps declare mipmaps.
    pub mipmap_count: Option<u32>,
    pub pixel_format: PixelFormat,
    pub caps: DdsCaps,
    pub caps2: DdsCaps2,
    /// The DX10 header extension, present if the FourCC is `DX10`.
    pub dx10: Option<Dx10Header>,
}

impl Header {
    const SIZE: u32 = 124;
    const INTS: usize = Self::SIZE as usize / 4;

    /// The magic bytes (`'DDS '`) at the start of every DDS file.
    pub const MAGIC: [u8; 4] = *b"DDS ";

    /// Reads the 4 magic bytes and checks them against [`Header::MAGIC`].
    pub fn read_magic<R: Read + ?Sized>(reader: &mut R) -> Result<(), HeaderError> {
        let mut buffer = [0; 4];
        reader.read_exact(&mut buffer)?;

        if buffer != Self::MAGIC {
            return Err(HeaderError::InvalidMagicBytes(buffer));
        }
        Ok(())
    }

    /// Reads the header that follows the magic bytes.
    ///
    /// On success, the reader is positioned at the start of the pixel data.
    pub fn read<R: Read + ?Sized>(reader: &mut R) -> Result<Self, HeaderError> {
        let words: [u32; Self::INTS] = read_u32_le_array(reader)?;

        if words[0] != Self::SIZE {
            return Err(HeaderError::InvalidHeaderSize(words[0]));
        }

        let flags = DdsFlags::from_bits_retain(words[1]);
        let height = words[2];
        let width = words[3];
        // words[4] is the pitch or linear size, which is never trusted
        let depth = flags.contains(DdsFlags::DEPTH).then_some(words[5]);

        let mut pf = [0; PixelFormat::INTS];
        pf.copy_from_slice(&words[18..26]);
        let pixel_format = PixelFormat::from_words(pf)?;

        let caps = DdsCaps::from_bits_retain(words[26]);
        let caps2 = DdsCaps2::from_bits_retain(words[27]);

        let mipmap_count = (flags.contains(DdsFlags::MIPMAP_COUNT)
            || caps.contains(DdsCaps::MIPMAP))
        .then_some(words[6]);

        let dx10 = if pixel_format.four_cc == Some(FourCC::DX10) {
            Some(Dx10Header::from_words(read_u32_le_array(reader)?)?)
        } else {
            None
        };

        Ok(Self {
            flags,
            height,
            width,
            depth,
            mipmap_count,
            pixel_format,
            caps,
            caps2,
            dx10,
        })
    }

    /// Whether the header describes a cube map, either through the legacy
    /// caps or the DX10 misc flags.
    pub fn is_cube_map(&self) -> bool {
        match &self.dx10 {
            Some(dx10) => dx10.misc_flags.contains(MiscFlags::TEXTURE_CUBE),
            None => self.caps2.contains(DdsCaps2::CUBE_MAP),
        }
    }

    /// Whether the header describes a volume texture.
    pub fn is_volume(&self) -> bool {
        match &self.dx10 {
            Some(dx10) => dx10.resource_dimension == ResourceDimension::Texture3D,
            None => self.caps2.contains(DdsCaps2::VOLUME),
        }
    }
}

/// The `DDS_PIXELFORMAT` structure.
///
/// https://learn.microsoft.com/en-us/windows/win32/direct3ddds/dds-pixelformat
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelFormat {
    pub flags: PixelFormatFlags,
    /// `None` if `flags` does not contain [`PixelFormatFlags::FOURCC`].
    pub four_cc: Option<FourCC>,
    pub rgb_bit_count: u32,
    pub r_bit_mask: u32,
    pub g_bit_mask: u32,
    pub b_bit_mask: u32,
    pub a_bit_mask: u32,
}
impl PixelFormat {
    const SIZE: u32 = 32;
    const INTS: usize = Self::SIZE as usize / 4;

    fn from_words(words: [u32; Self::INTS]) -> Result<Self, HeaderError> {
        if words[0] != Self::SIZE {
            return Err(HeaderError::InvalidPixelFormatSize(words[0]));
        }

        let flags = PixelFormatFlags::from_bits_retain(words[1]);
        let four_cc = flags
            .contains(PixelFormatFlags::FOURCC)
            .then_some(FourCC(words[2]));

        Ok(Self {
            flags,
            four_cc,
            rgb_bit_count: words[3],
            r_bit_mask: words[4],
            g_bit_mask: words[5],
            b_bit_mask: words[6],
            a_bit_mask: words[7],
        })
    }

    /// Whether the pixel format declares an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.flags
            .intersects(PixelFormatFlags::ALPHAPIXELS | PixelFormatFlags::ALPHA)
    }
}

/// The `DDS_HEADER_DXT10` extension.
///
/// https://learn.microsoft.com/en-us/windows/win32/direct3ddds/dds-header-dxt10
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dx10Header {
    pub dxgi_format: DxgiFormat,
    pub resource_dimension: ResourceDimension,
    pub misc_flags: MiscFlags,
    /// The number of array elements. For cube maps, this is the number of
    /// cubes, so the file holds `array_size * 6` faces.
    pub array_size: u32,
    pub alpha_mode: AlphaMode,
}
impl Dx10Header {
    const INTS: usize = 5;

    fn from_words(words: [u32; Self::INTS]) -> Result<Self, HeaderError> {
        let dxgi_format = DxgiFormat::try_from(words[0])
            .map_err(|_| HeaderError::InvalidDxgiFormat(words[0]))?;
        let resource_dimension = ResourceDimension::try_from(words[1])
            .map_err(|_| HeaderError::InvalidResourceDimension(words[1]))?;

        let array_size = words[3];
        if resource_dimension == ResourceDimension::Texture3D && array_size > 1 {
            return Err(HeaderError::InvalidArraySizeForTexture3D(array_size));
        }

        Ok(Self {
            dxgi_format,
            resource_dimension,
            misc_flags: MiscFlags::from_bits_retain(words[2]),
            array_size,
            alpha_mode: AlphaMode::from(words[4] & 0x7),
        })
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DdsFlags: u32 {
        const CAPS = 0x1;
        const HEIGHT = 0x2;
        const WIDTH = 0x4;
        const PITCH = 0x8;
        const PIXEL_FORMAT = 0x1000;
        const MIPMAP_COUNT = 0x20000;
        const LINEAR_SIZE = 0x80000;
        const DEPTH = 0x800000;
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DdsCaps: u32 {
        const COMPLEX = 0x8;
        const TEXTURE = 0x1000;
        const MIPMAP = 0x400000;
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DdsCaps2: u32 {
        const CUBE_MAP = 0x200;
        const CUBE_MAP_POSITIVE_X = 0x400;
        const CUBE_MAP_NEGATIVE_X = 0x800;
        const CUBE_MAP_POSITIVE_Y = 0x1000;
        const CUBE_MAP_NEGATIVE_Y = 0x2000;
        const CUBE_MAP_POSITIVE_Z = 0x4000;
        const CUBE_MAP_NEGATIVE_Z = 0x8000;
        const VOLUME = 0x200000;

        const CUBE_MAP_ALL_FACES = Self::CUBE_MAP_POSITIVE_X.bits()
            | Self::CUBE_MAP_NEGATIVE_X.bits()
            | Self::CUBE_MAP_POSITIVE_Y.bits()
            | Self::CUBE_MAP_NEGATIVE_Y.bits()
            | Self::CUBE_MAP_POSITIVE_Z.bits()
            | Self::CUBE_MAP_NEGATIVE_Z.bits();
    }

    /// Values which indicate what type of data is in the surface.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PixelFormatFlags: u32 {
        /// The alpha mask is valid.
        const ALPHAPIXELS = 0x1;
        /// Alpha-only data in some older files.
        const ALPHA = 0x2;
        const FOURCC = 0x4;
        const RGB = 0x40;
        const YUV = 0x200;
        const LUMINANCE = 0x20000;
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MiscFlags: u32 {
        /// The 2D texture array holds cube maps, 6 faces per element.
        const TEXTURE_CUBE = 0x4;
    }
}

/// https://learn.microsoft.com/en-us/windows/win32/api/d3d11/ne-d3d11-d3d11_resource_dimension
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceDimension {
    Texture1D = 2,
    Texture2D = 3,
    Texture3D = 4,
}
impl TryFrom<u32> for ResourceDimension {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(ResourceDimension::Texture1D),
            3 => Ok(ResourceDimension::Texture2D),
            4 => Ok(ResourceDimension::Texture3D),
            _ => Err(value),
        }
    }
}

/// The lower 3 bits of `miscFlags2` in the DX10 header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlphaMode {
    Unknown,
    Straight,
    Premultiplied,
    /// The alpha channel is fully opaque.
    Opaque,
    /// The alpha channel is a 4th data channel.
    Custom,
    Reserved(u32),
}
impl From<u32> for AlphaMode {
    fn from(value: u32) -> Self {
        match value {
            0 => AlphaMode::Unknown,
            1 => AlphaMode::Straight,
            2 => AlphaMode::Premultiplied,
            3 => AlphaMode::Opaque,
            4 => AlphaMode::Custom,
            _ => AlphaMode::Reserved(value),
        }
    }
}

/// A four-character code, stored as a little endian `u32`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC(pub u32);

impl FourCC {
    pub const DXT1: Self = FourCC(u32::from_le_bytes(*b"DXT1"));
    pub const DXT2: Self = FourCC(u32::from_le_bytes(*b"DXT2"));
    pub const DXT3: Self = FourCC(u32::from_le_bytes(*b"DXT3"));
    pub const DXT4: Self = FourCC(u32::from_le_bytes(*b"DXT4"));
    pub const DXT5: Self = FourCC(u32::from_le_bytes(*b"DXT5"));

    pub const DX10: Self = FourCC(u32::from_le_bytes(*b"DX10"));

    pub const ATI1: Self = FourCC(u32::from_le_bytes(*b"ATI1"));
    pub const BC4U: Self = FourCC(u32::from_le_bytes(*b"BC4U"));
    pub const BC4S: Self = FourCC(u32::from_le_bytes(*b"BC4S"));

    pub const ATI2: Self = FourCC(u32::from_le_bytes(*b"ATI2"));
    pub const BC5U: Self = FourCC(u32::from_le_bytes(*b"BC5U"));
    pub const BC5S: Self = FourCC(u32::from_le_bytes(*b"BC5S"));

    pub const ETC1: Self = FourCC(u32::from_le_bytes(*b"ETC1"));
}

impl std::fmt::Debug for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = self.0.to_le_bytes();
        if bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b' ') {
            let text: String = bytes.iter().map(|&b| b as char).collect();
            write!(f, "FourCC({:?})", text)
        } else {
            // D3DFMT values
            write!(f, "FourCC({})", self.0)
        }
    }
}
