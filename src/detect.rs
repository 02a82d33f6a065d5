//! Mapping container format descriptions to a [`BlockFormat`].

use crate::{
    dxgi_format::DxgiFormat, header::FourCC, BlockFormat, FormatError, UncompressedFormat,
};

/// How a container names the encoding of its pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionScheme {
    /// A DDS FourCC code, including the numeric D3DFMT values some encoders
    /// store in that field.
    FourCC(FourCC),
    /// The DXGI format of a DDS DX10 header.
    Dxgi(DxgiFormat),
    /// The `glInternalFormat`, `glFormat` and `glType` of a KTX file.
    Gl {
        internal_format: u32,
        format: u32,
        ty: u32,
    },
    /// The `vkFormat` of a KTX2 file.
    Vulkan(u32),
    /// Uncompressed data described by [`PixelMasks`].
    Masked,
}

/// The bit count and channel masks of an uncompressed DDS pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelMasks {
    pub bit_count: u32,
    pub r: u32,
    pub g: u32,
    pub b: u32,
    pub a: u32,
}

/// Resolves the block format of a container.
///
/// `alpha` tells whether the container declares an alpha channel. It only
/// matters for DXT1, where it selects [`BlockFormat::Dxt1Alpha`].
pub fn block_format(
    scheme: CompressionScheme,
    masks: &PixelMasks,
    alpha: bool,
) -> Result<BlockFormat, FormatError> {
    let format = match scheme {
        CompressionScheme::FourCC(four_cc) => {
            four_cc_format(four_cc).ok_or(FormatError::UnsupportedFourCC(four_cc))?
        }
        CompressionScheme::Dxgi(dxgi) => {
            dxgi_block_format(dxgi).ok_or(FormatError::UnsupportedDxgiFormat(dxgi))?
        }
        CompressionScheme::Gl {
            internal_format,
            format,
            ty,
        } => gl_block_format(internal_format, format, ty).ok_or(
            FormatError::UnsupportedGlFormat {
                internal_format,
                format,
                ty,
            },
        )?,
        CompressionScheme::Vulkan(vk_format) => {
            vk_block_format(vk_format).ok_or(FormatError::UnsupportedVkFormat(vk_format))?
        }
        CompressionScheme::Masked => masked_format(masks)
            .map(BlockFormat::Uncompressed)
            .ok_or(FormatError::UnsupportedPixelMasks {
                bit_count: masks.bit_count,
                masks: [masks.r, masks.g, masks.b, masks.a],
            })?,
    };

    Ok(match format {
        BlockFormat::Dxt1 if alpha => BlockFormat::Dxt1Alpha,
        format => format,
    })
}

pub(crate) const fn four_cc_format(four_cc: FourCC) -> Option<BlockFormat> {
    use UncompressedFormat as U;

    Some(match four_cc {
        FourCC::DXT1 => BlockFormat::Dxt1,
        // premultiplied alpha is not undone
        FourCC::DXT2 | FourCC::DXT3 => BlockFormat::Dxt3,
        FourCC::DXT4 | FourCC::DXT5 => BlockFormat::Dxt5,

        FourCC::ATI1 | FourCC::BC4U => BlockFormat::Bc4,
        FourCC::BC4S => BlockFormat::Bc4S,
        FourCC::ATI2 | FourCC::BC5U => BlockFormat::Bc5,
        FourCC::BC5S => BlockFormat::Bc5S,

        FourCC::ETC1 => BlockFormat::Etc1,

        // D3DFMT constants
        // https://learn.microsoft.com/en-us/windows/win32/direct3d9/d3dformat
        FourCC(36) => BlockFormat::Uncompressed(U::R16G16B16A16),
        FourCC(113) => BlockFormat::Uncompressed(U::R16G16B16A16Float),
        FourCC(116) => BlockFormat::Uncompressed(U::R32G32B32A32Float),

        _ => return None,
    })
}

pub(crate) const fn dxgi_block_format(dxgi: DxgiFormat) -> Option<BlockFormat> {
    use UncompressedFormat as U;

    Some(match dxgi {
        DxgiFormat::BC1_TYPELESS | DxgiFormat::BC1_UNORM | DxgiFormat::BC1_UNORM_SRGB => {
            BlockFormat::Dxt1
        }
        DxgiFormat::BC2_TYPELESS | DxgiFormat::BC2_UNORM | DxgiFormat::BC2_UNORM_SRGB => {
            BlockFormat::Dxt3
        }
        DxgiFormat::BC3_TYPELESS | DxgiFormat::BC3_UNORM | DxgiFormat::BC3_UNORM_SRGB => {
            BlockFormat::Dxt5
        }
        DxgiFormat::BC4_TYPELESS | DxgiFormat::BC4_UNORM => BlockFormat::Bc4,
        DxgiFormat::BC4_SNORM => BlockFormat::Bc4S,
        DxgiFormat::BC5_TYPELESS | DxgiFormat::BC5_UNORM => BlockFormat::Bc5,
        DxgiFormat::BC5_SNORM => BlockFormat::Bc5S,
        DxgiFormat::BC6H_TYPELESS | DxgiFormat::BC6H_UF16 => BlockFormat::Bc6H,
        DxgiFormat::BC6H_SF16 => BlockFormat::Bc6HS,
        DxgiFormat::BC7_TYPELESS | DxgiFormat::BC7_UNORM | DxgiFormat::BC7_UNORM_SRGB => {
            BlockFormat::Bc7
        }

        DxgiFormat::R8_TYPELESS | DxgiFormat::R8_UNORM => BlockFormat::Uncompressed(U::L8),
        DxgiFormat::A8_UNORM => BlockFormat::Uncompressed(U::A8),
        DxgiFormat::B5G6R5_UNORM => BlockFormat::Uncompressed(U::B5G6R5),
        DxgiFormat::B5G5R5A1_UNORM => BlockFormat::Uncompressed(U::B5G5R5A1),
        DxgiFormat::B4G4R4A4_UNORM => BlockFormat::Uncompressed(U::B4G4R4A4),
        DxgiFormat::R8G8B8A8_TYPELESS
        | DxgiFormat::R8G8B8A8_UNORM
        | DxgiFormat::R8G8B8A8_UNORM_SRGB => BlockFormat::Uncompressed(U::R8G8B8A8),
        DxgiFormat::B8G8R8A8_TYPELESS
        | DxgiFormat::B8G8R8A8_UNORM
        | DxgiFormat::B8G8R8A8_UNORM_SRGB => BlockFormat::Uncompressed(U::B8G8R8A8),
        DxgiFormat::B8G8R8X8_TYPELESS
        | DxgiFormat::B8G8R8X8_UNORM
        | DxgiFormat::B8G8R8X8_UNORM_SRGB => BlockFormat::Uncompressed(U::B8G8R8X8),
        DxgiFormat::R10G10B10A2_TYPELESS | DxgiFormat::R10G10B10A2_UNORM => {
            BlockFormat::Uncompressed(U::R10G10B10A2)
        }
        DxgiFormat::R16G16B16A16_TYPELESS | DxgiFormat::R16G16B16A16_UNORM => {
            BlockFormat::Uncompressed(U::R16G16B16A16)
        }
        DxgiFormat::R16G16B16A16_FLOAT => BlockFormat::Uncompressed(U::R16G16B16A16Float),
        DxgiFormat::R32G32B32_TYPELESS | DxgiFormat::R32G32B32_FLOAT => {
            BlockFormat::Uncompressed(U::R32G32B32Float)
        }
        DxgiFormat::R32G32B32A32_TYPELESS | DxgiFormat::R32G32B32A32_FLOAT => {
            BlockFormat::Uncompressed(U::R32G32B32A32Float)
        }

        _ => return None,
    })
}

mod gl {
    pub const UNSIGNED_BYTE: u32 = 0x1401;
    pub const UNSIGNED_SHORT: u32 = 0x1403;
    pub const FLOAT: u32 = 0x1406;
    pub const HALF_FLOAT: u32 = 0x140B;
    pub const UNSIGNED_SHORT_5_6_5: u32 = 0x8363;
    pub const UNSIGNED_SHORT_4_4_4_4_REV: u32 = 0x8365;
    pub const UNSIGNED_SHORT_1_5_5_5_REV: u32 = 0x8366;
    pub const UNSIGNED_INT_2_10_10_10_REV: u32 = 0x8368;

    pub const RED: u32 = 0x1903;
    pub const ALPHA: u32 = 0x1906;
    pub const RGB: u32 = 0x1907;
    pub const RGBA: u32 = 0x1908;
    pub const LUMINANCE: u32 = 0x1909;
    pub const LUMINANCE_ALPHA: u32 = 0x190A;
    pub const BGR: u32 = 0x80E0;
    pub const BGRA: u32 = 0x80E1;
}

/// Compressed formats only need `internal_format`. Uncompressed data is
/// identified by `format` and `ty`, since `internal_format` is only a sized
/// request for the GPU.
pub(crate) const fn gl_block_format(internal_format: u32, format: u32, ty: u32) -> Option<BlockFormat> {
    use UncompressedFormat as U;

    if ty == 0 {
        return Some(match internal_format {
            // S3TC, with and without sRGB
            0x83F0 | 0x8C4C => BlockFormat::Dxt1,
            0x83F1 | 0x8C4D => BlockFormat::Dxt1Alpha,
            0x83F2 | 0x8C4E => BlockFormat::Dxt3,
            0x83F3 | 0x8C4F => BlockFormat::Dxt5,
            // RGTC
            0x8DBB => BlockFormat::Bc4,
            0x8DBC => BlockFormat::Bc4S,
            0x8DBD => BlockFormat::Bc5,
            0x8DBE => BlockFormat::Bc5S,
            // BPTC
            0x8E8C | 0x8E8D => BlockFormat::Bc7,
            0x8E8E => BlockFormat::Bc6HS,
            0x8E8F => BlockFormat::Bc6H,
            // ETC
            0x8D64 => BlockFormat::Etc1,
            0x9274 | 0x9275 => BlockFormat::Etc2Rgb,
            0x9276 | 0x9277 => BlockFormat::Etc2RgbA1,
            0x9278 | 0x9279 => BlockFormat::Etc2Rgba,
            _ => return None,
        });
    }

    let format = match (format, ty) {
        (gl::RED | gl::LUMINANCE, gl::UNSIGNED_BYTE) => U::L8,
        (gl::ALPHA, gl::UNSIGNED_BYTE) => U::A8,
        (gl::LUMINANCE_ALPHA, gl::UNSIGNED_BYTE) => U::L8A8,
        (gl::RGB, gl::UNSIGNED_BYTE) => U::R8G8B8,
        (gl::BGR, gl::UNSIGNED_BYTE) => U::B8G8R8,
        (gl::RGBA, gl::UNSIGNED_BYTE) => U::R8G8B8A8,
        (gl::BGRA, gl::UNSIGNED_BYTE) => U::B8G8R8A8,
        (gl::RGB, gl::UNSIGNED_SHORT_5_6_5) => U::B5G6R5,
        (gl::BGRA, gl::UNSIGNED_SHORT_4_4_4_4_REV) => U::B4G4R4A4,
        (gl::BGRA, gl::UNSIGNED_SHORT_1_5_5_5_REV) => U::B5G5R5A1,
        (gl::RGBA, gl::UNSIGNED_INT_2_10_10_10_REV) => U::R10G10B10A2,
        (gl::RGBA, gl::UNSIGNED_SHORT) => U::R16G16B16A16,
        (gl::RGBA, gl::HALF_FLOAT) => U::R16G16B16A16Float,
        (gl::RGB, gl::FLOAT) => U::R32G32B32Float,
        (gl::RGBA, gl::FLOAT) => U::R32G32B32A32Float,
        _ => return None,
    };
    Some(BlockFormat::Uncompressed(format))
}

/// https://registry.khronos.org/vulkan/specs/1.3/html/vkspec.html#VkFormat
pub(crate) const fn vk_block_format(vk_format: u32) -> Option<BlockFormat> {
    use UncompressedFormat as U;

    Some(match vk_format {
        4 => BlockFormat::Uncompressed(U::B5G6R5), // R5G6B5_UNORM_PACK16
        8 => BlockFormat::Uncompressed(U::B5G5R5A1), // A1R5G5B5_UNORM_PACK16
        9 => BlockFormat::Uncompressed(U::L8),
        23 | 29 => BlockFormat::Uncompressed(U::R8G8B8),
        30 | 36 => BlockFormat::Uncompressed(U::B8G8R8),
        37 | 43 => BlockFormat::Uncompressed(U::R8G8B8A8),
        44 | 50 => BlockFormat::Uncompressed(U::B8G8R8A8),
        64 => BlockFormat::Uncompressed(U::R10G10B10A2), // A2B10G10R10_UNORM_PACK32
        91 => BlockFormat::Uncompressed(U::R16G16B16A16),
        97 => BlockFormat::Uncompressed(U::R16G16B16A16Float),
        106 => BlockFormat::Uncompressed(U::R32G32B32Float),
        109 => BlockFormat::Uncompressed(U::R32G32B32A32Float),

        131 | 132 => BlockFormat::Dxt1,
        133 | 134 => BlockFormat::Dxt1Alpha,
        135 | 136 => BlockFormat::Dxt3,
        137 | 138 => BlockFormat::Dxt5,
        139 => BlockFormat::Bc4,
        140 => BlockFormat::Bc4S,
        141 => BlockFormat::Bc5,
        142 => BlockFormat::Bc5S,
        143 => BlockFormat::Bc6H,
        144 => BlockFormat::Bc6HS,
        145 | 146 => BlockFormat::Bc7,
        147 | 148 => BlockFormat::Etc2Rgb,
        149 | 150 => BlockFormat::Etc2RgbA1,
        151 | 152 => BlockFormat::Etc2Rgba,

        _ => return None,
    })
}

struct MaskPattern {
    bit_count: u32,
    masks: [u32; 4],
    format: UncompressedFormat,
}

const fn pattern(bit_count: u32, masks: [u32; 4], format: UncompressedFormat) -> MaskPattern {
    MaskPattern {
        bit_count,
        masks,
        format,
    }
}

/// Known layouts, as RGBA masks.
const KNOWN_MASKS: &[MaskPattern] = {
    use UncompressedFormat::*;

    &[
        pattern(8, [0xFF, 0, 0, 0], L8),
        pattern(8, [0, 0, 0, 0xFF], A8),
        pattern(16, [0xFF, 0, 0, 0xFF00], L8A8),
        pattern(16, [0xF800, 0x07E0, 0x001F, 0], B5G6R5),
        pattern(16, [0x7C00, 0x03E0, 0x001F, 0], B5G5R5X1),
        pattern(16, [0x7C00, 0x03E0, 0x001F, 0x8000], B5G5R5A1),
        pattern(16, [0x0F00, 0x00F0, 0x000F, 0xF000], B4G4R4A4),
        pattern(24, [0xFF0000, 0xFF00, 0xFF, 0], B8G8R8),
        pattern(24, [0xFF, 0xFF00, 0xFF0000, 0], R8G8B8),
        pattern(32, [0xFF0000, 0xFF00, 0xFF, 0xFF000000], B8G8R8A8),
        pattern(32, [0xFF0000, 0xFF00, 0xFF, 0], B8G8R8X8),
        pattern(32, [0xFF, 0xFF00, 0xFF0000, 0xFF000000], R8G8B8A8),
        pattern(32, [0xFF, 0xFF00, 0xFF0000, 0], R8G8B8X8),
        // D3DX writes the red and blue masks of this format swapped
        pattern(32, [0x3FF00000, 0xFFC00, 0x3FF, 0xC0000000], R10G10B10A2),
        pattern(32, [0x3FF, 0xFFC00, 0x3FF00000, 0xC0000000], R10G10B10A2),
    ]
};

pub(crate) fn masked_format(masks: &PixelMasks) -> Option<UncompressedFormat> {
    let rgba = [masks.r, masks.g, masks.b, masks.a];
    KNOWN_MASKS
        .iter()
        .find(|p| p.bit_count == masks.bit_count && p.masks == rgba)
        .map(|p| p.format)
}
