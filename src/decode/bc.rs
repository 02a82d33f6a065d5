//! DXT1/3/5 and BC4/5 blocks.
//!
//! All functions return 16 pixels in row-major order. Color formats produce
//! BGRA, so the result can be copied into a [`crate::ImageFormat::Bgra8`]
//! surface as is.
//!
//! Reference:
//! https://learn.microsoft.com/en-us/windows/win32/direct3d10/d3d10-graphics-programming-guide-resources-block-compression

use super::convert::{n4, s8, B5G6R5};

/// How the color block of DXT1 treats `c0 <= c1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorMode {
    /// DXT3 and DXT5 blocks always interpolate 4 colors.
    FourColor,
    /// DXT1: 3 colors and opaque black.
    Opaque,
    /// DXT1 with 1-bit alpha: 3 colors and transparent black.
    Transparent,
}

fn split_16(x: [u8; 16]) -> ([u8; 8], [u8; 8]) {
    let mut lower = [0; 8];
    let mut upper = [0; 8];
    lower.copy_from_slice(&x[..8]);
    upper.copy_from_slice(&x[8..]);
    (lower, upper)
}

fn bgra([r, g, b]: [u8; 3]) -> [u8; 4] {
    [b, g, r, 255]
}

fn mix(a: [u8; 4], b: [u8; 4], f: impl Fn(u16, u16) -> u16) -> [u8; 4] {
    [
        f(a[0] as u16, b[0] as u16) as u8,
        f(a[1] as u16, b[1] as u16) as u8,
        f(a[2] as u16, b[2] as u16) as u8,
        255,
    ]
}

fn color_block(block: [u8; 8], mode: ColorMode) -> [[u8; 4]; 16] {
    let color0 = u16::from_le_bytes([block[0], block[1]]);
    let color1 = u16::from_le_bytes([block[2], block[3]]);

    let c0 = bgra(B5G6R5::from_u16(color0).to_n8());
    let c1 = bgra(B5G6R5::from_u16(color1).to_n8());

    let (c2, c3) = if mode == ColorMode::FourColor || color0 > color1 {
        (
            mix(c0, c1, |a, b| (2 * a + b) / 3),
            mix(c0, c1, |a, b| (a + 2 * b) / 3),
        )
    } else {
        let black = if mode == ColorMode::Transparent {
            [0, 0, 0, 0]
        } else {
            [0, 0, 0, 255]
        };
        (mix(c0, c1, |a, b| (a + b) / 2), black)
    };

    let lut = [c0, c1, c2, c3];
    let indexes = u32::from_le_bytes([block[4], block[5], block[6], block[7]]);

    let mut pixels = [[0; 4]; 16];
    for (i, pixel) in pixels.iter_mut().enumerate() {
        *pixel = lut[(indexes >> (i * 2)) as usize & 0b11];
    }
    pixels
}

/// DXT1 without alpha. Index 3 of a 3-color block is opaque black.
pub(crate) fn dxt1(block: [u8; 8]) -> [[u8; 4]; 16] {
    color_block(block, ColorMode::Opaque)
}

/// DXT1 with 1-bit alpha. Index 3 of a 3-color block is transparent.
pub(crate) fn dxt1_alpha(block: [u8; 8]) -> [[u8; 4]; 16] {
    color_block(block, ColorMode::Transparent)
}

/// DXT3 (BC2): explicit 4-bit alpha followed by a DXT1 color block.
pub(crate) fn dxt3(block: [u8; 16]) -> [[u8; 4]; 16] {
    let (alpha_bytes, color_bytes) = split_16(block);
    let alpha = u64::from_le_bytes(alpha_bytes);

    let mut pixels = color_block(color_bytes, ColorMode::FourColor);
    for (i, pixel) in pixels.iter_mut().enumerate() {
        pixel[3] = n4::n8((alpha >> (i * 4)) as u8 & 0xF);
    }
    pixels
}

/// DXT5 (BC3): a BC4 alpha block followed by a DXT1 color block.
pub(crate) fn dxt5(block: [u8; 16]) -> [[u8; 4]; 16] {
    let (alpha_bytes, color_bytes) = split_16(block);
    let alpha = ramp_lookup(alpha_bytes, bc4_ramp(alpha_bytes[0], alpha_bytes[1]));

    let mut pixels = color_block(color_bytes, ColorMode::FourColor);
    for (pixel, alpha) in pixels.iter_mut().zip(alpha) {
        pixel[3] = alpha;
    }
    pixels
}

/// The 8 values an unsigned BC4 block can select from.
pub(crate) fn bc4_ramp(e0: u8, e1: u8) -> [u8; 8] {
    let (a, b) = (e0 as u16, e1 as u16);
    if e0 > e1 {
        // 6 interpolated values, rounded to nearest
        let lerp = |i: u16| (((7 - i) * a + i * b + 3) / 7) as u8;
        [e0, e1, lerp(1), lerp(2), lerp(3), lerp(4), lerp(5), lerp(6)]
    } else {
        // 4 interpolated values and the two sentinels
        let lerp = |i: u16| (((5 - i) * a + i * b + 2) / 5) as u8;
        [e0, e1, lerp(1), lerp(2), lerp(3), lerp(4), 0, 255]
    }
}

/// The 8 values a signed BC4 block can select from, mapped from `[-127, 127]`
/// to `[0, 255]`.
pub(crate) fn bc4s_ramp(e0: u8, e1: u8) -> [u8; 8] {
    let (a, b) = (s8::norm(e0) as u32, s8::norm(e1) as u32);
    let c0 = s8::n8(e0);
    let c1 = s8::n8(e1);

    // The interpolation runs on [0, 254] and is scaled to [0, 255] with a
    // single rounding step.
    if e0 as i8 > e1 as i8 {
        let lerp = |i: u32| (((7 - i) * a + i * b) * 255 + 889) / 1778;
        let l = [1, 2, 3, 4, 5, 6].map(|i| lerp(i) as u8);
        [c0, c1, l[0], l[1], l[2], l[3], l[4], l[5]]
    } else {
        let lerp = |i: u32| (((5 - i) * a + i * b) * 255 + 635) / 1270;
        let l = [1, 2, 3, 4].map(|i| lerp(i) as u8);
        // -127 and 127
        [c0, c1, l[0], l[1], l[2], l[3], 0, 255]
    }
}

/// Selects a ramp value for every pixel using the 3-bit indexes in bytes
/// 2..8 of the block.
fn ramp_lookup(block: [u8; 8], ramp: [u8; 8]) -> [u8; 16] {
    let indexes = u64::from_le_bytes([
        block[2], block[3], block[4], block[5], block[6], block[7], 0, 0,
    ]);
    let mut values = [0; 16];
    for (i, value) in values.iter_mut().enumerate() {
        *value = ramp[(indexes >> (i * 3)) as usize & 0b111];
    }
    values
}

fn gray_to_bgra(values: [u8; 16]) -> [[u8; 4]; 16] {
    values.map(|v| [v, v, v, 255])
}

pub(crate) fn bc4(block: [u8; 8]) -> [[u8; 4]; 16] {
    gray_to_bgra(ramp_lookup(block, bc4_ramp(block[0], block[1])))
}

pub(crate) fn bc4s(block: [u8; 8]) -> [[u8; 4]; 16] {
    gray_to_bgra(ramp_lookup(block, bc4s_ramp(block[0], block[1])))
}

fn red_green(red: [u8; 16], green: [u8; 16], blue: u8) -> [[u8; 4]; 16] {
    let mut pixels = [[0; 4]; 16];
    for (i, pixel) in pixels.iter_mut().enumerate() {
        *pixel = [blue, green[i], red[i], 255];
    }
    pixels
}

/// BC5: red and green as two BC4 blocks, blue is 0.
pub(crate) fn bc5(block: [u8; 16]) -> [[u8; 4]; 16] {
    let (red, green) = split_16(block);
    red_green(
        ramp_lookup(red, bc4_ramp(red[0], red[1])),
        ramp_lookup(green, bc4_ramp(green[0], green[1])),
        0,
    )
}

/// Signed BC5. Blue is the signed zero, 128.
pub(crate) fn bc5s(block: [u8; 16]) -> [[u8; 4]; 16] {
    let (red, green) = split_16(block);
    red_green(
        ramp_lookup(red, bc4s_ramp(red[0], red[1])),
        ramp_lookup(green, bc4s_ramp(green[0], green[1])),
        s8::n8(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same_rows(row: [[u8; 4]; 4]) -> [[u8; 4]; 16] {
        let mut pixels = [[0; 4]; 16];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = row[i % 4];
        }
        pixels
    }

    #[test]
    fn dxt1_solid_red() {
        // red is B=0 G=0 R=255 in BGRA
        let pixels = dxt1([0x00, 0xF8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(pixels, [[0, 0, 255, 255]; 16]);
    }

    #[test]
    fn dxt1_four_colors() {
        // white and black, indexes 0 1 2 3 in every row
        let block = [0xFF, 0xFF, 0x00, 0x00, 0xE4, 0xE4, 0xE4, 0xE4];
        let expected = same_rows([
            [255, 255, 255, 255],
            [0, 0, 0, 255],
            [170, 170, 170, 255],
            [85, 85, 85, 255],
        ]);
        assert_eq!(dxt1(block), expected);
        assert_eq!(dxt1_alpha(block), expected);
    }

    #[test]
    fn dxt1_truncates_thirds() {
        // c0 = red 31 -> 255, c1 = red 1 -> 8
        let block = [0x00, 0xF8, 0x00, 0x08, 0xE4, 0xE4, 0xE4, 0xE4];
        let expected = same_rows([
            [0, 0, 255, 255],
            [0, 0, 8, 255],
            [0, 0, 172, 255],
            [0, 0, 90, 255],
        ]);
        assert_eq!(dxt1(block), expected);
    }

    #[test]
    fn dxt1_three_colors() {
        // c0 = blue <= c1 = red
        let block = [0x1F, 0x00, 0x00, 0xF8, 0xE4, 0xE4, 0xE4, 0xE4];

        let mut row = [
            [255, 0, 0, 255],
            [0, 0, 255, 255],
            [127, 0, 127, 255],
            [0, 0, 0, 255],
        ];
        assert_eq!(dxt1(block), same_rows(row));

        row[3] = [0, 0, 0, 0];
        assert_eq!(dxt1_alpha(block), same_rows(row));
    }

    #[test]
    fn dxt3_explicit_alpha() {
        let block = [
            0x10, 0x32, 0x54, 0x76, 0x98, 0xBA, 0xDC, 0xFE, // alpha nibbles 0..=15
            0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // c0 < c1, all index 3
        ];
        let pixels = dxt3(block);
        for (i, pixel) in pixels.iter().enumerate() {
            // always 4-color, so index 3 is (c0 + 2*c1) / 3 and not black
            assert_eq!(*pixel, [170, 170, 170, i as u8 * 17]);
        }
    }

    #[test]
    fn dxt5_interpolated_alpha() {
        let block = [
            0xFF, 0x00, 0x88, 0xC6, 0xFA, 0x88, 0xC6, 0xFA, // index i % 8 for pixel i
            0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // white
        ];
        let ramp = [255, 0, 219, 182, 146, 109, 73, 36];
        let pixels = dxt5(block);
        for (i, pixel) in pixels.iter().enumerate() {
            assert_eq!(*pixel, [255, 255, 255, ramp[i % 8]]);
        }
    }

    #[test]
    fn bc4_ramp_values() {
        assert_eq!(bc4_ramp(255, 0), [255, 0, 219, 182, 146, 109, 73, 36]);
        assert_eq!(bc4_ramp(0, 255), [0, 255, 51, 102, 153, 204, 0, 255]);
        assert_eq!(bc4_ramp(7, 7), [7, 7, 7, 7, 7, 7, 0, 255]);
    }

    #[test]
    fn bc4_ramps_are_monotonic() {
        for e0 in 0..=255_u8 {
            for e1 in 0..=255_u8 {
                for (ramp, six) in [
                    (bc4_ramp(e0, e1), e0 > e1),
                    (bc4s_ramp(e0, e1), e0 as i8 > e1 as i8),
                ] {
                    if six {
                        let ordered = [0, 2, 3, 4, 5, 6, 7, 1].map(|i| ramp[i]);
                        assert!(
                            ordered.windows(2).all(|w| w[0] >= w[1]),
                            "{} {} {:?}",
                            e0,
                            e1,
                            ramp
                        );
                    } else {
                        let ordered = [0, 2, 3, 4, 5, 1].map(|i| ramp[i]);
                        assert!(
                            ordered.windows(2).all(|w| w[0] <= w[1]),
                            "{} {} {:?}",
                            e0,
                            e1,
                            ramp
                        );
                        assert_eq!((ramp[6], ramp[7]), (0, 255));
                    }
                }
            }
        }
    }

    #[test]
    fn bc4s_endpoints() {
        // -128 and -127 are both -1.0
        assert_eq!(bc4s_ramp(0x80, 0x7F)[..2], [0, 255]);
        assert_eq!(bc4s_ramp(0x81, 0x7F)[..2], [0, 255]);
        // 0 is the middle of the range
        assert_eq!(bc4s_ramp(0x00, 0x00)[0], 128);
        // -127 to 127 in 4 steps: -76.2, -25.4, 25.4, 76.2
        assert_eq!(bc4s_ramp(0x81, 0x7F), [0, 255, 51, 102, 153, 204, 0, 255]);
    }

    #[test]
    fn bc4_gray() {
        let pixels = bc4([0x00, 0xFF, 0x88, 0xC6, 0xFA, 0x88, 0xC6, 0xFA]);
        let ramp = bc4_ramp(0, 255);
        for (i, pixel) in pixels.iter().enumerate() {
            let v = ramp[i % 8];
            assert_eq!(*pixel, [v, v, v, 255]);
        }
    }

    #[test]
    fn bc5_channels() {
        let block = [
            0xFF, 0x00, 0, 0, 0, 0, 0, 0, // red: all 255
            0x00, 0xFF, 0, 0, 0, 0, 0, 0, // green: all 0
        ];
        assert_eq!(bc5(block), [[0, 0, 255, 255]; 16]);

        let block = [
            0x7F, 0x81, 0, 0, 0, 0, 0, 0, // red: 1.0
            0x00, 0x00, 0, 0, 0, 0, 0, 0, // green: 0.0
        ];
        assert_eq!(bc5s(block), [[128, 128, 255, 255]; 16]);
    }
}
