//! ETC1, ETC2 and EAC alpha blocks.
//!
//! Blocks are stored big endian. Texel indexes are stored column by column,
//! the decoded pixels are returned row by row in BGRA order.
//!
//! Reference: Khronos Data Format Specification 1.3, sections 21 and 22.

use crate::BlockError;

/// Intensity modifiers of the individual and differential modes.
const MODIFIERS: [[i16; 4]; 8] = [
    [2, 8, -2, -8],
    [5, 17, -5, -17],
    [9, 29, -9, -29],
    [13, 42, -13, -42],
    [18, 60, -18, -60],
    [24, 80, -24, -80],
    [33, 106, -33, -106],
    [47, 183, -47, -183],
];

/// Distances of the T and H modes.
const DISTANCES: [i16; 8] = [3, 6, 11, 16, 23, 32, 41, 64];

const EAC_MODIFIERS: [[i16; 8]; 16] = [
    [-3, -6, -9, -15, 2, 5, 8, 14],
    [-3, -7, -10, -13, 2, 6, 9, 12],
    [-2, -5, -8, -13, 1, 4, 7, 12],
    [-2, -4, -6, -13, 1, 3, 5, 12],
    [-3, -6, -8, -12, 2, 5, 7, 11],
    [-3, -7, -9, -11, 2, 6, 8, 10],
    [-4, -7, -8, -11, 3, 6, 7, 10],
    [-3, -5, -8, -11, 2, 4, 7, 10],
    [-2, -6, -8, -10, 1, 5, 7, 9],
    [-2, -5, -8, -10, 1, 4, 7, 9],
    [-2, -4, -8, -10, 1, 3, 7, 9],
    [-2, -5, -7, -10, 1, 4, 6, 9],
    [-3, -4, -7, -10, 2, 3, 6, 9],
    [-1, -2, -3, -10, 0, 1, 2, 9],
    [-4, -6, -8, -9, 3, 5, 7, 8],
    [-3, -5, -7, -9, 2, 4, 6, 8],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Etc1,
    Etc2,
    /// ETC2 with punch-through alpha. The differential bit is the opaque flag.
    PunchThrough,
}

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

type Rgb = [i16; 3];

#[inline]
fn field(bits: u64, shift: u32, len: u32) -> i16 {
    ((bits >> shift) & ((1 << len) - 1)) as i16
}

fn extend4(x: i16) -> i16 {
    x * 17
}
fn extend5(x: i16) -> i16 {
    (x << 3) | (x >> 2)
}
fn extend6(x: i16) -> i16 {
    (x << 2) | (x >> 4)
}
fn extend7(x: i16) -> i16 {
    (x << 1) | (x >> 6)
}

/// 3-bit two's complement.
fn delta3(x: i16) -> i16 {
    (x << 13) >> 13
}

fn clamp(x: i32) -> u8 {
    x.clamp(0, 255) as u8
}

fn offset(color: Rgb, d: i16) -> [u8; 4] {
    let [r, g, b] = color.map(|c| clamp(c as i32 + d as i32));
    [b, g, r, 255]
}

/// The 2-bit index of the texel at `(x, y)`.
#[inline]
fn texel_index(bits: u64, x: usize, y: usize) -> usize {
    let k = x * 4 + y;
    let lsb = (bits >> k) & 1;
    let msb = (bits >> (k + 16)) & 1;
    ((msb << 1) | lsb) as usize
}

pub(crate) fn etc1(block: [u8; 8]) -> Result<[[u8; 4]; 16], BlockError> {
    decode_color(u64::from_be_bytes(block), Variant::Etc1)
}

pub(crate) fn etc2_rgb(block: [u8; 8]) -> Result<[[u8; 4]; 16], BlockError> {
    decode_color(u64::from_be_bytes(block), Variant::Etc2)
}

pub(crate) fn etc2_rgb_a1(block: [u8; 8]) -> Result<[[u8; 4]; 16], BlockError> {
    decode_color(u64::from_be_bytes(block), Variant::PunchThrough)
}

/// ETC2 color with an EAC alpha block in front.
pub(crate) fn etc2_rgba(block: [u8; 16]) -> Result<[[u8; 4]; 16], BlockError> {
    let mut alpha = [0; 8];
    let mut color = [0; 8];
    alpha.copy_from_slice(&block[..8]);
    color.copy_from_slice(&block[8..]);

    let mut pixels = decode_color(u64::from_be_bytes(color), Variant::Etc2)?;
    for (pixel, alpha) in pixels.iter_mut().zip(eac_alpha(u64::from_be_bytes(alpha))) {
        pixel[3] = alpha;
    }
    Ok(pixels)
}

fn decode_color(bits: u64, variant: Variant) -> Result<[[u8; 4]; 16], BlockError> {
    let diff = bits >> 33 & 1 != 0;
    let flip = bits >> 32 & 1 != 0;
    let opaque = variant != Variant::PunchThrough || diff;

    let (base1, base2) = if diff || variant == Variant::PunchThrough {
        let r = field(bits, 59, 5);
        let g = field(bits, 51, 5);
        let b = field(bits, 43, 5);
        let r2 = r + delta3(field(bits, 56, 3));
        let g2 = g + delta3(field(bits, 48, 3));
        let b2 = b + delta3(field(bits, 40, 3));

        let overflow = [r2, g2, b2].map(|c| !(0..32).contains(&c));
        if overflow.contains(&true) {
            if variant == Variant::Etc1 {
                return Err(BlockError::UnsupportedMode { format: "ETC1" });
            }
            return Ok(match overflow {
                [true, _, _] => decode_t(bits, opaque),
                [false, true, _] => decode_h(bits, opaque),
                _ => decode_planar(bits),
            });
        }

        (
            [r, g, b].map(extend5),
            [r2, g2, b2].map(extend5),
        )
    } else {
        (
            [field(bits, 60, 4), field(bits, 52, 4), field(bits, 44, 4)].map(extend4),
            [field(bits, 56, 4), field(bits, 48, 4), field(bits, 40, 4)].map(extend4),
        )
    };

    let table1 = MODIFIERS[field(bits, 37, 3) as usize];
    let table2 = MODIFIERS[field(bits, 34, 3) as usize];

    let mut pixels = [[0; 4]; 16];
    for y in 0..4 {
        for x in 0..4 {
            let second = if flip { y >= 2 } else { x >= 2 };
            let (base, table) = if second {
                (base2, table2)
            } else {
                (base1, table1)
            };

            let index = texel_index(bits, x, y);
            pixels[y * 4 + x] = match (opaque, index) {
                (false, 2) => TRANSPARENT,
                (false, 0) => offset(base, 0),
                _ => offset(base, table[index]),
            };
        }
    }
    Ok(pixels)
}

/// Fills the block from 4 paint colors selected by the texel indexes.
fn paint(bits: u64, colors: [[u8; 4]; 4], opaque: bool) -> [[u8; 4]; 16] {
    let mut pixels = [[0; 4]; 16];
    for y in 0..4 {
        for x in 0..4 {
            let index = texel_index(bits, x, y);
            pixels[y * 4 + x] = if !opaque && index == 2 {
                TRANSPARENT
            } else {
                colors[index]
            };
        }
    }
    pixels
}

fn decode_t(bits: u64, opaque: bool) -> [[u8; 4]; 16] {
    let c1 = [
        field(bits, 59, 2) << 2 | field(bits, 56, 2),
        field(bits, 52, 4),
        field(bits, 48, 4),
    ]
    .map(extend4);
    let c2 = [field(bits, 44, 4), field(bits, 40, 4), field(bits, 36, 4)].map(extend4);
    let d = DISTANCES[(field(bits, 34, 2) << 1 | field(bits, 32, 1)) as usize];

    paint(
        bits,
        [offset(c1, 0), offset(c2, d), offset(c2, 0), offset(c2, -d)],
        opaque,
    )
}

fn decode_h(bits: u64, opaque: bool) -> [[u8; 4]; 16] {
    let c1 = [
        field(bits, 59, 4),
        field(bits, 56, 3) << 1 | field(bits, 52, 1),
        field(bits, 51, 1) << 3 | field(bits, 47, 3),
    ];
    let c2 = [field(bits, 43, 4), field(bits, 39, 4), field(bits, 35, 4)];

    // the lowest bit of the distance is the order of the two base colors
    let packed = |c: Rgb| (c[0] as u16) << 8 | (c[1] as u16) << 4 | c[2] as u16;
    let order = (packed(c1) >= packed(c2)) as i16;
    let d = DISTANCES[(field(bits, 34, 1) << 2 | field(bits, 32, 1) << 1 | order) as usize];

    let (c1, c2) = (c1.map(extend4), c2.map(extend4));
    paint(
        bits,
        [offset(c1, d), offset(c1, -d), offset(c2, d), offset(c2, -d)],
        opaque,
    )
}

fn decode_planar(bits: u64) -> [[u8; 4]; 16] {
    let o = [
        extend6(field(bits, 57, 6)),
        extend7(field(bits, 56, 1) << 6 | field(bits, 49, 6)),
        extend6(field(bits, 48, 1) << 5 | field(bits, 43, 2) << 3 | field(bits, 39, 3)),
    ];
    let h = [
        extend6(field(bits, 34, 5) << 1 | field(bits, 32, 1)),
        extend7(field(bits, 25, 7)),
        extend6(field(bits, 19, 6)),
    ];
    let v = [
        extend6(field(bits, 13, 6)),
        extend7(field(bits, 6, 7)),
        extend6(field(bits, 0, 6)),
    ];

    let mut pixels = [[0; 4]; 16];
    for y in 0..4 {
        for x in 0..4 {
            let channel = |c: usize| {
                let (o, h, v) = (o[c] as i32, h[c] as i32, v[c] as i32);
                clamp((x as i32 * (h - o) + y as i32 * (v - o) + 4 * o + 2) >> 2)
            };
            pixels[y * 4 + x] = [channel(2), channel(1), channel(0), 255];
        }
    }
    pixels
}

/// Decodes the 16 alpha values of an EAC block in row-major order.
fn eac_alpha(bits: u64) -> [u8; 16] {
    let base = (bits >> 56) as i32;
    let multiplier = (bits >> 52 & 0xF) as i32;
    let table = EAC_MODIFIERS[(bits >> 48 & 0xF) as usize];

    let mut alpha = [0; 16];
    for x in 0..4 {
        for y in 0..4 {
            let k = x * 4 + y;
            let index = (bits >> (45 - 3 * k) & 0b111) as usize;
            alpha[y * 4 + x] = clamp(base + table[index] as i32 * multiplier);
        }
    }
    alpha
}
