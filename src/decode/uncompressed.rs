//! Uncompressed pixel layouts.
//!
//! Every function decodes one little-endian pixel. Channel names follow the
//! D3D convention of listing channels from the least significant bit up, so
//! `B5G6R5` has blue in bits 0..5.

use super::convert::{n1, n10, n16, n2, n4, n5, B5G6R5};

#[inline(always)]
fn u16_le(bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(bytes)
}

pub(crate) fn l8([l]: [u8; 1]) -> [u8; 1] {
    [l]
}

/// Alpha only, color is black.
pub(crate) fn a8([a]: [u8; 1]) -> [u8; 4] {
    [0, 0, 0, a]
}

pub(crate) fn l8a8([l, a]: [u8; 2]) -> [u8; 4] {
    [l, l, l, a]
}

pub(crate) fn b5g6r5(pixel: [u8; 2]) -> [u8; 3] {
    let [r, g, b] = B5G6R5::from_u16(u16_le(pixel)).to_n8();
    [b, g, r]
}

fn b5g5r5(pixel: u16) -> [u8; 3] {
    [
        n5::n8((pixel & 0x1F) as u8),
        n5::n8((pixel >> 5 & 0x1F) as u8),
        n5::n8((pixel >> 10 & 0x1F) as u8),
    ]
}

pub(crate) fn b5g5r5x1(pixel: [u8; 2]) -> [u8; 4] {
    let [b, g, r] = b5g5r5(u16_le(pixel));
    [b, g, r, 255]
}

pub(crate) fn b5g5r5a1(pixel: [u8; 2]) -> [u8; 4] {
    let pixel = u16_le(pixel);
    let [b, g, r] = b5g5r5(pixel);
    [b, g, r, n1::n8((pixel >> 15) as u8)]
}

pub(crate) fn b4g4r4a4(pixel: [u8; 2]) -> [u8; 4] {
    let pixel = u16_le(pixel);
    [0, 4, 8, 12].map(|shift| n4::n8((pixel >> shift & 0xF) as u8))
}

pub(crate) fn b8g8r8(bgr: [u8; 3]) -> [u8; 3] {
    bgr
}

pub(crate) fn r8g8b8([r, g, b]: [u8; 3]) -> [u8; 3] {
    [b, g, r]
}

pub(crate) fn b8g8r8a8(bgra: [u8; 4]) -> [u8; 4] {
    bgra
}

pub(crate) fn b8g8r8x8([b, g, r, _]: [u8; 4]) -> [u8; 4] {
    [b, g, r, 255]
}

pub(crate) fn r8g8b8a8([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    [b, g, r, a]
}

pub(crate) fn r8g8b8x8([r, g, b, _]: [u8; 4]) -> [u8; 4] {
    [b, g, r, 255]
}

pub(crate) fn r10g10b10a2(pixel: [u8; 4]) -> [u8; 4] {
    let pixel = u32::from_le_bytes(pixel);
    let channel = |shift: u32| n10::n8((pixel >> shift & 0x3FF) as u16);
    [
        channel(20),
        channel(10),
        channel(0),
        n2::n8((pixel >> 30) as u8),
    ]
}

fn u16x4(pixel: [u8; 8]) -> [u16; 4] {
    [0, 2, 4, 6].map(|i| u16_le([pixel[i], pixel[i + 1]]))
}

pub(crate) fn r16g16b16a16(pixel: [u8; 8]) -> [u8; 4] {
    let [r, g, b, a] = u16x4(pixel).map(n16::n8);
    [b, g, r, a]
}

/// Half floats are passed through as RGBA bit patterns.
pub(crate) fn r16g16b16a16_float(pixel: [u8; 8]) -> [u16; 4] {
    u16x4(pixel)
}

pub(crate) fn r32g32b32_float(pixel: [u8; 12]) -> [f32; 3] {
    [0, 4, 8].map(|i| f32::from_le_bytes([pixel[i], pixel[i + 1], pixel[i + 2], pixel[i + 3]]))
}

pub(crate) fn r32g32b32a32_float(pixel: [u8; 16]) -> [f32; 4] {
    [0, 4, 8, 12].map(|i| f32::from_le_bytes([pixel[i], pixel[i + 1], pixel[i + 2], pixel[i + 3]]))
}
