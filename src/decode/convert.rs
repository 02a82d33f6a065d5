//! Internal module for converting between different number formats.
//!
//! Endpoints of DXT/BC1-3 colors and of packed 16-bit pixels are expanded by
//! bit replication, which is what GPUs do. Wider channels are rounded to the
//! nearest 8-bit value.

/// A packed 16-bit R5G6B5 color with blue in the low bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct B5G6R5 {
    pub r5: u8,
    pub g6: u8,
    pub b5: u8,
}
impl B5G6R5 {
    #[inline(always)]
    pub fn from_u16(u: u16) -> Self {
        Self {
            b5: (u & 0x1F) as u8,
            g6: ((u >> 5) & 0x3F) as u8,
            r5: ((u >> 11) & 0x1F) as u8,
        }
    }
    /// The color expanded to 8 bits per channel, in RGB order.
    #[inline(always)]
    pub fn to_n8(self) -> [u8; 3] {
        [n5::n8(self.r5), n6::n8(self.g6), n5::n8(self.b5)]
    }
}

/// Functions for converting **FROM Unorm1** values to other formats.
pub(crate) mod n1 {
    #[inline(always)]
    pub fn n8(x: u8) -> u8 {
        debug_assert!(x <= 1);
        if x == 0 {
            0
        } else {
            u8::MAX
        }
    }
}

/// Functions for converting **FROM Unorm2** values to other formats.
pub(crate) mod n2 {
    #[inline(always)]
    pub fn n8(x: u8) -> u8 {
        debug_assert!(x <= 3);
        x * 85
    }
}

/// Functions for converting **FROM Unorm4** values to other formats.
pub(crate) mod n4 {
    /// Nibble replication, `(x << 4) | x`.
    #[inline(always)]
    pub fn n8(x: u8) -> u8 {
        debug_assert!(x <= 15);
        (x << 4) | x
    }
}

/// Functions for converting **FROM Unorm5** values to other formats.
pub(crate) mod n5 {
    /// Bit replication, `(x << 3) | (x >> 2)`.
    #[inline(always)]
    pub fn n8(x: u8) -> u8 {
        debug_assert!(x <= 31);
        (x << 3) | (x >> 2)
    }
}

/// Functions for converting **FROM Unorm6** values to other formats.
pub(crate) mod n6 {
    /// Bit replication, `(x << 2) | (x >> 4)`.
    #[inline(always)]
    pub fn n8(x: u8) -> u8 {
        debug_assert!(x <= 63);
        (x << 2) | (x >> 4)
    }
}

/// Functions for converting **FROM Unorm10** values to other formats.
pub(crate) mod n10 {
    #[inline(always)]
    pub fn n8(x: u16) -> u8 {
        debug_assert!(x <= 1023);
        ((x as u32 * 16336 + 32656) >> 16) as u8
    }
}

/// Functions for converting **FROM Unorm16** values to other formats.
pub(crate) mod n16 {
    #[inline(always)]
    pub fn n8(x: u16) -> u8 {
        ((x as u32 * 255 + 32895) >> 16) as u8
    }
}

/// Functions for converting **FROM Snorm8** values to other formats.
pub(crate) mod s8 {
    /// Brings it in the range `[0, 254]`.
    #[inline(always)]
    pub fn norm(x: u8) -> u8 {
        // Both -128 and -127 map to -1.0, so a plain `wrapping_add(128)` is
        // off by one for every value but -128.
        x.wrapping_add(128).saturating_sub(1)
    }
    /// Maps `[-127, 127]` (as two's complement byte) to `[0, 255]`.
    #[inline(always)]
    pub fn n8(x: u8) -> u8 {
        from_norm(norm(x))
    }
    /// Maps `[0, 254]` to `[0, 255]`.
    #[inline(always)]
    pub fn from_norm(x: u8) -> u8 {
        debug_assert!(x <= 254);
        ((x as u16 * 258 + 2) >> 8) as u8
    }
}

#[cfg_attr(not(feature = "image"), allow(dead_code))]
pub(crate) fn f16_to_f32(half: u16) -> f32 {
    let exp: u16 = half >> 10 & 0b1_1111;
    let mant: u16 = half & 0b11_1111_1111;
    let val: f32 = if exp == 0 {
        // denorm
        mant as f32 * 2.0_f32.powi(-24)
    } else if exp != 31 {
        (mant as f32 + 1024_f32) * 2.0_f32.powi(exp as i32 - 25)
    } else if mant == 0 {
        f32::INFINITY
    } else {
        f32::NAN
    };
    if half & 0x8000 != 0 {
        -val
    } else {
        val
    }
}

/// Reorders an RGBA pixel into the BGRA byte order of decoded images.
#[inline(always)]
pub(crate) fn rgba_to_bgra([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    [b, g, r, a]
}
