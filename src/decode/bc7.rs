use crate::{
    bcn_data::{PARTITION_SET_2, PARTITION_SET_3},
    decode::bcn_util::{BitStream, Indexes},
    util::unlikely_branch,
    BlockError,
};

/// Field widths of one BC7 mode.
#[derive(Clone, Copy)]
struct ModeInfo {
    subsets: u8,
    partition_bits: u8,
    rotation_bits: u8,
    index_selection_bits: u8,
    color_bits: u8,
    alpha_bits: u8,
    /// One P-bit per endpoint.
    endpoint_p_bits: bool,
    /// One P-bit per subset, shared by both of its endpoints.
    shared_p_bits: bool,
    index_bits: u8,
    /// Width of the second index set of modes 4 and 5, or 0.
    index2_bits: u8,
}

#[rustfmt::skip]
const MODES: [ModeInfo; 8] = [
    ModeInfo { subsets: 3, partition_bits: 4, rotation_bits: 0, index_selection_bits: 0, color_bits: 4, alpha_bits: 0, endpoint_p_bits: true, shared_p_bits: false, index_bits: 3, index2_bits: 0 },
    ModeInfo { subsets: 2, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 6, alpha_bits: 0, endpoint_p_bits: false, shared_p_bits: true, index_bits: 3, index2_bits: 0 },
    ModeInfo { subsets: 3, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 5, alpha_bits: 0, endpoint_p_bits: false, shared_p_bits: false, index_bits: 2, index2_bits: 0 },
    ModeInfo { subsets: 2, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 7, alpha_bits: 0, endpoint_p_bits: true, shared_p_bits: false, index_bits: 2, index2_bits: 0 },
    ModeInfo { subsets: 1, partition_bits: 0, rotation_bits: 2, index_selection_bits: 1, color_bits: 5, alpha_bits: 6, endpoint_p_bits: false, shared_p_bits: false, index_bits: 2, index2_bits: 3 },
    ModeInfo { subsets: 1, partition_bits: 0, rotation_bits: 2, index_selection_bits: 0, color_bits: 7, alpha_bits: 8, endpoint_p_bits: false, shared_p_bits: false, index_bits: 2, index2_bits: 2 },
    ModeInfo { subsets: 1, partition_bits: 0, rotation_bits: 0, index_selection_bits: 0, color_bits: 7, alpha_bits: 7, endpoint_p_bits: true, shared_p_bits: false, index_bits: 4, index2_bits: 0 },
    ModeInfo { subsets: 2, partition_bits: 6, rotation_bits: 0, index_selection_bits: 0, color_bits: 5, alpha_bits: 5, endpoint_p_bits: true, shared_p_bits: false, index_bits: 2, index2_bits: 0 },
];

/// Decodes a BC7 block into 16 RGBA pixels in row-major order.
///
/// Mode 8 (a block whose first byte is zero) is reserved. Hardware returns
/// transparent black for it, this decoder reports it as malformed.
pub(crate) fn decode_bc7_block(block: [u8; 16]) -> Result<[[u8; 4]; 16], BlockError> {
    let mut stream = BitStream::new(block);
    let mut output = [[0_u8; 4]; 16];

    let mode = extract_mode(&mut stream);

    // One monomorphized function per mode, so the field widths are constants
    // inside the pixel loop.
    match mode {
        0 => decode_mode::<0>(&mut output, stream),
        1 => decode_mode::<1>(&mut output, stream),
        2 => decode_mode::<2>(&mut output, stream),
        3 => decode_mode::<3>(&mut output, stream),
        4 => decode_mode::<4>(&mut output, stream),
        5 => decode_mode::<5>(&mut output, stream),
        6 => decode_mode::<6>(&mut output, stream),
        7 => decode_mode::<7>(&mut output, stream),
        8.. => {
            unlikely_branch();
            return Err(BlockError::ReservedMode {
                format: "BC7",
                mode,
            });
        }
    }

    Ok(output)
}

fn extract_mode(stream: &mut BitStream) -> u8 {
    // the mode is the number of zero bits before the first one
    let mode = stream.low_u8().trailing_zeros() as u8;
    stream.skip(mode + 1);
    mode
}

#[inline(always)]
fn decode_mode<const MODE: usize>(output: &mut [[u8; 4]; 16], mut stream: BitStream) {
    let info = MODES[MODE];

    let partition = if info.partition_bits > 0 {
        stream.consume_bits(info.partition_bits) as usize
    } else {
        0
    };
    let rotation = if info.rotation_bits > 0 {
        stream.consume_bits(info.rotation_bits)
    } else {
        0
    };
    let index_selection = info.index_selection_bits > 0 && stream.consume_bit();

    let endpoints = read_endpoints(info, &mut stream);

    let indexes = match info.subsets {
        1 => Indexes::new_p1(info.index_bits, &mut stream),
        2 => Indexes::new_p2(
            info.index_bits,
            &mut stream,
            PARTITION_SET_2[partition].fixup_index_2,
        ),
        _ => Indexes::new_p3(
            info.index_bits,
            &mut stream,
            PARTITION_SET_3[partition].fixup_index_2,
            PARTITION_SET_3[partition].fixup_index_3,
        ),
    };
    let secondary = if info.index2_bits > 0 {
        Some(Indexes::new_p1(info.index2_bits, &mut stream))
    } else {
        None
    };

    for pixel_index in 0..16 {
        let subset = match info.subsets {
            1 => 0,
            2 => PARTITION_SET_2[partition].get_subset_index(pixel_index),
            // the `.min(2)` lets the compiler drop the bounds checks below
            _ => PARTITION_SET_3[partition]
                .get_subset_index(pixel_index)
                .min(2),
        } as usize;
        let color0 = endpoints[subset * 2];
        let color1 = endpoints[subset * 2 + 1];

        let weight = get_weight(info.index_bits, indexes.get_index(pixel_index));
        let (color_weight, alpha_weight) = match &secondary {
            None => (weight, weight),
            Some(secondary) => {
                let weight2 = get_weight(info.index2_bits, secondary.get_index(pixel_index));
                if index_selection {
                    (weight2, weight)
                } else {
                    (weight, weight2)
                }
            }
        };

        output[pixel_index as usize] =
            interpolate_colors_alpha(color0, color1, color_weight, alpha_weight);
    }

    swap_channels(output, rotation);
}

/// Reads all endpoints of the block and expands them to 8 bits per channel.
///
/// Channels are stored planar: R of every endpoint, then G, B and A, followed
/// by the P-bits.
#[inline(always)]
fn read_endpoints(info: ModeInfo, stream: &mut BitStream) -> [[u8; 4]; 6] {
    let count = info.subsets as usize * 2;
    let mut endpoints = [[0_u8; 4]; 6];

    for channel in 0..3 {
        for endpoint in endpoints[..count].iter_mut() {
            endpoint[channel] = stream.consume_bits(info.color_bits);
        }
    }
    if info.alpha_bits > 0 {
        for endpoint in endpoints[..count].iter_mut() {
            endpoint[3] = stream.consume_bits(info.alpha_bits);
        }
    }

    let mut color_bits = info.color_bits;
    let mut alpha_bits = info.alpha_bits;
    if info.endpoint_p_bits || info.shared_p_bits {
        color_bits += 1;
        if alpha_bits > 0 {
            alpha_bits += 1;
        }
    }

    if info.endpoint_p_bits {
        for endpoint in endpoints[..count].iter_mut() {
            let p = stream.consume_bit() as u8;
            endpoint.iter_mut().for_each(|c| *c = (*c << 1) | p);
        }
    } else if info.shared_p_bits {
        for pair in endpoints[..count].chunks_exact_mut(2) {
            let p = stream.consume_bit() as u8;
            for endpoint in pair {
                endpoint.iter_mut().for_each(|c| *c = (*c << 1) | p);
            }
        }
    }

    for endpoint in endpoints[..count].iter_mut() {
        for c in &mut endpoint[..3] {
            *c = promote(*c, color_bits);
        }
        endpoint[3] = if alpha_bits > 0 {
            promote(endpoint[3], alpha_bits)
        } else {
            255
        };
    }

    endpoints
}

/// Expands a `number_bits` wide value to 8 bits by bit replication.
#[inline]
fn promote(mut number: u8, number_bits: u8) -> u8 {
    debug_assert!((4..=8).contains(&number_bits));
    if number_bits == 8 {
        return number;
    }
    number <<= 8 - number_bits;
    number |= number >> number_bits;
    number
}

fn swap_channels(pixels: &mut [[u8; 4]; 16], rotation: u8) {
    // 01: swap A and R, 10: swap A and G, 11: swap A and B
    match rotation {
        1 => pixels.iter_mut().for_each(|p| p.swap(0, 3)),
        2 => pixels.iter_mut().for_each(|p| p.swap(1, 3)),
        3 => pixels.iter_mut().for_each(|p| p.swap(2, 3)),
        _ => {}
    };
}

// The weights of the format scaled by 4, so the interpolation
//   ((64-w)*e0 + w*e1 + 32) >> 6
// becomes
//   ((256-w)*e0 + w*e1 + 128) >> 8
// with identical results and all intermediates in u16.
const WEIGHTS_2: [u16; 4] = [0, 84, 172, 256];
const WEIGHTS_3: [u16; 8] = [0, 36, 72, 108, 148, 184, 220, 256];
const WEIGHTS_4: [u16; 16] = [
    0, 16, 36, 52, 68, 84, 104, 120, 136, 152, 172, 188, 204, 220, 240, 256,
];

#[inline]
fn get_weight(index_bits: u8, index: u8) -> u16 {
    match index_bits {
        2 => WEIGHTS_2[index as usize & 3],
        3 => WEIGHTS_3[index as usize & 7],
        _ => WEIGHTS_4[index as usize & 15],
    }
}

#[inline]
fn interpolate(e0: u8, e1: u8, weight: u16) -> u8 {
    ((((256 - weight) * e0 as u16) + weight * e1 as u16 + 128) >> 8) as u8
}

#[inline]
fn interpolate_colors_alpha(
    color0: [u8; 4],
    color1: [u8; 4],
    color_weight: u16,
    alpha_weight: u16,
) -> [u8; 4] {
    [
        interpolate(color0[0], color1[0], color_weight),
        interpolate(color0[1], color1[1], color_weight),
        interpolate(color0[2], color1[2], color_weight),
        interpolate(color0[3], color1[3], alpha_weight),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Packs fields LSB first, the same way the decoder reads them.
    struct BitWriter {
        bits: u128,
        len: u32,
    }
    impl BitWriter {
        fn new() -> Self {
            Self { bits: 0, len: 0 }
        }
        fn write(&mut self, value: u64, count: u32) -> &mut Self {
            assert!(value < 1 << count);
            self.bits |= (value as u128) << self.len;
            self.len += count;
            self
        }
        fn mode(&mut self, mode: u32) -> &mut Self {
            self.write(1 << mode, mode + 1)
        }
        fn finish(&self) -> [u8; 16] {
            assert_eq!(self.len, 128);
            self.bits.to_le_bytes()
        }
    }

    #[test]
    fn reserved_mode() {
        assert_eq!(
            decode_bc7_block([0; 16]),
            Err(BlockError::ReservedMode {
                format: "BC7",
                mode: 8
            })
        );
    }

    #[test]
    fn mode_6_solid() {
        let mut w = BitWriter::new();
        w.mode(6);
        // R, G, B, A with both endpoints equal
        for value in [0x7F, 0x00, 0x40, 0x7F] {
            w.write(value, 7).write(value, 7);
        }
        w.write(1, 1).write(1, 1);
        w.write(0x1234_5678_9ABC_DEF0 & ((1 << 63) - 1), 63);

        let pixels = decode_bc7_block(w.finish()).unwrap();
        for pixel in pixels {
            assert_eq!(pixel, [255, 1, 129, 255]);
        }
    }

    #[test]
    fn mode_6_fixup_pixel() {
        let mut w = BitWriter::new();
        w.mode(6);
        // red ramps from 0 to 255, everything else stays 0
        w.write(0, 7).write(0x7F, 7);
        for _ in 0..3 {
            w.write(0, 7).write(0, 7);
        }
        w.write(0, 1).write(1, 1);
        // all index bits set
        w.write((1 << 63) - 1, 63);

        let pixels = decode_bc7_block(w.finish()).unwrap();
        // Pixel 0 only has 3 index bits, so its index is 7 instead of 15. The
        // P-bit makes the second endpoint 1 in G, B and A.
        assert_eq!(pixels[0], [120, 0, 0, 0]);
        for pixel in &pixels[1..] {
            assert_eq!(*pixel, [255, 1, 1, 1]);
        }
    }

    /// For every shape of the 2-subset mode 1, a block with all index bits
    /// set decodes its fix-up pixels with index 0b011 and all others with
    /// 0b111.
    #[test]
    fn mode_1_fixup_for_every_shape() {
        for shape in 0..64 {
            let mut w = BitWriter::new();
            w.mode(1);
            w.write(shape, 6);
            // R, G, B of the 4 endpoints: subset 0 = (0, 63), subset 1 = (63, 0)
            for _ in 0..3 {
                w.write(0, 6).write(63, 6).write(63, 6).write(0, 6);
            }
            w.write(0, 1).write(0, 1);
            w.write((1 << 46) - 1, 46);

            let pixels = decode_bc7_block(w.finish()).unwrap();

            let map = &PARTITION_SET_2[shape as usize];
            let low = promote(0, 7);
            let high = promote(63 << 1, 7);
            for pixel in 0..16_u8 {
                let (e0, e1) = if map.get_subset_index(pixel) == 0 {
                    (low, high)
                } else {
                    (high, low)
                };
                let index = if pixel == 0 || pixel == map.fixup_index_2 {
                    3
                } else {
                    7
                };
                let expected = interpolate(e0, e1, WEIGHTS_3[index]);
                assert_eq!(
                    pixels[pixel as usize],
                    [expected, expected, expected, 255],
                    "shape {} pixel {}",
                    shape,
                    pixel
                );
            }
        }
    }

    #[test]
    fn mode_5_rotation() {
        let mut w = BitWriter::new();
        w.mode(5);
        // rotation 1: swap R and A
        w.write(1, 2);
        for value in [0x7F, 0, 0] {
            w.write(value, 7).write(value, 7);
        }
        w.write(0x10, 8).write(0x10, 8);
        w.write(0, 31).write(0, 31);

        let pixels = decode_bc7_block(w.finish()).unwrap();
        for pixel in pixels {
            assert_eq!(pixel, [0x10, 0, 0, 255]);
        }
    }

    #[test]
    fn promote_replicates_bits() {
        assert_eq!(promote(0b1_0000, 5), 0b1000_0100);
        assert_eq!(promote(0b11_1111, 6), 255);
        assert_eq!(promote(0xAB, 8), 0xAB);
    }
}
