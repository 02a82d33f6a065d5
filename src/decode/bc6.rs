use crate::{
    bcn_data::PARTITION_SET_2,
    decode::bcn_util::{BitStream, Indexes},
    util::unlikely_branch,
    BlockError,
};

// Bit layouts follow the D3D11 functional specification, section 19.5.13
// "BC6H / DXGI_FORMAT_BC6H".

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bc6Variant {
    /// `BC6H_UF16`
    Unsigned,
    /// `BC6H_SF16`
    Signed,
}

/// Decodes a BC6H block into 16 RGB half floats (bit patterns) in row-major
/// order.
pub(crate) fn decode_bc6_block(
    block: [u8; 16],
    variant: Bc6Variant,
) -> Result<[[u16; 3]; 16], BlockError> {
    let mut stream = BitStream::new(block);

    let mode_bits = extract_mode(&mut stream);
    let Some(mode) = mode_info(mode_bits) else {
        unlikely_branch();
        return Err(BlockError::ReservedMode {
            format: "BC6H",
            mode: mode_bits,
        });
    };

    let mut endpoints = [[0_i32; 3]; 4];
    for field in mode.fields {
        let value = stream.consume_bits_32(field.len);
        endpoints[field.endpoint as usize][field.channel as usize] |= value << field.shift;
    }
    let endpoints = decompress_endpoints(mode, variant, endpoints);

    let mut output = [[0_u16; 3]; 16];
    if mode.regions == 1 {
        let indexes = Indexes::new_p1(4, &mut stream);
        let palette =
            generate_palette(endpoints[0], endpoints[1], mode.endpoint_bits, variant, WEIGHT_4);

        for (pixel_index, out) in output.iter_mut().enumerate() {
            *out = palette[indexes.get_index(pixel_index as u8) as usize];
        }
    } else {
        let partition = PARTITION_SET_2[stream.consume_bits(5) as usize];
        let indexes = Indexes::new_p2(3, &mut stream, partition.fixup_index_2);
        let palettes = [
            generate_palette(endpoints[0], endpoints[1], mode.endpoint_bits, variant, WEIGHT_3),
            generate_palette(endpoints[2], endpoints[3], mode.endpoint_bits, variant, WEIGHT_3),
        ];

        for (pixel_index, out) in output.iter_mut().enumerate() {
            let pixel_index = pixel_index as u8;
            let subset = partition.get_subset_index(pixel_index) as usize;
            *out = palettes[subset][indexes.get_index(pixel_index) as usize];
        }
    }

    Ok(output)
}

/// Reads the 2-bit mode, or the 5-bit mode if the low bits are `1x`.
fn extract_mode(stream: &mut BitStream) -> u8 {
    let low = stream.consume_bits(2);
    if low < 2 {
        low
    } else {
        (stream.consume_bits(3) << 2) | low
    }
}

/// A run of bits in the block that belongs to one channel of one endpoint.
#[derive(Clone, Copy)]
struct Field {
    endpoint: u8,
    channel: u8,
    shift: u8,
    len: u8,
}

type Target = (u8, u8);

// Endpoints w and x form the first region, y and z the second.
const RW: Target = (0, 0);
const GW: Target = (0, 1);
const BW: Target = (0, 2);
const RX: Target = (1, 0);
const GX: Target = (1, 1);
const BX: Target = (1, 2);
const RY: Target = (2, 0);
const GY: Target = (2, 1);
const BY: Target = (2, 2);
const RZ: Target = (3, 0);
const GZ: Target = (3, 1);
const BZ: Target = (3, 2);

/// `target[high:low]`
const fn bits(target: Target, high: u8, low: u8) -> Field {
    Field {
        endpoint: target.0,
        channel: target.1,
        shift: low,
        len: high - low + 1,
    }
}
/// `target[index]`
const fn bit(target: Target, index: u8) -> Field {
    bits(target, index, index)
}

struct ModeInfo {
    regions: u8,
    /// Precision of the base endpoint w.
    endpoint_bits: u8,
    /// Precision of the other endpoints, per channel.
    delta_bits: [u8; 3],
    /// Whether the other endpoints are stored as deltas to w.
    transformed: bool,
    fields: &'static [Field],
}

const fn two_regions(endpoint_bits: u8, delta_bits: [u8; 3], fields: &'static [Field]) -> ModeInfo {
    ModeInfo {
        regions: 2,
        endpoint_bits,
        delta_bits,
        transformed: endpoint_bits != delta_bits[0],
        fields,
    }
}
const fn one_region(endpoint_bits: u8, fields: &'static [Field]) -> ModeInfo {
    let delta = 20 - endpoint_bits;
    ModeInfo {
        regions: 1,
        endpoint_bits,
        delta_bits: [delta; 3],
        transformed: endpoint_bits != delta,
        fields,
    }
}

fn mode_info(mode: u8) -> Option<&'static ModeInfo> {
    static M10_555: ModeInfo = two_regions(10, [5, 5, 5], FIELDS_10_555);
    static M7_666: ModeInfo = two_regions(7, [6, 6, 6], FIELDS_7_666);
    static M11_544: ModeInfo = two_regions(11, [5, 4, 4], FIELDS_11_544);
    static M11_454: ModeInfo = two_regions(11, [4, 5, 4], FIELDS_11_454);
    static M11_445: ModeInfo = two_regions(11, [4, 4, 5], FIELDS_11_445);
    static M9_555: ModeInfo = two_regions(9, [5, 5, 5], FIELDS_9_555);
    static M8_655: ModeInfo = two_regions(8, [6, 5, 5], FIELDS_8_655);
    static M8_565: ModeInfo = two_regions(8, [5, 6, 5], FIELDS_8_565);
    static M8_556: ModeInfo = two_regions(8, [5, 5, 6], FIELDS_8_556);
    static M6_666: ModeInfo = two_regions(6, [6, 6, 6], FIELDS_6_666);
    static M10_10: ModeInfo = one_region(10, FIELDS_10_10);
    static M11_9: ModeInfo = one_region(11, FIELDS_11_9);
    static M12_8: ModeInfo = one_region(12, FIELDS_12_8);
    static M16_4: ModeInfo = one_region(16, FIELDS_16_4);

    Some(match mode {
        0b00 => &M10_555,
        0b01 => &M7_666,
        0b00010 => &M11_544,
        0b00110 => &M11_454,
        0b01010 => &M11_445,
        0b01110 => &M9_555,
        0b10010 => &M8_655,
        0b10110 => &M8_565,
        0b11010 => &M8_556,
        0b11110 => &M6_666,
        0b00011 => &M10_10,
        0b00111 => &M11_9,
        0b01011 => &M12_8,
        0b01111 => &M16_4,
        // 10011, 10111, 11011, 11111
        _ => return None,
    })
}

const FIELDS_10_555: &[Field] = &[
    bit(GY, 4), bit(BY, 4), bit(BZ, 4), bits(RW, 9, 0), bits(GW, 9, 0), bits(BW, 9, 0),
    bits(RX, 4, 0), bit(GZ, 4), bits(GY, 3, 0), bits(GX, 4, 0), bit(BZ, 0), bits(GZ, 3, 0),
    bits(BX, 4, 0), bit(BZ, 1), bits(BY, 3, 0), bits(RY, 4, 0), bit(BZ, 2), bits(RZ, 4, 0),
    bit(BZ, 3),
];

const FIELDS_7_666: &[Field] = &[
    bit(GY, 5), bit(GZ, 4), bit(GZ, 5), bits(RW, 6, 0), bit(BZ, 0), bit(BZ, 1), bit(BY, 4),
    bits(GW, 6, 0), bit(BY, 5), bit(BZ, 2), bit(GY, 4), bits(BW, 6, 0), bit(BZ, 3), bit(BZ, 5),
    bit(BZ, 4), bits(RX, 5, 0), bits(GY, 3, 0), bits(GX, 5, 0), bits(GZ, 3, 0), bits(BX, 5, 0),
    bits(BY, 3, 0), bits(RY, 5, 0), bits(RZ, 5, 0),
];

const FIELDS_11_544: &[Field] = &[
    bits(RW, 9, 0), bits(GW, 9, 0), bits(BW, 9, 0), bits(RX, 4, 0), bit(RW, 10), bits(GY, 3, 0),
    bits(GX, 3, 0), bit(GW, 10), bit(BZ, 0), bits(GZ, 3, 0), bits(BX, 3, 0), bit(BW, 10),
    bit(BZ, 1), bits(BY, 3, 0), bits(RY, 4, 0), bit(BZ, 2), bits(RZ, 4, 0), bit(BZ, 3),
];

const FIELDS_11_454: &[Field] = &[
    bits(RW, 9, 0), bits(GW, 9, 0), bits(BW, 9, 0), bits(RX, 3, 0), bit(RW, 10), bit(GZ, 4),
    bits(GY, 3, 0), bits(GX, 4, 0), bit(GW, 10), bits(GZ, 3, 0), bits(BX, 3, 0), bit(BW, 10),
    bit(BZ, 1), bits(BY, 3, 0), bits(RY, 3, 0), bit(BZ, 0), bit(BZ, 2), bits(RZ, 3, 0), bit(GY, 4),
    bit(BZ, 3),
];

const FIELDS_11_445: &[Field] = &[
    bits(RW, 9, 0), bits(GW, 9, 0), bits(BW, 9, 0), bits(RX, 3, 0), bit(RW, 10), bit(BY, 4),
    bits(GY, 3, 0), bits(GX, 3, 0), bit(GW, 10), bit(BZ, 0), bits(GZ, 3, 0), bits(BX, 4, 0),
    bit(BW, 10), bits(BY, 3, 0), bits(RY, 3, 0), bit(BZ, 1), bit(BZ, 2), bits(RZ, 3, 0),
    bit(BZ, 4), bit(BZ, 3),
];

const FIELDS_9_555: &[Field] = &[
    bits(RW, 8, 0), bit(BY, 4), bits(GW, 8, 0), bit(GY, 4), bits(BW, 8, 0), bit(BZ, 4),
    bits(RX, 4, 0), bit(GZ, 4), bits(GY, 3, 0), bits(GX, 4, 0), bit(BZ, 0), bits(GZ, 3, 0),
    bits(BX, 4, 0), bit(BZ, 1), bits(BY, 3, 0), bits(RY, 4, 0), bit(BZ, 2), bits(RZ, 4, 0),
    bit(BZ, 3),
];

const FIELDS_8_655: &[Field] = &[
    bits(RW, 7, 0), bit(GZ, 4), bit(BY, 4), bits(GW, 7, 0), bit(BZ, 2), bit(GY, 4), bits(BW, 7, 0),
    bit(BZ, 3), bit(BZ, 4), bits(RX, 5, 0), bits(GY, 3, 0), bits(GX, 4, 0), bit(BZ, 0),
    bits(GZ, 3, 0), bits(BX, 4, 0), bit(BZ, 1), bits(BY, 3, 0), bits(RY, 5, 0), bits(RZ, 5, 0),
];

const FIELDS_8_565: &[Field] = &[
    bits(RW, 7, 0), bit(BZ, 0), bit(BY, 4), bits(GW, 7, 0), bit(GY, 5), bit(GY, 4), bits(BW, 7, 0),
    bit(GZ, 5), bit(BZ, 4), bits(RX, 4, 0), bit(GZ, 4), bits(GY, 3, 0), bits(GX, 5, 0),
    bits(GZ, 3, 0), bits(BX, 4, 0), bit(BZ, 1), bits(BY, 3, 0), bits(RY, 4, 0), bit(BZ, 2),
    bits(RZ, 4, 0), bit(BZ, 3),
];

const FIELDS_8_556: &[Field] = &[
    bits(RW, 7, 0), bit(BZ, 1), bit(BY, 4), bits(GW, 7, 0), bit(BY, 5), bit(GY, 4), bits(BW, 7, 0),
    bit(BZ, 5), bit(BZ, 4), bits(RX, 4, 0), bit(GZ, 4), bits(GY, 3, 0), bits(GX, 4, 0), bit(BZ, 0),
    bits(GZ, 3, 0), bits(BX, 5, 0), bits(BY, 3, 0), bits(RY, 4, 0), bit(BZ, 2), bits(RZ, 4, 0),
    bit(BZ, 3),
];

const FIELDS_6_666: &[Field] = &[
    bits(RW, 5, 0), bit(GZ, 4), bit(BZ, 0), bit(BZ, 1), bit(BY, 4), bits(GW, 5, 0), bit(GY, 5),
    bit(BY, 5), bit(BZ, 2), bit(GY, 4), bits(BW, 5, 0), bit(GZ, 5), bit(BZ, 3), bit(BZ, 5),
    bit(BZ, 4), bits(RX, 5, 0), bits(GY, 3, 0), bits(GX, 5, 0), bits(GZ, 3, 0), bits(BX, 5, 0),
    bits(BY, 3, 0), bits(RY, 5, 0), bits(RZ, 5, 0),
];

const FIELDS_10_10: &[Field] = &[
    bits(RW, 9, 0), bits(GW, 9, 0), bits(BW, 9, 0), bits(RX, 9, 0), bits(GX, 9, 0), bits(BX, 9, 0),
];

const FIELDS_11_9: &[Field] = &[
    bits(RW, 9, 0), bits(GW, 9, 0), bits(BW, 9, 0), bits(RX, 8, 0), bit(RW, 10), bits(GX, 8, 0),
    bit(GW, 10), bits(BX, 8, 0), bit(BW, 10),
];

const FIELDS_12_8: &[Field] = &[
    bits(RW, 9, 0), bits(GW, 9, 0), bits(BW, 9, 0), bits(RX, 7, 0), bit(RW, 11), bit(RW, 10),
    bits(GX, 7, 0), bit(GW, 11), bit(GW, 10), bits(BX, 7, 0), bit(BW, 11), bit(BW, 10),
];

const FIELDS_16_4: &[Field] = &[
    bits(RW, 9, 0), bits(GW, 9, 0), bits(BW, 9, 0), bits(RX, 3, 0), bit(RW, 15), bit(RW, 14),
    bit(RW, 13), bit(RW, 12), bit(RW, 11), bit(RW, 10), bits(GX, 3, 0), bit(GW, 15), bit(GW, 14),
    bit(GW, 13), bit(GW, 12), bit(GW, 11), bit(GW, 10), bits(BX, 3, 0), bit(BW, 15), bit(BW, 14),
    bit(BW, 13), bit(BW, 12), bit(BW, 11), bit(BW, 10),
];

fn decompress_endpoints(
    mode: &ModeInfo,
    variant: Bc6Variant,
    mut endpoints: [[i32; 3]; 4],
) -> [[i32; 3]; 4] {
    let count = mode.regions as usize * 2;
    let signed = variant == Bc6Variant::Signed;

    if signed {
        sign_extend(&mut endpoints[0], [mode.endpoint_bits; 3]);
    }
    if mode.transformed || signed {
        for endpoint in &mut endpoints[1..count] {
            sign_extend(endpoint, mode.delta_bits);
        }
    }

    if mode.transformed {
        // the deltas are relative to w and wrap around at its precision
        let base = endpoints[0];
        let mask = (1 << mode.endpoint_bits) - 1;
        for endpoint in &mut endpoints[1..count] {
            for (c, b) in endpoint.iter_mut().zip(base) {
                *c = c.wrapping_add(b) & mask;
            }
            if signed {
                sign_extend(endpoint, [mode.endpoint_bits; 3]);
            }
        }
    }

    endpoints
}

fn sign_extend(color: &mut [i32; 3], bit_counts: [u8; 3]) {
    for (c, bit_count) in color.iter_mut().zip(bit_counts) {
        debug_assert!(0 < bit_count && bit_count < 32);
        debug_assert_eq!(*c & !((1 << bit_count) - 1), 0);

        let shift = 32 - bit_count;
        *c = (*c << shift) >> shift;
    }
}

fn unquantize(component: i32, bits: u8, variant: Bc6Variant) -> i32 {
    match variant {
        Bc6Variant::Unsigned => {
            if bits >= 15 || component == 0 {
                component
            } else if component == (1 << bits) - 1 {
                0xFFFF
            } else {
                ((component << 16) + 0x8000) >> bits
            }
        }
        Bc6Variant::Signed => {
            if bits >= 16 {
                return component;
            }
            let magnitude = component.abs();
            let unq = if magnitude == 0 {
                0
            } else if magnitude >= (1 << (bits - 1)) - 1 {
                0x7FFF
            } else {
                ((magnitude << 15) + 0x4000) >> (bits - 1)
            };
            if component < 0 {
                -unq
            } else {
                unq
            }
        }
    }
}

/// Scales an interpolated value to the half float range and returns its bits.
fn finish_unquantize(component: i32, variant: Bc6Variant) -> u16 {
    match variant {
        // 31/64
        Bc6Variant::Unsigned => ((component * 31) >> 6) as u16,
        // 31/32 on the magnitude, then sign-magnitude
        Bc6Variant::Signed => {
            let magnitude = (component.abs() * 31) >> 5;
            if component < 0 {
                0x8000 | magnitude as u16
            } else {
                magnitude as u16
            }
        }
    }
}

const WEIGHT_3: [i32; 8] = [0, 9, 18, 27, 37, 46, 55, 64];
const WEIGHT_4: [i32; 16] = [0, 4, 9, 13, 17, 21, 26, 30, 34, 38, 43, 47, 51, 55, 60, 64];

fn generate_palette<const N: usize>(
    e0: [i32; 3],
    e1: [i32; 3],
    bits: u8,
    variant: Bc6Variant,
    weights: [i32; N],
) -> [[u16; 3]; N] {
    let a = e0.map(|c| unquantize(c, bits, variant));
    let b = e1.map(|c| unquantize(c, bits, variant));

    weights.map(|w| {
        let mut color = [0; 3];
        for i in 0..3 {
            color[i] = finish_unquantize((a[i] * (64 - w) + b[i] * w + 32) >> 6, variant);
        }
        color
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BitWriter {
        bits: u128,
        len: u32,
    }
    impl BitWriter {
        fn new() -> Self {
            Self { bits: 0, len: 0 }
        }
        fn write(&mut self, value: u64, count: u32) -> &mut Self {
            assert!(count == 64 || value < 1 << count);
            self.bits |= (value as u128) << self.len;
            self.len += count;
            self
        }
        fn finish(&self) -> [u8; 16] {
            assert_eq!(self.len, 128);
            self.bits.to_le_bytes()
        }
    }

    #[test]
    fn every_mode_uses_all_bits() {
        for mode in 0..32 {
            let Some(info) = mode_info(mode) else {
                continue;
            };
            let mode_len = if mode < 2 { 2 } else { 5 };
            let fields: u32 = info.fields.iter().map(|f| f.len as u32).sum();
            let rest = if info.regions == 1 { 63 } else { 5 + 46 };
            assert_eq!(mode_len + fields + rest, 128, "mode {:#b}", mode);
        }
    }

    #[test]
    fn reserved_modes() {
        for mode in [0b10011, 0b10111, 0b11011, 0b11111] {
            let mut block = [0xFF_u8; 16];
            block[0] = mode;
            for variant in [Bc6Variant::Unsigned, Bc6Variant::Signed] {
                assert_eq!(
                    decode_bc6_block(block, variant),
                    Err(BlockError::ReservedMode {
                        format: "BC6H",
                        mode
                    })
                );
            }
        }
    }

    #[test]
    fn unsigned_extremes() {
        let mut w = BitWriter::new();
        w.write(0b00011, 5).write((1 << 60) - 1, 60).write(0, 63);
        let pixels = decode_bc6_block(w.finish(), Bc6Variant::Unsigned).unwrap();
        // the largest finite half float
        assert_eq!(pixels, [[0x7BFF; 3]; 16]);

        let mut w = BitWriter::new();
        w.write(0b00011, 5).write(0, 60).write(0, 63);
        let pixels = decode_bc6_block(w.finish(), Bc6Variant::Unsigned).unwrap();
        assert_eq!(pixels, [[0; 3]; 16]);
    }

    #[test]
    fn signed_negative_endpoint() {
        let mut w = BitWriter::new();
        w.write(0b00011, 5);
        // -1 in every 10-bit endpoint channel
        for _ in 0..6 {
            w.write(0x3FF, 10);
        }
        w.write(0x5555, 63);
        let pixels = decode_bc6_block(w.finish(), Bc6Variant::Signed).unwrap();
        assert_eq!(pixels, [[0x805D; 3]; 16]);
    }

    #[test]
    fn transformed_delta() {
        // mode 11_9: rw[9:0] gw[9:0] bw[9:0] rx[8:0] rw[10] gx[8:0] gw[10] bx[8:0] bw[10]
        let block = |indexes: u64| {
            let mut w = BitWriter::new();
            w.write(0b00111, 5);
            w.write(100, 10).write(100, 10).write(100, 10);
            // a delta of -1 in red only
            w.write(0x1FF, 9).write(0, 1);
            w.write(0, 9).write(0, 1);
            w.write(0, 9).write(0, 1);
            w.write(indexes, 63);
            w.finish()
        };

        let pixels = decode_bc6_block(block(0), Bc6Variant::Unsigned).unwrap();
        assert_eq!(pixels, [[1557; 3]; 16]);

        let pixels = decode_bc6_block(block((1 << 63) - 1), Bc6Variant::Unsigned).unwrap();
        for pixel in &pixels[1..] {
            assert_eq!(*pixel, [1542, 1557, 1557]);
        }
    }
}
