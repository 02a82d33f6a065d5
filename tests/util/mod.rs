#![allow(unused)]

use rand::{RngCore, SeedableRng};
use sha2::{Digest, Sha256};

pub fn create_rng() -> impl rand::Rng {
    rand_chacha::ChaChaRng::seed_from_u64(123456789)
}

pub fn random_bytes(rng: &mut impl RngCore, len: usize) -> Vec<u8> {
    let mut out = vec![0; len];
    rng.fill_bytes(&mut out);
    out
}

pub fn hash_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let bytes: [u8; 32] = result.into();

    let mut hex = String::new();
    for byte in bytes.iter() {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

fn push_words(out: &mut Vec<u8>, words: impl IntoIterator<Item = u32>) {
    for word in words {
        out.extend(word.to_le_bytes());
    }
}

/// A DDS file description. Only the fields the decoder looks at are modeled.
#[derive(Debug, Clone)]
pub struct DdsFile {
    pub width: u32,
    pub height: u32,
    pub depth: Option<u32>,
    pub mipmap_count: Option<u32>,
    pub pf_flags: u32,
    pub four_cc: [u8; 4],
    pub bit_count: u32,
    /// RGBA
    pub masks: [u32; 4],
    pub caps2: u32,
    /// `(dxgi_format, resource_dimension, misc_flags, array_size, alpha_mode)`
    pub dx10: Option<[u32; 5]>,
}

pub const PF_ALPHAPIXELS: u32 = 0x1;
pub const PF_FOURCC: u32 = 0x4;
pub const PF_RGB: u32 = 0x40;
pub const CAPS2_CUBE_MAP_ALL: u32 = 0xFE00;
pub const CAPS2_VOLUME: u32 = 0x200000;

impl DdsFile {
    pub fn four_cc(width: u32, height: u32, four_cc: &[u8; 4]) -> Self {
        Self {
            width,
            height,
            depth: None,
            mipmap_count: None,
            pf_flags: PF_FOURCC,
            four_cc: *four_cc,
            bit_count: 0,
            masks: [0; 4],
            caps2: 0,
            dx10: None,
        }
    }

    pub fn masked(width: u32, height: u32, bit_count: u32, masks: [u32; 4]) -> Self {
        let alpha = if masks[3] != 0 { PF_ALPHAPIXELS } else { 0 };
        Self {
            pf_flags: PF_RGB | alpha,
            four_cc: [0; 4],
            bit_count,
            masks,
            ..Self::four_cc(width, height, b"\0\0\0\0")
        }
    }

    pub fn dx10(width: u32, height: u32, dxgi_format: u32) -> Self {
        Self {
            dx10: Some([dxgi_format, 3, 0, 1, 0]),
            ..Self::four_cc(width, height, b"DX10")
        }
    }

    pub fn build(&self, data: &[u8]) -> Vec<u8> {
        let mut flags = 0x1 | 0x2 | 0x4 | 0x1000;
        if self.depth.is_some() {
            flags |= 0x800000;
        }
        if self.mipmap_count.is_some() {
            flags |= 0x20000;
        }

        let mut out = b"DDS ".to_vec();
        push_words(
            &mut out,
            [
                124,
                flags,
                self.height,
                self.width,
                0,
                self.depth.unwrap_or(0),
                self.mipmap_count.unwrap_or(0),
            ],
        );
        push_words(&mut out, [0; 11]);
        push_words(
            &mut out,
            [
                32,
                self.pf_flags,
                u32::from_le_bytes(self.four_cc),
                self.bit_count,
            ],
        );
        push_words(&mut out, self.masks);
        push_words(&mut out, [0x1000, self.caps2, 0, 0, 0]);
        if let Some(dx10) = self.dx10 {
            push_words(&mut out, dx10);
        }
        assert_eq!(out.len(), 128 + if self.dx10.is_some() { 20 } else { 0 });

        out.extend_from_slice(data);
        out
    }
}

/// A KTX 1.1 file with the given header words (`glType` to
/// `numberOfMipmapLevels`), key/value data and level images.
///
/// Every level is prefixed with `image_size` and padded to 4 bytes.
pub fn ktx_file(words: [u32; 11], key_values: &[(&str, &[u8])], levels: &[&[u8]]) -> Vec<u8> {
    let mut kvd = Vec::new();
    for (key, value) in key_values {
        let size = key.len() + 1 + value.len();
        kvd.extend((size as u32).to_le_bytes());
        kvd.extend(key.as_bytes());
        kvd.push(0);
        kvd.extend(*value);
        while kvd.len() % 4 != 0 {
            kvd.push(0);
        }
    }

    let mut out = vec![
        0xAB, 0x4B, 0x54, 0x58, 0x20, 0x31, 0x31, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
    ];
    push_words(&mut out, [0x04030201]);
    push_words(&mut out, words);
    push_words(&mut out, [kvd.len() as u32]);
    out.extend(kvd);

    for level in levels {
        push_words(&mut out, [level.len() as u32]);
        out.extend(*level);
        while out.len() % 4 != 0 {
            out.push(0);
        }
    }
    out
}

/// A KTX2 file without key/value data. `header` holds the 9 words from
/// `vkFormat` to `supercompressionScheme`; levels are stored back to back
/// after the level index.
pub fn ktx2_file(header: [u32; 9], levels: &[&[u8]]) -> Vec<u8> {
    let mut out = vec![
        0xAB, 0x4B, 0x54, 0x58, 0x20, 0x32, 0x30, 0xBB, 0x0D, 0x0A, 0x1A, 0x0A,
    ];
    push_words(&mut out, header);
    // dfd and kvd
    push_words(&mut out, [0; 4]);
    // sgd
    out.extend([0; 16]);

    let index_len = 24 * levels.len().max(1);
    let mut offset = (out.len() + index_len) as u64;
    for level in levels {
        let len = level.len() as u64;
        for word in [offset, len, len] {
            out.extend(word.to_le_bytes());
        }
        offset += len;
    }
    for level in levels {
        out.extend(*level);
    }
    out
}

/// A DXT1 block with a single color for all pixels.
pub fn dxt1_solid(color565: u16) -> [u8; 8] {
    let [lo, hi] = color565.to_le_bytes();
    [lo, hi, 0, 0, 0, 0, 0, 0]
}

pub const COMPRESSED_FORMATS: [texdec::BlockFormat; 15] = {
    use texdec::BlockFormat::*;
    [
        Dxt1, Dxt1Alpha, Dxt3, Dxt5, Bc4, Bc4S, Bc5, Bc5S, Bc6H, Bc6HS, Bc7, Etc1, Etc2Rgb,
        Etc2RgbA1, Etc2Rgba,
    ]
};

pub fn all_formats() -> Vec<texdec::BlockFormat> {
    let mut formats = COMPRESSED_FORMATS.to_vec();
    formats.extend(
        texdec::UncompressedFormat::ALL
            .iter()
            .map(|&f| texdec::BlockFormat::Uncompressed(f)),
    );
    formats
}
