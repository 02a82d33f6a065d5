use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{seq::SliceRandom, Rng, RngCore};
use texdec::*;

fn random_bytes(len: usize) -> Vec<u8> {
    let mut out = vec![0; len];
    let mut rng = rand::thread_rng();
    rng.fill_bytes(&mut out);
    out
}

type DataModifier = Box<dyn FnMut(&mut [u8])>;
struct BenchConfig {
    data_modifier: DataModifier,
    size: (u32, u32),
    name: String,
}
impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            data_modifier: Box::new(|_| {}),
            size: (4096, 4096),
            name: String::new(),
        }
    }
}
fn bench_decoder(c: &mut Criterion, format: BlockFormat) {
    bench_decoder_with(c, format, |_| {});
}
fn bench_decoder_with(
    c: &mut Criterion,
    format: BlockFormat,
    create_config: impl FnOnce(&mut BenchConfig),
) {
    let mut config = BenchConfig::default();
    create_config(&mut config);

    let (width, height) = config.size;
    let mut name = format!("{:?} -> {:?}", format, format.image_format());
    if !config.name.is_empty() {
        name += " - ";
        name += &config.name;
    }

    c.bench_function(&name, |b| {
        let mut bytes = random_bytes(format.level_byte_len(width, height).unwrap_or(0) as usize);
        (config.data_modifier)(&mut bytes);
        b.iter(|| {
            let result = format.decode_surface(black_box(&bytes), width, height);
            _ = black_box(result);
        });
    });
}

/// This sets the BC7 block modes such that each mode is equally likely.
///
/// The block mode is decided by the number of trailing zeros of the first
/// byte, so for random bytes 50% of the blocks would be mode 0. That does not
/// represent real-world data at all.
fn random_bc7_modes(data: &mut [u8]) {
    let mut rng = rand::thread_rng();
    for block in data.chunks_exact_mut(16) {
        let mode: u8 = rng.gen_range(0..8);
        block[0] = (block[0] | 1) << mode;
    }
}

const BC6_MODES: [(u8, u8); 14] = [
    (0b00, 2),
    (0b01, 2),
    (0b00010, 5),
    (0b00110, 5),
    (0b01010, 5),
    (0b01110, 5),
    (0b10010, 5),
    (0b10110, 5),
    (0b11010, 5),
    (0b11110, 5),
    (0b00011, 5),
    (0b00111, 5),
    (0b01011, 5),
    (0b01111, 5),
];
/// This sets the BC6 block modes such that each valid mode is equally likely.
fn random_bc6_modes(data: &mut [u8]) {
    let mut rng = rand::thread_rng();
    for block in data.chunks_exact_mut(16) {
        let &(mode, mode_bits) = BC6_MODES.choose(&mut rng).unwrap_or(&(0, 2));
        block[0] = (block[0] << mode_bits) | mode;
    }
}

pub fn uncompressed(c: &mut Criterion) {
    use UncompressedFormat::*;

    for format in [
        L8,
        B5G6R5,
        B8G8R8,
        R8G8B8A8,
        B8G8R8A8,
        R10G10B10A2,
        R16G16B16A16,
        R16G16B16A16Float,
        R32G32B32A32Float,
    ] {
        bench_decoder(c, BlockFormat::Uncompressed(format));
    }
}

pub fn block_compressed(c: &mut Criterion) {
    bench_decoder(c, BlockFormat::Dxt1);
    bench_decoder_with(c, BlockFormat::Dxt1, |c| {
        c.size = (4095, 4095);
        c.name = "partial blocks".into();
    });
    bench_decoder(c, BlockFormat::Dxt1Alpha);
    bench_decoder(c, BlockFormat::Dxt3);
    bench_decoder(c, BlockFormat::Dxt5);
    bench_decoder(c, BlockFormat::Bc4);
    bench_decoder(c, BlockFormat::Bc4S);
    bench_decoder(c, BlockFormat::Bc5);
    bench_decoder(c, BlockFormat::Bc5S);
    bench_decoder_with(c, BlockFormat::Bc7, |c| {
        c.data_modifier = Box::new(random_bc7_modes);
    });
    bench_decoder_with(c, BlockFormat::Bc6H, |c| {
        c.data_modifier = Box::new(random_bc6_modes);
        c.size = (1024, 1024);
    });
    bench_decoder_with(c, BlockFormat::Bc6HS, |c| {
        c.data_modifier = Box::new(random_bc6_modes);
        c.size = (1024, 1024);
    });
}

pub fn etc(c: &mut Criterion) {
    bench_decoder(c, BlockFormat::Etc2Rgb);
    bench_decoder(c, BlockFormat::Etc2RgbA1);
    bench_decoder(c, BlockFormat::Etc2Rgba);
}

criterion_group!(benches, uncompressed, block_compressed, etc);
criterion_main!(benches);
