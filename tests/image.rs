use std::io::Cursor;

use image::DynamicImage;
use texdec::*;

mod util;

#[test]
fn dds_to_image() {
    let file = util::DdsFile::four_cc(4, 4, b"DXT1").build(&util::dxt1_solid(0xF800));
    let texture = read(Cursor::new(file)).unwrap();
    let image = texture.main().unwrap().to_image().unwrap();

    let rgba = image.as_rgba8().unwrap();
    assert_eq!(rgba.dimensions(), (4, 4));
    assert!(rgba.pixels().all(|p| p.0 == [255, 0, 0, 255]));
}

#[test]
fn raw_levels_are_decoded() {
    let file = util::DdsFile::four_cc(4, 4, b"DXT1").build(&util::dxt1_solid(0x001F));
    let mut options = Options::default();
    options.decompress = false;
    let texture = read_with(Cursor::new(file), &options).unwrap();
    let Texture::Flat(flat) = texture else {
        panic!("expected a flat texture");
    };

    let main = flat.into_mipmaps().remove(0);
    assert!(!main.is_decoded());
    let image = DynamicImage::try_from(main).unwrap();
    assert_eq!(image.as_rgba8().unwrap().get_pixel(3, 3).0, [0, 0, 255, 255]);
}

#[test]
fn image_types() {
    let cases = [
        (UncompressedFormat::L8, 1, "L8"),
        (UncompressedFormat::B5G6R5, 2, "Rgb8"),
        (UncompressedFormat::R16G16B16A16Float, 8, "Rgba32F"),
        (UncompressedFormat::R32G32B32Float, 12, "Rgb32F"),
    ];
    for (format, bytes, expected) in cases {
        let mipmap = MipMap::from_raw(BlockFormat::Uncompressed(format), 2, 2, vec![0; 4 * bytes])
            .unwrap();
        let image = mipmap.to_image().unwrap();
        assert_eq!(format!("{:?}", image.color()), expected, "{:?}", format);
        assert_eq!((image.width(), image.height()), (2, 2));
    }

    let mipmap = MipMap::from_raw(BlockFormat::Bc6H, 4, 4, vec![0x03; 16]).unwrap();
    let image = mipmap.to_image().unwrap();
    assert!(image.as_rgb32f().is_some());
}
