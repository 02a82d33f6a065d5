use std::io::Cursor;

use texdec::*;

mod util;

const UNSIGNED_BYTE: u32 = 0x1401;
const RED: u32 = 0x1903;
const RGB: u32 = 0x1907;
const RGB8: u32 = 0x8051;
const R8: u32 = 0x8229;
const COMPRESSED_RGB_S3TC_DXT1: u32 = 0x83F0;
const COMPRESSED_RGBA_S3TC_DXT1: u32 = 0x83F1;

fn words(
    (ty, format, internal_format): (u32, u32, u32),
    (width, height): (u32, u32),
    elements: u32,
    faces: u32,
    levels: u32,
) -> [u32; 11] {
    [
        ty,
        1,
        format,
        internal_format,
        format,
        width,
        height,
        0,
        elements,
        faces,
        levels,
    ]
}

#[test]
fn padded_rows() {
    let file = util::ktx_file(
        words((UNSIGNED_BYTE, RGB, RGB8), (1, 2), 0, 1, 1),
        &[],
        &[&[1, 2, 3, 0, 4, 5, 6, 0]],
    );
    let texture = read(Cursor::new(file)).unwrap();
    let main = texture.main().unwrap();
    assert_eq!(
        main.format(),
        BlockFormat::Uncompressed(UncompressedFormat::R8G8B8)
    );
    assert_eq!(main.data(), [3, 2, 1, 6, 5, 4]);
}

#[test]
fn mip_levels() {
    let file = util::ktx_file(
        words((UNSIGNED_BYTE, RED, R8), (2, 2), 0, 1, 2),
        &[],
        &[&[1, 2, 0, 0, 3, 4, 0, 0], &[5, 0, 0, 0]],
    );
    let Texture::Flat(flat) = read(Cursor::new(file)).unwrap() else {
        panic!("expected a flat texture");
    };
    assert_eq!(flat.level_count(), 2);
    assert_eq!(flat.mipmaps()[0].data(), [1, 2, 3, 4]);
    assert_eq!(flat.mipmaps()[1].data(), [5]);
}

#[test]
fn key_values() {
    let file = util::ktx_file(
        words((0, 0, COMPRESSED_RGB_S3TC_DXT1), (4, 4), 0, 1, 1),
        &[
            ("KTXorientation", b"S=r,T=d\0".as_slice()),
            ("custom", [1, 2, 3].as_slice()),
        ],
        &[&util::dxt1_solid(0xF800)],
    );
    let decoder = KtxDecoder::new(file.as_slice()).unwrap();
    assert_eq!(decoder.format(), BlockFormat::Dxt1);
    assert_eq!(decoder.header().bytes_of_key_value_data, 44);

    let key_values = decoder.key_values();
    assert_eq!(key_values.len(), 2);
    assert_eq!(
        find_key(key_values, "KTXorientation").and_then(KeyValue::value_str),
        Some("S=r,T=d")
    );
    assert_eq!(find_key(key_values, "custom").unwrap().value, [1, 2, 3]);

    let texture = decoder.read_texture().unwrap();
    assert_eq!(texture.main().unwrap().data(), [0, 0, 255, 255].repeat(16));
}

#[test]
fn level_major_cube_map() {
    let mut file = util::ktx_file(
        words((0, 0, COMPRESSED_RGBA_S3TC_DXT1), (4, 4), 0, 6, 1),
        &[],
        &[],
    );
    // non-array cube maps give the size of one face
    file.extend(8_u32.to_le_bytes());
    for color in [0xF800, 0x07E0, 0x001F, 0xFFFF, 0x0000, 0xF81F] {
        file.extend(util::dxt1_solid(color));
    }

    let Texture::Cubemap(cube) = read(Cursor::new(file)).unwrap() else {
        panic!("expected a cube map");
    };
    assert_eq!(cube.faces()[0].format(), BlockFormat::Dxt1Alpha);
    assert_eq!(
        &cube.face(CubeFace::NegativeX).main().data()[..4],
        [0, 255, 0, 255]
    );
    assert_eq!(
        &cube.face(CubeFace::NegativeZ).main().data()[..4],
        [255, 0, 255, 255]
    );
}

#[test]
fn arrays() {
    // 2 elements of 1x1 R8, each row padded to 4 bytes
    let file = util::ktx_file(
        words((UNSIGNED_BYTE, RED, R8), (1, 1), 2, 1, 1),
        &[],
        &[&[7, 0, 0, 0, 9, 0, 0, 0]],
    );
    let Texture::Array(elements) = read(Cursor::new(file)).unwrap() else {
        panic!("expected an array");
    };
    let values: Vec<_> = elements
        .iter()
        .map(|e| e.main().unwrap().data()[0])
        .collect();
    assert_eq!(values, [7, 9]);
}

#[test]
fn errors() {
    let mut file = util::ktx_file(
        words((UNSIGNED_BYTE, RED, R8), (1, 1), 0, 1, 1),
        &[],
        &[&[0; 4]],
    );
    file[12..16].copy_from_slice(&0x04030201_u32.to_be_bytes());
    assert!(matches!(
        read(Cursor::new(file)),
        Err(DecodeError::Header(HeaderError::BigEndian))
    ));

    // GL_RGBA + GL_UNSIGNED_INT_8_8_8_8 has no decoder
    let file = util::ktx_file(
        words((0x8035, 0x1908, 0x8058), (1, 1), 0, 1, 1),
        &[],
        &[&[0; 4]],
    );
    assert!(matches!(
        read(Cursor::new(file)),
        Err(DecodeError::Format(FormatError::UnsupportedGlFormat { .. }))
    ));

    let file = util::ktx_file(
        words((UNSIGNED_BYTE, RED, R8), (1, 1), 0, 3, 1),
        &[],
        &[&[0; 4]],
    );
    assert!(matches!(
        read(Cursor::new(file)),
        Err(DecodeError::Layout(LayoutError::PartialCubeMap))
    ));

    let mut file = util::ktx_file(
        words((0, 0, COMPRESSED_RGB_S3TC_DXT1), (8, 8), 0, 1, 1),
        &[],
        &[&[0; 32]],
    );
    file.truncate(file.len() - 4);
    assert!(matches!(
        read(Cursor::new(file)),
        Err(DecodeError::Truncated {
            expected: 32,
            actual: 28
        })
    ));
}
