use std::io::Cursor;

use texdec::*;

mod util;

const BC1_RGB_UNORM: u32 = 131;
const R8G8B8A8_UNORM: u32 = 37;
const R8_UNORM: u32 = 9;

fn header(vk_format: u32, (width, height): (u32, u32), layers: u32, faces: u32, levels: u32) -> [u32; 9] {
    [vk_format, 1, width, height, 0, layers, faces, levels, 0]
}

#[test]
fn cube_map_end_to_end() {
    let colors = [0xF800, 0x07E0, 0x001F, 0xFFFF, 0x0000, 0xF81F];
    let level: Vec<u8> = colors.iter().flat_map(|&c| util::dxt1_solid(c)).collect();
    let file = util::ktx2_file(header(BC1_RGB_UNORM, (4, 4), 0, 6, 1), &[&level]);

    let decoder = Ktx2Decoder::new(Cursor::new(file)).unwrap();
    assert_eq!(decoder.format(), BlockFormat::Dxt1);
    assert_eq!(decoder.header().face_count, 6);
    assert_eq!(decoder.header().levels.len(), 1);
    assert_eq!(decoder.header().levels[0].byte_length, 48);

    let Texture::Cubemap(cube) = decoder.read_texture().unwrap() else {
        panic!("expected a cube map");
    };
    let expected = [
        [0, 0, 255, 255],
        [0, 255, 0, 255],
        [255, 0, 0, 255],
        [255, 255, 255, 255],
        [0, 0, 0, 255],
        [255, 0, 255, 255],
    ];
    for (face, pixel) in CubeFace::ALL.into_iter().zip(expected) {
        let main = cube.face(face).main();
        assert_eq!((main.width(), main.height()), (4, 4));
        assert_eq!(main.data(), pixel.repeat(16), "{:?}", face);
    }
}

/// KTX2 writers usually store the smallest level first.
#[test]
fn levels_are_found_through_the_index() {
    let level0 = [1_u8, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16];
    let level1 = [21_u8, 22, 23, 24];
    let level2 = [31_u8];

    let mut file = util::ktx2_file(header(R8_UNORM, (4, 4), 0, 1, 3), &[]);
    // the level index is empty for `&[]`, so the 3 entries are appended here
    let index_start = file.len();
    let data_start = (index_start + 3 * 24) as u64;
    let offsets = [data_start + 5, data_start + 1, data_start];
    for (offset, len) in offsets.iter().zip([16_u64, 4, 1]) {
        for word in [*offset, len, len] {
            file.extend(word.to_le_bytes());
        }
    }
    file.extend(level2);
    file.extend(level1);
    file.extend(level0);

    let Texture::Flat(flat) = read(Cursor::new(file)).unwrap() else {
        panic!("expected a flat texture");
    };
    let data: Vec<_> = flat.mipmaps().iter().map(|m| m.data().to_vec()).collect();
    assert_eq!(data, [level0.to_vec(), level1.to_vec(), level2.to_vec()]);
}

#[test]
fn layers() {
    let level: Vec<u8> = (0..8).collect();
    let file = util::ktx2_file(header(R8G8B8A8_UNORM, (1, 1), 2, 1, 1), &[&level]);

    let Texture::Array(elements) = read(Cursor::new(file)).unwrap() else {
        panic!("expected an array");
    };
    assert_eq!(elements.len(), 2);
    assert_eq!(elements[0].main().unwrap().data(), [2, 1, 0, 3]);
    assert_eq!(elements[1].main().unwrap().data(), [6, 5, 4, 7]);
}

#[test]
fn level_count_zero_reads_one_level() {
    let file = util::ktx2_file(header(R8_UNORM, (2, 1), 0, 1, 0), &[&[7, 8]]);
    let texture = read(Cursor::new(file)).unwrap();
    assert_eq!(texture.mipmaps().len(), 1);
    assert_eq!(texture.main().unwrap().data(), [7, 8]);
}

#[test]
fn key_values() {
    let mut file = util::ktx2_file(header(R8_UNORM, (1, 1), 0, 1, 1), &[&[0]]);

    let mut kvd = 13_u32.to_le_bytes().to_vec();
    kvd.extend(b"KTXwriter\0me\0");
    let offset = file.len() as u32;
    file.extend(&kvd);
    // kvdByteOffset and kvdByteLength
    file[56..60].copy_from_slice(&offset.to_le_bytes());
    file[60..64].copy_from_slice(&(kvd.len() as u32).to_le_bytes());

    let decoder = Ktx2Decoder::new(Cursor::new(file)).unwrap();
    assert_eq!(
        find_key(decoder.key_values(), "KTXwriter").and_then(KeyValue::value_str),
        Some("me")
    );
    let texture = decoder.read_texture().unwrap();
    assert_eq!(texture.main().unwrap().data(), [0]);
}

#[test]
fn errors() {
    // ASTC 4x4
    let file = util::ktx2_file(header(157, (4, 4), 0, 1, 1), &[&[0; 16]]);
    assert!(matches!(
        read(Cursor::new(file)),
        Err(DecodeError::Format(FormatError::UnsupportedVkFormat(157)))
    ));

    // the level index claims fewer bytes than 6 faces need
    let file = util::ktx2_file(header(BC1_RGB_UNORM, (4, 4), 0, 6, 1), &[&[0; 40]]);
    assert!(matches!(
        read(Cursor::new(file)),
        Err(DecodeError::Header(HeaderError::InvalidLevelIndex {
            level: 0,
            length: 40,
            ..
        }))
    ));

    // R32G32B32A32_SFLOAT with u32::MAX x u32::MAX pixels
    let file = util::ktx2_file(header(109, (u32::MAX, u32::MAX), 0, 1, 1), &[&[0; 16]]);
    assert_eq!(file.len(), 120);
    assert!(matches!(
        read(Cursor::new(file)),
        Err(DecodeError::Layout(LayoutError::DataLayoutTooBig))
    ));

    let file = util::ktx2_file(header(BC1_RGB_UNORM, (4, 8), 0, 6, 1), &[&[0; 96]]);
    assert!(matches!(
        read(Cursor::new(file)),
        Err(DecodeError::Layout(LayoutError::InvalidCubeMapDimensions))
    ));
}
