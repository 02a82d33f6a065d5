use crate::{mipmap::mip_dimensions, BlockError, BlockFormat, LayoutError, MipMap};

/// A 2D surface and its mip chain.
///
/// Level 0 is the full resolution image, every following level has half the
/// size of the previous one (see [`crate::mip_dimensions`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlatTexture {
    mipmaps: Vec<MipMap>,
}

impl FlatTexture {
    /// Checks that `mipmaps` is a non-empty mip chain of a single format.
    pub fn new(mipmaps: Vec<MipMap>) -> Result<Self, LayoutError> {
        let main = mipmaps.first().ok_or(LayoutError::Empty)?;
        let format = main.format();
        let (width, height) = (main.width(), main.height());

        for (level, mipmap) in mipmaps.iter().enumerate().skip(1) {
            if mipmap.format() != format {
                return Err(LayoutError::MixedFormats);
            }
            let expected = mip_dimensions(width, height, level as u32);
            let actual = (mipmap.width(), mipmap.height());
            if actual != expected {
                return Err(LayoutError::MipMapDimensions {
                    level,
                    expected,
                    actual,
                });
            }
        }

        Ok(Self { mipmaps })
    }

    /// The full resolution level.
    pub fn main(&self) -> &MipMap {
        &self.mipmaps[0]
    }
    pub fn mipmaps(&self) -> &[MipMap] {
        &self.mipmaps
    }
    pub fn into_mipmaps(self) -> Vec<MipMap> {
        self.mipmaps
    }
    pub fn level_count(&self) -> usize {
        self.mipmaps.len()
    }
    pub fn width(&self) -> u32 {
        self.main().width()
    }
    pub fn height(&self) -> u32 {
        self.main().height()
    }
    pub fn format(&self) -> BlockFormat {
        self.main().format()
    }

    /// Decodes all levels that are still raw.
    pub fn decode(&mut self) -> Result<(), BlockError> {
        self.mipmaps.iter_mut().try_for_each(MipMap::decode)
    }

    fn same_chain(&self, other: &FlatTexture) -> bool {
        self.level_count() == other.level_count()
            && self.format() == other.format()
            && self.width() == other.width()
            && self.height() == other.height()
    }
}

/// The faces of a cube map, in the order they are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX = 0,
    NegativeX = 1,
    PositiveY = 2,
    NegativeY = 3,
    PositiveZ = 4,
    NegativeZ = 5,
}
impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];
}

/// Six square faces with identical mip chains.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CubemapTexture {
    faces: [FlatTexture; 6],
}

impl CubemapTexture {
    /// `faces` must be in the order of [`CubeFace::ALL`].
    pub fn new(faces: [FlatTexture; 6]) -> Result<Self, LayoutError> {
        let first = &faces[0];
        if first.width() != first.height() {
            return Err(LayoutError::InvalidCubeMapDimensions);
        }
        if !faces[1..].iter().all(|face| first.same_chain(face)) {
            return Err(LayoutError::MismatchedCubeMapFaces);
        }
        Ok(Self { faces })
    }

    pub fn face(&self, face: CubeFace) -> &FlatTexture {
        &self.faces[face as usize]
    }
    pub fn faces(&self) -> &[FlatTexture; 6] {
        &self.faces
    }
    pub fn into_faces(self) -> [FlatTexture; 6] {
        self.faces
    }
    pub fn width(&self) -> u32 {
        self.faces[0].width()
    }
    pub fn level_count(&self) -> usize {
        self.faces[0].level_count()
    }

    pub fn decode(&mut self) -> Result<(), BlockError> {
        self.faces.iter_mut().try_for_each(FlatTexture::decode)
    }
}

/// A 3D texture, stored as depth slices.
///
/// The depth halves with every mip level as well. Slice `z` only holds the
/// levels `i` with `z < max(1, depth >> i)`, so slice 0 has the full chain and
/// higher slices have fewer levels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VolumeTexture {
    slices: Vec<FlatTexture>,
}

impl VolumeTexture {
    pub fn new(slices: Vec<FlatTexture>) -> Result<Self, LayoutError> {
        let first = slices.first().ok_or(LayoutError::Empty)?;
        let depth = slices.len() as u32;
        let levels = first.level_count();

        for (z, slice) in slices.iter().enumerate() {
            let expected = (0..levels as u32)
                .take_while(|&level| (z as u32) < crate::mipmap::mip_size(depth, level))
                .count();
            let matches_first = slice.format() == first.format()
                && slice.width() == first.width()
                && slice.height() == first.height();
            if slice.level_count() != expected || !matches_first {
                return Err(LayoutError::MismatchedVolumeSlices { slice: z });
            }
        }

        Ok(Self { slices })
    }

    pub fn depth(&self) -> u32 {
        self.slices.len() as u32
    }
    pub fn width(&self) -> u32 {
        self.slices[0].width()
    }
    pub fn height(&self) -> u32 {
        self.slices[0].height()
    }
    pub fn level_count(&self) -> usize {
        self.slices[0].level_count()
    }
    pub fn slices(&self) -> &[FlatTexture] {
        &self.slices
    }
    pub fn into_slices(self) -> Vec<FlatTexture> {
        self.slices
    }

    /// All depth slices of one mip level.
    pub fn level(&self, level: usize) -> impl Iterator<Item = &MipMap> + '_ {
        self.slices
            .iter()
            .map_while(move |slice| slice.mipmaps().get(level))
    }

    pub fn decode(&mut self) -> Result<(), BlockError> {
        self.slices.iter_mut().try_for_each(FlatTexture::decode)
    }
}

/// A decoded texture of any shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Texture {
    Flat(FlatTexture),
    Cubemap(CubemapTexture),
    Volume(VolumeTexture),
    /// The elements of a texture array, in order.
    Array(Vec<Texture>),
}

impl Texture {
    /// The full resolution level of the first surface, if any.
    pub fn main(&self) -> Option<&MipMap> {
        match self {
            Texture::Flat(flat) => Some(flat.main()),
            Texture::Cubemap(cube) => Some(cube.faces()[0].main()),
            Texture::Volume(volume) => Some(volume.slices()[0].main()),
            Texture::Array(elements) => elements.first().and_then(Texture::main),
        }
    }

    /// All mip levels of the texture in storage order.
    pub fn mipmaps(&self) -> Vec<&MipMap> {
        let mut out = Vec::new();
        self.collect_mipmaps(&mut out);
        out
    }
    fn collect_mipmaps<'a>(&'a self, out: &mut Vec<&'a MipMap>) {
        match self {
            Texture::Flat(flat) => out.extend(flat.mipmaps()),
            Texture::Cubemap(cube) => {
                for face in cube.faces() {
                    out.extend(face.mipmaps());
                }
            }
            Texture::Volume(volume) => {
                for slice in volume.slices() {
                    out.extend(slice.mipmaps());
                }
            }
            Texture::Array(elements) => {
                for element in elements {
                    element.collect_mipmaps(out);
                }
            }
        }
    }

    /// Decodes every level that is still raw.
    pub fn decode(&mut self) -> Result<(), BlockError> {
        match self {
            Texture::Flat(flat) => flat.decode(),
            Texture::Cubemap(cube) => cube.decode(),
            Texture::Volume(volume) => volume.decode(),
            Texture::Array(elements) => elements.iter_mut().try_for_each(Texture::decode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(width: u32, height: u32) -> MipMap {
        let format = BlockFormat::Dxt1;
        let len = format.level_byte_len(width, height).unwrap() as usize;
        MipMap::from_raw(format, width, height, vec![0; len]).unwrap()
    }

    fn chain(width: u32, height: u32, levels: u32) -> FlatTexture {
        FlatTexture::new(
            (0..levels)
                .map(|i| {
                    let (w, h) = mip_dimensions(width, height, i);
                    level(w, h)
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn flat_checks_chain() {
        assert_eq!(FlatTexture::new(vec![]), Err(LayoutError::Empty));
        assert_eq!(chain(8, 2, 4).level_count(), 4);
        assert_eq!(
            FlatTexture::new(vec![level(8, 8), level(8, 8)]),
            Err(LayoutError::MipMapDimensions {
                level: 1,
                expected: (4, 4),
                actual: (8, 8)
            })
        );
    }

    #[test]
    fn cubemap_checks_faces() {
        let faces = || std::array::from_fn(|_| chain(4, 4, 3));
        let cube = CubemapTexture::new(faces()).unwrap();
        assert_eq!(cube.face(CubeFace::NegativeZ).level_count(), 3);

        let mut mismatched: [FlatTexture; 6] = faces();
        mismatched[3] = chain(4, 4, 2);
        assert_eq!(
            CubemapTexture::new(mismatched),
            Err(LayoutError::MismatchedCubeMapFaces)
        );

        let rect = std::array::from_fn(|_| chain(8, 4, 1));
        assert_eq!(
            CubemapTexture::new(rect),
            Err(LayoutError::InvalidCubeMapDimensions)
        );
    }

    #[test]
    fn volume_slices_shrink() {
        // depth 4 with 3 levels: slice levels are 3, 2, 1, 1
        let slices = vec![chain(4, 4, 3), chain(4, 4, 2), chain(4, 4, 1), chain(4, 4, 1)];
        let volume = VolumeTexture::new(slices).unwrap();
        assert_eq!(volume.depth(), 4);
        assert_eq!(volume.level(0).count(), 4);
        assert_eq!(volume.level(1).count(), 2);
        assert_eq!(volume.level(2).count(), 1);

        let wrong = vec![chain(4, 4, 3), chain(4, 4, 3)];
        assert_eq!(
            VolumeTexture::new(wrong),
            Err(LayoutError::MismatchedVolumeSlices { slice: 1 })
        );
        let smaller = vec![chain(4, 4, 2), chain(2, 2, 1)];
        assert_eq!(
            VolumeTexture::new(smaller),
            Err(LayoutError::MismatchedVolumeSlices { slice: 1 })
        );
    }

    #[test]
    fn array_mipmaps_in_order() {
        let texture = Texture::Array(vec![
            Texture::Flat(chain(4, 4, 2)),
            Texture::Flat(chain(4, 4, 2)),
        ]);
        assert_eq!(texture.mipmaps().len(), 4);
        assert_eq!(texture.main().map(MipMap::width), Some(4));
        assert_eq!(Texture::Array(vec![]).main(), None);
    }
}
