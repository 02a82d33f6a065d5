//! Reading mip levels from a stream and assembling them into textures.
//!
//! Reading is a single forward pass: for every level the exact number of
//! bytes is read, decoded, and appended to its surface. Only once all levels
//! are read are the surfaces checked and put together.

use std::{io::Read, mem::size_of};

use crate::{
    mipmap::{max_mip_levels, mip_dimensions, mip_size},
    util::align4,
    BlockFormat, CubemapTexture, DecodeError, FlatTexture, LayoutError, MipMap, Options, Texture,
    VolumeTexture,
};

/// The format and mip chain of the surfaces of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceDesc {
    pub format: BlockFormat,
    pub width: u32,
    pub height: u32,
    /// The number of mip levels, at least 1.
    pub mip_count: u32,
}

impl SurfaceDesc {
    pub fn new(format: BlockFormat, width: u32, height: u32, mip_count: u32) -> Self {
        Self {
            format,
            width,
            height,
            mip_count,
        }
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if self.width == 0 || self.height == 0 {
            return Err(LayoutError::ZeroDimension);
        }
        if self.mip_count == 0 {
            return Err(LayoutError::Empty);
        }
        Ok(())
    }

    pub fn level_dimensions(&self, level: u32) -> (u32, u32) {
        mip_dimensions(self.width, self.height, level)
    }

    /// The encoded size of one surface of mip level `level`.
    pub fn level_byte_len(&self, level: u32) -> Option<u64> {
        let (width, height) = self.level_dimensions(level);
        self.format.level_byte_len(width, height)
    }
}

/// How the surfaces of a cube map are ordered in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceOrder {
    /// All faces of level 0, then all faces of level 1, ... (KTX, KTX2)
    LevelMajor,
    /// All levels of +X, then all levels of -X, ... (DDS)
    FaceMajor,
}

/// The complete shape of a texture, as described by a container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TextureShape {
    pub desc: SurfaceDesc,
    /// 1 for everything but volumes.
    pub depth: u32,
    /// 1 or 6.
    pub faces: u32,
    /// `None` for a single texture, `Some(n)` for an array of `n` textures.
    pub layers: Option<u32>,
    /// Rows of uncompressed levels are padded to 4 bytes.
    pub pad_rows: bool,
}

impl TextureShape {
    pub fn flat(desc: SurfaceDesc) -> Self {
        Self {
            desc,
            depth: 1,
            faces: 1,
            layers: None,
            pad_rows: false,
        }
    }

    fn layer_count(&self) -> u32 {
        self.layers.unwrap_or(1)
    }

    /// The number of depth slices of mip level `level`.
    pub fn slices(&self, level: u32) -> u32 {
        mip_size(self.depth, level)
    }

    /// The bytes one slice of mip level `level` occupies in the stream.
    ///
    /// `None` on overflow, which [`TextureShape::validate`] rules out for
    /// every level of the shape.
    pub fn slice_stream_len(&self, level: u32) -> Option<u64> {
        let format = self.desc.format;
        let (width, height) = self.desc.level_dimensions(level);
        if self.pad_rows && format.geometry().edge == 1 {
            let row = (width as u64).checked_mul(format.geometry().bytes_per_block as u64)?;
            align4(row).checked_mul(height as u64)
        } else {
            format.level_byte_len(width, height)
        }
    }

    /// The bytes of one face of mip level `level`, including all its slices.
    pub fn face_stream_len(&self, level: u32) -> Option<u64> {
        self.slice_stream_len(level)?
            .checked_mul(self.slices(level) as u64)
    }

    /// The bytes of all layers and faces of mip level `level`.
    pub fn level_stream_len(&self, level: u32) -> Option<u64> {
        self.face_stream_len(level)?
            .checked_mul(self.surfaces(1)?)
    }

    /// The number of surfaces with `slices` depth slices over all faces and
    /// layers.
    fn surfaces(&self, slices: u32) -> Option<u64> {
        (slices as u64)
            .checked_mul(self.faces as u64)?
            .checked_mul(self.layer_count() as u64)
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        self.desc.validate()?;
        if self.depth == 0 {
            return Err(LayoutError::ZeroDimension);
        }
        let max = max_mip_levels(self.desc.width.max(self.depth), self.desc.height);
        if self.desc.mip_count > max {
            return Err(LayoutError::TooManyMipMaps {
                mipmaps: self.desc.mip_count,
                max,
            });
        }
        if self.faces == 6 && self.desc.width != self.desc.height {
            return Err(LayoutError::InvalidCubeMapDimensions);
        }
        if self.layers == Some(0) {
            return Err(LayoutError::Empty);
        }

        let mut total: u64 = 0;
        for level in 0..self.desc.mip_count {
            total = self
                .level_stream_len(level)
                .and_then(|len| total.checked_add(len))
                .ok_or(LayoutError::DataLayoutTooBig)?;
        }
        Ok(())
    }

    /// The number of bytes reading all levels allocates.
    ///
    /// A level is read in its encoded form and decoded afterwards, so each
    /// surface counts with the larger of both sizes.
    fn memory_len(&self, decompress: bool) -> Option<u64> {
        let format = self.desc.format;
        let slice_overhead = size_of::<Vec<MipMap>>() as u64;
        let surface_overhead = size_of::<MipMap>() as u64;

        let mut total = self.surfaces(self.depth)?.checked_mul(slice_overhead)?;
        for level in 0..self.desc.mip_count {
            let (width, height) = self.desc.level_dimensions(level);
            let mut surface = format.level_byte_len(width, height)?;
            if decompress {
                surface = surface.max(format.decoded_len(width, height)?);
            }
            let surface = surface.checked_add(surface_overhead)?;
            total = total.checked_add(surface.checked_mul(self.surfaces(self.slices(level))?)?)?;
        }
        Some(total)
    }
}

/// Callbacks for the container specific parts of a level-major stream.
///
/// KTX prefixes every level with its size and pads faces and levels, KTX2
/// stores each level at its own offset.
pub(crate) trait LevelHooks<R: ?Sized> {
    fn begin_level(
        &mut self,
        _reader: &mut R,
        _level: u32,
        _shape: &TextureShape,
    ) -> Result<(), DecodeError> {
        Ok(())
    }
    fn end_face(
        &mut self,
        _reader: &mut R,
        _level: u32,
        _shape: &TextureShape,
    ) -> Result<(), DecodeError> {
        Ok(())
    }
    fn end_level(
        &mut self,
        _reader: &mut R,
        _level: u32,
        _shape: &TextureShape,
    ) -> Result<(), DecodeError> {
        Ok(())
    }
}

/// Hooks that do nothing. Levels follow each other without gaps.
pub(crate) struct Contiguous;
impl<R: ?Sized> LevelHooks<R> for Contiguous {}

/// The levels of one face of one layer, indexed by depth slice.
type FaceLevels = Vec<Vec<MipMap>>;

/// Reads a texture of the given shape.
pub(crate) fn read_texture<R: Read + ?Sized>(
    reader: &mut R,
    shape: &TextureShape,
    order: FaceOrder,
    hooks: &mut impl LevelHooks<R>,
    options: &Options,
) -> Result<Texture, DecodeError> {
    shape.validate()?;

    let required = shape
        .memory_len(options.decompress)
        .ok_or(LayoutError::DataLayoutTooBig)?;
    if required > options.memory_limit {
        return Err(DecodeError::MemoryLimitExceeded {
            required,
            limit: options.memory_limit,
        });
    }

    let layers = shape.layer_count() as usize;
    let faces = shape.faces as usize;
    let mut surfaces: Vec<FaceLevels> = (0..layers * faces)
        .map(|_| vec![Vec::new(); shape.depth as usize])
        .collect();

    let read_slices = |reader: &mut R, face: &mut FaceLevels, level: u32| {
        let (width, height) = shape.desc.level_dimensions(level);
        for slice in face.iter_mut().take(shape.slices(level) as usize) {
            slice.push(MipMap::read(
                reader,
                shape.desc.format,
                width,
                height,
                shape.pad_rows,
                options.decompress,
            )?);
        }
        Ok::<(), DecodeError>(())
    };

    match order {
        FaceOrder::FaceMajor => {
            for face in surfaces.iter_mut() {
                for level in 0..shape.desc.mip_count {
                    read_slices(reader, face, level)?;
                }
            }
        }
        FaceOrder::LevelMajor => {
            for level in 0..shape.desc.mip_count {
                hooks.begin_level(reader, level, shape)?;
                for face in surfaces.iter_mut() {
                    read_slices(reader, face, level)?;
                    hooks.end_face(reader, level, shape)?;
                }
                hooks.end_level(reader, level, shape)?;
            }
        }
    }

    let mut elements = Vec::with_capacity(layers);
    let mut surfaces = surfaces.into_iter();
    for _ in 0..layers {
        let mut textures = Vec::with_capacity(faces);
        for face in surfaces.by_ref().take(faces) {
            textures.push(face_texture(face, shape.depth)?);
        }
        let element = if faces == 6 {
            let flats = textures
                .into_iter()
                .map(|texture| match texture {
                    Texture::Flat(flat) => Ok(flat),
                    _ => Err(LayoutError::InvalidCubeMapDimensions),
                })
                .collect::<Result<Vec<_>, _>>()?;
            let faces: [FlatTexture; 6] = flats
                .try_into()
                .map_err(|_| LayoutError::PartialCubeMap)?;
            Texture::Cubemap(CubemapTexture::new(faces)?)
        } else {
            textures.pop().ok_or(LayoutError::Empty)?
        };
        elements.push(element);
    }

    match shape.layers {
        Some(_) => Ok(Texture::Array(elements)),
        None => elements.pop().ok_or_else(|| LayoutError::Empty.into()),
    }
}

fn face_texture(slices: FaceLevels, depth: u32) -> Result<Texture, LayoutError> {
    let mut flats = slices
        .into_iter()
        .map(FlatTexture::new)
        .collect::<Result<Vec<_>, _>>()?;
    if depth > 1 {
        Ok(Texture::Volume(VolumeTexture::new(flats)?))
    } else {
        flats.pop().map(Texture::Flat).ok_or(LayoutError::Empty)
    }
}

/// Reads a single 2D surface and its mip chain.
pub fn read_flat<R: Read + ?Sized>(
    reader: &mut R,
    desc: &SurfaceDesc,
    options: &Options,
) -> Result<FlatTexture, DecodeError> {
    let shape = TextureShape::flat(*desc);
    match read_texture(reader, &shape, FaceOrder::FaceMajor, &mut Contiguous, options)? {
        Texture::Flat(flat) => Ok(flat),
        _ => unreachable!("a flat shape always yields a flat texture"),
    }
}

/// Reads the six faces of a cube map.
pub fn read_cubemap<R: Read + ?Sized>(
    reader: &mut R,
    desc: &SurfaceDesc,
    order: FaceOrder,
    options: &Options,
) -> Result<CubemapTexture, DecodeError> {
    let shape = TextureShape {
        faces: 6,
        ..TextureShape::flat(*desc)
    };
    match read_texture(reader, &shape, order, &mut Contiguous, options)? {
        Texture::Cubemap(cube) => Ok(cube),
        _ => unreachable!("a cube shape always yields a cube map"),
    }
}

/// Reads a volume with `depth` slices at level 0.
///
/// Every level stores its `max(1, depth >> level)` slices contiguously.
pub fn read_volume<R: Read + ?Sized>(
    reader: &mut R,
    desc: &SurfaceDesc,
    depth: u32,
    options: &Options,
) -> Result<VolumeTexture, DecodeError> {
    if depth == 0 {
        return Err(LayoutError::MissingDepth.into());
    }
    let shape = TextureShape {
        depth,
        ..TextureShape::flat(*desc)
    };
    match read_texture(reader, &shape, FaceOrder::FaceMajor, &mut Contiguous, options)? {
        Texture::Volume(volume) => Ok(volume),
        // a volume of depth 1 is a single slice
        Texture::Flat(flat) => Ok(VolumeTexture::new(vec![flat])?),
        _ => unreachable!("a volume shape always yields a volume"),
    }
}
