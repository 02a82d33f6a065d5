use std::io::Read;

use crate::{
    assemble::{read_texture, Contiguous, FaceOrder, SurfaceDesc, TextureShape},
    detect::{block_format, CompressionScheme, PixelMasks},
    header::{AlphaMode, DdsCaps2, Header, ResourceDimension},
    BlockFormat, DecodeError, LayoutError, Options, Texture,
};

/// A decoder for DDS files.
///
/// Creating the decoder reads and validates the header. The pixel data is
/// only read by [`DdsDecoder::read_texture`].
pub struct DdsDecoder<R> {
    reader: R,
    header: Header,
    shape: TextureShape,
    options: Options,
}

impl<R: Read> DdsDecoder<R> {
    /// Creates a new decoder by reading the header from the given reader.
    ///
    /// This is equivalent to `DdsDecoder::new_with(reader, &Options::default())`.
    pub fn new(reader: R) -> Result<Self, DecodeError> {
        Self::new_with(reader, &Options::default())
    }

    /// Creates a new decoder with the given options.
    ///
    /// If this succeeds, the reader is positioned at the start of the data
    /// section.
    pub fn new_with(mut reader: R, options: &Options) -> Result<Self, DecodeError> {
        Header::read_magic(&mut reader)?;
        let header = Header::read(&mut reader)?;
        let shape = texture_shape(&header, options)?;

        log::debug!(
            "DDS {}x{}x{} {:?}, {} mip levels, {} faces, {:?} layers",
            shape.desc.width,
            shape.desc.height,
            shape.depth,
            shape.desc.format,
            shape.desc.mip_count,
            shape.faces,
            shape.layers
        );

        Ok(Self {
            reader,
            header,
            shape,
            options: options.clone(),
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }
    pub fn format(&self) -> BlockFormat {
        self.shape.desc.format
    }

    /// Reads all surfaces of the texture.
    pub fn read_texture(mut self) -> Result<Texture, DecodeError> {
        read_texture(
            &mut self.reader,
            &self.shape,
            FaceOrder::FaceMajor,
            &mut Contiguous,
            &self.options,
        )
    }
}

fn detect_format(header: &Header) -> Result<BlockFormat, DecodeError> {
    let pf = &header.pixel_format;

    if let Some(dx10) = &header.dx10 {
        let alpha = dx10.alpha_mode != AlphaMode::Opaque;
        return Ok(block_format(
            CompressionScheme::Dxgi(dx10.dxgi_format),
            &PixelMasks::default(),
            alpha,
        )?);
    }

    let alpha = pf.has_alpha();
    let scheme = match pf.four_cc {
        Some(four_cc) => CompressionScheme::FourCC(four_cc),
        None => CompressionScheme::Masked,
    };
    let masks = PixelMasks {
        bit_count: pf.rgb_bit_count,
        r: pf.r_bit_mask,
        g: pf.g_bit_mask,
        b: pf.b_bit_mask,
        a: if alpha { pf.a_bit_mask } else { 0 },
    };
    Ok(block_format(scheme, &masks, alpha)?)
}

fn texture_shape(header: &Header, options: &Options) -> Result<TextureShape, DecodeError> {
    let format = detect_format(header)?;

    let mip_count = match header.mipmap_count {
        Some(0) => {
            log::warn!("DDS header declares 0 mip levels, reading 1");
            1
        }
        Some(count) => count,
        None => 1,
    };

    let is_1d = header
        .dx10
        .as_ref()
        .is_some_and(|dx10| dx10.resource_dimension == ResourceDimension::Texture1D);
    let height = if is_1d { header.height.max(1) } else { header.height };

    let mut shape = TextureShape::flat(SurfaceDesc::new(
        format,
        header.width,
        height,
        mip_count,
    ));

    if header.is_volume() {
        shape.depth = header.depth.ok_or(LayoutError::MissingDepth)?;
    }

    if header.is_cube_map() {
        if header.dx10.is_none() && !header.caps2.contains(DdsCaps2::CUBE_MAP_ALL_FACES) {
            return Err(LayoutError::PartialCubeMap.into());
        }
        shape.faces = 6;
    }

    if let Some(dx10) = &header.dx10 {
        let array_size = match dx10.array_size {
            0 => {
                log::warn!("DDS DX10 header declares an array size of 0, reading 1");
                1
            }
            size => size,
        };
        if array_size > options.max_array_size {
            return Err(LayoutError::ArraySizeTooBig(array_size).into());
        }
        if array_size.checked_mul(shape.faces).is_none() {
            return Err(LayoutError::ArraySizeTooBig(array_size).into());
        }
        if array_size > 1 {
            shape.layers = Some(array_size);
        }
    }

    Ok(shape)
}
