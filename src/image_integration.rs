use image::{DynamicImage, ImageBuffer};

use crate::{decode::convert::f16_to_f32, BlockError, ImageFormat, MipMap};

fn f32_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn f16_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|c| f16_to_f32(u16::from_le_bytes([c[0], c[1]])))
        .collect()
}

/// Swaps the first and third channel of every `N` byte pixel.
fn swap_red_blue<const N: usize>(mut bytes: Vec<u8>) -> Vec<u8> {
    for pixel in bytes.chunks_exact_mut(N) {
        pixel.swap(0, 2);
    }
    bytes
}

/// Converts decoded pixels into an `image` buffer.
///
/// BGR(A) data is swizzled to RGB(A) and half floats are widened to `f32`,
/// since `image` has no buffer types for either.
fn to_dynamic_image(
    format: ImageFormat,
    width: u32,
    height: u32,
    data: Vec<u8>,
) -> Option<DynamicImage> {
    let image = match format {
        ImageFormat::Gray8 => DynamicImage::ImageLuma8(ImageBuffer::from_raw(width, height, data)?),
        ImageFormat::Bgr8 => {
            DynamicImage::ImageRgb8(ImageBuffer::from_raw(width, height, swap_red_blue::<3>(data))?)
        }
        ImageFormat::Bgra8 => {
            DynamicImage::ImageRgba8(ImageBuffer::from_raw(width, height, swap_red_blue::<4>(data))?)
        }
        ImageFormat::Rgb16Float => {
            DynamicImage::ImageRgb32F(ImageBuffer::from_raw(width, height, f16_samples(&data))?)
        }
        ImageFormat::Rgba16Float => {
            DynamicImage::ImageRgba32F(ImageBuffer::from_raw(width, height, f16_samples(&data))?)
        }
        ImageFormat::Rgb32Float => {
            DynamicImage::ImageRgb32F(ImageBuffer::from_raw(width, height, f32_samples(&data))?)
        }
        ImageFormat::Rgba32Float => {
            DynamicImage::ImageRgba32F(ImageBuffer::from_raw(width, height, f32_samples(&data))?)
        }
    };
    Some(image)
}

impl MipMap {
    /// Decodes the level (if it isn't already) and converts it into an
    /// [`image::DynamicImage`].
    pub fn to_image(&self) -> Result<DynamicImage, BlockError> {
        let mut decoded = self.clone();
        decoded.decode()?;
        Ok(decoded.into_image())
    }

    fn into_image(self) -> DynamicImage {
        let format = self.format().image_format();
        let (width, height) = (self.width(), self.height());
        // a decoded level always holds exactly width * height pixels
        to_dynamic_image(format, width, height, self.into_data())
            .unwrap_or_else(|| DynamicImage::new_rgba8(width, height))
    }
}

impl TryFrom<MipMap> for DynamicImage {
    type Error = BlockError;

    fn try_from(mut mipmap: MipMap) -> Result<Self, Self::Error> {
        mipmap.decode()?;
        Ok(mipmap.into_image())
    }
}
