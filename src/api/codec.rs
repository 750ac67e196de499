//! Contains the [`Codec`] trait for turning encoded images into pixel buffers and back.

use crate::{CodecError, PixelBuffer};
#[cfg(feature = "image")]
use {
    image::{DynamicImage, ExtendedColorType, ImageFormat},
    std::io::Cursor,
};

/// The channels a [`Codec`] should produce when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Layout {
    /// Keep the colour channels. Otherwise, decode to a single grey channel.
    pub colour: bool,
    /// Keep the alpha channel if the image has one.
    pub alpha: bool,
}

/// Decodes and encodes images for [`Ditherer::dither_image`](crate::Ditherer::dither_image).
///
/// The output of [`Codec::encode`] should be lossless,
/// since any lossy compression would undo the dithering.
pub trait Codec: Send + Sync {
    /// Decodes `input` into a pixel buffer with the given layout.
    ///
    /// # Errors
    /// Returns an error if `input` is not a valid image.
    fn decode(&self, input: &[u8], layout: Layout) -> Result<PixelBuffer, CodecError>;

    /// Encodes a dithered pixel buffer.
    ///
    /// # Errors
    /// Returns an error if the buffer cannot be encoded.
    fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, CodecError>;
}

/// A [`Codec`] that reads any format supported by the [`image`] crate and writes PNG.
///
/// When colour is not kept, the image is converted to greyscale by linearizing each
/// colour channel with a gamma curve and taking the Rec. 709 luminance.
/// This keeps mid-tones from dithering too dark.
///
/// # Examples
/// ```no_run
/// # use bitdither::{Ditherer, DitherOptions, ImageCodec, Algorithm};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let input = std::fs::read("some image")?;
/// let ditherer = Ditherer::new().with_codec(ImageCodec::new());
/// let png = ditherer.dither_image(&input, &Algorithm::Atkinson.into())?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "image")]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageCodec {
    /// The gamma used to linearize colour samples before converting to greyscale.
    gamma: f32,
}

#[cfg(feature = "image")]
impl ImageCodec {
    /// The default gamma value.
    pub const DEFAULT_GAMMA: f32 = 2.2;

    /// Creates a new [`ImageCodec`] with the default gamma.
    #[must_use]
    pub const fn new() -> Self {
        Self { gamma: Self::DEFAULT_GAMMA }
    }

    /// Creates a new [`ImageCodec`] with the given gamma.
    ///
    /// Returns `None` if `gamma` is not a positive, finite number.
    #[must_use]
    pub fn with_gamma(gamma: f32) -> Option<Self> {
        (gamma.is_finite() && gamma > 0.0).then_some(Self { gamma })
    }

    /// The gamma used for greyscale conversion.
    #[must_use]
    pub const fn gamma(&self) -> f32 {
        self.gamma
    }

    /// Converts an image to one grey channel, plus alpha if `alpha` is set and the image has it.
    fn greyscale(&self, image: DynamicImage, alpha: bool) -> PixelBuffer {
        let alpha = alpha && image.color().has_alpha();
        let (width, height) = (image.width(), image.height());
        let channels = if alpha { 2 } else { 1 };

        let lut = linear_lut(self.gamma);
        let rgba = image.into_rgba8();
        let mut data = Vec::with_capacity(rgba.as_raw().len() / 4 * usize::from(channels));
        for pixel in rgba.as_raw().chunks_exact(4) {
            let luma = 0.2126 * lut[usize::from(pixel[0])]
                + 0.7152 * lut[usize::from(pixel[1])]
                + 0.0722 * lut[usize::from(pixel[2])];

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            data.push(luma.round().clamp(0.0, 255.0) as u8);
            if alpha {
                data.push(pixel[3]);
            }
        }

        PixelBuffer::new_unchecked(data, width, height, channels)
    }
}

#[cfg(feature = "image")]
impl Default for ImageCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "image")]
impl Codec for ImageCodec {
    fn decode(&self, input: &[u8], layout: Layout) -> Result<PixelBuffer, CodecError> {
        let image = image::load_from_memory(input)
            .map_err(|e| CodecError::with_source("failed to decode image", e))?;

        log::debug!(
            "decoded {}x{} image with {} channel(s)",
            image.width(),
            image.height(),
            image.color().channel_count()
        );

        Ok(if layout.colour {
            let buffer = PixelBuffer::from(image);
            if layout.alpha {
                buffer
            } else {
                buffer.without_alpha()
            }
        } else {
            self.greyscale(image, layout.alpha)
        })
    }

    fn encode(&self, buffer: &PixelBuffer) -> Result<Vec<u8>, CodecError> {
        let color = match buffer.channels() {
            1 => ExtendedColorType::L8,
            2 => ExtendedColorType::La8,
            3 => ExtendedColorType::Rgb8,
            4 => ExtendedColorType::Rgba8,
            n => return Err(CodecError::new(format!("cannot encode an image with {n} channels"))),
        };

        let mut png = Cursor::new(Vec::new());
        image::write_buffer_with_format(
            &mut png,
            buffer.as_raw(),
            buffer.width(),
            buffer.height(),
            color,
            ImageFormat::Png,
        )
        .map_err(|e| CodecError::with_source("failed to encode PNG", e))?;

        Ok(png.into_inner())
    }
}

/// Maps each sample value to its linearized value, still in the range `0.0..=255.0`.
#[cfg(feature = "image")]
fn linear_lut(gamma: f32) -> [f32; 256] {
    let mut lut = [0.0; 256];
    for (i, value) in lut.iter_mut().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let normalized = i as f32 / 255.0;
        *value = normalized.powf(gamma) * 255.0;
    }
    lut
}
