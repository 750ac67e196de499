//! Contains the pixel buffer and matrix types shared across the crate.

use crate::{BufferShapeError, InvalidKernel, InvalidMap};
use std::borrow::Cow;
#[cfg(feature = "image")]
use {
    crate::CodecError,
    image::{DynamicImage, ImageBuffer},
};

/// A raw image: a flat, row-major buffer of 8-bit samples with interleaved channels.
///
/// The number of samples is always exactly `width * height * channels`.
/// The shape is fixed at construction; only the sample data may change.
///
/// The channel layout is inferred from the channel count:
///
/// | channels | layout | dithered channels | alpha channel |
/// |---|---|---|---|
/// | 1 | grey | 0 | none |
/// | 2 | grey, alpha | 0 | 1 |
/// | 3 | red, green, blue | 0, 1, 2 | none |
/// | 4+ | red, green, blue, alpha, ... | 0, 1, 2 | 3 |
///
/// Any channels past the alpha channel are passed through untouched.
///
/// # Examples
/// ```
/// # use bitdither::{PixelBuffer, BufferShapeError};
/// # fn main() -> Result<(), BufferShapeError> {
/// let buffer = PixelBuffer::new(vec![0, 64, 128, 255], 2, 2, 1)?;
/// assert_eq!(buffer.dimensions(), (2, 2));
/// assert!(PixelBuffer::new(vec![0, 64, 128], 2, 2, 1).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PixelBuffer {
    /// The interleaved sample data.
    data: Vec<u8>,
    /// The number of pixels in a row.
    width: u32,
    /// The number of rows.
    height: u32,
    /// The number of samples per pixel.
    channels: u8,
}

impl PixelBuffer {
    /// Creates a new [`PixelBuffer`], checking that the length of `data` matches the given shape.
    ///
    /// # Errors
    /// Returns an error if `channels` is `0` or if `data.len() != width * height * channels`.
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Result<Self, BufferShapeError> {
        if channels == 0 {
            return Err(BufferShapeError::NoChannels);
        }

        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(usize::from(channels)))
            .ok_or(BufferShapeError::Overflow)?;

        if data.len() == expected {
            Ok(Self { data, width, height, channels })
        } else {
            Err(BufferShapeError::LengthMismatch { len: data.len(), expected })
        }
    }

    /// The number of pixels in a row.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The number of samples per pixel.
    #[must_use]
    pub const fn channels(&self) -> u8 {
        self.channels
    }

    /// The number of leading channels in each pixel that hold colour (or grey) data.
    ///
    /// Only these channels are ever dithered.
    #[must_use]
    pub const fn colour_channels(&self) -> u8 {
        match self.channels {
            1 | 2 => 1,
            _ => 3,
        }
    }

    /// The index of the alpha channel within a pixel, if the layout has one.
    #[must_use]
    pub const fn alpha_channel(&self) -> Option<u8> {
        match self.channels {
            1 | 3 => None,
            2 => Some(1),
            _ => Some(3),
        }
    }

    /// Whether the layout includes an alpha channel.
    #[must_use]
    pub const fn has_alpha(&self) -> bool {
        self.alpha_channel().is_some()
    }

    /// The raw samples.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    /// The raw samples, mutably.
    ///
    /// The length of the slice is fixed, so the shape invariant always holds.
    #[must_use]
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the buffer and returns the raw samples.
    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// The number of samples in a row of pixels.
    pub(crate) fn row_len(&self) -> usize {
        self.width as usize * usize::from(self.channels)
    }

    /// Returns a new buffer without the alpha channel.
    ///
    /// Buffers without an alpha channel are returned unchanged.
    #[must_use]
    pub fn without_alpha(self) -> Self {
        let Some(alpha) = self.alpha_channel() else {
            return self;
        };

        let alpha = usize::from(alpha);
        let channels = usize::from(self.channels);
        let data = self
            .data
            .chunks_exact(channels)
            .flat_map(|pixel| {
                pixel
                    .iter()
                    .enumerate()
                    .filter(move |&(c, _)| c != alpha)
                    .map(|(_, &s)| s)
            })
            .collect();

        Self {
            data,
            width: self.width,
            height: self.height,
            channels: self.channels - 1,
        }
    }
}

#[cfg(feature = "image")]
impl PixelBuffer {
    /// Creates a [`PixelBuffer`] directly from parts whose shape is already known to match.
    pub(crate) fn new_unchecked(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            width as usize * height as usize * usize::from(channels)
        );
        Self { data, width, height, channels }
    }
}

#[cfg(feature = "image")]
impl From<DynamicImage> for PixelBuffer {
    /// Converts to 8-bit samples, keeping the image's grey or colour layout and its alpha channel.
    fn from(image: DynamicImage) -> Self {
        let (width, height) = (image.width(), image.height());
        let color = image.color();
        let (data, channels) = match (color.has_color(), color.has_alpha()) {
            (false, false) => (image.into_luma8().into_raw(), 1),
            (false, true) => (image.into_luma_alpha8().into_raw(), 2),
            (true, false) => (image.into_rgb8().into_raw(), 3),
            (true, true) => (image.into_rgba8().into_raw(), 4),
        };
        Self::new_unchecked(data, width, height, channels)
    }
}

#[cfg(feature = "image")]
impl TryFrom<PixelBuffer> for DynamicImage {
    type Error = CodecError;

    fn try_from(buffer: PixelBuffer) -> Result<Self, Self::Error> {
        let PixelBuffer { data, width, height, channels } = buffer;
        let image = match channels {
            1 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageLuma8),
            2 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageLumaA8),
            3 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgb8),
            4 => ImageBuffer::from_raw(width, height, data).map(DynamicImage::ImageRgba8),
            n => return Err(CodecError::new(format!("no image type has {n} channels"))),
        };
        image.ok_or_else(|| CodecError::new("pixel data does not fit the image dimensions"))
    }
}

/// A validated, rectangular matrix of thresholds for ordered dithering.
///
/// The map is tiled over the image, so the threshold at `(x, y)` is
/// `map[y % height][x % width]`. A sample is set to `255` if it is at least the threshold
/// and to `0` otherwise.
///
/// # Examples
/// ```
/// # use bitdither::{ThresholdMap, InvalidMap};
/// # fn main() -> Result<(), InvalidMap> {
/// let map = ThresholdMap::new(vec![vec![64, 184], vec![92, 255]])?;
/// assert_eq!(map.dimensions(), (2, 2));
/// assert_eq!(map.threshold(3, 2), 184);
///
/// let jagged = ThresholdMap::new(vec![vec![64, 184], vec![92]]);
/// assert!(jagged.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThresholdMap {
    /// The number of columns.
    width: usize,
    /// The number of rows.
    height: usize,
    /// The thresholds in row-major order.
    thresholds: Cow<'static, [u8]>,
}

impl ThresholdMap {
    /// Creates a new [`ThresholdMap`] from a list of rows.
    ///
    /// # Errors
    /// Returns an error if there are no rows, the rows are empty, or the rows differ in length.
    pub fn new(rows: Vec<Vec<u8>>) -> Result<Self, InvalidMap> {
        let (width, height) = matrix_shape(&rows).map_err(|err| match err {
            ShapeError::Empty => InvalidMap::Empty,
            ShapeError::Jagged { row, len, expected } => InvalidMap::Jagged { row, len, expected },
        })?;

        Ok(Self {
            width,
            height,
            thresholds: Cow::Owned(rows.concat()),
        })
    }

    /// Creates a [`ThresholdMap`] that borrows one of the built-in tables.
    pub(crate) fn from_static<const N: usize>(rows: &'static [[u8; N]]) -> Self {
        Self {
            width: N,
            height: rows.len(),
            thresholds: Cow::Borrowed(rows.as_flattened()),
        }
    }

    /// Returns `(width, height)` of the map.
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the threshold that applies to the pixel at `(x, y)`.
    #[inline]
    #[must_use]
    pub fn threshold(&self, x: usize, y: usize) -> u8 {
        self.row(y)[x % self.width]
    }

    /// Returns the row of thresholds that applies to image row `y`.
    #[inline]
    pub(crate) fn row(&self, y: usize) -> &[u8] {
        let start = (y % self.height) * self.width;
        &self.thresholds[start..(start + self.width)]
    }
}

impl TryFrom<Vec<Vec<u8>>> for ThresholdMap {
    type Error = InvalidMap;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

/// A validated, rectangular matrix of error diffusion weights.
///
/// The entry in the middle of the first row (column `radius`, where
/// `radius = (width - 1) / 2`) is the pixel being quantized.
/// Each other entry is the fraction of that pixel's quantization error
/// added to the neighbour at the same offset.
/// Since pixels are visited left to right, top to bottom,
/// the current pixel and everything left of it in the first row must have a weight of `0`.
///
/// Weights do not need to sum to `1`; any error not sent to a neighbour is lost.
///
/// # Examples
/// ```
/// # use bitdither::{DiffusionKernel, InvalidKernel};
/// # fn main() -> Result<(), InvalidKernel> {
/// let kernel = DiffusionKernel::new(vec![
///     vec![0.0, 0.0, 7.0 / 16.0],
///     vec![3.0 / 16.0, 5.0 / 16.0, 1.0 / 16.0],
/// ])?;
/// assert_eq!(kernel.radius(), 1);
///
/// // pushes error back onto the previous pixel
/// let backwards = DiffusionKernel::new(vec![vec![0.5, 0.0, 0.5]]);
/// assert!(backwards.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DiffusionKernel {
    /// The number of columns.
    width: usize,
    /// The number of rows.
    height: usize,
    /// The weights in row-major order.
    weights: Cow<'static, [f32]>,
}

impl DiffusionKernel {
    /// Creates a new [`DiffusionKernel`] from a list of rows.
    ///
    /// # Errors
    /// Returns an error if the kernel is empty or jagged,
    /// if any weight is negative or not finite,
    /// or if a non-zero weight would send error to an already visited pixel.
    pub fn new(rows: Vec<Vec<f32>>) -> Result<Self, InvalidKernel> {
        let (width, height) = matrix_shape(&rows).map_err(|err| match err {
            ShapeError::Empty => InvalidKernel::Empty,
            ShapeError::Jagged { row, len, expected } => {
                InvalidKernel::Jagged { row, len, expected }
            }
        })?;

        let kernel = Self {
            width,
            height,
            weights: Cow::Owned(rows.concat()),
        };
        kernel.validate_weights()?;
        Ok(kernel)
    }

    /// Creates a [`DiffusionKernel`] that borrows one of the built-in tables.
    pub(crate) fn from_static<const N: usize>(rows: &'static [[f32; N]]) -> Self {
        Self {
            width: N,
            height: rows.len(),
            weights: Cow::Borrowed(rows.as_flattened()),
        }
    }

    /// Checks that every weight is non-negative and finite and that the kernel is causal.
    fn validate_weights(&self) -> Result<(), InvalidKernel> {
        let radius = self.radius();
        for (i, &weight) in self.weights.iter().enumerate() {
            let (row, column) = (i / self.width, i % self.width);
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(InvalidKernel::BadWeight { row, column, weight });
            }
            if row == 0 && column <= radius && weight != 0.0 {
                return Err(InvalidKernel::NonCausal { column });
            }
        }
        Ok(())
    }

    /// Returns `(width, height)` of the kernel.
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// The column of the first row that corresponds to the current pixel.
    #[must_use]
    pub const fn radius(&self) -> usize {
        (self.width - 1) / 2
    }

    /// Returns the weight at the given row and column.
    #[must_use]
    pub fn weight(&self, row: usize, column: usize) -> f32 {
        self.weights[row * self.width + column]
    }

    /// Returns the sum of all weights, i.e., the fraction of error that is propagated
    /// when every neighbour is in bounds.
    #[must_use]
    pub fn total_weight(&self) -> f32 {
        self.weights.iter().sum()
    }

    /// Returns the non-zero entries as `(column offset, row offset, weight)`,
    /// with column offsets relative to the current pixel.
    pub(crate) fn taps(&self) -> Vec<(isize, usize, f32)> {
        #[allow(clippy::cast_possible_wrap)]
        let radius = self.radius() as isize;
        self.weights
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w != 0.0)
            .map(|(i, &w)| {
                #[allow(clippy::cast_possible_wrap)]
                let dx = (i % self.width) as isize - radius;
                (dx, i / self.width, w)
            })
            .collect()
    }
}

impl TryFrom<Vec<Vec<f32>>> for DiffusionKernel {
    type Error = InvalidKernel;

    fn try_from(rows: Vec<Vec<f32>>) -> Result<Self, Self::Error> {
        Self::new(rows)
    }
}

/// The shape problems shared by threshold maps and diffusion kernels.
enum ShapeError {
    /// No rows or no columns.
    Empty,
    /// A row differs in length from the first row.
    Jagged {
        /// The index of the offending row.
        row: usize,
        /// The length of the offending row.
        len: usize,
        /// The length of the first row.
        expected: usize,
    },
}

/// Returns `(width, height)` of a list of rows if it is non-empty and rectangular.
fn matrix_shape<T>(rows: &[Vec<T>]) -> Result<(usize, usize), ShapeError> {
    let width = rows.first().map_or(0, Vec::len);
    if width == 0 {
        return Err(ShapeError::Empty);
    }

    match rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        Some((row, r)) => Err(ShapeError::Jagged { row, len: r.len(), expected: width }),
        None => Ok((width, rows.len())),
    }
}

#[cfg(feature = "serde")]
mod serde_impls {
    //! Deserializes matrices from nested arrays, validating them on the way in.

    use super::{DiffusionKernel, ThresholdMap};
    use serde::{de::Error, Deserialize, Deserializer};

    impl<'de> Deserialize<'de> for ThresholdMap {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let rows = Vec::<Vec<u8>>::deserialize(deserializer)?;
            ThresholdMap::new(rows).map_err(D::Error::custom)
        }
    }

    impl<'de> Deserialize<'de> for DiffusionKernel {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let rows = Vec::<Vec<f32>>::deserialize(deserializer)?;
            DiffusionKernel::new(rows).map_err(D::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_shape_is_checked() {
        assert_eq!(
            PixelBuffer::new(vec![0; 12], 2, 2, 3).map(|b| b.channels()),
            Ok(3)
        );
        assert_eq!(
            PixelBuffer::new(vec![0; 11], 2, 2, 3),
            Err(BufferShapeError::LengthMismatch { len: 11, expected: 12 })
        );
        assert_eq!(
            PixelBuffer::new(Vec::new(), 2, 2, 0),
            Err(BufferShapeError::NoChannels)
        );
        assert!(PixelBuffer::new(Vec::new(), 0, 0, 4).is_ok());
    }

    #[test]
    fn channel_layouts() {
        let layout = |channels: u8| {
            let buffer = PixelBuffer::new(vec![0; usize::from(channels)], 1, 1, channels).unwrap();
            (buffer.colour_channels(), buffer.alpha_channel())
        };

        assert_eq!(layout(1), (1, None));
        assert_eq!(layout(2), (1, Some(1)));
        assert_eq!(layout(3), (3, None));
        assert_eq!(layout(4), (3, Some(3)));
        assert_eq!(layout(5), (3, Some(3)));
    }

    #[test]
    fn without_alpha_drops_only_alpha() {
        let rgba = PixelBuffer::new(vec![1, 2, 3, 200, 4, 5, 6, 201], 2, 1, 4).unwrap();
        let rgb = rgba.without_alpha();
        assert_eq!(rgb.channels(), 3);
        assert_eq!(rgb.as_raw(), [1, 2, 3, 4, 5, 6]);

        let grey_alpha = PixelBuffer::new(vec![10, 200, 20, 201], 2, 1, 2).unwrap();
        assert_eq!(grey_alpha.without_alpha().as_raw(), [10, 20]);

        let grey = PixelBuffer::new(vec![10, 20], 2, 1, 1).unwrap();
        assert_eq!(grey.clone().without_alpha(), grey);
    }

    #[test]
    fn threshold_map_rejects_bad_shapes() {
        assert_eq!(ThresholdMap::new(Vec::new()), Err(InvalidMap::Empty));
        assert_eq!(ThresholdMap::new(vec![Vec::new()]), Err(InvalidMap::Empty));
        assert_eq!(
            ThresholdMap::new(vec![vec![1, 2], vec![3, 4], vec![5]]),
            Err(InvalidMap::Jagged { row: 2, len: 1, expected: 2 })
        );
    }

    #[test]
    fn threshold_map_tiles() {
        let map = ThresholdMap::new(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        for y in 0..6 {
            for x in 0..9 {
                assert_eq!(map.threshold(x, y), map.threshold(x + 3, y));
                assert_eq!(map.threshold(x, y), map.threshold(x, y + 2));
            }
        }
        assert_eq!(map.threshold(4, 1), 5);
    }

    #[test]
    fn kernel_rejects_bad_weights() {
        assert_eq!(DiffusionKernel::new(Vec::new()), Err(InvalidKernel::Empty));
        assert_eq!(
            DiffusionKernel::new(vec![vec![0.0, 0.5], vec![0.5]]),
            Err(InvalidKernel::Jagged { row: 1, len: 1, expected: 2 })
        );
        assert_eq!(
            DiffusionKernel::new(vec![vec![0.0, 0.5], vec![-0.5, 0.0]]),
            Err(InvalidKernel::BadWeight { row: 1, column: 0, weight: -0.5 })
        );
        assert!(matches!(
            DiffusionKernel::new(vec![vec![0.0, f32::NAN]]),
            Err(InvalidKernel::BadWeight { row: 0, column: 1, .. })
        ));
        assert_eq!(
            DiffusionKernel::new(vec![vec![0.25, 0.0, 0.5]]),
            Err(InvalidKernel::NonCausal { column: 0 })
        );
        assert_eq!(
            DiffusionKernel::new(vec![vec![0.0, 0.25, 0.5]]),
            Err(InvalidKernel::NonCausal { column: 1 })
        );
    }

    #[test]
    fn kernel_taps_are_relative_to_current_pixel() {
        let kernel = DiffusionKernel::new(vec![
            vec![0.0, 0.0, 0.0, 0.25, 0.0],
            vec![0.0, 0.25, 0.0, 0.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.0, 0.5],
        ])
        .unwrap();

        assert_eq!(kernel.radius(), 2);
        assert_eq!(kernel.taps(), vec![(1, 0, 0.25), (-1, 1, 0.25), (2, 2, 0.5)]);
        assert!((kernel.total_weight() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn even_width_kernel_radius_rounds_down() {
        let kernel = DiffusionKernel::new(vec![vec![0.0, 0.5], vec![0.5, 0.0]]).unwrap();
        assert_eq!(kernel.radius(), 0);
        assert_eq!(kernel.taps(), vec![(1, 0, 0.5), (0, 1, 0.5)]);
    }

    #[test]
    #[cfg(feature = "image")]
    fn converts_to_and_from_dynamic_image() {
        use image::{DynamicImage, Luma, LumaA, Rgb};

        let grey = DynamicImage::ImageLumaA8(image::ImageBuffer::from_pixel(3, 2, LumaA([9, 250])));
        let buffer = PixelBuffer::from(grey.clone());
        assert_eq!(buffer.dimensions(), (3, 2));
        assert_eq!(buffer.channels(), 2);
        assert_eq!(DynamicImage::try_from(buffer).unwrap(), grey);

        let deep = DynamicImage::ImageRgb16(image::ImageBuffer::from_pixel(1, 1, Rgb([0_u16, 65535, 0])));
        assert_eq!(PixelBuffer::from(deep).as_raw(), [0, 255, 0]);

        let mono = DynamicImage::ImageLuma8(image::ImageBuffer::from_pixel(1, 1, Luma([3])));
        assert_eq!(PixelBuffer::from(mono).channels(), 1);

        let wide = PixelBuffer::new(vec![0; 5], 1, 1, 5).unwrap();
        assert!(DynamicImage::try_from(wide).is_err());
    }
}
