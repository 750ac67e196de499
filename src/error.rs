//! Contains the error types returned by this crate.

use thiserror::Error;

/// The reason a threshold map was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidMap {
    /// The map has no rows or its rows have no entries.
    #[error("threshold map is empty")]
    Empty,
    /// A row has a different length than the first row.
    #[error("threshold map row {row} has {len} entries, expected {expected}")]
    Jagged {
        /// The index of the offending row.
        row: usize,
        /// The length of the offending row.
        len: usize,
        /// The length of the first row.
        expected: usize,
    },
}

/// The reason a diffusion kernel was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidKernel {
    /// The kernel has no rows or its rows have no entries.
    #[error("diffusion kernel is empty")]
    Empty,
    /// A row has a different length than the first row.
    #[error("diffusion kernel row {row} has {len} entries, expected {expected}")]
    Jagged {
        /// The index of the offending row.
        row: usize,
        /// The length of the offending row.
        len: usize,
        /// The length of the first row.
        expected: usize,
    },
    /// A weight is negative, infinite, or NaN.
    #[error("diffusion kernel weight {weight} at ({column}, {row}) is not a non-negative finite number")]
    BadWeight {
        /// The row of the offending weight.
        row: usize,
        /// The column of the offending weight.
        column: usize,
        /// The offending weight.
        weight: f32,
    },
    /// A weight in the first row sits on or left of the current pixel,
    /// which would push error onto a pixel that has already been visited.
    #[error("diffusion kernel weight at column {column} of the first row points at an already visited pixel")]
    NonCausal {
        /// The column of the offending weight.
        column: usize,
    },
}

/// The reason a [`PixelBuffer`](crate::PixelBuffer) could not be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferShapeError {
    /// A buffer must have at least one channel.
    #[error("pixel buffer must have at least one channel")]
    NoChannels,
    /// `width * height * channels` overflowed `usize`.
    #[error("pixel buffer dimensions overflow")]
    Overflow,
    /// The data length does not match `width * height * channels`.
    #[error("pixel buffer has {len} samples, expected {expected}")]
    LengthMismatch {
        /// The actual number of samples.
        len: usize,
        /// The number of samples implied by the shape.
        expected: usize,
    },
}

/// An error reported by a [`Codec`](crate::Codec) implementation.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CodecError {
    /// A description of what went wrong.
    message: String,
    /// The underlying error, if there is one.
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CodecError {
    /// Creates a new [`CodecError`] with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), source: None }
    }

    /// Creates a new [`CodecError`] wrapping an underlying error.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// The error type returned by [`Ditherer`](crate::Ditherer).
///
/// Every variant is raised before the pixel buffer is touched,
/// so a failed call never leaves a partially dithered buffer behind.
///
/// The [`Ditherer`](crate::Ditherer) itself only returns [`DitherError::UnknownAlgorithm`],
/// [`DitherError::MissingCodec`], and [`DitherError::Codec`].
/// The remaining variants wrap the errors from building a [`ThresholdMap`](crate::ThresholdMap),
/// [`DiffusionKernel`](crate::DiffusionKernel), or [`PixelBuffer`](crate::PixelBuffer),
/// so callers can use `?` on every step with one error type:
/// ```
/// # use bitdither::{DitherError, DitherOptions, Ditherer, PixelBuffer, ThresholdMap};
/// fn dither_stripes(data: Vec<u8>, width: u32, height: u32) -> Result<PixelBuffer, DitherError> {
///     let buffer = PixelBuffer::new(data, width, height, 1)?;
///     let map = ThresholdMap::new(vec![vec![64, 184]])?;
///     Ditherer::new().dither(buffer, &DitherOptions::new().threshold_map(map))
/// }
///
/// assert_eq!(dither_stripes(vec![127; 4], 2, 2)?.as_raw(), [255, 0, 255, 0]);
/// assert!(matches!(dither_stripes(vec![127; 3], 2, 2), Err(DitherError::BufferShape(_))));
/// # Ok::<(), DitherError>(())
/// ```
#[derive(Debug, Error)]
pub enum DitherError {
    /// No threshold map or diffusion kernel was given and the algorithm name did not resolve.
    #[error("{}", unknown_algorithm_message(.0.as_deref()))]
    UnknownAlgorithm(Option<String>),
    /// The given threshold map is invalid.
    #[error("invalid threshold map: {0}")]
    InvalidMap(#[from] InvalidMap),
    /// The given diffusion kernel is invalid.
    #[error("invalid diffusion kernel: {0}")]
    InvalidKernel(#[from] InvalidKernel),
    /// The pixel data does not match its declared shape.
    #[error("invalid pixel buffer: {0}")]
    BufferShape(#[from] BufferShapeError),
    /// An image-level operation was requested but no codec was given to the [`Ditherer`](crate::Ditherer).
    #[error("no image codec was configured; use `Ditherer::with_codec` to provide one")]
    MissingCodec,
    /// The codec failed to decode or encode an image.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

/// Formats the message for [`DitherError::UnknownAlgorithm`].
fn unknown_algorithm_message(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("unknown dither algorithm `{name}`"),
        None => "no dither algorithm, threshold map, or diffusion kernel given".to_owned(),
    }
}
