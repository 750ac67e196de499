//! Contains the [`Ditherer`] struct which ties options, the catalog, and a codec together.

use super::{Codec, DitherOptions, Layout};
use crate::{AlgorithmSpec, Catalog, DitherError, PixelBuffer};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;
use std::{borrow::Cow, fmt};

/// Dithers pixel buffers, or encoded images if given a [`Codec`].
///
/// # Examples
/// ```
/// # use bitdither::{Ditherer, DitherOptions, PixelBuffer, Algorithm};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let buffer = PixelBuffer::new(vec![127; 4], 2, 2, 1)?;
/// let options = DitherOptions::new().algorithm(Algorithm::Bayer2);
///
/// let dithered = Ditherer::new().dither(buffer, &options)?;
/// assert_eq!(dithered.as_raw(), [255, 0, 0, 255]);
/// # Ok(())
/// # }
/// ```
///
/// Custom algorithms can be registered by name:
/// ```
/// # use bitdither::{Ditherer, DitherOptions, PixelBuffer, Catalog, ThresholdMap};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut catalog = Catalog::default();
/// catalog.insert("stripes", ThresholdMap::new(vec![vec![64, 184]])?);
///
/// let ditherer = Ditherer::new().with_catalog(catalog);
/// let buffer = PixelBuffer::new(vec![127; 4], 2, 2, 1)?;
/// let dithered = ditherer.dither(buffer, &DitherOptions::new().algorithm("stripes"))?;
/// assert_eq!(dithered.as_raw(), [255, 0, 255, 0]);
/// # Ok(())
/// # }
/// ```
pub struct Ditherer {
    /// The catalog used to resolve algorithm names.
    catalog: Cow<'static, Catalog>,
    /// The codec used by the image-level operations.
    codec: Option<Box<dyn Codec>>,
}

impl Ditherer {
    /// Creates a new [`Ditherer`] using the built-in algorithms and no codec.
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: Cow::Borrowed(Catalog::builtin()),
            codec: None,
        }
    }

    /// Sets the catalog used to resolve algorithm names.
    #[must_use]
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Cow::Owned(catalog);
        self
    }

    /// Sets the codec used by [`Ditherer::dither_image`].
    #[must_use]
    pub fn with_codec(mut self, codec: impl Codec + 'static) -> Self {
        self.codec = Some(Box::new(codec));
        self
    }

    /// The catalog used to resolve algorithm names.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Whether a codec has been set.
    #[must_use]
    pub fn has_codec(&self) -> bool {
        self.codec.is_some()
    }

    /// Adjusts the buffer's channels for an already resolved operation.
    fn prepare(
        spec: &AlgorithmSpec,
        buffer: PixelBuffer,
        options: &DitherOptions,
    ) -> PixelBuffer {
        log::debug!(
            "dithering {}x{} image with {} channel(s) using {} ({})",
            buffer.width(),
            buffer.height(),
            buffer.channels(),
            options.algorithm_name().unwrap_or("custom matrix"),
            spec.kind(),
        );

        if !options.preserves_colour() && buffer.colour_channels() > 1 {
            log::warn!(
                "colour was not preserved but the buffer has {} colour channels, dithering each of them",
                buffer.colour_channels(),
            );
        }

        if !options.preserves_alpha() && buffer.has_alpha() {
            log::debug!("removing alpha channel");
            buffer.without_alpha()
        } else {
            buffer
        }
    }

    /// Applies a resolved operation to `buffer`.
    fn apply<R: Rng + ?Sized>(
        spec: &AlgorithmSpec,
        buffer: PixelBuffer,
        options: &DitherOptions,
        rng: &mut R,
    ) -> PixelBuffer {
        let mut buffer = Self::prepare(spec, buffer, options);
        match spec {
            AlgorithmSpec::ThresholdMap(map) => map.dither(&mut buffer),
            AlgorithmSpec::DiffusionKernel(kernel) => kernel.dither(&mut buffer),
            AlgorithmSpec::SinglePixel(processor) => processor.dither(&mut buffer, rng),
        }
        buffer
    }

    /// Dithers `buffer` according to `options`, using `rng` for any randomness.
    ///
    /// The random seed in `options` is ignored.
    ///
    /// # Errors
    /// See [`Ditherer::dither`].
    pub fn dither_with_rng<R: Rng + ?Sized>(
        &self,
        buffer: PixelBuffer,
        options: &DitherOptions,
        rng: &mut R,
    ) -> Result<PixelBuffer, DitherError> {
        let spec = options.resolve(&self.catalog)?;
        Ok(Self::apply(&spec, buffer, options, rng))
    }

    /// Dithers `buffer` according to `options`.
    ///
    /// Every colour sample of the output is `0` or `255`.
    /// The alpha channel is copied through unchanged if it is preserved and removed otherwise.
    ///
    /// # Errors
    /// Returns [`DitherError::UnknownAlgorithm`] if `options` has no threshold map,
    /// no diffusion kernel, and no algorithm name known to this ditherer's catalog.
    /// The buffer is not modified in that case.
    pub fn dither(
        &self,
        buffer: PixelBuffer,
        options: &DitherOptions,
    ) -> Result<PixelBuffer, DitherError> {
        self.dither_with_rng(buffer, options, &mut rng(options))
    }

    /// Decodes `input` with this ditherer's codec, dithers it, and encodes the result.
    ///
    /// # Errors
    /// Returns [`DitherError::MissingCodec`] if no codec has been set,
    /// [`DitherError::UnknownAlgorithm`] if the options do not resolve,
    /// or [`DitherError::Codec`] if decoding or encoding fails.
    /// Nothing is decoded unless a codec is present and the options resolve.
    pub fn dither_image(
        &self,
        input: &[u8],
        options: &DitherOptions,
    ) -> Result<Vec<u8>, DitherError> {
        let codec = self.codec.as_deref().ok_or(DitherError::MissingCodec)?;
        let spec = options.resolve(&self.catalog)?;

        let buffer = codec.decode(input, layout(options))?;
        let buffer = Self::apply(&spec, buffer, options, &mut rng(options));
        Ok(codec.encode(&buffer)?)
    }
}

#[cfg(feature = "threads")]
impl Ditherer {
    /// Applies a resolved operation to `buffer`, in parallel where possible.
    fn apply_par(spec: &AlgorithmSpec, buffer: PixelBuffer, options: &DitherOptions) -> PixelBuffer {
        let mut buffer = Self::prepare(spec, buffer, options);
        match spec {
            AlgorithmSpec::ThresholdMap(map) => map.dither_par(&mut buffer),
            AlgorithmSpec::DiffusionKernel(kernel) => kernel.dither(&mut buffer),
            AlgorithmSpec::SinglePixel(processor) => {
                processor.dither_par(&mut buffer, &mut rng(options));
            }
        }
        buffer
    }

    /// Dithers `buffer` according to `options`, in parallel where possible.
    ///
    /// Threshold maps and [`SinglePixel::Threshold`](crate::SinglePixel::Threshold) run in parallel.
    /// Error diffusion and white noise are inherently sequential and run on the calling thread.
    /// The output is always identical to [`Ditherer::dither`] with the same options.
    ///
    /// # Errors
    /// See [`Ditherer::dither`].
    pub fn dither_par(
        &self,
        buffer: PixelBuffer,
        options: &DitherOptions,
    ) -> Result<PixelBuffer, DitherError> {
        let spec = options.resolve(&self.catalog)?;
        Ok(Self::apply_par(&spec, buffer, options))
    }

    /// Decodes, dithers in parallel, and encodes an image.
    ///
    /// # Errors
    /// See [`Ditherer::dither_image`].
    pub fn dither_image_par(
        &self,
        input: &[u8],
        options: &DitherOptions,
    ) -> Result<Vec<u8>, DitherError> {
        let codec = self.codec.as_deref().ok_or(DitherError::MissingCodec)?;
        let spec = options.resolve(&self.catalog)?;

        let buffer = codec.decode(input, layout(options))?;
        let buffer = Self::apply_par(&spec, buffer, options);
        Ok(codec.encode(&buffer)?)
    }
}

impl Default for Ditherer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Ditherer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ditherer")
            .field("algorithms", &self.catalog.len())
            .field("codec", &self.codec.is_some())
            .finish()
    }
}

/// The decode layout requested by `options`.
fn layout(options: &DitherOptions) -> Layout {
    Layout {
        colour: options.preserves_colour(),
        alpha: options.preserves_alpha(),
    }
}

/// Creates the random number generator for `options`.
fn rng(options: &DitherOptions) -> Xoroshiro128PlusPlus {
    match options.random_seed() {
        Some(seed) => Xoroshiro128PlusPlus::seed_from_u64(seed),
        None => Xoroshiro128PlusPlus::from_entropy(),
    }
}
