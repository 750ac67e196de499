//! Contains the types and functions for the high level dither API.

mod codec;
mod ditherer;

#[cfg(feature = "image")]
pub use codec::ImageCodec;
pub use codec::{Codec, Layout};
pub use ditherer::Ditherer;

use crate::{Algorithm, AlgorithmSpec, Catalog, DiffusionKernel, DitherError, ThresholdMap};

/// A builder struct to specify how an image should be dithered.
///
/// The operation is chosen in this order:
/// 1. an explicit [`threshold_map`](DitherOptions::threshold_map),
/// 2. an explicit [`diffusion_kernel`](DitherOptions::diffusion_kernel),
/// 3. the [`algorithm`](DitherOptions::algorithm) name looked up in a [`Catalog`].
///
/// # Examples
/// ```
/// # use bitdither::{Algorithm, DitherOptions};
/// let options = DitherOptions::new()
///     .algorithm(Algorithm::Atkinson)
///     .preserve_alpha(true)
///     .seed(42);
/// ```
///
/// With the `serde` feature, options can also be read from configuration:
/// ```
/// # #[cfg(feature = "serde")]
/// # fn main() -> Result<(), serde_json::Error> {
/// # use bitdither::DitherOptions;
/// let options: DitherOptions = serde_json::from_str(
///     r#"{ "algorithm": "bayer-4", "preserveColour": true }"#,
/// )?;
/// assert_eq!(options.algorithm_name(), Some("bayer-4"));
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "serde"))]
/// # fn main() {}
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase", deny_unknown_fields))]
pub struct DitherOptions {
    /// The name of the algorithm to look up.
    algorithm: Option<String>,
    /// A threshold map that overrides the algorithm name.
    threshold_map: Option<ThresholdMap>,
    /// A diffusion kernel that overrides the algorithm name.
    diffusion_kernel: Option<DiffusionKernel>,
    /// Whether to keep the colour channels instead of expecting a greyscale image.
    preserve_colour: bool,
    /// Whether to keep the alpha channel.
    preserve_alpha: bool,
    /// The seed for algorithms that use randomness.
    seed: Option<u64>,
}

impl DitherOptions {
    /// Creates a new [`DitherOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            algorithm: None,
            threshold_map: None,
            diffusion_kernel: None,
            preserve_colour: false,
            preserve_alpha: false,
            seed: None,
        }
    }

    /// Sets the name of the algorithm to use.
    ///
    /// This accepts an [`Algorithm`] or the name of any entry in the [`Catalog`] being used.
    #[must_use]
    pub fn algorithm(mut self, name: impl Into<String>) -> Self {
        self.algorithm = Some(name.into());
        self
    }

    /// Sets a custom threshold map for ordered dithering.
    ///
    /// This takes priority over both the algorithm name and any diffusion kernel.
    #[must_use]
    pub fn threshold_map(mut self, map: ThresholdMap) -> Self {
        self.threshold_map = Some(map);
        self
    }

    /// Sets a custom diffusion kernel for error diffusion dithering.
    ///
    /// This takes priority over the algorithm name.
    #[must_use]
    pub fn diffusion_kernel(mut self, kernel: DiffusionKernel) -> Self {
        self.diffusion_kernel = Some(kernel);
        self
    }

    /// Sets whether to dither each colour channel instead of a single grey channel.
    ///
    /// When this is `false`, the input is expected to already be greyscale.
    /// A [`Codec`] will produce a greyscale image in that case.
    ///
    /// The default value is `false`.
    #[must_use]
    pub fn preserve_colour(mut self, preserve_colour: bool) -> Self {
        self.preserve_colour = preserve_colour;
        self
    }

    /// Sets whether to keep the alpha channel in the output.
    ///
    /// The alpha channel is never dithered. When this is `false`, it is removed.
    ///
    /// The default value is `false`.
    #[must_use]
    pub fn preserve_alpha(mut self, preserve_alpha: bool) -> Self {
        self.preserve_alpha = preserve_alpha;
        self
    }

    /// Sets the seed value for the random number generator used by
    /// [`Algorithm::WhiteNoise`].
    ///
    /// By default, a new random seed is used for each call.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Gets the algorithm name, if one was set.
    #[must_use]
    pub fn algorithm_name(&self) -> Option<&str> {
        self.algorithm.as_deref()
    }

    /// Gets whether colour channels are preserved.
    #[must_use]
    pub const fn preserves_colour(&self) -> bool {
        self.preserve_colour
    }

    /// Gets whether the alpha channel is preserved.
    #[must_use]
    pub const fn preserves_alpha(&self) -> bool {
        self.preserve_alpha
    }

    /// Gets the random seed, if one was set.
    #[must_use]
    pub const fn random_seed(&self) -> Option<u64> {
        self.seed
    }

    /// Resolves these options to a single dither operation.
    ///
    /// # Errors
    /// Returns [`DitherError::UnknownAlgorithm`] if neither a threshold map nor
    /// a diffusion kernel was given and the algorithm name is missing or not in `catalog`.
    pub fn resolve(&self, catalog: &Catalog) -> Result<AlgorithmSpec, DitherError> {
        if let Some(map) = &self.threshold_map {
            return Ok(map.clone().into());
        }

        if let Some(kernel) = &self.diffusion_kernel {
            return Ok(kernel.clone().into());
        }

        match &self.algorithm {
            Some(name) => catalog
                .resolve(name)
                .cloned()
                .ok_or_else(|| DitherError::UnknownAlgorithm(Some(name.clone()))),
            None => Err(DitherError::UnknownAlgorithm(None)),
        }
    }
}

impl From<Algorithm> for DitherOptions {
    fn from(algorithm: Algorithm) -> Self {
        Self::new().algorithm(algorithm)
    }
}
