//! Contains the built-in dither algorithms and the name lookup table.
//!
//! Every algorithm is one of three kinds:
//! - a [`ThresholdMap`] for ordered dithering,
//! - a [`DiffusionKernel`] for error diffusion dithering,
//! - or a [`SinglePixel`] processor that needs no spatial context.
//!
//! The built-in algorithms are listed by [`Algorithm`].
//! A [`Catalog`] maps names to an [`AlgorithmSpec`] and can be extended with custom entries.

use crate::{DiffusionKernel, ThresholdMap};
use std::{
    borrow::Cow,
    collections::HashMap,
    fmt::{self, Display},
    str::FromStr,
    sync::OnceLock,
};

/// The 2×2 Bayer matrix scaled to `0..=255`.
#[rustfmt::skip]
static BAYER_2: [[u8; 2]; 2] = [
    [0, 128],
    [192, 64],
];

/// The 4×4 Bayer matrix scaled to `0..=255`.
#[rustfmt::skip]
static BAYER_4: [[u8; 4]; 4] = [
    [0, 128, 32, 160],
    [192, 64, 224, 96],
    [48, 176, 16, 144],
    [240, 112, 208, 80],
];

/// The 8×8 Bayer matrix scaled to `0..=255`.
#[rustfmt::skip]
static BAYER_8: [[u8; 8]; 8] = [
    [0, 128, 32, 160, 8, 136, 40, 168],
    [192, 64, 224, 96, 200, 72, 232, 104],
    [48, 176, 16, 144, 56, 184, 24, 152],
    [240, 112, 208, 80, 248, 120, 216, 88],
    [12, 140, 44, 172, 4, 132, 36, 164],
    [204, 76, 236, 108, 196, 68, 228, 100],
    [60, 188, 28, 156, 52, 180, 20, 148],
    [252, 124, 220, 92, 244, 116, 212, 84],
];

/// The 16×16 Bayer matrix scaled to `0..=255`.
#[rustfmt::skip]
static BAYER_16: [[u8; 16]; 16] = [
    [0, 128, 32, 160, 8, 136, 40, 168, 2, 130, 34, 162, 10, 138, 42, 170],
    [192, 64, 224, 96, 200, 72, 232, 104, 194, 66, 226, 98, 202, 74, 234, 106],
    [48, 176, 16, 144, 56, 184, 24, 152, 50, 178, 18, 146, 58, 186, 26, 154],
    [240, 112, 208, 80, 248, 120, 216, 88, 242, 114, 210, 82, 250, 122, 218, 90],
    [12, 140, 44, 172, 4, 132, 36, 164, 14, 142, 46, 174, 6, 134, 38, 166],
    [204, 76, 236, 108, 196, 68, 228, 100, 206, 78, 238, 110, 198, 70, 230, 102],
    [60, 188, 28, 156, 52, 180, 20, 148, 62, 190, 30, 158, 54, 182, 22, 150],
    [252, 124, 220, 92, 244, 116, 212, 84, 254, 126, 222, 94, 246, 118, 214, 86],
    [3, 131, 35, 163, 11, 139, 43, 171, 1, 129, 33, 161, 9, 137, 41, 169],
    [195, 67, 227, 99, 203, 75, 235, 107, 193, 65, 225, 97, 201, 73, 233, 105],
    [51, 179, 19, 147, 59, 187, 27, 155, 49, 177, 17, 145, 57, 185, 25, 153],
    [243, 115, 211, 83, 251, 123, 219, 91, 241, 113, 209, 81, 249, 121, 217, 89],
    [15, 143, 47, 175, 7, 135, 39, 167, 13, 141, 45, 173, 5, 133, 37, 165],
    [207, 79, 239, 111, 199, 71, 231, 103, 205, 77, 237, 109, 197, 69, 229, 101],
    [63, 191, 31, 159, 55, 183, 23, 151, 61, 189, 29, 157, 53, 181, 21, 149],
    [255, 127, 223, 95, 247, 119, 215, 87, 253, 125, 221, 93, 245, 117, 213, 85],
];

/// Half the error right, half down.
#[rustfmt::skip]
static SIMPLE_DIFFUSION: [[f32; 2]; 2] = [
    [0.0, 0.5],
    [0.5, 0.0],
];

#[rustfmt::skip]
static FALSE_FLOYD_STEINBERG: [[f32; 2]; 2] = [
    [0.0,       3.0 / 8.0],
    [3.0 / 8.0, 2.0 / 8.0],
];

#[rustfmt::skip]
static FLOYD_STEINBERG: [[f32; 3]; 2] = [
    [0.0,        0.0,        7.0 / 16.0],
    [3.0 / 16.0, 5.0 / 16.0, 1.0 / 16.0],
];

#[rustfmt::skip]
static JARVIS_JUDICE_NINKE: [[f32; 5]; 3] = [
    [0.0,        0.0,        0.0,        7.0 / 48.0, 5.0 / 48.0],
    [3.0 / 48.0, 5.0 / 48.0, 7.0 / 48.0, 5.0 / 48.0, 3.0 / 48.0],
    [1.0 / 48.0, 3.0 / 48.0, 5.0 / 48.0, 3.0 / 48.0, 1.0 / 48.0],
];

#[rustfmt::skip]
static STUCKI: [[f32; 5]; 3] = [
    [0.0,        0.0,        0.0,        8.0 / 42.0, 4.0 / 42.0],
    [2.0 / 42.0, 4.0 / 42.0, 8.0 / 42.0, 4.0 / 42.0, 2.0 / 42.0],
    [1.0 / 42.0, 2.0 / 42.0, 4.0 / 42.0, 2.0 / 42.0, 1.0 / 42.0],
];

#[rustfmt::skip]
static BURKES: [[f32; 5]; 2] = [
    [0.0,        0.0,        0.0,        8.0 / 32.0, 4.0 / 32.0],
    [2.0 / 32.0, 4.0 / 32.0, 8.0 / 32.0, 4.0 / 32.0, 2.0 / 32.0],
];

/// Only diffuses 6/8 of the error.
#[rustfmt::skip]
static ATKINSON: [[f32; 4]; 3] = [
    [0.0,       0.0,       1.0 / 8.0, 1.0 / 8.0],
    [1.0 / 8.0, 1.0 / 8.0, 1.0 / 8.0, 0.0],
    [0.0,       1.0 / 8.0, 0.0,       0.0],
];

/// Only diffuses 12/14 of the error.
/// See <https://hbfs.wordpress.com/2013/12/31/dithering/>.
#[rustfmt::skip]
static PIGEON: [[f32; 5]; 3] = [
    [0.0,        0.0,        0.0,        2.0 / 14.0, 1.0 / 14.0],
    [0.0,        2.0 / 14.0, 2.0 / 14.0, 2.0 / 14.0, 0.0],
    [1.0 / 14.0, 0.0,        1.0 / 14.0, 0.0,        1.0 / 14.0],
];

#[rustfmt::skip]
static SIERRA: [[f32; 5]; 3] = [
    [0.0,        0.0,        0.0,        5.0 / 32.0, 3.0 / 32.0],
    [2.0 / 32.0, 4.0 / 32.0, 5.0 / 32.0, 4.0 / 32.0, 2.0 / 32.0],
    [0.0,        2.0 / 32.0, 3.0 / 32.0, 2.0 / 32.0, 0.0],
];

#[rustfmt::skip]
static SIERRA_TWO_ROW: [[f32; 5]; 2] = [
    [0.0,        0.0,        0.0,        4.0 / 16.0, 3.0 / 16.0],
    [1.0 / 16.0, 2.0 / 16.0, 3.0 / 16.0, 2.0 / 16.0, 1.0 / 16.0],
];

#[rustfmt::skip]
static SIERRA_LITE: [[f32; 3]; 2] = [
    [0.0,       0.0,       2.0 / 4.0],
    [1.0 / 4.0, 1.0 / 4.0, 0.0],
];

/// A per-pixel processor that does not need a threshold map or diffusion kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SinglePixel {
    /// Sets each sample to `0` if it is below `128` and to `255` otherwise.
    Threshold,
    /// Compares each pixel against a uniformly random threshold.
    WhiteNoise,
}

/// The three kinds of dither algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmKind {
    /// Ordered dithering with a [`ThresholdMap`].
    ThresholdMap,
    /// Error diffusion dithering with a [`DiffusionKernel`].
    DiffusionKernel,
    /// A [`SinglePixel`] processor.
    SinglePixel,
}

impl Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AlgorithmKind::ThresholdMap => "threshold map",
            AlgorithmKind::DiffusionKernel => "diffusion kernel",
            AlgorithmKind::SinglePixel => "single pixel",
        })
    }
}

/// A fully resolved dither operation.
#[derive(Debug, Clone, PartialEq)]
pub enum AlgorithmSpec {
    /// Ordered dithering with the given map.
    ThresholdMap(ThresholdMap),
    /// Error diffusion dithering with the given kernel.
    DiffusionKernel(DiffusionKernel),
    /// One of the single pixel processors.
    SinglePixel(SinglePixel),
}

impl AlgorithmSpec {
    /// Returns which kind of algorithm this is.
    #[must_use]
    pub const fn kind(&self) -> AlgorithmKind {
        match self {
            AlgorithmSpec::ThresholdMap(_) => AlgorithmKind::ThresholdMap,
            AlgorithmSpec::DiffusionKernel(_) => AlgorithmKind::DiffusionKernel,
            AlgorithmSpec::SinglePixel(_) => AlgorithmKind::SinglePixel,
        }
    }
}

impl From<ThresholdMap> for AlgorithmSpec {
    fn from(map: ThresholdMap) -> Self {
        AlgorithmSpec::ThresholdMap(map)
    }
}

impl From<DiffusionKernel> for AlgorithmSpec {
    fn from(kernel: DiffusionKernel) -> Self {
        AlgorithmSpec::DiffusionKernel(kernel)
    }
}

impl From<SinglePixel> for AlgorithmSpec {
    fn from(processor: SinglePixel) -> Self {
        AlgorithmSpec::SinglePixel(processor)
    }
}

/// The built-in dither algorithms.
///
/// # Examples
/// ```
/// # use bitdither::{Algorithm, AlgorithmKind};
/// let algorithm: Algorithm = "floyd-steinberg".parse().unwrap();
/// assert_eq!(algorithm, Algorithm::FloydSteinberg);
/// assert_eq!(algorithm.kind(), AlgorithmKind::DiffusionKernel);
/// assert_eq!(algorithm.to_string(), "floyd-steinberg");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Hard threshold at `128`.
    Threshold,
    /// Random threshold per pixel.
    WhiteNoise,
    /// 2×2 Bayer ordered dithering.
    Bayer2,
    /// 4×4 Bayer ordered dithering.
    Bayer4,
    /// 8×8 Bayer ordered dithering.
    Bayer8,
    /// 16×16 Bayer ordered dithering.
    Bayer16,
    /// Half of the error to the right and half below.
    SimpleDiffusion,
    /// The simplified three-neighbour Floyd–Steinberg kernel.
    FalseFloydSteinberg,
    /// Floyd–Steinberg error diffusion.
    FloydSteinberg,
    /// Jarvis, Judice, and Ninke error diffusion.
    JarvisJudiceNinke,
    /// Stucki error diffusion.
    Stucki,
    /// Burkes error diffusion.
    Burkes,
    /// Atkinson error diffusion.
    Atkinson,
    /// The "pigeon" error diffusion kernel.
    Pigeon,
    /// Sierra (three row) error diffusion.
    Sierra,
    /// Two row Sierra error diffusion.
    SierraTwoRow,
    /// Sierra Lite error diffusion.
    SierraLite,
}

impl Algorithm {
    /// Every built-in algorithm.
    pub const ALL: [Algorithm; 17] = [
        Algorithm::Threshold,
        Algorithm::WhiteNoise,
        Algorithm::Bayer2,
        Algorithm::Bayer4,
        Algorithm::Bayer8,
        Algorithm::Bayer16,
        Algorithm::SimpleDiffusion,
        Algorithm::FalseFloydSteinberg,
        Algorithm::FloydSteinberg,
        Algorithm::JarvisJudiceNinke,
        Algorithm::Stucki,
        Algorithm::Burkes,
        Algorithm::Atkinson,
        Algorithm::Pigeon,
        Algorithm::Sierra,
        Algorithm::SierraTwoRow,
        Algorithm::SierraLite,
    ];

    /// The name used to refer to this algorithm in configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::Threshold => "threshold",
            Algorithm::WhiteNoise => "white-noise",
            Algorithm::Bayer2 => "bayer-2",
            Algorithm::Bayer4 => "bayer-4",
            Algorithm::Bayer8 => "bayer-8",
            Algorithm::Bayer16 => "bayer-16",
            Algorithm::SimpleDiffusion => "simple-diffusion",
            Algorithm::FalseFloydSteinberg => "false-floyd-steinberg",
            Algorithm::FloydSteinberg => "floyd-steinberg",
            Algorithm::JarvisJudiceNinke => "jarvis-judice-ninke",
            Algorithm::Stucki => "stucki",
            Algorithm::Burkes => "burkes",
            Algorithm::Atkinson => "atkinson",
            Algorithm::Pigeon => "pigeon",
            Algorithm::Sierra => "sierra",
            Algorithm::SierraTwoRow => "sierra-two-row",
            Algorithm::SierraLite => "sierra-lite",
        }
    }

    /// Returns which kind of algorithm this is.
    #[must_use]
    pub const fn kind(self) -> AlgorithmKind {
        match self {
            Algorithm::Threshold | Algorithm::WhiteNoise => AlgorithmKind::SinglePixel,
            Algorithm::Bayer2 | Algorithm::Bayer4 | Algorithm::Bayer8 | Algorithm::Bayer16 => {
                AlgorithmKind::ThresholdMap
            }
            _ => AlgorithmKind::DiffusionKernel,
        }
    }

    /// Returns the map, kernel, or processor for this algorithm.
    ///
    /// The built-in tables are borrowed, so this does not allocate.
    #[must_use]
    pub fn spec(self) -> AlgorithmSpec {
        match self {
            Algorithm::Threshold => SinglePixel::Threshold.into(),
            Algorithm::WhiteNoise => SinglePixel::WhiteNoise.into(),
            Algorithm::Bayer2 => ThresholdMap::from_static(&BAYER_2).into(),
            Algorithm::Bayer4 => ThresholdMap::from_static(&BAYER_4).into(),
            Algorithm::Bayer8 => ThresholdMap::from_static(&BAYER_8).into(),
            Algorithm::Bayer16 => ThresholdMap::from_static(&BAYER_16).into(),
            Algorithm::SimpleDiffusion => DiffusionKernel::from_static(&SIMPLE_DIFFUSION).into(),
            Algorithm::FalseFloydSteinberg => {
                DiffusionKernel::from_static(&FALSE_FLOYD_STEINBERG).into()
            }
            Algorithm::FloydSteinberg => DiffusionKernel::from_static(&FLOYD_STEINBERG).into(),
            Algorithm::JarvisJudiceNinke => {
                DiffusionKernel::from_static(&JARVIS_JUDICE_NINKE).into()
            }
            Algorithm::Stucki => DiffusionKernel::from_static(&STUCKI).into(),
            Algorithm::Burkes => DiffusionKernel::from_static(&BURKES).into(),
            Algorithm::Atkinson => DiffusionKernel::from_static(&ATKINSON).into(),
            Algorithm::Pigeon => DiffusionKernel::from_static(&PIGEON).into(),
            Algorithm::Sierra => DiffusionKernel::from_static(&SIERRA).into(),
            Algorithm::SierraTwoRow => DiffusionKernel::from_static(&SIERRA_TWO_ROW).into(),
            Algorithm::SierraLite => DiffusionKernel::from_static(&SIERRA_LITE).into(),
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// An error for when a name does not match any built-in [`Algorithm`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{0}` is not a built-in dither algorithm")]
pub struct UnknownAlgorithmName(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithmName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == s)
            .ok_or_else(|| UnknownAlgorithmName(s.to_owned()))
    }
}

impl From<Algorithm> for String {
    fn from(algorithm: Algorithm) -> Self {
        algorithm.name().to_owned()
    }
}

/// A name to [`AlgorithmSpec`] lookup table.
///
/// [`Catalog::default`] contains every built-in [`Algorithm`].
/// Custom threshold maps and diffusion kernels can be registered under new names
/// (or can replace built-in ones) with [`Catalog::insert`].
///
/// # Examples
/// ```
/// # use bitdither::{Catalog, AlgorithmKind, ThresholdMap};
/// let mut catalog = Catalog::default();
/// assert_eq!(catalog.resolve("bayer-4").map(|s| s.kind()), Some(AlgorithmKind::ThresholdMap));
///
/// let map = ThresholdMap::new(vec![vec![64, 192]]).unwrap();
/// catalog.insert("stripes", map);
/// assert!(catalog.resolve("stripes").is_some());
/// assert!(catalog.resolve("checkers").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
    /// The registered algorithms.
    entries: HashMap<Cow<'static, str>, AlgorithmSpec>,
}

impl Catalog {
    /// Creates a catalog with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Returns a shared catalog of the built-in algorithms, initialized on first use.
    #[must_use]
    pub fn builtin() -> &'static Catalog {
        static BUILTIN: OnceLock<Catalog> = OnceLock::new();
        BUILTIN.get_or_init(Catalog::default)
    }

    /// Registers an algorithm under the given name, returning the entry it replaced, if any.
    pub fn insert(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        spec: impl Into<AlgorithmSpec>,
    ) -> Option<AlgorithmSpec> {
        self.entries.insert(name.into(), spec.into())
    }

    /// Looks up the algorithm registered under the given name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&AlgorithmSpec> {
        self.entries.get(name)
    }

    /// Returns the registered names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(AsRef::as_ref)
    }

    /// The number of registered algorithms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        let entries = Algorithm::ALL
            .into_iter()
            .map(|algorithm| (Cow::Borrowed(algorithm.name()), algorithm.spec()))
            .collect();

        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.name().parse(), Ok(algorithm));
        }
        assert_eq!(
            "floyd".parse::<Algorithm>(),
            Err(UnknownAlgorithmName("floyd".to_owned()))
        );
    }

    #[test]
    fn kinds_match_specs() {
        for algorithm in Algorithm::ALL {
            assert_eq!(algorithm.kind(), algorithm.spec().kind(), "{algorithm}");
        }

        let count = |kind| Algorithm::ALL.iter().filter(|a| a.kind() == kind).count();
        assert_eq!(count(AlgorithmKind::SinglePixel), 2);
        assert_eq!(count(AlgorithmKind::ThresholdMap), 4);
        assert_eq!(count(AlgorithmKind::DiffusionKernel), 11);
    }

    #[test]
    fn builtin_kernels_are_valid() {
        for algorithm in Algorithm::ALL {
            if let AlgorithmSpec::DiffusionKernel(kernel) = algorithm.spec() {
                let (width, height) = kernel.dimensions();
                let rows = (0..height)
                    .map(|r| (0..width).map(|c| kernel.weight(r, c)).collect())
                    .collect();

                assert_eq!(DiffusionKernel::new(rows).as_ref(), Ok(&kernel), "{algorithm}");
                assert!(kernel.total_weight() <= 1.0 + 1e-6, "{algorithm}");
            }
        }
    }

    #[test]
    fn kernel_weight_totals() {
        for algorithm in [
            Algorithm::SimpleDiffusion,
            Algorithm::FalseFloydSteinberg,
            Algorithm::FloydSteinberg,
            Algorithm::JarvisJudiceNinke,
            Algorithm::Stucki,
            Algorithm::Burkes,
            Algorithm::Sierra,
            Algorithm::SierraTwoRow,
            Algorithm::SierraLite,
        ] {
            let AlgorithmSpec::DiffusionKernel(kernel) = algorithm.spec() else {
                panic!("{algorithm} is not a diffusion kernel");
            };
            assert!((kernel.total_weight() - 1.0).abs() < 1e-6, "{algorithm}");
        }

        let AlgorithmSpec::DiffusionKernel(atkinson) = Algorithm::Atkinson.spec() else {
            panic!("atkinson is not a diffusion kernel");
        };
        assert!((atkinson.total_weight() - 0.75).abs() < 1e-6);

        let AlgorithmSpec::DiffusionKernel(pigeon) = Algorithm::Pigeon.spec() else {
            panic!("pigeon is not a diffusion kernel");
        };
        assert!((pigeon.total_weight() - 12.0 / 14.0).abs() < 1e-6);
    }

    #[test]
    fn bayer_maps_are_permutations() {
        for (algorithm, n) in [
            (Algorithm::Bayer2, 2),
            (Algorithm::Bayer4, 4),
            (Algorithm::Bayer8, 8),
            (Algorithm::Bayer16, 16),
        ] {
            let AlgorithmSpec::ThresholdMap(map) = algorithm.spec() else {
                panic!("{algorithm} is not a threshold map");
            };
            assert_eq!(map.dimensions(), (n, n));

            let step = 256 / (n * n);
            let mut thresholds = (0..n)
                .flat_map(|y| (0..n).map(move |x| (x, y)))
                .map(|(x, y)| usize::from(map.threshold(x, y)))
                .collect::<Vec<_>>();
            thresholds.sort_unstable();
            assert_eq!(thresholds, (0..(n * n)).map(|i| i * step).collect::<Vec<_>>());
        }
    }

    #[test]
    fn builtin_catalog_resolves_every_algorithm() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), Algorithm::ALL.len());
        for algorithm in Algorithm::ALL {
            assert_eq!(catalog.resolve(algorithm.name()), Some(&algorithm.spec()));
        }
        assert!(catalog.resolve("bayer-32").is_none());
    }

    #[test]
    fn custom_entries_replace_builtins() {
        let mut catalog = Catalog::default();
        let map = ThresholdMap::new(vec![vec![10]]).unwrap();
        let replaced = catalog.insert("floyd-steinberg", map.clone());

        assert_eq!(replaced, Some(Algorithm::FloydSteinberg.spec()));
        assert_eq!(
            catalog.resolve("floyd-steinberg"),
            Some(&AlgorithmSpec::ThresholdMap(map))
        );
        assert_eq!(Catalog::empty().len(), 0);
    }
}
