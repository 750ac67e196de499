//! A library for dithering images down to two levels per channel.
//!
//! `bitdither` turns every colour sample of an image into either `0` or `255` using one of
//! three families of algorithms:
//! - ordered dithering with a tiled [`ThresholdMap`], such as the Bayer matrices,
//! - error diffusion with a [`DiffusionKernel`], such as Floyd–Steinberg or Atkinson,
//! - single pixel processing: a hard threshold or white noise (see [`SinglePixel`]).
//!
//! The built-in algorithms are listed in [`Algorithm`], and can be looked up by name in a [`Catalog`].
//! Custom maps and kernels can be given directly or registered in a catalog under a new name.
//!
//! # Features
//! To reduce dependencies and compile times, `bitdither` has several `cargo` features
//! that can be turned off or on:
//! - `threads`: exposes parallel versions of the functions that allow it via [`rayon`].
//! - `image`: enables integration with the [`image`] crate, including [`ImageCodec`].
//! - `serde`: allows reading [`DitherOptions`], maps, and kernels from configuration.
//!
//! # High-Level API
//! To get started, see [`Ditherer`] and [`DitherOptions`]:
//! ```no_run
//! # use bitdither::{Ditherer, DitherOptions, ImageCodec, Algorithm};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = std::fs::read("some image")?;
//!
//! let options = DitherOptions::new()
//!     .algorithm(Algorithm::FloydSteinberg)
//!     .preserve_alpha(true); // keep transparency
//!
//! // Decode, dither, and encode as PNG
//! let ditherer = Ditherer::new().with_codec(ImageCodec::new());
//! let png = ditherer.dither_image(&input, &options)?;
//! # Ok(())
//! # }
//! ```
//!
//! Raw pixel data can be dithered without a codec:
//! ```
//! # use bitdither::{Ditherer, DitherOptions, PixelBuffer, ThresholdMap};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let buffer = PixelBuffer::new(vec![127; 4], 2, 2, 1)?;
//! let options = DitherOptions::new().threshold_map(ThresholdMap::new(vec![vec![64, 184]])?);
//!
//! let dithered = Ditherer::new().dither(buffer, &options)?;
//! assert_eq!(dithered.as_raw(), [255, 0, 255, 0]);
//! # Ok(())
//! # }
//! ```
//!
//! Note that some of the options and functions above require certain features to be enabled.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::float_cmp))]

mod api;
mod catalog;
mod diffusion;
mod error;
mod ordered;
mod single;
mod types;

pub use api::*;
pub use catalog::*;
pub use error::*;
pub use types::*;
