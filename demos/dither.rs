#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice
)]

use std::path::PathBuf;

use bitdither::{
    Algorithm, DiffusionKernel, DitherOptions, Ditherer, ImageCodec, ThresholdMap,
};
use clap::Parser;

#[derive(Parser)]
pub struct Options {
    /// The algorithm to use, by name.
    #[arg(short, long, default_value_t = Algorithm::FloydSteinberg.name().to_owned())]
    algorithm: String,

    /// A custom threshold map, rows separated by `;` and values by `,`.
    #[arg(long, value_parser = parse_threshold_map)]
    threshold_map: Option<ThresholdMap>,

    /// A custom diffusion kernel, rows separated by `;` and values by `,`.
    #[arg(long, value_parser = parse_diffusion_kernel)]
    kernel: Option<DiffusionKernel>,

    /// Dither each colour channel instead of a greyscale version of the image.
    #[arg(long)]
    colour: bool,

    /// Keep the alpha channel.
    #[arg(long)]
    alpha: bool,

    #[arg(long, default_value_t = ImageCodec::DEFAULT_GAMMA)]
    gamma: f32,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(short, long, default_value_t = 0)]
    threads: u8,

    /// List the built-in algorithms and exit.
    #[arg(long)]
    list: bool,

    #[arg(long)]
    verbose: bool,

    #[arg(required_unless_present = "list")]
    input: Option<PathBuf>,

    #[arg(required_unless_present = "list")]
    output: Option<PathBuf>,
}

fn parse_rows<T: std::str::FromStr>(s: &str) -> Result<Vec<Vec<T>>, String>
where
    T::Err: std::fmt::Display,
{
    s.split(';')
        .map(|row| {
            row.split(',')
                .map(|value| value.trim().parse().map_err(|e| format!("`{value}`: {e}")))
                .collect()
        })
        .collect()
}

fn parse_threshold_map(s: &str) -> Result<ThresholdMap, String> {
    ThresholdMap::new(parse_rows(s)?).map_err(|e| format!("{e}"))
}

fn parse_diffusion_kernel(s: &str) -> Result<DiffusionKernel, String> {
    DiffusionKernel::new(parse_rows(s)?).map_err(|e| format!("{e}"))
}

fn main() {
    let Options {
        algorithm,
        threshold_map,
        kernel,
        colour,
        alpha,
        gamma,
        seed,
        threads,
        list,
        verbose,
        input,
        output,
    } = Options::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Warn })
        .init();

    if list {
        for algorithm in Algorithm::ALL {
            println!("{algorithm:<24}{}", algorithm.kind());
        }
        return;
    }

    macro_rules! log {
        ($name: literal, $val: expr) => {
            if verbose {
                let time = std::time::Instant::now();
                let value = $val;
                println!("{} took {}ms", $name, time.elapsed().as_millis());
                value
            } else {
                $val
            }
        };
    }

    let (Some(input), Some(output)) = (input, output) else {
        unreachable!("clap requires both paths unless listing");
    };

    let mut options = DitherOptions::new()
        .algorithm(algorithm)
        .preserve_colour(colour)
        .preserve_alpha(alpha);

    if let Some(map) = threshold_map {
        options = options.threshold_map(map);
    }
    if let Some(kernel) = kernel {
        options = options.diffusion_kernel(kernel);
    }
    if let Some(seed) = seed {
        options = options.seed(seed);
    }

    let codec = ImageCodec::with_gamma(gamma).expect("gamma is positive");
    let ditherer = Ditherer::new().with_codec(codec);

    let bytes = log!("read image", std::fs::read(input).unwrap());

    let result = log!(
        "dithering",
        match threads {
            0 => ditherer.dither_image_par(&bytes, &options),
            1 => ditherer.dither_image(&bytes, &options),
            t => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(t.into())
                    .build()
                    .unwrap();

                pool.install(|| ditherer.dither_image_par(&bytes, &options))
            }
        }
    );

    let png = match result {
        Ok(png) => png,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    log!("write image", std::fs::write(output, png).unwrap());
}
