#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::OnceLock,
};

use bitdither::PixelBuffer;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

pub const BENCH_DIR: &str = "img/bench";

pub fn load_images(images: &[PathBuf]) -> Vec<(String, PixelBuffer)> {
    images
        .iter()
        .map(|path| {
            image::open(path).map(|image| {
                (
                    path.file_name().unwrap().to_owned().into_string().unwrap(),
                    PixelBuffer::from(image),
                )
            })
        })
        .collect::<Result<_, _>>()
        .expect("loaded each image")
}

pub fn load_image_dir(dir: impl AsRef<Path>) -> Vec<(String, PixelBuffer)> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut paths = entries
        .collect::<Result<Vec<_>, _>>()
        .expect("read each file")
        .iter()
        .map(std::fs::DirEntry::path)
        .collect::<Vec<_>>();

    paths.sort();

    load_images(&paths)
}

pub fn load_image_dir_relative_to_root(dir: impl AsRef<Path>) -> Vec<(String, PixelBuffer)> {
    // assume current exe path is something like: target/build/deps/current_exe
    let exe = std::env::current_exe().unwrap();
    let root = exe
        .parent()
        .and_then(Path::parent)
        .and_then(Path::parent)
        .and_then(Path::parent)
        .unwrap();

    load_image_dir(root.join(dir.as_ref()))
}

/// A smooth diagonal ramp over each channel.
pub fn gradient(width: u32, height: u32, channels: u8) -> PixelBuffer {
    let data = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .flat_map(|(x, y)| {
            (0..channels).map(move |c| {
                ((u64::from(x) * 255 / u64::from(width.max(1))
                    + u64::from(y) * 255 / u64::from(height.max(1))
                    + u64::from(c) * 40)
                    / 2
                    % 256) as u8
            })
        })
        .collect();

    PixelBuffer::new(data, width, height, channels).unwrap()
}

/// Uniformly random samples from a fixed seed.
pub fn noise(width: u32, height: u32, channels: u8) -> PixelBuffer {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
    let len = width as usize * height as usize * usize::from(channels);
    let data = (0..len).map(|_| rng.gen()).collect();
    PixelBuffer::new(data, width, height, channels).unwrap()
}

pub fn generated_images() -> Vec<(String, PixelBuffer)> {
    vec![
        ("gradient-grey-1024".into(), gradient(1024, 1024, 1)),
        ("gradient-rgba-1024".into(), gradient(1024, 1024, 4)),
        ("noise-rgb-1920x1080".into(), noise(1920, 1080, 3)),
    ]
}

static BENCH_IMAGES: OnceLock<Vec<(String, PixelBuffer)>> = OnceLock::new();

/// The images in [`BENCH_DIR`] if there are any, otherwise generated ones.
pub fn benchmark_images() -> &'static [(String, PixelBuffer)] {
    BENCH_IMAGES.get_or_init(|| {
        let images = load_image_dir_relative_to_root(BENCH_DIR);
        if images.is_empty() {
            generated_images()
        } else {
            images
        }
    })
}
