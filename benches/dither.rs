#[path = "../util/util.rs"]
mod util;

use util::benchmark_images;

use std::time::Duration;

use bitdither::{Algorithm, DitherOptions, Ditherer, PixelBuffer};
use criterion::{
    criterion_group, criterion_main, measurement::WallTime, Bencher, BenchmarkId, Criterion,
    SamplingMode,
};

const ALGORITHMS: [Algorithm; 6] = [
    Algorithm::Threshold,
    Algorithm::WhiteNoise,
    Algorithm::Bayer8,
    Algorithm::FloydSteinberg,
    Algorithm::JarvisJudiceNinke,
    Algorithm::Atkinson,
];

fn bench(
    c: &mut Criterion,
    group: &str,
    images: &[(String, PixelBuffer)],
    mut f: impl FnMut(&mut Bencher<WallTime>, &(DitherOptions, &PixelBuffer)),
) {
    let mut group = c.benchmark_group(group);
    group
        .sample_size(30)
        .noise_threshold(0.05)
        .sampling_mode(SamplingMode::Flat)
        .warm_up_time(Duration::from_secs(2));

    for algorithm in ALGORITHMS {
        let options = DitherOptions::from(algorithm)
            .preserve_colour(true)
            .preserve_alpha(true)
            .seed(0);

        for (path, image) in images {
            group.bench_with_input(
                BenchmarkId::new(algorithm.name(), path),
                &(options.clone(), image),
                &mut f,
            );
        }
    }
}

fn dither_single(c: &mut Criterion) {
    let ditherer = Ditherer::new();
    bench(c, "dither_single", benchmark_images(), |b, (options, image)| {
        b.iter(|| ditherer.dither((*image).clone(), options).unwrap());
    });
}

fn dither_par(c: &mut Criterion) {
    let ditherer = Ditherer::new();
    bench(c, "dither_par", benchmark_images(), |b, (options, image)| {
        b.iter(|| ditherer.dither_par((*image).clone(), options).unwrap());
    });
}

criterion_group!(benches, dither_single, dither_par);
criterion_main!(benches);
