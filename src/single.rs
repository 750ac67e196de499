//! Contains the single pixel processors: hard threshold and white noise.

use crate::{PixelBuffer, SinglePixel};
use rand::Rng;
#[cfg(feature = "threads")]
use rayon::prelude::*;

/// The midpoint used by the hard threshold.
const MIDPOINT: u8 = 128;

/// Sets the colour samples of a pixel to `0` or `255` around the midpoint.
#[inline]
fn threshold_pixel(pixel: &mut [u8], colour_channels: usize) {
    for sample in &mut pixel[..colour_channels] {
        *sample = if *sample < MIDPOINT { 0 } else { u8::MAX };
    }
}

/// Applies the hard threshold to every colour sample.
fn threshold(buffer: &mut PixelBuffer) {
    let channels = usize::from(buffer.channels());
    let colour_channels = usize::from(buffer.colour_channels());
    for pixel in buffer.as_raw_mut().chunks_exact_mut(channels) {
        threshold_pixel(pixel, colour_channels);
    }
}

/// Compares each pixel against one random threshold shared by all of its colour channels.
fn white_noise<R: Rng + ?Sized>(buffer: &mut PixelBuffer, rng: &mut R) {
    let channels = usize::from(buffer.channels());
    let colour_channels = usize::from(buffer.colour_channels());
    for pixel in buffer.as_raw_mut().chunks_exact_mut(channels) {
        let cutoff = rng.gen::<f32>();
        for sample in &mut pixel[..colour_channels] {
            *sample = if f32::from(*sample) / 255.0 < cutoff { 0 } else { u8::MAX };
        }
    }
}

impl SinglePixel {
    /// Applies this processor to the given buffer in place.
    ///
    /// `rng` is only used by [`SinglePixel::WhiteNoise`], which draws one value per pixel,
    /// so a seeded generator gives reproducible output.
    /// The alpha channel and any extra channels are left untouched.
    ///
    /// # Examples
    /// ```
    /// # use bitdither::{PixelBuffer, SinglePixel};
    /// # use rand::SeedableRng;
    /// # use rand_xoshiro::Xoroshiro128PlusPlus;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut rng = Xoroshiro128PlusPlus::seed_from_u64(7);
    /// let mut buffer = PixelBuffer::new(vec![0, 127, 128, 255], 2, 2, 1)?;
    /// SinglePixel::Threshold.dither(&mut buffer, &mut rng);
    /// assert_eq!(buffer.as_raw(), [0, 0, 255, 255]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn dither<R: Rng + ?Sized>(self, buffer: &mut PixelBuffer, rng: &mut R) {
        log::trace!(
            "{} processing of {}x{} image",
            match self {
                SinglePixel::Threshold => "threshold",
                SinglePixel::WhiteNoise => "white noise",
            },
            buffer.width(),
            buffer.height()
        );

        match self {
            SinglePixel::Threshold => threshold(buffer),
            SinglePixel::WhiteNoise => white_noise(buffer, rng),
        }
    }
}

#[cfg(feature = "threads")]
impl SinglePixel {
    /// Applies this processor to the given buffer in place, in parallel where possible.
    ///
    /// [`SinglePixel::Threshold`] runs in parallel.
    /// [`SinglePixel::WhiteNoise`] runs sequentially so that a seeded `rng`
    /// gives the same output as [`SinglePixel::dither`].
    pub fn dither_par<R: Rng + ?Sized>(self, buffer: &mut PixelBuffer, rng: &mut R) {
        match self {
            SinglePixel::Threshold => {
                let channels = usize::from(buffer.channels());
                let colour_channels = usize::from(buffer.colour_channels());
                buffer
                    .as_raw_mut()
                    .par_chunks_exact_mut(channels)
                    .for_each(|pixel| threshold_pixel(pixel, colour_channels));
            }
            SinglePixel::WhiteNoise => white_noise(buffer, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoroshiro128PlusPlus;

    fn rng() -> Xoroshiro128PlusPlus {
        Xoroshiro128PlusPlus::seed_from_u64(42)
    }

    #[test]
    fn threshold_splits_at_128() {
        let mut buffer = PixelBuffer::new((0..=255).collect(), 16, 16, 1).unwrap();
        SinglePixel::Threshold.dither(&mut buffer, &mut rng());

        let (low, high) = buffer.as_raw().split_at(128);
        assert!(low.iter().all(|&s| s == 0));
        assert!(high.iter().all(|&s| s == 255));
    }

    #[test]
    fn threshold_matches_one_by_one_map() {
        let data = (0..(9 * 5 * 4)).map(|i| (i * 53 % 256) as u8).collect::<Vec<_>>();
        let mut direct = PixelBuffer::new(data, 9, 5, 4).unwrap();
        let mut mapped = direct.clone();

        SinglePixel::Threshold.dither(&mut direct, &mut rng());
        crate::ThresholdMap::new(vec![vec![128]]).unwrap().dither(&mut mapped);
        assert_eq!(direct, mapped);
    }

    #[test]
    fn white_noise_is_reproducible_with_a_seed() {
        let data = (0..(31 * 7 * 3)).map(|i| (i * 11 % 256) as u8).collect::<Vec<_>>();
        let mut a = PixelBuffer::new(data, 31, 7, 3).unwrap();
        let mut b = a.clone();

        SinglePixel::WhiteNoise.dither(&mut a, &mut rng());
        SinglePixel::WhiteNoise.dither(&mut b, &mut rng());
        assert_eq!(a, b);
        assert!(a.as_raw().iter().all(|&s| s == 0 || s == 255));
    }

    #[test]
    fn white_noise_shares_one_value_per_pixel() {
        // with a shared threshold, a brighter channel is never darker than a dimmer one
        let pixels = [40, 120, 200, 77].repeat(500);
        let mut buffer = PixelBuffer::new(pixels, 50, 10, 4).unwrap();
        SinglePixel::WhiteNoise.dither(&mut buffer, &mut rng());

        for pixel in buffer.as_raw().chunks_exact(4) {
            assert!(pixel[0] <= pixel[1] && pixel[1] <= pixel[2], "{pixel:?}");
            assert_eq!(pixel[3], 77);
        }
    }

    #[test]
    fn white_noise_extremes_and_average() {
        let mut buffer = PixelBuffer::new(vec![255; 64], 8, 8, 1).unwrap();
        SinglePixel::WhiteNoise.dither(&mut buffer, &mut rng());
        assert!(buffer.as_raw().iter().all(|&s| s == 255));

        let mut buffer = PixelBuffer::new(vec![64; 100 * 100], 100, 100, 1).unwrap();
        SinglePixel::WhiteNoise.dither(&mut buffer, &mut rng());
        let white = buffer.as_raw().iter().filter(|&&s| s == 255).count();
        let fraction = white as f64 / 10_000.0;
        assert!((fraction - 64.0 / 255.0).abs() < 0.05, "white fraction was {fraction}");
    }

    #[test]
    #[cfg(feature = "threads")]
    fn parallel_matches_sequential() {
        let data = (0..(33 * 21 * 2)).map(|i| (i * 29 % 256) as u8).collect::<Vec<_>>();
        for processor in [SinglePixel::Threshold, SinglePixel::WhiteNoise] {
            let mut sequential = PixelBuffer::new(data.clone(), 33, 21, 2).unwrap();
            let mut parallel = sequential.clone();

            processor.dither(&mut sequential, &mut rng());
            processor.dither_par(&mut parallel, &mut rng());
            assert_eq!(sequential, parallel, "{processor:?}");
        }
    }
}
