//! Contains the ordered (threshold map) dither implementation.

use crate::{PixelBuffer, ThresholdMap};
#[cfg(feature = "threads")]
use rayon::prelude::*;

/// Quantizes the colour channels of one row of pixels against the matching row of the map.
#[inline]
fn dither_row(thresholds: &[u8], row: &mut [u8], channels: usize, colour_channels: usize) {
    for (pixel, &threshold) in row.chunks_exact_mut(channels).zip(thresholds.iter().cycle()) {
        for sample in &mut pixel[..colour_channels] {
            *sample = if *sample >= threshold { u8::MAX } else { 0 };
        }
    }
}

impl ThresholdMap {
    /// Performs ordered dithering on the given buffer in place.
    ///
    /// Each colour sample is set to `255` if it is at least the threshold
    /// for its pixel's position and to `0` otherwise.
    /// The alpha channel and any extra channels are left untouched.
    ///
    /// # Examples
    /// ```
    /// # use bitdither::{PixelBuffer, ThresholdMap};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut buffer = PixelBuffer::new(vec![127; 4], 2, 2, 1)?;
    /// ThresholdMap::new(vec![vec![64, 184]])?.dither(&mut buffer);
    /// assert_eq!(buffer.as_raw(), [255, 0, 255, 0]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn dither(&self, buffer: &mut PixelBuffer) {
        let row_len = buffer.row_len();
        if row_len == 0 {
            return;
        }

        log::trace!(
            "ordered dither of {}x{} image with {}x{} map",
            buffer.width(),
            buffer.height(),
            self.dimensions().0,
            self.dimensions().1,
        );

        let channels = usize::from(buffer.channels());
        let colour_channels = usize::from(buffer.colour_channels());

        for (y, row) in buffer.as_raw_mut().chunks_exact_mut(row_len).enumerate() {
            dither_row(self.row(y), row, channels, colour_channels);
        }
    }
}

#[cfg(feature = "threads")]
impl ThresholdMap {
    /// Performs ordered dithering on the given buffer in place, in parallel.
    ///
    /// The output is identical to [`ThresholdMap::dither`],
    /// since each pixel only depends on its own value and position.
    pub fn dither_par(&self, buffer: &mut PixelBuffer) {
        let row_len = buffer.row_len();
        if row_len == 0 {
            return;
        }

        let channels = usize::from(buffer.channels());
        let colour_channels = usize::from(buffer.colour_channels());

        buffer
            .as_raw_mut()
            .par_chunks_exact_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| dither_row(self.row(y), row, channels, colour_channels));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Algorithm, AlgorithmSpec};

    fn buffer(data: Vec<u8>, channels: u8) -> PixelBuffer {
        PixelBuffer::new(data, 2, 2, channels).unwrap()
    }

    fn map(rows: Vec<Vec<u8>>) -> ThresholdMap {
        ThresholdMap::new(rows).unwrap()
    }

    fn bayer_2() -> ThresholdMap {
        match Algorithm::Bayer2.spec() {
            AlgorithmSpec::ThresholdMap(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn single_row_map() {
        let mut pixels = buffer(vec![127, 127, 127, 127], 1);
        map(vec![vec![64, 184]]).dither(&mut pixels);
        assert_eq!(pixels.as_raw(), [255, 0, 255, 0]);
    }

    #[test]
    fn multi_row_map() {
        let mut pixels = buffer(vec![60, 120, 180, 240], 1);
        map(vec![vec![64, 184], vec![92, 255]]).dither(&mut pixels);
        assert_eq!(pixels.as_raw(), [0, 0, 255, 0]);
    }

    #[test]
    fn builtin_bayer_2() {
        let mut pixels = buffer(vec![127; 4], 1);
        bayer_2().dither(&mut pixels);
        assert_eq!(pixels.as_raw(), [255, 0, 0, 255]);
    }

    #[test]
    fn colour_image() {
        // red channel only
        let mut pixels = buffer(vec![60, 0, 0, 120, 0, 0, 180, 0, 0, 240, 0, 0], 3);
        map(vec![vec![64, 184], vec![92, 255]]).dither(&mut pixels);
        assert_eq!(pixels.as_raw(), [0, 0, 0, 0, 0, 0, 255, 0, 0, 0, 0, 0]);

        // green channel only
        let mut pixels = buffer(vec![0, 127, 0, 0, 127, 0, 0, 127, 0, 0, 127, 0], 3);
        bayer_2().dither(&mut pixels);
        assert_eq!(pixels.as_raw(), [255, 255, 255, 0, 0, 0, 0, 0, 0, 0, 255, 0]);
    }

    #[test]
    fn alpha_is_untouched() {
        let mut pixels = buffer([0, 127, 0, 200].repeat(4), 4);
        bayer_2().dither(&mut pixels);
        assert_eq!(
            pixels.as_raw(),
            [255, 255, 255, 200, 0, 0, 0, 200, 0, 0, 0, 200, 0, 255, 0, 200]
        );

        let mut pixels = buffer(vec![127, 13, 127, 13, 127, 13, 127, 13], 2);
        bayer_2().dither(&mut pixels);
        assert_eq!(pixels.as_raw(), [255, 13, 0, 13, 0, 13, 255, 13]);
    }

    #[test]
    fn map_tiles_over_larger_images() {
        let map = map(vec![vec![10, 20, 30], vec![40, 50, 60]]);
        let (width, height) = (7, 5);
        let data = (0..(width * height)).map(|i| (i * 7 % 64) as u8).collect::<Vec<_>>();

        let mut pixels = PixelBuffer::new(data.clone(), width, height, 1).unwrap();
        map.dither(&mut pixels);

        for (i, (&before, &after)) in data.iter().zip(pixels.as_raw()).enumerate() {
            let (x, y) = (i % width as usize, i / width as usize);
            let expected = if before >= map.threshold(x, y) { 255 } else { 0 };
            assert_eq!(after, expected, "pixel ({x}, {y})");
        }
    }

    #[test]
    fn empty_inputs() {
        let map = map(vec![vec![128]]);
        for (width, height) in [(0, 0), (0, 3), (3, 0)] {
            let mut pixels = PixelBuffer::new(Vec::new(), width, height, 3).unwrap();
            map.dither(&mut pixels);
            assert!(pixels.as_raw().is_empty());

            #[cfg(feature = "threads")]
            map.dither_par(&mut pixels);
        }
    }

    #[test]
    #[cfg(feature = "threads")]
    fn parallel_matches_sequential() {
        let map = match Algorithm::Bayer8.spec() {
            AlgorithmSpec::ThresholdMap(map) => map,
            _ => unreachable!(),
        };

        let (width, height) = (37, 29);
        let data = (0..(width * height * 4)).map(|i| (i * 31 % 256) as u8).collect::<Vec<_>>();
        let mut sequential = PixelBuffer::new(data, width, height, 4).unwrap();
        let mut parallel = sequential.clone();

        map.dither(&mut sequential);
        map.dither_par(&mut parallel);
        assert_eq!(sequential, parallel);
    }
}
