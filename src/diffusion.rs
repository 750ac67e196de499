//! Contains the error diffusion dither implementation.

use crate::{DiffusionKernel, PixelBuffer};

/// Loads a row of samples into a row of working values.
#[inline]
fn load_row(dst: &mut [f32], src: &[u8]) {
    for (d, &s) in dst.iter_mut().zip(src) {
        *d = f32::from(s);
    }
}

/// Holds the working values for the rows that can still receive error.
///
/// A kernel with `n` rows can only push error up to `n - 1` rows down,
/// so the window keeps `n` rows in a ring and reloads a slot once its row is finished.
struct RowWindow {
    /// The working values, `rows` rows of `row_len` samples each.
    values: Vec<f32>,
    /// The number of samples in a row of pixels.
    row_len: usize,
    /// The number of rows in the ring.
    rows: usize,
}

impl RowWindow {
    /// Creates a window holding the first `rows` rows of `data`.
    fn new(data: &[u8], row_len: usize, rows: usize) -> Self {
        let mut values = vec![0.0; rows * row_len];
        for (dst, src) in values.chunks_exact_mut(row_len).zip(data.chunks_exact(row_len)) {
            load_row(dst, src);
        }
        Self { values, row_len, rows }
    }

    /// The offset of the ring slot for image row `y`.
    #[inline]
    fn slot(&self, y: usize) -> usize {
        (y % self.rows) * self.row_len
    }

    /// Gets the working value of sample `i` in image row `y`.
    #[inline]
    fn get(&self, y: usize, i: usize) -> f32 {
        self.values[self.slot(y) + i]
    }

    /// Adds `amount` to sample `i` in image row `y`, clamping the result to `0.0..=255.0`.
    #[inline]
    fn add(&mut self, y: usize, i: usize, amount: f32) {
        let slot = self.slot(y);
        let value = &mut self.values[slot + i];
        *value = (*value + amount).clamp(0.0, 255.0);
    }

    /// Recycles the slot of the finished row `y` for row `y + rows`.
    fn advance(&mut self, data: &[u8], y: usize) {
        let start = self.slot(y);
        let dst = &mut self.values[start..(start + self.row_len)];
        match data.chunks_exact(self.row_len).nth(y + self.rows) {
            Some(src) => load_row(dst, src),
            None => dst.fill(0.0),
        }
    }
}

impl DiffusionKernel {
    /// Performs error diffusion dithering on the given buffer in place.
    ///
    /// Colour samples are visited in buffer order (left to right, top to bottom,
    /// then by channel within a pixel). Each one is quantized to `0` or `255` at a
    /// midpoint of `128`, and the difference is spread over the not yet visited
    /// samples of the same channel according to the kernel weights.
    /// Error aimed outside the image is dropped.
    /// The alpha channel and any extra channels are left untouched.
    ///
    /// # Examples
    /// ```
    /// # use bitdither::{PixelBuffer, DiffusionKernel};
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut buffer = PixelBuffer::new(vec![127; 4], 2, 2, 1)?;
    /// DiffusionKernel::new(vec![vec![0.0, 0.5], vec![0.5, 0.0]])?.dither(&mut buffer);
    /// assert_eq!(buffer.as_raw(), [0, 255, 255, 0]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn dither(&self, buffer: &mut PixelBuffer) {
        let row_len = buffer.row_len();
        if row_len == 0 {
            return;
        }

        let (width, height) = buffer.dimensions();
        let (width, height) = (width as usize, height as usize);
        let channels = usize::from(buffer.channels());
        let colour_channels = usize::from(buffer.colour_channels());

        log::trace!(
            "error diffusion of {width}x{height} image with {}x{} kernel",
            self.dimensions().0,
            self.dimensions().1,
        );

        let taps = self.taps();
        let data = buffer.as_raw_mut();
        let mut window = RowWindow::new(data, row_len, self.dimensions().1);

        for y in 0..height {
            for x in 0..width {
                for c in 0..colour_channels {
                    let i = x * channels + c;
                    let value = window.get(y, i);
                    let quantized = if value >= 128.0 { u8::MAX } else { 0 };
                    data[y * row_len + i] = quantized;

                    let error = value - f32::from(quantized);
                    if error == 0.0 {
                        continue;
                    }

                    for &(dx, dy, weight) in &taps {
                        let ny = y + dy;
                        let Some(nx) = x.checked_add_signed(dx) else {
                            continue;
                        };
                        if nx < width && ny < height {
                            window.add(ny, nx * channels + c, error * weight);
                        }
                    }
                }
            }

            window.advance(data, y);
        }
    }
}
