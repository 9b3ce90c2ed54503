//! 2-D FFT over a row-major complex buffer, built from 1-D `rustfft` plans.
//!
//! Rows are transformed in place as one batch; columns are transposed into a
//! scratch buffer, transformed as a batch and transposed back. The inverse is
//! normalized by `1 / (w·h)` so that `inverse(forward(x)) == x`.
//!
//! Plans are shared (`Arc<dyn Fft>`) and all scratch is allocated per call, so
//! one `Fft2d` can serve several threads at once.
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

pub struct Fft2d {
    width: usize,
    height: usize,
    row_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    col_forward: Arc<dyn Fft<f64>>,
    col_inverse: Arc<dyn Fft<f64>>,
}

impl Fft2d {
    pub fn new(width: usize, height: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            width,
            height,
            row_forward: planner.plan_fft_forward(width),
            row_inverse: planner.plan_fft_inverse(width),
            col_forward: planner.plan_fft_forward(height),
            col_inverse: planner.plan_fft_inverse(height),
        }
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn forward(&self, data: &mut [Complex64]) {
        self.transform(data, self.row_forward.as_ref(), self.col_forward.as_ref());
    }

    pub fn inverse(&self, data: &mut [Complex64]) {
        self.transform(data, self.row_inverse.as_ref(), self.col_inverse.as_ref());
        let scale = 1.0 / self.len() as f64;
        for v in data.iter_mut() {
            *v *= scale;
        }
    }

    fn transform(&self, data: &mut [Complex64], rows: &dyn Fft<f64>, cols: &dyn Fft<f64>) {
        assert_eq!(data.len(), self.len(), "buffer does not match FFT size");
        if self.is_empty() {
            return;
        }
        let (w, h) = (self.width, self.height);
        let zero = Complex64::new(0.0, 0.0);

        let mut scratch = vec![zero; rows.get_inplace_scratch_len()];
        rows.process_with_scratch(data, &mut scratch);

        let mut transposed = vec![zero; w * h];
        for y in 0..h {
            for x in 0..w {
                transposed[x * h + y] = data[y * w + x];
            }
        }
        scratch.resize(cols.get_inplace_scratch_len(), zero);
        cols.process_with_scratch(&mut transposed, &mut scratch);
        for x in 0..w {
            for y in 0..h {
                data[y * w + x] = transposed[x * h + y];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn inverse_undoes_forward() {
        let (w, h) = (6, 5);
        let original: Vec<Complex64> = (0..w * h)
            .map(|i| Complex64::new((i as f64 * 0.37).sin(), (i % 3) as f64))
            .collect();
        let fft = Fft2d::new(w, h);
        let mut data = original.clone();
        fft.forward(&mut data);
        fft.inverse(&mut data);
        for (a, b) in data.iter().zip(&original) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-12);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn impulse_has_flat_spectrum_and_constant_has_only_dc() {
        let (w, h) = (4, 8);
        let fft = Fft2d::new(w, h);

        let mut impulse = vec![Complex64::new(0.0, 0.0); w * h];
        impulse[0] = Complex64::new(1.0, 0.0);
        fft.forward(&mut impulse);
        for v in &impulse {
            assert_abs_diff_eq!(v.re, 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(v.im, 0.0, epsilon = 1e-12);
        }

        let mut constant = vec![Complex64::new(2.0, 0.0); w * h];
        fft.forward(&mut constant);
        assert_abs_diff_eq!(constant[0].re, 2.0 * (w * h) as f64, epsilon = 1e-9);
        for v in &constant[1..] {
            assert_abs_diff_eq!(v.norm(), 0.0, epsilon = 1e-9);
        }
    }
}
