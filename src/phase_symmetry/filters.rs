//! Frequency-domain log-Gabor filter bank.
//!
//! Filters are built directly in the unshifted FFT layout (DC at index 0).
//! Each filter is the product of
//! - a radial log-Gabor term per scale, multiplied by a Butterworth lowpass
//!   that suppresses the spectrum corners, and
//! - an angular Gaussian per orientation, one-sided so that the inverse
//!   transform yields an even (real) / odd (imaginary) quadrature pair.
use super::params::PhaseSymmetryParams;
use crate::sources::butterworth_response;

/// Normalized frequencies along one axis, in FFT order.
///
/// Even lengths span `[-0.5, 0.5)` in steps of `1/n`; odd lengths span
/// `[-0.5, 0.5]` in steps of `1/(n-1)`.
pub(crate) fn frequency_axis(n: usize) -> Vec<f64> {
    let denom = (if n % 2 == 0 { n } else { n - 1 }).max(1) as f64;
    let half = n.saturating_sub(1) / 2;
    (0..n)
        .map(|i| {
            let k = if i <= half {
                i as f64
            } else {
                i as f64 - n as f64
            };
            k / denom
        })
        .collect()
}

/// Polar coordinates of every frequency sample.
pub(crate) struct FrequencyGrid {
    pub radius: Vec<f64>,
    pub sin_theta: Vec<f64>,
    pub cos_theta: Vec<f64>,
}

impl FrequencyGrid {
    pub fn new(width: usize, height: usize) -> Self {
        let fx = frequency_axis(width);
        let fy = frequency_axis(height);
        let len = width * height;
        let mut radius = Vec::with_capacity(len);
        let mut sin_theta = Vec::with_capacity(len);
        let mut cos_theta = Vec::with_capacity(len);
        for &v in &fy {
            for &u in &fx {
                radius.push((u * u + v * v).sqrt());
                // Image rows grow downward; flip v for counter-clockwise angles.
                let theta = (-v).atan2(u);
                sin_theta.push(theta.sin());
                cos_theta.push(theta.cos());
            }
        }
        Self {
            radius,
            sin_theta,
            cos_theta,
        }
    }
}

/// Radial log-Gabor × lowpass filter for every scale. DC is zero.
pub(crate) fn radial_filters(grid: &FrequencyGrid, params: &PhaseSymmetryParams) -> Vec<Vec<f64>> {
    let lowpass: Vec<f64> = grid
        .radius
        .iter()
        .map(|&r| butterworth_response(r, params.lowpass_cutoff, params.lowpass_order))
        .collect();
    let log_sigma_sq = 2.0 * params.sigma_on_f.ln().powi(2);

    (0..params.scales)
        .map(|scale| {
            let fo = 1.0 / params.wavelength(scale);
            grid.radius
                .iter()
                .zip(&lowpass)
                .map(|(&r, &lp)| {
                    if r == 0.0 {
                        0.0
                    } else {
                        (-(r / fo).ln().powi(2) / log_sigma_sq).exp() * lp
                    }
                })
                .collect()
        })
        .collect()
}

/// Angular Gaussian centred on `angle`, using the wrapped angular distance.
pub(crate) fn angular_spread(grid: &FrequencyGrid, angle: f64, theta_sigma: f64) -> Vec<f64> {
    let (sin_a, cos_a) = angle.sin_cos();
    let denom = 2.0 * theta_sigma * theta_sigma;
    grid.sin_theta
        .iter()
        .zip(&grid.cos_theta)
        .map(|(&s, &c)| {
            let ds = s * cos_a - c * sin_a;
            let dc = c * cos_a + s * sin_a;
            let dtheta = ds.atan2(dc).abs();
            (-dtheta * dtheta / denom).exp()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn frequency_axis_layout_matches_fft_order() {
        assert_eq!(frequency_axis(4), vec![0.0, 0.25, -0.5, -0.25]);
        assert_eq!(frequency_axis(5), vec![0.0, 0.25, 0.5, -0.5, -0.25]);
        assert_eq!(frequency_axis(1), vec![0.0]);
    }

    #[test]
    fn radial_filter_peaks_at_center_frequency() {
        let grid = FrequencyGrid::new(64, 1);
        let params = PhaseSymmetryParams {
            scales: 2,
            min_wavelength: 4.0,
            mult: 2.0,
            ..Default::default()
        };
        let filters = radial_filters(&grid, &params);
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0][0], 0.0);
        // u = 16/64 = 1/4 is the first scale's center; u = 8/64 the second's.
        let lp = butterworth_response(0.25, params.lowpass_cutoff, params.lowpass_order);
        assert_abs_diff_eq!(filters[0][16], lp, epsilon = 1e-12);
        let argmax = |f: &[f64]| {
            (1..32)
                .max_by(|&a, &b| f[a].partial_cmp(&f[b]).unwrap())
                .unwrap()
        };
        assert_eq!(argmax(&filters[0]), 16);
        assert_eq!(argmax(&filters[1]), 8);
    }

    #[test]
    fn angular_spread_is_one_sided() {
        let grid = FrequencyGrid::new(8, 8);
        let spread = angular_spread(&grid, 0.0, 0.4);
        // (u, v) = (+0.25, 0) at x = 2, (-0.25, 0) at x = 6.
        assert_abs_diff_eq!(spread[2], 1.0, epsilon = 1e-12);
        assert!(spread[6] < 1e-6);
        // Perpendicular directions get the same weight on both sides.
        let up = grid_index(8, 0, 2);
        let down = grid_index(8, 0, 6);
        assert_abs_diff_eq!(spread[up], spread[down], epsilon = 1e-12);
    }

    fn grid_index(width: usize, x: usize, y: usize) -> usize {
        y * width + x
    }
}
