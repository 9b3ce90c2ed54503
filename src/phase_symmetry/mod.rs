//! Local phase symmetry of a 2-D image from a log-Gabor filter bank.
//!
//! Overview
//! - The input is transformed once with a 2-D FFT.
//! - Each orientation multiplies the spectrum by one radial filter per scale
//!   and its angular spread, then inverse-transforms. The real part of the
//!   result is the even-symmetric response, the imaginary part the odd one.
//! - Per orientation, symmetry energy (`|e| − |o|` or a one-polarity variant)
//!   and amplitude `|e + io|` are summed over scales. A noise threshold is
//!   subtracted from the energy and clamped at zero.
//! - Orientations are combined into a dimensionless map in `[0, 1]`.
//!
//! Orientations are independent; with the `parallel` feature they run on the
//! Rayon pool and are reduced after the join.
mod fft;
mod filters;
pub mod params;

pub use self::params::{NoiseEstimate, OrientationAggregate, Polarity, PhaseSymmetryParams};

use self::fft::Fft2d;
use self::filters::{angular_spread, radial_filters, FrequencyGrid};
use crate::diagnostics::{OrientationTrace, PhaseSymmetryTrace, TimingBreakdown};
use crate::error::SourceError;
use crate::image::{ImageF32, ImageView};
use log::debug;
use num_complex::Complex64;
use std::f64::consts::PI;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Phase symmetry operator with validated parameters.
#[derive(Clone, Debug, Default)]
pub struct PhaseSymmetry {
    params: PhaseSymmetryParams,
}

impl PhaseSymmetry {
    pub fn new(params: PhaseSymmetryParams) -> Result<Self, SourceError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &PhaseSymmetryParams {
        &self.params
    }

    /// Symmetry map of `image`, same size as the input.
    pub fn compute(&self, image: &ImageF32) -> Result<ImageF32, SourceError> {
        self.compute_with_trace(image).map(|(out, _)| out)
    }

    /// Like [`compute`](Self::compute), also returning per-orientation
    /// thresholds and stage timings.
    pub fn compute_with_trace(
        &self,
        image: &ImageF32,
    ) -> Result<(ImageF32, PhaseSymmetryTrace), SourceError> {
        self.params.validate()?;
        let (w, h) = (image.width(), image.height());
        if w == 0 || h == 0 {
            return Err(SourceError::invalid_parameter(
                "image",
                format!("empty {w}x{h} image"),
            ));
        }
        let mut timings = TimingBreakdown::default();

        let start = Instant::now();
        let mut spectrum = Vec::with_capacity(w * h);
        for (y, row) in image.rows().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                if !v.is_finite() {
                    return Err(SourceError::NonFiniteInput { x, y });
                }
                spectrum.push(Complex64::new(v as f64, 0.0));
            }
        }
        let fft = Fft2d::new(w, h);
        fft.forward(&mut spectrum);
        timings.push("forwardFft", elapsed_ms(start));

        let start = Instant::now();
        let grid = FrequencyGrid::new(w, h);
        let radial = radial_filters(&grid, &self.params);
        timings.push("filterBank", elapsed_ms(start));

        let start = Instant::now();
        let bank = FilterBank {
            fft: &fft,
            spectrum: &spectrum,
            grid: &grid,
            radial: &radial,
            params: &self.params,
        };
        let responses = run_orientations(&bank);
        timings.push("orientations", elapsed_ms(start));

        let start = Instant::now();
        let out = aggregate(w, h, &responses, &self.params);
        timings.push("aggregate", elapsed_ms(start));

        let orientations = responses
            .iter()
            .map(|r| {
                debug!(
                    "PhaseSymmetry orientation={:.1}deg threshold={:.3e}",
                    r.angle.to_degrees(),
                    r.threshold
                );
                OrientationTrace {
                    angle_deg: r.angle.to_degrees(),
                    noise_threshold: r.threshold,
                    peak_energy: r.energy.iter().copied().fold(0.0, f64::max),
                    mean_amplitude: r.amplitude.iter().sum::<f64>() / r.amplitude.len() as f64,
                }
            })
            .collect();
        debug!(
            "PhaseSymmetry::compute {}x{} scales={} orientations={} total_ms={:.3}",
            w, h, self.params.scales, self.params.orientations, timings.total_ms
        );
        let trace = PhaseSymmetryTrace {
            width: w,
            height: h,
            wavelengths: (0..self.params.scales)
                .map(|s| self.params.wavelength(s))
                .collect(),
            orientations,
            timings,
        };
        Ok((out, trace))
    }
}

/// Shared, read-only inputs of every orientation.
struct FilterBank<'a> {
    fft: &'a Fft2d,
    spectrum: &'a [Complex64],
    grid: &'a FrequencyGrid,
    radial: &'a [Vec<f64>],
    params: &'a PhaseSymmetryParams,
}

struct OrientationResponse {
    angle: f64,
    threshold: f64,
    /// Thresholded energy, summed over scales.
    energy: Vec<f64>,
    /// Amplitude summed over scales.
    amplitude: Vec<f64>,
}

impl FilterBank<'_> {
    fn orientation(&self, index: usize) -> OrientationResponse {
        let p = self.params;
        let angle = index as f64 * PI / p.orientations as f64;
        let spread = angular_spread(self.grid, angle, p.theta_sigma());
        let len = spread.len();

        let mut energy = vec![0.0; len];
        let mut amplitude = vec![0.0; len];
        let mut first_amplitude = Vec::new();
        let mut filtered = vec![Complex64::new(0.0, 0.0); len];
        for (scale, radial) in self.radial.iter().enumerate() {
            for (((f, &s), &r), &a) in filtered
                .iter_mut()
                .zip(self.spectrum)
                .zip(radial)
                .zip(&spread)
            {
                *f = s * (r * a);
            }
            self.fft.inverse(&mut filtered);
            for ((e, amp), v) in energy.iter_mut().zip(amplitude.iter_mut()).zip(&filtered) {
                *e += p.polarity.energy(v.re, v.im);
                *amp += v.norm();
            }
            if scale == 0 {
                first_amplitude = filtered.iter().map(|v| v.norm()).collect();
            }
        }

        let threshold = match p.noise {
            NoiseEstimate::Fixed(t) => t,
            NoiseEstimate::Median => median_threshold(first_amplitude, p),
        };
        for e in energy.iter_mut() {
            *e = (*e - threshold).max(0.0);
        }
        OrientationResponse {
            angle,
            threshold,
            energy,
            amplitude,
        }
    }
}

#[cfg(feature = "parallel")]
fn run_orientations(bank: &FilterBank<'_>) -> Vec<OrientationResponse> {
    (0..bank.params.orientations)
        .into_par_iter()
        .map(|o| bank.orientation(o))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn run_orientations(bank: &FilterBank<'_>) -> Vec<OrientationResponse> {
    (0..bank.params.orientations)
        .map(|o| bank.orientation(o))
        .collect()
}

/// Noise energy threshold from the smallest-scale amplitude, assuming the
/// noise response is Rayleigh distributed.
fn median_threshold(first_amplitude: Vec<f64>, params: &PhaseSymmetryParams) -> f64 {
    let tau = median(first_amplitude) / 4f64.ln().sqrt();
    let inv = 1.0 / params.mult;
    let total_tau = tau * (1.0 - inv.powi(params.scales as i32)) / (1.0 - inv);
    let mean = total_tau * (PI / 2.0).sqrt();
    let sigma = total_tau * ((4.0 - PI) / 2.0).sqrt();
    (mean + params.k * sigma) / 1.7
}

fn median(mut values: Vec<f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let (lower, upper, _) = values.select_nth_unstable_by(n / 2, f64::total_cmp);
    let upper = *upper;
    if n % 2 == 1 {
        upper
    } else {
        let below = lower.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        0.5 * (below + upper)
    }
}

fn aggregate(
    w: usize,
    h: usize,
    responses: &[OrientationResponse],
    params: &PhaseSymmetryParams,
) -> ImageF32 {
    let mut out = ImageF32::new(w, h);
    let eps = params.epsilon;
    for (i, px) in out.data.iter_mut().enumerate() {
        let value = match params.aggregate {
            OrientationAggregate::Max => responses
                .iter()
                .map(|r| r.energy[i] / (r.amplitude[i] + eps))
                .fold(0.0, f64::max),
            OrientationAggregate::Sum => {
                let (e, a) = responses
                    .iter()
                    .fold((0.0, 0.0), |(e, a), r| (e + r.energy[i], a + r.amplitude[i]));
                e / (a + eps)
            }
        };
        *px = value as f32;
    }
    out
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_odd_and_even_lengths() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(Vec::new()), 0.0);
    }

    #[test]
    fn median_threshold_scales_linearly() {
        let params = PhaseSymmetryParams::default();
        let a = median_threshold(vec![0.1, 0.2, 0.3], &params);
        let b = median_threshold(vec![0.3, 0.6, 0.9], &params);
        assert!(a > 0.0);
        assert!((b - 3.0 * a).abs() < 1e-12);
    }

    #[test]
    fn invalid_params_are_rejected_up_front() {
        let params = PhaseSymmetryParams {
            orientations: 0,
            ..Default::default()
        };
        assert!(matches!(
            PhaseSymmetry::new(params),
            Err(SourceError::InvalidParameter { name: "orientations", .. })
        ));
    }

    #[test]
    fn empty_and_non_finite_inputs_fail() {
        let ps = PhaseSymmetry::default();
        assert!(matches!(
            ps.compute(&ImageF32::new(0, 4)),
            Err(SourceError::InvalidParameter { name: "image", .. })
        ));
        let mut img = ImageF32::new(8, 8);
        img.set(5, 2, f32::NAN);
        assert_eq!(
            ps.compute(&img).unwrap_err(),
            SourceError::NonFiniteInput { x: 5, y: 2 }
        );
    }

    #[test]
    fn trace_lists_every_orientation() {
        let ps = PhaseSymmetry::new(PhaseSymmetryParams {
            scales: 3,
            orientations: 4,
            ..Default::default()
        })
        .unwrap();
        let img = ImageF32::from_fn(16, 12, |x, y| ((x * 7 + y * 3) % 5) as f32);
        let (out, trace) = ps.compute_with_trace(&img).unwrap();
        assert_eq!((out.w, out.h), (16, 12));
        assert_eq!(trace.orientations.len(), 4);
        assert_eq!(trace.wavelengths.len(), 3);
        assert_eq!(trace.orientations[2].angle_deg.round(), 90.0);
        assert!(out.data.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
