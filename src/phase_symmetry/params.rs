use crate::error::{ensure_positive, SourceError};
use serde::{Deserialize, Serialize};

/// Which symmetric features contribute energy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Polarity {
    /// Bright features on a dark background (`e − |o|`).
    Bright,
    /// Dark features on a bright background (`−e − |o|`).
    Dark,
    /// Either polarity (`|e| − |o|`).
    #[default]
    Both,
}

impl Polarity {
    #[inline]
    pub(crate) fn energy(self, even: f64, odd: f64) -> f64 {
        match self {
            Polarity::Bright => even - odd.abs(),
            Polarity::Dark => -even - odd.abs(),
            Polarity::Both => even.abs() - odd.abs(),
        }
    }
}

/// How the per-orientation noise threshold is obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoiseEstimate {
    /// Estimate from the median amplitude of the smallest-scale filter,
    /// assuming Rayleigh-distributed noise responses.
    #[default]
    Median,
    /// Subtract a fixed energy threshold.
    Fixed(f64),
}

/// How symmetry is combined across orientations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrientationAggregate {
    /// Strongest per-orientation ratio `E_o / (A_o + ε)`.
    #[default]
    Max,
    /// Summed energy over summed amplitude, `Σ E_o / (Σ A_o + ε)`.
    Sum,
}

/// Log-Gabor filter bank and noise handling for [`PhaseSymmetry`](super::PhaseSymmetry).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhaseSymmetryParams {
    pub scales: usize,
    pub orientations: usize,
    /// Wavelength of the smallest-scale filter in pixels.
    pub min_wavelength: f64,
    /// Wavelength ratio between successive scales.
    pub mult: f64,
    /// Ratio of the log-Gabor Gaussian's standard deviation to its center
    /// frequency. 0.75 ≈ 1 octave, 0.55 ≈ 2 octaves, 0.41 ≈ 3 octaves.
    pub sigma_on_f: f64,
    /// Orientation spacing divided by the angular Gaussian's sigma.
    pub d_theta_on_sigma: f64,
    /// Noise standard deviations to reject.
    pub k: f64,
    pub polarity: Polarity,
    pub noise: NoiseEstimate,
    pub aggregate: OrientationAggregate,
    /// Guards the division by the amplitude sum.
    pub epsilon: f64,
    /// Butterworth lowpass applied to every radial filter.
    pub lowpass_cutoff: f64,
    pub lowpass_order: f64,
}

impl Default for PhaseSymmetryParams {
    fn default() -> Self {
        Self {
            scales: 5,
            orientations: 6,
            min_wavelength: 3.0,
            mult: 2.1,
            sigma_on_f: 0.55,
            d_theta_on_sigma: 1.2,
            k: 2.0,
            polarity: Polarity::Both,
            noise: NoiseEstimate::Median,
            aggregate: OrientationAggregate::Max,
            epsilon: 1e-4,
            lowpass_cutoff: 0.4,
            lowpass_order: 10.0,
        }
    }
}

impl PhaseSymmetryParams {
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.scales == 0 {
            return Err(SourceError::invalid_parameter("scales", "must be > 0"));
        }
        if self.orientations == 0 {
            return Err(SourceError::invalid_parameter("orientations", "must be > 0"));
        }
        ensure_positive("min_wavelength", self.min_wavelength)?;
        if self.min_wavelength < 2.0 {
            return Err(SourceError::invalid_parameter(
                "min_wavelength",
                format!("{} is below the Nyquist wavelength of 2 pixels", self.min_wavelength),
            ));
        }
        ensure_positive("mult", self.mult)?;
        if self.mult <= 1.0 {
            return Err(SourceError::invalid_parameter("mult", "must be > 1"));
        }
        ensure_positive("sigma_on_f", self.sigma_on_f)?;
        if self.sigma_on_f >= 1.0 {
            return Err(SourceError::invalid_parameter("sigma_on_f", "must be < 1"));
        }
        ensure_positive("d_theta_on_sigma", self.d_theta_on_sigma)?;
        if !(self.k.is_finite() && self.k >= 0.0) {
            return Err(SourceError::invalid_parameter("k", "must be finite and >= 0"));
        }
        if let NoiseEstimate::Fixed(t) = self.noise {
            if !(t.is_finite() && t >= 0.0) {
                return Err(SourceError::invalid_parameter(
                    "noise",
                    "fixed threshold must be finite and >= 0",
                ));
            }
        }
        ensure_positive("epsilon", self.epsilon)?;
        ensure_positive("lowpass_cutoff", self.lowpass_cutoff)?;
        ensure_positive("lowpass_order", self.lowpass_order)
    }

    /// Center wavelength of `scale`, in pixels.
    pub fn wavelength(&self, scale: usize) -> f64 {
        self.min_wavelength * self.mult.powi(scale as i32)
    }

    /// Angular sigma of the orientation spread, in radians.
    pub fn theta_sigma(&self) -> f64 {
        std::f64::consts::PI / self.orientations as f64 / self.d_theta_on_sigma
    }
}
