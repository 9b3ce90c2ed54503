//! Diagnostics data model returned alongside results and written by the demos.
//!
//! Timings are wall-clock milliseconds. Everything here serializes to JSON
//! with camelCase keys.
use serde::{Deserialize, Serialize};

/// Timing entry describing a single stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Aggregated timing trace for one run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    /// Record a stage and add it to the total.
    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.total_ms += elapsed_ms;
        self.stages.push(StageTiming::new(label, elapsed_ms));
    }
}

/// Per-orientation summary of a phase symmetry run.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrientationTrace {
    pub angle_deg: f64,
    /// Energy subtracted before clamping at zero.
    pub noise_threshold: f64,
    /// Largest clamped energy over the image.
    pub peak_energy: f64,
    /// Mean amplitude summed over scales.
    pub mean_amplitude: f64,
}

/// Intermediate statistics of a phase symmetry run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseSymmetryTrace {
    pub width: usize,
    pub height: usize,
    pub wavelengths: Vec<f64>,
    pub orientations: Vec<OrientationTrace>,
    pub timings: TimingBreakdown,
}

/// Summary of an evaluated source, written by the `generate_source` tool.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSummary {
    pub kind: String,
    pub size: Vec<usize>,
    pub spacing: Vec<f64>,
    pub origin: Vec<f64>,
    pub regions: usize,
    pub min: f32,
    pub max: f32,
    pub mean: f64,
    pub non_finite: usize,
    pub timings: TimingBreakdown,
}
