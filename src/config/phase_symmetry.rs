//! Configuration of the `phase_symmetry_demo` tool.
use crate::image::io::Intensity;
use crate::image::ImageF32;
use crate::phase_symmetry::PhaseSymmetryParams;
use serde::Deserialize;
use std::f32::consts::TAU;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct PhaseSymmetryToolConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub params: PhaseSymmetryParams,
    pub output: PhaseSymmetryOutputConfig,
}

/// Either an image on disk or a generated test pattern.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputConfig {
    Image(PathBuf),
    Synthetic(SyntheticPattern),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyntheticPattern {
    pub width: usize,
    pub height: usize,
    /// Width in pixels of the bright bars.
    pub line_width: usize,
    /// Distance between bar centres in pixels.
    pub period: usize,
    /// Amplitude of a slanted background sinusoid.
    pub background: f32,
}

impl Default for SyntheticPattern {
    fn default() -> Self {
        Self {
            width: 128,
            height: 128,
            line_width: 3,
            period: 32,
            background: 0.1,
        }
    }
}

impl SyntheticPattern {
    /// Vertical bright bars over a faint slanted sinusoid, values in `[0, 1]`.
    pub fn render(&self) -> ImageF32 {
        let period = self.period.max(1);
        let center = (period / 2) as isize;
        let half = self.line_width / 2;
        ImageF32::from_fn(self.width, self.height, |x, y| {
            let from_center = ((x % period) as isize - center).unsigned_abs();
            let bar = if from_center <= half { 0.8 } else { 0.0 };
            let wave = 0.5 + 0.5 * (TAU * (x as f32 * 0.013 + y as f32 * 0.021)).sin();
            (bar + self.background * wave).min(1.0)
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PhaseSymmetryOutputConfig {
    pub symmetry_image: PathBuf,
    #[serde(default)]
    pub input_image: Option<PathBuf>,
    pub trace_json: PathBuf,
    #[serde(default)]
    pub intensity: Intensity,
}
