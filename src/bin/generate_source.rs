use field_sources::buffer::SampleBuffer;
use field_sources::config::load_config;
use field_sources::config::source::{SourceConfig, SourceToolConfig};
use field_sources::diagnostics::{SourceSummary, TimingBreakdown};
use field_sources::image::io::{save_grayscale_f32, write_json_file};
use field_sources::sources::{ButterworthSource, SinusoidSource};
use field_sources::{RegionEvaluator, SourceError};
use std::env;
use std::path::Path;
use std::time::Instant;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config: SourceToolConfig = load_config(Path::new(&config_path))?;
    let evaluator = config
        .workers
        .map(RegionEvaluator::new)
        .unwrap_or_default();

    let dimension = config.grid.dimension();
    let summary = match dimension {
        1 => generate::<1>(&config, &evaluator)?.1,
        2 => {
            let (buffer, summary) = generate::<2>(&config, &evaluator)?;
            if let Some(path) = &config.output.image {
                save_grayscale_f32(&buffer.to_image(), path, config.output.intensity)?;
                println!("Saved {} image to {}", summary.kind, path.display());
            }
            summary
        }
        3 => generate::<3>(&config, &evaluator)?.1,
        d => return Err(format!("Unsupported grid dimension {d}; expected 1, 2 or 3")),
    };
    if dimension != 2 && config.output.image.is_some() {
        println!("Skipping image output for a {dimension}-D grid");
    }

    write_json_file(&config.output.summary_json, &summary)?;
    println!(
        "Evaluated {} over {:?} in {} regions ({:.3} ms); summary at {}",
        summary.kind,
        summary.size,
        summary.regions,
        summary.timings.total_ms,
        config.output.summary_json.display()
    );
    if summary.non_finite > 0 {
        println!("Warning: {} samples are not finite", summary.non_finite);
    }
    Ok(())
}

fn generate<const D: usize>(
    config: &SourceToolConfig,
    evaluator: &RegionEvaluator,
) -> Result<(SampleBuffer<D>, SourceSummary), String> {
    let grid = config.grid.to_grid::<D>().map_err(describe)?;
    let regions = evaluator.split(&grid).len();

    let start = Instant::now();
    let buffer = match &config.source {
        SourceConfig::Butterworth(params) => {
            let source = ButterworthSource::with_params(grid, *params).map_err(describe)?;
            evaluator.evaluate(&source)
        }
        SourceConfig::Sinusoid(sinusoid) => {
            let params = sinusoid.to_params::<D>().map_err(describe)?;
            let source = SinusoidSource::with_params(grid, params).map_err(describe)?;
            evaluator.evaluate(&source)
        }
    }
    .map_err(describe)?;
    let mut timings = TimingBreakdown::default();
    timings.push("evaluate", start.elapsed().as_secs_f64() * 1000.0);

    let (min, max) = buffer.min_max().unwrap_or((f32::NAN, f32::NAN));
    let finite: Vec<f64> = buffer
        .as_slice()
        .iter()
        .filter(|v| v.is_finite())
        .map(|&v| v as f64)
        .collect();
    let mean = if finite.is_empty() {
        f64::NAN
    } else {
        finite.iter().sum::<f64>() / finite.len() as f64
    };
    let grid = buffer.grid();
    let summary = SourceSummary {
        kind: config.source.name().to_string(),
        size: grid.size().to_vec(),
        spacing: grid.spacing().to_vec(),
        origin: grid.origin().to_vec(),
        regions,
        min,
        max,
        mean,
        non_finite: buffer.non_finite_count(),
        timings,
    };
    Ok((buffer, summary))
}

fn describe(err: SourceError) -> String {
    format!("Invalid source configuration: {err}")
}

fn usage() -> String {
    "Usage: generate_source <config.json>".to_string()
}
