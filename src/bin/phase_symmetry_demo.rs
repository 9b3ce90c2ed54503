use field_sources::config::load_config;
use field_sources::config::phase_symmetry::{InputConfig, PhaseSymmetryToolConfig};
use field_sources::image::io::{load_grayscale_f32, save_grayscale_f32, write_json_file, Intensity};
use field_sources::PhaseSymmetry;
use std::env;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config: PhaseSymmetryToolConfig = load_config(Path::new(&config_path))?;

    let image = match &config.input {
        InputConfig::Image(path) => load_grayscale_f32(path)?,
        InputConfig::Synthetic(pattern) => pattern.render(),
    };
    let operator = PhaseSymmetry::new(config.params.clone())
        .map_err(|e| format!("Invalid phase symmetry parameters: {e}"))?;
    let (symmetry, trace) = operator
        .compute_with_trace(&image)
        .map_err(|e| format!("Phase symmetry failed: {e}"))?;

    save_grayscale_f32(&symmetry, &config.output.symmetry_image, config.output.intensity)?;
    if let Some(path) = &config.output.input_image {
        save_grayscale_f32(&image, path, Intensity::Clamp)?;
    }
    write_json_file(&config.output.trace_json, &trace)?;

    let peak = symmetry.min_max().map_or(0.0, |(_, hi)| hi);
    println!(
        "Phase symmetry of {}x{} image: peak={peak:.3} ({:.3} ms)",
        image.w, image.h, trace.timings.total_ms
    );
    for o in &trace.orientations {
        println!(
            "  {:6.1} deg  threshold={:.3e}  peak energy={:.3e}",
            o.angle_deg, o.noise_threshold, o.peak_energy
        );
    }
    println!(
        "Saved symmetry map to {} and trace to {}",
        config.output.symmetry_image.display(),
        config.output.trace_json.display()
    );
    Ok(())
}

fn usage() -> String {
    "Usage: phase_symmetry_demo <config.json>".to_string()
}
