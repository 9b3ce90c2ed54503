use field_sources::prelude::*;

fn main() {
    // Demo stub: evaluates a 2-D Butterworth source and runs phase symmetry on it
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), SourceError> {
    let mut source = ButterworthSource::<2>::new();
    source.set_cutoff(0.25)?;
    source.set_order(2.0)?;
    let buffer = RegionEvaluator::default().evaluate(&source)?;
    let [w, h] = buffer.size();
    println!(
        "butterworth {w}x{h} center={:.3} corner={:.3}",
        buffer.get([w / 2, h / 2]),
        buffer.get([0, 0])
    );

    let symmetry = PhaseSymmetry::default().compute(&buffer.to_image())?;
    let peak = symmetry.min_max().map_or(0.0, |(_, hi)| hi);
    println!("phase symmetry peak={peak:.3}");
    Ok(())
}
