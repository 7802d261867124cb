use lattice_scale::config::peaks;
use lattice_scale::image::io::{load_grayscale_f32, write_json_file};
use lattice_scale::image::ClassField;
use lattice_scale::nms::suppress;
use std::env;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args()
        .nth(1)
        .ok_or_else(|| "Usage: peak_demo <config.json>".to_string())?;
    let config = peaks::load_config(Path::new(&config_path))?;

    let density = load_grayscale_f32(&config.input_path)?;
    let classes = if config.class_paths.is_empty() {
        None
    } else {
        let maps = config
            .class_paths
            .iter()
            .map(|p| load_grayscale_f32(p))
            .collect::<Result<Vec<_>, _>>()?;
        Some(ClassField::from_channels(&maps).map_err(|e| e.to_string())?)
    };

    let peaks = suppress(&density, &config.suppression, classes.as_ref())
        .map_err(|e| e.to_string())?;
    println!(
        "{} peaks in {}x{} density map",
        peaks.len(),
        density.w,
        density.h
    );
    for peak in peaks.iter().take(10) {
        println!("  ({:>4}, {:>4}) score={:.4}", peak.row, peak.col, peak.score);
    }

    if let Some(path) = &config.output.json_out {
        write_json_file(path, &peaks)?;
        println!("JSON written to {}", path.display());
    }
    Ok(())
}
