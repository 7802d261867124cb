use lattice_scale::config::scale;
use lattice_scale::image::io::{load_grayscale_f32, save_grayscale_f32, write_json_file};
use lattice_scale::image::ImageF32;
use lattice_scale::ScaleDetector;
use std::env;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn usage() -> String {
    "Usage: scale_demo <config.json>".to_string()
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = scale::load_config(Path::new(&config_path))?;

    let image = load_grayscale_f32(&config.input_path)?;
    let mut detector = ScaleDetector::new(config.params.clone()).map_err(|e| e.to_string())?;

    if let Some(path) = &config.output.spectrum_image {
        let spectrum = detector
            .matcher()
            .power_spectrum(&image)
            .map_err(|e| e.to_string())?;
        let log_spectrum = ImageF32 {
            data: spectrum.data.iter().map(|v| v.ln_1p()).collect(),
            ..spectrum
        };
        save_grayscale_f32(&log_spectrum, path)?;
        println!("Power spectrum written to {}", path.display());
    }

    let report = detector.detect_scale(&image).map_err(|e| e.to_string())?;
    println!("{}", report.summary());
    for stage in &report.timings.stages {
        println!("  {:<12} {:>8.2} ms", stage.label, stage.elapsed_ms);
    }

    if let Some(path) = &config.output.json_out {
        write_json_file(path, &report)?;
        println!("JSON report written to {}", path.display());
    }
    Ok(())
}
