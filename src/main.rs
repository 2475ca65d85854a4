use mammometry::config::{load_config, OutputFormat};
use mammometry::io::{load_detections, write_json_file};
use mammometry::measure::MeasurementKind;
use mammometry::{AnalysisResult, Analyzer};
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn usage() -> String {
    "Usage: mammometry <config.json>".to_string()
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let batch = load_detections(&config.input_path)?;
    let analyzer = Analyzer::new(config.params.clone());
    let result = analyzer
        .analyze(&batch, config.scale_override)
        .map_err(|e| format!("Could not process image: {e}"))?;

    let format = config.output.format;
    if format.includes_text() {
        print_text_summary(&result);
    }

    if format.includes_json() {
        if let Some(path) = &config.output.json_out {
            write_json_file(path, &result)?;
            println!("JSON report written to {}", path.display());
        } else {
            let json = serde_json::to_string_pretty(&result)
                .map_err(|e| format!("Failed to serialize JSON: {e}"))?;
            if format == OutputFormat::Both {
                println!("\nJSON report:\n{json}");
            } else {
                println!("{json}");
            }
        }
    }

    Ok(())
}

fn print_text_summary(result: &AnalysisResult) {
    println!("Analysis summary");
    println!(
        "  image: {}x{} detections={} landmarks={}",
        result.image.width,
        result.image.height,
        result.detections.len(),
        result.landmarks.len()
    );
    println!(
        "  scale: {:.5} cm/px ({:?})",
        result.scale.factor.cm_per_px(),
        result.scale.source
    );
    println!("\nMeasurements (cm)");
    for kind in MeasurementKind::ALL {
        let value = result.measurements.get(kind);
        if result.availability.is_available(kind) {
            println!("  {:<24} {:>6.1}", kind.key(), value);
        } else {
            println!("  {:<24} {:>6}", kind.key(), "-");
        }
    }
}
