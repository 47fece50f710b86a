//! Headless inference: reads one patient record as JSON and prints the prediction.

use std::io::Read;
use std::path::PathBuf;

use ckd_predictor::config;
use ckd_predictor::features::FeatureRow;
use ckd_predictor::logging;
use ckd_predictor::predictor::Predictor;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init("ckd-predict") {
        eprintln!("Logging disabled: {err}");
    }
    let model_path = match options.model {
        Some(path) => path,
        None => {
            config::load_or_default()
                .map_err(|err| err.to_string())?
                .model_path
        }
    };
    let predictor = Predictor::load(&model_path).map_err(|err| err.to_string())?;
    let text = read_input(options.input.as_ref())?;
    let row = parse_patient(&text)?;
    let prediction = predictor.predict(&row);
    if options.json {
        let json = serde_json::to_string_pretty(&prediction).map_err(|err| err.to_string())?;
        println!("{json}");
    } else {
        println!("{}", prediction.message());
    }
    Ok(())
}

fn read_input(input: Option<&PathBuf>) -> Result<String, String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| format!("Failed to read stdin: {err}"))?;
            Ok(text)
        }
    }
}

/// Parse a patient record; missing fields take form defaults, values are clamped
/// into the ranges the form allows.
fn parse_patient(text: &str) -> Result<FeatureRow, String> {
    let row: FeatureRow =
        serde_json::from_str(text).map_err(|err| format!("Invalid patient record: {err}"))?;
    Ok(row.clamped())
}

#[derive(Debug, Default)]
struct CliOptions {
    input: Option<PathBuf>,
    model: Option<PathBuf>,
    json: bool,
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--json" => options.json = true,
            "--model" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--model requires a value".to_string())?;
                options.model = Some(PathBuf::from(value));
            }
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown argument: {flag}\n\n{}", help_text()));
            }
            path => {
                if options.input.is_some() {
                    return Err(format!("Unexpected extra input: {path}"));
                }
                options.input = Some(PathBuf::from(path));
            }
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "ckd-predict",
        "",
        "Predicts CKD for one patient record given as JSON.",
        "",
        "Usage:",
        "  ckd-predict [patient.json] [--model best_model.json.gz] [--json]",
        "",
        "Reads stdin when no file is given. Missing fields take the form defaults.",
        "",
        "Options:",
        "  --model <file>  Model artifact (default: model_path from config.toml).",
        "  --json          Print the prediction as JSON.",
    ]
    .join("\n")
}
