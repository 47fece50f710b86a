//! Trains the CKD random forest from a CSV dataset and writes the model artifact.

use std::path::PathBuf;

use ckd_predictor::config::{self, AppSettings};
use ckd_predictor::logging;
use ckd_predictor::training::{TrainingConfig, TrainingReport, train_from_csv};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init("ckd-train") {
        eprintln!("Logging disabled: {err}");
    }
    let settings = config::load_or_default().map_err(|err| err.to_string())?;
    let config = options.apply(&settings);
    if !(config.test_fraction > 0.0 && config.test_fraction < 1.0) {
        return Err(format!(
            "--test-fraction must be between 0 and 1, got {}",
            config.test_fraction
        ));
    }
    let report = train_from_csv(&config).map_err(|err| err.to_string())?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &TrainingReport) {
    println!("model written to {}", report.model_path.display());
    println!(
        "train rows: {}  test rows: {}",
        report.train_rows, report.test_rows
    );
    println!("test accuracy: {:.4}", report.test_accuracy);
    for (idx, stats) in report.per_class.iter().enumerate() {
        println!(
            "class {} {:<8}  precision={:.3}  recall={:.3}  f1={:.3}  support={}",
            idx, report.classes[idx], stats.precision, stats.recall, stats.f1, stats.support
        );
    }
    println!("confusion matrix (rows=true, cols=pred):");
    for truth in 0..report.confusion.n_classes {
        let mut row = String::new();
        for pred in 0..report.confusion.n_classes {
            row.push_str(&format!("{:6}", report.confusion.get(truth, pred)));
        }
        println!("{row}");
    }
}

/// Flags given on the command line; anything unset comes from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq)]
struct CliOptions {
    dataset: Option<PathBuf>,
    model_out: Option<PathBuf>,
    target: Option<String>,
    trees: Option<usize>,
    max_depth: Option<usize>,
    test_fraction: Option<f32>,
    seed: Option<u64>,
}

impl CliOptions {
    fn apply(&self, settings: &AppSettings) -> TrainingConfig {
        let mut config = TrainingConfig::from(settings);
        if let Some(dataset) = &self.dataset {
            config.dataset_path = dataset.clone();
        }
        if let Some(out) = &self.model_out {
            config.model_out = out.clone();
        }
        if let Some(target) = &self.target {
            config.target_column = target.clone();
        }
        if let Some(trees) = self.trees {
            config.forest.n_trees = trees;
        }
        if let Some(depth) = self.max_depth {
            config.forest.max_depth = Some(depth);
        }
        if let Some(fraction) = self.test_fraction {
            config.test_fraction = fraction;
        }
        if let Some(seed) = self.seed {
            config.forest.seed = seed;
        }
        config
    }
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--dataset" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--dataset requires a value".to_string())?;
                options.dataset = Some(PathBuf::from(value));
            }
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                options.model_out = Some(PathBuf::from(value));
            }
            "--target" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--target requires a value".to_string())?;
                options.target = Some(value.clone());
            }
            "--trees" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--trees requires a value".to_string())?;
                let trees = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --trees value: {value}"))?;
                if trees == 0 {
                    return Err("--trees must be at least 1".to_string());
                }
                options.trees = Some(trees);
            }
            "--max-depth" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--max-depth requires a value".to_string())?;
                options.max_depth = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("Invalid --max-depth value: {value}"))?,
                );
            }
            "--test-fraction" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--test-fraction requires a value".to_string())?;
                options.test_fraction = Some(
                    value
                        .parse::<f32>()
                        .map_err(|_| format!("Invalid --test-fraction value: {value}"))?,
                );
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                options.seed = Some(
                    value
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid --seed value: {value}"))?,
                );
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }
    Ok(options)
}

fn help_text() -> String {
    [
        "ckd-train",
        "",
        "Trains a random forest CKD classifier from a CSV dataset.",
        "",
        "Usage:",
        "  ckd-train [--dataset ckd_dataset.csv] [--out best_model.json.gz] [options]",
        "",
        "Options:",
        "  --dataset <csv>         Dataset CSV (default: dataset_path from config.toml).",
        "  --out <file>            Output artifact path (default: model_path from config.toml).",
        "  --target <column>       Label column name (default: class).",
        "  --trees <n>             Number of trees (default: 100).",
        "  --max-depth <n>         Depth limit per tree (default: unlimited).",
        "  --test-fraction <f32>   Share of rows held out for evaluation (default: 0.2).",
        "  --seed <u64>            RNG seed for the split and the forest (default: 42).",
    ]
    .join("\n")
}
