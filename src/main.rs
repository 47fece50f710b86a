#![deny(missing_docs)]
#![deny(warnings)]

//! Entry point for the egui-based CKD prediction form.
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]
use ckd_predictor::config;
use ckd_predictor::egui_app::{EguiApp, MIN_VIEWPORT_SIZE};
use ckd_predictor::logging;
use ckd_predictor::predictor::Predictor;
use eframe::egui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init("ckd-predictor") {
        eprintln!("Logging disabled: {err}");
    }

    let predictor = load_predictor();

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size(egui::vec2(960.0, 720.0))
        .with_min_inner_size(MIN_VIEWPORT_SIZE);
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "CKD Predictor",
        native_options,
        Box::new(move |_cc| match predictor {
            Ok(predictor) => Ok(Box::new(EguiApp::new(predictor))),
            Err(message) => Ok(Box::new(LaunchError { message })),
        }),
    )?;
    Ok(())
}

/// Load settings and the model artifact, flattening failures into the text
/// shown on the launch error screen.
fn load_predictor() -> Result<Predictor, String> {
    let settings = config::load_or_default().map_err(|err| err.to_string())?;
    tracing::info!("Loading model from {}", settings.model_path.display());
    Predictor::load(&settings.model_path).map_err(|err| {
        tracing::error!("Model load failed: {err}");
        err.to_string()
    })
}

/// Minimal fallback app to display initialization errors.
struct LaunchError {
    message: String,
}

impl eframe::App for LaunchError {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Failed to load the prediction model");
                ui.label(&self.message);
                ui.add_space(8.0);
                ui.label("Train a model with ckd-train, then restart the application.");
            });
        });
    }
}
