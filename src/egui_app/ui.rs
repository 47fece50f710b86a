//! egui renderer for the prediction form.

use eframe::egui::{self, Frame, Margin, RichText, Stroke};

use super::controller::FormController;
use super::form::render_patient_fields;
use super::style;
use crate::predictor::{Diagnosis, Predictor};

/// Smallest window size that keeps the form readable.
pub const MIN_VIEWPORT_SIZE: egui::Vec2 = egui::vec2(720.0, 560.0);

/// Renders the patient form and the prediction result.
pub struct EguiApp {
    controller: FormController,
    visuals_set: bool,
}

impl EguiApp {
    pub fn new(predictor: Predictor) -> Self {
        Self {
            controller: FormController::new(predictor),
            visuals_set: false,
        }
    }

    fn apply_visuals(&mut self, ctx: &egui::Context) {
        if self.visuals_set {
            return;
        }
        let mut visuals = egui::Visuals::dark();
        style::apply_visuals(&mut visuals);
        ctx.set_visuals(visuals);
        self.visuals_set = true;
    }

    fn render_form_panel(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::SidePanel::left("patient_information")
            .resizable(false)
            .min_width(340.0)
            .show(ctx, |ui| {
                ui.add_space(8.0);
                ui.heading("Patient Information");
                ui.add_space(8.0);
                egui::ScrollArea::vertical().show(ui, |ui| {
                    if render_patient_fields(ui, &mut self.controller.form) {
                        self.controller.form_edited();
                    }
                    ui.add_space(8.0);
                    if ui
                        .button(RichText::new("Reset to defaults").color(palette.text_muted))
                        .clicked()
                    {
                        self.controller.reset();
                    }
                });
            });
    }

    fn render_main_panel(&mut self, ctx: &egui::Context) {
        let palette = style::palette();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(12.0);
            ui.heading("Chronic Kidney Disease Prediction");
            ui.label(
                RichText::new("Enter patient data to predict the likelihood of CKD.")
                    .color(palette.text_muted),
            );
            ui.add_space(16.0);
            let predict = egui::Button::new(RichText::new("Predict CKD").strong())
                .min_size(egui::vec2(140.0, 32.0));
            if ui.add(predict).clicked() {
                self.controller.submit();
            }
            ui.add_space(16.0);
            self.render_result(ui);
            ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                self.render_model_summary(ui);
            });
        });
    }

    fn render_result(&self, ui: &mut egui::Ui) {
        let Some(prediction) = self.controller.last_prediction() else {
            return;
        };
        let palette = style::palette();
        let (accent, fill) = match prediction.diagnosis {
            Diagnosis::CkdPresent => (palette.warning, palette.warning_fill),
            Diagnosis::CkdAbsent => (palette.success, palette.success_fill),
        };
        Frame::new()
            .fill(fill)
            .stroke(Stroke::new(1.0, accent))
            .inner_margin(Margin::same(12))
            .show(ui, |ui| {
                ui.set_min_width(ui.available_width());
                ui.label(RichText::new(prediction.headline()).color(accent).strong());
                ui.label(prediction.probability_line());
            });
    }

    fn render_model_summary(&self, ui: &mut egui::Ui) {
        let palette = style::palette();
        let training = &self.controller.predictor().artifact().training;
        ui.label(
            RichText::new(format!(
                "Model: {} trees, trained {} on {} ({} rows), held-out accuracy {:.3}",
                self.controller.predictor().artifact().forest.trees.len(),
                training.trained_at,
                training.dataset,
                training.train_rows + training.test_rows,
                training.test_accuracy
            ))
            .small()
            .color(palette.text_muted),
        );
    }
}

impl eframe::App for EguiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_visuals(ctx);
        if ctx.input(|i| i.key_pressed(egui::Key::Enter) && i.modifiers.command) {
            self.controller.submit();
        }
        self.render_form_panel(ctx);
        self.render_main_panel(ctx);
    }
}
