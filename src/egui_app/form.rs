//! Patient form widgets: one bounded input per feature column.

use eframe::egui::{self, Ui};

use crate::features::{Feature, FeatureKind, FeatureRow, NominalLevel, NominalMut, NumericRange};

/// Render every feature field. Returns `true` if any value changed.
pub(super) fn render_patient_fields(ui: &mut Ui, row: &mut FeatureRow) -> bool {
    let mut changed = false;
    egui::Grid::new("patient_fields")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .striped(true)
        .show(ui, |ui| {
            for feature in Feature::ALL {
                ui.label(feature.label());
                changed |= render_field(ui, feature, row);
                ui.end_row();
            }
        });
    changed
}

fn render_field(ui: &mut Ui, feature: Feature, row: &mut FeatureRow) -> bool {
    match feature.kind() {
        FeatureKind::Numeric(range) => row
            .number_mut(feature)
            .is_some_and(|value| numeric_input(ui, value, range)),
        FeatureKind::Ordinal(levels) => row
            .number_mut(feature)
            .is_some_and(|value| ordinal_combo(ui, feature, value, levels)),
        FeatureKind::Nominal(_) => match row.nominal_mut(feature) {
            Some(NominalMut::Gender(level)) => level_combo(ui, feature, level),
            Some(NominalMut::YesNo(level)) => level_combo(ui, feature, level),
            Some(NominalMut::PusCell(level)) => level_combo(ui, feature, level),
            Some(NominalMut::Presence(level)) => level_combo(ui, feature, level),
            Some(NominalMut::Appetite(level)) => level_combo(ui, feature, level),
            None => false,
        },
    }
}

fn numeric_input(ui: &mut Ui, value: &mut f32, range: NumericRange) -> bool {
    let decimals = if range.step < 1.0 { 1 } else { 0 };
    let drag = egui::DragValue::new(value)
        .range(range.min..=range.max)
        .speed(range.step)
        .fixed_decimals(decimals);
    ui.add(drag)
        .on_hover_text(format!("{} to {}", range.min, range.max))
        .changed()
}

fn ordinal_combo(
    ui: &mut Ui,
    feature: Feature,
    value: &mut f32,
    levels: &'static [(&'static str, f32)],
) -> bool {
    let before = *value;
    let current = levels
        .iter()
        .find(|(_, level)| *level == *value)
        .map(|(label, _)| *label)
        .unwrap_or("?");
    egui::ComboBox::from_id_salt(feature.column_name())
        .width(120.0)
        .selected_text(current)
        .show_ui(ui, |ui| {
            for &(label, level) in levels {
                ui.selectable_value(value, level, label);
            }
        });
    *value != before
}

fn level_combo<L: NominalLevel>(ui: &mut Ui, feature: Feature, current: &mut L) -> bool {
    let before = *current;
    egui::ComboBox::from_id_salt(feature.column_name())
        .width(120.0)
        .selected_text(current.label())
        .show_ui(ui, |ui| {
            for &level in L::ALL {
                ui.selectable_value(current, level, level.label());
            }
        });
    *current != before
}
