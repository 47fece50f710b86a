use std::path::Path;

use ckd_predictor::features::{Feature, FeatureKind, FeatureRow};

/// Creatinine above this marks a synthetic patient as CKD.
pub const CREATININE_CUTOFF: f32 = 1.5;

/// Write `rows` as a dataset CSV with a `class` column of `ckd`/`notckd`.
pub fn write_ckd_csv(path: &Path, rows: &[(FeatureRow, bool)]) {
    let mut writer = csv::Writer::from_path(path).expect("create csv");
    let mut header: Vec<&str> = Feature::ALL.iter().map(|f| f.column_name()).collect();
    header.push("class");
    writer.write_record(&header).expect("write header");
    for (row, ckd) in rows {
        let mut record: Vec<String> = Feature::ALL
            .iter()
            .map(|&feature| cell_text(row, feature))
            .collect();
        record.push(if *ckd { "ckd" } else { "notckd" }.to_string());
        writer.write_record(&record).expect("write row");
    }
    writer.flush().expect("flush csv");
}

/// Twenty rows, ten per class, separable by serum creatinine alone.
///
/// Every other column keeps its form default so no tree can split on it.
pub fn rule_rows() -> Vec<(FeatureRow, bool)> {
    (0..20)
        .map(|idx| {
            let ckd = idx % 2 == 1;
            let step = (idx / 2) as f32;
            let mut row = FeatureRow::default();
            row.serum_creatinine = if ckd {
                2.0 + step * 0.25
            } else {
                0.5 + step * 0.05
            };
            (row, ckd)
        })
        .collect()
}

fn cell_text(row: &FeatureRow, feature: Feature) -> String {
    match feature.kind() {
        FeatureKind::Nominal(column) => {
            let code = row.nominal_code(feature).expect("nominal code");
            column
                .table()
                .into_iter()
                .find(|(_, level_code)| *level_code == code)
                .map(|(label, _)| label.to_string())
                .expect("label for code")
        }
        FeatureKind::Numeric(_) | FeatureKind::Ordinal(_) => {
            row.number(feature).expect("numeric value").to_string()
        }
    }
}
