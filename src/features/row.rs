use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::levels::{Appetite, Gender, NominalLevel, Presence, PusCell, YesNo};
use super::schema::{FEATURE_COUNT, Feature, FeatureKind};

/// Why a single dataset cell could not be stored in a [`FeatureRow`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CellError {
    #[error("expected a number, found `{0}`")]
    NotNumeric(String),
    #[error("unknown level `{found}` (expected one of: {expected})")]
    UnknownLevel { found: String, expected: String },
}

/// Mutable handle to a nominal field, typed by its level set.
#[derive(Debug)]
pub enum NominalMut<'a> {
    Gender(&'a mut Gender),
    YesNo(&'a mut YesNo),
    PusCell(&'a mut PusCell),
    Presence(&'a mut Presence),
    Appetite(&'a mut Appetite),
}

/// One patient's clinical record.
///
/// Nominal attributes are stored as their level enums, so a row can never hold
/// a level outside the closed set for its column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureRow {
    pub age: f32,
    pub gender: Gender,
    pub blood_pressure: f32,
    pub specific_gravity: f32,
    pub albumin: f32,
    pub sugar: f32,
    pub pus_cell: PusCell,
    pub pus_cell_clumps: Presence,
    pub bacteria: Presence,
    pub blood_glucose_random: f32,
    pub blood_urea: f32,
    pub serum_creatinine: f32,
    pub sodium: f32,
    pub potassium: f32,
    pub hemoglobin: f32,
    pub packed_cell_volume: f32,
    pub white_blood_cell_count: f32,
    pub red_blood_cell_count: f32,
    pub hypertension: YesNo,
    pub diabetes_mellitus: YesNo,
    pub coronary_artery_disease: YesNo,
    pub appetite: Appetite,
    pub anemia: YesNo,
    pub pedal_edema: YesNo,
}

impl Default for FeatureRow {
    /// Form defaults: numeric defaults and the first listed option everywhere else.
    fn default() -> Self {
        let mut row = Self {
            age: 0.0,
            gender: Gender::ALL[0],
            blood_pressure: 0.0,
            specific_gravity: 0.0,
            albumin: 0.0,
            sugar: 0.0,
            pus_cell: PusCell::ALL[0],
            pus_cell_clumps: Presence::ALL[0],
            bacteria: Presence::ALL[0],
            blood_glucose_random: 0.0,
            blood_urea: 0.0,
            serum_creatinine: 0.0,
            sodium: 0.0,
            potassium: 0.0,
            hemoglobin: 0.0,
            packed_cell_volume: 0.0,
            white_blood_cell_count: 0.0,
            red_blood_cell_count: 0.0,
            hypertension: YesNo::ALL[0],
            diabetes_mellitus: YesNo::ALL[0],
            coronary_artery_disease: YesNo::ALL[0],
            appetite: Appetite::ALL[0],
            anemia: YesNo::ALL[0],
            pedal_edema: YesNo::ALL[0],
        };
        for feature in Feature::ALL {
            let initial = match feature.kind() {
                FeatureKind::Numeric(range) => range.default,
                FeatureKind::Ordinal(levels) => levels[0].1,
                FeatureKind::Nominal(_) => continue,
            };
            if let Some(slot) = row.number_mut(feature) {
                *slot = initial;
            }
        }
        row
    }
}

impl FeatureRow {
    /// Numeric or ordinal value for `feature`; `None` for nominal columns.
    pub fn number(&self, feature: Feature) -> Option<f32> {
        let mut copy = *self;
        copy.number_mut(feature).map(|value| *value)
    }

    /// Mutable numeric or ordinal slot for `feature`; `None` for nominal columns.
    pub fn number_mut(&mut self, feature: Feature) -> Option<&mut f32> {
        Some(match feature {
            Feature::Age => &mut self.age,
            Feature::BloodPressure => &mut self.blood_pressure,
            Feature::SpecificGravity => &mut self.specific_gravity,
            Feature::Albumin => &mut self.albumin,
            Feature::Sugar => &mut self.sugar,
            Feature::BloodGlucoseRandom => &mut self.blood_glucose_random,
            Feature::BloodUrea => &mut self.blood_urea,
            Feature::SerumCreatinine => &mut self.serum_creatinine,
            Feature::Sodium => &mut self.sodium,
            Feature::Potassium => &mut self.potassium,
            Feature::Hemoglobin => &mut self.hemoglobin,
            Feature::PackedCellVolume => &mut self.packed_cell_volume,
            Feature::WhiteBloodCellCount => &mut self.white_blood_cell_count,
            Feature::RedBloodCellCount => &mut self.red_blood_cell_count,
            _ => return None,
        })
    }

    /// Typed mutable handle for a nominal `feature`; `None` for numeric columns.
    pub fn nominal_mut(&mut self, feature: Feature) -> Option<NominalMut<'_>> {
        Some(match feature {
            Feature::Gender => NominalMut::Gender(&mut self.gender),
            Feature::PusCell => NominalMut::PusCell(&mut self.pus_cell),
            Feature::PusCellClumps => NominalMut::Presence(&mut self.pus_cell_clumps),
            Feature::Bacteria => NominalMut::Presence(&mut self.bacteria),
            Feature::Hypertension => NominalMut::YesNo(&mut self.hypertension),
            Feature::DiabetesMellitus => NominalMut::YesNo(&mut self.diabetes_mellitus),
            Feature::CoronaryArteryDisease => NominalMut::YesNo(&mut self.coronary_artery_disease),
            Feature::Appetite => NominalMut::Appetite(&mut self.appetite),
            Feature::Anemia => NominalMut::YesNo(&mut self.anemia),
            Feature::PedalEdema => NominalMut::YesNo(&mut self.pedal_edema),
            _ => return None,
        })
    }

    /// Model code of a nominal `feature`; `None` for numeric columns.
    pub fn nominal_code(&self, feature: Feature) -> Option<u8> {
        let mut copy = *self;
        copy.nominal_mut(feature).map(|handle| match handle {
            NominalMut::Gender(level) => level.code(),
            NominalMut::YesNo(level) => level.code(),
            NominalMut::PusCell(level) => level.code(),
            NominalMut::Presence(level) => level.code(),
            NominalMut::Appetite(level) => level.code(),
        })
    }

    /// Model input value for one column.
    pub fn value(&self, feature: Feature) -> f32 {
        match self.nominal_code(feature) {
            Some(code) => f32::from(code),
            None => self.number(feature).unwrap_or_default(),
        }
    }

    /// Encode the row in model column order.
    pub fn encode(&self) -> [f32; FEATURE_COUNT] {
        Feature::ALL.map(|feature| self.value(feature))
    }

    /// Store one raw dataset cell for `feature`.
    ///
    /// Numbers are taken as-is; form bounds do not apply to training data.
    pub fn set_from_str(&mut self, feature: Feature, raw: &str) -> Result<(), CellError> {
        if let Some(slot) = self.number_mut(feature) {
            *slot = parse_number(raw)?;
            return Ok(());
        }
        match self.nominal_mut(feature) {
            Some(NominalMut::Gender(level)) => *level = parse_level(raw)?,
            Some(NominalMut::YesNo(level)) => *level = parse_level(raw)?,
            Some(NominalMut::PusCell(level)) => *level = parse_level(raw)?,
            Some(NominalMut::Presence(level)) => *level = parse_level(raw)?,
            Some(NominalMut::Appetite(level)) => *level = parse_level(raw)?,
            None => {}
        }
        Ok(())
    }

    /// Copy of the row with every numeric field inside its form range and
    /// every ordinal field snapped to its nearest allowed level.
    pub fn clamped(&self) -> Self {
        let mut row = *self;
        for feature in Feature::ALL {
            let kind = feature.kind();
            let Some(slot) = row.number_mut(feature) else {
                continue;
            };
            match kind {
                FeatureKind::Numeric(range) => *slot = range.clamp(*slot),
                FeatureKind::Ordinal(levels) => *slot = nearest_level(levels, *slot),
                FeatureKind::Nominal(_) => {}
            }
        }
        row
    }
}

fn parse_number(raw: &str) -> Result<f32, CellError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| CellError::NotNumeric(trimmed.to_string()))
}

fn parse_level<L: NominalLevel>(raw: &str) -> Result<L, CellError> {
    L::from_label(raw).ok_or_else(|| CellError::UnknownLevel {
        found: raw.trim().to_string(),
        expected: L::ALL
            .iter()
            .map(|level| level.label())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

fn nearest_level(levels: &[(&str, f32)], value: f32) -> f32 {
    if !value.is_finite() {
        return levels[0].1;
    }
    levels
        .iter()
        .map(|(_, level)| *level)
        .min_by(|a, b| (a - value).abs().total_cmp(&(b - value).abs()))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_row_uses_form_defaults() {
        let row = FeatureRow::default();
        assert_eq!(row.age, 30.0);
        assert_eq!(row.blood_pressure, 120.0);
        assert_eq!(row.serum_creatinine, 1.0);
        assert_eq!(row.white_blood_cell_count, 7000.0);
        assert_eq!(row.specific_gravity, 1.010);
        assert_eq!(row.albumin, 0.0);
        assert_eq!(row.gender, Gender::Male);
        assert_eq!(row.pus_cell, PusCell::Normal);
        assert_eq!(row.appetite, Appetite::Good);
        assert_eq!(row.hypertension, YesNo::No);
    }

    #[test]
    fn encodes_documented_scenario() {
        let row = FeatureRow {
            gender: Gender::Male,
            hypertension: YesNo::Yes,
            appetite: Appetite::Good,
            ..FeatureRow::default()
        };
        let encoded = row.encode();
        assert_eq!(encoded[Feature::Gender.index()], 1.0);
        assert_eq!(encoded[Feature::Hypertension.index()], 1.0);
        assert_eq!(encoded[Feature::Appetite.index()], 0.0);
        assert_eq!(encoded[Feature::PusCell.index()], 0.0);
        assert_eq!(encoded[Feature::PusCellClumps.index()], 0.0);
        assert_eq!(encoded[Feature::Bacteria.index()], 0.0);
        assert_eq!(encoded[Feature::DiabetesMellitus.index()], 0.0);
        assert_eq!(encoded[Feature::CoronaryArteryDisease.index()], 0.0);
        assert_eq!(encoded[Feature::Anemia.index()], 0.0);
        assert_eq!(encoded[Feature::PedalEdema.index()], 0.0);
        assert_eq!(encoded[Feature::Age.index()], 30.0);
        assert_eq!(encoded[Feature::SerumCreatinine.index()], 1.0);
    }

    #[test]
    fn encode_is_stable_across_calls() {
        let row = FeatureRow {
            bacteria: Presence::Present,
            sugar: 3.0,
            ..FeatureRow::default()
        };
        assert_eq!(row.encode(), row.encode());
    }

    #[test]
    fn set_from_str_parses_numbers_and_levels() {
        let mut row = FeatureRow::default();
        row.set_from_str(Feature::SerumCreatinine, " 3.2 ").unwrap();
        row.set_from_str(Feature::PusCell, "abnormal").unwrap();
        row.set_from_str(Feature::Gender, "Female").unwrap();
        row.set_from_str(Feature::WhiteBloodCellCount, "25000").unwrap();
        assert_eq!(row.serum_creatinine, 3.2);
        assert_eq!(row.pus_cell, PusCell::Abnormal);
        assert_eq!(row.gender, Gender::Female);
        // Training data is not clamped to form bounds.
        assert_eq!(row.white_blood_cell_count, 25000.0);
    }

    #[test]
    fn set_from_str_rejects_bad_cells() {
        let mut row = FeatureRow::default();
        assert_eq!(
            row.set_from_str(Feature::Age, "?"),
            Err(CellError::NotNumeric("?".to_string()))
        );
        assert!(matches!(
            row.set_from_str(Feature::Age, "inf"),
            Err(CellError::NotNumeric(_))
        ));
        let err = row.set_from_str(Feature::Appetite, "fair").unwrap_err();
        assert_eq!(
            err,
            CellError::UnknownLevel {
                found: "fair".to_string(),
                expected: "good, poor".to_string(),
            }
        );
    }

    #[test]
    fn clamped_enforces_ranges_and_levels() {
        let row = FeatureRow {
            age: 500.0,
            blood_pressure: 10.0,
            serum_creatinine: f32::NAN,
            specific_gravity: 1.019,
            albumin: 7.0,
            sugar: -1.0,
            ..FeatureRow::default()
        };
        let clamped = row.clamped();
        assert_eq!(clamped.age, 120.0);
        assert_eq!(clamped.blood_pressure, 50.0);
        assert_eq!(clamped.serum_creatinine, 1.0);
        assert_eq!(clamped.specific_gravity, 1.020);
        assert_eq!(clamped.albumin, 5.0);
        assert_eq!(clamped.sugar, 0.0);
    }

    #[test]
    fn numeric_ranges_match_form_bounds() {
        let expected = [
            (Feature::Age, 1.0, 120.0, 30.0),
            (Feature::BloodPressure, 50.0, 200.0, 120.0),
            (Feature::BloodGlucoseRandom, 50.0, 500.0, 100.0),
            (Feature::BloodUrea, 5.0, 200.0, 20.0),
            (Feature::SerumCreatinine, 0.1, 20.0, 1.0),
            (Feature::Sodium, 120.0, 160.0, 140.0),
            (Feature::Potassium, 2.0, 10.0, 4.0),
            (Feature::Hemoglobin, 5.0, 20.0, 14.0),
            (Feature::PackedCellVolume, 10.0, 60.0, 40.0),
            (Feature::WhiteBloodCellCount, 1000.0, 20000.0, 7000.0),
            (Feature::RedBloodCellCount, 1.0, 10.0, 5.0),
        ];
        let numeric: Vec<Feature> = Feature::ALL
            .into_iter()
            .filter(|feature| matches!(feature.kind(), FeatureKind::Numeric(_)))
            .collect();
        assert_eq!(numeric.len(), expected.len());
        for (feature, min, max, default) in expected {
            let FeatureKind::Numeric(range) = feature.kind() else {
                panic!("{} is not numeric", feature.column_name());
            };
            assert_eq!(
                (range.min, range.max, range.default),
                (min, max, default),
                "{}",
                feature.column_name()
            );
        }
    }

    #[test]
    fn clamped_bounds_every_numeric_field() {
        for feature in Feature::ALL {
            let FeatureKind::Numeric(range) = feature.kind() else {
                continue;
            };
            let mut low = FeatureRow::default();
            let mut high = FeatureRow::default();
            *low.number_mut(feature).unwrap() = range.min - 1.0;
            *high.number_mut(feature).unwrap() = range.max + 1.0;
            assert_eq!(
                low.clamped().number(feature),
                Some(range.min),
                "{}",
                feature.column_name()
            );
            assert_eq!(
                high.clamped().number(feature),
                Some(range.max),
                "{}",
                feature.column_name()
            );
        }
    }

    #[test]
    fn clamped_leaves_valid_rows_alone() {
        let row = FeatureRow::default();
        assert_eq!(row.clamped(), row);
    }

    #[test]
    fn json_record_fills_missing_fields_with_defaults() {
        let row: FeatureRow =
            serde_json::from_str(r#"{"gender": "female", "pus_cell": "abnormal", "age": 61}"#)
                .unwrap();
        assert_eq!(row.gender, Gender::Female);
        assert_eq!(row.pus_cell, PusCell::Abnormal);
        assert_eq!(row.age, 61.0);
        assert_eq!(row.sodium, 140.0);
    }

    #[test]
    fn json_record_rejects_unknown_levels_and_fields() {
        assert!(serde_json::from_str::<FeatureRow>(r#"{"gender": "other"}"#).is_err());
        assert!(serde_json::from_str::<FeatureRow>(r#"{"weight": 70}"#).is_err());
    }
}
