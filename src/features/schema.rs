//! Feature columns, their value domains and the persisted schema descriptor.

use serde::{Deserialize, Serialize};

use super::levels::NominalColumn;

/// Number of feature columns the model consumes.
pub const FEATURE_COUNT: usize = 24;

/// Current schema version. Bump when columns, order or code tables change.
pub const SCHEMA_VERSION: u32 = 1;

/// Inclusive bounds and form default for a free numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
    /// Widget drag/step increment.
    pub step: f32,
}

impl NumericRange {
    const fn new(min: f32, max: f32, default: f32, step: f32) -> Self {
        Self {
            min,
            max,
            default,
            step,
        }
    }

    /// Clamp `value` into range; non-finite input falls back to the default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.default
        }
    }
}

/// Value domain of a feature column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureKind {
    /// Continuous value bounded by the form widget.
    Numeric(NumericRange),
    /// Numeric value restricted to a closed set of `(label, value)` levels.
    Ordinal(&'static [(&'static str, f32)]),
    /// Unordered label encoded through a shared code table.
    Nominal(NominalColumn),
}

const SPECIFIC_GRAVITY_LEVELS: &[(&str, f32)] = &[
    ("1.010", 1.010),
    ("1.015", 1.015),
    ("1.020", 1.020),
    ("1.025", 1.025),
    ("1.030", 1.030),
];

const ZERO_TO_FIVE_LEVELS: &[(&str, f32)] = &[
    ("0", 0.0),
    ("1", 1.0),
    ("2", 2.0),
    ("3", 3.0),
    ("4", 4.0),
    ("5", 5.0),
];

/// One of the 24 clinical feature columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Age,
    Gender,
    BloodPressure,
    SpecificGravity,
    Albumin,
    Sugar,
    PusCell,
    PusCellClumps,
    Bacteria,
    BloodGlucoseRandom,
    BloodUrea,
    SerumCreatinine,
    Sodium,
    Potassium,
    Hemoglobin,
    PackedCellVolume,
    WhiteBloodCellCount,
    RedBloodCellCount,
    Hypertension,
    DiabetesMellitus,
    CoronaryArteryDisease,
    Appetite,
    Anemia,
    PedalEdema,
}

impl Feature {
    /// Every feature in model column order.
    pub const ALL: [Feature; FEATURE_COUNT] = [
        Feature::Age,
        Feature::Gender,
        Feature::BloodPressure,
        Feature::SpecificGravity,
        Feature::Albumin,
        Feature::Sugar,
        Feature::PusCell,
        Feature::PusCellClumps,
        Feature::Bacteria,
        Feature::BloodGlucoseRandom,
        Feature::BloodUrea,
        Feature::SerumCreatinine,
        Feature::Sodium,
        Feature::Potassium,
        Feature::Hemoglobin,
        Feature::PackedCellVolume,
        Feature::WhiteBloodCellCount,
        Feature::RedBloodCellCount,
        Feature::Hypertension,
        Feature::DiabetesMellitus,
        Feature::CoronaryArteryDisease,
        Feature::Appetite,
        Feature::Anemia,
        Feature::PedalEdema,
    ];

    /// Position of this feature in an encoded row.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header name in the dataset CSV.
    pub fn column_name(self) -> &'static str {
        match self {
            Feature::Age => "age",
            Feature::Gender => "gender",
            Feature::BloodPressure => "blood_pressure",
            Feature::SpecificGravity => "specific_gravity",
            Feature::Albumin => "albumin",
            Feature::Sugar => "sugar",
            Feature::PusCell => "pus_cell",
            Feature::PusCellClumps => "pus_cell_clumps",
            Feature::Bacteria => "bacteria",
            Feature::BloodGlucoseRandom => "blood_glucose_random",
            Feature::BloodUrea => "blood_urea",
            Feature::SerumCreatinine => "serum_creatinine",
            Feature::Sodium => "sodium",
            Feature::Potassium => "potassium",
            Feature::Hemoglobin => "hemoglobin",
            Feature::PackedCellVolume => "packed_cell_volume",
            Feature::WhiteBloodCellCount => "white_blood_cell_count",
            Feature::RedBloodCellCount => "red_blood_cell_count",
            Feature::Hypertension => "hypertension",
            Feature::DiabetesMellitus => "diabetes_mellitus",
            Feature::CoronaryArteryDisease => "coronary_artery_disease",
            Feature::Appetite => "appetite",
            Feature::Anemia => "anemia",
            Feature::PedalEdema => "pedal_edema",
        }
    }

    /// Form label.
    pub fn label(self) -> &'static str {
        match self {
            Feature::Age => "Age (years)",
            Feature::Gender => "Gender",
            Feature::BloodPressure => "Systolic BP (mmHg)",
            Feature::SpecificGravity => "Specific Gravity",
            Feature::Albumin => "Albumin (0-5)",
            Feature::Sugar => "Sugar (0-5)",
            Feature::PusCell => "Pus Cell",
            Feature::PusCellClumps => "Pus Cell Clumps",
            Feature::Bacteria => "Bacteria in urine",
            Feature::BloodGlucoseRandom => "Random Blood Glucose (mg/dL)",
            Feature::BloodUrea => "Blood Urea (mg/dL)",
            Feature::SerumCreatinine => "Serum Creatinine (mg/dL)",
            Feature::Sodium => "Sodium (mEq/L)",
            Feature::Potassium => "Potassium (mEq/L)",
            Feature::Hemoglobin => "Hemoglobin (g/dL)",
            Feature::PackedCellVolume => "Packed Cell Volume (%)",
            Feature::WhiteBloodCellCount => "WBC Count (cells/cumm)",
            Feature::RedBloodCellCount => "RBC Count (millions/cumm)",
            Feature::Hypertension => "Hypertension",
            Feature::DiabetesMellitus => "Diabetes Mellitus",
            Feature::CoronaryArteryDisease => "Coronary Artery Disease",
            Feature::Appetite => "Appetite",
            Feature::Anemia => "Anemia",
            Feature::PedalEdema => "Pedal Edema",
        }
    }

    pub fn kind(self) -> FeatureKind {
        use FeatureKind::{Nominal, Numeric, Ordinal};
        match self {
            Feature::Age => Numeric(NumericRange::new(1.0, 120.0, 30.0, 1.0)),
            Feature::Gender => Nominal(NominalColumn::Gender),
            Feature::BloodPressure => Numeric(NumericRange::new(50.0, 200.0, 120.0, 1.0)),
            Feature::SpecificGravity => Ordinal(SPECIFIC_GRAVITY_LEVELS),
            Feature::Albumin | Feature::Sugar => Ordinal(ZERO_TO_FIVE_LEVELS),
            Feature::PusCell => Nominal(NominalColumn::PusCell),
            Feature::PusCellClumps | Feature::Bacteria => Nominal(NominalColumn::Presence),
            Feature::BloodGlucoseRandom => Numeric(NumericRange::new(50.0, 500.0, 100.0, 1.0)),
            Feature::BloodUrea => Numeric(NumericRange::new(5.0, 200.0, 20.0, 1.0)),
            Feature::SerumCreatinine => Numeric(NumericRange::new(0.1, 20.0, 1.0, 0.1)),
            Feature::Sodium => Numeric(NumericRange::new(120.0, 160.0, 140.0, 1.0)),
            Feature::Potassium => Numeric(NumericRange::new(2.0, 10.0, 4.0, 0.1)),
            Feature::Hemoglobin => Numeric(NumericRange::new(5.0, 20.0, 14.0, 0.1)),
            Feature::PackedCellVolume => Numeric(NumericRange::new(10.0, 60.0, 40.0, 1.0)),
            Feature::WhiteBloodCellCount => {
                Numeric(NumericRange::new(1000.0, 20000.0, 7000.0, 100.0))
            }
            Feature::RedBloodCellCount => Numeric(NumericRange::new(1.0, 10.0, 5.0, 0.1)),
            Feature::Hypertension
            | Feature::DiabetesMellitus
            | Feature::CoronaryArteryDisease
            | Feature::Anemia
            | Feature::PedalEdema => Nominal(NominalColumn::YesNo),
            Feature::Appetite => Nominal(NominalColumn::Appetite),
        }
    }

    /// Find a feature by its CSV header name.
    pub fn from_column_name(name: &str) -> Option<Feature> {
        let name = name.trim();
        Feature::ALL
            .iter()
            .copied()
            .find(|feature| feature.column_name() == name)
    }
}

/// Persisted description of one column's domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnDomain {
    Numeric,
    Ordinal { levels: Vec<String> },
    Nominal { codes: Vec<LevelCode> },
}

/// A nominal level and the code the model saw for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCode {
    pub label: String,
    pub code: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(flatten)]
    pub domain: ColumnDomain,
}

/// Column layout a model was trained against, stored inside the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    pub columns: Vec<ColumnSchema>,
}

impl FeatureSchema {
    /// Schema produced by this build.
    pub fn current() -> Self {
        let columns = Feature::ALL
            .iter()
            .map(|feature| ColumnSchema {
                name: feature.column_name().to_string(),
                domain: match feature.kind() {
                    FeatureKind::Numeric(_) => ColumnDomain::Numeric,
                    FeatureKind::Ordinal(levels) => ColumnDomain::Ordinal {
                        levels: levels.iter().map(|(label, _)| label.to_string()).collect(),
                    },
                    FeatureKind::Nominal(column) => ColumnDomain::Nominal {
                        codes: column
                            .table()
                            .into_iter()
                            .map(|(label, code)| LevelCode {
                                label: label.to_string(),
                                code,
                            })
                            .collect(),
                    },
                },
            })
            .collect();
        Self {
            version: SCHEMA_VERSION,
            columns,
        }
    }

    /// Compare against `expected`, describing the first difference found.
    pub fn check(&self, expected: &FeatureSchema) -> Result<(), String> {
        if self.version != expected.version {
            return Err(format!(
                "schema version {} does not match expected {}",
                self.version, expected.version
            ));
        }
        if self.columns.len() != expected.columns.len() {
            return Err(format!(
                "model has {} feature columns but {} are expected",
                self.columns.len(),
                expected.columns.len()
            ));
        }
        for (idx, (found, wanted)) in self.columns.iter().zip(&expected.columns).enumerate() {
            if found.name != wanted.name {
                return Err(format!(
                    "column {idx} is `{}` but `{}` is expected",
                    found.name, wanted.name
                ));
            }
            if found.domain != wanted.domain {
                return Err(format!(
                    "column `{}` was trained with a different value encoding",
                    found.name
                ));
            }
        }
        Ok(())
    }
}
