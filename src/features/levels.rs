//! Closed level sets for the nominal columns and their integer codes.
//!
//! Each nominal column is an enum whose variants carry both the dataset label
//! and the code fed to the model. The dataset loader and the form encoder both
//! read codes from here, so the two cannot drift apart.

use serde::{Deserialize, Serialize};

/// A nominal level with a fixed label and model code.
pub trait NominalLevel: Copy + Eq + Sized + 'static {
    /// Every level, in the order the form lists them.
    const ALL: &'static [Self];

    /// Label used in the dataset and shown in the form.
    fn label(self) -> &'static str;

    /// Integer code fed to the model.
    fn code(self) -> u8;

    /// Parse a dataset cell, ignoring surrounding whitespace and ASCII case.
    fn from_label(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.label().eq_ignore_ascii_case(raw))
    }

    /// Look up the level that owns `code`.
    fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|level| level.code() == code)
    }

    /// `(label, code)` pairs in listing order.
    fn table() -> Vec<(&'static str, u8)> {
        Self::ALL
            .iter()
            .map(|level| (level.label(), level.code()))
            .collect()
    }
}

macro_rules! nominal_levels {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => ($label:literal, $code:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $(#[doc = $label] $variant),+
        }

        impl NominalLevel for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            fn code(self) -> u8 {
                match self {
                    $(Self::$variant => $code),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

nominal_levels! {
    /// Patient gender.
    Gender {
        Male => ("male", 1),
        Female => ("female", 0),
    }
}

nominal_levels! {
    /// Presence of a condition (hypertension, diabetes, CAD, anemia, pedal edema).
    YesNo {
        No => ("no", 0),
        Yes => ("yes", 1),
    }
}

nominal_levels! {
    /// Pus cell finding in urine.
    PusCell {
        Normal => ("normal", 0),
        Abnormal => ("abnormal", 1),
    }
}

nominal_levels! {
    /// Whether pus cell clumps or bacteria were found.
    Presence {
        Absent => ("absent", 0),
        Present => ("present", 1),
    }
}

nominal_levels! {
    /// Reported appetite.
    Appetite {
        Good => ("good", 0),
        Poor => ("poor", 1),
    }
}

/// Identifies which level enum a nominal feature uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NominalColumn {
    Gender,
    YesNo,
    PusCell,
    Presence,
    Appetite,
}

impl NominalColumn {
    /// `(label, code)` pairs for this column's levels.
    pub fn table(self) -> Vec<(&'static str, u8)> {
        match self {
            Self::Gender => Gender::table(),
            Self::YesNo => YesNo::table(),
            Self::PusCell => PusCell::table(),
            Self::Presence => Presence::table(),
            Self::Appetite => Appetite::table(),
        }
    }
}
