//! Health attributes entered by the user and submitted for a diet recommendation.

use crate::domain::{ExtractionResult, Reading};
use crate::error::ProfileError;
use crate::log::PROFILE;
use clap::ValueEnum;
use std::fmt::Display;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq)]
pub struct PatientProfile {
    /// Age in whole years
    pub age: u32,
    pub sex: Sex,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
    pub known_deficiency: Deficiency,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Sex {
    Male,
    Female,
    Other,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Deficiency {
    #[default]
    None,
    Iron,
    VitaminD,
    VitaminB12,
    Calcium,
}

impl Default for PatientProfile {
    fn default() -> Self {
        PatientProfile {
            age: 25,
            sex: Sex::Male,
            height_cm: 175.0,
            weight_kg: 75.0,
            activity_level: ActivityLevel::Moderate,
            known_deficiency: Deficiency::None,
        }
    }
}

impl PatientProfile {
    ///
    /// weight (kg) / height (m)²
    ///
    pub fn body_mass_index(&self) -> f64 {
        let height_m = self.height_cm / 100.0;
        self.weight_kg / (height_m * height_m)
    }

    ///
    /// Checks the profile before any request is built
    ///
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.age == 0 {
            return Err(ProfileError::InvalidAge);
        }

        if !is_positive(self.height_cm) {
            return Err(ProfileError::InvalidHeight {
                value: self.height_cm,
            });
        }

        if !is_positive(self.weight_kg) {
            return Err(ProfileError::InvalidWeight {
                value: self.weight_kg,
            });
        }

        Ok(())
    }

    ///
    /// Applies the fields recognised in an uploaded report.
    ///
    /// Only fields the service actually returned are written. Missing, null, empty or
    /// unusable values leave the existing value untouched.
    /// Returns the names of the fields that changed.
    ///
    pub fn merge_extracted(&mut self, extraction: &ExtractionResult) -> Vec<&'static str> {
        let mut updated = Vec::new();
        let stats = &extraction.extracted_stats;

        if let Some(age) = stats.ages.as_ref().and_then(Reading::as_f64) {
            let rounded = age.round();
            if rounded.is_finite() && rounded >= 1.0 && rounded <= u32::MAX as f64 {
                self.age = rounded as u32;
                updated.push("age");
            } else {
                debug!(target: PROFILE, msg = "Ignoring extracted age", age);
            }
        }

        if let Some(gender) = stats.gender.as_ref().and_then(Reading::as_text) {
            match gender.parse::<Sex>() {
                Ok(sex) => {
                    self.sex = sex;
                    updated.push("sex");
                }
                Err(err) => debug!(target: PROFILE, msg = "Ignoring extracted gender", error = err.to_string()),
            }
        }

        if let Some(height) = stats.height.as_ref().and_then(Reading::as_f64) {
            if is_positive(height) {
                self.height_cm = height;
                updated.push("height_cm");
            }
        }

        if let Some(weight) = stats.weight.as_ref().and_then(Reading::as_f64) {
            if is_positive(weight) {
                self.weight_kg = weight;
                updated.push("weight_kg");
            }
        }

        if let Some(suggested) = extraction
            .suggested_deficiency
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            match suggested.parse::<Deficiency>() {
                Ok(deficiency) => {
                    self.known_deficiency = deficiency;
                    updated.push("known_deficiency");
                }
                Err(_) => {
                    warn!(target: PROFILE, msg = "Suggested deficiency is not a known category", suggested);
                }
            }
        }

        debug!(target: PROFILE, msg = "Merged extracted fields", ?updated);

        updated
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

// Wire values are capitalised words, parsing is case and separator insensitive
fn normalise(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Other => "Other",
        }
    }
}

impl FromStr for Sex {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            "other" => Ok(Sex::Other),
            _ => Err(ProfileError::UnknownValue {
                field: "sex",
                value: s.to_string(),
            }),
        }
    }
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::Light => "Light",
            ActivityLevel::Moderate => "Moderate",
            ActivityLevel::Active => "Active",
        }
    }
}

impl Deficiency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Deficiency::None => "None",
            Deficiency::Iron => "Iron",
            Deficiency::VitaminD => "Vitamin D",
            Deficiency::VitaminB12 => "Vitamin B12",
            Deficiency::Calcium => "Calcium",
        }
    }
}

impl FromStr for Deficiency {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise(s).as_str() {
            "" | "none" => Ok(Deficiency::None),
            "iron" | "anemia" | "anaemia" => Ok(Deficiency::Iron),
            "vitamind" | "d" => Ok(Deficiency::VitaminD),
            "vitaminb12" | "b12" => Ok(Deficiency::VitaminB12),
            "calcium" => Ok(Deficiency::Calcium),
            _ => Err(ProfileError::UnknownValue {
                field: "deficiency",
                value: s.to_string(),
            }),
        }
    }
}

impl Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Deficiency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
