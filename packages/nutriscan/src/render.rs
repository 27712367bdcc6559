//! Plain text rendering of submission outcomes for the terminal.

use crate::domain::{ExtractionResult, InferenceResult, PatientProfile, Reading, WeeklyPlan};
use crate::error::SubmissionError;
use crate::log::RENDER;
use std::fmt::Write;
use tracing::trace;

#[derive(Clone, Debug, PartialEq)]
pub struct DietRow {
    pub label: String,
    pub value: String,
}

///
/// One row per entry, in the order the service listed them
///
pub fn diet_rows(result: &InferenceResult) -> Vec<DietRow> {
    result
        .entries()
        .iter()
        .map(|(key, value)| DietRow {
            label: label(key),
            value: diet_value(value),
        })
        .collect()
}

/// `Protein_g` -> `Protein g`
pub fn label(key: &str) -> String {
    key.replace('_', " ")
}

/// Numbers to one decimal place, text as given
pub fn diet_value(value: &Reading) -> String {
    match value {
        Reading::Number(n) => format!("{n:.1}"),
        Reading::Text(s) => s.to_owned(),
    }
}

pub fn prediction(result: &InferenceResult) -> String {
    let rows = diet_rows(result);

    trace!(target: RENDER, msg = "Rendering prediction", rows = rows.len());

    if rows.is_empty() {
        return "No recommendations were returned\n".to_string();
    }

    let width = rows.iter().map(|row| row.label.len()).max().unwrap_or(0);

    let mut out = String::from("Recommended daily intake\n");
    for row in rows {
        let _ = writeln!(out, "  {:<width$}  {}", row.label, row.value);
    }
    out
}

pub fn extraction(result: &ExtractionResult) -> String {
    let stats = &result.extracted_stats;

    let mut fields: Vec<(String, String)> = [
        ("Age", &stats.ages),
        ("Gender", &stats.gender),
        ("Height", &stats.height),
        ("Weight", &stats.weight),
        ("Hemoglobin", &stats.hemoglobin),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.as_ref().map(|v| (name.to_string(), v.to_string())))
    .collect();

    fields.extend(
        stats
            .extra
            .iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(name, value)| {
                let value = value
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string());
                (label(name), value)
            }),
    );

    let mut out = String::from("Extracted from report\n");

    if fields.is_empty() {
        out.push_str("  (no fields recognised)\n");
    }

    let width = fields.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in fields {
        let _ = writeln!(out, "  {name:<width$}  {value}");
    }

    if let Some(suggested) = result
        .suggested_deficiency
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        let _ = writeln!(out, "Suggested deficiency: {suggested}");
    }

    out
}

pub fn weekly_plan(plan: &WeeklyPlan) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Analysis: {} optimised", plan.deficiency_found);
    let _ = writeln!(out, "Goal: {}", plan.goal);

    let hemoglobin = optional(&plan.extracted_info.hemoglobin);
    let age = optional(&plan.extracted_info.ages);
    let _ = writeln!(out, "Extracted Hb: {hemoglobin}  Extracted age: {age}");

    for (day, meal) in &plan.weekly_diet {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", day.to_uppercase());
        let _ = writeln!(out, "  {meal}");
    }

    out
}

pub fn profile(profile: &PatientProfile) -> String {
    let mut out = String::from("Profile\n");
    let _ = writeln!(out, "  Age             {}", profile.age);
    let _ = writeln!(out, "  Sex             {}", profile.sex);
    let _ = writeln!(out, "  Height          {:.1} cm", profile.height_cm);
    let _ = writeln!(out, "  Weight          {:.1} kg", profile.weight_kg);
    let _ = writeln!(out, "  Activity level  {}", profile.activity_level);
    let _ = writeln!(out, "  Deficiency      {}", profile.known_deficiency);
    let _ = writeln!(out, "  BMI             {:.2}", profile.body_mass_index());
    out
}

///
/// The single user facing error line, with a hint for the failures a user can act on
///
pub fn error(err: &SubmissionError) -> String {
    match err {
        SubmissionError::NetworkUnavailable { .. } => {
            format!("Error: {err}\nCheck the analysis service is running and service.base_url is correct.")
        }
        SubmissionError::MalformedResponse { .. } => {
            format!("Error: {err}\nThe service may be a different version than this client expects.")
        }
        _ => format!("Error: {err}"),
    }
}

fn optional(value: &Option<Reading>) -> String {
    value
        .as_ref()
        .map(Reading::to_string)
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExtractedInfo, ExtractedStats};

    #[test]
    fn diet_rows_replace_underscores_and_use_one_decimal() {
        let result = InferenceResult::new(vec![
            ("Protein_g".to_string(), Reading::Number(120.4)),
            ("Carbs_g".to_string(), Reading::Number(250.0)),
        ]);

        let rows = diet_rows(&result);

        assert_eq!(
            rows,
            vec![
                DietRow {
                    label: "Protein g".to_string(),
                    value: "120.4".to_string()
                },
                DietRow {
                    label: "Carbs g".to_string(),
                    value: "250.0".to_string()
                },
            ]
        );
    }

    #[test]
    fn text_values_are_kept() {
        let result = InferenceResult::new(vec![(
            "Meal_Plan".to_string(),
            Reading::Text("Mediterranean".to_string()),
        )]);

        let rendered = prediction(&result);
        assert!(rendered.contains("Meal Plan"));
        assert!(rendered.contains("Mediterranean"));
    }

    #[test]
    fn prediction_table_is_aligned() {
        let result = InferenceResult::new(vec![
            ("Fat_g".to_string(), Reading::Number(70.0)),
            ("Calories_kcal".to_string(), Reading::Number(2450.0)),
        ]);

        let rendered = prediction(&result);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[1], "  Fat g          70.0");
        assert_eq!(lines[2], "  Calories kcal  2450.0");
    }

    #[test]
    fn weekly_plan_lists_days_in_order() {
        let plan = WeeklyPlan {
            deficiency_found: "Iron".to_string(),
            goal: "Raise hemoglobin".to_string(),
            extracted_info: ExtractedInfo {
                hemoglobin: Some(Reading::Number(10.4)),
                ages: None,
            },
            weekly_diet: vec![
                ("Monday".to_string(), "Spinach dal".to_string()),
                ("Tuesday".to_string(), "Beetroot salad".to_string()),
            ],
        };

        let rendered = weekly_plan(&plan);

        assert!(rendered.contains("Extracted Hb: 10.4  Extracted age: -"));
        let monday = rendered.find("MONDAY").unwrap();
        let tuesday = rendered.find("TUESDAY").unwrap();
        assert!(monday < tuesday);
    }

    #[test]
    fn extraction_skips_missing_fields() {
        let result = ExtractionResult {
            extracted_stats: ExtractedStats {
                ages: Some(Reading::Number(38.0)),
                ..Default::default()
            },
            suggested_deficiency: Some("Vitamin D".to_string()),
        };

        let rendered = extraction(&result);

        assert!(rendered.contains("Age  38"));
        assert!(!rendered.contains("Gender"));
        assert!(rendered.contains("Suggested deficiency: Vitamin D"));
    }

    #[test]
    fn network_errors_get_a_hint() {
        let err = SubmissionError::NetworkUnavailable {
            endpoint: "http://127.0.0.1:5000/predict".to_string(),
            reason: "connection refused".to_string(),
        };

        let rendered = error(&err);
        assert!(rendered.starts_with("Error: Cannot connect to the analysis service"));
        assert!(rendered.contains("service.base_url"));
    }
}
