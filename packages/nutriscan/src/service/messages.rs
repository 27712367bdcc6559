use super::RawResponse;
use crate::domain::{
    ordered_entries, ExtractionResult, InferenceResult, PatientProfile, Reading, WeeklyPlan,
};
use crate::error::SubmissionError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

///
/// Body of `POST /predict`
/// Field names follow the columns the service model was trained on.
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictRequest {
    #[serde(rename = "Ages")]
    pub age: u32,

    #[serde(rename = "Gender")]
    pub gender: &'static str,

    #[serde(rename = "Height")]
    pub height: f64,

    #[serde(rename = "Weight")]
    pub weight: f64,

    #[serde(rename = "Activity Level")]
    pub activity_level: &'static str,

    #[serde(rename = "Deficiency")]
    pub deficiency: &'static str,

    #[serde(rename = "BMI")]
    pub bmi: f64,
}

impl From<&PatientProfile> for PredictRequest {
    fn from(profile: &PatientProfile) -> Self {
        PredictRequest {
            age: profile.age,
            gender: profile.sex.as_str(),
            height: profile.height_cm,
            weight: profile.weight_kg,
            activity_level: profile.activity_level.as_str(),
            deficiency: profile.known_deficiency.as_str(),
            bmi: profile.body_mass_index(),
        }
    }
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(deserialize_with = "ordered_entries")]
    recommended_diet: Vec<(String, Reading)>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub fn parse_prediction(response: &RawResponse) -> Result<InferenceResult, SubmissionError> {
    let body: PredictResponse = classify(response)?;
    Ok(InferenceResult::new(body.recommended_diet))
}

pub fn parse_extraction(response: &RawResponse) -> Result<ExtractionResult, SubmissionError> {
    classify(response)
}

pub fn parse_weekly_plan(response: &RawResponse) -> Result<WeeklyPlan, SubmissionError> {
    classify(response)
}

///
/// Maps a raw response to the expected body or a classified error
///
///  - non-2xx: ServerRejected, with the body's `error` message if it has one
///  - 2xx that does not match the expected shape but has an `error` message: ServerRejected
///  - any other 2xx that does not match the expected shape: MalformedResponse
///  - 2xx that matches the expected shape: the parsed body, even alongside an `error` key
///
fn classify<T: DeserializeOwned>(response: &RawResponse) -> Result<T, SubmissionError> {
    if !response.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&response.body)
            .ok()
            .map(|body| body.error)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| status_message(response.status));

        return Err(SubmissionError::ServerRejected {
            status: response.status,
            message,
        });
    }

    let value: Value = serde_json::from_slice(&response.body).map_err(|err| {
        SubmissionError::MalformedResponse {
            reason: err.to_string(),
        }
    })?;

    let message = error_message(&value);

    serde_json::from_value(value).map_err(|err| match message {
        // The service reports model failures as `{"error": ...}` with a success status
        Some(message) => SubmissionError::ServerRejected {
            status: response.status,
            message,
        },
        None => SubmissionError::MalformedResponse {
            reason: err.to_string(),
        },
    })
}

fn error_message(value: &Value) -> Option<String> {
    value
        .get("error")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

fn status_message(status: u16) -> String {
    let reason = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown status");

    format!("The analysis service responded with HTTP {status} {reason}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ActivityLevel, Sex};
    use serde_json::json;

    fn profile() -> PatientProfile {
        PatientProfile {
            age: 25,
            sex: Sex::Male,
            height_cm: 175.0,
            weight_kg: 75.0,
            activity_level: ActivityLevel::Moderate,
            ..Default::default()
        }
    }

    #[test]
    fn predict_request_uses_service_field_names() {
        let request = PredictRequest::from(&profile());
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["Ages"], json!(25));
        assert_eq!(value["Gender"], json!("Male"));
        assert_eq!(value["Height"], json!(175.0));
        assert_eq!(value["Weight"], json!(75.0));
        assert_eq!(value["Activity Level"], json!("Moderate"));
        assert_eq!(value["Deficiency"], json!("None"));

        let bmi = value["BMI"].as_f64().unwrap();
        assert!((bmi - 24.49).abs() < 0.01);
    }

    #[test]
    fn same_profile_gives_same_payload() {
        let first = serde_json::to_vec(&PredictRequest::from(&profile())).unwrap();
        let second = serde_json::to_vec(&PredictRequest::from(&profile())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn prediction_keeps_service_order() {
        let response = RawResponse::new(
            200,
            r#"{"status":"success","recommended_diet":{"Protein_g":120.4,"Carbs_g":250.0,"Note":"low sodium"}}"#,
        );

        let result = parse_prediction(&response).unwrap();
        let keys: Vec<&str> = result.entries().iter().map(|(k, _)| k.as_str()).collect();

        assert_eq!(keys, vec!["Protein_g", "Carbs_g", "Note"]);
        assert_eq!(result.get("Protein_g"), Some(&Reading::Number(120.4)));
        assert_eq!(
            result.get("Note"),
            Some(&Reading::Text("low sodium".to_string()))
        );
    }

    #[test]
    fn error_status_surfaces_service_message() {
        let response = RawResponse::new(422, r#"{"error":"Height is required"}"#);

        assert_eq!(
            parse_prediction(&response),
            Err(SubmissionError::ServerRejected {
                status: 422,
                message: "Height is required".to_string()
            })
        );
    }

    #[test]
    fn error_status_without_message_uses_status_text() {
        let response = RawResponse::new(502, "<html>Bad Gateway</html>");

        match parse_extraction(&response) {
            Err(SubmissionError::ServerRejected { status, message }) => {
                assert_eq!(status, 502);
                assert!(message.contains("502 Bad Gateway"));
            }
            other => panic!("expected ServerRejected, got {other:?}"),
        }
    }

    #[test]
    fn success_status_with_error_body_is_rejected() {
        let response = RawResponse::new(200, r#"{"error":"could not convert string to float"}"#);

        assert!(matches!(
            parse_prediction(&response),
            Err(SubmissionError::ServerRejected { status: 200, .. })
        ));
    }

    #[test]
    fn error_key_next_to_expected_payload_is_not_a_rejection() {
        let response = RawResponse::new(
            200,
            r#"{"status":"success","recommended_diet":{"Protein_g":120.4},"error":"warning: imputed Height"}"#,
        );

        let result = parse_prediction(&response).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result.get("Protein_g"), Some(&Reading::Number(120.4)));
    }

    #[test]
    fn unreadable_success_body_is_malformed() {
        let not_json = RawResponse::new(200, "OK");
        assert!(matches!(
            parse_prediction(&not_json),
            Err(SubmissionError::MalformedResponse { .. })
        ));

        let wrong_shape = RawResponse::new(200, r#"{"recommended_diet":[1,2,3]}"#);
        assert!(matches!(
            parse_prediction(&wrong_shape),
            Err(SubmissionError::MalformedResponse { .. })
        ));

        let missing_stats = RawResponse::new(200, r#"{"suggested_deficiency":"Iron"}"#);
        assert!(matches!(
            parse_extraction(&missing_stats),
            Err(SubmissionError::MalformedResponse { .. })
        ));

        let bool_value = RawResponse::new(200, r#"{"recommended_diet":{"Vegan":true}}"#);
        assert!(matches!(
            parse_prediction(&bool_value),
            Err(SubmissionError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn extraction_parses_stats_and_suggestion() {
        let response = RawResponse::new(
            200,
            json!({
                "extracted_stats": {"Ages": 34, "Gender": "Female", "Hemoglobin": 10.2},
                "suggested_deficiency": "Iron"
            })
            .to_string(),
        );

        let extraction = parse_extraction(&response).unwrap();
        assert_eq!(extraction.suggested_deficiency.as_deref(), Some("Iron"));
        assert_eq!(
            extraction.extracted_stats.hemoglobin,
            Some(Reading::Number(10.2))
        );
    }
}
