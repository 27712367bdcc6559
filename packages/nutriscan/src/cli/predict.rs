use crate::{
    client::ReportSubmissionClient,
    domain::{ActivityLevel, Deficiency, PatientProfile, Sex, UploadedDocument},
    error::Error,
    log::PROFILE,
    render,
    service::InferenceTransport,
};
use clap::Args;
use std::path::PathBuf;
use tracing::debug;

///
/// Profile fields not given on the command line keep their defaults,
/// or the values read from `--report` when one is supplied.
///
/// Flags always win over values extracted from a report.
///
#[derive(Args, Clone, Debug, Default)]
pub struct Predict {
    /// Age in years
    #[arg(long)]
    pub age: Option<u32>,

    #[arg(long, value_enum)]
    pub sex: Option<Sex>,

    /// Height in centimetres
    #[arg(long)]
    pub height: Option<f64>,

    /// Weight in kilograms
    #[arg(long)]
    pub weight: Option<f64>,

    #[arg(long, value_enum)]
    pub activity: Option<ActivityLevel>,

    #[arg(long, value_enum)]
    pub deficiency: Option<Deficiency>,

    /// Blood report used to fill in the profile before predicting
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl Predict {
    pub async fn run<T: InferenceTransport>(
        &self,
        client: &ReportSubmissionClient<T>,
    ) -> Result<String, Error> {
        let mut output = String::new();

        if let Some(path) = &self.report {
            let document = UploadedDocument::from_path(path).await?;
            let extraction = client.submit_document(document).await?;
            output.push_str(&render::extraction(&extraction));
            output.push('\n');
        }

        client.update_draft(|profile| self.apply(profile));

        let profile = client.draft();
        output.push_str(&render::profile(&profile));
        output.push('\n');

        let result = client.submit_profile(&profile).await?;
        output.push_str(&render::prediction(&result));

        Ok(output)
    }

    pub fn apply(&self, profile: &mut PatientProfile) {
        if let Some(age) = self.age {
            profile.age = age;
        }
        if let Some(sex) = self.sex {
            profile.sex = sex;
        }
        if let Some(height) = self.height {
            profile.height_cm = height;
        }
        if let Some(weight) = self.weight {
            profile.weight_kg = weight;
        }
        if let Some(activity) = self.activity {
            profile.activity_level = activity;
        }
        if let Some(deficiency) = self.deficiency {
            profile.known_deficiency = deficiency;
        }

        debug!(target: PROFILE, msg = "Applied command line profile", ?profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceRequest;
    use crate::test_helpers::{ok_json, ScriptedTransport};
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn flags_override_only_what_they_name() {
        let predict = Predict {
            weight: Some(62.5),
            deficiency: Some(Deficiency::Iron),
            ..Default::default()
        };

        let mut profile = PatientProfile::default();
        predict.apply(&mut profile);

        assert_eq!(profile.weight_kg, 62.5);
        assert_eq!(profile.known_deficiency, Deficiency::Iron);
        assert_eq!(profile.age, 25);
        assert_eq!(profile.height_cm, 175.0);
    }

    #[tokio::test]
    async fn report_values_are_overridden_by_flags() {
        let transport = ScriptedTransport::new(|request| match request {
            ServiceRequest::UploadReport(_) => ok_json(json!({
                "extracted_stats": {"Ages": 52, "Gender": "Female", "Weight": 68},
                "suggested_deficiency": "Iron"
            })),
            _ => ok_json(json!({"recommended_diet": {"Iron_mg": 18.0}})),
        });
        let client = ReportSubmissionClient::new(transport, Duration::from_secs(30));

        let predict = Predict {
            age: Some(50),
            report: Some(PathBuf::from("tests/fixtures/blood-report.txt")),
            ..Default::default()
        };

        let output = predict.run(&client).await.unwrap();

        let draft = client.draft();
        assert_eq!(draft.age, 50);
        assert_eq!(draft.sex, Sex::Female);
        assert_eq!(draft.weight_kg, 68.0);

        assert!(output.contains("Extracted from report"));
        assert!(output.contains("Iron mg  18.0"));
    }
}
