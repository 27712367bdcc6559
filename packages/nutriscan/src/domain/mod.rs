mod document;
mod profile;
mod result;

pub use document::UploadedDocument;
pub use profile::{ActivityLevel, Deficiency, PatientProfile, Sex};
pub use result::{
    ExtractedInfo, ExtractedStats, ExtractionResult, InferenceResult, Reading, WeeklyPlan,
};

pub(crate) use result::ordered_entries;
