//! The remote inference service, seen from the client.
//!
//! `InferenceTransport` is the seam between the submission client and the network:
//! one request in, one raw status + body out. `HttpTransport` is the production
//! implementation; tests substitute scripted transports.

mod http;
mod messages;

use crate::domain::UploadedDocument;
use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;

pub use http::HttpTransport;
pub use messages::{parse_extraction, parse_prediction, parse_weekly_plan, PredictRequest};

pub const PREDICT_PATH: &str = "/predict";
pub const UPLOAD_REPORT_PATH: &str = "/upload-report";
pub const PREDICT_WEEKLY_PATH: &str = "/predict-weekly";

/// Multipart field carrying an uploaded document
pub const DOCUMENT_FIELD: &str = "file";

#[derive(Clone, Debug, PartialEq)]
pub enum ServiceRequest {
    /// JSON profile submitted to `/predict`
    Predict(PredictRequest),
    /// Multipart report submitted to `/upload-report`
    UploadReport(UploadedDocument),
    /// Multipart report submitted to `/predict-weekly`
    PredictWeekly(UploadedDocument),
}

impl ServiceRequest {
    pub fn path(&self) -> &'static str {
        match self {
            ServiceRequest::Predict(_) => PREDICT_PATH,
            ServiceRequest::UploadReport(_) => UPLOAD_REPORT_PATH,
            ServiceRequest::PredictWeekly(_) => PREDICT_WEEKLY_PATH,
        }
    }
}

///
/// Status and body as received, before any interpretation
///
#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        RawResponse {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait InferenceTransport: Send + Sync {
    ///
    /// Full address of a service path, used to report where a failure happened
    ///
    fn endpoint(&self, path: &str) -> String;

    ///
    /// Issues exactly one call to the service.
    /// Transport level failures (refused, DNS, broken connection) are returned as `TransportError`.
    /// Any HTTP response, including error statuses, is returned as `RawResponse`.
    ///
    async fn send(&self, request: ServiceRequest) -> Result<RawResponse, TransportError>;
}
