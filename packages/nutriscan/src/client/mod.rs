mod state;

use crate::config::ServiceConfig;
use crate::domain::{ExtractionResult, InferenceResult, PatientProfile, UploadedDocument, WeeklyPlan};
use crate::error::{Error, SubmissionError};
use crate::log::SUBMISSION;
use crate::metrics::{
    STALE_RESPONSES_DISCARDED_TOTAL, SUBMISSIONS_TOTAL, SUBMISSION_DURATION_SECONDS,
    SUBMISSION_ERRORS_TOTAL,
};
use crate::service::{
    self, HttpTransport, InferenceTransport, PredictRequest, RawResponse, ServiceRequest,
};
use metrics::{counter, histogram};
use state::Slot;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub use state::{Outcome, RequestState};

///
/// Submits profiles and report documents to the inference service and keeps the
/// outcome of the latest submission.
///
/// Only one submission is live at a time. Starting a new one cancels the one in
/// flight, which then resolves to `SubmissionError::Superseded` without touching
/// the state. Every submission is also tagged with a sequence number and only the
/// most recently issued one may write its outcome, so a slow response can never
/// replace a newer one.
///
/// The client also keeps a draft `PatientProfile` that report uploads fill in.
///
pub struct ReportSubmissionClient<T: InferenceTransport> {
    transport: T,
    timeout: Duration,
    slot: Mutex<Slot>,
    draft: Mutex<PatientProfile>,
}

impl ReportSubmissionClient<HttpTransport> {
    pub fn init(config: &ServiceConfig) -> Result<Self, Error> {
        let transport = HttpTransport::init(config)?;
        Ok(ReportSubmissionClient::new(transport, config.timeout()))
    }
}

impl<T: InferenceTransport> ReportSubmissionClient<T> {
    pub fn new(transport: T, timeout: Duration) -> Self {
        ReportSubmissionClient {
            transport,
            timeout,
            slot: Mutex::new(Slot::default()),
            draft: Mutex::new(PatientProfile::default()),
        }
    }

    ///
    /// Validates the profile, then sends it with its BMI to `/predict`
    ///
    pub async fn submit_profile(
        &self,
        profile: &PatientProfile,
    ) -> Result<InferenceResult, SubmissionError> {
        let snapshot = profile.clone();

        self.submit(
            move || {
                snapshot.validate()?;
                Ok(ServiceRequest::Predict(PredictRequest::from(&snapshot)))
            },
            service::parse_prediction,
            Outcome::Prediction,
        )
        .await
    }

    ///
    /// Submits a snapshot of the current draft
    ///
    pub async fn submit_draft(&self) -> Result<InferenceResult, SubmissionError> {
        let profile = self.draft();
        self.submit_profile(&profile).await
    }

    ///
    /// Uploads a report to `/upload-report` and merges the recognised fields into the draft
    ///
    pub async fn submit_document(
        &self,
        document: UploadedDocument,
    ) -> Result<ExtractionResult, SubmissionError> {
        let extraction = self
            .submit(
                move || Ok(ServiceRequest::UploadReport(document)),
                service::parse_extraction,
                Outcome::Extraction,
            )
            .await?;

        let updated = self.lock_draft().merge_extracted(&extraction);
        info!(target: SUBMISSION, msg = "Report fields applied to profile", ?updated);

        Ok(extraction)
    }

    ///
    /// Uploads a report to `/predict-weekly`. The draft is not modified.
    ///
    pub async fn submit_weekly_plan(
        &self,
        document: UploadedDocument,
    ) -> Result<WeeklyPlan, SubmissionError> {
        self.submit(
            move || Ok(ServiceRequest::PredictWeekly(document)),
            service::parse_weekly_plan,
            Outcome::WeeklyPlan,
        )
        .await
    }

    pub fn draft(&self) -> PatientProfile {
        self.lock_draft().clone()
    }

    pub fn update_draft<F: FnOnce(&mut PatientProfile)>(&self, f: F) {
        f(&mut self.lock_draft());
    }

    pub fn state(&self) -> RequestState {
        self.lock_slot().state().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock_slot().state().is_submitting()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.lock_slot().state().outcome().cloned()
    }

    pub fn error(&self) -> Option<SubmissionError> {
        self.lock_slot().state().error().cloned()
    }

    async fn submit<R, B, P, W>(&self, build: B, parse: P, wrap: W) -> Result<R, SubmissionError>
    where
        R: Clone,
        B: FnOnce() -> Result<ServiceRequest, SubmissionError>,
        P: FnOnce(&RawResponse) -> Result<R, SubmissionError>,
        W: FnOnce(R) -> Outcome,
    {
        let (sequence, token) = self.lock_slot().begin();

        // Resets the loading state if this future is dropped before it finishes
        let _pending = Pending {
            slot: &self.slot,
            sequence,
        };

        let request = match build() {
            Ok(request) => request,
            Err(err) => {
                debug!(target: SUBMISSION, msg = "Submission rejected before sending", sequence, error = err.to_string());
                return self.finish(sequence, Err(err), wrap);
            }
        };

        let path = request.path();
        let endpoint = self.transport.endpoint(path);

        counter!(SUBMISSIONS_TOTAL, "path" => path).increment(1);
        debug!(target: SUBMISSION, msg = "Submitting", sequence, endpoint);

        let started = Instant::now();

        let response = tokio::select! {
            biased;

            _ = token.cancelled() => {
                debug!(target: SUBMISSION, msg = "Submission superseded", sequence);
                return Err(SubmissionError::Superseded);
            }

            response = tokio::time::timeout(self.timeout, self.transport.send(request)) => response,
        };

        histogram!(SUBMISSION_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        let result = match response {
            Ok(Ok(raw)) => {
                debug!(target: SUBMISSION, msg = "Response", sequence, status = raw.status);
                parse(&raw)
            }
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err(SubmissionError::NetworkUnavailable {
                endpoint,
                reason: format!("no response after {}ms", self.timeout.as_millis()),
            }),
        };

        self.finish(sequence, result, wrap)
    }

    fn finish<R, W>(
        &self,
        sequence: u64,
        result: Result<R, SubmissionError>,
        wrap: W,
    ) -> Result<R, SubmissionError>
    where
        R: Clone,
        W: FnOnce(R) -> Outcome,
    {
        let applied = self
            .lock_slot()
            .complete(sequence, result.clone().map(wrap));

        if !applied {
            counter!(STALE_RESPONSES_DISCARDED_TOTAL).increment(1);
            debug!(target: SUBMISSION, msg = "Discarded stale response", sequence);
            return Err(SubmissionError::Superseded);
        }

        if let Err(err) = &result {
            counter!(SUBMISSION_ERRORS_TOTAL, "kind" => err.kind()).increment(1);
            warn!(target: SUBMISSION, msg = "Submission failed", sequence, kind = err.kind(), error = err.to_string());
        }

        result
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_draft(&self) -> MutexGuard<'_, PatientProfile> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct Pending<'a> {
    slot: &'a Mutex<Slot>,
    sequence: u64,
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .abandon(self.sequence);
    }
}
