use crate::domain::{ExtractionResult, InferenceResult, WeeklyPlan};
use crate::error::SubmissionError;
use tokio_util::sync::CancellationToken;

///
/// Result of a successful submission, by endpoint
///
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Prediction(InferenceResult),
    Extraction(ExtractionResult),
    WeeklyPlan(WeeklyPlan),
}

///
/// Idle -> Submitting -> Success | Failed
///
/// Holding a result and holding an error are mutually exclusive,
/// and starting a new submission discards both.
///
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestState {
    #[default]
    Idle,
    Submitting {
        sequence: u64,
    },
    Success(Outcome),
    Failed(SubmissionError),
}

impl RequestState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, RequestState::Submitting { .. })
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            RequestState::Success(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&SubmissionError> {
        match self {
            RequestState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

///
/// The single state slot owned by the client.
///
/// `latest` is the sequence number of the most recently issued submission.
/// Only that submission may write a terminal state.
///
#[derive(Debug, Default)]
pub(crate) struct Slot {
    latest: u64,
    state: RequestState,
    in_flight: Option<CancellationToken>,
}

impl Slot {
    ///
    /// Starts a new submission: cancels the one in flight, clears the previous
    /// result or error and hands out the next sequence number
    ///
    pub(crate) fn begin(&mut self) -> (u64, CancellationToken) {
        if let Some(previous) = self.in_flight.take() {
            previous.cancel();
        }

        self.latest += 1;
        self.state = RequestState::Submitting {
            sequence: self.latest,
        };

        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());

        (self.latest, token)
    }

    ///
    /// Applies a finished submission.
    /// Returns false, leaving the slot untouched, if a newer submission has started.
    ///
    pub(crate) fn complete(
        &mut self,
        sequence: u64,
        result: Result<Outcome, SubmissionError>,
    ) -> bool {
        if sequence != self.latest {
            return false;
        }

        self.state = match result {
            Ok(outcome) => RequestState::Success(outcome),
            Err(err) => RequestState::Failed(err),
        };
        self.in_flight = None;

        true
    }

    ///
    /// Marks a submission that was dropped before finishing.
    /// No-op if it already completed or has been replaced.
    ///
    pub(crate) fn abandon(&mut self, sequence: u64) {
        if self.state == (RequestState::Submitting { sequence }) {
            self.complete(sequence, Err(SubmissionError::Cancelled));
        }
    }

    pub(crate) fn state(&self) -> &RequestState {
        &self.state
    }
}
