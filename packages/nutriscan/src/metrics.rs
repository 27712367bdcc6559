use metrics::{describe_counter, describe_histogram, Unit};

// See https://prometheus.io/docs/practices/naming/
pub const SUBMISSIONS_TOTAL: &str = "nutriscan_submissions_total";
pub const SUBMISSION_ERRORS_TOTAL: &str = "nutriscan_submission_errors_total";
pub const SUBMISSION_DURATION_SECONDS: &str = "nutriscan_submission_duration_seconds";
pub const STALE_RESPONSES_DISCARDED_TOTAL: &str = "nutriscan_stale_responses_discarded_total";

///
/// Registers metric descriptions with whichever recorder the host application installed.
/// Without a recorder the metrics macros are no-ops.
///
pub fn describe() {
    describe_counter!(SUBMISSIONS_TOTAL, "Number of submissions sent to the service");
    describe_counter!(
        SUBMISSION_ERRORS_TOTAL,
        "Number of submissions that ended in an error, by kind"
    );
    describe_histogram!(
        SUBMISSION_DURATION_SECONDS,
        Unit::Seconds,
        "Duration of the service round trip"
    );
    describe_counter!(
        STALE_RESPONSES_DISCARDED_TOTAL,
        "Number of responses dropped because a newer submission had started"
    );
}
