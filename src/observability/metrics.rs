//! Metric names and recording helpers.
//!
//! Calls go through the `metrics` facade; with no recorder installed they are no-ops.

use std::fmt;

/// All metric names used in the crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    LookupRequestsSuccess,
    LookupRequestsError,
    LookupRequestDuration,

    ResolveCandidateAttempts,
    ResolveRecordsResolved,
    ResolveRecordsFailed,

    BatchRecordsTotal,
    BatchRecordsClean,
    BatchDuration,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::LookupRequestsSuccess => "curator_lookup_requests_success_total",
            MetricName::LookupRequestsError => "curator_lookup_requests_error_total",
            MetricName::LookupRequestDuration => "curator_lookup_request_duration_seconds",
            MetricName::ResolveCandidateAttempts => "curator_resolve_candidate_attempts_total",
            MetricName::ResolveRecordsResolved => "curator_resolve_records_resolved_total",
            MetricName::ResolveRecordsFailed => "curator_resolve_records_failed_total",
            MetricName::BatchRecordsTotal => "curator_batch_records_total",
            MetricName::BatchRecordsClean => "curator_batch_records_clean_total",
            MetricName::BatchDuration => "curator_batch_duration_seconds",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier service requests
pub mod lookup {
    use super::MetricName;

    pub fn request_success(endpoint: &'static str) {
        ::metrics::counter!(MetricName::LookupRequestsSuccess.as_str(), "endpoint" => endpoint).increment(1);
    }

    pub fn request_error(endpoint: &'static str, error_type: &'static str) {
        ::metrics::counter!(MetricName::LookupRequestsError.as_str(),
            "endpoint" => endpoint,
            "error_type" => error_type
        )
        .increment(1);
    }

    pub fn request_duration(endpoint: &'static str, secs: f64) {
        ::metrics::histogram!(MetricName::LookupRequestDuration.as_str(), "endpoint" => endpoint).record(secs);
    }
}

/// Per-record resolution
pub mod resolve {
    use super::MetricName;
    use crate::common::types::ResolutionStatus;

    pub fn candidate_attempted() {
        ::metrics::counter!(MetricName::ResolveCandidateAttempts.as_str()).increment(1);
    }

    pub fn record_finished(status: ResolutionStatus) {
        if status.is_success() {
            ::metrics::counter!(MetricName::ResolveRecordsResolved.as_str(), "status" => status.as_str()).increment(1);
        } else {
            ::metrics::counter!(MetricName::ResolveRecordsFailed.as_str()).increment(1);
        }
    }
}

/// Whole batch runs
pub mod batch {
    use super::MetricName;

    pub fn finished(total: usize, clean: usize, secs: f64) {
        ::metrics::counter!(MetricName::BatchRecordsTotal.as_str()).increment(total as u64);
        ::metrics::counter!(MetricName::BatchRecordsClean.as_str()).increment(clean as u64);
        ::metrics::histogram!(MetricName::BatchDuration.as_str()).record(secs);
    }
}
