//! Trace I/O failures: surfaced to the caller and abort that invocation's
//! trace load. Never retried: a malformed trace is a caller error, not a
//! transient condition.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace file {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("malformed execution-cost column at record {record} of {path}: {value:?}")]
    MalformedCost {
        path: String,
        record: usize,
        value: String,
    },
}
