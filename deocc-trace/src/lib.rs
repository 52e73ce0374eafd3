//! CSV ingestion of recorded transaction traces: the harness's external
//! collaborator for turning a trace file into the `deocc_core::Block`s its
//! strategy drivers replay.

mod error;
mod loader;

pub use error::TraceError;
pub use loader::load_trace;
