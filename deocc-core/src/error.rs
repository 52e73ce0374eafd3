//! Fatal, block-aborting error conditions. Transient OCC conflicts are never
//! represented as errors (see `occ.rs`), so this enum is small by design.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The TDG constructor's layering loop terminated without ranking every
    /// vertex. Under the documented algorithm this cannot happen; surfacing
    /// it as an error (rather than panicking) lets the strategy driver abort
    /// just the offending block and continue with the next one, per the
    /// harness's failure semantics.
    #[error("TDG construction ranked {ranked} of {total} vertices before terminating")]
    UnrankedVertices { ranked: usize, total: usize },
}
