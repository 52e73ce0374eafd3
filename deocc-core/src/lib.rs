//! Scheduling core shared by the three concurrency strategies measured by
//! the benchmark harness: the state store, graph primitives, conflict-graph
//! and transaction-dependency-graph construction, the OCC attempt loop and
//! wave executor built on top of them, and the strategy drivers that wire it
//! all together per block.

pub mod conflict;
pub mod error;
pub mod fvs;
pub mod graph;
pub mod occ;
pub mod partition;
pub mod scheduler;
pub mod state;
pub mod strategy;
pub mod tdg;
pub mod transaction;

pub use error::CoreError;
pub use graph::AdjMatrix;
pub use state::StateStore;
pub use strategy::{run_deocc, run_occ_wsi, run_serial, BlockTiming};
pub use transaction::{Address, Block, Transaction};
