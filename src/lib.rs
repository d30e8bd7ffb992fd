//! Stage 1 of the compound curation pipeline: resolve compound names to
//! PubChem CIDs and SMILES, then filter to a clean dataset.

pub mod app;
pub mod common;
pub mod config;
pub mod infra;
pub mod observability;
pub mod pipeline;

pub use common::error::{CuratorError, LookupError, Result};
pub use common::types::{CleanRecord, CompoundRecord, Resolution, ResolutionResult, ResolutionStatus, RunSummary};
