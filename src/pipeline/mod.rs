//! Pipelines for the three event entry points.
//!
//! Each inbound trigger (message, button action, reaction) runs its own
//! short-circuiting pipeline over the shared pending-post store:
//! 1. ingest — message → queued post + confirmation prompt
//! 2. confirm — button click → confirmed/cancelled post
//! 3. approve — reaction → counter increment → publish at quorum

pub mod approve;
pub mod confirm;
pub mod executor;
pub mod ingest;

pub use executor::{Pipeline, PipelineRun, Stage, StageOutcome};
