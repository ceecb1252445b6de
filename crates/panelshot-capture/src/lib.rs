//! Capture coordination against the external browser-automation worker.
//!
//! The coordinator serializes a JSON job from the validated manifest,
//! installs the worker's dependencies in the ephemeral project, invokes the
//! embedded Node worker script, parses its newline-delimited JSON event
//! stream into typed [`CaptureResult`]s, and relocates produced artifacts
//! into the plugin's own output tree. The worker's internal behaviour is a
//! black box behind the job-in / events-out contract.

mod error;
mod events;
mod job;
mod relocate;
mod worker;

pub use error::CaptureError;
pub use events::{CaptureResult, parse_events};
pub use job::{CaptureJob, build_job};
pub use relocate::relocate_results;
pub use worker::capture;
