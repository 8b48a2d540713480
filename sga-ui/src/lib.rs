//! sga-ui library - Score Grade Analysis client
//!
//! Submits a score to the remote analysis service, consumes the incremental
//! progress feed for the job, reconciles its events into stable per-channel
//! progress state, and normalizes the final result payload into uniform
//! display primitives (confidence markers, timeline ticks).

pub mod client;
pub mod controller;
pub mod interpreter;
pub mod normalize;
pub mod registry;
pub mod score;
pub mod stream;
pub mod surface;
