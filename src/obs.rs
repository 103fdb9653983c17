//! Optional observability helpers for the bridge pipeline.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `callkey_bridge.stage` with a `stage`
//!   field, plus log events for cache hits/misses and swallowed failures.
//! - Enable `metrics` to increment the `callkey_bridge_stage_total` counter for every
//!   attempt/success/failure, labeled by `stage` + `outcome`.
//!   Token cache lookups increment `callkey_bridge_token_cache_total`, labeled by `lookup`
//!   (`hit`, `coalesced`, `miss`).

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Pipeline stages observed by the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Call key extraction from the notification.
	ParseEvent,
	/// Credential exchange against the authentication endpoint.
	Authenticate,
	/// Business REST call.
	Invoke,
	/// Whole invocation, from notification to response.
	Handle,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::ParseEvent => "parse_event",
			Stage::Authenticate => "authenticate",
			Stage::Invoke => "invoke",
			Stage::Handle => "handle",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageOutcome {
	/// Entry to a stage.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl StageOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			StageOutcome::Attempt => "attempt",
			StageOutcome::Success => "success",
			StageOutcome::Failure => "failure",
		}
	}
}
impl Display for StageOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records success or failure of `stage` from its result.
pub fn record_result<T, E>(stage: Stage, result: &Result<T, E>) {
	match result {
		Ok(_) => record_stage_outcome(stage, StageOutcome::Success),
		Err(_) => record_stage_outcome(stage, StageOutcome::Failure),
	}
}
