// self
use crate::{
	_prelude::*,
	obs::{Stage, StageOutcome},
};

/// How a token cache lookup was served.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CacheLookup {
	/// Served from the cache without I/O.
	Hit,
	/// Served by a caller that found the slot filled after waiting on the miss guard.
	Coalesced,
	/// Required a credential exchange.
	Miss,
}
impl CacheLookup {
	/// Returns a stable label suitable for metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CacheLookup::Hit => "hit",
			CacheLookup::Coalesced => "coalesced",
			CacheLookup::Miss => "miss",
		}
	}
}
impl Display for CacheLookup {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Increments `callkey_bridge_stage_total{stage, outcome}` (when enabled).
pub fn record_stage_outcome(stage: Stage, outcome: StageOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"callkey_bridge_stage_total",
			"stage" => stage.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	let _ = (stage, outcome);
}

/// Increments `callkey_bridge_token_cache_total{lookup}` (when enabled).
pub fn record_cache_lookup(lookup: CacheLookup) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("callkey_bridge_token_cache_total", "lookup" => lookup.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	let _ = lookup;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recording_without_a_recorder_is_a_noop() {
		record_stage_outcome(Stage::Authenticate, StageOutcome::Failure);

		for lookup in [CacheLookup::Hit, CacheLookup::Coalesced, CacheLookup::Miss] {
			record_cache_lookup(lookup);
		}
	}

	#[test]
	fn cache_lookup_labels_are_stable() {
		assert_eq!(CacheLookup::Coalesced.to_string(), "coalesced");
		assert_eq!(CacheLookup::Miss.as_str(), "miss");
	}
}
