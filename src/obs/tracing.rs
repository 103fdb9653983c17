// self
use crate::{_prelude::*, event::BusinessId, obs::Stage};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedStage<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedStage<F> = F;

/// A span builder used by pipeline stages.
#[derive(Clone, Debug)]
pub struct StageSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl StageSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: Stage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"callkey_bridge.stage",
				stage = stage.as_str(),
				business_id = tracing::field::Empty
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Tags the span with the call key once it is known.
	pub fn record_business_id(&self, business_id: &BusinessId) {
		#[cfg(feature = "tracing")]
		{
			self.span.record("business_id", business_id.as_str());
		}
		#[cfg(not(feature = "tracing"))]
		let _ = business_id;
	}

	/// Enters the span for synchronous sections.
	pub fn entered(self) -> StageSpanGuard {
		#[cfg(feature = "tracing")]
		{
			StageSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			StageSpanGuard {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedStage<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// RAII guard returned by [`StageSpan::entered`].
pub struct StageSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for StageSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("StageSpanGuard(..)")
	}
}

/// Logs a failure that the bridge swallows instead of returning.
pub fn log_swallowed_failure(err: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::error!(
			error = %err,
			status = err.status(),
			transient = err.is_transient(),
			body = ?err.body(),
			"invocation failed"
		);
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = err;
	}
}
