// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by gateway flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("oauth2_gateway.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
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

/// Emits a debug event for an exchange stage transition.
pub fn trace_stage(kind: FlowKind, from: &'static str, to: &'static str) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(flow = kind.as_str(), from, to, "exchange stage advanced");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, from, to);
	}
}

/// Emits a debug event for a redirect hop taken (or refused) by the pipeline.
pub fn trace_redirect(status: u16, hop: u32, max: u32, location: Option<&str>) {
	#[cfg(feature = "tracing")]
	{
		if hop > max {
			tracing::debug!(status, hop, max, "redirect budget exhausted; returning response");
		} else {
			tracing::debug!(status, hop, max, location, "following redirect");
		}
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (status, hop, max, location);
	}
}
