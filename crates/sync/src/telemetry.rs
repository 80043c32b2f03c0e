//! Usage telemetry.
//!
//! Reporting is fire-and-forget: transport failures are logged at debug level
//! and never reach the pipeline.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::config::TelemetryConfig;

/// Event reported for sampled parse timings.
pub const PARSE_EVENT: &str = "parser.parsing";

/// Transport failure. Never surfaced past [`Telemetry`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("telemetry transport failed: {0}")]
pub struct TelemetryError(pub String);

/// Outbound telemetry channel.
pub trait TelemetryTransport: Send + Sync {
	/// Reports one event. Must not block.
	fn report(&self, event: &str, metadata: Option<Value>) -> Result<(), TelemetryError>;
}

/// Deterministic 1-in-N sampler.
///
/// The counter starts at N and is decremented on every call; the call that
/// brings it to zero samples and resets it to N. With N = 5 the 5th, 10th,
/// 15th, ... calls sample.
#[derive(Debug)]
pub struct ParseSampler {
	period: u32,
	remaining: AtomicU32,
}

impl ParseSampler {
	/// A period of 0 is treated as 1.
	pub fn new(period: u32) -> Self {
		let period = period.max(1);
		Self {
			period,
			remaining: AtomicU32::new(period),
		}
	}

	pub fn period(&self) -> u32 {
		self.period
	}

	pub fn should_sample(&self) -> bool {
		let previous = self
			.remaining
			.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |remaining| {
				Some(if remaining <= 1 { self.period } else { remaining - 1 })
			})
			.unwrap_or(self.period);
		previous <= 1
	}
}

/// Telemetry front end used by the pipeline and commands.
pub struct Telemetry {
	transport: Option<Arc<dyn TelemetryTransport>>,
	sampler: ParseSampler,
}

impl std::fmt::Debug for Telemetry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Telemetry")
			.field("enabled", &self.transport.is_some())
			.field("sampler", &self.sampler)
			.finish()
	}
}

impl Telemetry {
	/// Reporting through `transport`, unless disabled in `config`.
	pub fn new(transport: Arc<dyn TelemetryTransport>, config: &TelemetryConfig) -> Self {
		Self {
			transport: config.enabled.then_some(transport),
			sampler: ParseSampler::new(config.parse_sample_period),
		}
	}

	/// Never reports; parse sampling still counts.
	pub fn disabled() -> Self {
		Self {
			transport: None,
			sampler: ParseSampler::new(TelemetryConfig::default().parse_sample_period),
		}
	}

	pub fn report(&self, event: &str, metadata: Option<Value>) {
		let Some(transport) = &self.transport else {
			return;
		};
		if let Err(err) = transport.report(event, metadata) {
			debug!(event, error = %err, "telemetry dropped");
		}
	}

	/// `command:<name>` usage event.
	pub fn command(&self, name: &str) {
		self.report(&format!("command:{name}"), None);
	}

	/// Counts one reparse and reports its timing when sampled.
	pub fn record_parse(&self, line_count: u32, duration: Duration) -> bool {
		if !self.sampler.should_sample() {
			return false;
		}
		self.report(
			PARSE_EVENT,
			Some(json!({
				"linecount": line_count,
				"parseduration_ms": duration.as_secs_f64() * 1000.0,
			})),
		);
		true
	}
}

#[cfg(test)]
mod tests {
	use parking_lot::Mutex;
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn period_five_samples_fifth_and_tenth() {
		let sampler = ParseSampler::new(5);
		let sampled: Vec<usize> = (1..=12).filter(|_| sampler.should_sample()).collect();
		assert_eq!(sampled, vec![5, 10]);
	}

	#[test]
	fn period_one_samples_every_call() {
		let sampler = ParseSampler::new(1);
		assert!((0..4).all(|_| sampler.should_sample()));
		assert_eq!(ParseSampler::new(0).period(), 1);
	}

	proptest! {
		#[test]
		fn exactly_one_in_period(period in 1u32..50, calls in 0usize..500) {
			let sampler = ParseSampler::new(period);
			let hits: Vec<usize> = (1..=calls).filter(|_| sampler.should_sample()).collect();
			prop_assert_eq!(hits.len(), calls / period as usize);
			prop_assert!(hits.iter().all(|call| call % period as usize == 0));
		}
	}

	struct Failing;

	impl TelemetryTransport for Failing {
		fn report(&self, _event: &str, _metadata: Option<Value>) -> Result<(), TelemetryError> {
			Err(TelemetryError("offline".into()))
		}
	}

	#[derive(Default)]
	struct Recording(Mutex<Vec<String>>);

	impl TelemetryTransport for Recording {
		fn report(&self, event: &str, _metadata: Option<Value>) -> Result<(), TelemetryError> {
			self.0.lock().push(event.to_owned());
			Ok(())
		}
	}

	#[test]
	fn transport_failure_is_swallowed() {
		let telemetry = Telemetry::new(Arc::new(Failing), &TelemetryConfig::default());
		telemetry.command("jumpto");
		telemetry.report(PARSE_EVENT, None);
	}

	#[test]
	fn disabled_config_reports_nothing() {
		let recording = Arc::new(Recording::default());
		let config = TelemetryConfig {
			enabled: false,
			parse_sample_period: 1,
		};
		let telemetry = Telemetry::new(recording.clone(), &config);

		assert!(telemetry.record_parse(10, Duration::from_millis(3)));
		telemetry.command("livepreview");

		assert!(recording.0.lock().is_empty());
	}

	#[test]
	fn sampled_parse_is_reported() {
		let recording = Arc::new(Recording::default());
		let config = TelemetryConfig {
			enabled: true,
			parse_sample_period: 2,
		};
		let telemetry = Telemetry::new(recording.clone(), &config);

		assert!(!telemetry.record_parse(10, Duration::from_millis(3)));
		assert!(telemetry.record_parse(10, Duration::from_millis(3)));

		assert_eq!(*recording.0.lock(), vec![PARSE_EVENT.to_owned()]);
	}
}
