//! Transition counters exported through the `metrics` facade.

// self
use crate::obs::{Delivery, TransitionCause};

/// Records an applied transition via the global metrics recorder (when enabled).
pub fn record_transition(cause: TransitionCause, delivery: Delivery) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oidc_session_transition_total",
			"cause" => cause.as_str(),
			"delivery" => delivery.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (cause, delivery);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn record_transition_without_recorder_is_harmless() {
		record_transition(TransitionCause::UserUnloaded, Delivery::Suppressed);
	}
}
