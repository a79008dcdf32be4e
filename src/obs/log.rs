//! Structured log events for failures the session absorbs instead of returning.

// self
use crate::{
	_prelude::*,
	auth::CredentialError,
	error::EngineError,
	obs::{Delivery, TransitionCause},
};

/// Logs a setup failure that was absorbed into a logged-out state.
pub fn log_setup_failure(error: &Error) {
	#[cfg(feature = "tracing")]
	tracing::error!(%error, "Session setup failed; continuing signed out.");

	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

/// Logs a background token renewal failure.
pub fn log_silent_renew_failure(error: &EngineError) {
	#[cfg(feature = "tracing")]
	tracing::error!(%error, "Silent token renewal failed.");

	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

/// Logs a raw user that could not be mapped onto a credential.
pub fn log_credential_rejected(error: &CredentialError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(%error, "Identity provider returned an unusable user.");

	#[cfg(not(feature = "tracing"))]
	let _ = error;
}

/// Logs a redirect callback that could not be completed.
pub fn log_callback_failure(callback: &'static str, error: &EngineError) {
	#[cfg(feature = "tracing")]
	tracing::warn!(callback, %error, "Redirect callback was not completed.");

	#[cfg(not(feature = "tracing"))]
	let _ = (callback, error);
}

/// Logs a failed callback completion when the other callback handled the page.
pub fn log_callback_skipped(callback: &'static str, error: &EngineError) {
	#[cfg(feature = "tracing")]
	tracing::debug!(callback, %error, "Redirect callback did not apply to this response.");

	#[cfg(not(feature = "tracing"))]
	let _ = (callback, error);
}

/// Logs an applied transition.
pub fn log_transition(cause: TransitionCause, delivery: Delivery, authenticated: bool) {
	#[cfg(feature = "tracing")]
	tracing::debug!(
		cause = cause.as_str(),
		delivery = delivery.as_str(),
		authenticated,
		"Session transition applied."
	);

	#[cfg(not(feature = "tracing"))]
	let _ = (cause, delivery, authenticated);
}
