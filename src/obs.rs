//! Observability helpers for the session lifecycle.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `oidc_session.setup` with a `stage` field,
//!   plus events for absorbed failures and applied transitions.
//! - Enable `metrics` to increment the `oidc_session_transition_total` counter for every
//!   applied transition, labeled by `cause` + `delivery`.

mod log;
mod metrics;
mod tracing;

pub use log::*;
pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Why the session state changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionCause {
	/// The engine loaded an unexpired user.
	UserLoaded,
	/// The engine loaded a user that had already expired.
	UserLoadedExpired,
	/// The loaded user could not be mapped onto a credential.
	CredentialRejected,
	/// The access token expired.
	AccessTokenExpired,
	/// The engine removed the stored user.
	UserUnloaded,
	/// The user signed out at the identity provider.
	UserSignedOut,
	/// Background renewal failed.
	SilentRenewError,
	/// Setup found no usable user on page load.
	InitialUserAbsent,
	/// Setup failed before a user could be queried.
	SetupFailed,
}
impl TransitionCause {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			TransitionCause::UserLoaded => "user_loaded",
			TransitionCause::UserLoadedExpired => "user_loaded_expired",
			TransitionCause::CredentialRejected => "credential_rejected",
			TransitionCause::AccessTokenExpired => "access_token_expired",
			TransitionCause::UserUnloaded => "user_unloaded",
			TransitionCause::UserSignedOut => "user_signed_out",
			TransitionCause::SilentRenewError => "silent_renew_error",
			TransitionCause::InitialUserAbsent => "initial_user_absent",
			TransitionCause::SetupFailed => "setup_failed",
		}
	}
}
impl Display for TransitionCause {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Whether listeners saw a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Delivery {
	/// Listeners were notified.
	Delivered,
	/// A redirect callback was in flight, so listeners were not notified.
	Suppressed,
}
impl Delivery {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Delivery::Delivered => "delivered",
			Delivery::Suppressed => "suppressed",
		}
	}
}
impl Display for Delivery {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
