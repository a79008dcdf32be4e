//! Session state and the mapping from engine events onto state transitions.

// self
use crate::{
	_prelude::*,
	auth::{Credential, RawUser},
	engine::EngineEvent,
	obs::{self, TransitionCause},
};

/// Authentication state held by the session manager.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
	/// No usable credential.
	#[default]
	Unauthenticated,
	/// A credential built from an unexpired provider user.
	Authenticated(Credential),
}
impl SessionState {
	/// Credential held in this state, if any.
	pub fn credential(&self) -> Option<&Credential> {
		match self {
			SessionState::Authenticated(credential) => Some(credential),
			SessionState::Unauthenticated => None,
		}
	}

	/// Returns `true` if a credential is held.
	pub fn is_authenticated(&self) -> bool {
		matches!(self, SessionState::Authenticated(_))
	}
}

/// Next state plus the reason it was chosen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Transition {
	pub(crate) next: SessionState,
	pub(crate) cause: TransitionCause,
}
impl Transition {
	pub(crate) fn signed_out(cause: TransitionCause) -> Self {
		Self { next: SessionState::Unauthenticated, cause }
	}

	/// A loaded user only authenticates when it is unexpired and maps onto a credential.
	pub(crate) fn loaded(user: &RawUser, now: OffsetDateTime) -> Self {
		if user.is_expired_at(now) {
			return Self::signed_out(TransitionCause::UserLoadedExpired);
		}

		match Credential::from_raw_user(user) {
			Ok(credential) => Self {
				next: SessionState::Authenticated(credential),
				cause: TransitionCause::UserLoaded,
			},
			Err(err) => {
				obs::log_credential_rejected(&err);

				Self::signed_out(TransitionCause::CredentialRejected)
			},
		}
	}

	pub(crate) fn from_event(event: &EngineEvent, now: OffsetDateTime) -> Self {
		match event {
			EngineEvent::UserLoaded(user) => Self::loaded(user, now),
			EngineEvent::SilentRenewError(err) => {
				obs::log_silent_renew_failure(err);

				Self::signed_out(TransitionCause::SilentRenewError)
			},
			EngineEvent::AccessTokenExpired =>
				Self::signed_out(TransitionCause::AccessTokenExpired),
			EngineEvent::UserUnloaded => Self::signed_out(TransitionCause::UserUnloaded),
			EngineEvent::UserSignedOut => Self::signed_out(TransitionCause::UserSignedOut),
		}
	}
}
