//! Protocol engine contracts and the in-process engine used for tests and demos.
//!
//! The engine owns redirect mechanics, token renewal timers, and raw session storage. The
//! session layer only talks to it through [`EngineFactory`] (construction) and
//! [`ProtocolEngine`] (five lifecycle events, two redirect commands, one user query, and two
//! callback-completion entry points).

pub mod memory;

pub use memory::MemoryEngine;

// crates.io
use oauth2::{ClientId, RedirectUrl, ResponseType};
// self
use crate::{
	_prelude::*,
	auth::{RawUser, ScopeSet},
	config::SessionConfig,
	error::{ConfigError, EngineError},
};

/// Response type requesting both an identity token and an access token.
pub const IMPLICIT_RESPONSE_TYPE: &str = "id_token token";

/// Boxed future returned by engine operations.
pub type EngineFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, EngineError>> + 'a + Send>>;

/// Callback invoked for every event of the subscribed kind.
pub type EngineHandler = Arc<dyn Fn(&EngineEvent) + Send + Sync>;

/// Lifecycle event kinds raised by a protocol engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EngineEventKind {
	/// A user session was loaded or renewed.
	UserLoaded,
	/// Background token renewal failed.
	SilentRenewError,
	/// The access token reached its expiry.
	AccessTokenExpired,
	/// The stored user session was removed.
	UserUnloaded,
	/// The user signed out at the identity provider.
	UserSignedOut,
}
impl EngineEventKind {
	/// Every kind, in the order the session manager subscribes to them.
	pub const ALL: [EngineEventKind; 5] = [
		EngineEventKind::UserLoaded,
		EngineEventKind::SilentRenewError,
		EngineEventKind::AccessTokenExpired,
		EngineEventKind::UserUnloaded,
		EngineEventKind::UserSignedOut,
	];

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			EngineEventKind::UserLoaded => "user_loaded",
			EngineEventKind::SilentRenewError => "silent_renew_error",
			EngineEventKind::AccessTokenExpired => "access_token_expired",
			EngineEventKind::UserUnloaded => "user_unloaded",
			EngineEventKind::UserSignedOut => "user_signed_out",
		}
	}
}
impl Display for EngineEventKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Lifecycle event raised by a protocol engine, with its payload.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
	/// A user session was loaded or renewed.
	UserLoaded(RawUser),
	/// Background token renewal failed.
	SilentRenewError(EngineError),
	/// The access token reached its expiry.
	AccessTokenExpired,
	/// The stored user session was removed.
	UserUnloaded,
	/// The user signed out at the identity provider.
	UserSignedOut,
}
impl EngineEvent {
	/// Kind of this event.
	pub fn kind(&self) -> EngineEventKind {
		match self {
			EngineEvent::UserLoaded(_) => EngineEventKind::UserLoaded,
			EngineEvent::SilentRenewError(_) => EngineEventKind::SilentRenewError,
			EngineEvent::AccessTokenExpired => EngineEventKind::AccessTokenExpired,
			EngineEvent::UserUnloaded => EngineEventKind::UserUnloaded,
			EngineEvent::UserSignedOut => EngineEventKind::UserSignedOut,
		}
	}
}

/// Handle returned by [`ProtocolEngine::subscribe`] and consumed by
/// [`ProtocolEngine::unsubscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Configuration handed to [`EngineFactory::attach`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineSettings {
	/// Identity provider authority.
	pub authority: Url,
	/// OAuth client identifier.
	pub client_id: ClientId,
	/// Redirect target for interactive sign-in.
	pub redirect_uri: RedirectUrl,
	/// Redirect target for silent renewal.
	pub silent_redirect_uri: RedirectUrl,
	/// Requested response type.
	pub response_type: ResponseType,
	/// Requested scopes.
	pub scope: ScopeSet,
}
impl EngineSettings {
	/// Derives engine settings from the session configuration, the discovered authority, and
	/// the application's origin.
	pub fn new(config: &SessionConfig, authority: Url, origin: &Url) -> Result<Self, ConfigError> {
		let redirect = config.redirect_url(origin)?;

		Ok(Self {
			authority,
			client_id: ClientId::new(config.client_id.clone()),
			redirect_uri: RedirectUrl::from_url(redirect.clone()),
			silent_redirect_uri: RedirectUrl::from_url(redirect),
			response_type: ResponseType::new(IMPLICIT_RESPONSE_TYPE.to_owned()),
			scope: config.scopes.clone(),
		})
	}

	/// Space-delimited scope string for the authorize request.
	pub fn scope_string(&self) -> String {
		self.scope.normalized()
	}
}

/// Attachment surface of a redirect-based protocol engine.
pub trait ProtocolEngine
where
	Self: Send + Sync,
{
	/// Registers `handler` for events of `kind`.
	fn subscribe(&self, kind: EngineEventKind, handler: EngineHandler) -> SubscriptionId;

	/// Removes a registration; unknown identifiers are ignored.
	fn unsubscribe(&self, id: SubscriptionId);

	/// Starts the sign-in redirect. The page navigates away on success.
	fn sign_in_redirect(&self) -> Result<(), EngineError>;

	/// Starts the sign-out redirect. The page navigates away on success.
	fn sign_out_redirect(&self) -> Result<(), EngineError>;

	/// Returns the user stored by the engine, if any.
	fn current_user(&self) -> EngineFuture<'_, Option<RawUser>>;

	/// Processes a sign-in response on the redirect page.
	fn complete_sign_in_redirect(&self) -> EngineFuture<'_, ()>;

	/// Processes a sign-out response on the redirect page.
	fn complete_sign_out_redirect(&self) -> EngineFuture<'_, ()>;
}

/// Builds and attaches a protocol engine for the provided settings.
pub trait EngineFactory
where
	Self: Send + Sync,
{
	/// Constructs the engine.
	fn attach(&self, settings: EngineSettings) -> EngineFuture<'_, Arc<dyn ProtocolEngine>>;
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn settings_share_one_redirect_target() {
		let config = SessionConfig::builder("spa-client")
			.redirect_path("/auth/callback")
			.build()
			.expect("Configuration fixture should build.");
		let settings = EngineSettings::new(
			&config,
			Url::parse("https://login.example.com/realms/app")
				.expect("Authority fixture should parse."),
			&Url::parse("https://app.example.com").expect("Origin fixture should parse."),
		)
		.expect("Engine settings should build.");

		assert_eq!(settings.client_id.as_str(), "spa-client");
		assert_eq!(settings.redirect_uri.as_str(), "https://app.example.com/auth/callback");
		assert_eq!(settings.redirect_uri, settings.silent_redirect_uri);
		assert_eq!(settings.response_type.as_str(), "id_token token");
		assert!(settings.scope_string().contains("profile"));
		assert!(settings.scope_string().contains("organization"));
	}

	#[test]
	fn event_kinds_match_payloads() {
		assert_eq!(EngineEvent::UserUnloaded.kind(), EngineEventKind::UserUnloaded);
		assert_eq!(
			EngineEvent::SilentRenewError(EngineError::Protocol { message: "timeout".into() })
				.kind(),
			EngineEventKind::SilentRenewError
		);
		assert_eq!(EngineEventKind::ALL.len(), 5);
		assert_eq!(EngineEventKind::AccessTokenExpired.to_string(), "access_token_expired");
	}
}
