//! Session-level error types shared across configuration, discovery, and the engine seam.

// self
use crate::_prelude::*;

/// Session-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical session error exposed by public APIs.
///
/// Only [`Error::NotReady`] and engine hand-off failures escape the manager; every other
/// variant is absorbed into a logged-out transition during setup or event handling.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Authority discovery failed.
	#[error(transparent)]
	Discovery(#[from] DiscoveryError),
	/// Protocol engine failure.
	#[error(transparent)]
	Engine(#[from] EngineError),
	/// Raw user could not be mapped onto a credential.
	#[error("Unable to build a credential.")]
	Credential(
		#[from]
		#[source]
		crate::auth::CredentialError,
	),

	/// An operation that needs the attached engine ran before setup attached it.
	#[error("Session manager is not ready; `{operation}` requires a completed setup.")]
	NotReady {
		/// Public operation that was called too early.
		operation: &'static str,
	},
}

/// Configuration and validation failures.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// A mandatory configuration key was absent.
	#[error("Configuration key `{key}` is missing.")]
	MissingKey {
		/// Missing key.
		key: &'static str,
	},
	/// Client identifier was empty or contained whitespace.
	#[error("Client identifier must be non-empty and contain no whitespace.")]
	InvalidClientId,
	/// Redirect path must be absolute.
	#[error("Redirect path `{path}` must start with `/`.")]
	RelativeRedirectPath {
		/// Offending path.
		path: String,
	},
	/// Redirect path cannot be the application root.
	#[error("Redirect path cannot be the application root.")]
	RootRedirectPath,
	/// Redirect path would resolve against another host.
	#[error("Redirect path `{path}` leaves the application origin.")]
	ForeignRedirectPath {
		/// Offending path.
		path: String,
	},
	/// Requested scopes must include `openid`.
	#[error("Requested scopes must include `openid`.")]
	MissingOpenIdScope,
	/// Discovery key was empty.
	#[error("Authority service key cannot be empty.")]
	EmptyServiceKey,
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Redirect URI could not be assembled from the origin and path.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Authority discovery failures.
#[derive(Debug, ThisError)]
pub enum DiscoveryError {
	/// No authority is registered under the key.
	#[error("No authority is registered for service key `{key}`.")]
	UnknownService {
		/// Key that was looked up.
		key: String,
	},
	/// Discovery endpoint answered with a non-success status.
	#[error("Discovery endpoint returned HTTP {status}.")]
	Status {
		/// HTTP status code.
		status: u16,
	},
	/// Discovery endpoint responded with malformed JSON.
	#[error("Discovery endpoint returned malformed JSON.")]
	Parse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Discovered authority is not a valid URL.
	#[error("Discovered authority is not a valid URL.")]
	InvalidAuthority {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Transport failure (DNS, TCP, TLS).
	#[error("Network error occurred while discovering the authority.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl DiscoveryError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<reqwest::Error> for DiscoveryError {
	fn from(e: reqwest::Error) -> Self {
		Self::network(e)
	}
}

/// Failures raised by a protocol engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum EngineError {
	/// The engine could not be constructed or attached.
	#[error("Protocol engine could not be attached: {message}.")]
	Attach {
		/// Human-readable error payload.
		message: String,
	},
	/// The engine reported a protocol-level failure (e.g. silent renew).
	#[error("Protocol engine failure: {message}.")]
	Protocol {
		/// Human-readable error payload.
		message: String,
	},
	/// A redirect callback could not be completed.
	#[error("Redirect callback failed: {message}.")]
	Callback {
		/// Human-readable error payload.
		message: String,
	},
}
