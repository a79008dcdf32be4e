//! Static session configuration and the key-value source it is read from.

// self
use crate::{
	_prelude::*,
	auth::{self, ScopeSet},
	error::ConfigError,
};

/// Service key used to discover the identity provider when none is configured.
pub const DEFAULT_AUTHORITY_SERVICE_KEY: &str = "identity-provider";

/// Configuration key holding the OAuth client identifier.
pub const CLIENT_ID_KEY: &str = "auth.client_id";
/// Configuration key holding the redirect path.
pub const REDIRECT_PATH_KEY: &str = "auth.redirect_path";
/// Optional configuration key holding space-delimited scopes.
pub const SCOPES_KEY: &str = "auth.scopes";
/// Optional configuration key holding the discovery service key.
pub const AUTHORITY_SERVICE_KEY_KEY: &str = "auth.authority_service_key";

/// Synchronous, read-only configuration lookup.
pub trait ConfigProvider {
	/// Returns the value stored under `key`, if any.
	fn value(&self, key: &str) -> Option<String>;
}
impl ConfigProvider for HashMap<String, String> {
	fn value(&self, key: &str) -> Option<String> {
		self.get(key).cloned()
	}
}
impl ConfigProvider for BTreeMap<String, String> {
	fn value(&self, key: &str) -> Option<String> {
		self.get(key).cloned()
	}
}

/// Validated configuration consumed by the session manager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSessionConfig")]
pub struct SessionConfig {
	/// OAuth client identifier registered with the identity provider.
	pub client_id: String,
	/// Absolute path the identity provider redirects back to.
	pub redirect_path: String,
	/// Scopes requested from the identity provider.
	pub scopes: ScopeSet,
	/// Well-known key handed to authority discovery.
	pub authority_service_key: String,
}
impl SessionConfig {
	/// Creates a new builder for the provided client identifier.
	pub fn builder(client_id: impl Into<String>) -> SessionConfigBuilder {
		SessionConfigBuilder::new(client_id)
	}

	/// Reads and validates the configuration from a key-value provider.
	pub fn from_provider(provider: &dyn ConfigProvider) -> Result<Self, ConfigError> {
		let client_id =
			provider.value(CLIENT_ID_KEY).ok_or(ConfigError::MissingKey { key: CLIENT_ID_KEY })?;
		let redirect_path = provider
			.value(REDIRECT_PATH_KEY)
			.ok_or(ConfigError::MissingKey { key: REDIRECT_PATH_KEY })?;
		let mut builder = Self::builder(client_id).redirect_path(redirect_path);

		if let Some(scopes) = provider.value(SCOPES_KEY) {
			builder = builder.scopes(ScopeSet::from_str(&scopes)?);
		}
		if let Some(key) = provider.value(AUTHORITY_SERVICE_KEY_KEY) {
			builder = builder.authority_service_key(key);
		}

		builder.build()
	}

	/// Returns `true` if `path` is the configured redirect target.
	pub fn is_redirect_path(&self, path: &str) -> bool {
		path == self.redirect_path
	}

	/// Builds `${origin}${redirect_path}`.
	pub fn redirect_url(&self, origin: &Url) -> Result<Url, ConfigError> {
		let url = origin
			.join(&self.redirect_path)
			.map_err(|source| ConfigError::InvalidRedirect { source })?;

		if url.origin() != origin.origin() {
			return Err(ConfigError::ForeignRedirectPath { path: self.redirect_path.clone() });
		}

		Ok(url)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.client_id.is_empty() || self.client_id.chars().any(char::is_whitespace) {
			return Err(ConfigError::InvalidClientId);
		}
		if !self.redirect_path.starts_with('/') {
			return Err(ConfigError::RelativeRedirectPath { path: self.redirect_path.clone() });
		}
		if self.redirect_path == "/" {
			return Err(ConfigError::RootRedirectPath);
		}
		// `//host` and `/\host` are protocol-relative once joined onto the origin.
		if self.redirect_path[1..].starts_with(['/', '\\']) {
			return Err(ConfigError::ForeignRedirectPath { path: self.redirect_path.clone() });
		}
		if !self.scopes.contains("openid") {
			return Err(ConfigError::MissingOpenIdScope);
		}
		if self.authority_service_key.trim().is_empty() {
			return Err(ConfigError::EmptyServiceKey);
		}

		Ok(())
	}
}

/// Builder for [`SessionConfig`] values.
#[derive(Debug)]
pub struct SessionConfigBuilder {
	client_id: String,
	redirect_path: Option<String>,
	scopes: Option<ScopeSet>,
	authority_service_key: Option<String>,
}
impl SessionConfigBuilder {
	fn new(client_id: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			redirect_path: None,
			scopes: None,
			authority_service_key: None,
		}
	}

	/// Sets the redirect path.
	pub fn redirect_path(mut self, path: impl Into<String>) -> Self {
		self.redirect_path = Some(path.into());

		self
	}

	/// Overrides the requested scopes.
	pub fn scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = Some(scopes);

		self
	}

	/// Overrides the discovery service key.
	pub fn authority_service_key(mut self, key: impl Into<String>) -> Self {
		self.authority_service_key = Some(key.into());

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<SessionConfig, ConfigError> {
		let redirect_path =
			self.redirect_path.ok_or(ConfigError::MissingKey { key: REDIRECT_PATH_KEY })?;
		let config = SessionConfig {
			client_id: self.client_id,
			redirect_path,
			scopes: self.scopes.unwrap_or_else(auth::default_scopes),
			authority_service_key: self
				.authority_service_key
				.unwrap_or_else(|| DEFAULT_AUTHORITY_SERVICE_KEY.to_owned()),
		};

		config.validate()?;

		Ok(config)
	}
}

#[derive(Deserialize)]
struct RawSessionConfig {
	client_id: String,
	redirect_path: String,
	#[serde(default)]
	scopes: Option<ScopeSet>,
	#[serde(default)]
	authority_service_key: Option<String>,
}
impl TryFrom<RawSessionConfig> for SessionConfig {
	type Error = ConfigError;

	fn try_from(raw: RawSessionConfig) -> Result<Self, Self::Error> {
		let mut builder = SessionConfig::builder(raw.client_id).redirect_path(raw.redirect_path);

		if let Some(scopes) = raw.scopes {
			builder = builder.scopes(scopes);
		}
		if let Some(key) = raw.authority_service_key {
			builder = builder.authority_service_key(key);
		}

		builder.build()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn provider(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
	}

	#[test]
	fn builder_applies_defaults() {
		let config = SessionConfig::builder("spa-client")
			.redirect_path("/auth/callback")
			.build()
			.expect("Minimal configuration should build.");

		assert_eq!(config.scopes, auth::default_scopes());
		assert_eq!(config.authority_service_key, DEFAULT_AUTHORITY_SERVICE_KEY);
		assert!(config.is_redirect_path("/auth/callback"));
		assert!(!config.is_redirect_path("/"));
	}

	#[test]
	fn builder_rejects_invalid_values() {
		let err = SessionConfig::builder("")
			.redirect_path("/cb")
			.build()
			.expect_err("Empty client id must be rejected.");

		assert_eq!(err, ConfigError::InvalidClientId);

		let err = SessionConfig::builder("client")
			.redirect_path("cb")
			.build()
			.expect_err("Relative redirect path must be rejected.");

		assert!(matches!(err, ConfigError::RelativeRedirectPath { .. }));

		let err = SessionConfig::builder("client")
			.redirect_path("/")
			.build()
			.expect_err("Root redirect path must be rejected.");

		assert_eq!(err, ConfigError::RootRedirectPath);

		let err = SessionConfig::builder("client")
			.build()
			.expect_err("Missing redirect path must be rejected.");

		assert_eq!(err, ConfigError::MissingKey { key: REDIRECT_PATH_KEY });

		let err = SessionConfig::builder("client")
			.redirect_path("/cb")
			.authority_service_key("  ")
			.build()
			.expect_err("Blank service key must be rejected.");

		assert_eq!(err, ConfigError::EmptyServiceKey);
	}

	#[test]
	fn from_provider_reads_all_keys() {
		let source = provider(&[
			(CLIENT_ID_KEY, "spa-client"),
			(REDIRECT_PATH_KEY, "/callback"),
			(SCOPES_KEY, "openid profile"),
			(AUTHORITY_SERVICE_KEY_KEY, "sso"),
		]);
		let config = SessionConfig::from_provider(&source).expect("Provider config should load.");

		assert_eq!(config.client_id, "spa-client");
		assert_eq!(config.redirect_path, "/callback");
		assert_eq!(config.scopes.normalized(), "openid profile");
		assert_eq!(config.authority_service_key, "sso");
	}

	#[test]
	fn from_provider_reports_missing_keys() {
		let err = SessionConfig::from_provider(&provider(&[(REDIRECT_PATH_KEY, "/callback")]))
			.expect_err("Missing client id must be reported.");

		assert_eq!(err, ConfigError::MissingKey { key: CLIENT_ID_KEY });

		let err = SessionConfig::from_provider(&provider(&[
			(CLIENT_ID_KEY, "client"),
			(REDIRECT_PATH_KEY, "/callback"),
			(SCOPES_KEY, "   "),
		]))
		.expect_err("Whitespace-only scopes must be rejected.");

		assert!(matches!(err, ConfigError::InvalidScope(_)));
	}

	#[test]
	fn deserialization_runs_validation() {
		let config: SessionConfig =
			serde_json::from_str(r#"{ "client_id": "spa", "redirect_path": "/cb" }"#)
				.expect("Valid JSON config should deserialize.");

		assert_eq!(config.client_id, "spa");
		assert!(
			serde_json::from_str::<SessionConfig>(r#"{ "client_id": "spa", "redirect_path": "cb" }"#)
				.is_err()
		);
	}

	#[test]
	fn scopes_must_request_an_identity_token() {
		let err = SessionConfig::from_provider(&provider(&[
			(CLIENT_ID_KEY, "client"),
			(REDIRECT_PATH_KEY, "/callback"),
			(SCOPES_KEY, ""),
		]))
		.expect_err("Empty scopes must be rejected.");

		assert_eq!(err, ConfigError::MissingOpenIdScope);

		let err = SessionConfig::builder("client")
			.redirect_path("/callback")
			.scopes(ScopeSet::new(["profile", "email"]).expect("Scope fixture should be valid."))
			.build()
			.expect_err("Scopes without openid must be rejected.");

		assert_eq!(err, ConfigError::MissingOpenIdScope);
		assert!(
			serde_json::from_str::<SessionConfig>(
				r#"{ "client_id": "spa", "redirect_path": "/cb", "scopes": [] }"#
			)
			.is_err()
		);
	}

	#[test]
	fn redirect_path_cannot_leave_the_origin() {
		for path in ["//evil.example/cb", "/\\evil.example/cb"] {
			let err = SessionConfig::builder("client")
				.redirect_path(path)
				.build()
				.expect_err("Protocol-relative redirect paths must be rejected.");

			assert_eq!(err, ConfigError::ForeignRedirectPath { path: path.to_owned() });
		}

		let config = SessionConfig {
			redirect_path: "//evil.example/cb".into(),
			..SessionConfig::builder("client")
				.redirect_path("/cb")
				.build()
				.expect("Configuration fixture should build.")
		};
		let origin = Url::parse("https://app.example.com").expect("Origin should parse.");

		assert!(matches!(
			config.redirect_url(&origin),
			Err(ConfigError::ForeignRedirectPath { .. })
		));
	}

	#[test]
	fn redirect_url_joins_origin_and_path() {
		let config = SessionConfig::builder("spa")
			.redirect_path("/auth/callback")
			.build()
			.expect("Configuration should build.");
		let origin = Url::parse("https://app.example.com").expect("Origin should parse.");

		assert_eq!(
			config.redirect_url(&origin).expect("Redirect URL should build.").as_str(),
			"https://app.example.com/auth/callback"
		);
	}
}
