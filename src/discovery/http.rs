//! Reqwest-backed authority discovery against a service registry.

// self
use crate::{
	_prelude::*,
	discovery::{AuthorityDiscovery, DiscoveryFuture},
	error::DiscoveryError,
};

/// Resolves authorities by calling `GET {registry}/{service_key}`.
///
/// The registry must answer with a JSON object carrying the authority under `url`, e.g.
/// `{"url": "https://login.example.com/realms/app"}`. Any non-success status, malformed body,
/// or invalid URL is reported as a [`DiscoveryError`].
#[derive(Clone, Debug)]
pub struct HttpAuthorityDiscovery {
	client: reqwest::Client,
	registry: Url,
}
impl HttpAuthorityDiscovery {
	/// Creates a resolver for the provided registry base URL.
	pub fn new(registry: Url) -> Self {
		Self::with_client(reqwest::Client::default(), registry)
	}

	/// Reuses an existing reqwest client.
	pub fn with_client(client: reqwest::Client, registry: Url) -> Self {
		Self { client, registry: with_trailing_slash(registry) }
	}

	/// Registry lookup URL for a service key.
	pub fn lookup_url(&self, service_key: &str) -> Result<Url, DiscoveryError> {
		self.registry
			.join(service_key)
			.map_err(|source| DiscoveryError::InvalidAuthority { source })
	}
}
impl AuthorityDiscovery for HttpAuthorityDiscovery {
	fn resolve<'a>(&'a self, service_key: &'a str) -> DiscoveryFuture<'a> {
		Box::pin(async move {
			let url = self.lookup_url(service_key)?;
			let response = self.client.get(url).send().await?;
			let status = response.status();

			if !status.is_success() {
				return Err(DiscoveryError::Status { status: status.as_u16() });
			}

			let body = response.bytes().await?;
			let mut de = serde_json::Deserializer::from_slice(&body);
			let record: ServiceRecord = serde_path_to_error::deserialize(&mut de)
				.map_err(|source| DiscoveryError::Parse { source })?;

			Url::parse(&record.url).map_err(|source| DiscoveryError::InvalidAuthority { source })
		})
	}
}

#[derive(Deserialize)]
struct ServiceRecord {
	url: String,
}

fn with_trailing_slash(mut url: Url) -> Url {
	if !url.path().ends_with('/') {
		let path = format!("{}/", url.path());

		url.set_path(&path);
	}

	url
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn lookup_url_appends_the_service_key() {
		let discovery = HttpAuthorityDiscovery::new(
			Url::parse("https://registry.example.com/services")
				.expect("Registry fixture should parse."),
		);

		assert_eq!(
			discovery
				.lookup_url("identity-provider")
				.expect("Lookup URL should build.")
				.as_str(),
			"https://registry.example.com/services/identity-provider"
		);
	}
}
