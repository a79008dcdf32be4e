//! Authority discovery contracts and built-in resolvers.
//!
//! Setup resolves the identity provider's authority URL exactly once, from a well-known
//! service key, through an [`AuthorityDiscovery`] implementation. [`StaticDiscovery`] keeps a
//! fixed key-to-URL table in memory; [`HttpAuthorityDiscovery`] (feature `reqwest`) asks a
//! service registry over HTTP.

#[cfg(feature = "reqwest")] pub mod http;

#[cfg(feature = "reqwest")] pub use http::HttpAuthorityDiscovery;

// self
use crate::{_prelude::*, error::DiscoveryError};

/// Boxed future returned by [`AuthorityDiscovery::resolve`].
pub type DiscoveryFuture<'a> = Pin<Box<dyn Future<Output = Result<Url, DiscoveryError>> + 'a + Send>>;

/// Resolves the identity provider's authority URL from a service key.
pub trait AuthorityDiscovery
where
	Self: Send + Sync,
{
	/// Looks up the authority registered under `service_key`.
	fn resolve<'a>(&'a self, service_key: &'a str) -> DiscoveryFuture<'a>;
}

/// In-memory resolver backed by a fixed key-to-authority table.
#[derive(Clone, Debug, Default)]
pub struct StaticDiscovery(Arc<RwLock<HashMap<String, Url>>>);
impl StaticDiscovery {
	/// Creates a resolver that knows a single service.
	pub fn single(service_key: impl Into<String>, authority: Url) -> Self {
		let discovery = Self::default();

		discovery.register(service_key, authority);

		discovery
	}

	/// Registers or replaces the authority for a service key.
	pub fn register(&self, service_key: impl Into<String>, authority: Url) {
		self.0.write().insert(service_key.into(), authority);
	}

	/// Removes a service key, so later lookups fail.
	pub fn forget(&self, service_key: &str) -> Option<Url> {
		self.0.write().remove(service_key)
	}
}
impl AuthorityDiscovery for StaticDiscovery {
	fn resolve<'a>(&'a self, service_key: &'a str) -> DiscoveryFuture<'a> {
		let found = self.0.read().get(service_key).cloned();

		Box::pin(async move {
			found.ok_or_else(|| DiscoveryError::UnknownService { key: service_key.to_owned() })
		})
	}
}
