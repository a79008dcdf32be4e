#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use url::Url;
// self
use oidc_session::{
	AuthorityDiscovery, MemoryEngine, MemoryNavigator, SessionConfig, SessionManager,
	discovery::HttpAuthorityDiscovery, error::DiscoveryError, reqwest,
};

// Accepts the self-signed certificate served by `httpmock`.
fn test_reqwest_client() -> reqwest::Client {
	reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.build()
		.expect("Failed to build insecure Reqwest client for tests.")
}

fn discovery(server: &MockServer) -> HttpAuthorityDiscovery {
	HttpAuthorityDiscovery::with_client(
		test_reqwest_client(),
		Url::parse(&server.url("/services")).expect("Mock registry URL should parse."),
	)
}

#[tokio::test]
async fn registry_record_resolves_to_the_authority() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/services/identity-provider");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"url\":\"https://login.example.com/realms/app\",\"ttl\":300}");
		})
		.await;
	let authority = discovery(&server)
		.resolve("identity-provider")
		.await
		.expect("Registered service should resolve.");

	assert_eq!(authority.as_str(), "https://login.example.com/realms/app");

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn non_success_status_is_reported() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/services/identity-provider");
			then.status(404);
		})
		.await;
	let err = discovery(&server)
		.resolve("identity-provider")
		.await
		.expect_err("Missing service should fail.");

	assert!(matches!(err, DiscoveryError::Status { status: 404 }));
}

#[tokio::test]
async fn malformed_record_reports_the_failing_path() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/services/identity-provider");
			then.status(200).header("content-type", "application/json").body("{\"url\":42}");
		})
		.await;
	let err = discovery(&server)
		.resolve("identity-provider")
		.await
		.expect_err("Malformed record should fail.");

	match err {
		DiscoveryError::Parse { source } => assert_eq!(source.path().to_string(), "url"),
		other => panic!("Unexpected discovery error: {other:?}."),
	}
}

#[tokio::test]
async fn invalid_authority_url_is_reported() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/services/identity-provider");
			then.status(200).body("{\"url\":\"not a url\"}");
		})
		.await;
	let err = discovery(&server)
		.resolve("identity-provider")
		.await
		.expect_err("Relative authority should fail.");

	assert!(matches!(err, DiscoveryError::InvalidAuthority { .. }));
}

#[tokio::test]
async fn session_setup_uses_http_discovery() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/services/sso");
			then.status(200).body("{\"url\":\"https://sso.example.com/\"}");
		})
		.await;
	let config = SessionConfig::builder("spa-client")
		.redirect_path("/callback")
		.authority_service_key("sso")
		.build()
		.expect("Session configuration should build.");
	let engine = MemoryEngine::default();
	let manager = SessionManager::new(
		config,
		Arc::new(discovery(&server)),
		Arc::new(engine.clone()),
		Arc::new(MemoryNavigator::new(
			Url::parse("https://app.example.com/").expect("Location fixture should parse."),
		)),
	);

	manager.start().await;

	let settings = engine.settings().expect("Engine should be attached.");

	assert_eq!(settings.authority.as_str(), "https://sso.example.com/");
	assert!(manager.sign_in().is_ok());
}
