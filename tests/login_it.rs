#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use bearer_relay::{
	_preludet::*,
	auth::{Credential, CredentialKind, RouteDecision, Session},
	config::ClientConfig,
	store::MemoryStore,
};

fn config(server: &MockServer) -> ClientConfig {
	ClientConfig::new(server.url("/api/"))
		.expect("Mock server URL should parse.")
		.with_login_route("/signin")
}

#[tokio::test]
async fn login_stores_both_credentials() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let TestClient { client, store, navigator } =
		build_reqwest_test_client(config(&server), MemoryStore::default());
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/token/")
				.json_body(json!({ "username": "admin", "password": "hunter2" }));
			then.status(200).json_body(json!({ "access": "A1", "refresh": "R1" }));
		})
		.await;

	assert_eq!(client.session().await?, Session::Anonymous);
	assert_eq!(client.guard().await?, RouteDecision::Redirect("/signin".into()));

	let credential = client.login("admin", "hunter2").await?;

	token.assert_calls_async(1).await;

	assert_eq!(credential, Credential::new("A1", "R1"));
	assert_eq!(store.peek(CredentialKind::Access).map(|t| t.expose().to_owned()), Some("A1".into()));
	assert_eq!(
		store.peek(CredentialKind::Refresh).map(|t| t.expose().to_owned()),
		Some("R1".into())
	);
	assert_eq!(client.session().await?, Session::Authenticated);
	assert_eq!(client.guard().await?, RouteDecision::Proceed);
	assert_eq!(navigator.count(), 0);

	Ok(())
}

#[tokio::test]
async fn login_sends_no_bearer_header() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let TestClient { client, .. } = build_reqwest_test_client(
		config(&server),
		MemoryStore::default().with_token(CredentialKind::Access, "stale"),
	);
	let with_bearer = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/").header_exists("authorization");
			then.status(500);
		})
		.await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/");
			then.status(200).json_body(json!({ "access": "A1", "refresh": "R1" }));
		})
		.await;

	client.login("admin", "hunter2").await?;

	with_bearer.assert_calls_async(0).await;
	token.assert_calls_async(1).await;

	Ok(())
}

#[tokio::test]
async fn rejected_login_leaves_store_untouched() {
	let server = MockServer::start_async().await;
	let TestClient { client, store, navigator } =
		build_reqwest_test_client(config(&server), MemoryStore::default());
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/");
			then.status(401).json_body(json!({ "detail": "No active account found." }));
		})
		.await;
	let err = client.login("admin", "wrong").await.expect_err("Bad credentials should fail.");

	token.assert_calls_async(1).await;

	match err {
		Error::Authentication { status, body } => {
			assert_eq!(status, 401);
			assert!(body.contains("No active account"));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert_eq!(navigator.count(), 0);
	assert!(store.is_empty());
}

#[tokio::test]
async fn logout_clears_store_and_navigates() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let TestClient { client, store, navigator } = build_reqwest_test_client(
		config(&server),
		MemoryStore::default()
			.with_token(CredentialKind::Access, "A1")
			.with_token(CredentialKind::Refresh, "R1"),
	);

	assert!(client.session().await?.is_authenticated());

	client.logout().await;

	assert!(store.is_empty());
	assert_eq!(navigator.routes(), vec!["/signin".to_owned()]);
	assert_eq!(client.teardown_count(), 1);
	assert_eq!(client.session().await?, Session::Anonymous);

	Ok(())
}
