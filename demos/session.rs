//! Walks a session through login, a silent renewal after an expired access credential, and
//! logout, against a local mock backend.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use bearer_relay::{
	client::ApiClient,
	config::ClientConfig,
	reqwest::Client,
	store::{CredentialStore, MemoryStore},
	teardown::Navigator,
	transport::ReqwestTransport,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let login = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/");
			then.status(200).json_body(json!({ "access": "demo-access-1", "refresh": "demo-refresh" }));
		})
		.await;
	let expired = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/transactions/invoice/")
				.header("authorization", "Bearer demo-access-1");
			then.status(401).json_body(json!({ "detail": "Token expired." }));
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/token/refresh/");
			then.status(200).json_body(json!({ "access": "demo-access-2" }));
		})
		.await;
	let invoices = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/transactions/invoice/")
				.header("authorization", "Bearer demo-access-2");
			then.status(200).json_body(json!([{ "id": 1, "state": "pending" }]));
		})
		.await;
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let navigator: Arc<dyn Navigator> = Arc::new(|route: &str| println!("Navigating to {route}."));
	let transport = ReqwestTransport::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	);
	let client = ApiClient::builder(ClientConfig::new(server.url("/api"))?)
		.transport(Arc::new(transport))
		.store(store)
		.navigator(navigator)
		.build()?;

	client.login("demo", "demo-password").await?;

	println!("Session after login: {}.", client.session().await?);

	let listed: serde_json::Value =
		client.resource("/transactions/invoice/").list::<_, _, &str, &str>([]).await?;

	println!("Invoices: {listed}.");
	println!("Renewals performed: {}.", client.renewal_metrics().successes());

	client.logout().await;

	println!("Session after logout: {}.", client.session().await?);

	login.assert_async().await;
	expired.assert_async().await;
	refresh.assert_async().await;
	invoices.assert_async().await;

	Ok(())
}
