#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use bearer_relay::{_preludet::*, auth::CredentialKind, config::ClientConfig, store::MemoryStore};

const COLLECTION: &str = "/api/transactions/invoice/";

fn client(server: &MockServer) -> TestClient {
	build_reqwest_test_client(
		ClientConfig::new(server.base_url()).expect("Mock server URL should parse."),
		MemoryStore::default()
			.with_token(CredentialKind::Access, "A1")
			.with_token(CredentialKind::Refresh, "R1"),
	)
}

#[tokio::test]
async fn crud_calls_carry_the_bearer_credential() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let TestClient { client, .. } = client(&server);
	let list = server
		.mock_async(|when, then| {
			when.method(GET)
				.path(COLLECTION)
				.query_param("state", "pending")
				.header("authorization", "Bearer A1");
			then.status(200).json_body(json!([{ "id": 1 }]));
		})
		.await;
	let get = server
		.mock_async(|when, then| {
			when.method(GET).path("/api/transactions/invoice/1/").header("authorization", "Bearer A1");
			then.status(200).json_body(json!({ "id": 1 }));
		})
		.await;
	let create = server
		.mock_async(|when, then| {
			when.method(POST).path(COLLECTION).json_body(json!({ "customer": 9 }));
			then.status(201).json_body(json!({ "id": 2, "customer": 9 }));
		})
		.await;
	let update = server
		.mock_async(|when, then| {
			when.method(PUT).path("/api/transactions/invoice/2/").json_body(json!({ "customer": 10 }));
			then.status(200).json_body(json!({ "id": 2, "customer": 10 }));
		})
		.await;
	let remove = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/transactions/invoice/2/");
			then.status(204);
		})
		.await;
	let resource = client.resource(COLLECTION);
	let listed: Value = resource.list([("state", "pending")]).await?;
	let fetched: Value = resource.get(1).await?;
	let created: Value = resource.create(&json!({ "customer": 9 })).await?;
	let updated: Value = resource.update(2, &json!({ "customer": 10 })).await?;

	resource.remove(2).await?;

	assert_eq!(listed, json!([{ "id": 1 }]));
	assert_eq!(fetched["id"], 1);
	assert_eq!(created["id"], 2);
	assert_eq!(updated["customer"], 10);

	list.assert_calls_async(1).await;
	get.assert_calls_async(1).await;
	create.assert_calls_async(1).await;
	update.assert_calls_async(1).await;
	remove.assert_calls_async(1).await;

	Ok(())
}

#[tokio::test]
async fn actions_resolve_under_the_collection() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let TestClient { client, .. } = client(&server);
	let pay = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/transactions/invoice/5/pay/");
			then.status(200).json_body(json!({ "state": "paid" }));
		})
		.await;
	let status = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/transactions/invoice/5/update_state/")
				.json_body(json!({ "state": "void" }));
			then.status(200).json_body(json!({ "state": "void" }));
		})
		.await;
	let purge = server
		.mock_async(|when, then| {
			when.method(DELETE).path("/api/transactions/invoice/purge/");
			then.status(204);
		})
		.await;
	let resource = client.resource("api/transactions/invoice");
	let paid: Value = resource.action(5, "pay").await?.json()?;
	let voided: Value =
		resource.action_with(5, "update_state", &json!({ "state": "void" })).await?.json()?;
	let purged = resource.collection_action(bearer_relay::http::Method::DELETE, "purge").await?;

	assert_eq!(paid["state"], "paid");
	assert_eq!(voided["state"], "void");
	assert_eq!(purged.status, StatusCode::NO_CONTENT);

	pay.assert_calls_async(1).await;
	status.assert_calls_async(1).await;
	purge.assert_calls_async(1).await;

	Ok(())
}
