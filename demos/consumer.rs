//! Demonstrates a consumer that fetches a client-credentials token once and reuses it for
//! several calls against a mock API.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::{Map, Value, json};
// self
use api_helpers::{
	consumer::{ApiRequest, Consumer, StaticHost},
	http::decode_json,
	oauth::OAuthOptions,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2/authorise");
			then.status(200).header("content-type", "application/json").body(
				"{\"access_token\":\"demo-access\",\"token_type\":\"bearer\",\"expires_in\":900}",
			);
		})
		.await;
	let api_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/v1/orders").header("authorization", "Bearer demo-access");
			then.status(200).header("content-type", "application/json").body("{\"id\":42}");
		})
		.await;
	let host = StaticHost::new(server.base_url(), "demo-client", "super-secret")
		.with_oauth_options(OAuthOptions::new().with_scope("orders.write"));
	let consumer = Consumer::new(host);
	let mut order = Map::new();

	order.insert("sku".into(), json!("kettle"));
	order.insert("quantity".into(), json!(2));

	for _ in 0..2 {
		let response = consumer
			.call(ApiRequest::new("/v1/orders").with_method("POST").with_data(order.clone()))
			.await?;
		let created: Value = decode_json(&response)?;

		println!("Created order: {created}.");
	}

	token_mock.assert_async().await;
	api_mock.assert_calls_async(2).await;

	Ok(())
}
