// crates.io
use httpmock::prelude::*;
use serde_json::{Value, json};
// self
use api_helpers::{
	consumer::{ApiRequest, Consumer, StaticHost},
	error::{ConfigError, Error, TokenError},
	http::{RequestOptions, decode_json},
};

const CLIENT_ID: &str = "clientid";
const CLIENT_SECRET: &str = "clientsecret";
const TOKEN_PATH: &str = "/oauth2/authorise";

fn host(server: &MockServer) -> StaticHost {
	StaticHost::new(server.base_url(), CLIENT_ID, CLIENT_SECRET)
}

fn data(value: Value) -> serde_json::Map<String, Value> {
	match value {
		Value::Object(map) => map,
		other => panic!("Expected a JSON object, got {other}."),
	}
}

async fn mock_token<'a>(server: &'a MockServer, token: &str) -> httpmock::Mock<'a> {
	server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(200).header("content-type", "application/json").json_body(json!({
				"access_token": token,
				"token_type": "bearer",
				"expires_in": 3600
			}));
		})
		.await
}

#[tokio::test]
async fn post_sends_data_as_json_with_bearer_token() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "tok").await;
	let api = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/items")
				.header("authorization", "Bearer tok")
				.header("content-type", "application/json")
				.json_body(json!({ "name": "widget", "tags": ["a", "b"] }));
			then.status(200).header("content-type", "application/json").body("{\"id\":7}");
		})
		.await;
	let consumer = Consumer::new(host(&server));
	let response = consumer
		.call(
			ApiRequest::new("/items")
				.with_method("POST")
				.with_data(data(json!({ "name": "widget", "tags": ["a", "b"] }))),
		)
		.await
		.expect("POST call should succeed.");
	let body: Value = decode_json(&response).expect("Response body should decode.");

	assert_eq!(body, json!({ "id": 7 }));

	token.assert_calls_async(1).await;
	api.assert_calls_async(1).await;
}

#[tokio::test]
async fn put_and_patch_send_data_as_json_regardless_of_case() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server, "tok").await;
	let put = server
		.mock_async(|when, then| {
			when.method(PUT).path("/items/1").json_body(json!({ "name": "renamed" }));
			then.status(200).body("{}");
		})
		.await;
	let patch = server
		.mock_async(|when, then| {
			when.method(PATCH).path("/items/1").json_body(json!({ "name": "renamed" }));
			then.status(200).body("{}");
		})
		.await;
	let consumer = Consumer::new(host(&server));

	for method in ["put", "Patch"] {
		consumer
			.call(
				ApiRequest::new("/items/1")
					.with_method(method)
					.with_data(data(json!({ "name": "renamed" }))),
			)
			.await
			.expect("Body-carrying call should succeed.");
	}

	put.assert_calls_async(1).await;
	patch.assert_calls_async(1).await;
}

#[tokio::test]
async fn get_sends_data_as_query_parameters() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server, "tok").await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/items")
				.query_param("page", "2")
				.query_param("active", "1")
				.header("authorization", "Bearer tok");
			then.status(200).body("[]");
		})
		.await;
	let consumer = Consumer::new(host(&server));

	consumer
		.call(ApiRequest::new("/items").with_data(data(json!({ "page": 2, "active": true }))))
		.await
		.expect("GET call should succeed.");

	api.assert_calls_async(1).await;
}

#[tokio::test]
async fn caller_headers_are_kept_next_to_auth_headers() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server, "tok").await;
	let api = server
		.mock_async(|when, then| {
			when.method(DELETE)
				.path("/items/9")
				.header("x-request-id", "req-1")
				.header("authorization", "Bearer tok");
			then.status(200).body("{}");
		})
		.await;
	let consumer = Consumer::new(host(&server));

	consumer
		.call(
			ApiRequest::new("/items/9")
				.with_method("DELETE")
				.with_options(RequestOptions::new().with_header("X-Request-Id", "req-1")),
		)
		.await
		.expect("DELETE call should succeed.");

	api.assert_calls_async(1).await;
}

#[tokio::test]
async fn token_is_fetched_once_per_consumer() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "reused").await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/ping").header("authorization", "Bearer reused");
			then.status(200).body("{}");
		})
		.await;
	let consumer = Consumer::new(host(&server));

	for _ in 0..3 {
		consumer.call(ApiRequest::new("/ping")).await.expect("Ping should succeed.");
	}

	token.assert_calls_async(1).await;
	api.assert_calls_async(3).await;
	assert_eq!(
		consumer.cached_token().map(|token| token.expose().to_owned()),
		Some("reused".to_owned())
	);
}

#[tokio::test]
async fn concurrent_calls_share_a_single_token_fetch() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "shared").await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/ping");
			then.status(200).body("{}");
		})
		.await;
	let consumer = Consumer::new(host(&server));
	let (first, second) = tokio::join!(
		consumer.call(ApiRequest::new("/ping")),
		consumer.call(ApiRequest::new("/ping")),
	);

	first.expect("First concurrent call should succeed.");
	second.expect("Second concurrent call should succeed.");

	token.assert_calls_async(1).await;
	api.assert_calls_async(2).await;
}

#[tokio::test]
async fn non_200_statuses_collapse_into_api_connection_error() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server, "tok").await;

	for (path, status) in [("/missing", 404), ("/down", 503), ("/created", 201)] {
		server
			.mock_async(|when, then| {
				when.method(GET).path(path);
				then.status(status).body("{\"error\":\"nope\"}");
			})
			.await;
	}

	let consumer = Consumer::new(host(&server));

	for path in ["/missing", "/down", "/created"] {
		let err = consumer
			.call(ApiRequest::new(path))
			.await
			.expect_err("Non-200 status should fail the call.");

		assert!(matches!(err, Error::ApiConnection), "Unexpected error for {path}: {err:?}.");
		assert_eq!(err.code(), Some(500));
		assert_eq!(err.to_string(), "There was an error connecting to the API");
	}
}

#[tokio::test]
async fn anonymous_host_never_requests_a_token() {
	let server = MockServer::start_async().await;
	let token = mock_token(&server, "unused").await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/public");
			then.status(200).body("{}");
		})
		.await;
	let consumer = Consumer::new(host(&server).without_token());

	consumer.call(ApiRequest::new("/public")).await.expect("Anonymous call should succeed.");

	token.assert_calls_async(0).await;
	api.assert_calls_async(1).await;
	assert!(consumer.cached_token().is_none());
}

#[tokio::test]
async fn rejected_grant_surfaces_before_the_api_call() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path(TOKEN_PATH);
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_client\",\"error_description\":\"bad secret\"}");
		})
		.await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/items");
			then.status(200).body("{}");
		})
		.await;
	let consumer = Consumer::new(host(&server));
	let err = consumer
		.call(ApiRequest::new("/items"))
		.await
		.expect_err("Rejected grant should fail the call.");

	match err {
		Error::Token(TokenError::Rejected { grant, error, description, status }) => {
			assert_eq!(grant, "client_credentials");
			assert_eq!(error, "invalid_client");
			assert_eq!(description.as_deref(), Some("bad secret"));
			assert_eq!(status, Some(401));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	token.assert_calls_async(1).await;
	api.assert_calls_async(0).await;
	assert!(consumer.cached_token().is_none());
}

#[tokio::test]
async fn body_methods_without_data_send_an_empty_body() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server, "tok").await;
	let api = server
		.mock_async(|when, then| {
			when.method(POST).path("/items/refresh").header("authorization", "Bearer tok").body("");
			then.status(200).body("{}");
		})
		.await;
	let consumer = Consumer::new(host(&server));
	let response = consumer
		.call(ApiRequest::new("/items/refresh").with_method("POST"))
		.await
		.expect("POST without data should succeed.");

	assert_eq!(response.status(), 200);

	api.assert_calls_async(1).await;
}

#[tokio::test]
async fn delete_sends_data_as_query_parameters() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server, "tok").await;
	let api = server
		.mock_async(|when, then| {
			when.method(DELETE)
				.path("/items/9")
				.query_param("force", "1")
				.query_param("reason", "stale entry")
				.body("");
			then.status(200).body("{}");
		})
		.await;
	let consumer = Consumer::new(host(&server));

	consumer
		.call(
			ApiRequest::new("/items/9")
				.with_method("delete")
				.with_data(data(json!({ "force": true, "reason": "stale entry" }))),
		)
		.await
		.expect("DELETE with data should succeed.");

	api.assert_calls_async(1).await;
}

#[tokio::test]
async fn null_headers_option_still_carries_the_bearer_token() {
	let server = MockServer::start_async().await;
	let _token = mock_token(&server, "tok").await;
	let api = server
		.mock_async(|when, then| {
			when.method(GET).path("/x").header("authorization", "Bearer tok");
			then.status(200).body("{}");
		})
		.await;
	let consumer = Consumer::new(host(&server));
	let mut options = RequestOptions::new();

	options.set(RequestOptions::HEADERS, Value::Null);
	consumer
		.call(ApiRequest::new("/x").with_options(options))
		.await
		.expect("Call with null headers should still authenticate.");

	api.assert_calls_async(1).await;
}

#[tokio::test]
async fn malformed_headers_fail_before_sending() {
	let server = MockServer::start_async().await;
	let api = server
		.mock_async(|when, then| {
			when.path("/x");
			then.status(200).body("{}");
		})
		.await;
	let consumer = Consumer::new(host(&server).without_token());
	let mut options = RequestOptions::new();

	options.set(RequestOptions::HEADERS, json!("Authorization: Bearer forged"));

	let err = consumer
		.call(ApiRequest::new("/x").with_options(options))
		.await
		.expect_err("Scalar headers should be rejected.");

	assert!(matches!(err, Error::Config(ConfigError::InvalidHeader { .. })), "{err:?}");

	api.assert_calls_async(0).await;
}
