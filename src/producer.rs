//! Inbound JSON endpoint helpers.
//!
//! A handler type opts in with an empty `impl Producer for MyHandler {}` and gets body parsing,
//! JSON responses, and structured error responses. Errors are returned as [`HttpError`] values;
//! the dispatch layer turns them into the response sent to the client with
//! [`HttpError::into_response`] or [`respond`].

// crates.io
use http::{HeaderValue, Request, Response, StatusCode, header::CONTENT_TYPE};
// self
use crate::_prelude::*;

/// Result type returned by JSON handlers.
pub type HandlerResult = Result<Response<String>, HttpError>;

/// Message sent when a request carries no body.
pub const NO_DATA_MESSAGE: &str = "No data provided";
/// Message sent when a request body is not usable JSON.
pub const MALFORMED_DATA_MESSAGE: &str = "Data not correctly formatted";

/// Body of an error response: `{"errorCode": <status>, "message": <text|null>}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
	/// HTTP status code, repeated in the body.
	#[serde(rename = "errorCode")]
	pub error_code: u16,
	/// Plain-text message.
	pub message: Option<String>,
}
impl From<ErrorPayload> for Value {
	fn from(payload: ErrorPayload) -> Self {
		serde_json::json!({ "errorCode": payload.error_code, "message": payload.message })
	}
}

/// Error response that short-circuits a handler.
///
/// This is control flow, not a failure: the wrapped response is what the client receives.
#[derive(Debug, ThisError)]
#[error("Handler short-circuited with HTTP {}.", .response.status())]
pub struct HttpError {
	response: Response<String>,
}
impl HttpError {
	/// Wraps a prepared response.
	pub fn new(response: Response<String>) -> Self {
		Self { response }
	}

	/// Status of the wrapped response.
	pub fn status(&self) -> StatusCode {
		self.response.status()
	}

	/// Borrows the wrapped response.
	pub fn response(&self) -> &Response<String> {
		&self.response
	}

	/// Decodes the error payload from the wrapped body, if it holds one.
	pub fn payload(&self) -> Option<ErrorPayload> {
		serde_json::from_str(self.response.body()).ok()
	}

	/// Unwraps the response to send.
	pub fn into_response(self) -> Response<String> {
		self.response
	}
}
impl From<HttpError> for Response<String> {
	fn from(err: HttpError) -> Self {
		err.into_response()
	}
}

/// Collapses a handler result into the response to send.
pub fn respond(result: HandlerResult) -> Response<String> {
	result.unwrap_or_else(HttpError::into_response)
}

/// JSON endpoint capability.
pub trait Producer {
	/// Reads the request body as JSON.
	///
	/// An empty body fails with 400 "No data provided". A body that does not parse, or parses to
	/// an empty value (`null`, `false`, `0`, `""`, `"0"`, `[]`, `{}`), fails with 400
	/// "Data not correctly formatted".
	fn get_json<B>(&self, request: &Request<B>) -> Result<Value, HttpError>
	where
		B: AsRef<[u8]>,
	{
		let body = AsRef::<[u8]>::as_ref(request.body());

		if body.is_empty() {
			return Err(self.http_error(StatusCode::BAD_REQUEST, Some(NO_DATA_MESSAGE)));
		}

		let data = serde_json::from_slice::<Value>(body).unwrap_or(Value::Null);

		if is_empty_value(&data) {
			return Err(self.http_error(StatusCode::BAD_REQUEST, Some(MALFORMED_DATA_MESSAGE)));
		}

		Ok(data)
	}

	/// Builds a JSON response with the given status.
	fn json(&self, data: impl Into<Value>, status: StatusCode) -> Response<String> {
		let mut response = Response::new(data.into().to_string());

		*response.status_mut() = status;
		response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		response
	}

	/// Builds the error response for `status`, using the status as `errorCode` too.
	fn http_error(&self, status: StatusCode, message: Option<&str>) -> HttpError {
		let payload =
			ErrorPayload { error_code: status.as_u16(), message: message.map(Into::into) };

		HttpError::new(self.json(payload, status))
	}
}

// Null, false, zero, `""`, `"0"` and empty containers count as empty.
fn is_empty_value(value: &Value) -> bool {
	match value {
		Value::Null => true,
		Value::Bool(flag) => !flag,
		Value::Number(number) => number.as_f64() == Some(0.0),
		Value::String(text) => text.is_empty() || text == "0",
		Value::Array(items) => items.is_empty(),
		Value::Object(map) => map.is_empty(),
	}
}
