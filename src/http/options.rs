//! Per-request transport options and their recursive merge.

// self
use crate::_prelude::*;

/// Transport options applied to a single API request.
///
/// A free-form JSON object, so hosts can pass configuration through unchanged. Recognized keys
/// are `headers`, `query`, `json`, `body`, and `timeout` (seconds). Anything else is carried along
/// but ignored by [`ApiClient`](crate::http::ApiClient).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestOptions(JsonMap<String, Value>);
impl RequestOptions {
	/// Option key holding request headers.
	pub const HEADERS: &'static str = "headers";
	/// Option key holding query parameters.
	pub const QUERY: &'static str = "query";
	/// Option key holding a JSON body.
	pub const JSON: &'static str = "json";
	/// Option key holding a raw string body.
	pub const BODY: &'static str = "body";
	/// Option key holding the request timeout in seconds.
	pub const TIMEOUT: &'static str = "timeout";

	/// Creates an empty option set.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a header, keeping any value already present for the same name.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		let mut headers = JsonMap::new();

		headers.insert(name.into(), Value::String(value.into()));

		let mut patch = JsonMap::new();

		patch.insert(Self::HEADERS.into(), Value::Object(headers));
		self.merge_recursive(Self(patch));

		self
	}

	/// Sets the per-request timeout.
	pub fn with_timeout(mut self, seconds: f64) -> Self {
		if let Some(value) = serde_json::Number::from_f64(seconds) {
			self.0.insert(Self::TIMEOUT.into(), Value::Number(value));
		}

		self
	}

	/// Inserts an option, replacing any previous value under the same key.
	pub fn set(&mut self, key: impl Into<String>, value: Value) {
		self.0.insert(key.into(), value);
	}

	/// Returns the option stored under `key`.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Returns true when no option is set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Borrows the underlying mapping.
	pub fn as_map(&self) -> &JsonMap<String, Value> {
		&self.0
	}

	/// Merges `other` into `self` recursively.
	///
	/// Nested objects merge key by key and keep their order. When both sides hold a value for the
	/// same key and neither is an object, the values are collected into a list (left first), so an
	/// injected header is sent alongside a caller-supplied one instead of replacing it. When only
	/// one side is an object its named keys survive and the other side lands under the next free
	/// numeric key.
	pub fn merge_recursive(&mut self, other: RequestOptions) {
		merge_maps(&mut self.0, other.0);
	}
}
impl From<JsonMap<String, Value>> for RequestOptions {
	fn from(map: JsonMap<String, Value>) -> Self {
		Self(map)
	}
}

// String keys merge, index keys append at the next free index.
fn merge_maps(left: &mut JsonMap<String, Value>, right: JsonMap<String, Value>) {
	for (key, value) in right {
		if is_index(&key) {
			append_indexed(left, value);

			continue;
		}

		match left.get_mut(&key) {
			Some(existing) => {
				let current = std::mem::take(existing);

				*existing = merge_values(current, value);
			},
			None => {
				left.insert(key, value);
			},
		}
	}
}

fn merge_values(left: Value, right: Value) -> Value {
	match (left, right) {
		(Value::Object(mut left), Value::Object(right)) => {
			merge_maps(&mut left, right);

			Value::Object(left)
		},
		(Value::Object(mut left), Value::Array(items)) => {
			for item in items {
				append_indexed(&mut left, item);
			}

			Value::Object(left)
		},
		(Value::Object(mut left), right) => {
			append_indexed(&mut left, right);

			Value::Object(left)
		},
		(left, Value::Object(right)) => {
			let mut merged = indexed(left);

			merge_maps(&mut merged, right);

			Value::Object(merged)
		},
		(left, right) => {
			let mut items = into_list(left);

			items.extend(into_list(right));

			Value::Array(items)
		},
	}
}

fn into_list(value: Value) -> Vec<Value> {
	match value {
		Value::Array(items) => items,
		other => vec![other],
	}
}

fn indexed(value: Value) -> JsonMap<String, Value> {
	into_list(value).into_iter().enumerate().map(|(idx, item)| (idx.to_string(), item)).collect()
}

fn append_indexed(map: &mut JsonMap<String, Value>, value: Value) {
	let next = map
		.keys()
		.filter_map(|key| key.parse::<u64>().ok())
		.max()
		.map_or(0, |last| last + 1);

	map.insert(next.to_string(), value);
}

fn is_index(key: &str) -> bool {
	key.parse::<u64>().is_ok_and(|idx| idx.to_string() == key)
}

/// Flattens a JSON object into bracketed query pairs (`ids[0]`, `filter[state]`).
pub(crate) fn query_pairs(map: &JsonMap<String, Value>) -> Vec<(String, String)> {
	let mut pairs = Vec::new();

	for (key, value) in map {
		flatten_query(key, value, &mut pairs);
	}

	pairs
}

fn flatten_query(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
	match value {
		Value::Null => {},
		Value::Bool(flag) => out.push((prefix.to_owned(), if *flag { "1" } else { "0" }.into())),
		Value::Number(number) => out.push((prefix.to_owned(), number.to_string())),
		Value::String(text) => out.push((prefix.to_owned(), text.clone())),
		Value::Array(items) =>
			for (idx, item) in items.iter().enumerate() {
				flatten_query(&format!("{prefix}[{idx}]"), item, out);
			},
		Value::Object(map) =>
			for (key, item) in map {
				flatten_query(&format!("{prefix}[{key}]"), item, out);
			},
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn options(value: Value) -> RequestOptions {
		match value {
			Value::Object(map) => RequestOptions::from(map),
			other => panic!("Expected a JSON object, got {other}."),
		}
	}

	#[test]
	fn merge_keeps_caller_headers_and_appends_injected_ones() {
		let mut caller = options(json!({
			"headers": { "Content-Type": "text/plain", "X-Trace": "abc" },
			"timeout": 3
		}));

		caller.merge_recursive(options(json!({
			"headers": { "Authorization": "Bearer t", "Content-Type": "application/json" }
		})));

		assert_eq!(
			caller.as_map().get("headers"),
			Some(&json!({
				"Authorization": "Bearer t",
				"Content-Type": ["text/plain", "application/json"],
				"X-Trace": "abc"
			}))
		);
		assert_eq!(caller.get("timeout"), Some(&json!(3)));
	}

	#[test]
	fn merge_appends_to_existing_lists() {
		let mut left = options(json!({ "headers": { "Accept": ["a", "b"] } }));

		left.merge_recursive(options(json!({ "headers": { "Accept": "c" } })));

		assert_eq!(left.get("headers"), Some(&json!({ "Accept": ["a", "b", "c"] })));
	}

	#[test]
	fn scalar_headers_keep_injected_names() {
		let mut caller = options(json!({ "headers": null }));

		caller.merge_recursive(RequestOptions::new().with_header("Authorization", "Bearer t"));

		assert_eq!(
			caller.get("headers"),
			Some(&json!({ "0": null, "Authorization": "Bearer t" }))
		);
	}

	#[test]
	fn scalars_merged_into_objects_take_the_next_free_index() {
		let mut left = options(json!({ "headers": { "1": "a", "X-Trace": "t" } }));

		left.merge_recursive(options(json!({ "headers": "b" })));

		assert_eq!(left.get("headers"), Some(&json!({ "1": "a", "X-Trace": "t", "2": "b" })));

		let mut left = options(json!({ "headers": { "Accept": "a" } }));

		left.merge_recursive(options(json!({ "headers": ["b", "c"] })));

		assert_eq!(left.get("headers"), Some(&json!({ "Accept": "a", "0": "b", "1": "c" })));
	}

	#[test]
	fn merge_keeps_key_order() {
		let mut left = options(json!({ "headers": { "B": "1", "A": "2" }, "timeout": 1 }));

		left.merge_recursive(options(json!({ "headers": { "A": "3", "C": "4" } })));

		let names = left
			.get("headers")
			.and_then(Value::as_object)
			.map(|headers| headers.keys().cloned().collect::<Vec<_>>())
			.unwrap_or_default();

		assert_eq!(names, vec!["B", "A", "C"]);
		assert_eq!(left.as_map().keys().collect::<Vec<_>>(), vec!["headers", "timeout"]);
	}

	#[test]
	fn with_header_merges_instead_of_overwriting() {
		let opts = RequestOptions::new().with_header("Accept", "a").with_header("Accept", "b");

		assert_eq!(opts.get("headers"), Some(&json!({ "Accept": ["a", "b"] })));
	}

	#[test]
	fn query_flattening_brackets_nested_keys() {
		let map = match json!({
			"ids": [1, 2],
			"filter": { "state": "open" },
			"active": true,
			"skip": null,
			"name": "a b"
		}) {
			Value::Object(map) => map,
			_ => unreachable!(),
		};
		let mut pairs = query_pairs(&map);

		pairs.sort();

		assert_eq!(
			pairs,
			vec![
				("active".to_owned(), "1".to_owned()),
				("filter[state]".to_owned(), "open".to_owned()),
				("ids[0]".to_owned(), "1".to_owned()),
				("ids[1]".to_owned(), "2".to_owned()),
				("name".to_owned(), "a b".to_owned()),
			]
		);
	}
}
