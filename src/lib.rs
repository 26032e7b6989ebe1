//! Building blocks for both sides of a JSON-over-HTTP API: an OAuth-authenticated consumer that
//! calls remote endpoints, and a producer helper set for endpoints that accept and return JSON.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod consumer;
pub mod error;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod producer;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
