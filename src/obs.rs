//! Optional observability helpers for consumer calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `api_helpers.call` with the `kind` and
//!   `stage` fields, plus a warning whenever the remote API answers with a non-200 status.
//! - Enable `metrics` to increment the `api_helpers_call_total` counter for every
//!   attempt/success/failure, labeled by `kind` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Outbound call kinds observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Authenticated (or anonymous) request against the remote API.
	Api,
	/// Token exchange at the OAuth token endpoint.
	Token,
	/// Resource owner lookup with an issued token.
	ResourceOwner,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::Api => "api",
			CallKind::Token => "token",
			CallKind::ResourceOwner => "resource_owner",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Call started.
	Attempt,
	/// Call completed successfully.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}

	/// Maps a finished call result to its outcome label.
	pub fn of<T, E>(result: &std::result::Result<T, E>) -> Self {
		if result.is_ok() { CallOutcome::Success } else { CallOutcome::Failure }
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records a non-200 API status before it collapses into [`Error::ApiConnection`].
pub fn record_unexpected_status(path: &str, status: u16) {
	#[cfg(feature = "tracing")]
	{
		::tracing::warn!(path, status, "remote API answered with a non-200 status");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (path, status);
	}
}
