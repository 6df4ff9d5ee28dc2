//! Order transport for the Cupcake Corner ordering client.
//!
//! A transport performs the one network exchange an order submission needs:
//! POST a JSON body, hand back whatever the server answered. It knows nothing
//! about orders; encoding and decoding stay with the submitter.

use async_trait::async_trait;
use cupcake_types::{ConfigSchema, ImplementationRegistry};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod echo;
	pub mod http;
}

/// Errors that can occur while delivering a request.
#[derive(Debug, Error)]
pub enum TransportError {
	/// No response was obtained (connection refused, DNS failure, body read failure).
	#[error("Network error: {0}")]
	Network(String),
	/// The implementation's configuration table is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// What came back from the endpoint.
///
/// The status is kept for logging; callers decide success from the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}

/// Interface every transport implementation provides.
#[async_trait]
pub trait TransportInterface: Send + Sync {
	/// Returns the schema used to validate this implementation's TOML table.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Sends `body` as `application/json` in a single POST.
	///
	/// Implementations make exactly one attempt and never retry.
	async fn post_json(&self, body: Vec<u8>) -> Result<TransportResponse, TransportError>;
}

/// Builds a transport from its TOML table.
pub type TransportFactory = fn(&toml::Value) -> Result<Box<dyn TransportInterface>, TransportError>;

/// Registry trait for transport implementations.
pub trait TransportRegistry: ImplementationRegistry<Factory = TransportFactory> {}

/// Returns `(name, factory)` for every built-in transport.
pub fn get_all_implementations() -> Vec<(&'static str, TransportFactory)> {
	use implementations::{echo, http};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(echo::Registry::NAME, echo::Registry::factory()),
	]
}
