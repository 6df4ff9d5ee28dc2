//! HTTP transport backed by reqwest.
//!
//! Posts the order body to a fixed endpoint. The client is built without a
//! request timeout, so a slow server is waited on for as long as the
//! connection stays up.

use crate::{
	TransportError, TransportFactory, TransportInterface, TransportRegistry, TransportResponse,
};
use async_trait::async_trait;
use cupcake_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};
use reqwest::header::CONTENT_TYPE;

/// Transport that POSTs to an HTTP(S) endpoint.
pub struct HttpTransport {
	client: reqwest::Client,
	endpoint: String,
}

impl HttpTransport {
	/// Creates a transport for `endpoint`.
	pub fn new(endpoint: impl Into<String>) -> Result<Self, TransportError> {
		let client = reqwest::Client::builder()
			.build()
			.map_err(|e| TransportError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

		Ok(Self {
			client,
			endpoint: endpoint.into(),
		})
	}
}

/// Configuration schema for HttpTransport.
pub struct HttpTransportSchema;

impl ConfigSchema for HttpTransportSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("endpoint", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
							Ok(())
						},
						Some(_) => Err("endpoint must be an http:// or https:// URL".to_string()),
						None => Err("Expected string value for endpoint".to_string()),
					}
				}),
			],
			vec![],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl TransportInterface for HttpTransport {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpTransportSchema)
	}

	async fn post_json(&self, body: Vec<u8>) -> Result<TransportResponse, TransportError> {
		tracing::debug!(endpoint = %self.endpoint, bytes = body.len(), "Posting order");

		let response = self
			.client
			.post(&self.endpoint)
			.header(CONTENT_TYPE, "application/json")
			.body(body)
			.send()
			.await
			.map_err(|e| TransportError::Network(e.to_string()))?;

		let status = response.status().as_u16();
		let body = response
			.bytes()
			.await
			.map_err(|e| TransportError::Network(format!("Failed to read response body: {}", e)))?;

		tracing::debug!(endpoint = %self.endpoint, status, bytes = body.len(), "Received response");

		Ok(TransportResponse {
			status,
			body: body.to_vec(),
		})
	}
}

/// Factory function to create an HTTP transport from configuration.
///
/// Configuration parameters:
/// - `endpoint` (required): http:// or https:// URL orders are posted to
pub fn create_transport(
	config: &toml::Value,
) -> Result<Box<dyn TransportInterface>, TransportError> {
	HttpTransportSchema
		.validate(config)
		.map_err(|e| TransportError::Configuration(format!("Invalid http config: {}", e)))?;

	let endpoint = config
		.get("endpoint")
		.and_then(|v| v.as_str())
		.ok_or_else(|| TransportError::Configuration("endpoint is required".to_string()))?;

	Ok(Box::new(HttpTransport::new(endpoint)?))
}

/// Registry for the HTTP transport.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = TransportFactory;

	fn factory() -> Self::Factory {
		create_transport
	}
}

impl TransportRegistry for Registry {}
