//! Loopback transport.
//!
//! Answers every request with the request body itself, the same behavior
//! as the public demo endpoint. Useful for running the client offline.

use crate::{
	TransportError, TransportFactory, TransportInterface, TransportRegistry, TransportResponse,
};
use async_trait::async_trait;
use cupcake_types::{ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError};

/// Transport that echoes the posted body.
pub struct EchoTransport {
	status: u16,
}

impl EchoTransport {
	/// Creates an echo transport that answers with `status`.
	pub fn new(status: u16) -> Self {
		Self { status }
	}
}

impl Default for EchoTransport {
	fn default() -> Self {
		Self::new(200)
	}
}

/// Configuration schema for EchoTransport.
pub struct EchoTransportSchema;

impl ConfigSchema for EchoTransportSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![Field::new(
				"status",
				FieldType::Integer {
					min: Some(100),
					max: Some(599),
				},
			)],
		);
		schema.validate(config)
	}
}

#[async_trait]
impl TransportInterface for EchoTransport {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(EchoTransportSchema)
	}

	async fn post_json(&self, body: Vec<u8>) -> Result<TransportResponse, TransportError> {
		tracing::debug!(bytes = body.len(), status = self.status, "Echoing request body");
		Ok(TransportResponse {
			status: self.status,
			body,
		})
	}
}

/// Factory function to create an echo transport from configuration.
///
/// Configuration parameters:
/// - `status` (optional, default 200): status code reported with the echo
pub fn create_transport(
	config: &toml::Value,
) -> Result<Box<dyn TransportInterface>, TransportError> {
	EchoTransportSchema
		.validate(config)
		.map_err(|e| TransportError::Configuration(format!("Invalid echo config: {}", e)))?;

	// Range already checked by the schema
	let status = config
		.get("status")
		.and_then(|v| v.as_integer())
		.unwrap_or(200) as u16;

	Ok(Box::new(EchoTransport::new(status)))
}

/// Registry for the echo transport.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "echo";
	type Factory = TransportFactory;

	fn factory() -> Self::Factory {
		create_transport
	}
}

impl TransportRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_echoes_body_verbatim() {
		let transport = EchoTransport::default();
		let body = br#"{"type":1,"quantity":5}"#.to_vec();

		let response = transport.post_json(body.clone()).await.unwrap();
		assert_eq!(response.status, 200);
		assert_eq!(response.body, body);
	}

	#[tokio::test]
	async fn test_factory_reads_status() {
		let config: toml::Value = toml::from_str("status = 201").unwrap();
		let transport = create_transport(&config).unwrap();

		let response = transport.post_json(b"{}".to_vec()).await.unwrap();
		assert_eq!(response.status, 201);
	}

	#[test]
	fn test_factory_rejects_bad_status() {
		let config: toml::Value = toml::from_str("status = 42").unwrap();
		let result = create_transport(&config);
		assert!(matches!(result, Err(TransportError::Configuration(_))));
	}

	#[test]
	fn test_empty_table_is_valid() {
		let config = toml::Value::Table(toml::map::Map::new());
		assert!(create_transport(&config).is_ok());
	}
}
