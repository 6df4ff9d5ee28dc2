//! Builds an [`OrderSubmitter`] from configuration.
//!
//! Every configured transport table is instantiated through its factory and
//! checked against the implementation's own schema, so that a broken section
//! is reported at startup. The primary one is then handed to the submitter.

use crate::OrderSubmitter;
use cupcake_config::TransportConfig;
use cupcake_delivery::{TransportError, TransportFactory, TransportInterface};
use cupcake_types::ConfigSchema;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while building a submitter.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
}

/// Factories for every built-in transport, keyed by configuration name.
pub fn transport_factories() -> HashMap<String, TransportFactory> {
	cupcake_delivery::get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect()
}

/// Builder for an [`OrderSubmitter`] with a pluggable transport.
pub struct SubmitterBuilder {
	config: TransportConfig,
}

impl SubmitterBuilder {
	/// Creates a builder for the given transport configuration.
	pub fn new(config: TransportConfig) -> Self {
		Self { config }
	}

	/// Instantiates the configured transports and wires the primary one into a submitter.
	pub fn build<F>(self, factories: &HashMap<String, F>) -> Result<OrderSubmitter, BuilderError>
	where
		F: Fn(&toml::Value) -> Result<Box<dyn TransportInterface>, TransportError>,
	{
		let mut transports = HashMap::new();
		for (name, config) in &self.config.implementations {
			let Some(factory) = factories.get(name) else {
				tracing::warn!(component = "transport", implementation = %name, "No factory registered, skipping");
				continue;
			};

			match factory(config) {
				Ok(implementation) => {
					if let Err(e) = implementation.config_schema().validate(config) {
						tracing::error!(
							component = "transport",
							implementation = %name,
							error = %e,
							"Invalid configuration for transport implementation"
						);
						return Err(BuilderError::Config(format!(
							"Invalid configuration for transport implementation '{}': {}",
							name, e
						)));
					}

					let is_primary = &self.config.primary == name;
					tracing::info!(component = "transport", implementation = %name, enabled = %is_primary, "Loaded");
					transports.insert(name.clone(), implementation);
				},
				Err(e) => {
					tracing::error!(
						component = "transport",
						implementation = %name,
						error = %e,
						"Failed to create transport implementation"
					);
					return Err(BuilderError::Config(format!(
						"Failed to create transport implementation '{}': {}",
						name, e
					)));
				},
			}
		}

		let primary = &self.config.primary;
		let transport = transports.remove(primary).ok_or_else(|| {
			BuilderError::Config(format!(
				"Primary transport '{}' is not configured or has no implementation",
				primary
			))
		})?;

		Ok(OrderSubmitter::new(Arc::from(transport)))
	}
}
