//! Configuration for the Cupcake Corner ordering client.
//!
//! Configuration is a TOML file with two sections:
//!
//! ```toml
//! [bakery]
//! name = "Cupcake Corner"
//!
//! [transport]
//! primary = "http"
//! [transport.implementations.http]
//! endpoint = "${CUPCAKE_ENDPOINT:-https://reqres.in/api/cupcakes}"
//! [transport.implementations.echo]
//! ```
//!
//! `${VAR}` and `${VAR:-default}` references are replaced with environment
//! values before parsing. Each transport implementation validates its own
//! table when it is built.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Endpoint used when no configuration overrides it. Echoes the posted body.
pub const DEFAULT_ENDPOINT: &str = "https://reqres.in/api/cupcakes";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep the message, drop the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Shop identity shown by the front end.
	#[serde(default)]
	pub bakery: BakeryConfig,
	/// How orders reach the remote endpoint.
	pub transport: TransportConfig,
}

/// Shop identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BakeryConfig {
	/// Display name, used as the form title.
	#[serde(default = "default_bakery_name")]
	pub name: String,
}

impl Default for BakeryConfig {
	fn default() -> Self {
		Self {
			name: default_bakery_name(),
		}
	}
}

fn default_bakery_name() -> String {
	"Cupcake Corner".to_string()
}

/// Transport selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
	/// Which implementation submits orders.
	pub primary: String,
	/// Map of transport implementation names to their raw TOML tables.
	pub implementations: HashMap<String, toml::Value>,
}

impl Default for Config {
	fn default() -> Self {
		let mut http = toml::map::Map::new();
		http.insert(
			"endpoint".to_string(),
			toml::Value::String(DEFAULT_ENDPOINT.to_string()),
		);

		let mut implementations = HashMap::new();
		implementations.insert("http".to_string(), toml::Value::Table(http));
		implementations.insert(
			"echo".to_string(),
			toml::Value::Table(toml::map::Map::new()),
		);

		Self {
			bakery: BakeryConfig::default(),
			transport: TransportConfig {
				primary: "http".to_string(),
				implementations,
			},
		}
	}
}

/// Replaces `${VAR}` and `${VAR:-default}` with environment values.
///
/// A reference without a default whose variable is unset is an error.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Bounded input keeps the regex scan cheap
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut missing = None;
	let resolved = re.replace_all(input, |caps: &regex::Captures<'_>| {
		let var_name = &caps[1];
		match (std::env::var(var_name), caps.get(2)) {
			(Ok(value), _) => value,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				missing.get_or_insert_with(|| var_name.to_string());
				String::new()
			},
		}
	});

	if let Some(var_name) = missing {
		return Err(ConfigError::Validation(format!(
			"Environment variable '{}' not found",
			var_name
		)));
	}

	Ok(resolved.into_owned())
}

impl Config {
	/// Loads configuration from a TOML file.
	pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				e.kind(),
				format!("Cannot read {}: {}", path.display(), e),
			))
		})?;

		let config: Config = content.parse()?;
		tracing::debug!(path = %path.display(), primary = %config.transport.primary, "Loaded configuration");
		Ok(config)
	}

	/// Checks cross-field rules that serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.bakery.name.is_empty() {
			return Err(ConfigError::Validation("Bakery name cannot be empty".into()));
		}

		if self.transport.implementations.is_empty() {
			return Err(ConfigError::Validation(
				"At least one transport implementation must be configured".into(),
			));
		}
		if self.transport.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Transport primary implementation cannot be empty".into(),
			));
		}
		if !self
			.transport
			.implementations
			.contains_key(&self.transport.primary)
		{
			return Err(ConfigError::Validation(format!(
				"Primary transport '{}' not found in implementations",
				self.transport.primary
			)));
		}

		Ok(())
	}
}

/// Parses a TOML string, resolving environment references and validating
/// the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}
