//! Registry trait for self-registering implementations.
//!
//! Pluggable components (currently only transports) expose a `Registry`
//! type per implementation so the builder can look them up by the name used
//! in configuration.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation,
	/// e.g. `"http"` for `[transport.implementations.http]`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Returns the factory that builds this implementation from its TOML section.
	fn factory() -> Self::Factory;
}
