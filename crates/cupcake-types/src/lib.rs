//! Common types for the Cupcake Corner ordering client.
//!
//! This crate holds the order record shared by every other crate, the fixed
//! product catalog, and the small building blocks used to validate the TOML
//! sections that configure pluggable implementations.

/// The order record, its wire contract and the product catalog.
pub mod order;
/// Registry trait for self-registering implementations.
pub mod registry;
/// Schema-based validation of implementation configuration.
pub mod validation;

pub use order::{
	cake_index, cake_name, ConfirmationMessage, Order, OrderCodecError, CAKE_TYPES,
	QUANTITY_RANGE,
};
pub use registry::ImplementationRegistry;
pub use validation::{ConfigSchema, Field, FieldType, Schema, ValidationError};
