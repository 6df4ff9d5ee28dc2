//! Order record and wire contract.
//!
//! An [`Order`] is a plain mutable record filled in field by field by the
//! order form and consumed once by submission. Its JSON shape is a contract
//! with the remote endpoint, which is expected to echo it back:
//!
//! ```json
//! {
//!   "type": 1,
//!   "quantity": 5,
//!   "extraFrosting": false,
//!   "addSprinkles": true,
//!   "name": "Ada",
//!   "streetAddress": "1 Loop Road",
//!   "city": "Cupertino",
//!   "zip": "95014"
//! }
//! ```
//!
//! Encoding always produces exactly these eight keys. Decoding requires all
//! eight and ignores anything else the server adds (ids, timestamps).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Products offered by the bakery, indexed by [`Order::cake_type`].
pub const CAKE_TYPES: [&str; 4] = ["Vanilla", "Chocolate", "Strawberry", "Rainbow"];

/// Quantities the order form lets a customer pick.
///
/// Only the form enforces this range; [`Order`] accepts any value.
pub const QUANTITY_RANGE: RangeInclusive<i64> = 3..=20;

/// Looks up the catalog name for a product index.
///
/// Returns `None` for negative indices and indices past the end of the catalog.
pub fn cake_name(index: i64) -> Option<&'static str> {
	usize::try_from(index)
		.ok()
		.and_then(|i| CAKE_TYPES.get(i).copied())
}

/// Finds the catalog index for a product name, ignoring ASCII case.
pub fn cake_index(name: &str) -> Option<i64> {
	CAKE_TYPES
		.iter()
		.position(|cake| cake.eq_ignore_ascii_case(name))
		.map(|i| i as i64)
}

/// Errors that can occur while converting an order to or from JSON.
#[derive(Debug, Error)]
pub enum OrderCodecError {
	/// The encoder rejected the in-memory order.
	#[error("Failed to encode order: {0}")]
	Encoding(String),
	/// The payload is not valid JSON, misses a required key, or has a key of the wrong type.
	#[error("Failed to decode order: {0}")]
	Decoding(String),
}

/// A single cupcake order as entered on the order form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Index into [`CAKE_TYPES`].
	#[serde(rename = "type")]
	pub cake_type: i64,
	/// Number of cakes.
	pub quantity: i64,
	/// Extra frosting add-on. Only meaningful with special requests enabled.
	pub extra_frosting: bool,
	/// Sprinkles add-on. Only meaningful with special requests enabled.
	pub add_sprinkles: bool,
	/// Whether the add-on section of the form is open. Never sent over the wire.
	#[serde(skip)]
	pub special_request_enabled: bool,
	/// Recipient name.
	pub name: String,
	/// Street part of the shipping address.
	pub street_address: String,
	/// Shipping city.
	pub city: String,
	/// Postal code, free form.
	pub zip: String,
}

impl Default for Order {
	fn default() -> Self {
		Self {
			cake_type: 0,
			quantity: *QUANTITY_RANGE.start(),
			extra_frosting: false,
			add_sprinkles: false,
			special_request_enabled: false,
			name: String::new(),
			street_address: String::new(),
			city: String::new(),
			zip: String::new(),
		}
	}
}

impl Order {
	/// Creates an empty order with the form defaults.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns true when every shipping field has been filled in.
	///
	/// This is a presence check only: whitespace counts as content and the
	/// zip code is not format checked. Product, quantity and add-ons never
	/// affect validity.
	pub fn is_valid(&self) -> bool {
		self.missing_fields().is_empty()
	}

	/// Lists the wire names of the shipping fields that are still empty.
	pub fn missing_fields(&self) -> Vec<&'static str> {
		[
			("name", &self.name),
			("streetAddress", &self.street_address),
			("city", &self.city),
			("zip", &self.zip),
		]
		.into_iter()
		.filter(|(_, value)| value.is_empty())
		.map(|(key, _)| key)
		.collect()
	}

	/// Catalog name of the selected product, if the index is in range.
	pub fn cake_name(&self) -> Option<&'static str> {
		cake_name(self.cake_type)
	}

	/// Encodes the order into its JSON wire form.
	pub fn serialize(&self) -> Result<Vec<u8>, OrderCodecError> {
		serde_json::to_vec(self).map_err(|e| OrderCodecError::Encoding(e.to_string()))
	}

	/// Decodes an order from its JSON wire form.
	///
	/// The transient `special_request_enabled` flag always comes back false.
	pub fn deserialize(bytes: &[u8]) -> Result<Self, OrderCodecError> {
		serde_json::from_slice(bytes).map_err(|e| OrderCodecError::Decoding(e.to_string()))
	}
}

/// Human readable confirmation shown after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationMessage(String);

impl ConfirmationMessage {
	/// Builds the confirmation for an order echoed back by the server.
	///
	/// Returns `None` if the order names a product outside the catalog.
	pub fn for_order(order: &Order) -> Option<Self> {
		let cake = order.cake_name()?;
		Some(Self(format!(
			"Your order for {}x {} is on its way.",
			order.quantity,
			cake.to_lowercase()
		)))
	}

	/// Returns the message text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ConfirmationMessage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<ConfirmationMessage> for String {
	fn from(message: ConfirmationMessage) -> Self {
		message.0
	}
}
