//! Order form session.
//!
//! Holds the order being edited and applies the rules the form enforces on
//! top of the plain record: the quantity stepper range, a catalog-only
//! product picker, and add-ons that only exist while special requests are on.

use cupcake_types::{cake_index, cake_name, Order, CAKE_TYPES, QUANTITY_RANGE};
use thiserror::Error;

/// Errors raised by form input.
#[derive(Debug, Error)]
pub enum FormError {
	#[error("Unknown cake '{0}', expected one of: {expected}", expected = CAKE_TYPES.join(", "))]
	UnknownCake(String),
}

/// Resolves a picker value given either as a catalog name or as an index.
pub fn parse_cake(input: &str) -> Result<i64, FormError> {
	if let Some(index) = cake_index(input) {
		return Ok(index);
	}
	input
		.parse::<i64>()
		.ok()
		.filter(|index| cake_name(*index).is_some())
		.ok_or_else(|| FormError::UnknownCake(input.to_string()))
}

/// One editing session of the order form.
#[derive(Debug, Default)]
pub struct OrderForm {
	order: Order,
}

impl OrderForm {
	/// Opens a form on an empty order.
	pub fn new() -> Self {
		Self::default()
	}

	/// The order as currently entered.
	pub fn order(&self) -> &Order {
		&self.order
	}

	/// Picks a product by catalog index.
	pub fn select_cake(&mut self, index: i64) -> Result<(), FormError> {
		if cake_name(index).is_none() {
			return Err(FormError::UnknownCake(index.to_string()));
		}
		self.order.cake_type = index;
		Ok(())
	}

	/// Sets the quantity, clamped to the stepper range. Returns the applied value.
	pub fn set_quantity(&mut self, quantity: i64) -> i64 {
		self.order.quantity = quantity.clamp(*QUANTITY_RANGE.start(), *QUANTITY_RANGE.end());
		self.order.quantity
	}

	/// Stepper "+".
	pub fn increment_quantity(&mut self) -> i64 {
		self.set_quantity(self.order.quantity.saturating_add(1))
	}

	/// Stepper "-".
	pub fn decrement_quantity(&mut self) -> i64 {
		self.set_quantity(self.order.quantity.saturating_sub(1))
	}

	/// Opens or closes the add-on section. Closing it clears both add-ons.
	pub fn set_special_requests(&mut self, enabled: bool) {
		self.order.special_request_enabled = enabled;
		if !enabled {
			self.order.extra_frosting = false;
			self.order.add_sprinkles = false;
		}
	}

	/// Toggles extra frosting. Ignored while special requests are off.
	pub fn set_extra_frosting(&mut self, on: bool) -> bool {
		if self.order.special_request_enabled {
			self.order.extra_frosting = on;
		}
		self.order.extra_frosting
	}

	/// Toggles sprinkles. Ignored while special requests are off.
	pub fn set_add_sprinkles(&mut self, on: bool) -> bool {
		if self.order.special_request_enabled {
			self.order.add_sprinkles = on;
		}
		self.order.add_sprinkles
	}

	pub fn set_name(&mut self, name: impl Into<String>) {
		self.order.name = name.into();
	}

	pub fn set_street_address(&mut self, street_address: impl Into<String>) {
		self.order.street_address = street_address.into();
	}

	pub fn set_city(&mut self, city: impl Into<String>) {
		self.order.city = city.into();
	}

	pub fn set_zip(&mut self, zip: impl Into<String>) {
		self.order.zip = zip.into();
	}

	/// Whether the "Place Order" action is enabled.
	pub fn can_submit(&self) -> bool {
		self.order.is_valid()
	}

	/// Ends the session, handing the order to submission.
	pub fn into_order(self) -> Order {
		self.order
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_cake_by_name_or_index() {
		assert_eq!(parse_cake("Chocolate").unwrap(), 1);
		assert_eq!(parse_cake("rainbow").unwrap(), 3);
		assert_eq!(parse_cake("2").unwrap(), 2);
		assert!(parse_cake("4").is_err());
		assert!(parse_cake("-1").is_err());

		let err = parse_cake("Lemon").unwrap_err();
		assert_eq!(
			err.to_string(),
			"Unknown cake 'Lemon', expected one of: Vanilla, Chocolate, Strawberry, Rainbow"
		);
	}

	#[test]
	fn test_select_cake_rejects_out_of_catalog() {
		let mut form = OrderForm::new();
		assert!(form.select_cake(3).is_ok());
		assert!(form.select_cake(4).is_err());
		assert_eq!(form.order().cake_type, 3);
	}

	#[test]
	fn test_quantity_stepper_is_clamped() {
		let mut form = OrderForm::new();
		assert_eq!(form.decrement_quantity(), 3);
		assert_eq!(form.increment_quantity(), 4);

		assert_eq!(form.set_quantity(100), 20);
		assert_eq!(form.increment_quantity(), 20);
		assert_eq!(form.set_quantity(-5), 3);
		assert_eq!(form.set_quantity(i64::MAX), 20);
	}

	#[test]
	fn test_add_ons_require_special_requests() {
		let mut form = OrderForm::new();
		assert!(!form.set_extra_frosting(true));

		form.set_special_requests(true);
		assert!(form.set_extra_frosting(true));
		assert!(form.set_add_sprinkles(true));

		form.set_special_requests(false);
		assert!(!form.order().extra_frosting);
		assert!(!form.order().add_sprinkles);
	}

	#[test]
	fn test_can_submit_tracks_address_fields() {
		let mut form = OrderForm::new();
		assert!(!form.can_submit());

		form.set_name("Ada");
		form.set_street_address("1 Loop Road");
		form.set_city("Cupertino");
		assert!(!form.can_submit());

		form.set_zip("95014");
		assert!(form.can_submit());
		assert_eq!(form.into_order().zip, "95014");
	}
}
