//! Order submission for the Cupcake Corner ordering client.
//!
//! The [`OrderSubmitter`] takes a filled-in order, encodes it, posts it once
//! through the configured transport and turns the echoed order into the
//! confirmation shown to the customer. Failures are logged and returned;
//! nothing is retried.

use cupcake_delivery::{TransportError, TransportInterface};
use cupcake_types::{ConfirmationMessage, Order};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::instrument;

pub mod builder;

pub use builder::{transport_factories, BuilderError, SubmitterBuilder};

/// Errors that can end an order submission.
#[derive(Debug, Error)]
pub enum SubmissionError {
	/// The order could not be encoded. No request was sent.
	#[error("Failed to encode order: {0}")]
	Encoding(String),
	/// The request produced no response.
	#[error("No data in response: {0}")]
	Network(String),
	/// A response arrived but does not describe an order we can confirm.
	#[error("Invalid response ({reason}): {raw}")]
	InvalidResponse {
		/// Response body as text.
		raw: String,
		/// Why the body was rejected.
		reason: String,
	},
	/// Another submission from this submitter has not finished yet.
	#[error("An order submission is already in flight")]
	InFlight,
}

/// Outcome of a background submission, delivered to the caller's event loop.
#[derive(Debug)]
pub enum SubmissionEvent {
	/// The server accepted the order.
	Confirmed(ConfirmationMessage),
	/// The submission failed; the error has already been logged.
	Failed(SubmissionError),
}

/// Submits orders through a transport, one at a time.
pub struct OrderSubmitter {
	transport: Arc<dyn TransportInterface>,
	in_flight: AtomicBool,
}

/// Clears the in-flight flag when a submission ends, however it ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
	fn drop(&mut self) {
		self.0.store(false, Ordering::SeqCst);
	}
}

impl OrderSubmitter {
	/// Creates a submitter that posts through `transport`.
	pub fn new(transport: Arc<dyn TransportInterface>) -> Self {
		Self {
			transport,
			in_flight: AtomicBool::new(false),
		}
	}

	/// Returns true while a submission is outstanding.
	pub fn is_in_flight(&self) -> bool {
		self.in_flight.load(Ordering::SeqCst)
	}

	/// Submits `order` and returns the confirmation derived from the server's echo.
	///
	/// The caller is expected to have checked [`Order::is_valid`]; the order is
	/// sent as is. The confirmation uses the quantity and product the server
	/// returned, not the local ones. Exactly one request is made per call,
	/// and none if encoding fails or another submission is in flight.
	#[instrument(skip_all, fields(cake_type = order.cake_type, quantity = order.quantity))]
	pub async fn place_order(&self, order: &Order) -> Result<ConfirmationMessage, SubmissionError> {
		if self.in_flight.swap(true, Ordering::SeqCst) {
			tracing::warn!("Rejected submission while another is in flight");
			return Err(SubmissionError::InFlight);
		}
		let _guard = InFlightGuard(&self.in_flight);

		let encoded = order.serialize().map_err(|e| {
			tracing::error!(error = %e, "Failed to encode order");
			SubmissionError::Encoding(e.to_string())
		})?;

		let response = self.transport.post_json(encoded).await.map_err(|e| {
			let description = match e {
				TransportError::Network(msg) => msg,
				other => other.to_string(),
			};
			tracing::warn!("No data in response: {}", description);
			SubmissionError::Network(description)
		})?;

		match confirmation_from_body(&response.body) {
			Ok(message) => {
				tracing::info!(status = response.status, "Order confirmed");
				Ok(message)
			},
			Err(e) => {
				if let SubmissionError::InvalidResponse { raw, reason } = &e {
					tracing::warn!(status = response.status, reason = %reason, "Invalid response {}", raw);
				}
				Err(e)
			},
		}
	}

	/// Runs [`place_order`](Self::place_order) on the runtime and reports the
	/// outcome on `events`.
	///
	/// The caller's loop stays free while the request runs and applies the
	/// result when it receives the event. Exactly one event is sent.
	pub fn submit_in_background(
		self: &Arc<Self>,
		order: Order,
		events: mpsc::UnboundedSender<SubmissionEvent>,
	) -> JoinHandle<()> {
		let submitter = Arc::clone(self);
		tokio::spawn(async move {
			let event = match submitter.place_order(&order).await {
				Ok(message) => SubmissionEvent::Confirmed(message),
				Err(e) => SubmissionEvent::Failed(e),
			};
			if events.send(event).is_err() {
				tracing::warn!("Submission finished after the receiver went away");
			}
		})
	}
}

/// Decodes the echoed order and builds the confirmation for it.
fn confirmation_from_body(body: &[u8]) -> Result<ConfirmationMessage, SubmissionError> {
	let raw = || String::from_utf8_lossy(body).into_owned();

	let echoed = Order::deserialize(body).map_err(|e| SubmissionError::InvalidResponse {
		raw: raw(),
		reason: e.to_string(),
	})?;

	ConfirmationMessage::for_order(&echoed).ok_or_else(|| SubmissionError::InvalidResponse {
		raw: raw(),
		reason: format!("Unknown cake type {}", echoed.cake_type),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use cupcake_delivery::implementations::echo::EchoTransport;
	use cupcake_delivery::TransportResponse;
	use cupcake_types::ConfigSchema;
	use mockall::mock;
	use serde_json::json;
	use tokio::sync::Notify;

	mock! {
		pub Transport {}

		#[async_trait]
		impl TransportInterface for Transport {
			fn config_schema(&self) -> Box<dyn ConfigSchema>;
			async fn post_json(&self, body: Vec<u8>) -> Result<TransportResponse, TransportError>;
		}
	}

	fn valid_order() -> Order {
		Order {
			cake_type: 1,
			quantity: 5,
			name: "Ada".to_string(),
			street_address: "1 Loop Road".to_string(),
			city: "Cupertino".to_string(),
			zip: "95014".to_string(),
			..Order::default()
		}
	}

	fn responding(body: Vec<u8>) -> MockTransport {
		let mut transport = MockTransport::new();
		transport
			.expect_post_json()
			.times(1)
			.returning(move |_| {
				Ok(TransportResponse {
					status: 201,
					body: body.clone(),
				})
			});
		transport
	}

	#[tokio::test]
	async fn test_echo_confirms_order() {
		let submitter = OrderSubmitter::new(Arc::new(EchoTransport::default()));

		let message = submitter.place_order(&valid_order()).await.unwrap();
		assert_eq!(message.as_str(), "Your order for 5x chocolate is on its way.");
		assert!(!submitter.is_in_flight());
	}

	#[tokio::test]
	async fn test_posts_serialized_order_once() {
		let order = valid_order();
		let expected = order.serialize().unwrap();

		let mut transport = MockTransport::new();
		transport
			.expect_post_json()
			.withf(move |body| body == &expected)
			.times(1)
			.returning(|body| Ok(TransportResponse { status: 200, body }));

		let submitter = OrderSubmitter::new(Arc::new(transport));
		assert!(submitter.place_order(&order).await.is_ok());
	}

	#[tokio::test]
	async fn test_confirmation_uses_server_values() {
		let body = json!({
			"type": 3,
			"quantity": 12,
			"extraFrosting": false,
			"addSprinkles": false,
			"name": "Ada",
			"streetAddress": "1 Loop Road",
			"city": "Cupertino",
			"zip": "95014",
			"id": "981",
			"createdAt": "2020-05-21T18:01:02.000Z"
		});
		let submitter = OrderSubmitter::new(Arc::new(responding(body.to_string().into_bytes())));

		let message = submitter.place_order(&valid_order()).await.unwrap();
		assert_eq!(message.as_str(), "Your order for 12x rainbow is on its way.");
	}

	#[tokio::test]
	async fn test_malformed_response_is_invalid() {
		let body = json!({
			"type": 1,
			"extraFrosting": false,
			"addSprinkles": false,
			"name": "Ada",
			"streetAddress": "1 Loop Road",
			"city": "Cupertino",
			"zip": "95014"
		})
		.to_string();
		let submitter = OrderSubmitter::new(Arc::new(responding(body.clone().into_bytes())));

		match submitter.place_order(&valid_order()).await {
			Err(SubmissionError::InvalidResponse { raw, reason }) => {
				assert_eq!(raw, body);
				assert!(reason.contains("quantity"));
			},
			other => panic!("expected invalid response, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_unknown_cake_type_is_invalid() {
		let mut order = valid_order();
		order.cake_type = 7;
		let submitter = OrderSubmitter::new(Arc::new(EchoTransport::default()));

		let result = submitter.place_order(&order).await;
		assert!(matches!(
			result,
			Err(SubmissionError::InvalidResponse { ref reason, .. }) if reason.contains("7")
		));
	}

	#[tokio::test]
	async fn test_non_json_body_kept_as_text() {
		let submitter =
			OrderSubmitter::new(Arc::new(responding(b"<html>Bad Gateway</html>".to_vec())));

		match submitter.place_order(&valid_order()).await {
			Err(SubmissionError::InvalidResponse { raw, .. }) => {
				assert_eq!(raw, "<html>Bad Gateway</html>")
			},
			other => panic!("expected invalid response, got {:?}", other),
		}
	}

	#[tokio::test]
	async fn test_network_failure() {
		let mut transport = MockTransport::new();
		transport
			.expect_post_json()
			.times(1)
			.returning(|_| Err(TransportError::Network("connection refused".to_string())));
		let submitter = OrderSubmitter::new(Arc::new(transport));

		match submitter.place_order(&valid_order()).await {
			Err(SubmissionError::Network(msg)) => assert_eq!(msg, "connection refused"),
			other => panic!("expected network error, got {:?}", other),
		}
		assert!(!submitter.is_in_flight());
	}

	#[tokio::test]
	async fn test_background_submission_reports_event() {
		let submitter = Arc::new(OrderSubmitter::new(Arc::new(EchoTransport::default())));
		let (tx, mut rx) = mpsc::unbounded_channel();

		submitter
			.submit_in_background(valid_order(), tx)
			.await
			.unwrap();

		match rx.recv().await {
			Some(SubmissionEvent::Confirmed(message)) => {
				assert_eq!(message.as_str(), "Your order for 5x chocolate is on its way.")
			},
			other => panic!("expected confirmation, got {:?}", other),
		}
		assert!(rx.recv().await.is_none());
	}

	/// Echo transport that signals when a request starts and waits to be released.
	struct GatedTransport {
		entered: Arc<Notify>,
		release: Arc<Notify>,
	}

	#[async_trait]
	impl TransportInterface for GatedTransport {
		fn config_schema(&self) -> Box<dyn ConfigSchema> {
			EchoTransport::default().config_schema()
		}

		async fn post_json(&self, body: Vec<u8>) -> Result<TransportResponse, TransportError> {
			self.entered.notify_one();
			self.release.notified().await;
			Ok(TransportResponse { status: 200, body })
		}
	}

	#[tokio::test]
	async fn test_second_submission_rejected_while_in_flight() {
		let entered = Arc::new(Notify::new());
		let release = Arc::new(Notify::new());
		let submitter = Arc::new(OrderSubmitter::new(Arc::new(GatedTransport {
			entered: Arc::clone(&entered),
			release: Arc::clone(&release),
		})));
		let (tx, mut rx) = mpsc::unbounded_channel();

		let handle = submitter.submit_in_background(valid_order(), tx);
		entered.notified().await;

		assert!(submitter.is_in_flight());
		assert!(matches!(
			submitter.place_order(&valid_order()).await,
			Err(SubmissionError::InFlight)
		));

		release.notify_one();
		handle.await.unwrap();
		assert!(matches!(rx.recv().await, Some(SubmissionEvent::Confirmed(_))));

		// The flag is cleared once the first submission finishes
		assert!(!submitter.is_in_flight());
	}
}
