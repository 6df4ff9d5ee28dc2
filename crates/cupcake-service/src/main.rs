//! Command-line front end for the Cupcake Corner ordering client.
//!
//! Fills in the order form from the arguments, refuses to submit an
//! incomplete form, and otherwise places the order and prints the
//! confirmation.

use clap::Parser;
use cupcake_config::Config;
use cupcake_core::{transport_factories, SubmissionEvent, SubmitterBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

mod form;

use form::{parse_cake, FormError, OrderForm};

/// Command-line arguments for the order client.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file (built-in defaults when omitted)
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	/// Transport implementation to use instead of the configured primary
	#[arg(long)]
	transport: Option<String>,

	/// Cake type, by name or catalog index
	#[arg(long, default_value = "Vanilla")]
	cake: String,

	/// Number of cakes (3 to 20)
	#[arg(short, long, default_value_t = 3, allow_negative_numbers = true)]
	quantity: i64,

	/// Open the special requests section
	#[arg(long)]
	special_requests: bool,

	/// Add extra frosting (implies --special-requests)
	#[arg(long)]
	extra_frosting: bool,

	/// Add extra sprinkles (implies --special-requests)
	#[arg(long)]
	add_sprinkles: bool,

	#[arg(long, default_value = "")]
	name: String,

	#[arg(long, default_value = "")]
	street_address: String,

	#[arg(long, default_value = "")]
	city: String,

	#[arg(long, default_value = "")]
	zip: String,
}

/// Main entry point for the order client.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging
/// 3. Loads configuration
/// 4. Fills in and checks the order form
/// 5. Places the order and waits for the outcome
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	let config = load_config(&args).await?;
	tracing::info!("Opened order form [{}]", config.bakery.name);

	let form = fill_form(&args)?;
	if !form.can_submit() {
		let missing = form.order().missing_fields().join(", ");
		tracing::warn!(missing = %missing, "Order form is incomplete");
		return Err(format!("Cannot place order, missing: {}", missing).into());
	}

	let submitter = SubmitterBuilder::new(config.transport).build(&transport_factories())?;
	let submitter = Arc::new(submitter);

	let (events_tx, mut events_rx) = mpsc::unbounded_channel();
	submitter.submit_in_background(form.into_order(), events_tx);

	match events_rx.recv().await {
		Some(SubmissionEvent::Confirmed(message)) => {
			println!("Thank You!\n{}", message);
			Ok(())
		},
		Some(SubmissionEvent::Failed(e)) => Err(e.into()),
		None => Err("Submission ended without a result".into()),
	}
}

/// Loads the configuration file if one was given and applies the transport override.
async fn load_config(args: &Args) -> Result<Config, cupcake_config::ConfigError> {
	let mut config = match &args.config {
		Some(path) => Config::from_file(path).await?,
		None => Config::default(),
	};

	if let Some(transport) = &args.transport {
		tracing::debug!(transport = %transport, "Overriding primary transport");
		config.transport.primary = transport.clone();
	}

	Ok(config)
}

/// Applies the arguments to a fresh form, in the order a user would fill it in.
fn fill_form(args: &Args) -> Result<OrderForm, FormError> {
	let mut form = OrderForm::new();

	form.select_cake(parse_cake(&args.cake)?)?;

	let quantity = form.set_quantity(args.quantity);
	if quantity != args.quantity {
		tracing::warn!(requested = args.quantity, applied = quantity, "Quantity out of range, adjusted");
	}

	form.set_special_requests(args.special_requests || args.extra_frosting || args.add_sprinkles);
	form.set_extra_frosting(args.extra_frosting);
	form.set_add_sprinkles(args.add_sprinkles);

	form.set_name(args.name.as_str());
	form.set_street_address(args.street_address.as_str());
	form.set_city(args.city.as_str());
	form.set_zip(args.zip.as_str());

	Ok(form)
}
