//! generates passive nagios services from prometheus alerting rules
//!
//! Every alerting rule carrying a `hostmap` annotation becomes a nagios service on each active
//! host its hostmap selector matches. Meant to be run periodically; the exit status tells the
//! scheduler whether nagios has to reload its configuration:
//!
//! - `0` the service definition file is unchanged
//! - `1` the service definition file was rewritten
//! - `2` invalid command line or configuration
//! - `3` the pass failed (prometheus unreachable, malformed response, io error)
use std::process::ExitCode;

use settings::{Settings, SettingsError};

use crate::reconcile::Outcome;

mod log;
mod monitor;
mod output;
mod pairmap;
mod pairset;
mod prometheus;
mod reconcile;
mod renderer;
mod settings;

const EXIT_CHANGED: u8 = 1;
const EXIT_USAGE: u8 = 2;
const EXIT_FAULT: u8 = 3;

/// a panic is a failed pass as well
fn setup_panic_handler() {
	let default_panic = std::panic::take_hook();
	std::panic::set_hook(Box::new(move |info| {
		default_panic(info);
		std::process::exit(EXIT_FAULT.into());
	}));
}

impl From<Outcome> for ExitCode {
	fn from(outcome: Outcome) -> Self {
		match outcome {
			Outcome::Unchanged => ExitCode::SUCCESS,
			Outcome::Changed => ExitCode::from(EXIT_CHANGED),
		}
	}
}

/// the entry point of the program
#[tokio::main(flavor = "current_thread")]
pub async fn main() -> ExitCode {
	setup_panic_handler();

	let settings = match Settings::load() {
		Ok(settings) => settings,
		// prints usage, exits 0 for --help/--version and 2 otherwise
		Err(SettingsError::Cli(err)) => err.exit(),
		Err(err) => {
			// tracing isn't setup yet
			eprintln!("{:#}", anyhow::Error::from(err));
			return ExitCode::from(EXIT_USAGE);
		}
	};

	if let Err(err) = log::setup_logging(&settings.log) {
		eprintln!("could not setup logging: {err:#}");
		return ExitCode::from(EXIT_USAGE);
	}

	match reconcile::run(&settings).await {
		Ok(outcome) => outcome.into(),
		Err(err) => {
			tracing::error!("{err:?}");
			ExitCode::from(EXIT_FAULT)
		}
	}
}
