//! command line arguments, config file and environment merged into [Settings]
use std::{ffi::OsString, path::PathBuf, str::FromStr, time::Duration};

use clap::{Arg, ArgMatches, Command};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use thiserror::Error;
use url::Url;

use crate::log::LogSettings;

/// prefix of environment variables carrying settings, e.g. `PROM2NAGIOS_TARGET`
const ENV_PREFIX: &str = "PROM2NAGIOS";

/// Error while assembling [Settings]. All of these are usage errors.
#[derive(Debug, Error)]
pub enum SettingsError {
	/// clap rejected the command line (or `--help`/`--version` was requested)
	#[error(transparent)]
	Cli(#[from] clap::Error),
	#[error("Must specify both prometheus base and target file")]
	MissingArguments,
	#[error("invalid log level {0:?}")]
	InvalidLogLevel(String),
	#[error("can't load config")]
	Config(#[from] ConfigError),
}

#[serde_as]
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
	/// base url of the prometheus http api
	pub prometheus: Url,
	/// service definition file we generate
	pub target: PathBuf,
	/// appended to every host name we emit
	#[serde(default)]
	pub hostsuffix: Option<String>,
	/// also emit a dependency on the `ping` service of each host
	#[serde(default)]
	pub dependon: bool,
	/// file receiving passive check result commands
	#[serde(default)]
	pub refreshstate: Option<PathBuf>,
	/// how far back the series lookup of a hostmap expression reaches
	#[serde_as(as = "DurationSeconds<u64>")]
	pub lookback: Duration,
	#[serde_as(as = "Option<DurationSeconds<f64>>")]
	#[serde(default)]
	pub http_timeout: Option<Duration>,
	/// nagios service template every generated service uses
	pub service_template: String,
	/// service the generated services depend on when `dependon` is set
	pub dependency_service: String,
	pub log: LogSettings,
}

impl Settings {
	/// Load settings from the process arguments.
	pub fn load() -> Result<Self, SettingsError> {
		Self::from_args(std::env::args_os())
	}

	/// Load settings from an explicit argument list. The first item is the binary name.
	pub fn from_args<I, T>(args: I) -> Result<Self, SettingsError>
	where
		I: IntoIterator<Item = T>,
		T: Into<OsString> + Clone,
	{
		let opts = Self::command().try_get_matches_from(args)?;
		Self::from_matches(&opts)
	}

	fn command() -> Command<'static> {
		Command::new(clap::crate_name!())
			.version(clap::crate_version!())
			.about(clap::crate_description!())
			.args(&[
				Arg::new("prometheus")
					.help("Base URL of prometheus [default: http://localhost:9090]")
					.takes_value(true)
					.long("prometheus"),
				Arg::new("target").help("Filename to write to").takes_value(true).long("target"),
				Arg::new("hostsuffix")
					.help("Add suffix to hostnames")
					.takes_value(true)
					.long("hostsuffix"),
				Arg::new("dependon").help("Add dependency on ping check").long("dependon"),
				Arg::new("refreshstate")
					.help("Write passive check refresh commands to this file")
					.takes_value(true)
					.long("refreshstate"),
				Arg::new("config")
					.help("path of an optional config file")
					.takes_value(true)
					.short('c')
					.long("config"),
				Arg::new("level")
					.help("log level")
					.possible_values(["error", "warn", "info", "debug", "trace"])
					.ignore_case(true)
					.takes_value(true)
					.long("log"),
			])
	}

	fn from_matches(opts: &ArgMatches) -> Result<Self, SettingsError> {
		let mut builder = Config::builder()
			.set_default("prometheus", "http://localhost:9090")?
			.set_default("dependon", false)?
			.set_default("lookback", 12_i64 * 60 * 60)?
			.set_default("service_template", "promservice")?
			.set_default("dependency_service", "ping")?
			.set_default("log.level", "warn")?;

		if let Some(path) = opts.value_of("config") {
			builder = builder.add_source(File::with_name(path));
		}

		let owned = |key: &str| opts.value_of(key).map(str::to_owned);

		let conf = builder
			.add_source(
				Environment::with_prefix(ENV_PREFIX)
					.prefix_separator("_")
					.separator("__")
					.try_parsing(true),
			)
			.set_override_option("prometheus", owned("prometheus"))?
			.set_override_option("target", owned("target"))?
			.set_override_option("hostsuffix", owned("hostsuffix"))?
			.set_override_option("refreshstate", owned("refreshstate"))?
			.set_override_option("log.level", owned("level"))?
			.set_override_option("dependon", opts.is_present("dependon").then(|| true))?
			.build()?;

		for key in ["prometheus", "target"] {
			match conf.get_string(key) {
				Ok(value) if !value.is_empty() => {}
				Ok(_) | Err(ConfigError::NotFound(_)) => {
					return Err(SettingsError::MissingArguments)
				}
				Err(err) => return Err(err.into()),
			}
		}

		let settings: Settings = conf.try_deserialize()?;

		if tracing::Level::from_str(&settings.log.level).is_err() {
			return Err(SettingsError::InvalidLogLevel(settings.log.level));
		}

		Ok(settings)
	}

	/// the suffix appended to emitted host names, without a leading dot
	pub fn host_suffix(&self) -> Option<&str> {
		self.hostsuffix
			.as_deref()
			.map(|suffix| suffix.trim_start_matches('.'))
			.filter(|suffix| !suffix.is_empty())
	}
}
