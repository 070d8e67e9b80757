//! One reconciliation pass: prometheus state in, nagios configuration out.
//!
//! 1. active scrape targets are the hosts we know about
//! 2. alerting rules with a `hostmap` annotation become [Monitor]s
//! 3. firing alerts suppress passive refreshes of their service
//!
//! The refresh command file is written on every pass, before the service definition file is
//! replaced if its content changed.

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::{
	monitor::{self, Monitor},
	output,
	prometheus::PrometheusClient,
	renderer::NagiosRenderer,
	settings::Settings,
};

/// Result of a successful pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	/// the service definition file already had the rendered content
	Unchanged,
	/// the service definition file was replaced
	Changed,
}

/// A service we emit: `monitor` on `host`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
	/// host name as prometheus reports it, used to match firing alerts
	pub host: String,
	/// host name as nagios knows it
	pub emitted_host: String,
	pub monitor: String,
}

/// The services to emit, ordered by monitor name and then host name.
///
/// Hosts which aren't an active target are dropped. `suffix` is appended to the emitted host
/// names only.
pub fn plan(
	monitors: &[Monitor],
	active_hosts: &HashSet<String>,
	suffix: Option<&str>,
) -> Vec<ServiceEntry> {
	let mut monitors: Vec<&Monitor> = monitors.iter().collect();
	monitors.sort_by(|a, b| a.name.cmp(&b.name));

	monitors
		.into_iter()
		.flat_map(|monitor| {
			// `hosts` is a BTreeSet, iteration is sorted
			monitor
				.hosts
				.iter()
				.filter(move |host| active_hosts.contains(*host))
				.map(move |host| ServiceEntry {
					host: host.clone(),
					emitted_host: match suffix {
						Some(suffix) => format!("{host}.{suffix}"),
						None => host.clone(),
					},
					monitor: monitor.name.clone(),
				})
		})
		.collect()
}

/// Run a single pass with `settings`.
pub async fn run(settings: &Settings) -> Result<Outcome> {
	let client = PrometheusClient::new(settings.prometheus.clone(), settings.http_timeout)
		.context("failed to construct prometheus client")?;

	let targets = client.targets().await.context("failed to fetch active targets")?;
	let active_hosts = monitor::active_hosts(&targets);
	tracing::debug!(hosts = active_hosts.len(), "fetched active targets");

	let groups = client.rules().await.context("failed to fetch rules")?.groups;
	let rules = monitor::alert_rules(&groups);

	let end = Utc::now();
	let start = end
		- chrono::Duration::from_std(settings.lookback).context("lookback window out of range")?;
	let monitors = monitor::resolve_monitors(&client, &rules, start, end)
		.await
		.context("failed to resolve hostmaps")?;

	let alerts = client.alerts().await.context("failed to fetch alerts")?;
	let firing = monitor::firing_alerts(&alerts);
	if firing.is_empty() {
		tracing::debug!("no alerts firing");
	}

	let entries = plan(&monitors, &active_hosts, settings.host_suffix());

	let renderer = NagiosRenderer::new(&settings.service_template, &settings.dependency_service)?;
	let services = renderer.render_services(&entries, settings.dependon)?;

	// a failed refresh write must not leave a replaced target behind, the next pass would see it
	// unchanged and nagios would never be reloaded
	let mut refreshed = 0;
	if let Some(path) = &settings.refreshstate {
		let (commands, count) =
			renderer.render_refresh(&entries, &firing, Utc::now().timestamp())?;
		output::write_unconditionally(path, &commands)
			.with_context(|| format!("failed to write {}", path.display()))?;
		refreshed = count;
	}

	let changed = output::write_if_changed(&settings.target, &services)
		.with_context(|| format!("failed to write {}", settings.target.display()))?;

	tracing::info!(
		monitors = monitors.len(),
		services = entries.len(),
		firing = firing.len(),
		refreshed,
		changed,
		"reconciled"
	);

	Ok(if changed { Outcome::Changed } else { Outcome::Unchanged })
}
