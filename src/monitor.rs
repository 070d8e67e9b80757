//! Alerting rules with a `hostmap` annotation and the hosts they apply to.
//!
//! Rules are fetched from prometheus; the `hostmap` annotation of a rule holds a series selector
//! whose `name` labels are the hosts the rule is monitored on.
use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};

use crate::{
	pairset::PairSet,
	prometheus::{
		api::{AlertState, AlertsData, Labels, RuleGroup, RuleKind, TargetsData},
		Error, PrometheusClient,
	},
};

/// annotation carrying the host resolving selector of a rule
pub const HOSTMAP_ANNOTATION: &str = "hostmap";
/// label carrying the host name of a series, target or alert
pub const HOST_LABEL: &str = "name";
/// label carrying the rule name of an alert
pub const ALERTNAME_LABEL: &str = "alertname";

/// An alerting rule which opted into nagios via its `hostmap` annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRule {
	pub name: String,
	pub hostmap: String,
}

/// An [AlertRule] resolved to the hosts it currently applies to
///
/// Rules sharing a name share one `Monitor` (see [resolve_monitors]), so their services are
/// emitted once rather than once per rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
	pub name: String,
	pub hosts: BTreeSet<String>,
}

/// Alerting rules carrying a `hostmap` annotation, in the order prometheus reports them.
pub fn alert_rules(groups: &[RuleGroup]) -> Vec<AlertRule> {
	groups
		.iter()
		.flat_map(|group| group.rules.iter())
		.filter(|rule| rule.kind == RuleKind::Alerting)
		.filter_map(|rule| {
			rule.annotations.get(HOSTMAP_ANNOTATION).map(|hostmap| AlertRule {
				name: rule.name.clone(),
				hostmap: hostmap.clone(),
			})
		})
		.collect()
}

/// The distinct values of the `name` label of `series`.
pub fn hosts_of<'a>(series: impl IntoIterator<Item = &'a Labels>) -> BTreeSet<String> {
	series
		.into_iter()
		.filter_map(|labels| {
			let host = labels.get(HOST_LABEL);
			if host.is_none() {
				tracing::debug!(?labels, "ignoring series without host label");
			}
			host.cloned()
		})
		.collect()
}

/// Hosts prometheus currently scrapes.
pub fn active_hosts(targets: &TargetsData) -> HashSet<String> {
	hosts_of(targets.active_targets.iter().map(|target| &target.labels)).into_iter().collect()
}

/// `(host, alertname)` of every firing alert.
pub fn firing_alerts(alerts: &AlertsData) -> PairSet<String> {
	alerts
		.alerts
		.iter()
		.filter(|alert| alert.state == AlertState::Firing)
		.filter_map(|alert| {
			match (alert.labels.get(HOST_LABEL), alert.labels.get(ALERTNAME_LABEL)) {
				(Some(host), Some(alertname)) => Some((host.clone(), alertname.clone())),
				_ => {
					tracing::debug!(
						labels = ?alert.labels,
						"ignoring firing alert without host or name"
					);
					None
				}
			}
		})
		.collect()
}

/// Resolve every rule to its hosts by looking up the series its hostmap selects between `start`
/// and `end`.
///
/// Rules sharing a name are merged into a single [Monitor]. The result is sorted by name.
pub async fn resolve_monitors(
	client: &PrometheusClient,
	rules: &[AlertRule],
	start: DateTime<Utc>,
	end: DateTime<Utc>,
) -> Result<Vec<Monitor>, Error> {
	let mut monitors: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();

	for rule in rules {
		let series = client.series(&rule.hostmap, start, end).await?;
		let hosts = hosts_of(&series);

		tracing::debug!(
			rule = %rule.name,
			hostmap = %rule.hostmap,
			hosts = hosts.len(),
			"resolved hostmap"
		);

		monitors.entry(rule.name.as_str()).or_default().extend(hosts);
	}

	Ok(monitors
		.into_iter()
		.map(|(name, hosts)| Monitor { name: name.to_owned(), hosts })
		.collect())
}
