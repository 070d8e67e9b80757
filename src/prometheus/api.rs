//! data structures for deserializing prometheus api responses
use std::collections::HashMap;

use serde::Deserialize;

/// label set of a series, target or alert
pub type Labels = HashMap<String, String>;

/// the envelope every `/api/v1` response is wrapped in
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Response<T> {
	Success {
		data: T,
	},
	Error {
		#[serde(rename = "errorType")]
		error_type: String,
		error: String,
	},
}

/// `data` of `GET /api/v1/rules`
#[derive(Debug, Deserialize)]
pub struct RulesData {
	pub groups: Vec<RuleGroup>,
}

#[derive(Debug, Deserialize)]
pub struct RuleGroup {
	pub rules: Vec<Rule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
	Alerting,
	Recording,
	#[serde(other)]
	Unknown,
}

#[derive(Debug, Deserialize)]
pub struct Rule {
	#[serde(rename = "type")]
	pub kind: RuleKind,
	pub name: String,
	/// recording rules carry no annotations at all
	#[serde(default)]
	pub annotations: HashMap<String, String>,
}

/// `data` of `GET /api/v1/series`
pub type SeriesData = Vec<Labels>;

/// `data` of `GET /api/v1/targets`
#[derive(Debug, Deserialize)]
pub struct TargetsData {
	#[serde(rename = "activeTargets")]
	pub active_targets: Vec<Target>,
}

#[derive(Debug, Deserialize)]
pub struct Target {
	pub labels: Labels,
}

/// `data` of `GET /api/v1/alerts`
#[derive(Debug, Deserialize)]
pub struct AlertsData {
	pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
	Firing,
	Pending,
	Inactive,
	#[serde(other)]
	Unknown,
}

#[derive(Debug, Deserialize)]
pub struct Alert {
	pub state: AlertState,
	pub labels: Labels,
}
