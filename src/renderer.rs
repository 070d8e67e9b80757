//! Renders nagios object definitions and external commands via tera templates.

use anyhow::{Context, Result};
use serde::Serialize;
use tera::Tera;

use crate::{pairset::PairSet, reconcile::ServiceEntry};

const SERVICE: &str = "service";
const DEPENDENCY: &str = "servicedependency";
const REFRESH: &str = "refresh";

/// template names without `.html` suffix, tera must not escape anything
const TEMPLATES: [(&str, &str); 3] = [
	(
		SERVICE,
		"define service {
   host_name             {{ host }}
   service_description   {{ service }}
   use                   {{ template }}
}",
	),
	(
		DEPENDENCY,
		"define servicedependency{
   host_name             {{ host }}
   service_description   {{ parent }}
   dependent_host_name   {{ host }}
   dependent_service_description {{ service }}
   execution_failure_criteria    w,u,c
   notification_failure_criteria w,u,c
}",
	),
	(
		REFRESH,
		"[{{ timestamp }}] PROCESS_SERVICE_CHECK_RESULT;{{ host }};{{ service }};0;Refreshed OK",
	),
];

#[derive(Serialize)]
struct ServiceContext<'a> {
	host: &'a str,
	service: &'a str,
	template: &'a str,
	parent: &'a str,
	timestamp: i64,
}

/// Nagios text renderer
pub struct NagiosRenderer {
	tera: Tera,
	/// `use` of every service definition
	service_template: String,
	/// service every generated service depends on
	dependency_service: String,
}

impl NagiosRenderer {
	pub fn new(service_template: &str, dependency_service: &str) -> Result<Self> {
		let mut tera = Tera::default();
		tera.add_raw_templates(TEMPLATES).context("could not parse nagios templates")?;

		Ok(Self {
			tera,
			service_template: service_template.to_owned(),
			dependency_service: dependency_service.to_owned(),
		})
	}

	fn render(&self, template: &str, entry: &ServiceEntry, timestamp: i64) -> Result<String> {
		let context = ServiceContext {
			host: &entry.emitted_host,
			service: &entry.monitor,
			template: &self.service_template,
			parent: &self.dependency_service,
			timestamp,
		};

		let mut rendered = self
			.tera
			.render(template, &tera::Context::from_serialize(&context)?)
			.with_context(|| format!("failed to render {template} for {}", entry.emitted_host))?;
		rendered.push('\n');

		Ok(rendered)
	}

	/// The service definitions of `entries`, each followed by its dependency definition if
	/// `dependencies` is set.
	pub fn render_services(&self, entries: &[ServiceEntry], dependencies: bool) -> Result<String> {
		let mut out = String::new();

		for entry in entries {
			out.push_str(&self.render(SERVICE, entry, 0)?);
			if dependencies {
				out.push_str(&self.render(DEPENDENCY, entry, 0)?);
			}
		}

		Ok(out)
	}

	/// Passive `OK` check results at `timestamp` for every entry without a firing alert. Returns
	/// the commands and how many there are.
	pub fn render_refresh(
		&self,
		entries: &[ServiceEntry],
		firing: &PairSet<String>,
		timestamp: i64,
	) -> Result<(String, usize)> {
		let mut out = String::new();
		let mut count = 0;

		// the alerting pipeline pushes state for firing alerts, don't overwrite it
		for entry in entries.iter().filter(|entry| !firing.contains(&entry.host, &entry.monitor)) {
			out.push_str(&self.render(REFRESH, entry, timestamp)?);
			count += 1;
		}

		Ok((out, count))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entry(host: &str, emitted_host: &str, monitor: &str) -> ServiceEntry {
		ServiceEntry {
			host: host.to_owned(),
			emitted_host: emitted_host.to_owned(),
			monitor: monitor.to_owned(),
		}
	}

	fn renderer() -> NagiosRenderer {
		NagiosRenderer::new("promservice", "ping").unwrap()
	}

	#[test]
	fn service_definition() {
		let out = renderer().render_services(&[entry("db1", "db1", "DiskFull")], false).unwrap();

		assert_eq!(
			out,
			"define service {
   host_name             db1
   service_description   DiskFull
   use                   promservice
}
"
		);
	}

	#[test]
	fn dependency_follows_each_service() {
		let entries = [
			entry("db1", "db1.example.com", "DiskFull"),
			entry("db2", "db2.example.com", "DiskFull"),
		];

		let out = renderer().render_services(&entries, true).unwrap();

		assert_eq!(
			out,
			"define service {
   host_name             db1.example.com
   service_description   DiskFull
   use                   promservice
}
define servicedependency{
   host_name             db1.example.com
   service_description   ping
   dependent_host_name   db1.example.com
   dependent_service_description DiskFull
   execution_failure_criteria    w,u,c
   notification_failure_criteria w,u,c
}
define service {
   host_name             db2.example.com
   service_description   DiskFull
   use                   promservice
}
define servicedependency{
   host_name             db2.example.com
   service_description   ping
   dependent_host_name   db2.example.com
   dependent_service_description DiskFull
   execution_failure_criteria    w,u,c
   notification_failure_criteria w,u,c
}
"
		);
	}

	#[test]
	fn configured_template_and_parent_service() {
		let renderer = NagiosRenderer::new("generic-passive", "check_ssh").unwrap();

		let out = renderer.render_services(&[entry("db1", "db1", "Load")], true).unwrap();

		assert!(out.contains("   use                   generic-passive\n"));
		assert!(out.contains("   service_description   check_ssh\n"));
	}

	#[test]
	fn values_are_not_html_escaped() {
		let out =
			renderer().render_services(&[entry("db1", "db1", "Disk<90%&Slow>")], false).unwrap();

		assert!(out.contains("service_description   Disk<90%&Slow>\n"));
	}

	#[test]
	fn empty_entries_render_nothing() {
		assert_eq!(renderer().render_services(&[], true).unwrap(), "");
	}

	#[test]
	fn refresh_skips_firing_pairs_by_unsuffixed_host() {
		let entries = [
			entry("db1", "db1.example.com", "DiskFull"),
			entry("db1", "db1.example.com", "DiskWarn"),
			entry("db2", "db2.example.com", "DiskFull"),
		];
		let firing: PairSet<String> =
			[("db1".to_owned(), "DiskFull".to_owned())].into_iter().collect();

		let (out, count) = renderer().render_refresh(&entries, &firing, 1_650_000_000).unwrap();

		assert_eq!(count, 2);
		assert_eq!(
			out,
			"[1650000000] PROCESS_SERVICE_CHECK_RESULT;db1.example.com;DiskWarn;0;Refreshed OK
[1650000000] PROCESS_SERVICE_CHECK_RESULT;db2.example.com;DiskFull;0;Refreshed OK
"
		);
	}
}
