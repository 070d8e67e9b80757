//! http client for the prometheus api
//!
//! Every request is awaited before the next one is issued and nothing is retried. A failing
//! request fails the whole run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use super::api::{AlertsData, Response, RulesData, SeriesData, TargetsData};

/// Error of a single prometheus api call
#[derive(Debug, Error)]
pub enum Error {
	#[error("could not construct http client")]
	Client(#[source] reqwest::Error),
	#[error("prometheus url {0} can't have api paths appended")]
	BaseUrl(Url),
	#[error("request to {url} failed")]
	Request {
		url: Url,
		#[source]
		source: reqwest::Error,
	},
	#[error("{url} responded with http status {status}")]
	Status { url: Url, status: StatusCode },
	#[error("could not decode response of {url}")]
	Decode {
		url: Url,
		#[source]
		source: serde_json::Error,
	},
	#[error("prometheus rejected {url}: {error_type}: {error}")]
	Api { url: Url, error_type: String, error: String },
}

#[derive(Debug, Clone)]
pub struct PrometheusClient {
	base: Url,
	http: reqwest::Client,
}

impl PrometheusClient {
	/// Client for the prometheus instance at `base`. Without a `timeout` requests may hang
	/// forever.
	pub fn new(base: Url, timeout: Option<Duration>) -> Result<Self, Error> {
		let mut builder = reqwest::Client::builder();
		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}

		let http = builder.build().map_err(Error::Client)?;

		Ok(Self { base, http })
	}

	/// `GET /api/v1/rules`
	pub async fn rules(&self) -> Result<RulesData, Error> {
		self.get("rules", &[]).await
	}

	/// `GET /api/v1/series` for all series matching `expr` between `start` and `end`
	pub async fn series(
		&self,
		expr: &str,
		start: DateTime<Utc>,
		end: DateTime<Utc>,
	) -> Result<SeriesData, Error> {
		let start = start.timestamp().to_string();
		let end = end.timestamp().to_string();

		self.get("series", &[("match[]", expr), ("start", start.as_str()), ("end", end.as_str())])
			.await
	}

	/// `GET /api/v1/targets`
	pub async fn targets(&self) -> Result<TargetsData, Error> {
		self.get("targets", &[]).await
	}

	/// `GET /api/v1/alerts`
	pub async fn alerts(&self) -> Result<AlertsData, Error> {
		self.get("alerts", &[]).await
	}

	/// url of `/api/v1/<endpoint>` below the base url
	fn endpoint(&self, endpoint: &str) -> Result<Url, Error> {
		let mut url = self.base.clone();
		url.path_segments_mut()
			.map_err(|_| Error::BaseUrl(self.base.clone()))?
			.pop_if_empty()
			.extend(["api", "v1", endpoint]);

		Ok(url)
	}

	async fn get<T: DeserializeOwned>(
		&self,
		endpoint: &str,
		query: &[(&str, &str)],
	) -> Result<T, Error> {
		let url = self.endpoint(endpoint)?;

		tracing::debug!(%url, ?query, "querying prometheus");

		let response = self
			.http
			.get(url.clone())
			.query(query)
			.send()
			.await
			.map_err(|source| Error::Request { url: url.clone(), source })?;

		let status = response.status();
		let body = response
			.bytes()
			.await
			.map_err(|source| Error::Request { url: url.clone(), source })?;

		// prometheus answers 4xx/5xx with an error envelope, prefer that over the bare status
		match serde_json::from_slice::<Response<T>>(&body) {
			Ok(Response::Success { data }) => Ok(data),
			Ok(Response::Error { error_type, error }) => {
				Err(Error::Api { url, error_type, error })
			}
			Err(_) if !status.is_success() => Err(Error::Status { url, status }),
			Err(source) => Err(Error::Decode { url, source }),
		}
	}
}
