//! the parts of the prometheus http api we consume
pub mod api;
pub mod client;

pub use client::{Error, PrometheusClient};
