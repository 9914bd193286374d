#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Eurostat SDMX-JSON dataset fetching and parsing.
//!
//! The metrics pipeline consumes two Eurostat datasets: municipal waste per
//! capita (`env_wasmun`) and population on 1 January (`demo_pjan`). Each is
//! fetched through the [`DatasetFetcher`] trait and folded into an
//! [`EntityLookup`] keyed by country code.

pub mod client;
pub mod http;
pub mod sdmx;

use std::collections::BTreeMap;

use async_trait::async_trait;
use eraswap_metrics_models::EntityLookup;
use serde::Deserialize;
use strum_macros::{AsRefStr, Display};

pub use client::EurostatClient;

/// Errors that can occur while fetching or parsing a dataset.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload decoded but does not have the expected shape.
    #[error("Malformed payload: {message}")]
    Malformed {
        /// Description of what went wrong.
        message: String,
    },
}

impl SourceError {
    /// Returns `true` for transport-level failures (connection errors and
    /// non-success statuses) as opposed to payload problems.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }
}

/// The two datasets the metrics pipeline joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Dataset {
    /// Municipal waste generated, kg per inhabitant.
    Waste,
    /// Total population on 1 January.
    Population,
}

/// Where and how to request a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetEndpoint {
    /// Dataset URL without query string.
    pub url: String,
    /// Fixed query parameters (frequency, unit, year filters, ...).
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

/// Fetches a dataset and folds it into an [`EntityLookup`].
///
/// [`EurostatClient`] is the production implementation; tests substitute
/// in-memory fakes.
#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    /// Fetches `dataset` and parses it into a per-country lookup.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails, the server answers
    /// with a non-success status, or the payload cannot be parsed.
    async fn fetch_dataset(&self, dataset: Dataset) -> Result<EntityLookup, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_network_errors() {
        let status = SourceError::Status {
            url: "https://example.invalid".to_string(),
            status: 503,
        };
        assert!(status.is_network());

        let malformed = SourceError::Malformed {
            message: "missing geo".to_string(),
        };
        assert!(!malformed.is_network());

        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!SourceError::Json(json).is_network());
    }

    #[test]
    fn dataset_names_are_snake_case() {
        assert_eq!(Dataset::Waste.to_string(), "waste");
        assert_eq!(Dataset::Population.as_ref(), "population");
    }
}
