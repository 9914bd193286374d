//! SDMX-JSON payload types and parsing.
//!
//! Eurostat's dissemination API returns a dimension-indexed table: a
//! sparse `value` map from flat position to number, and per-dimension
//! `category.index` (code to position) and `category.label` (code to name)
//! maps. With every dimension except `geo` filtered to a single category,
//! the flat position is the `geo` position.
//!
//! See <https://wikis.ec.europa.eu/display/EUROSTATHELP/API+Statistics+-+data+query>

use std::collections::BTreeMap;

use eraswap_metrics_models::{EntityLookup, EntityObservation};
use serde::Deserialize;

use crate::SourceError;

/// Maximum length of the body preview included in parse error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// A decoded SDMX-JSON dataset response.
#[derive(Debug, Clone, Deserialize)]
pub struct SdmxResponse {
    /// Dataset title.
    #[serde(default)]
    pub label: Option<String>,
    /// Last update timestamp as reported by Eurostat.
    #[serde(default)]
    pub updated: Option<String>,
    /// Flat position (as a decimal string) to observation value.
    pub value: BTreeMap<String, Option<f64>>,
    /// Dimension descriptors. Only `geo` is used.
    pub dimension: SdmxDimensions,
}

/// The dimension block of an [`SdmxResponse`].
#[derive(Debug, Clone, Deserialize)]
pub struct SdmxDimensions {
    /// Geographic dimension (country codes).
    pub geo: SdmxDimension,
}

/// A single dimension descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct SdmxDimension {
    /// Categories of this dimension.
    pub category: SdmxCategory,
}

/// Category index and labels for one dimension.
#[derive(Debug, Clone, Deserialize)]
pub struct SdmxCategory {
    /// Code to position.
    pub index: BTreeMap<String, u64>,
    /// Code to display name.
    pub label: BTreeMap<String, String>,
}

/// Parses a raw response body into an [`EntityLookup`].
///
/// # Errors
///
/// Returns [`SourceError::Json`] if the body is not a structurally valid
/// SDMX-JSON document, or [`SourceError::Malformed`] per [`parse_sdmx`].
pub fn parse_sdmx_str(body: &str) -> Result<EntityLookup, SourceError> {
    let response: SdmxResponse = serde_json::from_str(body).inspect_err(|e| {
        let preview = if body.len() > BODY_PREVIEW_LEN {
            // Back off to a char boundary so slicing can't panic.
            let mut end = BODY_PREVIEW_LEN;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}...", &body[..end])
        } else {
            body.to_string()
        };
        log::error!(
            "SDMX parse failed: {e}\n  \
             received: {} bytes\n  \
             body preview: {preview}",
            body.len()
        );
    })?;

    if let Some(label) = &response.label {
        log::debug!(
            "Parsing dataset {label:?} (updated {})",
            response.updated.as_deref().unwrap_or("unknown")
        );
    }

    parse_sdmx(&response)
}

/// Folds an [`SdmxResponse`] into a per-country lookup.
///
/// Values at positions with no `geo` code, null values, and codes with a
/// missing or blank label are skipped. A position key that is not an
/// integer is a structural anomaly and fails the whole parse.
///
/// # Errors
///
/// Returns [`SourceError::Malformed`] if a value position is not a
/// non-negative integer.
pub fn parse_sdmx(response: &SdmxResponse) -> Result<EntityLookup, SourceError> {
    let category = &response.dimension.geo.category;

    let position_to_code: BTreeMap<u64, &str> = category
        .index
        .iter()
        .map(|(code, position)| (*position, code.as_str()))
        .collect();

    let mut lookup = EntityLookup::new();

    for (position, value) in &response.value {
        let position_num: u64 = position.parse().map_err(|_| SourceError::Malformed {
            message: format!("value position {position:?} is not an integer"),
        })?;

        let Some(value) = value.filter(|v| v.is_finite()) else {
            continue;
        };

        let Some(code) = position_to_code.get(&position_num) else {
            log::debug!("No geo code at position {position_num}, skipping");
            continue;
        };

        let Some(name) = category
            .label
            .get(*code)
            .filter(|label| !label.trim().is_empty())
        else {
            log::debug!("No label for geo code {code}, skipping");
            continue;
        };

        lookup.insert(
            (*code).to_string(),
            EntityObservation {
                name: name.clone(),
                value,
                position: position_num,
            },
        );
    }

    Ok(lookup)
}
