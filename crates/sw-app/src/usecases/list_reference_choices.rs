//! Use case for the country / region choices shown by address steps.

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, info_span, Instrument};

use sw_core::ports::{ReferenceDataPort, ReferenceOption};

/// Choice lists for one render of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceChoices {
    pub countries: Vec<ReferenceOption>,
    /// Empty until a country is selected.
    pub regions: Vec<ReferenceOption>,
}

/// Loads reference data for a step renderer.
///
/// ## Behavior
/// - Always lists countries
/// - Lists regions only for the selected country, so a step that has no
///   country yet does not trigger a region lookup
pub struct ListReferenceChoices {
    reference_data: Arc<dyn ReferenceDataPort>,
}

impl ListReferenceChoices {
    pub fn new(reference_data: Arc<dyn ReferenceDataPort>) -> Self {
        Self { reference_data }
    }

    pub async fn execute(&self, selected_country: Option<&str>) -> Result<ReferenceChoices> {
        let span = info_span!(
            "usecase.list_reference_choices.execute",
            country = selected_country.unwrap_or("")
        );

        async {
            let countries = self.reference_data.countries().await?;
            let regions = match selected_country.map(str::trim).filter(|c| !c.is_empty()) {
                Some(country) => self.reference_data.regions(country).await?,
                None => Vec::new(),
            };

            info!(
                countries = countries.len(),
                regions = regions.len(),
                "reference choices loaded"
            );
            Ok(ReferenceChoices { countries, regions })
        }
        .instrument(span)
        .await
    }
}
