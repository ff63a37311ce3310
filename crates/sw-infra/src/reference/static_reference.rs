//! Reference data read from a TOML table of countries and their regions.

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use sw_core::ports::{ReferenceDataPort, ReferenceOption};

const BUNDLED_REFERENCE: &str = include_str!("../../assets/reference.toml");

#[derive(Debug, Deserialize)]
struct ReferenceFile {
    #[serde(default)]
    countries: Vec<CountryEntry>,
}

#[derive(Debug, Deserialize)]
struct CountryEntry {
    code: String,
    name: String,
    #[serde(default)]
    regions: Vec<OptionEntry>,
}

#[derive(Debug, Deserialize)]
struct OptionEntry {
    code: String,
    name: String,
}

impl From<OptionEntry> for ReferenceOption {
    fn from(entry: OptionEntry) -> Self {
        ReferenceOption::new(entry.code, entry.name)
    }
}

pub struct StaticReferenceData {
    countries: Vec<ReferenceOption>,
    regions: HashMap<String, Vec<ReferenceOption>>,
}

impl StaticReferenceData {
    /// The table shipped with the crate.
    pub fn bundled() -> anyhow::Result<Self> {
        Self::from_toml_str(BUNDLED_REFERENCE).context("Failed to parse bundled reference data")
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let file: ReferenceFile = toml::from_str(content)?;
        let mut countries = Vec::with_capacity(file.countries.len());
        let mut regions = HashMap::new();
        for country in file.countries {
            countries.push(ReferenceOption::new(country.code.clone(), country.name));
            regions.insert(
                country.code.to_ascii_uppercase(),
                country.regions.into_iter().map(ReferenceOption::from).collect(),
            );
        }
        debug!(countries = countries.len(), "reference data loaded");
        Ok(Self { countries, regions })
    }
}

#[async_trait]
impl ReferenceDataPort for StaticReferenceData {
    async fn countries(&self) -> anyhow::Result<Vec<ReferenceOption>> {
        Ok(self.countries.clone())
    }

    /// Unknown country codes have no regions.
    async fn regions(&self, country_code: &str) -> anyhow::Result<Vec<ReferenceOption>> {
        Ok(self
            .regions
            .get(&country_code.trim().to_ascii_uppercase())
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bundled_table_lists_countries_in_file_order() {
        let data = StaticReferenceData::bundled().unwrap();

        let countries = data.countries().await.unwrap();

        assert_eq!(countries.first(), Some(&ReferenceOption::new("GH", "Ghana")));
        assert!(countries.iter().any(|c| c.code == "KE"));
    }

    #[tokio::test]
    async fn regions_lookup_ignores_case() {
        let data = StaticReferenceData::bundled().unwrap();

        let regions = data.regions("ke").await.unwrap();

        assert!(regions.contains(&ReferenceOption::new("KE-30", "Nairobi City")));
    }

    #[tokio::test]
    async fn unknown_country_has_no_regions() {
        let data = StaticReferenceData::bundled().unwrap();

        assert!(data.regions("XX").await.unwrap().is_empty());
    }

    #[test]
    fn invalid_table_returns_error() {
        let result = StaticReferenceData::from_toml_str("[[countries]]\ncode = 4");

        assert!(result.is_err());
    }
}
