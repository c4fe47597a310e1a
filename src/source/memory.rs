//! In-memory record source for tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use super::{CountryFeature, RecordSource, SourceError};
use crate::data::PopulationRecord;
use crate::map::GeometryHandle;

#[derive(Default)]
pub struct MemorySource {
    pub records: Vec<PopulationRecord>,
    pub geometries: HashMap<String, GeometryHandle>,
    /// Per-country response delay, for out-of-order resolution
    pub delays: HashMap<String, Duration>,
    pub offline: bool,
}

impl MemorySource {
    pub fn new(records: Vec<PopulationRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), SourceError> {
        if self.offline {
            Err(SourceError::Unavailable("offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn fetch_all_country_names(&self) -> Result<Vec<String>, SourceError> {
        self.check()?;
        let mut names: Vec<String> = self.records.iter().map(|r| r.country.clone()).collect();
        names.sort();
        Ok(names)
    }

    async fn fetch_all_records(&self) -> Result<Vec<PopulationRecord>, SourceError> {
        self.check()?;
        Ok(self.records.clone())
    }

    async fn fetch_record(
        &self,
        country: &str,
        include_geometry: bool,
    ) -> Result<Option<CountryFeature>, SourceError> {
        if let Some(delay) = self.delays.get(country) {
            tokio::time::sleep(*delay).await;
        }
        self.check()?;
        Ok(self
            .records
            .iter()
            .find(|r| r.country == country)
            .map(|record| CountryFeature {
                record: record.clone(),
                geometry: include_geometry
                    .then(|| self.geometries.get(country).cloned())
                    .flatten(),
            }))
    }

    async fn fetch_layer(&self) -> Result<Vec<(String, GeometryHandle)>, SourceError> {
        self.check()?;
        Ok(self
            .geometries
            .iter()
            .map(|(name, geometry)| (name.clone(), geometry.clone()))
            .collect())
    }
}
