//! Access to the population feature service.
//!
//! Everything the dashboard knows about countries comes through
//! [`RecordSource`]. The trait mirrors the three questions the UI asks
//! (which countries exist, every record, one record) plus the map layer
//! load. There is no caching: each call re-queries the service.

mod feature_service;
#[cfg(test)]
pub mod memory;

pub use feature_service::FeatureService;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::data::{PopulationRecord, YEARS};
use crate::format::{year_field_key, COUNTRY_FIELD};
use crate::map::GeometryHandle;

/// Error types for feature service access.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("feature service unreachable: {0}")]
    Unavailable(String),
    #[error("feature service returned HTTP {0}")]
    Status(u16),
    #[error("feature service error {code}: {message}")]
    Service { code: i64, message: String },
    #[error("failed to parse response: {0}")]
    Malformed(String),
}

/// A single country's record, with its outline when geometry was requested.
#[derive(Clone, Debug)]
pub struct CountryFeature {
    pub record: PopulationRecord,
    pub geometry: Option<GeometryHandle>,
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Distinct, non-empty country names, alphabetical as the service orders them
    async fn fetch_all_country_names(&self) -> Result<Vec<String>, SourceError>;

    /// Every record in the dataset
    async fn fetch_all_records(&self) -> Result<Vec<PopulationRecord>, SourceError>;

    /// The record for one country, `None` when nothing matches
    async fn fetch_record(
        &self,
        country: &str,
        include_geometry: bool,
    ) -> Result<Option<CountryFeature>, SourceError>;

    /// Country outlines for the map layer
    async fn fetch_layer(&self) -> Result<Vec<(String, GeometryHandle)>, SourceError>;
}

/// Row filter of a query
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    MatchAll,
    CountryEquals(String),
}

impl Filter {
    /// SQL-92 where clause. Single quotes in names are doubled.
    pub fn where_clause(&self) -> String {
        match self {
            Filter::MatchAll => "1=1".to_string(),
            Filter::CountryEquals(name) => {
                format!("{} = '{}'", COUNTRY_FIELD, name.replace('\'', "''"))
            }
        }
    }
}

/// Attributes to return per feature
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutFields {
    All,
    Field(String),
}

/// Response encoding requested from the service
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    GeoJson,
}

/// A feature service query, rendered as REST parameters by [`Query::params`]
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub out_fields: OutFields,
    /// Distinct values ordered by the single out field
    pub distinct_ordered: bool,
    pub return_geometry: bool,
    /// Geometry generalization tolerance in degrees
    pub max_allowable_offset: Option<f64>,
}

impl Query {
    pub fn all() -> Self {
        Self {
            filter: Filter::MatchAll,
            out_fields: OutFields::All,
            distinct_ordered: false,
            return_geometry: false,
            max_allowable_offset: None,
        }
    }

    pub fn country_names() -> Self {
        Self {
            out_fields: OutFields::Field(COUNTRY_FIELD.to_string()),
            distinct_ordered: true,
            ..Self::all()
        }
    }

    pub fn country(name: &str, include_geometry: bool) -> Self {
        Self {
            filter: Filter::CountryEquals(name.to_string()),
            return_geometry: include_geometry,
            ..Self::all()
        }
    }

    pub fn layer(max_allowable_offset: Option<f64>) -> Self {
        Self {
            out_fields: OutFields::Field(COUNTRY_FIELD.to_string()),
            return_geometry: true,
            max_allowable_offset,
            ..Self::all()
        }
    }

    /// Geometry comes back as GeoJSON, attributes alone as Esri JSON
    pub fn format(&self) -> Format {
        if self.return_geometry {
            Format::GeoJson
        } else {
            Format::Json
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let out_fields = match &self.out_fields {
            OutFields::All => "*".to_string(),
            OutFields::Field(name) => name.clone(),
        };

        let mut params = vec![
            ("where", self.filter.where_clause()),
            ("outFields", out_fields.clone()),
            ("returnGeometry", self.return_geometry.to_string()),
        ];

        if self.distinct_ordered {
            params.push(("returnDistinctValues", "true".to_string()));
            params.push(("orderByFields", out_fields));
        }

        if self.return_geometry {
            params.push(("outSR", "4326".to_string()));
            if let Some(offset) = self.max_allowable_offset {
                params.push(("maxAllowableOffset", offset.to_string()));
            }
        }

        let f = match self.format() {
            Format::Json => "json",
            Format::GeoJson => "geojson",
        };
        params.push(("f", f.to_string()));
        params
    }
}

/// Country name of a feature, if present and non-empty
pub fn country_name(attributes: &Map<String, Value>) -> Option<String> {
    attributes
        .get(COUNTRY_FIELD)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Build a record from a feature's attribute map.
/// Null, missing, negative or non-numeric year fields become absent values.
pub fn record_from_attributes(attributes: &Map<String, Value>) -> Option<PopulationRecord> {
    let mut record = PopulationRecord::new(country_name(attributes)?);

    for year in YEARS {
        let value = attributes
            .get(&year_field_key(year))
            .and_then(|v| v.as_f64())
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64);
        record.population.insert(year, value);
    }

    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Year;
    use serde_json::json;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_country_names_query() {
        let params = Query::country_names().params();
        assert_eq!(param(&params, "where"), Some("1=1"));
        assert_eq!(param(&params, "outFields"), Some("COUNTRY"));
        assert_eq!(param(&params, "returnDistinctValues"), Some("true"));
        assert_eq!(param(&params, "orderByFields"), Some("COUNTRY"));
        assert_eq!(param(&params, "returnGeometry"), Some("false"));
        assert_eq!(param(&params, "f"), Some("json"));
    }

    #[test]
    fn test_country_query_with_geometry() {
        let params = Query::country("Chile", true).params();
        assert_eq!(param(&params, "where"), Some("COUNTRY = 'Chile'"));
        assert_eq!(param(&params, "outFields"), Some("*"));
        assert_eq!(param(&params, "returnGeometry"), Some("true"));
        assert_eq!(param(&params, "outSR"), Some("4326"));
        assert_eq!(param(&params, "f"), Some("geojson"));
        assert_eq!(param(&params, "returnDistinctValues"), None);
    }

    #[test]
    fn test_where_clause_escapes_quotes() {
        let filter = Filter::CountryEquals("Cote d'Ivoire".to_string());
        assert_eq!(filter.where_clause(), "COUNTRY = 'Cote d''Ivoire'");
    }

    #[test]
    fn test_layer_query_generalizes() {
        let params = Query::layer(Some(0.05)).params();
        assert_eq!(param(&params, "maxAllowableOffset"), Some("0.05"));
        assert_eq!(param(&params, "outFields"), Some("COUNTRY"));
    }

    #[test]
    fn test_record_from_attributes() {
        let attrs = json!({
            "COUNTRY": "Peru",
            "F1970_Population": 13193000.0,
            "F2022_Population": 34049588,
            "F2020_Population": null,
            "F2010_Population": -1,
        });
        let record = record_from_attributes(attrs.as_object().unwrap()).unwrap();
        assert_eq!(record.country, "Peru");
        assert_eq!(record.get(Year(1970)), Some(13_193_000));
        assert_eq!(record.get(Year(2022)), Some(34_049_588));
        assert_eq!(record.get(Year(2020)), None);
        assert_eq!(record.get(Year(2010)), None);
        assert_eq!(record.get(Year(1980)), None);
        assert_eq!(record.population.len(), YEARS.len());
    }

    #[test]
    fn test_record_requires_country() {
        let blank = json!({ "COUNTRY": "  ", "F1970_Population": 1 });
        let missing = json!({ "F1970_Population": 1 });
        assert!(record_from_attributes(blank.as_object().unwrap()).is_none());
        assert!(record_from_attributes(missing.as_object().unwrap()).is_none());
    }
}
