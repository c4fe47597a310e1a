//! ArcGIS feature service client.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use geojson::GeoJson;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::{
    country_name, record_from_attributes, CountryFeature, Format, Query, RecordSource,
    SourceError,
};
use crate::data::PopulationRecord;
use crate::map::GeometryHandle;

/// Esri JSON query response. Services report failures inside a 200 body.
#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    features: Vec<JsonFeature>,
    error: Option<ServiceErrorBody>,
}

#[derive(Deserialize)]
struct JsonFeature {
    #[serde(default)]
    attributes: Map<String, Value>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ServiceErrorBody>,
}

#[derive(Deserialize)]
struct ServiceErrorBody {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

impl From<ServiceErrorBody> for SourceError {
    fn from(body: ServiceErrorBody) -> Self {
        SourceError::Service {
            code: body.code,
            message: body.message,
        }
    }
}

/// Reads population records from a hosted feature layer
#[derive(Clone)]
pub struct FeatureService {
    client: Client,
    layer_url: String,
    max_allowable_offset: Option<f64>,
}

impl FeatureService {
    pub fn new(
        layer_url: &str,
        timeout: Duration,
        max_allowable_offset: Option<f64>,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!("popmap/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            layer_url: layer_url.trim_end_matches('/').to_string(),
            max_allowable_offset,
        })
    }

    /// Run a query and return the raw body
    async fn execute(&self, query: &Query) -> Result<Vec<u8>, SourceError> {
        let url = format!("{}/query", self.layer_url);
        debug!(where_clause = %query.filter.where_clause(), "querying feature service");

        let response = self
            .client
            .get(&url)
            .query(&query.params())
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn query_attributes(&self, query: &Query) -> Result<Vec<Map<String, Value>>, SourceError> {
        debug_assert_eq!(query.format(), Format::Json);
        let body = self.execute(query).await?;
        decode_attributes(body)
    }

    async fn query_features(
        &self,
        query: &Query,
    ) -> Result<Vec<(Map<String, Value>, Option<GeometryHandle>)>, SourceError> {
        debug_assert_eq!(query.format(), Format::GeoJson);
        let body = self.execute(query).await?;
        decode_geojson(body)
    }
}

#[async_trait]
impl RecordSource for FeatureService {
    async fn fetch_all_country_names(&self) -> Result<Vec<String>, SourceError> {
        let rows = self.query_attributes(&Query::country_names()).await?;
        let names = distinct_names(&rows);
        info!(count = names.len(), "loaded country names");
        Ok(names)
    }

    async fn fetch_all_records(&self) -> Result<Vec<PopulationRecord>, SourceError> {
        let rows = self.query_attributes(&Query::all()).await?;
        let records: Vec<PopulationRecord> = rows.iter().filter_map(record_from_attributes).collect();
        if records.len() < rows.len() {
            warn!(
                skipped = rows.len() - records.len(),
                "features without a country name were skipped"
            );
        }
        info!(count = records.len(), "loaded population records");
        Ok(records)
    }

    async fn fetch_record(
        &self,
        country: &str,
        include_geometry: bool,
    ) -> Result<Option<CountryFeature>, SourceError> {
        let query = Query::country(country, include_geometry);

        let feature = if include_geometry {
            self.query_features(&query)
                .await?
                .into_iter()
                .find_map(|(attrs, geometry)| {
                    record_from_attributes(&attrs).map(|record| CountryFeature { record, geometry })
                })
        } else {
            self.query_attributes(&query)
                .await?
                .iter()
                .find_map(record_from_attributes)
                .map(|record| CountryFeature {
                    record,
                    geometry: None,
                })
        };

        debug!(country, found = feature.is_some(), "country lookup finished");
        Ok(feature)
    }

    async fn fetch_layer(&self) -> Result<Vec<(String, GeometryHandle)>, SourceError> {
        let features = self
            .query_features(&Query::layer(self.max_allowable_offset))
            .await?;
        let layer: Vec<(String, GeometryHandle)> = features
            .into_iter()
            .filter_map(|(attrs, geometry)| Some((country_name(&attrs)?, geometry?)))
            .collect();
        info!(count = layer.len(), "loaded map layer");
        Ok(layer)
    }
}

/// Country names in the order the service returned them (`orderByFields`),
/// without blanks or repeats. Re-sorting here would order by raw bytes and
/// push accented names such as "Åland Islands" after "Zimbabwe".
fn distinct_names(rows: &[Map<String, Value>]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(country_name)
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Decode an Esri JSON response into per-feature attribute maps
fn decode_attributes(mut body: Vec<u8>) -> Result<Vec<Map<String, Value>>, SourceError> {
    let response: QueryResponse = simd_json::serde::from_slice(&mut body)
        .map_err(|e| SourceError::Malformed(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(error.into());
    }

    Ok(response.features.into_iter().map(|f| f.attributes).collect())
}

/// Decode a GeoJSON response into (properties, geometry) pairs
fn decode_geojson(
    body: Vec<u8>,
) -> Result<Vec<(Map<String, Value>, Option<GeometryHandle>)>, SourceError> {
    // simd-json parses in place, so probe the error envelope on a copy
    let mut probe = body.clone();
    let envelope = simd_json::serde::from_slice::<ErrorEnvelope>(&mut probe);
    if let Ok(ErrorEnvelope { error: Some(error) }) = envelope {
        return Err(error.into());
    }

    let text = String::from_utf8(body).map_err(|e| SourceError::Malformed(e.to_string()))?;
    let geojson: GeoJson = text
        .parse()
        .map_err(|e: geojson::Error| SourceError::Malformed(e.to_string()))?;

    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            return Err(SourceError::Malformed(
                "expected features, got a bare geometry".to_string(),
            ))
        }
    };

    Ok(features
        .into_iter()
        .map(|f| {
            let geometry = f.geometry.map(GeometryHandle::new);
            (f.properties.unwrap_or_default(), geometry)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_attributes() {
        let body = br#"{
            "objectIdFieldName": "FID",
            "features": [
                {"attributes": {"COUNTRY": "Chad", "F2022_Population": 17723315}},
                {"attributes": {"COUNTRY": null}}
            ]
        }"#
        .to_vec();
        let rows = decode_attributes(body).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(country_name(&rows[0]).as_deref(), Some("Chad"));
        assert_eq!(country_name(&rows[1]), None);
    }

    #[test]
    fn test_names_keep_service_order() {
        let body = r#"{"features": [
            {"attributes": {"COUNTRY": "Afghanistan"}},
            {"attributes": {"COUNTRY": "Åland Islands"}},
            {"attributes": {"COUNTRY": ""}},
            {"attributes": {"COUNTRY": "Åland Islands"}},
            {"attributes": {"COUNTRY": "Zimbabwe"}}
        ]}"#
        .as_bytes()
        .to_vec();
        let rows = decode_attributes(body).unwrap();
        assert_eq!(
            distinct_names(&rows),
            vec!["Afghanistan", "Åland Islands", "Zimbabwe"]
        );
    }

    #[test]
    fn test_decode_attributes_service_error() {
        let body = br#"{"error": {"code": 400, "message": "Invalid query", "details": []}}"#.to_vec();
        match decode_attributes(body) {
            Err(SourceError::Service { code, message }) => {
                assert_eq!(code, 400);
                assert_eq!(message, "Invalid query");
            }
            other => panic!("expected service error, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_decode_attributes_garbage() {
        let body = b"<html>gateway timeout</html>".to_vec();
        assert!(matches!(decode_attributes(body), Err(SourceError::Malformed(_))));
    }

    #[test]
    fn test_decode_geojson() {
        let body = br#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"COUNTRY": "Nauru", "F2022_Population": 12668},
                "geometry": {"type": "Polygon", "coordinates": [[[166.9, -0.5], [167.0, -0.5], [167.0, -0.6], [166.9, -0.5]]]}
            }]
        }"#
        .to_vec();
        let features = decode_geojson(body).unwrap();
        assert_eq!(features.len(), 1);
        let (attrs, geometry) = &features[0];
        assert_eq!(country_name(attrs).as_deref(), Some("Nauru"));
        assert!(geometry.is_some());
    }

    #[test]
    fn test_decode_geojson_service_error() {
        let body = br#"{"error": {"code": 500, "message": "Unable to complete operation."}}"#.to_vec();
        assert!(matches!(
            decode_geojson(body),
            Err(SourceError::Service { code: 500, .. })
        ));
    }
}
