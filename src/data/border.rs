//! Dated occupied-territory outlines. Geometries are opaque GeoJSON already in
//! display-plane coordinates; only their dates are interpreted.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::Value;

use crate::data::{parse_timestamp, read_json, DataError, GeoJsonError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorderSnapshot {
    pub date: NaiveDateTime,
    pub geometry: Value,
}

impl BorderSnapshot {
    pub fn new(date: NaiveDateTime, geometry: Value) -> Self {
        Self { date, geometry }
    }
}

/// Read border snapshots from a FeatureCollection, keeping file order.
pub fn parse_borders(collection: &Value) -> Result<Vec<BorderSnapshot>, GeoJsonError> {
    let features = feature_array(collection)?;
    features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            let date = feature
                .get("properties")
                .and_then(|props| props.get("date"))
                .and_then(Value::as_str)
                .and_then(parse_timestamp)
                .ok_or(GeoJsonError::MissingDate { index })?;
            let geometry = feature
                .get("geometry")
                .filter(|geometry| !geometry.is_null())
                .cloned()
                .ok_or(GeoJsonError::MissingGeometry { index })?;
            Ok(BorderSnapshot { date, geometry })
        })
        .collect()
}

pub(crate) fn feature_array(collection: &Value) -> Result<&Vec<Value>, GeoJsonError> {
    if collection.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Err(GeoJsonError::NotFeatureCollection);
    }
    collection
        .get("features")
        .and_then(Value::as_array)
        .ok_or(GeoJsonError::NotFeatureCollection)
}

pub fn load_borders(path: &Path) -> Result<Vec<BorderSnapshot>, DataError> {
    let collection: Value = read_json(path)?;
    let borders = parse_borders(&collection).map_err(|source| DataError::GeoJson {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        target: "camp_atlas::data",
        path = %path.display(),
        snapshots = borders.len(),
        "borders.loaded"
    );
    Ok(borders)
}
