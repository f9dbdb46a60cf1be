//! 1938 country outlines, served verbatim to the map and never time-filtered.

use std::path::Path;

use serde_json::Value;

use crate::data::border::feature_array;
use crate::data::{read_json, DataError, GeoJsonError};

#[derive(Debug, Clone, PartialEq)]
pub struct CountryOutlines {
    collection: Value,
    features: usize,
}

impl CountryOutlines {
    pub fn from_geojson(collection: Value) -> Result<Self, GeoJsonError> {
        let features = feature_array(&collection)?.len();
        Ok(Self {
            collection,
            features,
        })
    }

    pub fn empty() -> Self {
        Self {
            collection: serde_json::json!({"type": "FeatureCollection", "features": []}),
            features: 0,
        }
    }

    pub fn collection(&self) -> &Value {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.features
    }

    pub fn is_empty(&self) -> bool {
        self.features == 0
    }
}

pub fn load_countries(path: &Path) -> Result<CountryOutlines, DataError> {
    let collection: Value = read_json(path)?;
    let outlines = CountryOutlines::from_geojson(collection).map_err(|source| DataError::GeoJson {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(
        target: "camp_atlas::data",
        path = %path.display(),
        countries = outlines.len(),
        "countries.loaded"
    );
    Ok(outlines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn features_are_counted_and_kept_verbatim() {
        let outlines = CountryOutlines::from_geojson(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"ABBREVNAME": "Poland"}, "geometry": null},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        }))
        .expect("collection should parse");
        assert_eq!(outlines.len(), 2);
        assert_eq!(outlines.collection()["features"][0]["properties"]["ABBREVNAME"], "Poland");
    }

    #[test]
    fn empty_outlines_serialize_as_a_collection() {
        let outlines = CountryOutlines::empty();
        assert!(outlines.is_empty());
        assert_eq!(outlines.collection()["type"], "FeatureCollection");
    }
}
