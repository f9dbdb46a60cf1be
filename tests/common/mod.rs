#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::NaiveDateTime;
use serde_json::{json, Value};

use camp_atlas::data::border::BorderSnapshot;
use camp_atlas::data::camp::{CampDataset, RawCampRow};
use camp_atlas::data::country::CountryOutlines;
use camp_atlas::data::parse_timestamp;
use camp_atlas::data::registry::AtlasContext;

pub fn date(raw: &str) -> NaiveDateTime {
    parse_timestamp(raw).expect("fixture dates are valid")
}

pub fn camp(
    subcamp: &str,
    open: Option<&str>,
    close: Option<&str>,
    peak_pop: Option<f64>,
    function: Option<f64>,
    firm: Option<&str>,
) -> RawCampRow {
    RawCampRow {
        main: Some("Main camp".to_string()),
        subcamp: Some(subcamp.to_string()),
        date_open: open.map(str::to_string),
        date_close: close.map(str::to_string),
        lon: Some(19.2),
        lat: Some(50.0),
        peak_pop,
        function,
        firm: firm.map(str::to_string),
        nations: Some("PL".to_string()),
        labor: Some("Construction".to_string()),
    }
}

pub fn fixture_rows() -> Vec<RawCampRow> {
    vec![
        camp("Alpha", Some("1940-01-01T00:00:00"), Some("1945-01-01T00:00:00"), Some(900.0), Some(4.0), Some("IGF")),
        camp("Bravo", Some("1942-06-01T00:00:00"), Some("1943-06-01T00:00:00"), Some(100.0), Some(10.0), None),
        camp("Charlie", Some("1943-01-01T00:00:00"), Some("1944-01-01T00:00:00"), None, None, Some("DEST")),
        camp("Delta", Some("1938-01-01T00:00:00"), Some("1943-01-01T00:00:00"), Some(25.0), Some(3.0), Some("IGF")),
        camp("Undated", None, Some("1944-01-01T00:00:00"), Some(50.0), Some(1.0), None),
    ]
}

pub fn polygon(offset: f64) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[[offset, 0.0], [offset + 1.0e5, 0.0], [offset + 1.0e5, 1.0e5], [offset, 0.0]]]
    })
}

pub fn fixture_borders() -> Vec<BorderSnapshot> {
    ["1939-09-01", "1942-12-01", "1943-01-31", "1944-06-01"]
        .iter()
        .enumerate()
        .map(|(i, raw)| BorderSnapshot::new(date(raw), polygon(i as f64)))
        .collect()
}

pub fn countries_geojson() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"ABBREVNAME": "Poland"}, "geometry": polygon(5.0e5)}
        ]
    })
}

pub fn borders_geojson() -> Value {
    let features: Vec<Value> = fixture_borders()
        .into_iter()
        .map(|border| {
            json!({
                "type": "Feature",
                "properties": {"date": border.date.format("%Y-%m-%dT%H:%M:%S").to_string()},
                "geometry": border.geometry
            })
        })
        .collect();
    json!({"type": "FeatureCollection", "features": features})
}

pub fn fixture_context() -> AtlasContext {
    AtlasContext::from_parts(
        CampDataset::from_rows(fixture_rows()),
        fixture_borders(),
        CountryOutlines::from_geojson(countries_geojson()).expect("fixture outlines are valid"),
        12,
    )
}

pub fn unique_temp_dir(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("camp-atlas-{name}-{stamp}"));
    fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

/// A data directory holding the fixture camps, borders and countries under
/// their default file names.
pub fn write_fixture_data_dir(name: &str) -> PathBuf {
    let dir = unique_temp_dir(name);
    let camps = serde_json::to_string_pretty(&fixture_rows()).expect("rows serialize");
    fs::write(dir.join("camps.json"), camps).expect("write camps");
    fs::write(dir.join("german_borders.geojson"), borders_geojson().to_string())
        .expect("write borders");
    fs::write(dir.join("maps_1938.geojson"), countries_geojson().to_string())
        .expect("write countries");
    dir
}
