mod common;

use std::fs;

use camp_atlas::config::AtlasConfig;
use camp_atlas::data::border::load_borders;
use camp_atlas::data::camp::load_camps;
use camp_atlas::data::country::load_countries;
use camp_atlas::data::registry::AtlasContext;
use camp_atlas::data::validate::{validate_camp_dataset, ValidationSeverity};
use camp_atlas::data::{DataError, GeoJsonError};
use common::{date, unique_temp_dir, write_fixture_data_dir};

fn config_for(dir: std::path::PathBuf) -> AtlasConfig {
    AtlasConfig {
        data_dir: dir,
        ..AtlasConfig::default()
    }
}

#[test]
fn fixture_directory_loads_into_a_context() {
    let dir = write_fixture_data_dir("load");
    let context = AtlasContext::load(&config_for(dir.clone())).expect("fixture data should load");

    assert_eq!(context.camps.len(), 4);
    assert_eq!(context.dropped_camps, 1);
    assert_eq!(context.borders.len(), 4);
    assert_eq!(context.countries.len(), 1);
    assert_eq!(context.firm_buckets.kept(), ["IGF", "DEST"]);

    let summary = context.summary();
    assert_eq!(summary.first_open, Some(date("1938-01-01")));
    assert_eq!(summary.last_close, Some(date("1945-01-01")));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn camps_keep_file_order_and_drop_undated_rows() {
    let dir = write_fixture_data_dir("camps");
    let dataset = load_camps(&dir.join("camps.json")).expect("camps should load");
    let names: Vec<&str> = dataset.camps.iter().map(|c| c.subcamp.as_str()).collect();
    assert_eq!(names, ["Alpha", "Bravo", "Charlie", "Delta"]);
    assert_eq!(dataset.dropped_undated, 1);
    assert_eq!(dataset.camps[0].function, Some(4));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn borders_keep_file_order() {
    let dir = write_fixture_data_dir("borders");
    let borders = load_borders(&dir.join("german_borders.geojson")).expect("borders should load");
    let dates: Vec<_> = borders.iter().map(|b| b.date).collect();
    assert_eq!(
        dates,
        [
            date("1939-09-01"),
            date("1942-12-01"),
            date("1943-01-31"),
            date("1944-06-01")
        ]
    );

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = unique_temp_dir("missing");
    let err = load_countries(&dir.join("maps_1938.geojson")).expect_err("file is absent");
    assert!(matches!(err, DataError::Read { .. }));
    assert!(err.to_string().contains("maps_1938.geojson"));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let dir = unique_temp_dir("malformed");
    let path = dir.join("camps.json");
    fs::write(&path, "[{\"subcamp\": ").expect("write");
    let err = load_camps(&path).expect_err("json is truncated");
    assert!(matches!(err, DataError::Parse { .. }));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn border_without_a_date_is_rejected_with_its_index() {
    let dir = unique_temp_dir("undated-border");
    let path = dir.join("german_borders.geojson");
    let collection = serde_json::json!({
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"date": "1940-05-01T00:00:00"}, "geometry": common::polygon(0.0)},
            {"type": "Feature", "properties": {}, "geometry": common::polygon(1.0)}
        ]
    });
    fs::write(&path, collection.to_string()).expect("write");
    let err = load_borders(&path).expect_err("second feature is undated");
    assert!(matches!(
        err,
        DataError::GeoJson {
            source: GeoJsonError::MissingDate { index: 1 },
            ..
        }
    ));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn outlines_must_be_a_feature_collection() {
    let dir = unique_temp_dir("not-collection");
    let path = dir.join("maps_1938.geojson");
    fs::write(&path, r#"{"type": "Feature", "geometry": null}"#).expect("write");
    let err = load_countries(&path).expect_err("not a collection");
    assert!(matches!(
        err,
        DataError::GeoJson {
            source: GeoJsonError::NotFeatureCollection,
            ..
        }
    ));

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn validation_flags_bad_rows_and_passes_the_fixture() {
    let dir = write_fixture_data_dir("validate");
    let report = validate_camp_dataset(&dir.join("camps.json")).expect("camps readable");
    assert_eq!(report.rows, 5);
    assert!(!report.has_errors());
    assert_eq!(report.count(ValidationSeverity::Warning), 1);

    let bad = dir.join("bad_camps.json");
    fs::write(
        &bad,
        r#"[
            {"subcamp": "Backwards", "date_open": "1944-01-01", "date_close": "1943-01-01", "lon": 10.0, "lat": 50.0},
            {"subcamp": "Nowhere", "date_open": "1941-01-01", "date_close": "1943-01-01"},
            {"subcamp": "Garbled", "date_open": "sometime", "date_close": "1943-01-01", "lon": 10.0, "lat": 95.0}
        ]"#,
    )
    .expect("write");
    let report = validate_camp_dataset(&bad).expect("bad camps readable");
    assert!(report.has_errors());
    // Inverted window, missing location, unparsable date, latitude out of range.
    assert_eq!(report.count(ValidationSeverity::Error), 4);

    let _ = fs::remove_dir_all(dir);
}
