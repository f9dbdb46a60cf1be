//! Camp records: one row per main camp / subcamp with its operating window.

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::data::{parse_timestamp, read_json, DataError};

/// A row as it appears in the canonical JSON dataset. Every field is nullable;
/// dates are strings so both timestamp shapes are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCampRow {
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub subcamp: Option<String>,
    #[serde(default)]
    pub date_open: Option<String>,
    #[serde(default)]
    pub date_close: Option<String>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub peak_pop: Option<f64>,
    /// Function-category code; float codes such as `4.0` are accepted and
    /// written back as integers.
    #[serde(default, serialize_with = "serialize_function")]
    pub function: Option<f64>,
    #[serde(default)]
    pub firm: Option<String>,
    #[serde(default)]
    pub nations: Option<String>,
    #[serde(default)]
    pub labor: Option<String>,
}

/// A dated camp retained after loading. `date_open < date_close` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampRecord {
    pub main: String,
    pub subcamp: String,
    pub date_open: NaiveDateTime,
    pub date_close: NaiveDateTime,
    pub lon: f64,
    pub lat: f64,
    pub peak_pop: Option<f64>,
    pub function: Option<u8>,
    pub firm: Option<String>,
    pub nations: Option<String>,
    pub labor: Option<String>,
}

impl CampRecord {
    /// Active strictly between opening and closing.
    pub fn is_active_at(&self, cutoff: NaiveDateTime) -> bool {
        self.date_open < cutoff && cutoff < self.date_close
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    Undated,
    Unlocated,
    OpensAfterClosing,
}

impl RawCampRow {
    pub fn into_record(self) -> Result<CampRecord, RowRejection> {
        let (Some(date_open), Some(date_close)) = (
            self.date_open.as_deref().and_then(parse_timestamp),
            self.date_close.as_deref().and_then(parse_timestamp),
        ) else {
            return Err(RowRejection::Undated);
        };
        if date_open >= date_close {
            return Err(RowRejection::OpensAfterClosing);
        }
        let (Some(lon), Some(lat)) = (self.lon, self.lat) else {
            return Err(RowRejection::Unlocated);
        };

        Ok(CampRecord {
            main: self.main.unwrap_or_default(),
            subcamp: self.subcamp.unwrap_or_default(),
            date_open,
            date_close,
            lon,
            lat,
            peak_pop: self.peak_pop.filter(|pop| pop.is_finite()),
            function: self.function.and_then(function_code),
            firm: non_blank(self.firm),
            nations: non_blank(self.nations),
            labor: non_blank(self.labor),
        })
    }
}

/// Integral, non-negative codes that fit a byte.
pub fn function_code(raw: f64) -> Option<u8> {
    if raw.is_finite() && raw.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&raw) {
        Some(raw as u8)
    } else {
        None
    }
}

fn serialize_function<S: serde::Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(raw) => match function_code(*raw) {
            Some(code) => serializer.serialize_some(&code),
            None => serializer.serialize_some(raw),
        },
        None => serializer.serialize_none(),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampDataset {
    pub camps: Vec<CampRecord>,
    pub dropped_undated: usize,
    pub dropped_unlocated: usize,
    pub dropped_inverted: usize,
}

impl CampDataset {
    pub fn from_rows(rows: Vec<RawCampRow>) -> Self {
        let mut dataset = CampDataset::default();
        for row in rows {
            match row.into_record() {
                Ok(record) => dataset.camps.push(record),
                Err(RowRejection::Undated) => dataset.dropped_undated += 1,
                Err(RowRejection::Unlocated) => dataset.dropped_unlocated += 1,
                Err(RowRejection::OpensAfterClosing) => dataset.dropped_inverted += 1,
            }
        }
        dataset
    }

    pub fn dropped(&self) -> usize {
        self.dropped_undated + self.dropped_unlocated + self.dropped_inverted
    }
}

pub fn load_camp_rows(path: &Path) -> Result<Vec<RawCampRow>, DataError> {
    read_json(path)
}

/// Load the camp dataset, dropping rows that can never be active.
pub fn load_camps(path: &Path) -> Result<CampDataset, DataError> {
    let dataset = CampDataset::from_rows(load_camp_rows(path)?);
    if dataset.dropped_inverted > 0 || dataset.dropped_unlocated > 0 {
        tracing::warn!(
            target: "camp_atlas::data",
            path = %path.display(),
            inverted = dataset.dropped_inverted,
            unlocated = dataset.dropped_unlocated,
            "camps.rows_rejected"
        );
    }
    tracing::info!(
        target: "camp_atlas::data",
        path = %path.display(),
        kept = dataset.camps.len(),
        dropped_undated = dataset.dropped_undated,
        "camps.loaded"
    );
    Ok(dataset)
}
