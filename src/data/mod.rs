//! Static datasets: camps, occupation border snapshots and 1938 country outlines.
//! Everything here is loaded once at startup and read-only afterwards.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

pub mod border;
pub mod camp;
pub mod country;
pub mod registry;
pub mod validate;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed GeoJSON in {path:?}: {source}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: GeoJsonError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoJsonError {
    #[error("expected a FeatureCollection")]
    NotFeatureCollection,
    #[error("feature {index} has no parsable `date` property")]
    MissingDate { index: usize },
    #[error("feature {index} has no geometry")]
    MissingGeometry { index: usize },
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let raw = fs::read_to_string(path).map_err(|source| DataError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses the dataset timestamp formats: `YYYY-MM-DDTHH:MM:SS` (optionally with
/// fractional seconds or a space separator) or a bare `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Midnight on the given calendar day; only used for fixed, known-valid dates.
pub(crate) fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_dataset_timestamp_shape() {
        let expected = midnight(1942, 3, 1);
        assert_eq!(parse_timestamp("1942-03-01T00:00:00"), Some(expected));
        assert_eq!(parse_timestamp("1942-03-01 00:00:00"), Some(expected));
        assert_eq!(parse_timestamp("1942-03-01T00:00:00.000"), Some(expected));
        assert_eq!(parse_timestamp(" 1942-03-01 "), Some(expected));
    }

    #[test]
    fn rejects_blank_and_garbage_timestamps() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("NaT"), None);
        assert_eq!(parse_timestamp("1942-13-01"), None);
    }
}
