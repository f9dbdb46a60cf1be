use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::registry::AtlasContext;
use crate::palette::PaletteEntry;
use crate::snapshot::{
    display_state, parse_cutoff, ColorMode, DisplayOptions, ViewState, ViewStateError,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    ViewState(#[from] ViewStateError),
    #[error("Invalid request body: {0}")]
    Body(#[source] serde_json::Error),
    #[error("{0}")]
    Query(String),
    #[error("failed to serialize response: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ApiError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ViewState(_) | Self::Body(_) | Self::Query(_))
    }
}

/// View state as sent by a client: the query string of `GET /api/snapshot` or
/// the JSON body of `POST /api/snapshot`. Omitted fields take the startup defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotRequest {
    #[serde(default, alias = "cutoff")]
    pub date: Option<String>,
    #[serde(default)]
    pub size_by_population: bool,
    #[serde(default, alias = "borders")]
    pub show_borders: bool,
    #[serde(default, alias = "color")]
    pub color_mode: Option<String>,
}

impl SnapshotRequest {
    pub fn into_view_state(self) -> Result<ViewState, ViewStateError> {
        let defaults = ViewState::default();
        let cutoff = match self.date.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_cutoff(raw)?,
            _ => defaults.cutoff,
        };
        let color_mode = match self.color_mode.as_deref() {
            Some(raw) => raw.parse::<ColorMode>()?,
            None => defaults.options.color_mode,
        };
        Ok(ViewState {
            cutoff,
            options: DisplayOptions {
                size_by_population: self.size_by_population,
                show_borders: self.show_borders,
                color_mode,
            },
        })
    }
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "camp-atlas-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// Snapshot and outline payloads carry geometry and are written compact.
pub fn snapshot_payload(context: &AtlasContext, request: SnapshotRequest) -> Result<String, ApiError> {
    let view = request.into_view_state()?;
    let state = display_state(context, &view);
    serde_json::to_string(&state).map_err(ApiError::Serialize)
}

pub fn snapshot_body_payload(context: &AtlasContext, body: &str) -> Result<String, ApiError> {
    let request = if body.trim().is_empty() {
        SnapshotRequest::default()
    } else {
        serde_json::from_str(body).map_err(ApiError::Body)?
    };
    snapshot_payload(context, request)
}

pub fn countries_payload(context: &AtlasContext) -> Result<String, serde_json::Error> {
    serde_json::to_string(context.countries.collection())
}

#[derive(Debug, Clone, Serialize)]
pub struct PalettesResponse<'a> {
    pub fixed: &'static str,
    pub by_function: &'a [PaletteEntry],
    pub by_firm: &'a [PaletteEntry],
    pub top_firms: &'a [String],
}

pub fn palettes_payload(context: &AtlasContext) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&PalettesResponse {
        fixed: crate::palette::FIXED_COLOR,
        by_function: context.function_palette.entries(),
        by_firm: context.firm_palette.entries(),
        top_firms: context.firm_buckets.kept(),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct DataVersionResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub summary: crate::data::registry::DatasetSummary,
    pub default_cutoff: NaiveDateTime,
    pub color_modes: Vec<&'static str>,
}

pub fn data_version_payload(context: &AtlasContext) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&DataVersionResponse {
        status: "ok",
        summary: context.summary(),
        default_cutoff: ViewState::default().cutoff,
        color_modes: ColorMode::ALL.iter().map(|mode| mode.as_str()).collect(),
    })
}
