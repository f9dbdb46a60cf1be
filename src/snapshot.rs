//! Camp snapshot builder: which camps are active at a cutoff, and how each one
//! is drawn. Pure over the immutable [`AtlasContext`]; every view change
//! recomputes the whole display state.

use std::fmt;
use std::io;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::border::BorderSnapshot;
use crate::data::midnight;
use crate::data::registry::AtlasContext;
use crate::palette::{
    FunctionCategory, PaletteEntry, FIXED_COLOR, FIXED_LEGEND, UNKNOWN_COLOR,
};

pub const DEFAULT_MARKER_SIZE: f64 = 5.0;
const POPULATION_SIZE_SCALE: f64 = 0.15;
const POPULATION_SIZE_FLOOR: f64 = 10.0;

/// Initial slider position.
pub fn default_cutoff() -> NaiveDateTime {
    midnight(1939, 1, 1)
}

/// Occupation border data is unreliable from this date on; the overlay hides.
pub fn border_data_end() -> NaiveDateTime {
    midnight(1944, 8, 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SliderRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub step_days: u32,
}

impl Default for SliderRange {
    fn default() -> Self {
        Self {
            start: midnight(1939, 1, 1),
            end: midnight(1946, 1, 1),
            step_days: 7,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    #[default]
    Fixed,
    ByFunction,
    ByFirm,
}

impl ColorMode {
    pub const ALL: [ColorMode; 3] = [Self::Fixed, Self::ByFunction, Self::ByFirm];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::ByFunction => "by_function",
            Self::ByFirm => "by_firm",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = ViewStateError;

    /// Accepts the snake_case names, the short `function`/`firm` forms, and the
    /// radio-button index (`0`, `1`, `2`).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fixed" | "0" => Ok(Self::Fixed),
            "by_function" | "function" | "1" => Ok(Self::ByFunction),
            "by_firm" | "firm" | "2" => Ok(Self::ByFirm),
            _ => Err(ViewStateError::UnknownColorMode(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewStateError {
    #[error("unknown color mode '{0}' (expected fixed, by_function or by_firm)")]
    UnknownColorMode(String),
    #[error("invalid date '{0}' (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)")]
    InvalidDate(String),
}

pub fn parse_cutoff(raw: &str) -> Result<NaiveDateTime, ViewStateError> {
    crate::data::parse_timestamp(raw).ok_or_else(|| ViewStateError::InvalidDate(raw.to_string()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    #[serde(default)]
    pub size_by_population: bool,
    #[serde(default)]
    pub show_borders: bool,
    #[serde(default)]
    pub color_mode: ColorMode,
}

/// What the user currently has selected. Owned by the UI; read-only here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub cutoff: NaiveDateTime,
    #[serde(flatten)]
    pub options: DisplayOptions,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            cutoff: default_cutoff(),
            options: DisplayOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRecord {
    pub main: String,
    pub subcamp: String,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: String,
    pub legend: String,
    pub peak_pop: Option<f64>,
    pub nations: Option<String>,
    pub labor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Legend {
    pub visible: bool,
    pub entries: Vec<PaletteEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub records: Vec<DisplayRecord>,
    pub legend: Legend,
}

/// Everything a renderer needs for one view state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState<'a> {
    pub cutoff: NaiveDateTime,
    pub records: Vec<DisplayRecord>,
    pub legend: Legend,
    pub border: Option<&'a BorderSnapshot>,
}

pub fn marker_size(peak_pop: Option<f64>, size_by_population: bool) -> f64 {
    if size_by_population {
        let pop = peak_pop.unwrap_or(0.0).max(0.0);
        POPULATION_SIZE_SCALE * (pop.sqrt() + POPULATION_SIZE_FLOOR)
    } else {
        DEFAULT_MARKER_SIZE
    }
}

/// Camps active strictly between open and close at `cutoff`, in dataset order,
/// with position, size and colour derived from `options`.
pub fn build_snapshot(
    context: &AtlasContext,
    cutoff: NaiveDateTime,
    options: &DisplayOptions,
) -> Snapshot {
    let records = context
        .camps
        .iter()
        .filter(|camp| camp.is_active_at(cutoff))
        .map(|camp| {
            let (x, y) = context.projection.geo_to_plane(camp.lon, camp.lat);
            let (legend, color) = match options.color_mode {
                ColorMode::Fixed => (FIXED_LEGEND, FIXED_COLOR),
                ColorMode::ByFunction => {
                    let name = FunctionCategory::resolve(camp.function).name();
                    (name, context.function_palette.color(name).unwrap_or(UNKNOWN_COLOR))
                }
                ColorMode::ByFirm => {
                    let bucket = context.firm_buckets.bucket(camp.firm.as_deref());
                    (bucket, context.firm_palette.color(bucket).unwrap_or(UNKNOWN_COLOR))
                }
            };

            DisplayRecord {
                main: camp.main.clone(),
                subcamp: camp.subcamp.clone(),
                x,
                y,
                size: marker_size(camp.peak_pop, options.size_by_population),
                color: color.to_string(),
                legend: legend.to_string(),
                peak_pop: camp.peak_pop,
                nations: camp.nations.clone(),
                labor: camp.labor.clone(),
            }
        })
        .collect();

    let legend = match options.color_mode {
        ColorMode::Fixed => Legend::default(),
        ColorMode::ByFunction => Legend {
            visible: true,
            entries: context.function_palette.entries().to_vec(),
        },
        ColorMode::ByFirm => Legend {
            visible: true,
            entries: context.firm_palette.entries().to_vec(),
        },
    };

    Snapshot { records, legend }
}

/// Border snapshot nearest `cutoff`, or `None` when the overlay is off, the
/// cutoff is past the end of reliable border data, or there are no snapshots.
/// Ties go to the earlier entry in file order.
pub fn select_border(
    context: &AtlasContext,
    cutoff: NaiveDateTime,
    enabled: bool,
) -> Option<&BorderSnapshot> {
    if !enabled || cutoff >= border_data_end() {
        return None;
    }
    context
        .borders
        .iter()
        .min_by_key(|border| (border.date - cutoff).abs())
}

/// The state transition `(ViewState, AtlasContext) -> DisplayState`.
pub fn display_state<'a>(context: &'a AtlasContext, view: &ViewState) -> DisplayState<'a> {
    let Snapshot { records, legend } = build_snapshot(context, view.cutoff, &view.options);
    let border = select_border(context, view.cutoff, view.options.show_borders);
    tracing::debug!(
        target: "camp_atlas::snapshot",
        cutoff = %view.cutoff,
        color_mode = %view.options.color_mode,
        active = records.len(),
        border = border.is_some(),
        "snapshot.built"
    );
    DisplayState {
        cutoff: view.cutoff,
        records,
        legend,
        border,
    }
}

pub fn write_snapshot_csv<W: io::Write>(
    records: &[DisplayRecord],
    writer: W,
) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
