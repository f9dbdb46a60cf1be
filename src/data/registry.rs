//! Startup-loaded atlas context. Built once, shared via `Arc` with every request
//! handler and CLI command; nothing in it changes after construction.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::AtlasConfig;
use crate::data::border::{load_borders, BorderSnapshot};
use crate::data::camp::{load_camps, CampDataset, CampRecord};
use crate::data::country::{load_countries, CountryOutlines};
use crate::data::DataError;
use crate::palette::{function_palette, FirmBuckets, Palette};
use crate::projection::TwoPointEquidistant;
use crate::snapshot::{border_data_end, SliderRange};

#[derive(Debug)]
pub struct AtlasContext {
    pub camps: Vec<CampRecord>,
    pub borders: Vec<BorderSnapshot>,
    pub countries: CountryOutlines,
    pub function_palette: Palette,
    pub firm_buckets: FirmBuckets,
    pub firm_palette: Palette,
    pub projection: TwoPointEquidistant,
    /// Rows discarded at load because they could never be active.
    pub dropped_camps: usize,
}

impl AtlasContext {
    /// Build palettes from the retained camps. Firm frequencies only count
    /// camps that survived loading.
    pub fn from_parts(
        dataset: CampDataset,
        borders: Vec<BorderSnapshot>,
        countries: CountryOutlines,
        top_firms: usize,
    ) -> Self {
        let dropped_camps = dataset.dropped();
        let camps = dataset.camps;
        let firm_buckets =
            FirmBuckets::from_firms(camps.iter().map(|camp| camp.firm.as_deref()), top_firms);
        let firm_palette = firm_buckets.palette(camps.iter().map(|camp| camp.firm.as_deref()));

        AtlasContext {
            function_palette: function_palette(),
            firm_buckets,
            firm_palette,
            projection: TwoPointEquidistant::atlas(),
            camps,
            borders,
            countries,
            dropped_camps,
        }
    }

    /// Load all static data from the configured paths.
    pub fn load(config: &AtlasConfig) -> Result<Arc<AtlasContext>, DataError> {
        let dataset = load_camps(&config.camps_path())?;
        let borders = load_borders(&config.borders_path())?;
        let countries = load_countries(&config.countries_path())?;
        let context = Self::from_parts(dataset, borders, countries, config.top_firms);
        tracing::info!(
            target: "camp_atlas::data",
            camps = context.camps.len(),
            borders = context.borders.len(),
            countries = context.countries.len(),
            firms_kept = context.firm_buckets.kept().len(),
            "atlas_context.ready"
        );
        Ok(Arc::new(context))
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            camps: self.camps.len(),
            dropped_camps: self.dropped_camps,
            border_snapshots: self.borders.len(),
            countries: self.countries.len(),
            first_open: self.camps.iter().map(|camp| camp.date_open).min(),
            last_close: self.camps.iter().map(|camp| camp.date_close).max(),
            border_data_end: border_data_end(),
            slider: SliderRange::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub camps: usize,
    pub dropped_camps: usize,
    pub border_snapshots: usize,
    pub countries: usize,
    pub first_open: Option<NaiveDateTime>,
    pub last_close: Option<NaiveDateTime>,
    pub border_data_end: NaiveDateTime,
    pub slider: SliderRange,
}
