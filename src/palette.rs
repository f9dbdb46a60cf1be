//! Colour palettes: the fixed camp colour, the function-category table and the
//! firm bucketing rule. All palettes are built once and never mutated.

use std::collections::HashMap;

use serde::Serialize;

/// d3 Category20. `category20(n)` takes the first `n` entries like `d3['Category20'][n]`.
pub const CATEGORY20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

pub const FIXED_COLOR: &str = "#aec7e8";
pub const FIXED_LEGEND: &str = "NA";
pub const UNKNOWN_COLOR: &str = "#d3d3d3";
pub const UNKNOWN_FIRM: &str = "Unknown";
pub const OTHER_FIRM: &str = "other";
pub const DEFAULT_TOP_FIRMS: usize = 12;
/// Two colours stay reserved for the `"other"` and `"Unknown"` buckets.
pub const MAX_TOP_FIRMS: usize = CATEGORY20.len() - 2;

pub fn category20(n: usize) -> &'static [&'static str] {
    &CATEGORY20[..n.min(CATEGORY20.len())]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FunctionCategory {
    NoLabor,
    Unspecified,
    BuildingMaterial,
    Construction,
    Armaments,
    Manufacturing,
    CampConstruction,
    DefenseConstruction,
    SickCollection,
    OilAndCoal,
    Extermination,
    MaterialTransport,
}

impl FunctionCategory {
    pub const ALL: [FunctionCategory; 12] = [
        Self::NoLabor,
        Self::Unspecified,
        Self::BuildingMaterial,
        Self::Construction,
        Self::Armaments,
        Self::Manufacturing,
        Self::CampConstruction,
        Self::DefenseConstruction,
        Self::SickCollection,
        Self::OilAndCoal,
        Self::Extermination,
        Self::MaterialTransport,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Missing or out-of-table codes read as `Unspecified`.
    pub fn resolve(code: Option<u8>) -> Self {
        code.and_then(Self::from_code).unwrap_or(Self::Unspecified)
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::NoLabor => "No labor",
            Self::Unspecified => "Unspecified",
            Self::BuildingMaterial => "Building material",
            Self::Construction => "Construction",
            Self::Armaments => "Armaments",
            Self::Manufacturing => "Manufacturing (non-armament)",
            Self::CampConstruction => "Camp construction",
            Self::DefenseConstruction => "Defense construction",
            Self::SickCollection => "Collection of sick/dying",
            Self::OilAndCoal => "Oil and coal production",
            Self::Extermination => "Extermination",
            Self::MaterialTransport => "Material transport",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteEntry {
    pub label: String,
    pub color: String,
}

/// Ordered label -> colour mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Palette {
    pub fn from_pairs<I, L, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, C)>,
        L: Into<String>,
        C: Into<String>,
    {
        let mut palette = Palette::default();
        for (label, color) in pairs {
            palette.insert(label.into(), color.into());
        }
        palette
    }

    /// Insert or overwrite; overwriting keeps the original position.
    pub fn insert(&mut self, label: String, color: String) {
        match self.index.get(&label) {
            Some(&pos) => self.entries[pos].color = color,
            None => {
                self.index.insert(label.clone(), self.entries.len());
                self.entries.push(PaletteEntry { label, color });
            }
        }
    }

    pub fn color(&self, label: &str) -> Option<&str> {
        self.index
            .get(label)
            .map(|&pos| self.entries[pos].color.as_str())
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn contains_color(&self, color: &str) -> bool {
        self.entries.iter().any(|entry| entry.color == color)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Function names zipped with the first twelve Category20 colours.
pub fn function_palette() -> Palette {
    Palette::from_pairs(
        FunctionCategory::ALL
            .iter()
            .map(|category| category.name())
            .zip(category20(FunctionCategory::ALL.len()).iter().copied()),
    )
}

/// Keeps the `top_n` most frequent firms distinct and folds the rest into
/// `"other"`; missing firms become `"Unknown"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirmBuckets {
    top_n: usize,
    kept: Vec<String>,
}

impl FirmBuckets {
    /// `top_n` is clamped to [`MAX_TOP_FIRMS`] so every bucket still gets a
    /// Category20 colour; `AtlasConfig` rejects larger values up front.
    pub fn from_firms<'a, I>(firms: I, top_n: usize) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let top_n = top_n.min(MAX_TOP_FIRMS);
        let ranked = rank_by_frequency(firms.into_iter().flatten());
        FirmBuckets {
            top_n,
            kept: ranked.into_iter().take(top_n).map(str::to_string).collect(),
        }
    }

    pub fn kept(&self) -> &[String] {
        &self.kept
    }

    pub fn bucket<'a>(&'a self, firm: Option<&'a str>) -> &'a str {
        match firm {
            None => UNKNOWN_FIRM,
            Some(name) if self.kept.iter().any(|kept| kept == name) => name,
            Some(_) => OTHER_FIRM,
        }
    }

    /// Buckets ordered by how many records fall in each, zipped with the first
    /// `top_n + 2` Category20 colours. `"Unknown"` is always grey.
    pub fn palette<'a, I>(&self, firms: I) -> Palette
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let buckets: Vec<&str> = firms.into_iter().map(|firm| self.bucket(firm)).collect();
        let ranked = rank_by_frequency(buckets);
        let mut palette = Palette::from_pairs(
            ranked
                .into_iter()
                .zip(category20(self.top_n + 2).iter().copied()),
        );
        palette.insert(UNKNOWN_FIRM.to_string(), UNKNOWN_COLOR.to_string());
        palette
    }
}

/// Distinct values by descending count; ties keep first-appearance order.
fn rank_by_frequency<'a, I>(values: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for value in values {
        match positions.get(value) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                positions.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }
    // Stable sort preserves first-appearance order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().map(|(value, _)| value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_palette_covers_every_category_in_table_order() {
        let palette = function_palette();
        assert_eq!(palette.len(), 12);
        assert_eq!(palette.entries()[0].label, "No labor");
        assert_eq!(palette.color("No labor"), Some("#1f77b4"));
        assert_eq!(palette.color("Material transport"), Some("#c49c94"));
    }

    #[test]
    fn unknown_function_codes_read_as_unspecified() {
        assert_eq!(FunctionCategory::resolve(None), FunctionCategory::Unspecified);
        assert_eq!(FunctionCategory::resolve(Some(42)), FunctionCategory::Unspecified);
        assert_eq!(FunctionCategory::resolve(Some(10)), FunctionCategory::Extermination);
        assert_eq!(FunctionCategory::Extermination.code(), 10);
    }

    #[test]
    fn firm_buckets_keep_top_n_and_fold_the_rest() {
        let firms = [Some("A"), Some("B"), Some("A"), Some("C"), None, Some("B"), Some("A")];
        let buckets = FirmBuckets::from_firms(firms.iter().copied(), 2);

        assert_eq!(buckets.kept(), ["A".to_string(), "B".to_string()]);
        assert_eq!(buckets.bucket(Some("A")), "A");
        assert_eq!(buckets.bucket(Some("C")), OTHER_FIRM);
        assert_eq!(buckets.bucket(None), UNKNOWN_FIRM);
    }

    #[test]
    fn frequency_ties_keep_first_appearance() {
        let firms = [Some("Z"), Some("Y"), Some("X"), Some("Y"), Some("Z")];
        let buckets = FirmBuckets::from_firms(firms.iter().copied(), 1);
        assert_eq!(buckets.kept(), ["Z".to_string()]);
    }

    #[test]
    fn firm_palette_orders_buckets_by_count_and_greys_unknown() {
        let firms = [None, None, None, Some("A"), Some("A"), Some("B")];
        let buckets = FirmBuckets::from_firms(firms.iter().copied(), 1);
        let palette = buckets.palette(firms.iter().copied());

        let labels: Vec<&str> = palette.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["Unknown", "A", "other"]);
        assert_eq!(palette.color("Unknown"), Some(UNKNOWN_COLOR));
        assert_eq!(palette.color("A"), Some(CATEGORY20[1]));
        assert_eq!(palette.color("other"), Some(CATEGORY20[2]));
    }

    #[test]
    fn palette_insert_overwrites_in_place() {
        let mut palette = Palette::from_pairs([("a", "#000000"), ("b", "#111111")]);
        palette.insert("a".to_string(), "#222222".to_string());
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.entries()[0].color, "#222222");
    }

    #[test]
    fn top_n_beyond_the_palette_is_clamped() {
        let names: Vec<String> = (0..25).map(|i| format!("F{i:02}")).collect();
        let buckets = FirmBuckets::from_firms(names.iter().map(|n| Some(n.as_str())), 40);
        assert_eq!(buckets.kept().len(), MAX_TOP_FIRMS);
        assert_eq!(buckets.bucket(Some("F24")), OTHER_FIRM);

        let palette = buckets.palette(names.iter().map(|n| Some(n.as_str())));
        // Kept firms, "other", and the always-present "Unknown".
        assert_eq!(palette.len(), MAX_TOP_FIRMS + 2);
        assert!(palette
            .entries()
            .iter()
            .filter(|entry| entry.label != UNKNOWN_FIRM)
            .all(|entry| CATEGORY20.contains(&entry.color.as_str())));
    }
}
