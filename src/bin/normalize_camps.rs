//! Convert a CSV export of the camp layer into the canonical camps JSON dataset.
//! Usage: normalize_camps <input.csv> [output.json]  (default output: data/camps.json)
//! Header row required; columns MAIN, SUBCAMP, DATE_OPEN, DATE_CLOSE, LON, LAT,
//! PEAK_POP, FUNC_1, FIRMABBREV, NATIONS, LABOR in any order (case-insensitive).
//! Empty cells become null; nothing is dropped here, the loader does that.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use camp_atlas::data::camp::RawCampRow;

const REQUIRED_COLUMNS: &[&str] = &["DATE_OPEN", "DATE_CLOSE", "LON", "LAT"];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let input_path = PathBuf::from(
        args.next()
            .ok_or("usage: normalize_camps <input.csv> [output.json]")?,
    );
    let output_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/camps.json"));

    let csv_content = fs::read_to_string(&input_path)
        .map_err(|e| format!("Read {}: {}", input_path.display(), e))?;

    let mut reader = csv::Reader::from_reader(csv_content.as_bytes());
    let columns = ColumnIndex::from_headers(reader.headers()?)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(columns.row(&record)?);
    }

    let undated = rows
        .iter()
        .filter(|row| row.date_open.is_none() || row.date_close.is_none())
        .count();

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output_path, serde_json::to_string_pretty(&rows)?)?;
    println!(
        "Wrote {} camps ({} undated) to {}",
        rows.len(),
        undated,
        output_path.display()
    );
    Ok(())
}

struct ColumnIndex {
    by_name: HashMap<String, usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, Box<dyn std::error::Error>> {
        let by_name: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_ascii_uppercase(), i))
            .collect();
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|col| !by_name.contains_key(*col))
            .collect();
        if !missing.is_empty() {
            return Err(format!("CSV header is missing column(s): {}", missing.join(", ")).into());
        }
        Ok(Self { by_name })
    }

    fn text(&self, record: &csv::StringRecord, column: &str) -> Option<String> {
        let value = record.get(*self.by_name.get(column)?)?.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("nan") || value.eq_ignore_ascii_case("nat") {
            None
        } else {
            Some(value.to_string())
        }
    }

    fn number(
        &self,
        record: &csv::StringRecord,
        column: &str,
    ) -> Result<Option<f64>, Box<dyn std::error::Error>> {
        match self.text(record, column) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .map(Some)
                .map_err(|e| format!("column {column}: '{raw}' is not a number: {e}").into()),
        }
    }

    fn row(&self, record: &csv::StringRecord) -> Result<RawCampRow, Box<dyn std::error::Error>> {
        Ok(RawCampRow {
            main: self.text(record, "MAIN"),
            subcamp: self.text(record, "SUBCAMP"),
            date_open: self.text(record, "DATE_OPEN"),
            date_close: self.text(record, "DATE_CLOSE"),
            lon: self.number(record, "LON")?,
            lat: self.number(record, "LAT")?,
            peak_pop: self.number(record, "PEAK_POP")?,
            function: self.number(record, "FUNC_1")?,
            firm: self.text(record, "FIRMABBREV"),
            nations: self.text(record, "NATIONS"),
            labor: self.text(record, "LABOR"),
        })
    }
}
