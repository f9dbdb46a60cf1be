use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::data::camp::{function_code, load_camp_rows, RawCampRow};
use crate::data::{parse_timestamp, DataError};
use crate::palette::FunctionCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
    Info,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub rows: usize,
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

pub fn validate_camp_dataset(path: &Path) -> Result<ValidationReport, DataError> {
    let rows = load_camp_rows(path)?;
    Ok(validate_camp_rows(&rows))
}

/// Undated rows are warnings (they are dropped at load, as intended); rows that
/// are dated but cannot be placed or ordered are errors.
pub fn validate_camp_rows(rows: &[RawCampRow]) -> ValidationReport {
    let mut report = ValidationReport {
        rows: rows.len(),
        ..ValidationReport::default()
    };

    for (index, row) in rows.iter().enumerate() {
        let context = match row.subcamp.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(name) => format!("camps[{index}] '{name}'"),
            None => {
                report.push(
                    ValidationSeverity::Warning,
                    format!("camps[{index}].subcamp"),
                    "missing subcamp name",
                );
                format!("camps[{index}]")
            }
        };

        validate_dates(&mut report, &context, row);
        validate_location(&mut report, &context, row);

        if let Some(pop) = row.peak_pop {
            if pop < 0.0 {
                report.push(
                    ValidationSeverity::Error,
                    format!("{context}.peak_pop"),
                    format!("negative peak population {pop}"),
                );
            }
        }

        if let Some(raw) = row.function {
            if function_code(raw).and_then(FunctionCategory::from_code).is_none() {
                report.push(
                    ValidationSeverity::Warning,
                    format!("{context}.function"),
                    format!("unknown function code {raw}, shown as 'Unspecified'"),
                );
            }
        }
    }

    report
}

fn validate_dates(report: &mut ValidationReport, context: &str, row: &RawCampRow) {
    let open = parse_date_field(report, context, "date_open", row.date_open.as_deref());
    let close = parse_date_field(report, context, "date_close", row.date_close.as_deref());

    match (open, close) {
        (Some(open), Some(close)) if open >= close => report.push(
            ValidationSeverity::Error,
            context.to_string(),
            format!("opens ({open}) on or after it closes ({close})"),
        ),
        (Some(_), Some(_)) => {}
        _ => report.push(
            ValidationSeverity::Warning,
            context.to_string(),
            "undated row is dropped at load",
        ),
    }
}

fn parse_date_field(
    report: &mut ValidationReport,
    context: &str,
    field: &str,
    raw: Option<&str>,
) -> Option<chrono::NaiveDateTime> {
    let raw = raw?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        report.push(
            ValidationSeverity::Error,
            format!("{context}.{field}"),
            format!("unparsable timestamp '{raw}'"),
        );
    }
    parsed
}

fn validate_location(report: &mut ValidationReport, context: &str, row: &RawCampRow) {
    match (row.lon, row.lat) {
        (Some(lon), Some(lat)) => {
            if !(-180.0..=180.0).contains(&lon) {
                report.push(
                    ValidationSeverity::Error,
                    format!("{context}.lon"),
                    format!("longitude {lon} out of range"),
                );
            }
            if !(-90.0..=90.0).contains(&lat) {
                report.push(
                    ValidationSeverity::Error,
                    format!("{context}.lat"),
                    format!("latitude {lat} out of range"),
                );
            }
        }
        _ => report.push(
            ValidationSeverity::Error,
            context.to_string(),
            "missing lon/lat",
        ),
    }
}
