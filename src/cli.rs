use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AtlasConfig;
use crate::data::registry::AtlasContext;
use crate::data::validate::{validate_camp_dataset, ValidationSeverity};
use crate::server;
use crate::server::api::palettes_payload;
use crate::snapshot::{
    display_state, parse_cutoff, select_border, write_snapshot_csv, ColorMode, DisplayOptions,
    ViewState,
};

const USAGE: &str = "usage: camp_atlas <serve|snapshot|border|palette|validate>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Snapshot,
    Border,
    Palette,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("snapshot") => Some(Command::Snapshot),
        Some("border") => Some(Command::Border),
        Some("palette") => Some(Command::Palette),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };

    let config = match AtlasConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };

    match command {
        Command::Serve => handle_serve(&config),
        Command::Snapshot => handle_snapshot(&config, args),
        Command::Border => handle_border(&config, args),
        Command::Palette => handle_palette(&config),
        Command::Validate => handle_validate(&config, args),
    }
}

fn load_context(config: &AtlasConfig) -> Option<Arc<AtlasContext>> {
    match AtlasContext::load(config) {
        Ok(context) => Some(context),
        Err(err) => {
            eprintln!("failed to load atlas data: {err}");
            None
        }
    }
}

fn handle_serve(config: &AtlasConfig) -> i32 {
    let Some(context) = load_context(config) else {
        return 1;
    };
    match server::run_server(&config.bind, context) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotArgs {
    pub view: ViewState,
    pub as_csv: bool,
}

/// `snapshot <date> [--size-by-pop] [--borders] [--color <mode>] [--csv]`
pub fn parse_snapshot_args(args: &[String]) -> Result<SnapshotArgs, String> {
    let raw_date = args
        .get(2)
        .filter(|arg| !arg.starts_with("--"))
        .ok_or_else(|| {
            "usage: camp_atlas snapshot <date> [--size-by-pop] [--borders] [--color fixed|by_function|by_firm] [--csv]"
                .to_string()
        })?;
    let cutoff = parse_cutoff(raw_date).map_err(|err| err.to_string())?;

    let mut options = DisplayOptions::default();
    let mut as_csv = false;
    let mut rest = args.iter().skip(3);
    while let Some(flag) = rest.next() {
        match flag.as_str() {
            "--size-by-pop" => options.size_by_population = true,
            "--borders" => options.show_borders = true,
            "--csv" => as_csv = true,
            "--color" => {
                let raw = rest.next().ok_or_else(|| "--color needs a value".to_string())?;
                options.color_mode = raw.parse::<ColorMode>().map_err(|err| err.to_string())?;
            }
            other => return Err(format!("unknown flag '{other}'")),
        }
    }

    Ok(SnapshotArgs {
        view: ViewState { cutoff, options },
        as_csv,
    })
}

fn handle_snapshot(config: &AtlasConfig, args: &[String]) -> i32 {
    let parsed = match parse_snapshot_args(args) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("{msg}");
            return 2;
        }
    };
    let Some(context) = load_context(config) else {
        return 1;
    };

    let state = display_state(&context, &parsed.view);
    if parsed.as_csv {
        if let Err(err) = write_snapshot_csv(&state.records, io::stdout().lock()) {
            eprintln!("failed to write csv: {err}");
            return 1;
        }
        return 0;
    }

    match serde_json::to_string_pretty(&state) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize snapshot: {err}");
            1
        }
    }
}

fn handle_border(config: &AtlasConfig, args: &[String]) -> i32 {
    let Some(raw_date) = args.get(2) else {
        eprintln!("usage: camp_atlas border <date>");
        return 2;
    };
    let cutoff = match parse_cutoff(raw_date) {
        Ok(cutoff) => cutoff,
        Err(err) => {
            eprintln!("{err}");
            return 2;
        }
    };
    let Some(context) = load_context(config) else {
        return 1;
    };

    match select_border(&context, cutoff, true) {
        Some(border) => println!("{}", border.date.format("%Y-%m-%dT%H:%M:%S")),
        None => println!("none"),
    }
    0
}

fn handle_palette(config: &AtlasConfig) -> i32 {
    let Some(context) = load_context(config) else {
        return 1;
    };
    match palettes_payload(&context) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize palettes: {err}");
            1
        }
    }
}

fn handle_validate(config: &AtlasConfig, args: &[String]) -> i32 {
    let path = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.camps_path());

    let report = match validate_camp_dataset(&path) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };

    for diagnostic in &report.diagnostics {
        eprintln!("- {diagnostic}");
    }
    let errors = report.count(ValidationSeverity::Error);
    let warnings = report.count(ValidationSeverity::Warning);
    if errors > 0 {
        eprintln!("validation failed: {errors} error(s), {warnings} warning(s)");
        1
    } else {
        println!(
            "validation passed: {} ({} rows, {warnings} warning(s))",
            path.display(),
            report.rows
        );
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::midnight;

    fn args(raw: &[&str]) -> Vec<String> {
        std::iter::once("camp_atlas")
            .chain(raw.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn snapshot_flags_map_onto_independent_options() {
        let parsed = parse_snapshot_args(&args(&[
            "snapshot",
            "1943-01-01",
            "--borders",
            "--color",
            "by_firm",
        ]))
        .expect("args should parse");
        assert_eq!(parsed.view.cutoff, midnight(1943, 1, 1));
        assert!(parsed.view.options.show_borders);
        assert!(!parsed.view.options.size_by_population);
        assert_eq!(parsed.view.options.color_mode, ColorMode::ByFirm);
        assert!(!parsed.as_csv);
    }

    #[test]
    fn snapshot_requires_a_date() {
        let err = parse_snapshot_args(&args(&["snapshot", "--csv"])).expect_err("date is required");
        assert!(err.starts_with("usage: camp_atlas snapshot"));
    }

    #[test]
    fn snapshot_rejects_unknown_mode_and_flags() {
        assert!(parse_snapshot_args(&args(&["snapshot", "1943-01-01", "--color", "pink"])).is_err());
        assert!(parse_snapshot_args(&args(&["snapshot", "1943-01-01", "--fast"])).is_err());
    }

    #[test]
    fn unknown_command_is_none() {
        assert_eq!(parse_command(&args(&["render"])), None);
        assert_eq!(parse_command(&args(&["validate"])), Some(Command::Validate));
    }
}
