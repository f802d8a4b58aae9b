use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use scoring::codec::{CodecOptions, parse_score_with};
use scoring::dto::{
    CompetitionRequest, CoverageRequest, CoverageResponse, EventLeaderboardResponse, StandingsResponse,
    ValidationReport,
};
use scoring::models::{HeatScheduleParams, WeightUnit, WorkoutScheme};
use scoring::services::{
    build_heat_schedule, calculate_coverage, calculate_division_standings, calculate_event_points,
    validate_rotation,
};
use validator::Validate;

use crate::config::Config;

#[derive(clap::Args)]
pub struct ParseArgs {
    pub raw: String,

    /// Workout scheme, e.g. time, rounds-reps, load
    #[arg(short, long)]
    pub scheme: String,

    /// Interpret and display load in kilograms
    #[arg(long)]
    pub kg: bool,

    #[arg(long)]
    pub reps_per_round: Option<u32>,
}

#[derive(clap::Args)]
pub struct ScheduleArgs {
    /// First heat start, e.g. 2025-03-01T09:00:00
    #[arg(long)]
    pub start: String,

    #[arg(long)]
    pub heats: u32,

    #[arg(long, default_value_t = 10)]
    pub duration: u32,

    #[arg(long, default_value_t = 3)]
    pub transition: u32,

    #[arg(long, default_value_t = 1)]
    pub first_heat: u32,
}

pub fn parse(args: &ParseArgs, config: &Config) -> Result<()> {
    let scheme: WorkoutScheme = args.scheme.parse()?;
    let options = CodecOptions {
        unit: if args.kg { WeightUnit::Kg } else { WeightUnit::Lbs },
        reps_per_round: args.reps_per_round,
    };

    let parsed = parse_score_with(&args.raw, scheme, &options);
    print_json(&parsed, config.pretty)
}

pub fn event(file: &Path, validate_only: bool, config: &Config) -> Result<()> {
    let request = load_competition(file)?;
    if validate_only {
        info!("{} is valid", file.display());
        return Ok(());
    }

    let mut report = ValidationReport::default();
    let mut responses = Vec::with_capacity(request.events.len());
    for event in &request.events {
        let inputs = event.to_inputs(&mut report);
        let placements = calculate_event_points(&inputs, &request.config)
            .with_context(|| format!("Failed to rank event '{}'", event.name))?;
        responses.push(EventLeaderboardResponse::new(event, &inputs, placements));
    }
    report.log_warnings();

    print_json(&responses, config.pretty)
}

pub fn standings(file: &Path, config: &Config) -> Result<()> {
    let request = load_competition(file)?;

    let mut report = ValidationReport::default();
    let events = request.to_event_scores(&mut report);
    report.log_warnings();

    let divisions = calculate_division_standings(&events, &request.divisions(), &request.config)
        .context("Failed to calculate standings")?;

    info!(
        events = events.len(),
        divisions = divisions.len(),
        "Calculated standings"
    );

    let response = StandingsResponse {
        algorithm: request.config.algorithm.display_name().to_string(),
        divisions,
        warnings: report.warnings,
    };
    print_json(&response, config.pretty)
}

pub fn coverage(file: &Path, config: &Config) -> Result<()> {
    let request: CoverageRequest = read_json(file)?;
    request
        .validate()
        .with_context(|| format!("Invalid rotations in {}", file.display()))?;

    let heats = request.resolved_heats(config.default_lane_count);
    let coverage = calculate_coverage(&request.rotations, &heats);
    let validations = request
        .rotations
        .iter()
        .map(|rotation| validate_rotation(rotation, &request.rotations, &heats))
        .collect();

    info!(
        covered = coverage.covered_slots,
        total = coverage.total_slots,
        "Coverage {}%",
        coverage.coverage_percent
    );

    print_json(
        &CoverageResponse {
            coverage,
            validations,
        },
        config.pretty,
    )
}

pub fn schedule(args: &ScheduleArgs, config: &Config) -> Result<()> {
    let start: NaiveDateTime = args
        .start
        .parse()
        .with_context(|| format!("Invalid start time '{}'", args.start))?;

    let params = HeatScheduleParams {
        first_heat_number: args.first_heat,
        heat_count: args.heats,
        duration_minutes: args.duration,
        transition_minutes: args.transition,
    };
    let schedule = build_heat_schedule(start, &params)?;
    print_json(&schedule, config.pretty)
}

fn load_competition(file: &Path) -> Result<CompetitionRequest> {
    let request: CompetitionRequest = read_json(file)?;

    let report = request.validate();
    report.log_warnings();
    if !report.is_valid() {
        bail!(
            "Validation failed with {} error(s): {}",
            report.errors.len(),
            report.errors.join("; ")
        );
    }

    Ok(request)
}

fn read_json<T: DeserializeOwned>(file: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", file.display()))
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}
