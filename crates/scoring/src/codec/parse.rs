use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::format::{decode_score_with, format_time_ms};
use super::{CodecOptions, MS_PER_SECOND, ParsedScoreResult, ROUNDS_SCALE, load_to_grams};
use crate::error::{Result, ScoringError};
use crate::models::{EncodedScore, ScoreStatus, TiebreakScheme, WeightUnit, WorkoutScheme};

/// Longest digit run accepted for a single number or time segment.
const MAX_DIGITS: usize = 9;

type FieldResult<T> = std::result::Result<T, String>;

/// Validates and encodes an entered score using default workout options.
///
/// Never fails on bad input: grammar violations come back as
/// `is_valid == false` with a message for the submitter.
///
/// ```
/// use scoring::codec::parse_score;
/// use scoring::models::WorkoutScheme;
///
/// let parsed = parse_score("12:34", WorkoutScheme::Time);
/// assert!(parsed.is_valid);
/// assert_eq!(parsed.encoded, Some(754_000));
/// assert_eq!(parsed.formatted.as_deref(), Some("12:34"));
/// ```
pub fn parse_score(raw: &str, scheme: WorkoutScheme) -> ParsedScoreResult {
    parse_score_with(raw, scheme, &CodecOptions::default())
}

pub fn parse_score_with(raw: &str, scheme: WorkoutScheme, options: &CodecOptions) -> ParsedScoreResult {
    let input = raw.trim().to_lowercase();
    if input.is_empty() {
        return ParsedScoreResult::invalid("Score is required");
    }

    if let Some(result) = parse_status_token(&input, scheme) {
        return result;
    }

    let encoded = match scheme {
        WorkoutScheme::Time | WorkoutScheme::TimeWithCap => parse_time(&input),
        WorkoutScheme::RoundsReps => parse_rounds_reps(&input, options.reps_per_round),
        WorkoutScheme::Reps | WorkoutScheme::Emom => {
            parse_count(strip_unit(&input, &["reps", "rep"]), "Invalid rep count")
        }
        WorkoutScheme::Calories => parse_count(
            strip_unit(&input, &["calories", "cals", "cal"]),
            "Invalid calorie count",
        ),
        WorkoutScheme::Feet => parse_count(strip_unit(&input, &["feet", "ft"]), "Invalid distance"),
        WorkoutScheme::Meters => parse_meters(strip_unit(&input, &["meters", "m"])),
        WorkoutScheme::Points => parse_points(strip_unit(&input, &["points", "pts", "pt"])),
        WorkoutScheme::Load => parse_load(&input, options.unit),
        WorkoutScheme::PassFail => parse_pass_fail(&input),
    };

    match encoded {
        Ok(value) => ParsedScoreResult::scored(value, decode_score_with(value, scheme, options)),
        Err(error) => ParsedScoreResult::invalid(error),
    }
}

/// Like [`parse_score`] but for trusted input: invalid scores are an error.
pub fn encode_score(raw: &str, scheme: WorkoutScheme) -> Result<EncodedScore> {
    encode_score_with(raw, scheme, &CodecOptions::default())
}

pub fn encode_score_with(raw: &str, scheme: WorkoutScheme, options: &CodecOptions) -> Result<EncodedScore> {
    let parsed = parse_score_with(raw, scheme, options);
    match parsed.encoded {
        Some(value) => Ok(value),
        None => Err(ScoringError::InvalidScore(parsed.error.unwrap_or_else(|| {
            format!("'{}' has no numeric value for {}", raw.trim(), scheme)
        }))),
    }
}

/// Packs rounds and reps into one integer.
///
/// `reps` must stay below `reps_per_round` when it is known, and always
/// below [`ROUNDS_SCALE`].
pub fn encode_rounds(rounds: u32, reps: u32, reps_per_round: Option<u32>) -> Result<EncodedScore> {
    pack_rounds(i64::from(rounds), i64::from(reps), reps_per_round).map_err(ScoringError::InvalidScore)
}

/// Splits a packed rounds-reps value back into `(rounds, reps)`.
pub fn decode_rounds(encoded: EncodedScore) -> (i64, i64) {
    (encoded.div_euclid(ROUNDS_SCALE), encoded.rem_euclid(ROUNDS_SCALE))
}

/// Parses the secondary result recorded to split ties.
pub fn parse_tiebreak(raw: &str, scheme: TiebreakScheme) -> ParsedScoreResult {
    let input = raw.trim().to_lowercase();
    if input.is_empty() {
        return ParsedScoreResult::invalid("Tiebreak is required");
    }

    let parsed = match scheme {
        TiebreakScheme::Time => parse_time(&input).map(|ms| (ms, format_time_ms(ms))),
        TiebreakScheme::Reps => parse_count(strip_unit(&input, &["reps", "rep"]), "Invalid rep count")
            .map(|reps| (reps, reps.to_string())),
    };

    match parsed {
        Ok((value, formatted)) => ParsedScoreResult::scored(value, formatted),
        Err(error) => ParsedScoreResult::invalid(error),
    }
}

fn parse_status_token(input: &str, scheme: WorkoutScheme) -> Option<ParsedScoreResult> {
    match input {
        "dns" | "did not start" => Some(ParsedScoreResult::status_only(ScoreStatus::Dns, "DNS")),
        "dnf" | "did not finish" => Some(ParsedScoreResult::status_only(ScoreStatus::Dnf, "DNF")),
        "wd" | "withdrawn" => Some(ParsedScoreResult::status_only(ScoreStatus::Withdrawn, "WD")),
        "cap" | "capped" | "c" if scheme.is_time_based() => {
            Some(ParsedScoreResult::status_only(ScoreStatus::Capped, "CAP"))
        }
        "cap" | "capped" | "c" => Some(ParsedScoreResult::invalid("CAP is only valid for timed workouts")),
        _ => None,
    }
}

/// Accepts `SS`, `MM:SS` or `H:MM:SS`, each with up to three fraction digits.
fn parse_time(input: &str) -> FieldResult<i64> {
    let segments: Vec<&str> = input.split(':').map(str::trim).collect();
    if segments.len() > 3 {
        return Err("Time must be SS, MM:SS or H:MM:SS".to_string());
    }

    let Some((last, leading)) = segments.split_last() else {
        return Err("Invalid time format".to_string());
    };

    let (whole, fraction) = match last.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (*last, None),
    };

    let seconds = parse_digits(whole).ok_or_else(|| "Invalid time format".to_string())?;
    let millis = match fraction {
        None => 0,
        Some(digits) if (1..=3).contains(&digits.len()) => {
            let value = parse_digits(digits).ok_or_else(|| "Invalid fractional seconds".to_string())?;
            value * 10_i64.pow(3 - digits.len() as u32)
        }
        Some(_) => return Err("Fractional seconds allow at most 3 digits".to_string()),
    };

    let mut units = Vec::with_capacity(leading.len());
    for segment in leading {
        units.push(parse_digits(segment).ok_or_else(|| "Invalid time format".to_string())?);
    }

    if !leading.is_empty() {
        if whole.len() != 2 {
            return Err("Seconds must have two digits".to_string());
        }
        if seconds >= 60 {
            return Err("Seconds must be less than 60".to_string());
        }
    }
    if leading.len() == 2 {
        if leading[1].len() != 2 {
            return Err("Minutes must have two digits".to_string());
        }
        if units[1] >= 60 {
            return Err("Minutes must be less than 60".to_string());
        }
    }

    let total_seconds = units
        .iter()
        .chain(std::iter::once(&seconds))
        .fold(0_i64, |acc, value| acc * 60 + value);

    Ok(total_seconds * MS_PER_SECOND + millis)
}

fn parse_rounds_reps(input: &str, reps_per_round: Option<u32>) -> FieldResult<i64> {
    const INVALID: &str = "Invalid rounds+reps format";

    let (rounds, reps) = match input.split_once('+') {
        Some((rounds, reps)) => {
            let rounds = parse_digits(rounds.trim()).ok_or_else(|| INVALID.to_string())?;
            let reps = parse_digits(strip_unit(reps.trim(), &["reps", "rep"]))
                .ok_or_else(|| INVALID.to_string())?;
            (rounds, reps)
        }
        None => {
            let rounds = parse_digits(strip_unit(input, &["rounds", "round", "rds"]))
                .ok_or_else(|| INVALID.to_string())?;
            (rounds, 0)
        }
    };

    pack_rounds(rounds, reps, reps_per_round)
}

fn pack_rounds(rounds: i64, reps: i64, reps_per_round: Option<u32>) -> FieldResult<i64> {
    if let Some(limit) = reps_per_round
        && reps >= i64::from(limit)
    {
        return Err(format!("Reps must be less than {} reps per round", limit));
    }
    if reps >= ROUNDS_SCALE {
        return Err(format!("Reps must be less than {}", ROUNDS_SCALE));
    }

    rounds
        .checked_mul(ROUNDS_SCALE)
        .and_then(|packed| packed.checked_add(reps))
        .ok_or_else(|| "Too many rounds".to_string())
}

fn parse_count(input: &str, error: &str) -> FieldResult<i64> {
    parse_digits(input).ok_or_else(|| error.to_string())
}

fn parse_points(input: &str) -> FieldResult<i64> {
    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, input),
    };
    let value = parse_digits(digits).ok_or_else(|| "Invalid points".to_string())?;
    Ok(if negative { -value } else { value })
}

fn parse_meters(input: &str) -> FieldResult<i64> {
    let meters = parse_fixed(input, 3).ok_or_else(|| "Invalid distance".to_string())?;
    (meters * Decimal::from(1_000))
        .to_i64()
        .ok_or_else(|| "Distance is too large".to_string())
}

fn parse_load(input: &str, default_unit: WeightUnit) -> FieldResult<i64> {
    let kg = strip_unit(input, &["kgs", "kg"]);
    let lbs = strip_unit(input, &["lbs", "lb"]);
    let (number, unit) = if kg.len() != input.len() {
        (kg, WeightUnit::Kg)
    } else if lbs.len() != input.len() {
        (lbs, WeightUnit::Lbs)
    } else {
        (input, default_unit)
    };

    let amount = parse_fixed(number, 1)
        .ok_or_else(|| "Load must be a non-negative number with at most one decimal".to_string())?;

    load_to_grams(amount, unit).ok_or_else(|| "Load is too large".to_string())
}

fn parse_pass_fail(input: &str) -> FieldResult<i64> {
    match input {
        "pass" | "p" | "1" => Ok(1),
        "fail" | "f" | "0" => Ok(0),
        _ => Err("Enter 'pass' or 'fail'".to_string()),
    }
}

/// Removes the first matching unit label, but only when a number precedes it.
fn strip_unit<'a>(input: &'a str, units: &[&str]) -> &'a str {
    for unit in units {
        if let Some(rest) = input.strip_suffix(unit) {
            let rest = rest.trim_end();
            if rest.ends_with(|c: char| c.is_ascii_digit()) {
                return rest;
            }
        }
    }
    input
}

fn parse_digits(input: &str) -> Option<i64> {
    if input.is_empty() || input.len() > MAX_DIGITS || !input.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    input.parse().ok()
}

/// Non-negative decimal with at most `max_fraction` fraction digits.
fn parse_fixed(input: &str, max_fraction: usize) -> Option<Decimal> {
    let (whole, fraction) = match input.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (input, None),
    };

    parse_digits(whole)?;
    if let Some(fraction) = fraction
        && (fraction.is_empty()
            || fraction.len() > max_fraction
            || !fraction.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    Decimal::from_str(input).ok()
}
