use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::parse::decode_rounds;
use super::{CodecOptions, MS_PER_SECOND, grams_per_pound, load_to_grams};
use crate::models::{EncodedScore, Score, ScoreStatus, TiebreakScheme, WeightUnit, WorkoutScheme};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatOptions {
    /// Prefix capped results with `CAP`.
    pub show_status: bool,
    pub unit: WeightUnit,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            show_status: true,
            unit: WeightUnit::default(),
        }
    }
}

/// Turns a stored integer back into the canonical entry string.
///
/// The output always parses back to the same value.
pub fn decode_score(encoded: EncodedScore, scheme: WorkoutScheme) -> String {
    decode_score_with(encoded, scheme, &CodecOptions::default())
}

pub fn decode_score_with(encoded: EncodedScore, scheme: WorkoutScheme, options: &CodecOptions) -> String {
    match scheme {
        WorkoutScheme::Time | WorkoutScheme::TimeWithCap => format_time_ms(encoded),
        WorkoutScheme::RoundsReps => {
            let (rounds, reps) = decode_rounds(encoded);
            if reps == 0 {
                rounds.to_string()
            } else {
                format!("{}+{}", rounds, reps)
            }
        }
        WorkoutScheme::Reps | WorkoutScheme::Emom => format!("{} reps", encoded),
        WorkoutScheme::Calories => format!("{} cal", encoded),
        WorkoutScheme::Feet => format!("{}ft", encoded),
        WorkoutScheme::Points => format!("{} pts", encoded),
        WorkoutScheme::Meters => format!("{}m", Decimal::new(encoded, 3).normalize()),
        WorkoutScheme::Load => format_load(encoded, options.unit),
        WorkoutScheme::PassFail => {
            if encoded > 0 {
                "Pass".to_string()
            } else {
                "Fail".to_string()
            }
        }
    }
}

/// Load in `preferred` when one decimal reproduces the grams exactly, else in
/// the other unit. Every load entered in either unit round-trips.
fn format_load(grams: EncodedScore, preferred: WeightUnit) -> String {
    let other = match preferred {
        WeightUnit::Kg => WeightUnit::Lbs,
        WeightUnit::Lbs => WeightUnit::Kg,
    };

    [preferred, other]
        .into_iter()
        .map(|unit| (load_amount(grams, unit), unit))
        .find(|(amount, unit)| load_to_grams(*amount, *unit) == Some(grams))
        .map(|(amount, unit)| format!("{} {}", amount.normalize(), unit.label()))
        .unwrap_or_else(|| format!("{} {}", load_amount(grams, preferred).normalize(), preferred.label()))
}

fn load_amount(grams: EncodedScore, unit: WeightUnit) -> Decimal {
    let amount = match unit {
        WeightUnit::Kg => Decimal::new(grams, 3),
        WeightUnit::Lbs => Decimal::from(grams) / grams_per_pound(),
    };
    amount.round_dp(1)
}

/// `M:SS` under an hour, `H:MM:SS` above, milliseconds only when present.
pub fn format_time_ms(ms: i64) -> String {
    let sign = if ms < 0 { "-" } else { "" };
    let ms = ms.unsigned_abs();
    let total_seconds = ms / MS_PER_SECOND as u64;
    let millis = ms % MS_PER_SECOND as u64;

    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut out = if hours > 0 {
        format!("{}{}:{:02}:{:02}", sign, hours, minutes, seconds)
    } else {
        format!("{}{}:{:02}", sign, minutes, seconds)
    };

    if millis > 0 {
        let fraction = format!("{:03}", millis);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }

    out
}

/// User-facing label for a score, status first.
pub fn format_score(score: &Score) -> String {
    format_score_with(score, &FormatOptions::default())
}

pub fn format_score_with(score: &Score, options: &FormatOptions) -> String {
    let codec = CodecOptions::with_unit(options.unit);
    let decoded = |value: EncodedScore| decode_score_with(value, score.scheme, &codec);

    match score.status {
        ScoreStatus::Dnf => "DNF".to_string(),
        ScoreStatus::Dns => "—".to_string(),
        ScoreStatus::Withdrawn => "WD".to_string(),
        ScoreStatus::Capped => {
            let detail = score
                .capped_reps()
                .map(|reps| format!("{} reps", reps))
                .or_else(|| score.value.map(decoded));
            match detail {
                Some(detail) if options.show_status => format!("CAP ({})", detail),
                Some(detail) => detail,
                None => "CAP".to_string(),
            }
        }
        ScoreStatus::Scored => score.value.map(decoded).unwrap_or_else(|| "—".to_string()),
    }
}

/// [`format_score`] followed by the tiebreak, e.g. `12:34 (TB: 150)`.
pub fn format_score_with_tiebreak(score: &Score) -> String {
    let base = format_score(score);
    match score.tiebreak {
        Some(tiebreak) => {
            let value = match tiebreak.scheme {
                TiebreakScheme::Time => format_time_ms(tiebreak.value),
                TiebreakScheme::Reps => tiebreak.value.to_string(),
            };
            format!("{} (TB: {})", base, value)
        }
        None => base,
    }
}
