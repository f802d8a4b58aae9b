//! Conversion between entered scores, stored integers and display strings.
//!
//! Every scheme stores one signed integer whose natural ordering follows the
//! competitive ordering once the score type direction is applied:
//!
//! | scheme                     | stored unit                    |
//! |----------------------------|--------------------------------|
//! | time, time-with-cap        | milliseconds                   |
//! | rounds-reps                | `rounds * ROUNDS_SCALE + reps` |
//! | load                       | grams                          |
//! | meters                     | millimetres                    |
//! | reps, emom, calories, feet | count                          |
//! | points                     | count, may be negative         |
//! | pass-fail                  | 1 for pass, 0 for fail         |

pub mod format;
pub mod multi_round;
pub mod parse;
pub mod sort_key;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::models::{EncodedScore, ScoreStatus, WeightUnit};

pub use format::{
    FormatOptions, decode_score, decode_score_with, format_score, format_score_with,
    format_score_with_tiebreak, format_time_ms,
};
pub use multi_round::{
    MultiRoundResult, RoundInput, SkippedRound, aggregate_values, encode_multi_round, format_rounds,
};
pub use parse::{
    decode_rounds, encode_rounds, encode_score, encode_score_with, parse_score, parse_score_with,
    parse_tiebreak,
};
pub use sort_key::{
    SortKey, SortKeyParts, compare_scores, compute_sort_key, compute_sort_key_with_direction,
    extract_from_sort_key, find_rank, sort_key_to_string, sort_scores,
};

/// Multiplier packing rounds above reps. Fixed by stored data.
pub const ROUNDS_SCALE: i64 = 100_000;

pub const MS_PER_SECOND: i64 = 1_000;

pub const GRAMS_PER_KILOGRAM: i64 = 1_000;

/// 453.592 grams.
pub(crate) fn grams_per_pound() -> Decimal {
    Decimal::new(453_592, 3)
}

/// Nearest whole gram of `amount` in `unit`.
pub(crate) fn load_to_grams(amount: Decimal, unit: WeightUnit) -> Option<i64> {
    let grams = match unit {
        WeightUnit::Kg => amount * Decimal::from(GRAMS_PER_KILOGRAM),
        WeightUnit::Lbs => amount * grams_per_pound(),
    };
    grams.round().to_i64()
}

/// Per-workout context the input grammar may depend on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodecOptions {
    #[serde(default)]
    pub unit: WeightUnit,
    #[serde(default)]
    pub reps_per_round: Option<u32>,
}

impl CodecOptions {
    pub fn with_unit(unit: WeightUnit) -> Self {
        Self {
            unit,
            ..Self::default()
        }
    }

    pub fn with_reps_per_round(reps_per_round: u32) -> Self {
        Self {
            reps_per_round: Some(reps_per_round),
            ..Self::default()
        }
    }
}

/// Outcome of validating one entered score against one scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedScoreResult {
    pub is_valid: bool,
    pub encoded: Option<EncodedScore>,
    pub formatted: Option<String>,
    pub error: Option<String>,
    /// `Scored` for numeric results, the entered status for status tokens.
    pub status: Option<ScoreStatus>,
}

impl ParsedScoreResult {
    pub(crate) fn scored(encoded: EncodedScore, formatted: String) -> Self {
        Self {
            is_valid: true,
            encoded: Some(encoded),
            formatted: Some(formatted),
            error: None,
            status: Some(ScoreStatus::Scored),
        }
    }

    pub(crate) fn status_only(status: ScoreStatus, formatted: &str) -> Self {
        Self {
            is_valid: true,
            encoded: None,
            formatted: Some(formatted.to_string()),
            error: None,
            status: Some(status),
        }
    }

    pub(crate) fn invalid(error: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            encoded: None,
            formatted: None,
            error: Some(error.into()),
            status: None,
        }
    }
}
