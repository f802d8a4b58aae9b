use serde::{Deserialize, Serialize};

use super::format::decode_score_with;
use super::parse::parse_score_with;
use super::CodecOptions;
use crate::models::{Aggregation, EncodedScore, WorkoutScheme};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundInput {
    pub raw: String,
    /// Scheme of this round when it differs from the workout's.
    #[serde(default)]
    pub scheme_override: Option<WorkoutScheme>,
}

impl RoundInput {
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            scheme_override: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRound {
    /// Zero-based position in the submitted rounds.
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiRoundResult {
    pub rounds: Vec<EncodedScore>,
    pub aggregated: Option<EncodedScore>,
    pub skipped: Vec<SkippedRound>,
}

/// Encodes each round and collapses the valid ones into a single value.
pub fn encode_multi_round(
    rounds: &[RoundInput],
    scheme: WorkoutScheme,
    aggregation: Aggregation,
    options: &CodecOptions,
) -> MultiRoundResult {
    let mut encoded = Vec::with_capacity(rounds.len());
    let mut skipped = Vec::new();

    for (index, round) in rounds.iter().enumerate() {
        let round_scheme = round.scheme_override.unwrap_or(scheme);
        let parsed = parse_score_with(&round.raw, round_scheme, options);
        match parsed.encoded {
            Some(value) => encoded.push(value),
            None => {
                let error = parsed
                    .error
                    .unwrap_or_else(|| "Round has no numeric value".to_string());
                tracing::debug!(index, error = %error, "skipping round");
                skipped.push(SkippedRound { index, error });
            }
        }
    }

    let aggregated = aggregate_values(&encoded, aggregation);
    MultiRoundResult {
        rounds: encoded,
        aggregated,
        skipped,
    }
}

/// `None` for an empty slice. Averages round half up.
pub fn aggregate_values(values: &[EncodedScore], aggregation: Aggregation) -> Option<EncodedScore> {
    if values.is_empty() {
        return None;
    }

    match aggregation {
        Aggregation::Min => values.iter().copied().min(),
        Aggregation::Max => values.iter().copied().max(),
        Aggregation::Sum => Some(values.iter().copied().fold(0_i64, i64::saturating_add)),
        Aggregation::Average => {
            let sum: i128 = values.iter().map(|&v| i128::from(v)).sum();
            let count = values.len() as i128;
            let rounded = (2 * sum + count).div_euclid(2 * count);
            i64::try_from(rounded).ok()
        }
        Aggregation::First => values.first().copied(),
        Aggregation::Last => values.last().copied(),
    }
}

pub fn format_rounds(values: &[EncodedScore], scheme: WorkoutScheme, options: &CodecOptions) -> String {
    values
        .iter()
        .map(|&value| decode_score_with(value, scheme, options))
        .collect::<Vec<_>>()
        .join(", ")
}
