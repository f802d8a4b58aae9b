use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::models::{EncodedScore, Score, ScoreStatus, SortDirection, Tiebreak, TiebreakScheme};

const STATUS_SHIFT: u32 = 60;
const VALUE_MASK: u64 = (1 << STATUS_SHIFT) - 1;
/// Reserved for results without a value: the worst key within a status.
const MISSING_VALUE: u64 = VALUE_MASK;
/// Offsets signed values into the unsigned value field.
const VALUE_BIAS: i64 = 1 << (STATUS_SHIFT - 1);
const MIN_VALUE: i64 = -VALUE_BIAS;
const MAX_VALUE: i64 = VALUE_BIAS - 2;
const SORT_KEY_WIDTH: usize = 19;

/// Database-sortable key: lower is better, across statuses and schemes.
///
/// Bits 60..63 hold the status order, the low 60 bits the value, inverted
/// for descending schemes so that ascending key order is always best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SortKey(u64);

impl SortKey {
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn status_order(&self) -> u8 {
        (self.0 >> STATUS_SHIFT) as u8
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = SORT_KEY_WIDTH)
    }
}

impl FromStr for SortKey {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(SortKey)
            .map_err(|_| ScoringError::Config(format!("Invalid sort key: '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortKeyParts {
    pub status: Option<ScoreStatus>,
    pub value: Option<EncodedScore>,
}

pub fn compute_sort_key(score: &Score) -> SortKey {
    match score.status {
        ScoreStatus::Capped if score.scheme.is_time_based() && score.capped_reps().is_some() => {
            compute_sort_key_with_direction(score.capped_reps(), score.status, SortDirection::Desc)
        }
        _ => compute_sort_key_with_direction(score.value, score.status, score.score_type.direction()),
    }
}

pub fn compute_sort_key_with_direction(
    value: Option<EncodedScore>,
    status: ScoreStatus,
    direction: SortDirection,
) -> SortKey {
    let component = match value {
        None => MISSING_VALUE,
        Some(value) => {
            let biased = (value.clamp(MIN_VALUE, MAX_VALUE) + VALUE_BIAS) as u64;
            match direction {
                SortDirection::Asc => biased,
                SortDirection::Desc => MISSING_VALUE - 1 - biased,
            }
        }
    };

    SortKey((u64::from(status.sort_order()) << STATUS_SHIFT) | component)
}

/// Zero-padded so that string order equals numeric order.
pub fn sort_key_to_string(key: SortKey) -> String {
    key.to_string()
}

pub fn extract_from_sort_key(key: SortKey, direction: SortDirection) -> SortKeyParts {
    let component = key.0 & VALUE_MASK;
    let value = if component == MISSING_VALUE {
        None
    } else {
        let biased = match direction {
            SortDirection::Asc => component,
            SortDirection::Desc => MISSING_VALUE - 1 - component,
        };
        Some(biased as i64 - VALUE_BIAS)
    };

    SortKeyParts {
        status: ScoreStatus::from_sort_order(key.status_order()),
        value,
    }
}

/// Total order over scores: sort key, then the workout tiebreak.
///
/// A recorded tiebreak beats a missing one.
pub fn compare_scores(a: &Score, b: &Score) -> Ordering {
    compute_sort_key(a)
        .cmp(&compute_sort_key(b))
        .then_with(|| tiebreak_rank(a.tiebreak).cmp(&tiebreak_rank(b.tiebreak)))
}

pub(crate) fn tiebreak_rank(tiebreak: Option<Tiebreak>) -> (u8, u8, i64) {
    match tiebreak {
        None => (1, 0, 0),
        Some(Tiebreak {
            scheme: TiebreakScheme::Time,
            value,
        }) => (0, 0, value),
        Some(Tiebreak {
            scheme: TiebreakScheme::Reps,
            value,
        }) => (0, 1, value.saturating_neg()),
    }
}

/// Stable: equal scores keep their input order.
pub fn sort_scores(scores: &mut [Score]) {
    scores.sort_by(compare_scores);
}

/// Standard competition rank of `score` within `field`.
pub fn find_rank(score: &Score, field: &[Score]) -> u32 {
    let better = field
        .iter()
        .filter(|other| compare_scores(other, score) == Ordering::Less)
        .count();
    better as u32 + 1
}
