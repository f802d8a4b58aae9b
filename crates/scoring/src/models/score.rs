use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scheme::{ScoreType, TiebreakScheme, WorkoutScheme, get_default_score_type};
use super::status::ScoreStatus;

/// The single integer persisted per competitor and event.
pub type EncodedScore = i64;

pub type CompetitorId = Uuid;
pub type EventId = Uuid;

/// Time cap of a capped workout and the reps completed before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeCap {
    pub ms: i64,
    pub secondary_value: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tiebreak {
    pub scheme: TiebreakScheme,
    pub value: i64,
}

/// A comparable result: everything needed to sort and format it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub scheme: WorkoutScheme,
    pub score_type: ScoreType,
    pub value: Option<EncodedScore>,
    #[serde(default)]
    pub status: ScoreStatus,
    #[serde(default)]
    pub time_cap: Option<TimeCap>,
    #[serde(default)]
    pub tiebreak: Option<Tiebreak>,
}

impl Score {
    pub fn new(scheme: WorkoutScheme, value: EncodedScore) -> Self {
        Self {
            scheme,
            score_type: get_default_score_type(scheme),
            value: Some(value),
            status: ScoreStatus::Scored,
            time_cap: None,
            tiebreak: None,
        }
    }

    /// A result without a value, such as a DNF or a capped time.
    pub fn with_status_only(scheme: WorkoutScheme, status: ScoreStatus) -> Self {
        Self {
            scheme,
            score_type: get_default_score_type(scheme),
            value: None,
            status,
            time_cap: None,
            tiebreak: None,
        }
    }

    pub fn with_score_type(mut self, score_type: ScoreType) -> Self {
        self.score_type = score_type;
        self
    }

    pub fn with_status(mut self, status: ScoreStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_time_cap(mut self, time_cap: TimeCap) -> Self {
        self.time_cap = Some(time_cap);
        self
    }

    pub fn with_tiebreak(mut self, tiebreak: Tiebreak) -> Self {
        self.tiebreak = Some(tiebreak);
        self
    }

    /// Reps completed before the cap, when the score was capped.
    pub fn capped_reps(&self) -> Option<i64> {
        self.time_cap.and_then(|cap| cap.secondary_value)
    }
}

/// One competitor's result for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventScoreInput {
    pub competitor_id: CompetitorId,
    pub event_id: EventId,
    /// Absent for results that carry only a status.
    pub encoded: Option<EncodedScore>,
    #[serde(default)]
    pub status: ScoreStatus,
    pub scheme: WorkoutScheme,
    pub score_type: ScoreType,
    #[serde(default)]
    pub time_cap: Option<TimeCap>,
    #[serde(default)]
    pub tiebreak: Option<Tiebreak>,
}

impl EventScoreInput {
    pub fn new(
        competitor_id: CompetitorId,
        event_id: EventId,
        scheme: WorkoutScheme,
        encoded: Option<EncodedScore>,
        status: ScoreStatus,
    ) -> Self {
        Self {
            competitor_id,
            event_id,
            encoded,
            status,
            scheme,
            score_type: get_default_score_type(scheme),
            time_cap: None,
            tiebreak: None,
        }
    }

    pub fn to_score(&self) -> Score {
        Score {
            scheme: self.scheme,
            score_type: self.score_type,
            value: self.encoded,
            status: self.status,
            time_cap: self.time_cap,
            tiebreak: self.tiebreak,
        }
    }
}

/// Result of ranking one competitor in one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub competitor_id: CompetitorId,
    pub rank: u32,
    pub points: Decimal,
    /// Rank shared after tiebreakers; unique when the competitor was separated.
    pub tie_group: u32,
    pub status: ScoreStatus,
}
