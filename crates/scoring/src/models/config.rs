use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::status::ScoreStatus;
use crate::error::{Result, ScoringError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringAlgorithm {
    #[default]
    Traditional,
    #[serde(alias = "p-score")]
    PScore,
    WinnerTakesMore,
    /// Points equal placement; the lowest total wins.
    Online,
    Custom,
}

impl ScoringAlgorithm {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Traditional => "Traditional",
            Self::PScore => "P-Score",
            Self::WinnerTakesMore => "Winner Takes More",
            Self::Online => "Online",
            Self::Custom => "Custom",
        }
    }

    /// Whether a lower point total is the better one.
    pub fn lower_total_wins(&self) -> bool {
        matches!(self, Self::Online)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TraditionalConfig {
    #[validate(range(min = 1, max = 10000, message = "First place points must be between 1 and 10000"))]
    #[serde(default = "default_first_place_points")]
    pub first_place_points: u32,

    #[validate(range(max = 1000, message = "Step must be at most 1000"))]
    #[serde(default = "default_step")]
    pub step: u32,
}

impl Default for TraditionalConfig {
    fn default() -> Self {
        Self {
            first_place_points: default_first_place_points(),
            step: default_step(),
        }
    }
}

fn default_first_place_points() -> u32 {
    100
}

fn default_step() -> u32 {
    5
}

/// Which part of the field the P-Score median is taken from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedianField {
    #[default]
    TopHalf,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PScoreConfig {
    #[serde(default = "default_allow_negatives")]
    pub allow_negatives: bool,
    #[serde(default)]
    pub median_field: MedianField,
}

impl Default for PScoreConfig {
    fn default() -> Self {
        Self {
            allow_negatives: default_allow_negatives(),
            median_field: MedianField::default(),
        }
    }
}

fn default_allow_negatives() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointsTemplate {
    Traditional,
    WinnerTakesMore,
}

/// Rank-keyed points table, optionally layered over a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomTableConfig {
    #[serde(default)]
    pub base_template: Option<PointsTemplate>,

    #[validate(custom(function = "validate_points_table"))]
    #[serde(default)]
    pub table: BTreeMap<u32, Decimal>,
}

fn validate_points_table(table: &BTreeMap<u32, Decimal>) -> std::result::Result<(), validator::ValidationError> {
    if table.contains_key(&0) {
        return Err(validator::ValidationError::new("rank_must_start_at_one"));
    }
    if table.values().any(|points| points.is_sign_negative()) {
        return Err(validator::ValidationError::new("negative_points"));
    }
    Ok(())
}

/// What a non-finishing status earns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Ranked after finishers and scored for that rank.
    LastPlace,
    /// Ranked after finishers with no points.
    Zero,
    /// Left out of the event entirely.
    Exclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHandling {
    #[serde(default = "default_dnf_policy")]
    pub dnf: StatusPolicy,
    #[serde(default = "default_dns_policy")]
    pub dns: StatusPolicy,
    #[serde(default = "default_withdrawn_policy")]
    pub withdrawn: StatusPolicy,
}

impl Default for StatusHandling {
    fn default() -> Self {
        Self {
            dnf: default_dnf_policy(),
            dns: default_dns_policy(),
            withdrawn: default_withdrawn_policy(),
        }
    }
}

impl StatusHandling {
    /// `None` for statuses that compete on value.
    pub fn policy_for(&self, status: ScoreStatus) -> Option<StatusPolicy> {
        match status {
            ScoreStatus::Scored | ScoreStatus::Capped => None,
            ScoreStatus::Dnf => Some(self.dnf),
            ScoreStatus::Dns => Some(self.dns),
            ScoreStatus::Withdrawn => Some(self.withdrawn),
        }
    }
}

fn default_dnf_policy() -> StatusPolicy {
    StatusPolicy::LastPlace
}

fn default_dns_policy() -> StatusPolicy {
    StatusPolicy::Zero
}

fn default_withdrawn_policy() -> StatusPolicy {
    StatusPolicy::Exclude
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum TiebreakerMethod {
    /// Secondary result recorded with the workout score.
    WorkoutTiebreak,
    /// Most first places, then most second places, and so on.
    Countback,
    /// Placement in one designated event.
    HeadToHead {
        #[serde(default, rename = "eventId")]
        event_id: Option<Uuid>,
    },
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    #[serde(default)]
    pub algorithm: ScoringAlgorithm,

    #[validate(nested)]
    #[serde(default)]
    pub traditional: TraditionalConfig,

    #[serde(default)]
    pub p_score: PScoreConfig,

    #[validate(nested)]
    #[serde(default)]
    pub custom: Option<CustomTableConfig>,

    /// Applied in order to every group still tied.
    #[validate(length(max = 8, message = "At most 8 tiebreakers may be configured"))]
    #[serde(default = "default_tiebreakers")]
    pub tiebreakers: Vec<TiebreakerMethod>,

    #[serde(default)]
    pub status_handling: StatusHandling,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            algorithm: ScoringAlgorithm::default(),
            traditional: TraditionalConfig::default(),
            p_score: PScoreConfig::default(),
            custom: None,
            tiebreakers: default_tiebreakers(),
            status_handling: StatusHandling::default(),
        }
    }
}

fn default_tiebreakers() -> Vec<TiebreakerMethod> {
    vec![TiebreakerMethod::WorkoutTiebreak, TiebreakerMethod::Countback]
}

impl ScoringConfig {
    pub fn with_algorithm(algorithm: ScoringAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    /// Field validation plus the rules that span several fields.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        for method in &self.tiebreakers {
            if let TiebreakerMethod::HeadToHead { event_id: None } = method {
                return Err(ScoringError::MissingTiebreakData(
                    "head_to_head tiebreaker requires an event id".to_string(),
                ));
            }
        }

        if self.algorithm == ScoringAlgorithm::Custom && self.custom.is_none() {
            return Err(ScoringError::Config(
                "custom algorithm requires a points table".to_string(),
            ));
        }

        Ok(())
    }

    pub fn can_have_negative_scores(&self) -> bool {
        self.algorithm == ScoringAlgorithm::PScore && self.p_score.allow_negatives
    }
}
