use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::error::ScoringError;

/// Measurement type of a workout.
///
/// The scheme decides which input grammar is accepted, how the value is
/// encoded into an integer and which direction is better by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "kebab-case")]
pub enum WorkoutScheme {
    Time,
    TimeWithCap,
    RoundsReps,
    Reps,
    Emom,
    Load,
    Calories,
    Meters,
    Feet,
    Points,
    PassFail,
}

impl WorkoutScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::TimeWithCap => "time-with-cap",
            Self::RoundsReps => "rounds-reps",
            Self::Reps => "reps",
            Self::Emom => "emom",
            Self::Load => "load",
            Self::Calories => "calories",
            Self::Meters => "meters",
            Self::Feet => "feet",
            Self::Points => "points",
            Self::PassFail => "pass-fail",
        }
    }

    pub fn is_time_based(&self) -> bool {
        matches!(self, Self::Time | Self::TimeWithCap)
    }
}

impl fmt::Display for WorkoutScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkoutScheme {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "time" => Ok(Self::Time),
            "time-with-cap" => Ok(Self::TimeWithCap),
            "rounds-reps" => Ok(Self::RoundsReps),
            "reps" => Ok(Self::Reps),
            "emom" => Ok(Self::Emom),
            "load" => Ok(Self::Load),
            "calories" => Ok(Self::Calories),
            "meters" => Ok(Self::Meters),
            "feet" => Ok(Self::Feet),
            "points" => Ok(Self::Points),
            "pass-fail" => Ok(Self::PassFail),
            other => Err(ScoringError::UnknownScheme(other.to_string())),
        }
    }
}

/// `min` means lower is better, `max` means higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum ScoreType {
    Min,
    Max,
}

impl ScoreType {
    pub fn direction(&self) -> SortDirection {
        match self {
            Self::Min => SortDirection::Asc,
            Self::Max => SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Scheme of the secondary result recorded to split ties within one workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiebreakScheme {
    Time,
    Reps,
}

impl TiebreakScheme {
    pub fn direction(&self) -> SortDirection {
        match self {
            Self::Time => SortDirection::Asc,
            Self::Reps => SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    #[serde(alias = "lb")]
    Lbs,
    Kg,
}

impl WeightUnit {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Lbs => "lbs",
            Self::Kg => "kg",
        }
    }
}

/// How the rounds of a multi-round workout collapse into one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Min,
    Max,
    Sum,
    Average,
    First,
    Last,
}

pub fn get_default_score_type(scheme: WorkoutScheme) -> ScoreType {
    match scheme {
        WorkoutScheme::Time | WorkoutScheme::TimeWithCap => ScoreType::Min,
        WorkoutScheme::RoundsReps
        | WorkoutScheme::Reps
        | WorkoutScheme::Emom
        | WorkoutScheme::Load
        | WorkoutScheme::Calories
        | WorkoutScheme::Meters
        | WorkoutScheme::Feet
        | WorkoutScheme::Points
        | WorkoutScheme::PassFail => ScoreType::Max,
    }
}

/// Sort direction of a workout, honoring a per-workout score type override.
pub fn get_sort_direction(scheme: WorkoutScheme, score_type: Option<ScoreType>) -> SortDirection {
    score_type
        .unwrap_or_else(|| get_default_score_type(scheme))
        .direction()
}
