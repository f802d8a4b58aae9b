use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneShiftPattern {
    #[default]
    Stay,
    ShiftRight,
    ShiftLeft,
}

/// A judge covering consecutive heats of one event, starting from one lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JudgeRotation {
    pub id: Uuid,
    pub membership_id: Uuid,
    #[validate(range(min = 1))]
    pub starting_heat: u32,
    #[validate(range(min = 1))]
    pub starting_lane: u32,
    #[validate(range(min = 1, max = 100))]
    pub heats_count: u32,
    #[serde(default)]
    pub lane_shift_pattern: LaneShiftPattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatInfo {
    pub heat_number: u32,
    pub lane_count: u32,
}

/// One heat and lane a rotation puts its judge on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeAssignment {
    pub heat_number: u32,
    pub lane_number: u32,
    pub membership_id: Uuid,
    pub rotation_id: Uuid,
}

impl JudgeAssignment {
    pub fn slot(&self) -> HeatLane {
        HeatLane {
            heat_number: self.heat_number,
            lane_number: self.lane_number,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatLane {
    pub heat_number: u32,
    pub lane_number: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlapJudge {
    pub membership_id: Uuid,
    pub rotation_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageOverlap {
    pub heat_number: u32,
    pub lane_number: u32,
    pub judges: Vec<OverlapJudge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageStats {
    pub total_slots: u32,
    pub covered_slots: u32,
    pub coverage_percent: u32,
    pub gaps: Vec<HeatLane>,
    pub overlaps: Vec<CoverageOverlap>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    DoubleBooking,
    InvalidLane,
    InvalidHeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationConflict {
    /// The rotation the conflict was found against.
    pub rotation_id: Uuid,
    pub conflict_type: ConflictType,
    pub message: String,
    pub heat_number: Option<u32>,
    pub lane_number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationValidation {
    pub conflicts: Vec<RotationConflict>,
    /// Heats that exist in the requested range.
    pub effective_heats_count: u32,
    pub requested_heats_count: u32,
    pub truncated: bool,
}

impl RotationValidation {
    pub fn is_valid(&self) -> bool {
        self.conflicts.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HeatScheduleParams {
    #[validate(range(min = 1))]
    #[serde(default = "default_first_heat_number")]
    pub first_heat_number: u32,

    #[validate(range(min = 1, max = 200, message = "Heat count must be between 1 and 200"))]
    pub heat_count: u32,

    #[validate(range(min = 1, max = 180, message = "Duration must be between 1 and 180 minutes"))]
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: u32,

    #[validate(range(max = 120, message = "Transition must be at most 120 minutes"))]
    #[serde(default = "default_transition_minutes")]
    pub transition_minutes: u32,
}

impl HeatScheduleParams {
    pub fn new(heat_count: u32) -> Self {
        Self {
            first_heat_number: default_first_heat_number(),
            heat_count,
            duration_minutes: default_duration_minutes(),
            transition_minutes: default_transition_minutes(),
        }
    }
}

fn default_first_heat_number() -> u32 {
    1
}

fn default_duration_minutes() -> u32 {
    10
}

fn default_transition_minutes() -> u32 {
    3
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledHeat {
    pub heat_number: u32,
    pub scheduled_time: NaiveDateTime,
    pub duration_minutes: u32,
}
