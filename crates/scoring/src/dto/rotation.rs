use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{CoverageStats, HeatInfo, JudgeRotation, RotationValidation};

/// Judge rotations for one event and the heats they run over.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRequest {
    /// Explicit heats. When empty, `heat_count` heats of `lane_count` lanes are assumed.
    #[serde(default)]
    pub heats: Vec<HeatInfo>,

    #[validate(range(max = 200, message = "Heat count must be at most 200"))]
    #[serde(default)]
    pub heat_count: u32,

    #[validate(range(min = 1, max = 100, message = "Lane count must be between 1 and 100"))]
    #[serde(default)]
    pub lane_count: Option<u32>,

    #[validate(nested)]
    pub rotations: Vec<JudgeRotation>,
}

impl CoverageRequest {
    pub fn resolved_heats(&self, default_lane_count: u32) -> Vec<HeatInfo> {
        if !self.heats.is_empty() {
            return self.heats.clone();
        }
        let lane_count = self.lane_count.unwrap_or(default_lane_count);
        (1..=self.heat_count)
            .map(|heat_number| HeatInfo {
                heat_number,
                lane_count,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageResponse {
    pub coverage: CoverageStats,
    pub validations: Vec<RotationValidation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LaneShiftPattern;

    #[test]
    fn test_heats_default_to_uniform_lanes() {
        let request: CoverageRequest = serde_json::from_str(r#"{"heatCount": 3, "rotations": []}"#).unwrap();
        let heats = request.resolved_heats(10);
        assert_eq!(heats.len(), 3);
        assert!(heats.iter().all(|h| h.lane_count == 10));
    }

    #[test]
    fn test_rotation_reads_stored_shift_patterns() {
        let request: CoverageRequest = serde_json::from_str(
            r#"{"heatCount": 4, "laneCount": 3, "rotations": [
                {
                    "id": "00000000-0000-0000-0000-000000000001",
                    "membershipId": "00000000-0000-0000-0000-000000000002",
                    "startingHeat": 1,
                    "startingLane": 3,
                    "heatsCount": 4,
                    "laneShiftPattern": "shift_right"
                },
                {
                    "id": "00000000-0000-0000-0000-000000000003",
                    "membershipId": "00000000-0000-0000-0000-000000000004",
                    "startingHeat": 1,
                    "startingLane": 1,
                    "heatsCount": 4,
                    "laneShiftPattern": "shift_left"
                },
                {
                    "id": "00000000-0000-0000-0000-000000000005",
                    "membershipId": "00000000-0000-0000-0000-000000000006",
                    "startingHeat": 1,
                    "startingLane": 2,
                    "heatsCount": 4
                }
            ]}"#,
        )
        .unwrap();
        assert!(request.validate().is_ok());

        let patterns: Vec<_> = request.rotations.iter().map(|r| r.lane_shift_pattern).collect();
        assert_eq!(
            patterns,
            vec![LaneShiftPattern::ShiftRight, LaneShiftPattern::ShiftLeft, LaneShiftPattern::Stay]
        );

        let json = serde_json::to_value(&request.rotations[0]).unwrap();
        assert_eq!(json["laneShiftPattern"], "shift_right");
        assert!(serde_json::from_str::<LaneShiftPattern>(r#""SHIFT_RIGHT""#).is_err());
    }

    #[test]
    fn test_rotation_fields_are_validated() {
        let request: CoverageRequest = serde_json::from_str(
            r#"{"heatCount": 3, "rotations": [{
                "id": "00000000-0000-0000-0000-000000000001",
                "membershipId": "00000000-0000-0000-0000-000000000002",
                "startingHeat": 0,
                "startingLane": 1,
                "heatsCount": 2,
                "laneShiftPattern": "shift_right"
            }]}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }
}
