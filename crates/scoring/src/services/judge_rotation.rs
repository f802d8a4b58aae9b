use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::models::{
    ConflictType, CoverageOverlap, CoverageStats, HeatInfo, HeatLane, JudgeAssignment, JudgeRotation,
    LaneShiftPattern, OverlapJudge, RotationConflict, RotationValidation,
};

/// Lane a rotation lands on in its `offset`-th heat, before range checks.
pub fn lane_for_offset(rotation: &JudgeRotation, offset: u32, lane_count: u32) -> u32 {
    if lane_count == 0 {
        return rotation.starting_lane;
    }
    let start = i64::from(rotation.starting_lane) - 1;
    let lanes = i64::from(lane_count);
    let lane = match rotation.lane_shift_pattern {
        LaneShiftPattern::Stay => return rotation.starting_lane,
        LaneShiftPattern::ShiftRight => (start + i64::from(offset)).rem_euclid(lanes),
        LaneShiftPattern::ShiftLeft => (start - i64::from(offset)).rem_euclid(lanes),
    };
    lane as u32 + 1
}

/// Heat numbers past `u32::MAX` count as missing.
fn heat_at<'a>(by_number: &HashMap<u32, &'a HeatInfo>, rotation: &JudgeRotation, offset: u32) -> Option<&'a HeatInfo> {
    let heat_number = rotation.starting_heat.checked_add(offset)?;
    by_number.get(&heat_number).copied()
}

/// Heat and lane slots a rotation covers.
///
/// Heats missing from `heats` are skipped, as are lanes past a heat's lane count.
pub fn expand_rotation(rotation: &JudgeRotation, heats: &[HeatInfo]) -> Vec<JudgeAssignment> {
    let by_number: HashMap<u32, &HeatInfo> = heats.iter().map(|heat| (heat.heat_number, heat)).collect();

    (0..rotation.heats_count)
        .filter_map(|offset| {
            let heat = heat_at(&by_number, rotation, offset)?;
            let lane_number = lane_for_offset(rotation, offset, heat.lane_count);
            (lane_number >= 1 && lane_number <= heat.lane_count).then_some(JudgeAssignment {
                heat_number: heat.heat_number,
                lane_number,
                membership_id: rotation.membership_id,
                rotation_id: rotation.id,
            })
        })
        .collect()
}

pub fn calculate_coverage(rotations: &[JudgeRotation], heats: &[HeatInfo]) -> CoverageStats {
    let mut judges_by_slot: BTreeMap<HeatLane, Vec<OverlapJudge>> = BTreeMap::new();
    for rotation in rotations {
        for assignment in expand_rotation(rotation, heats) {
            judges_by_slot.entry(assignment.slot()).or_default().push(OverlapJudge {
                membership_id: assignment.membership_id,
                rotation_id: assignment.rotation_id,
            });
        }
    }

    let mut total_slots: u32 = 0;
    let mut covered_slots: u32 = 0;
    let mut gaps = Vec::new();
    let mut overlaps = Vec::new();

    let mut heats: Vec<&HeatInfo> = heats.iter().collect();
    heats.sort_by_key(|heat| heat.heat_number);

    for heat in heats {
        for lane_number in 1..=heat.lane_count {
            total_slots += 1;
            let slot = HeatLane {
                heat_number: heat.heat_number,
                lane_number,
            };
            match judges_by_slot.remove(&slot) {
                Some(judges) => {
                    covered_slots += 1;
                    if judges.len() > 1 {
                        overlaps.push(CoverageOverlap {
                            heat_number: slot.heat_number,
                            lane_number: slot.lane_number,
                            judges,
                        });
                    }
                }
                None => gaps.push(slot),
            }
        }
    }

    let coverage_percent = if total_slots == 0 {
        0
    } else {
        (covered_slots * 100 + total_slots / 2) / total_slots
    };

    CoverageStats {
        total_slots,
        covered_slots,
        coverage_percent,
        gaps,
        overlaps,
    }
}

/// Checks a rotation against the event's heats and the judge's other rotations.
///
/// Rotations in `others` belonging to a different judge, or sharing the
/// rotation's id, are ignored.
pub fn validate_rotation(rotation: &JudgeRotation, others: &[JudgeRotation], heats: &[HeatInfo]) -> RotationValidation {
    let mut conflicts = Vec::new();

    if heats.is_empty() {
        conflicts.push(RotationConflict {
            rotation_id: rotation.id,
            conflict_type: ConflictType::InvalidHeat,
            message: "No heats found for this event".to_string(),
            heat_number: None,
            lane_number: None,
        });
        return RotationValidation {
            conflicts,
            effective_heats_count: 0,
            requested_heats_count: rotation.heats_count,
            truncated: true,
        };
    }

    let by_number: HashMap<u32, &HeatInfo> = heats.iter().map(|heat| (heat.heat_number, heat)).collect();
    let mut effective_heats_count = 0;

    for offset in 0..rotation.heats_count {
        let Some(heat) = heat_at(&by_number, rotation, offset) else {
            continue;
        };
        let heat_number = heat.heat_number;
        effective_heats_count += 1;

        let lane_number = lane_for_offset(rotation, offset, heat.lane_count);
        if lane_number < 1 || lane_number > heat.lane_count {
            conflicts.push(RotationConflict {
                rotation_id: rotation.id,
                conflict_type: ConflictType::InvalidLane,
                message: format!(
                    "Lane {} is invalid for heat {} (max: {})",
                    lane_number, heat_number, heat.lane_count
                ),
                heat_number: Some(heat_number),
                lane_number: Some(lane_number),
            });
        }
    }

    if effective_heats_count == 0 {
        conflicts.push(RotationConflict {
            rotation_id: rotation.id,
            conflict_type: ConflictType::InvalidHeat,
            message: format!("Starting heat {} does not exist", rotation.starting_heat),
            heat_number: Some(rotation.starting_heat),
            lane_number: None,
        });
    }

    let current = expand_rotation(rotation, heats);
    let same_judge = others
        .iter()
        .filter(|other| other.membership_id == rotation.membership_id && other.id != rotation.id);
    for other in same_judge {
        for existing in expand_rotation(other, heats) {
            for assignment in current.iter().filter(|a| a.slot() == existing.slot()) {
                conflicts.push(RotationConflict {
                    rotation_id: other.id,
                    conflict_type: ConflictType::DoubleBooking,
                    message: format!(
                        "Judge is already assigned to heat {}, lane {}",
                        assignment.heat_number, assignment.lane_number
                    ),
                    heat_number: Some(assignment.heat_number),
                    lane_number: Some(assignment.lane_number),
                });
            }
        }
    }

    debug!(
        rotation_id = %rotation.id,
        conflicts = conflicts.len(),
        effective_heats_count,
        "validated judge rotation"
    );

    RotationValidation {
        conflicts,
        effective_heats_count,
        requested_heats_count: rotation.heats_count,
        truncated: effective_heats_count < rotation.heats_count,
    }
}
