use chrono::{NaiveDateTime, TimeDelta};
use validator::Validate;

use crate::error::{Result, ScoringError};
use crate::models::{HeatInfo, HeatScheduleParams, ScheduledHeat};

/// Back-to-back heats: each starts one duration plus one transition after the previous.
pub fn build_heat_schedule(start: NaiveDateTime, params: &HeatScheduleParams) -> Result<Vec<ScheduledHeat>> {
    params.validate()?;

    let spacing = i64::from(params.duration_minutes + params.transition_minutes);

    (0..params.heat_count)
        .map(|index| {
            let scheduled_time = TimeDelta::try_minutes(i64::from(index) * spacing)
                .and_then(|offset| start.checked_add_signed(offset))
                .ok_or_else(|| ScoringError::Config(format!("Heat {} starts out of range", index + 1)))?;
            Ok(ScheduledHeat {
                heat_number: params.first_heat_number + index,
                scheduled_time,
                duration_minutes: params.duration_minutes,
            })
        })
        .collect()
}

pub fn heats_with_lanes(schedule: &[ScheduledHeat], lane_count: u32) -> Vec<HeatInfo> {
    schedule
        .iter()
        .map(|heat| HeatInfo {
            heat_number: heat.heat_number,
            lane_count,
        })
        .collect()
}
