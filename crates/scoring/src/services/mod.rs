pub mod event_points;
pub mod heat_schedule;
pub mod judge_rotation;
pub mod p_score;
pub mod points_table;
pub mod standings;
pub mod tiebreakers;

pub use event_points::{calculate_event_points, rank_points};
pub use heat_schedule::{build_heat_schedule, heats_with_lanes};
pub use judge_rotation::{calculate_coverage, expand_rotation, validate_rotation};
pub use p_score::calculate_p_scores;
pub use points_table::{
    WINNER_TAKES_MORE_TABLE, custom_points, generate_points_table, online_points, template_points,
    traditional_points, winner_takes_more_points,
};
pub use standings::{
    DivisionId, DivisionStandings, EventResult, EventScores, Standing, calculate_division_standings,
    calculate_standings,
};
pub use tiebreakers::{TiebreakerInput, TiebreakerRule, apply_tiebreakers};
