pub mod config;
pub mod rotation;
pub mod scheme;
pub mod score;
pub mod status;

pub use config::{
    CustomTableConfig, MedianField, PScoreConfig, PointsTemplate, ScoringAlgorithm, ScoringConfig,
    StatusHandling, StatusPolicy, TiebreakerMethod, TraditionalConfig,
};
pub use rotation::{
    ConflictType, CoverageOverlap, CoverageStats, HeatInfo, HeatLane, HeatScheduleParams, JudgeAssignment,
    JudgeRotation, LaneShiftPattern, OverlapJudge, RotationConflict, RotationValidation,
    ScheduledHeat,
};
pub use scheme::{
    Aggregation, ScoreType, SortDirection, TiebreakScheme, WeightUnit, WorkoutScheme,
    get_default_score_type, get_sort_direction,
};
pub use score::{
    CompetitorId, EncodedScore, EventId, EventScoreInput, Placement, Score, Tiebreak, TimeCap,
};
pub use status::ScoreStatus;
