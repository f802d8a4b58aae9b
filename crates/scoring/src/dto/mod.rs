pub mod leaderboard;
pub mod rotation;

pub use leaderboard::{
    CompetitionRequest, EventLeaderboardResponse, EventRequest, PlacementRow, RawScoreEntry, StandingsResponse,
    ValidationReport,
};
pub use rotation::{CoverageRequest, CoverageResponse};
