use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Unknown workout scheme: {0}")]
    UnknownScheme(String),

    #[error("Invalid score: {0}")]
    InvalidScore(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Custom points table has no entry for rank {rank}")]
    MissingCustomPoints { rank: u32 },

    #[error("Missing tiebreaker data: {0}")]
    MissingTiebreakData(String),

    #[error("Event {event_id} mixes workout schemes")]
    MixedSchemes { event_id: Uuid },
}

pub type Result<T> = std::result::Result<T, ScoringError>;

impl ScoringError {
    /// Errors caused by competition setup rather than by a submitted score.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ScoringError::Config(_)
                | ScoringError::Validation(_)
                | ScoringError::MissingCustomPoints { .. }
                | ScoringError::MissingTiebreakData(_)
                | ScoringError::MixedSchemes { .. }
        )
    }

    pub fn is_invalid_score(&self) -> bool {
        matches!(self, ScoringError::InvalidScore(_))
    }
}
