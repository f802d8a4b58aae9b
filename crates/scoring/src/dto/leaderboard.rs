use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::codec::{CodecOptions, format_score, parse_score_with, parse_tiebreak};
use crate::models::{
    CompetitorId, EventId, EventScoreInput, Placement, ScoreStatus, ScoreType, ScoringConfig, Tiebreak,
    TiebreakScheme, TimeCap, WorkoutScheme, get_default_score_type,
};
use crate::services::{DivisionStandings, EventScores};

/// A score as entered, before it goes through the codec.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScoreEntry {
    pub competitor_id: CompetitorId,
    #[serde(default)]
    pub raw: String,
    /// Overrides the status parsed from `raw`.
    #[serde(default)]
    pub status: Option<ScoreStatus>,
    /// Reps completed when capped.
    #[serde(default)]
    pub capped_reps: Option<i64>,
    #[serde(default)]
    pub tiebreak: Option<String>,
    #[serde(default)]
    pub division_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    pub event_id: EventId,

    #[validate(length(min = 1, max = 255, message = "Event name must be between 1 and 255 characters"))]
    pub name: String,

    pub scheme: WorkoutScheme,

    #[serde(default)]
    pub score_type: Option<ScoreType>,

    #[serde(default)]
    pub options: CodecOptions,

    #[serde(default)]
    pub tiebreak_scheme: Option<TiebreakScheme>,

    #[validate(range(min = 1, message = "Time cap must be positive"))]
    #[serde(default)]
    pub time_cap_ms: Option<i64>,

    #[validate(range(min = 1, max = 1000, message = "Multiplier must be between 1 and 1000 percent"))]
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,

    #[serde(default)]
    pub scores: Vec<RawScoreEntry>,
}

fn default_multiplier() -> u32 {
    100
}

impl EventRequest {
    pub fn score_type(&self) -> ScoreType {
        self.score_type.unwrap_or_else(|| get_default_score_type(self.scheme))
    }

    /// Runs every entry through the codec. Entries that fail to parse are
    /// reported as warnings and left out.
    pub fn to_inputs(&self, report: &mut ValidationReport) -> Vec<EventScoreInput> {
        self.scores
            .iter()
            .filter_map(|entry| match self.to_input(entry) {
                Ok(input) => Some(input),
                Err(message) => {
                    report.warnings.push(format!(
                        "Event '{}': skipped score for competitor {}: {}",
                        self.name, entry.competitor_id, message
                    ));
                    None
                }
            })
            .collect()
    }

    fn to_input(&self, entry: &RawScoreEntry) -> Result<EventScoreInput, String> {
        let blank = entry.raw.trim().is_empty();
        let forced = entry
            .status
            .filter(|&status| !status.is_active() || (status == ScoreStatus::Capped && blank));

        let (encoded, status) = match forced {
            Some(status) => (None, status),
            None => {
                let parsed = parse_score_with(&entry.raw, self.scheme, &self.options);
                if !parsed.is_valid {
                    return Err(parsed.error.unwrap_or_else(|| "Invalid score".to_string()));
                }
                let status = entry.status.or(parsed.status).unwrap_or_default();
                (parsed.encoded, status)
            }
        };

        let mut input = EventScoreInput::new(entry.competitor_id, self.event_id, self.scheme, encoded, status);
        input.score_type = self.score_type();

        if status == ScoreStatus::Capped
            && let Some(ms) = self.time_cap_ms
        {
            input.time_cap = Some(TimeCap {
                ms,
                secondary_value: entry.capped_reps,
            });
        }

        if let Some(raw) = entry.tiebreak.as_deref().filter(|raw| !raw.trim().is_empty()) {
            let scheme = self.tiebreak_scheme.unwrap_or(TiebreakScheme::Time);
            let parsed = parse_tiebreak(raw, scheme);
            match parsed.encoded {
                Some(value) => input.tiebreak = Some(Tiebreak { scheme, value }),
                None => {
                    return Err(format!(
                        "invalid tiebreak: {}",
                        parsed.error.unwrap_or_else(|| raw.to_string())
                    ));
                }
            }
        }

        Ok(input)
    }
}

/// Everything needed to rank a competition in one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionRequest {
    #[serde(default)]
    pub config: ScoringConfig,
    pub events: Vec<EventRequest>,
}

impl CompetitionRequest {
    /// Structural problems are errors; doubtful but usable input is a warning.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        if let Err(err) = self.config.check() {
            report.errors.push(format!("Scoring config: {}", err));
        }

        if self.events.is_empty() {
            report.errors.push("At least one event is required".to_string());
        }

        let mut event_ids = HashSet::new();
        for event in &self.events {
            if let Err(err) = event.validate() {
                report.errors.push(format!("Event '{}': {}", event.name, err));
            }
            if !event_ids.insert(event.event_id) {
                report.errors.push(format!("Duplicate event id {}", event.event_id));
            }

            if event.scores.is_empty() {
                report.warnings.push(format!("Event '{}' has no scores", event.name));
            }

            let mut competitors = HashSet::new();
            for entry in &event.scores {
                if !competitors.insert(entry.competitor_id) {
                    report.errors.push(format!(
                        "Event '{}': competitor {} has more than one score",
                        event.name, entry.competitor_id
                    ));
                }
            }
        }

        report
    }

    pub fn to_event_scores(&self, report: &mut ValidationReport) -> Vec<EventScores> {
        self.events
            .iter()
            .map(|event| EventScores {
                event_id: event.event_id,
                multiplier: event.multiplier,
                scores: event.to_inputs(report),
            })
            .collect()
    }

    /// Division of each competitor, taken from the first entry that names one.
    pub fn divisions(&self) -> HashMap<CompetitorId, Uuid> {
        let mut divisions = HashMap::new();
        for entry in self.events.iter().flat_map(|event| &event.scores) {
            if let Some(division_id) = entry.division_id {
                divisions.entry(entry.competitor_id).or_insert(division_id);
            }
        }
        divisions
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{}", warning);
        }
    }
}

/// One row of an event leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementRow {
    pub competitor_id: CompetitorId,
    pub rank: u32,
    pub tie_group: u32,
    pub points: Decimal,
    pub status: ScoreStatus,
    pub display: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLeaderboardResponse {
    pub event_id: EventId,
    pub name: String,
    pub rows: Vec<PlacementRow>,
}

impl EventLeaderboardResponse {
    pub fn new(event: &EventRequest, inputs: &[EventScoreInput], placements: Vec<Placement>) -> Self {
        let by_competitor: HashMap<CompetitorId, &EventScoreInput> =
            inputs.iter().map(|input| (input.competitor_id, input)).collect();

        let rows = placements
            .into_iter()
            .map(|placement| PlacementRow {
                display: by_competitor
                    .get(&placement.competitor_id)
                    .map(|input| format_score(&input.to_score()))
                    .unwrap_or_default(),
                competitor_id: placement.competitor_id,
                rank: placement.rank,
                tie_group: placement.tie_group,
                points: placement.points,
                status: placement.status,
            })
            .collect();

        Self {
            event_id: event.event_id,
            name: event.name.clone(),
            rows,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsResponse {
    pub algorithm: String,
    pub divisions: Vec<DivisionStandings>,
    pub warnings: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> CompetitionRequest {
        serde_json::from_str(json).unwrap()
    }

    const FRAN: &str = r#"{
        "events": [{
            "eventId": "00000000-0000-0000-0000-000000000001",
            "name": "Fran",
            "scheme": "time-with-cap",
            "timeCapMs": 600000,
            "tiebreakScheme": "reps",
            "scores": [
                {"competitorId": "00000000-0000-0000-0000-00000000000a", "raw": "4:12"},
                {"competitorId": "00000000-0000-0000-0000-00000000000b", "raw": "cap", "cappedReps": 71},
                {"competitorId": "00000000-0000-0000-0000-00000000000c", "raw": "banana"},
                {"competitorId": "00000000-0000-0000-0000-00000000000d", "raw": "", "status": "dns"},
                {"competitorId": "00000000-0000-0000-0000-00000000000e", "raw": "3:59", "tiebreak": "30"}
            ]
        }]
    }"#;

    #[test]
    fn test_invalid_scores_become_warnings() {
        let request = request(FRAN);
        let report = request.validate();
        assert!(report.is_valid(), "{:?}", report.errors);

        let mut report = ValidationReport::default();
        let inputs = request.events[0].to_inputs(&mut report);
        assert_eq!(inputs.len(), 4);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Fran"));
    }

    #[test]
    fn test_entries_carry_status_cap_and_tiebreak() {
        let request = request(FRAN);
        let mut report = ValidationReport::default();
        let inputs = request.events[0].to_inputs(&mut report);

        assert_eq!(inputs[0].encoded, Some(252_000));
        assert_eq!(inputs[1].status, ScoreStatus::Capped);
        assert_eq!(
            inputs[1].time_cap,
            Some(TimeCap {
                ms: 600_000,
                secondary_value: Some(71)
            })
        );
        assert_eq!(inputs[2].status, ScoreStatus::Dns);
        assert_eq!(
            inputs[3].tiebreak,
            Some(Tiebreak {
                scheme: TiebreakScheme::Reps,
                value: 30
            })
        );
    }

    #[test]
    fn test_structural_errors() {
        let request = request(
            r#"{
            "config": {"tiebreakers": [{"method": "head_to_head"}]},
            "events": [{
                "eventId": "00000000-0000-0000-0000-000000000001",
                "name": "",
                "scheme": "reps",
                "multiplier": 0,
                "scores": [
                    {"competitorId": "00000000-0000-0000-0000-00000000000a", "raw": "10"},
                    {"competitorId": "00000000-0000-0000-0000-00000000000a", "raw": "12"}
                ]
            }]
        }"#,
        );
        let report = request.validate();
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 3);
    }

    #[test]
    fn test_empty_competition_is_an_error() {
        let report = request(r#"{"events": []}"#).validate();
        assert_eq!(report.errors, vec!["At least one event is required".to_string()]);
    }

    #[test]
    fn test_divisions_from_entries() {
        let request = request(
            r#"{"events": [{
                "eventId": "00000000-0000-0000-0000-000000000001",
                "name": "Grace",
                "scheme": "time",
                "scores": [
                    {"competitorId": "00000000-0000-0000-0000-00000000000a", "raw": "2:30",
                     "divisionId": "00000000-0000-0000-0000-000000000077"},
                    {"competitorId": "00000000-0000-0000-0000-00000000000b", "raw": "2:45"}
                ]
            }]}"#,
        );
        let divisions = request.divisions();
        assert_eq!(divisions.len(), 1);
        assert_eq!(divisions[&Uuid::from_u128(0xa)], Uuid::from_u128(0x77));
    }

    #[test]
    fn test_event_response_formats_scores() {
        let request = request(FRAN);
        let mut report = ValidationReport::default();
        let inputs = request.events[0].to_inputs(&mut report);
        let placements = crate::services::calculate_event_points(&inputs, &request.config).unwrap();
        let response = EventLeaderboardResponse::new(&request.events[0], &inputs, placements);

        let displays: Vec<_> = response.rows.iter().map(|row| row.display.as_str()).collect();
        assert_eq!(displays, vec!["3:59", "4:12", "CAP (71 reps)", "—"]);
    }
}
