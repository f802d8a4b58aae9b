use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::event_points::calculate_event_points;
use super::tiebreakers::{TiebreakerInput, build_rules, rank_groups, resolve_group};
use crate::error::Result;
use crate::models::{CompetitorId, EventId, EventScoreInput, ScoreStatus, ScoringConfig};

pub type DivisionId = Uuid;

/// Every score of one event and the weight of the event in the standings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventScores {
    pub event_id: EventId,
    /// Percent applied to the event's points.
    #[serde(default = "default_multiplier")]
    pub multiplier: u32,
    pub scores: Vec<EventScoreInput>,
}

impl EventScores {
    pub fn new(event_id: EventId, scores: Vec<EventScoreInput>) -> Self {
        Self {
            event_id,
            multiplier: default_multiplier(),
            scores,
        }
    }
}

fn default_multiplier() -> u32 {
    100
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResult {
    pub event_id: EventId,
    pub rank: u32,
    pub tie_group: u32,
    /// Event points after the multiplier.
    pub points: Decimal,
    pub status: ScoreStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    pub competitor_id: CompetitorId,
    pub rank: u32,
    pub tie_group: u32,
    pub total_points: Decimal,
    pub event_results: Vec<EventResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionStandings {
    /// `None` for competitors without a division.
    pub division_id: Option<DivisionId>,
    pub standings: Vec<Standing>,
}

#[derive(Debug, Default)]
struct Tally {
    total: Decimal,
    results: Vec<EventResult>,
}

/// Overall leaderboard across events.
///
/// Competitors are listed in order of first appearance before sorting, so
/// ties left by the tiebreakers keep that order. A competitor without a
/// result in an event earns nothing for it, except under online scoring
/// where the absence costs the event's field size plus one.
pub fn calculate_standings(events: &[EventScores], config: &ScoringConfig) -> Result<Vec<Standing>> {
    config.check()?;
    let rules = build_rules(&config.tiebreakers)?;
    let lower_wins = config.algorithm.lower_total_wins();

    let mut order: Vec<CompetitorId> = Vec::new();
    let mut seen = HashSet::new();
    for score in events.iter().flat_map(|event| &event.scores) {
        if seen.insert(score.competitor_id) {
            order.push(score.competitor_id);
        }
    }

    let mut tallies: HashMap<CompetitorId, Tally> =
        order.iter().map(|&id| (id, Tally::default())).collect();

    for event in events {
        let factor = Decimal::from(event.multiplier) / Decimal::ONE_HUNDRED;
        let placements = calculate_event_points(&event.scores, config)?;

        let mut placed = HashSet::with_capacity(placements.len());
        for placement in placements {
            placed.insert(placement.competitor_id);
            let points = (placement.points * factor).round_dp(2);
            if let Some(tally) = tallies.get_mut(&placement.competitor_id) {
                tally.total += points;
                tally.results.push(EventResult {
                    event_id: event.event_id,
                    rank: placement.rank,
                    tie_group: placement.tie_group,
                    points,
                    status: placement.status,
                });
            }
        }

        if lower_wins {
            let penalty = (Decimal::from(event.scores.len() as u32 + 1) * factor).round_dp(2);
            for id in order.iter().filter(|id| !placed.contains(*id)) {
                if let Some(tally) = tallies.get_mut(id) {
                    tally.total += penalty;
                }
            }
        }
    }

    let mut ranked: Vec<(CompetitorId, Tally)> = order
        .into_iter()
        .filter_map(|id| tallies.remove(&id).map(|tally| (id, tally)))
        .collect();
    if lower_wins {
        ranked.sort_by(|a, b| a.1.total.cmp(&b.1.total));
    } else {
        ranked.sort_by(|a, b| b.1.total.cmp(&a.1.total));
    }

    let tiebreak_inputs: Vec<TiebreakerInput> = ranked
        .iter()
        .map(|(id, tally)| TiebreakerInput {
            competitor_id: *id,
            total_points: tally.total,
            event_placements: tally
                .results
                .iter()
                .map(|result| (result.event_id, result.tie_group))
                .collect::<BTreeMap<_, _>>(),
            tiebreak: None,
        })
        .collect();

    let mut groups: Vec<Vec<&TiebreakerInput>> = Vec::new();
    for input in &tiebreak_inputs {
        match groups.last_mut() {
            Some(last) if last.first().is_some_and(|head| head.total_points == input.total_points) => {
                last.push(input)
            }
            _ => groups.push(vec![input]),
        }
    }

    let mut results: HashMap<CompetitorId, Tally> = ranked.into_iter().collect();
    let mut standings = Vec::with_capacity(tiebreak_inputs.len());

    for (group, rank) in groups.iter().zip(rank_groups(&groups, 1)) {
        let resolved = resolve_group(group, &rules);
        for (subgroup, tie_group) in resolved.iter().zip(rank_groups(&resolved, rank)) {
            for input in subgroup {
                let event_results = results
                    .remove(&input.competitor_id)
                    .map(|tally| tally.results)
                    .unwrap_or_default();
                standings.push(Standing {
                    competitor_id: input.competitor_id,
                    rank,
                    tie_group,
                    total_points: input.total_points,
                    event_results,
                });
            }
        }
    }

    debug!(
        events = events.len(),
        competitors = standings.len(),
        algorithm = config.algorithm.display_name(),
        "calculated standings"
    );

    Ok(standings)
}

/// Standings per division, each ranked as its own field.
///
/// Competitors missing from `divisions` are ranked together under `None`.
/// Divisions are returned in id order with `None` first.
pub fn calculate_division_standings(
    events: &[EventScores],
    divisions: &HashMap<CompetitorId, DivisionId>,
    config: &ScoringConfig,
) -> Result<Vec<DivisionStandings>> {
    let mut split: BTreeMap<Option<DivisionId>, Vec<EventScores>> = BTreeMap::new();

    for score in events.iter().flat_map(|event| &event.scores) {
        split.entry(divisions.get(&score.competitor_id).copied()).or_default();
    }

    for (division_id, division_events) in split.iter_mut() {
        *division_events = events
            .iter()
            .map(|event| EventScores {
                event_id: event.event_id,
                multiplier: event.multiplier,
                scores: event
                    .scores
                    .iter()
                    .filter(|score| divisions.get(&score.competitor_id).copied() == *division_id)
                    .cloned()
                    .collect(),
            })
            .collect();
    }

    split
        .into_iter()
        .map(|(division_id, division_events)| {
            Ok(DivisionStandings {
                division_id,
                standings: calculate_standings(&division_events, config)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScoringAlgorithm, TiebreakerMethod, WorkoutScheme};

    fn event(n: u128, scheme: WorkoutScheme, results: &[(u128, i64)]) -> EventScores {
        let event_id = Uuid::from_u128(1000 + n);
        let scores = results
            .iter()
            .map(|&(competitor, value)| {
                EventScoreInput::new(
                    Uuid::from_u128(competitor),
                    event_id,
                    scheme,
                    Some(value),
                    ScoreStatus::Scored,
                )
            })
            .collect();
        EventScores::new(event_id, scores)
    }

    fn order(standings: &[Standing]) -> Vec<u128> {
        standings.iter().map(|s| s.competitor_id.as_u128()).collect()
    }

    #[test]
    fn test_totals_and_multiplier() {
        let mut heavy = event(2, WorkoutScheme::Load, &[(1, 100_000), (2, 120_000)]);
        heavy.multiplier = 200;
        let events = vec![event(1, WorkoutScheme::Time, &[(1, 300_000), (2, 360_000)]), heavy];

        let standings = calculate_standings(&events, &ScoringConfig::default()).unwrap();
        assert_eq!(order(&standings), vec![2, 1]);
        // traditional: 95 + 2 * 100 against 100 + 2 * 95
        assert_eq!(standings[0].total_points, Decimal::from(295));
        assert_eq!(standings[1].total_points, Decimal::from(290));
        assert_eq!(standings[0].event_results.len(), 2);
        assert_eq!(standings[0].event_results[1].points, Decimal::from(200));
    }

    #[test]
    fn test_missing_event_counts_zero() {
        let events = vec![
            event(1, WorkoutScheme::Reps, &[(1, 50), (2, 40)]),
            event(2, WorkoutScheme::Reps, &[(2, 40)]),
        ];
        let standings = calculate_standings(&events, &ScoringConfig::default()).unwrap();
        assert_eq!(order(&standings), vec![2, 1]);
        assert_eq!(standings[1].total_points, Decimal::from(100));
        assert_eq!(standings[1].event_results.len(), 1);
    }

    #[test]
    fn test_online_lowest_total_wins() {
        let config = ScoringConfig::with_algorithm(ScoringAlgorithm::Online);
        let events = vec![
            event(1, WorkoutScheme::Reps, &[(1, 50), (2, 40), (3, 30)]),
            event(2, WorkoutScheme::Reps, &[(1, 10), (2, 40)]),
        ];
        let standings = calculate_standings(&events, &config).unwrap();
        assert_eq!(order(&standings), vec![1, 2, 3]);
        let totals: Vec<_> = standings.iter().map(|s| s.total_points).collect();
        // competitor 3 skipped the second event: field of 2 plus one
        assert_eq!(totals, vec![Decimal::from(3), Decimal::from(3), Decimal::from(6)]);
        assert_eq!(standings[0].rank, 1);
        assert_eq!(standings[1].rank, 1);
    }

    #[test]
    fn test_countback_breaks_equal_totals() {
        let config = ScoringConfig {
            tiebreakers: vec![TiebreakerMethod::Countback],
            ..ScoringConfig::default()
        };
        // everyone totals 190; 1 and 3 each hold a first place, 2 holds none
        let events = vec![
            event(1, WorkoutScheme::Reps, &[(1, 100), (2, 90), (3, 80)]),
            event(2, WorkoutScheme::Reps, &[(3, 100), (2, 90), (1, 80)]),
        ];
        let standings = calculate_standings(&events, &config).unwrap();
        let ranks: Vec<_> = standings.iter().map(|s| (s.competitor_id.as_u128(), s.rank, s.tie_group)).collect();
        assert_eq!(ranks, vec![(1, 1, 1), (3, 1, 1), (2, 1, 3)]);
    }

    #[test]
    fn test_head_to_head_on_designated_event() {
        let decider = Uuid::from_u128(1002);
        let config = ScoringConfig {
            tiebreakers: vec![TiebreakerMethod::HeadToHead {
                event_id: Some(decider),
            }],
            ..ScoringConfig::default()
        };
        let events = vec![
            event(1, WorkoutScheme::Reps, &[(1, 100), (2, 90)]),
            event(2, WorkoutScheme::Reps, &[(2, 100), (1, 90)]),
        ];
        let standings = calculate_standings(&events, &config).unwrap();
        assert_eq!(order(&standings), vec![2, 1]);
        assert_eq!(standings[0].tie_group, 1);
        assert_eq!(standings[1].tie_group, 2);
        assert_eq!(standings[1].rank, 1);
    }

    #[test]
    fn test_divisions_rank_independently() {
        let rx = Uuid::from_u128(77);
        let scaled = Uuid::from_u128(88);
        let divisions: HashMap<_, _> = [
            (Uuid::from_u128(1), rx),
            (Uuid::from_u128(2), rx),
            (Uuid::from_u128(3), scaled),
        ]
        .into_iter()
        .collect();
        let events = vec![event(1, WorkoutScheme::Reps, &[(1, 50), (2, 60), (3, 10), (4, 5)])];

        let divisions = calculate_division_standings(&events, &divisions, &ScoringConfig::default()).unwrap();
        let ids: Vec<_> = divisions.iter().map(|d| d.division_id).collect();
        assert_eq!(ids, vec![None, Some(rx), Some(scaled)]);

        assert_eq!(order(&divisions[1].standings), vec![2, 1]);
        let scaled_winner = &divisions[2].standings[0];
        assert_eq!(scaled_winner.rank, 1);
        assert_eq!(scaled_winner.total_points, Decimal::from(100));
        assert_eq!(order(&divisions[0].standings), vec![4]);
    }

    #[test]
    fn test_no_events() {
        assert!(calculate_standings(&[], &ScoringConfig::default()).unwrap().is_empty());
    }
}
