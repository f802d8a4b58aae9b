use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use tracing::debug;

use super::p_score::calculate_p_scores;
use super::points_table::{custom_points, online_points, traditional_points, winner_takes_more_points};
use super::tiebreakers::{TiebreakerInput, build_rules, rank_groups, resolve_group};
use crate::codec::{SortKey, compute_sort_key};
use crate::error::{Result, ScoringError};
use crate::models::{
    CompetitorId, EncodedScore, EventScoreInput, Placement, ScoreStatus, ScoringAlgorithm, ScoringConfig,
    SortDirection, StatusPolicy,
};

/// Ranks one event and awards points.
///
/// Scored and capped results are ranked by sort key with standard competition
/// ranking (1, 1, 3). Competitors sharing a rank are split by the configured
/// tiebreakers into `tie_group`s; points always follow the shared rank.
/// Non-finishers come after every finisher, one rank each, and earn what
/// their status policy gives them. Placements are ordered by rank then
/// `tie_group`.
pub fn calculate_event_points(inputs: &[EventScoreInput], config: &ScoringConfig) -> Result<Vec<Placement>> {
    config.check()?;

    let Some(first) = inputs.first() else {
        return Ok(Vec::new());
    };
    if inputs.iter().any(|input| input.scheme != first.scheme) {
        return Err(ScoringError::MixedSchemes {
            event_id: first.event_id,
        });
    }

    let rules = build_rules(&config.tiebreakers)?;
    let (active, inactive): (Vec<&EventScoreInput>, Vec<&EventScoreInput>) =
        inputs.iter().partition(|input| input.status.is_active());

    let groups = group_by_sort_key(&active);
    let ranks = rank_groups(&groups, 1);
    let points = group_points(&groups, &ranks, config)?;

    let mut placements = Vec::with_capacity(inputs.len());

    for ((group, &rank), &points) in groups.iter().zip(&ranks).zip(&points) {
        let statuses: HashMap<CompetitorId, ScoreStatus> =
            group.iter().map(|input| (input.competitor_id, input.status)).collect();
        let tied: Vec<TiebreakerInput> = group
            .iter()
            .map(|input| TiebreakerInput {
                competitor_id: input.competitor_id,
                total_points: points,
                event_placements: BTreeMap::new(),
                tiebreak: input.tiebreak,
            })
            .collect();
        let tied: Vec<&TiebreakerInput> = tied.iter().collect();

        let resolved = resolve_group(&tied, &rules);
        for (subgroup, tie_group) in resolved.iter().zip(rank_groups(&resolved, rank)) {
            for input in subgroup {
                placements.push(Placement {
                    competitor_id: input.competitor_id,
                    rank,
                    points,
                    tie_group,
                    status: statuses.get(&input.competitor_id).copied().unwrap_or_default(),
                });
            }
        }
    }

    let lowest_finisher_points = placements.iter().map(|p| p.points).min();
    let field_size = inputs.len() as u32;

    let mut stragglers = inactive;
    stragglers.sort_by_key(|input| input.status.sort_order());

    let mut last_rank = placements.len() as u32;
    for input in stragglers {
        let Some(policy) = config.status_handling.policy_for(input.status) else {
            continue;
        };
        let rank = last_rank + 1;
        let points = match policy {
            StatusPolicy::Exclude => continue,
            StatusPolicy::Zero if config.algorithm == ScoringAlgorithm::Online => Decimal::from(field_size + 1),
            StatusPolicy::Zero => Decimal::ZERO,
            StatusPolicy::LastPlace if config.algorithm == ScoringAlgorithm::PScore => {
                lowest_finisher_points.unwrap_or(Decimal::ZERO)
            }
            StatusPolicy::LastPlace => rank_points(rank, config)?,
        };
        last_rank = rank;

        placements.push(Placement {
            competitor_id: input.competitor_id,
            rank,
            points,
            tie_group: rank,
            status: input.status,
        });
    }

    debug!(
        event_id = %first.event_id,
        algorithm = config.algorithm.display_name(),
        competitors = inputs.len(),
        placed = placements.len(),
        "calculated event points"
    );

    Ok(placements)
}

/// Points earned for a rank under a rank-based algorithm.
pub fn rank_points(rank: u32, config: &ScoringConfig) -> Result<Decimal> {
    match config.algorithm {
        ScoringAlgorithm::Traditional => Ok(traditional_points(rank, &config.traditional)),
        ScoringAlgorithm::WinnerTakesMore => Ok(winner_takes_more_points(rank)),
        ScoringAlgorithm::Online => Ok(online_points(rank)),
        ScoringAlgorithm::Custom => {
            let custom = config
                .custom
                .as_ref()
                .ok_or_else(|| ScoringError::Config("custom algorithm requires a points table".to_string()))?;
            custom_points(rank, custom, &config.traditional)
        }
        ScoringAlgorithm::PScore => Err(ScoringError::Config(
            "p-score points depend on performance, not rank".to_string(),
        )),
    }
}

/// Stable sort by key, then runs of equal keys.
fn group_by_sort_key<'a>(active: &[&'a EventScoreInput]) -> Vec<Vec<&'a EventScoreInput>> {
    let mut keyed: Vec<(SortKey, &'a EventScoreInput)> = active
        .iter()
        .map(|&input| (compute_sort_key(&input.to_score()), input))
        .collect();
    keyed.sort_by_key(|(key, _)| *key);

    let mut groups: Vec<Vec<&'a EventScoreInput>> = Vec::new();
    let mut previous = None;
    for (key, input) in keyed {
        match groups.last_mut() {
            Some(last) if previous == Some(key) => last.push(input),
            _ => groups.push(vec![input]),
        }
        previous = Some(key);
    }
    groups
}

fn group_points(groups: &[Vec<&EventScoreInput>], ranks: &[u32], config: &ScoringConfig) -> Result<Vec<Decimal>> {
    if config.algorithm == ScoringAlgorithm::PScore {
        return Ok(p_score_group_points(groups, config));
    }
    ranks.iter().map(|&rank| rank_points(rank, config)).collect()
}

/// P-Score of each group's first member, computed over the whole field.
fn p_score_group_points(groups: &[Vec<&EventScoreInput>], config: &ScoringConfig) -> Vec<Decimal> {
    let members: Vec<&EventScoreInput> = groups.iter().flatten().copied().collect();
    let Some(direction) = members.first().map(|input| input.score_type.direction()) else {
        return Vec::new();
    };

    let worst = worst_finishing_value(&members, direction);
    let values: Option<Vec<EncodedScore>> = members
        .iter()
        .map(|input| performance_value(input, worst))
        .collect();
    let Some(values) = values else {
        return vec![Decimal::ZERO; groups.len()];
    };

    let scores = calculate_p_scores(&values, direction, &config.p_score);
    let mut offset = 0;
    groups
        .iter()
        .map(|group| {
            let points = scores.get(offset).copied().unwrap_or(Decimal::ZERO);
            offset += group.len();
            points
        })
        .collect()
}

fn worst_finishing_value(members: &[&EventScoreInput], direction: SortDirection) -> Option<EncodedScore> {
    let finished = members
        .iter()
        .filter(|input| input.status == ScoreStatus::Scored)
        .filter_map(|input| input.encoded);
    match direction {
        SortDirection::Asc => finished.max(),
        SortDirection::Desc => finished.min(),
    }
}

/// Capped competitors are measured at the cap.
fn performance_value(input: &EventScoreInput, worst: Option<EncodedScore>) -> Option<EncodedScore> {
    match input.status {
        ScoreStatus::Capped => input.time_cap.map(|cap| cap.ms).or(input.encoded).or(worst),
        _ => input.encoded.or(worst),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CustomTableConfig, StatusHandling, Tiebreak, TiebreakScheme, TimeCap, WorkoutScheme,
    };
    use strum::IntoEnumIterator;
    use uuid::Uuid;

    const EVENT: Uuid = Uuid::from_u128(500);

    fn scored(n: u128, scheme: WorkoutScheme, value: i64) -> EventScoreInput {
        EventScoreInput::new(Uuid::from_u128(n), EVENT, scheme, Some(value), ScoreStatus::Scored)
    }

    fn with_status(n: u128, scheme: WorkoutScheme, status: ScoreStatus) -> EventScoreInput {
        EventScoreInput::new(Uuid::from_u128(n), EVENT, scheme, None, status)
    }

    fn ids(placements: &[Placement]) -> Vec<u128> {
        placements.iter().map(|p| p.competitor_id.as_u128()).collect()
    }

    fn ranks(placements: &[Placement]) -> Vec<u32> {
        placements.iter().map(|p| p.rank).collect()
    }

    #[test]
    fn test_empty_event() {
        let placements = calculate_event_points(&[], &ScoringConfig::default()).unwrap();
        assert!(placements.is_empty());
    }

    #[test]
    fn test_equal_times_share_rank_and_next_rank_skips() {
        let inputs = vec![
            scored(1, WorkoutScheme::Time, 600_000),
            scored(2, WorkoutScheme::Time, 650_000),
            scored(3, WorkoutScheme::Time, 600_000),
        ];
        let placements = calculate_event_points(&inputs, &ScoringConfig::default()).unwrap();
        assert_eq!(ids(&placements), vec![1, 3, 2]);
        assert_eq!(ranks(&placements), vec![1, 1, 3]);
        let points: Vec<_> = placements.iter().map(|p| p.points).collect();
        assert_eq!(points, vec![Decimal::from(100), Decimal::from(100), Decimal::from(90)]);
    }

    #[test]
    fn test_all_dns_field_ranks_in_input_order_with_zero_points() {
        let inputs: Vec<_> = (1..=5)
            .map(|n| with_status(n, WorkoutScheme::Reps, ScoreStatus::Dns))
            .collect();
        let placements = calculate_event_points(&inputs, &ScoringConfig::default()).unwrap();
        assert_eq!(ids(&placements), vec![1, 2, 3, 4, 5]);
        assert_eq!(ranks(&placements), vec![1, 2, 3, 4, 5]);
        assert!(placements.iter().all(|p| p.points == Decimal::ZERO));
    }

    #[test]
    fn test_p_score_with_zero_best_gives_zero_points() {
        let config = ScoringConfig::with_algorithm(ScoringAlgorithm::PScore);
        let inputs: Vec<_> = (1..=4).map(|n| scored(n, WorkoutScheme::Reps, 0)).collect();
        let placements = calculate_event_points(&inputs, &config).unwrap();
        assert_eq!(placements.len(), 4);
        assert!(placements.iter().all(|p| p.points == Decimal::ZERO));
    }

    #[test]
    fn test_p_score_points_follow_performance() {
        let config = ScoringConfig::with_algorithm(ScoringAlgorithm::PScore);
        let inputs = vec![
            scored(1, WorkoutScheme::Time, 480_000),
            scored(2, WorkoutScheme::Time, 300_000),
            scored(3, WorkoutScheme::Time, 360_000),
            scored(4, WorkoutScheme::Time, 420_000),
        ];
        let placements = calculate_event_points(&inputs, &config).unwrap();
        assert_eq!(ids(&placements), vec![2, 3, 4, 1]);
        let points: Vec<_> = placements.iter().map(|p| p.points).collect();
        assert_eq!(
            points,
            vec![Decimal::ONE_HUNDRED, Decimal::from(50), Decimal::ZERO, Decimal::from(-50)]
        );
    }

    #[test]
    fn test_p_score_capped_measured_at_cap_and_dnf_takes_lowest() {
        let config = ScoringConfig::with_algorithm(ScoringAlgorithm::PScore);
        let mut capped = with_status(3, WorkoutScheme::TimeWithCap, ScoreStatus::Capped);
        capped.time_cap = Some(TimeCap {
            ms: 900_000,
            secondary_value: Some(120),
        });
        let inputs = vec![
            scored(1, WorkoutScheme::TimeWithCap, 600_000),
            scored(2, WorkoutScheme::TimeWithCap, 700_000),
            capped,
            with_status(4, WorkoutScheme::TimeWithCap, ScoreStatus::Dnf),
        ];
        let placements = calculate_event_points(&inputs, &config).unwrap();
        assert_eq!(ids(&placements), vec![1, 2, 3, 4]);
        // median of the top half is 700_000: the cap is 300_000 behind the best
        assert_eq!(placements[2].points, Decimal::from(-50));
        assert_eq!(placements[3].points, Decimal::from(-50));
    }

    #[test]
    fn test_finishers_always_outrank_non_finishers() {
        let handling = StatusHandling {
            dnf: StatusPolicy::LastPlace,
            dns: StatusPolicy::LastPlace,
            withdrawn: StatusPolicy::LastPlace,
        };
        for scheme in WorkoutScheme::iter() {
            let mut inputs = Vec::new();
            for (n, status) in ScoreStatus::iter().filter(|s| !s.is_active()).enumerate() {
                let mut input = with_status(n as u128 + 10, scheme, status);
                input.encoded = Some(0);
                inputs.push(input);
            }
            inputs.push(scored(1, scheme, 1));
            inputs.push(scored(2, scheme, 999_999));

            let config = ScoringConfig {
                status_handling: handling,
                ..ScoringConfig::default()
            };
            let placements = calculate_event_points(&inputs, &config).unwrap();
            let statuses: Vec<_> = placements.iter().map(|p| p.status.is_active()).collect();
            assert_eq!(statuses, vec![true, true, false, false, false], "{scheme}");
            assert!(placements.windows(2).all(|w| w[0].rank <= w[1].rank));
        }
    }

    #[test]
    fn test_default_status_policies() {
        let inputs = vec![
            with_status(1, WorkoutScheme::Reps, ScoreStatus::Withdrawn),
            with_status(2, WorkoutScheme::Reps, ScoreStatus::Dns),
            scored(3, WorkoutScheme::Reps, 100),
            with_status(4, WorkoutScheme::Reps, ScoreStatus::Dnf),
        ];
        let placements = calculate_event_points(&inputs, &ScoringConfig::default()).unwrap();
        assert_eq!(ids(&placements), vec![3, 4, 2]);
        assert_eq!(ranks(&placements), vec![1, 2, 3]);
        assert_eq!(placements[1].points, Decimal::from(95));
        assert_eq!(placements[2].points, Decimal::ZERO);
    }

    #[test]
    fn test_online_zero_policy_is_worse_than_any_rank() {
        let config = ScoringConfig::with_algorithm(ScoringAlgorithm::Online);
        let inputs = vec![
            scored(1, WorkoutScheme::Reps, 100),
            scored(2, WorkoutScheme::Reps, 90),
            with_status(3, WorkoutScheme::Reps, ScoreStatus::Dns),
        ];
        let placements = calculate_event_points(&inputs, &config).unwrap();
        let points: Vec<_> = placements.iter().map(|p| p.points).collect();
        assert_eq!(points, vec![Decimal::ONE, Decimal::TWO, Decimal::from(4)]);
    }

    #[test]
    fn test_workout_tiebreak_splits_tie_group_but_not_rank() {
        let mut fast = scored(1, WorkoutScheme::RoundsReps, 500_012);
        fast.tiebreak = Some(Tiebreak {
            scheme: TiebreakScheme::Time,
            value: 480_000,
        });
        let mut slow = scored(2, WorkoutScheme::RoundsReps, 500_012);
        slow.tiebreak = Some(Tiebreak {
            scheme: TiebreakScheme::Time,
            value: 510_000,
        });
        let third = scored(3, WorkoutScheme::RoundsReps, 400_000);

        let placements = calculate_event_points(&[slow, third, fast], &ScoringConfig::default()).unwrap();
        assert_eq!(ids(&placements), vec![1, 2, 3]);
        assert_eq!(ranks(&placements), vec![1, 1, 3]);
        let tie_groups: Vec<_> = placements.iter().map(|p| p.tie_group).collect();
        assert_eq!(tie_groups, vec![1, 2, 3]);
        assert_eq!(placements[0].points, placements[1].points);
    }

    #[test]
    fn test_unresolved_ties_keep_shared_tie_group() {
        let config = ScoringConfig {
            tiebreakers: vec![],
            ..ScoringConfig::default()
        };
        let inputs = vec![scored(1, WorkoutScheme::Reps, 50), scored(2, WorkoutScheme::Reps, 50)];
        let placements = calculate_event_points(&inputs, &config).unwrap();
        assert!(placements.iter().all(|p| p.rank == 1 && p.tie_group == 1));
    }

    #[test]
    fn test_custom_table_must_cover_ranks() {
        let mut table = BTreeMap::new();
        table.insert(1, Decimal::from(50));
        let config = ScoringConfig {
            algorithm: ScoringAlgorithm::Custom,
            custom: Some(CustomTableConfig {
                base_template: None,
                table,
            }),
            ..ScoringConfig::default()
        };
        let inputs = vec![scored(1, WorkoutScheme::Reps, 50), scored(2, WorkoutScheme::Reps, 40)];
        let err = calculate_event_points(&inputs, &config).unwrap_err();
        assert!(matches!(err, ScoringError::MissingCustomPoints { rank: 2 }));
    }

    #[test]
    fn test_mixed_schemes_rejected() {
        let inputs = vec![scored(1, WorkoutScheme::Reps, 50), scored(2, WorkoutScheme::Time, 40)];
        let err = calculate_event_points(&inputs, &ScoringConfig::default()).unwrap_err();
        assert!(matches!(err, ScoringError::MixedSchemes { event_id } if event_id == EVENT));
    }

    #[test]
    fn test_inputs_unchanged_and_result_deterministic() {
        let inputs = vec![
            scored(1, WorkoutScheme::Load, 100_000),
            scored(2, WorkoutScheme::Load, 120_000),
            with_status(3, WorkoutScheme::Load, ScoreStatus::Dnf),
        ];
        let snapshot = inputs.clone();
        let first = calculate_event_points(&inputs, &ScoringConfig::default()).unwrap();
        let second = calculate_event_points(&inputs, &ScoringConfig::default()).unwrap();
        assert_eq!(first, second);
        assert_eq!(inputs, snapshot);
    }
}
