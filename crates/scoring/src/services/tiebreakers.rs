use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codec::sort_key::tiebreak_rank;
use crate::error::{Result, ScoringError};
use crate::models::{CompetitorId, EventId, Tiebreak, TiebreakerMethod};

/// What the tiebreaker rules know about one tied competitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TiebreakerInput {
    pub competitor_id: CompetitorId,
    pub total_points: Decimal,
    /// Rank in each event the competitor placed in.
    #[serde(default)]
    pub event_placements: BTreeMap<EventId, u32>,
    /// Secondary result recorded with a single workout score.
    #[serde(default)]
    pub tiebreak: Option<Tiebreak>,
}

impl TiebreakerInput {
    pub fn new(competitor_id: CompetitorId, total_points: Decimal) -> Self {
        Self {
            competitor_id,
            total_points,
            event_placements: BTreeMap::new(),
            tiebreak: None,
        }
    }
}

/// Splits a tied group into an ordered list of groups that remain tied.
///
/// Rules must be deterministic and keep the input order within each
/// returned group. A rule with nothing to compare returns the group whole.
pub trait TiebreakerRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve<'a>(&self, group: &[&'a TiebreakerInput]) -> Vec<Vec<&'a TiebreakerInput>>;
}

pub struct WorkoutTiebreak;

impl TiebreakerRule for WorkoutTiebreak {
    fn name(&self) -> &'static str {
        "workout_tiebreak"
    }

    fn resolve<'a>(&self, group: &[&'a TiebreakerInput]) -> Vec<Vec<&'a TiebreakerInput>> {
        split_by_key(group, |input| tiebreak_rank(input.tiebreak))
    }
}

pub struct Countback;

impl TiebreakerRule for Countback {
    fn name(&self) -> &'static str {
        "countback"
    }

    fn resolve<'a>(&self, group: &[&'a TiebreakerInput]) -> Vec<Vec<&'a TiebreakerInput>> {
        let deepest = group
            .iter()
            .flat_map(|input| input.event_placements.values().copied())
            .max()
            .unwrap_or(0);

        split_by_key(group, |input| {
            let mut counts = vec![0_usize; deepest as usize];
            for &rank in input.event_placements.values() {
                if let Some(slot) = rank.checked_sub(1).and_then(|i| counts.get_mut(i as usize)) {
                    *slot += 1;
                }
            }
            counts.into_iter().map(Reverse).collect::<Vec<_>>()
        })
    }
}

pub struct HeadToHead {
    pub event_id: EventId,
}

impl TiebreakerRule for HeadToHead {
    fn name(&self) -> &'static str {
        "head_to_head"
    }

    fn resolve<'a>(&self, group: &[&'a TiebreakerInput]) -> Vec<Vec<&'a TiebreakerInput>> {
        split_by_key(group, |input| match input.event_placements.get(&self.event_id) {
            Some(&rank) => (0, rank),
            None => (1, 0),
        })
    }
}

pub struct NoTiebreak;

impl TiebreakerRule for NoTiebreak {
    fn name(&self) -> &'static str {
        "none"
    }

    fn resolve<'a>(&self, group: &[&'a TiebreakerInput]) -> Vec<Vec<&'a TiebreakerInput>> {
        vec![group.to_vec()]
    }
}

pub fn rule_for(method: &TiebreakerMethod) -> Result<Box<dyn TiebreakerRule>> {
    match method {
        TiebreakerMethod::WorkoutTiebreak => Ok(Box::new(WorkoutTiebreak)),
        TiebreakerMethod::Countback => Ok(Box::new(Countback)),
        TiebreakerMethod::HeadToHead { event_id: Some(event_id) } => Ok(Box::new(HeadToHead { event_id: *event_id })),
        TiebreakerMethod::HeadToHead { event_id: None } => Err(ScoringError::MissingTiebreakData(
            "head_to_head tiebreaker requires an event id".to_string(),
        )),
        TiebreakerMethod::None => Ok(Box::new(NoTiebreak)),
    }
}

pub fn build_rules(methods: &[TiebreakerMethod]) -> Result<Vec<Box<dyn TiebreakerRule>>> {
    methods.iter().map(rule_for).collect()
}

/// Orders a tied subset of competitors by the given tiebreakers.
///
/// Each returned group holds competitors still tied after every rule ran.
/// Inputs are never modified and the result depends only on the arguments.
pub fn apply_tiebreakers(
    tied: &[CompetitorId],
    inputs: &[TiebreakerInput],
    methods: &[TiebreakerMethod],
) -> Result<Vec<Vec<CompetitorId>>> {
    let rules = build_rules(methods)?;
    let by_id: HashMap<CompetitorId, &TiebreakerInput> =
        inputs.iter().map(|input| (input.competitor_id, input)).collect();

    let group = tied
        .iter()
        .map(|id| {
            by_id
                .get(id)
                .copied()
                .ok_or_else(|| ScoringError::MissingTiebreakData(format!("no tiebreaker input for competitor {}", id)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(resolve_group(&group, &rules)
        .into_iter()
        .map(|group| group.into_iter().map(|input| input.competitor_id).collect())
        .collect())
}

/// Runs `rules` in order, each on the groups the previous ones left tied.
pub fn resolve_group<'a>(
    group: &[&'a TiebreakerInput],
    rules: &[Box<dyn TiebreakerRule>],
) -> Vec<Vec<&'a TiebreakerInput>> {
    let mut groups = vec![group.to_vec()];

    for rule in rules {
        if groups.iter().all(|group| group.len() < 2) {
            break;
        }

        groups = groups
            .into_iter()
            .flat_map(|group| {
                if group.len() < 2 {
                    vec![group]
                } else {
                    let resolved = rule.resolve(&group);
                    debug!(
                        rule = rule.name(),
                        tied = group.len(),
                        groups = resolved.len(),
                        "applied tiebreaker"
                    );
                    resolved
                }
            })
            .collect();
    }

    groups
}

/// Standard competition ranks for ordered groups, starting at `first_rank`.
pub fn rank_groups<T>(groups: &[Vec<T>], first_rank: u32) -> Vec<u32> {
    let mut ranks = Vec::with_capacity(groups.len());
    let mut next = first_rank;
    for group in groups {
        ranks.push(next);
        next += group.len() as u32;
    }
    ranks
}

/// Stable split into runs of equal keys, best (smallest) key first.
fn split_by_key<'a, K, F>(group: &[&'a TiebreakerInput], key: F) -> Vec<Vec<&'a TiebreakerInput>>
where
    K: Ord,
    F: Fn(&TiebreakerInput) -> K,
{
    let mut keyed: Vec<(K, &'a TiebreakerInput)> = group.iter().map(|&input| (key(input), input)).collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut groups: Vec<Vec<&'a TiebreakerInput>> = Vec::new();
    let mut previous: Option<K> = None;
    for (k, input) in keyed {
        match groups.last_mut() {
            Some(last) if previous.as_ref() == Some(&k) => last.push(input),
            _ => groups.push(vec![input]),
        }
        previous = Some(k);
    }
    groups
}
