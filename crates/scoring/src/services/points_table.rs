use rust_decimal::Decimal;

use crate::error::{Result, ScoringError};
use crate::models::{CustomTableConfig, PointsTemplate, TraditionalConfig};

/// Front-loaded table used by winner-takes-more scoring. Ranks past the end earn 1.
pub const WINNER_TAKES_MORE_TABLE: [u32; 28] = [
    100, 85, 75, 67, 60, 54, 49, 45, 41, 38, 35, 32, 30, 28, 26, 24, 22, 20, 18, 16, 14, 12, 10, 8,
    6, 4, 2, 1,
];

/// `first_place_points - (rank - 1) * step`, never below zero.
pub fn traditional_points(rank: u32, config: &TraditionalConfig) -> Decimal {
    let deduction = u64::from(rank.saturating_sub(1)) * u64::from(config.step);
    let points = u64::from(config.first_place_points).saturating_sub(deduction);
    Decimal::from(points)
}

pub fn winner_takes_more_points(rank: u32) -> Decimal {
    let index = rank.saturating_sub(1) as usize;
    Decimal::from(WINNER_TAKES_MORE_TABLE.get(index).copied().unwrap_or(1))
}

/// Points equal placement; used where the lowest total wins.
pub fn online_points(rank: u32) -> Decimal {
    Decimal::from(rank)
}

pub fn template_points(rank: u32, template: PointsTemplate, traditional: &TraditionalConfig) -> Decimal {
    match template {
        PointsTemplate::Traditional => traditional_points(rank, traditional),
        PointsTemplate::WinnerTakesMore => winner_takes_more_points(rank),
    }
}

/// Table entry for `rank`, falling back to the base template when one is set.
pub fn custom_points(rank: u32, custom: &CustomTableConfig, traditional: &TraditionalConfig) -> Result<Decimal> {
    if let Some(points) = custom.table.get(&rank) {
        return Ok(*points);
    }

    match custom.base_template {
        Some(template) => Ok(template_points(rank, template, traditional)),
        None => Err(ScoringError::MissingCustomPoints { rank }),
    }
}

/// Points for ranks `1..=count` under a template, for previews and table editing.
pub fn generate_points_table(template: PointsTemplate, count: u32, traditional: &TraditionalConfig) -> Vec<Decimal> {
    (1..=count)
        .map(|rank| template_points(rank, template, traditional))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::BTreeMap;

    #[rstest]
    #[case(1, 100)]
    #[case(2, 95)]
    #[case(20, 5)]
    #[case(21, 0)]
    #[case(50, 0)]
    fn test_traditional_points(#[case] rank: u32, #[case] expected: u32) {
        assert_eq!(traditional_points(rank, &TraditionalConfig::default()), Decimal::from(expected));
    }

    #[test]
    fn test_traditional_custom_step() {
        let config = TraditionalConfig {
            first_place_points: 50,
            step: 10,
        };
        assert_eq!(traditional_points(3, &config), Decimal::from(30));
    }

    #[rstest]
    #[case(1, 100)]
    #[case(2, 85)]
    #[case(28, 1)]
    #[case(40, 1)]
    fn test_winner_takes_more(#[case] rank: u32, #[case] expected: u32) {
        assert_eq!(winner_takes_more_points(rank), Decimal::from(expected));
    }

    #[test]
    fn test_custom_overrides_template() {
        let mut table = BTreeMap::new();
        table.insert(1, Decimal::from(150));
        let custom = CustomTableConfig {
            base_template: Some(PointsTemplate::WinnerTakesMore),
            table,
        };
        let traditional = TraditionalConfig::default();
        assert_eq!(custom_points(1, &custom, &traditional).unwrap(), Decimal::from(150));
        assert_eq!(custom_points(2, &custom, &traditional).unwrap(), Decimal::from(85));
    }

    #[test]
    fn test_custom_without_template_requires_every_rank() {
        let mut table = BTreeMap::new();
        table.insert(1, Decimal::from(10));
        let custom = CustomTableConfig {
            base_template: None,
            table,
        };
        let err = custom_points(2, &custom, &TraditionalConfig::default()).unwrap_err();
        assert!(matches!(err, ScoringError::MissingCustomPoints { rank: 2 }));
    }

    #[test]
    fn test_generate_points_table() {
        let table = generate_points_table(PointsTemplate::Traditional, 3, &TraditionalConfig::default());
        assert_eq!(table, vec![Decimal::from(100), Decimal::from(95), Decimal::from(90)]);
    }
}
