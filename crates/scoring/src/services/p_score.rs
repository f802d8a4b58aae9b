use rust_decimal::Decimal;

use crate::models::{EncodedScore, MedianField, PScoreConfig, SortDirection};

/// P-Score for each performance, in input order.
///
/// The best performance earns 100 and the median earns 50:
///
/// - ascending: `100 - (X - best) * 50 / (median - best)`
/// - descending: `100 - (best - X) * 50 / (best - median)`
///
/// Scores are rounded to 2 decimal places. A descending field whose best
/// value is not positive earns 0 across the board, and a field where every
/// value is equal earns 100 across the board.
pub fn calculate_p_scores(values: &[EncodedScore], direction: SortDirection, config: &PScoreConfig) -> Vec<Decimal> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut sorted = values.to_vec();
    match direction {
        SortDirection::Asc => sorted.sort_unstable(),
        SortDirection::Desc => sorted.sort_unstable_by(|a, b| b.cmp(a)),
    }

    let best = sorted[0];
    let worst = sorted[sorted.len() - 1];

    if direction == SortDirection::Desc && best <= 0 {
        return vec![Decimal::ZERO; values.len()];
    }
    if best == worst {
        return vec![Decimal::ONE_HUNDRED; values.len()];
    }

    let best = Decimal::from(best);
    let mut median = median_of(&sorted, config.median_field);
    if median == best {
        median = Decimal::from(worst);
    }

    let spread = (median - best).abs();
    let half = Decimal::from(50);

    values
        .iter()
        .map(|&value| {
            let behind = (Decimal::from(value) - best).abs();
            let points = Decimal::ONE_HUNDRED - behind * half / spread;
            let points = if config.allow_negatives {
                points
            } else {
                points.max(Decimal::ZERO)
            };
            points.round_dp(2)
        })
        .collect()
}

/// `sorted` is ordered best first.
fn median_of(sorted: &[EncodedScore], field: MedianField) -> Decimal {
    let n = sorted.len();
    match field {
        MedianField::TopHalf => Decimal::from(sorted[n.div_ceil(2) - 1]),
        MedianField::All if n % 2 == 1 => Decimal::from(sorted[n / 2]),
        MedianField::All => (Decimal::from(sorted[n / 2 - 1]) + Decimal::from(sorted[n / 2])) / Decimal::TWO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn top_half() -> PScoreConfig {
        PScoreConfig::default()
    }

    #[test]
    fn test_best_gets_100_and_top_half_median_gets_50() {
        let scores = calculate_p_scores(&[300, 360, 420, 480], SortDirection::Asc, &top_half());
        assert_eq!(scores[0], Decimal::ONE_HUNDRED);
        assert_eq!(scores[1], Decimal::from(50));
        assert_eq!(scores[3], Decimal::from(-50));
    }

    #[test]
    fn test_between_best_and_median() {
        let scores = calculate_p_scores(&[300, 330, 360, 400, 450, 500], SortDirection::Asc, &top_half());
        assert_eq!(scores[1], Decimal::from(75));
        assert_eq!(scores[2], Decimal::from(50));
    }

    #[test]
    fn test_rounds_to_two_places() {
        let scores = calculate_p_scores(&[300, 340, 360, 400, 450, 500], SortDirection::Asc, &top_half());
        assert_eq!(scores[1], Decimal::from_str("66.67").unwrap());
    }

    #[test]
    fn test_descending_formula() {
        let scores = calculate_p_scores(&[200, 150, 100, 50], SortDirection::Desc, &top_half());
        assert_eq!(scores[0], Decimal::ONE_HUNDRED);
        assert_eq!(scores[1], Decimal::from(50));
    }

    #[test]
    fn test_clamps_when_negatives_disallowed() {
        let config = PScoreConfig {
            allow_negatives: false,
            ..PScoreConfig::default()
        };
        let scores = calculate_p_scores(&[300, 360, 420, 480], SortDirection::Asc, &config);
        assert_eq!(scores[3], Decimal::ZERO);
    }

    #[test]
    fn test_median_over_whole_field() {
        let config = PScoreConfig {
            median_field: MedianField::All,
            ..PScoreConfig::default()
        };
        let scores = calculate_p_scores(&[300, 360, 420, 480], SortDirection::Asc, &config);
        assert_eq!(scores[0], Decimal::ONE_HUNDRED);
        // median 390: 100 - 60 * 50 / 90
        assert_eq!(scores[1], Decimal::from_str("66.67").unwrap());
    }

    #[test]
    fn test_identical_values_all_get_100() {
        let scores = calculate_p_scores(&[42, 42, 42], SortDirection::Desc, &top_half());
        assert!(scores.iter().all(|s| *s == Decimal::ONE_HUNDRED));
    }

    #[test]
    fn test_zero_best_on_descending_field_is_zero() {
        let scores = calculate_p_scores(&[0, 0, 0], SortDirection::Desc, &top_half());
        assert_eq!(scores, vec![Decimal::ZERO; 3]);
    }

    #[test]
    fn test_two_competitors_use_worst_as_anchor() {
        let scores = calculate_p_scores(&[300, 360], SortDirection::Asc, &top_half());
        assert_eq!(scores, vec![Decimal::ONE_HUNDRED, Decimal::from(50)]);
    }

    #[test]
    fn test_tied_values_share_points() {
        let scores = calculate_p_scores(&[300, 300, 420], SortDirection::Asc, &top_half());
        assert_eq!(scores[0], scores[1]);
    }

    #[test]
    fn test_empty() {
        assert!(calculate_p_scores(&[], SortDirection::Asc, &top_half()).is_empty());
    }
}
