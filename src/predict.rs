use crate::models::submission::SolveSummary;

/// What-if values past this count are ignored.
pub const MAX_PROJECTIONS: usize = 10;

/// Only the 100 highest-scored problems contribute to the weighted sum.
const COUNTED_PROBLEMS: usize = 100;

/// Judge point formula: a solve-count bonus saturating at 150 plus a
/// geometrically decaying sum over the best problem scores, descending.
pub fn calculate_points(points_descending: &[f64], fully_solved: usize) -> f64 {
    let bonus = 150.0 * (1.0 - 0.997f64.powi(fully_solved as i32));
    let weighted: f64 = points_descending
        .iter()
        .take(COUNTED_PROBLEMS)
        .enumerate()
        .map(|(i, points)| 0.95f64.powi(i as i32) * points)
        .sum();
    bonus + weighted
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub value: f64,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct Prediction {
    pub current: f64,
    pub projections: Vec<Projection>,
}

/// Projects the score after each hypothetical additional solve, in input
/// order. Projections are cumulative: every step keeps the solves of the
/// steps before it.
pub fn predict(summary: &SolveSummary, hypothetical: &[f64]) -> Prediction {
    let mut points = summary.points_descending();
    let mut fully_solved = summary.solved_count();
    let current = calculate_points(&points, fully_solved);

    let mut projections = Vec::new();
    for &value in hypothetical.iter().take(MAX_PROJECTIONS) {
        let position = points
            .iter()
            .position(|&existing| existing < value)
            .unwrap_or_else(|| points.len());
        points.insert(position, value);
        fully_solved += 1;
        projections.push(Projection {
            value,
            total: calculate_points(&points, fully_solved),
        });
    }

    Prediction {
        current,
        projections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::Submission;
    use chrono::NaiveDate;

    fn ac(problem: &str, points: f64, day: u32) -> Submission {
        Submission {
            username: "ada".to_string(),
            problem_code: problem.to_string(),
            date: NaiveDate::from_ymd(2021, 1, day).and_hms(0, 0, 0),
            language_key: "CPP17".to_string(),
            time: None,
            memory: None,
            points: Some(points),
            result: Some("AC".to_string()),
            score_num: None,
            score_denom: None,
        }
    }

    #[test]
    fn no_solves_scores_zero() {
        assert_eq!(calculate_points(&[], 0), 0.0);
    }

    #[test]
    fn single_full_solve_matches_the_closed_form() {
        let total = calculate_points(&[100.0], 1);
        assert!((total - 100.45).abs() < 1e-9, "got {}", total);
    }

    #[test]
    fn appending_points_never_decreases_the_score() {
        let additions = [5.0, 100.0, 1.0, 40.0, 0.0, 25.0];
        let mut points: Vec<f64> = Vec::new();
        let mut previous = calculate_points(&points, 0);
        for (solved, &value) in additions.iter().enumerate() {
            points.push(value);
            points.sort_by(|a, b| b.partial_cmp(a).unwrap());
            let total = calculate_points(&points, solved + 1);
            assert!(total >= previous, "{} < {}", total, previous);
            previous = total;
        }
    }

    #[test]
    fn projections_are_cumulative() {
        let summary = SolveSummary::from_submissions(&[ac("p1", 100.0, 1)]);
        let prediction = predict(&summary, &[50.0, 50.0]);

        assert!((prediction.current - 100.45).abs() < 1e-9);
        assert_eq!(prediction.projections.len(), 2);
        // Second projection includes the first hypothetical solve as well.
        let first = prediction.projections[0].total;
        let second = prediction.projections[1].total;
        assert!(second > first);
        let expected_first = calculate_points(&[100.0, 50.0], 2);
        assert!((first - expected_first).abs() < 1e-9);
        let expected_second = calculate_points(&[100.0, 50.0, 50.0], 3);
        assert!((second - expected_second).abs() < 1e-9);
    }

    #[test]
    fn projection_input_is_capped_at_ten_values() {
        let summary = SolveSummary::from_submissions(&[]);
        let values = [10.0; 14];
        let prediction = predict(&summary, &values);
        assert_eq!(prediction.projections.len(), MAX_PROJECTIONS);
    }

    #[test]
    fn only_the_top_hundred_problems_are_counted() {
        let points: Vec<f64> = (0..120).map(|_| 10.0).collect();
        let capped = calculate_points(&points, 0);
        let exactly_hundred = calculate_points(&points[..100], 0);
        assert!((capped - exactly_hundred).abs() < 1e-9);
    }
}
