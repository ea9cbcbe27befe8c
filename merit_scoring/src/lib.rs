mod board;
mod config;
pub mod discipline;
pub mod manual;
pub mod quick_start;

use log::{debug, info, warn};

use std::collections::HashMap;

pub use crate::board::ScoreBoard;
pub use crate::config::*;

// **** Private structures ****

/// A score expressed in hundredths of a point.
///
/// Ranking compares scores after rounding to 2 decimal places. Keeping the
/// rounded value as integer cents makes tie comparisons exact.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub(crate) struct ScoreCents(i64);

impl ScoreCents {
    pub(crate) fn from_points(points: f64) -> ScoreCents {
        ScoreCents((points * 100.0).round() as i64)
    }

    pub(crate) fn as_points(self) -> f64 {
        (self.0 as f64) / 100.0
    }
}

/// Rounds to 2 decimal places, half away from zero.
pub(crate) fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[derive(PartialEq, Debug, Clone)]
struct EmployeeTally {
    employee: EmployeeId,
    cents: ScoreCents,
    details: Vec<(CriterionId, f64)>,
}

/// Competition ranks for scores sorted in descending order.
///
/// Tied scores share the rank of the first of them and the next distinct
/// score gets its 1-based position: 95, 95, 90, 80 ranks as 1, 1, 3, 4.
pub(crate) fn assign_ranks(sorted_cents: &[ScoreCents]) -> Vec<u32> {
    let mut ranks: Vec<u32> = Vec::with_capacity(sorted_cents.len());
    for (idx, cents) in sorted_cents.iter().enumerate() {
        if idx > 0 && sorted_cents[idx - 1] == *cents {
            ranks.push(ranks[idx - 1]);
        } else {
            ranks.push((idx + 1) as u32);
        }
    }
    ranks
}

/// Tallies the votes of one (period, category) pool into ranked score rows.
///
/// Arguments:
/// * `period` the evaluation period to tally
/// * `category` the category pool to tally
/// * `criteria` the registered criteria. All categories may be given, the
/// relevant ones are selected here.
/// * `votes` the recorded votes. All pools may be given, the relevant ones
/// are selected here.
///
/// Every employee with at least one vote in the pool gets a row. Rows come
/// out sorted by descending weighted score. Employees tied after rounding
/// share a rank and are listed by ascending employee id, so repeated runs
/// over the same votes produce identical rows.
pub fn run_scoring_stats(
    period: PeriodId,
    category: CategoryId,
    criteria: &[Criterion],
    votes: &[Vote],
) -> Vec<ScoreRow> {
    info!(
        "run_scoring_stats: processing {:?} votes for period {:?} category {:?}",
        votes.len(),
        period.0,
        category.0
    );

    let pool_criteria: Vec<&Criterion> = criteria
        .iter()
        .filter(|c| c.category == category)
        .collect();
    if pool_criteria.is_empty() {
        warn!(
            "run_scoring_stats: no criterion registered for category {:?}, nothing to tally",
            category.0
        );
        return Vec::new();
    }
    if pool_criteria.iter().all(|c| c.weight == 0) {
        warn!(
            "run_scoring_stats: all criterion weights are zero for category {:?}",
            category.0
        );
    }

    let pool_votes: Vec<&Vote> = votes
        .iter()
        .filter(|v| v.period == period && v.category == category)
        .collect();
    debug!(
        "run_scoring_stats: {:?} votes in the pool, {:?} criteria",
        pool_votes.len(),
        pool_criteria.len()
    );
    if pool_votes.is_empty() {
        return Vec::new();
    }

    let mut votes_by_employee: HashMap<EmployeeId, Vec<&Vote>> = HashMap::new();
    for v in pool_votes {
        votes_by_employee.entry(v.employee).or_default().push(v);
    }
    let mut grouped: Vec<(EmployeeId, Vec<&Vote>)> = votes_by_employee.into_iter().collect();
    grouped.sort_by_key(|(employee, _)| *employee);

    let mut tallies: Vec<EmployeeTally> = Vec::with_capacity(grouped.len());
    for (employee, employee_votes) in grouped {
        let mut details: Vec<(CriterionId, f64)> = Vec::new();
        let mut weighted: f64 = 0.0;
        for criterion in pool_criteria.iter() {
            let scores: Vec<u32> = employee_votes
                .iter()
                .filter_map(|v| {
                    v.scores
                        .iter()
                        .find(|cs| cs.criterion == criterion.id)
                        .map(|cs| cs.score)
                })
                .collect();
            // A criterion nobody scored for this employee does not count
            // as a zero: it is left out of the weighted total.
            if scores.is_empty() {
                debug!(
                    "run_scoring_stats: criterion {:?} not scored for employee {:?}",
                    criterion.id.0, employee.0
                );
                continue;
            }
            let avg: f64 =
                scores.iter().map(|s| f64::from(*s)).sum::<f64>() / (scores.len() as f64);
            weighted += (f64::from(criterion.weight) / 100.0) * avg;
            details.push((criterion.id, round2(avg)));
        }
        tallies.push(EmployeeTally {
            employee,
            cents: ScoreCents::from_points(weighted),
            details,
        });
    }

    tallies.sort_by(|a, b| b.cents.cmp(&a.cents).then(a.employee.cmp(&b.employee)));

    let cents: Vec<ScoreCents> = tallies.iter().map(|t| t.cents).collect();
    let ranks = assign_ranks(&cents);

    let rows: Vec<ScoreRow> = tallies
        .into_iter()
        .zip(ranks)
        .map(|(t, rank)| ScoreRow {
            period,
            category,
            employee: t.employee,
            weighted_score: t.cents.as_points(),
            rank,
            is_winner: rank == 1,
            score_details: t.details,
        })
        .collect();

    let winners = rows.iter().filter(|r| r.is_winner).count();
    info!(
        "run_scoring_stats: {:?} employees tallied, {:?} winner(s) at {:?} points",
        rows.len(),
        winners,
        rows.first().map(|r| r.weighted_score).unwrap_or(0.0)
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crit(id: u32, category: u32, weight: u32, order: u32) -> Criterion {
        Criterion {
            id: CriterionId(id),
            category: CategoryId(category),
            weight,
            order,
        }
    }

    fn vote(employee: u32, voter: u32, scores: &[(u32, u32)]) -> Vote {
        Vote {
            period: PeriodId(1),
            category: CategoryId(1),
            employee: EmployeeId(employee),
            voter: VoterId(voter),
            scores: scores
                .iter()
                .map(|(c, s)| CriterionScore {
                    criterion: CriterionId(*c),
                    score: *s,
                })
                .collect(),
        }
    }

    #[test]
    fn weighted_average_two_reviewers() {
        let _ = env_logger::builder().is_test(true).try_init();
        let criteria = vec![crit(1, 1, 60, 1), crit(2, 1, 40, 2)];
        let votes = vec![
            vote(7, 100, &[(1, 80), (2, 90)]),
            vote(7, 101, &[(1, 100), (2, 70)]),
        ];
        let rows = run_scoring_stats(PeriodId(1), CategoryId(1), &criteria, &votes);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].weighted_score, 86.0);
        assert_eq!(rows[0].rank, 1);
        assert!(rows[0].is_winner);
        assert_eq!(
            rows[0].score_details,
            vec![(CriterionId(1), 90.0), (CriterionId(2), 80.0)]
        );
    }

    #[test]
    fn competition_ranking_skips_after_tie() {
        let cents: Vec<ScoreCents> = [95.0, 95.0, 90.0, 80.0]
            .iter()
            .map(|p| ScoreCents::from_points(*p))
            .collect();
        assert_eq!(assign_ranks(&cents), vec![1, 1, 3, 4]);
    }

    #[test]
    fn all_tied_all_win() {
        let cents = vec![ScoreCents::from_points(80.0); 3];
        assert_eq!(assign_ranks(&cents), vec![1, 1, 1]);
    }

    #[test]
    fn higher_score_wins_alone() {
        let criteria = vec![crit(1, 1, 100, 1)];
        let votes = vec![vote(7, 100, &[(1, 90)]), vote(8, 100, &[(1, 95)])];
        let rows = run_scoring_stats(PeriodId(1), CategoryId(1), &criteria, &votes);
        assert_eq!(rows[0].employee, EmployeeId(8));
        assert_eq!(rows[0].rank, 1);
        assert!(rows[0].is_winner);
        assert_eq!(rows[1].employee, EmployeeId(7));
        assert_eq!(rows[1].rank, 2);
        assert!(!rows[1].is_winner);
    }

    #[test]
    fn tied_employees_share_the_win() {
        let criteria = vec![crit(1, 1, 100, 1)];
        let votes = vec![
            vote(4, 100, &[(1, 80)]),
            vote(2, 100, &[(1, 95)]),
            vote(3, 100, &[(1, 90)]),
            vote(1, 100, &[(1, 95)]),
        ];
        let rows = run_scoring_stats(PeriodId(1), CategoryId(1), &criteria, &votes);
        let ranked: Vec<(u32, u32, bool)> = rows
            .iter()
            .map(|r| (r.employee.0, r.rank, r.is_winner))
            .collect();
        assert_eq!(
            ranked,
            vec![(1, 1, true), (2, 1, true), (3, 3, false), (4, 4, false)]
        );
    }

    #[test]
    fn missing_criterion_is_not_a_zero() {
        let criteria = vec![crit(1, 1, 50, 1), crit(2, 1, 50, 2)];
        let votes = vec![
            vote(7, 100, &[(1, 80), (2, 60)]),
            vote(7, 101, &[(1, 90)]),
        ];
        let rows = run_scoring_stats(PeriodId(1), CategoryId(1), &criteria, &votes);
        // criterion 2 is averaged over the single score that exists
        assert_eq!(rows[0].weighted_score, 72.5);
        assert_eq!(
            rows[0].score_details,
            vec![(CriterionId(1), 85.0), (CriterionId(2), 60.0)]
        );
    }

    #[test]
    fn criterion_unscored_by_everyone_is_absent() {
        let criteria = vec![crit(1, 1, 60, 1), crit(2, 1, 40, 2)];
        let votes = vec![vote(7, 100, &[(1, 90)])];
        let rows = run_scoring_stats(PeriodId(1), CategoryId(1), &criteria, &votes);
        assert_eq!(rows[0].weighted_score, 54.0);
        assert_eq!(rows[0].score_details, vec![(CriterionId(1), 90.0)]);
    }

    #[test]
    fn unknown_criterion_in_vote_is_skipped() {
        let criteria = vec![crit(1, 1, 100, 1)];
        let votes = vec![vote(7, 100, &[(1, 80), (99, 10)])];
        let rows = run_scoring_stats(PeriodId(1), CategoryId(1), &criteria, &votes);
        assert_eq!(rows[0].weighted_score, 80.0);
        assert_eq!(rows[0].score_details, vec![(CriterionId(1), 80.0)]);
    }

    #[test]
    fn weights_are_not_renormalized() {
        let criteria = vec![crit(1, 1, 30, 1), crit(2, 1, 30, 2)];
        let votes = vec![vote(7, 100, &[(1, 100), (2, 100)])];
        let rows = run_scoring_stats(PeriodId(1), CategoryId(1), &criteria, &votes);
        // 30 + 30 percent of weight caps the total at 60
        assert_eq!(rows[0].weighted_score, 60.0);
    }

    #[test]
    fn no_criteria_no_rows() {
        let votes = vec![vote(7, 100, &[(1, 80)])];
        let rows = run_scoring_stats(PeriodId(1), CategoryId(1), &[], &votes);
        assert!(rows.is_empty());
    }

    #[test]
    fn no_votes_no_rows() {
        let criteria = vec![crit(1, 1, 100, 1)];
        let rows = run_scoring_stats(PeriodId(1), CategoryId(1), &criteria, &[]);
        assert!(rows.is_empty());
    }

    #[test]
    fn other_pools_are_ignored() {
        let criteria = vec![crit(1, 1, 100, 1), crit(2, 2, 100, 1)];
        let mut other_period = vote(7, 100, &[(1, 10)]);
        other_period.period = PeriodId(9);
        let other_category = Vote {
            category: CategoryId(2),
            ..vote(8, 100, &[(2, 20)])
        };
        let votes = vec![vote(7, 100, &[(1, 80)]), other_period, other_category];
        let rows = run_scoring_stats(PeriodId(1), CategoryId(1), &criteria, &votes);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].employee, EmployeeId(7));
        assert_eq!(rows[0].weighted_score, 80.0);
    }

    #[test]
    fn rerun_is_idempotent() {
        let criteria = vec![crit(1, 1, 70, 1), crit(2, 1, 30, 2)];
        let votes = vec![
            vote(1, 100, &[(1, 77), (2, 83)]),
            vote(2, 100, &[(1, 91)]),
            vote(1, 101, &[(1, 62), (2, 88)]),
            vote(3, 101, &[(1, 91)]),
        ];
        let first = run_scoring_stats(PeriodId(1), CategoryId(1), &criteria, &votes);
        let second = run_scoring_stats(PeriodId(1), CategoryId(1), &criteria, &votes);
        assert_eq!(first, second);
    }
}
