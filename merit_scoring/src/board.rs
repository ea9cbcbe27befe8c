use log::{debug, info};
use std::collections::HashMap;

use crate::config::*;
use crate::discipline;
use crate::{assign_ranks, run_scoring_stats, ScoreCents};

/// Key of the vote uniqueness rule.
type VoteKey = (PeriodId, VoterId, EmployeeId, CategoryId);

/// The in-memory score board: periods, criteria, votes and tabulated
/// results in one place.
///
/// The board is single-writer. An application sharing a board across
/// threads takes its own lock around the mutating calls.
///
/// ```
/// use merit_scoring::{
///     CategoryId, Criterion, CriterionId, CriterionScore, EmployeeId, PeriodId, ScoreBoard,
///     Vote, VoterId,
/// };
/// # use merit_scoring::ScoringErrors;
///
/// let mut board = ScoreBoard::new();
/// board.register_period(PeriodId(1), "2024 semester 1")?;
/// board.add_criterion(Criterion {
///     id: CriterionId(1),
///     category: CategoryId(1),
///     weight: 100,
///     order: 1,
/// });
/// board.open_voting(PeriodId(1))?;
/// board.record_vote(Vote {
///     period: PeriodId(1),
///     category: CategoryId(1),
///     employee: EmployeeId(7),
///     voter: VoterId(3),
///     scores: vec![CriterionScore {
///         criterion: CriterionId(1),
///         score: 88,
///     }],
/// })?;
/// board.close_voting(PeriodId(1))?;
/// let rows = board.aggregate_category(PeriodId(1), CategoryId(1));
/// assert_eq!(rows[0].weighted_score, 88.0);
/// assert!(rows[0].is_winner);
/// # Ok::<(), ScoringErrors>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScoreBoard {
    periods: HashMap<PeriodId, Period>,
    criteria: Vec<Criterion>,
    votes: HashMap<VoteKey, StoredVote>,
    scores: HashMap<(PeriodId, CategoryId), Vec<ScoreRow>>,
    discipline: HashMap<(EmployeeId, u32, i32), DisciplineRecord>,
}

impl ScoreBoard {
    pub fn new() -> ScoreBoard {
        ScoreBoard::default()
    }

    // **** Periods ****

    /// Registers a new period in `Draft` state.
    pub fn register_period(&mut self, id: PeriodId, label: &str) -> Result<(), ScoringErrors> {
        if self.periods.contains_key(&id) {
            return Err(ScoringErrors::PeriodExists(id));
        }
        info!("register_period: {:?} ({})", id.0, label);
        self.periods.insert(
            id,
            Period {
                id,
                label: label.to_string(),
                status: PeriodStatus::Draft,
            },
        );
        Ok(())
    }

    pub fn period(&self, id: PeriodId) -> Option<&Period> {
        self.periods.get(&id)
    }

    /// `Draft` -> `Open`: the period starts accepting votes.
    pub fn open_voting(&mut self, id: PeriodId) -> Result<(), ScoringErrors> {
        self.transition(id, PeriodStatus::Draft, PeriodStatus::Open)
    }

    /// `Open` -> `Closed`: no further votes are accepted.
    pub fn close_voting(&mut self, id: PeriodId) -> Result<(), ScoringErrors> {
        self.transition(id, PeriodStatus::Open, PeriodStatus::Closed)
    }

    /// `Closed` -> `Announced`: the results are published.
    pub fn announce(&mut self, id: PeriodId) -> Result<(), ScoringErrors> {
        self.transition(id, PeriodStatus::Closed, PeriodStatus::Announced)
    }

    fn transition(
        &mut self,
        id: PeriodId,
        expected: PeriodStatus,
        target: PeriodStatus,
    ) -> Result<(), ScoringErrors> {
        let period = self
            .periods
            .get_mut(&id)
            .ok_or(ScoringErrors::UnknownPeriod(id))?;
        if period.status != expected {
            return Err(ScoringErrors::InvalidPeriodState {
                period: id,
                expected,
                actual: period.status,
            });
        }
        info!("period {:?}: {:?} -> {:?}", id.0, expected, target);
        period.status = target;
        Ok(())
    }

    // **** Criteria ****

    /// Registers a criterion. A criterion with an id already registered
    /// replaces the previous definition.
    pub fn add_criterion(&mut self, criterion: Criterion) {
        self.criteria.retain(|c| c.id != criterion.id);
        debug!(
            "add_criterion: {:?} (category {:?}, weight {:?})",
            criterion.id.0, criterion.category.0, criterion.weight
        );
        self.criteria.push(criterion);
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    // **** Votes ****

    /// Records one vote.
    ///
    /// The period must be registered and `Open`. A voter scores a given
    /// employee at most once per period and category: a second vote for
    /// the same key is rejected, not merged.
    pub fn record_vote(&mut self, vote: Vote) -> Result<(), ScoringErrors> {
        let period = self
            .periods
            .get(&vote.period)
            .ok_or(ScoringErrors::UnknownPeriod(vote.period))?;
        if period.status != PeriodStatus::Open {
            return Err(ScoringErrors::VotingClosed(vote.period));
        }
        let key = (vote.period, vote.voter, vote.employee, vote.category);
        if self.votes.contains_key(&key) {
            return Err(ScoringErrors::DuplicateVote {
                period: vote.period,
                voter: vote.voter,
                employee: vote.employee,
                category: vote.category,
            });
        }
        let total_score = vote.total_score();
        debug!(
            "record_vote: voter {:?} -> employee {:?} (category {:?}, total {:?})",
            vote.voter.0, vote.employee.0, vote.category.0, total_score
        );
        self.votes.insert(key, StoredVote { vote, total_score });
        Ok(())
    }

    /// The recorded votes of one (period, category) pool, sorted by
    /// (voter, employee).
    pub fn recorded_votes(&self, period: PeriodId, category: CategoryId) -> Vec<&StoredVote> {
        let mut votes: Vec<&StoredVote> = self
            .votes
            .values()
            .filter(|sv| sv.vote.period == period && sv.vote.category == category)
            .collect();
        votes.sort_by_key(|sv| (sv.vote.voter, sv.vote.employee));
        votes
    }

    // **** Tabulation ****

    /// Tallies one (period, category) pool and replaces its score rows.
    ///
    /// The new rows are built in full before the stored ones are touched:
    /// the board never holds a mix of old and new rows for a pool, no
    /// matter how often the pool is re-aggregated.
    pub fn aggregate_category(&mut self, period: PeriodId, category: CategoryId) -> &[ScoreRow] {
        let pool_votes: Vec<Vote> = self
            .votes
            .values()
            .filter(|sv| sv.vote.period == period && sv.vote.category == category)
            .map(|sv| sv.vote.clone())
            .collect();
        let rows = run_scoring_stats(period, category, &self.criteria, &pool_votes);
        info!(
            "aggregate_category: period {:?} category {:?}: replacing scores with {:?} rows",
            period.0,
            category.0,
            rows.len()
        );
        let slot = self.scores.entry((period, category)).or_default();
        *slot = rows;
        slot
    }

    /// The last aggregated rows of the pool, empty if never aggregated.
    pub fn scores(&self, period: PeriodId, category: CategoryId) -> &[ScoreRow] {
        self.scores
            .get(&(period, category))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // **** Discipline ****

    /// Computes and stores the discipline scores of one employee-month.
    ///
    /// There is one record per (employee, month, year). Importing the same
    /// month again replaces the previous record, rank included: the month
    /// has to be ranked again afterwards.
    pub fn import_attendance(
        &mut self,
        employee: EmployeeId,
        month: u32,
        year: i32,
        counters: AttendanceCounters,
    ) -> DisciplineRecord {
        let score_1 = discipline::presence_score(
            counters.present_on_time,
            counters.leave_on_time,
            counters.total_work_days,
        );
        let score_2 =
            discipline::lateness_score(counters.late_minutes, counters.early_leave_minutes);
        let score_3 = discipline::permission_score(counters.excess_permission_count);
        let record = DisciplineRecord {
            employee,
            month,
            year,
            score_1,
            score_2,
            score_3,
            final_score: discipline::final_score(score_1, score_2, score_3),
            rank: None,
            is_winner: false,
            counters,
        };
        if self
            .discipline
            .insert((employee, month, year), record)
            .is_some()
        {
            info!(
                "import_attendance: replaced record for employee {:?} {}-{:02}",
                employee.0, year, month
            );
        }
        record
    }

    /// Ranks the discipline records of one month with the same competition
    /// rule as the vote pools, and returns them in rank order.
    pub fn rank_discipline(&mut self, month: u32, year: i32) -> Vec<DisciplineRecord> {
        let mut cohort: Vec<(EmployeeId, ScoreCents)> = self
            .discipline
            .values()
            .filter(|r| r.month == month && r.year == year)
            .map(|r| (r.employee, ScoreCents::from_points(r.final_score)))
            .collect();
        cohort.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let cents: Vec<ScoreCents> = cohort.iter().map(|(_, c)| *c).collect();
        let ranks = assign_ranks(&cents);

        let mut ranked: Vec<DisciplineRecord> = Vec::with_capacity(cohort.len());
        for ((employee, _), rank) in cohort.into_iter().zip(ranks) {
            if let Some(record) = self.discipline.get_mut(&(employee, month, year)) {
                record.rank = Some(rank);
                record.is_winner = rank == 1;
                ranked.push(*record);
            }
        }
        info!(
            "rank_discipline: {}-{:02}: {:?} records ranked",
            year,
            month,
            ranked.len()
        );
        ranked
    }

    /// The stored discipline record of one employee-month, if any.
    pub fn discipline_record(
        &self,
        employee: EmployeeId,
        month: u32,
        year: i32,
    ) -> Option<&DisciplineRecord> {
        self.discipline.get(&(employee, month, year))
    }
}
