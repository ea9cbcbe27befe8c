// ********* Identifiers ***********

use std::error::Error;
use std::fmt::Display;

/// Identifier of an evaluation period (one tabulation campaign).
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct PeriodId(pub u32);

/// Identifier of an employee category. Employees only compete against
/// other employees of the same category.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CategoryId(pub u32);

/// Identifier of an evaluation criterion.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct CriterionId(pub u32);

/// Identifier of an employee being evaluated.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct EmployeeId(pub u32);

/// Identifier of a reviewer casting votes.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct VoterId(pub u32);

// ********* Input data structures ***********

/// One weighted criterion inside a category.
///
/// Weights are percentages of the category total and are taken at face
/// value: a category whose weights do not add up to 100 is tallied as-is,
/// without renormalization.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct Criterion {
    pub id: CriterionId,
    pub category: CategoryId,
    pub weight: u32,
    /// Display position within the category.
    pub order: u32,
}

/// The raw score given on a single criterion by a reviewer.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct CriterionScore {
    pub criterion: CriterionId,
    pub score: u32,
}

/// One reviewer's complete evaluation of one employee for a period.
///
/// A vote does not have to cover every criterion of the category:
/// criteria left out are simply not counted in that criterion's average.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Vote {
    pub period: PeriodId,
    pub category: CategoryId,
    pub employee: EmployeeId,
    pub voter: VoterId,
    pub scores: Vec<CriterionScore>,
}

impl Vote {
    /// Unweighted sum of the raw criterion scores.
    pub fn total_score(&self) -> u32 {
        self.scores.iter().map(|cs| cs.score).sum()
    }
}

/// A vote as kept on the board, with its raw total precomputed at
/// recording time.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StoredVote {
    pub vote: Vote,
    pub total_score: u32,
}

/// Attendance counters for one employee over one calendar month.
///
/// `late_minutes` and `early_leave_minutes` are cumulated over the whole
/// month.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct AttendanceCounters {
    pub total_work_days: u32,
    pub present_on_time: u32,
    pub leave_on_time: u32,
    pub late_minutes: u32,
    pub early_leave_minutes: u32,
    pub excess_permission_count: u32,
}

// ******** Output data structures *********

/// The tabulated result for one employee in one (period, category) pool.
#[derive(PartialEq, Debug, Clone)]
pub struct ScoreRow {
    pub period: PeriodId,
    pub category: CategoryId,
    pub employee: EmployeeId,
    /// Weighted total, rounded to 2 decimal places.
    pub weighted_score: f64,
    /// Competition rank: tied scores share a rank and the next distinct
    /// score gets its 1-based position.
    pub rank: u32,
    pub is_winner: bool,
    /// Per-criterion average of the raw scores, rounded to 2 decimal
    /// places, in criterion order. Criteria no reviewer scored are absent.
    pub score_details: Vec<(CriterionId, f64)>,
}

/// The discipline result for one employee over one calendar month.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct DisciplineRecord {
    pub employee: EmployeeId,
    pub month: u32,
    pub year: i32,
    /// Presence component (50 points at full presence).
    pub score_1: f64,
    /// Punctuality component (35 points with no late or early minutes).
    pub score_2: f64,
    /// Permission component (15 points or nothing).
    pub score_3: f64,
    /// Sum of the three components, rounded to 2 decimal places.
    pub final_score: f64,
    /// `None` until the month has been ranked.
    pub rank: Option<u32>,
    pub is_winner: bool,
    pub counters: AttendanceCounters,
}

// ********* Periods **********

/// Lifecycle of an evaluation period.
///
/// Votes are only accepted while the period is `Open`. The later states
/// gate nothing else by themselves, they keep campaigns auditable.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum PeriodStatus {
    Draft,
    Open,
    Closed,
    Announced,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Period {
    pub id: PeriodId,
    pub label: String,
    pub status: PeriodStatus,
}

// ********* Errors **********

/// Errors that prevent a board operation from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ScoringErrors {
    /// This (voter, employee, category) pair was already voted on in this
    /// period.
    DuplicateVote {
        period: PeriodId,
        voter: VoterId,
        employee: EmployeeId,
        category: CategoryId,
    },
    PeriodExists(PeriodId),
    UnknownPeriod(PeriodId),
    /// The period is not currently accepting votes.
    VotingClosed(PeriodId),
    /// A lifecycle transition was requested from the wrong state.
    InvalidPeriodState {
        period: PeriodId,
        expected: PeriodStatus,
        actual: PeriodStatus,
    },
}

impl Error for ScoringErrors {}

impl Display for ScoringErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringErrors::DuplicateVote {
                period,
                voter,
                employee,
                category,
            } => write!(
                f,
                "duplicate vote by voter {} on employee {} (period {}, category {})",
                voter.0, employee.0, period.0, category.0
            ),
            ScoringErrors::PeriodExists(p) => write!(f, "period {} is already registered", p.0),
            ScoringErrors::UnknownPeriod(p) => write!(f, "period {} is not registered", p.0),
            ScoringErrors::VotingClosed(p) => write!(f, "period {} is not open for votes", p.0),
            ScoringErrors::InvalidPeriodState {
                period,
                expected,
                actual,
            } => write!(
                f,
                "period {} is {:?}, expected {:?}",
                period.0, actual, expected
            ),
        }
    }
}
