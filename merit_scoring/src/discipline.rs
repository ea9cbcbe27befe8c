//! Attendance discipline scoring.
//!
//! The monthly discipline score is built from three components with fixed
//! regulation weights: presence (up to 50 points), punctuality (up to 35
//! points) and permission usage (15 points, all or nothing). The components
//! are kept unrounded. Only the final sum is rounded to 2 decimal places.

use crate::round2;

/// Presence component.
///
/// Counts both on-time arrivals and on-time departures over a month of
/// `total_work_days` days, scaled to 50 points. A month with no work days
/// scores 0 rather than dividing by zero.
pub fn presence_score(present_on_time: u32, leave_on_time: u32, total_work_days: u32) -> f64 {
    if total_work_days == 0 {
        return 0.0;
    }
    let attended = f64::from(present_on_time) + f64::from(leave_on_time);
    attended / (f64::from(total_work_days) * 2.0) * 50.0
}

/// Punctuality component.
///
/// Every cumulated minute of lateness or early leave eats into a base of
/// 100, scaled by 0.35. Floored at zero.
pub fn lateness_score(late_minutes: u32, early_leave_minutes: u32) -> f64 {
    let penalty = f64::from(late_minutes) + f64::from(early_leave_minutes);
    ((100.0 - penalty) * 0.35).max(0.0)
}

/// Permission component: 15 points for staying within the monthly
/// permission allowance, 0 otherwise.
pub fn permission_score(excess_permission_count: u32) -> f64 {
    if excess_permission_count == 0 {
        15.0
    } else {
        0.0
    }
}

/// Total discipline score, rounded to 2 decimal places.
pub fn final_score(score_1: f64, score_2: f64, score_3: f64) -> f64 {
    round2(score_1 + score_2 + score_3)
}
