//! Interval fallback policy: which sampling intervals to try for a period.
//!
//! The provider rejects or returns nothing for some (period, interval) pairs
//! (intraday data only reaches back a few weeks, for example), so each
//! period carries an ordered cascade, most preferred first.

use crate::domain::{Interval, Period};

const FIVE_DAYS: &[Interval] = &[
    Interval::FifteenMinutes,
    Interval::ThirtyMinutes,
    Interval::SixtyMinutes,
    Interval::OneHour,
];
const DAILY: &[Interval] = &[Interval::OneDay];
const ONE_YEAR: &[Interval] = &[Interval::OneWeek, Interval::OneDay];
const FIVE_YEARS: &[Interval] = &[Interval::OneMonth, Interval::OneWeek];
const MAX: &[Interval] = &[Interval::ThreeMonths, Interval::OneMonth];

/// Ordered, non-empty candidate intervals for `period`.
pub fn candidate_intervals(period: &Period) -> &'static [Interval] {
    match period {
        Period::FiveDays => FIVE_DAYS,
        Period::OneMonth | Period::ThreeMonths | Period::SixMonths => DAILY,
        Period::OneYear => ONE_YEAR,
        Period::FiveYears => FIVE_YEARS,
        Period::Max => MAX,
        Period::Other(_) => DAILY,
    }
}
