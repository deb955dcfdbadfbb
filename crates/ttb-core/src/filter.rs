//! The filter catalog and sort keys for timetable lists.
//!
//! Filters are validated at construction, so a malformed preference is a
//! caller error surfaced before any timetable is scanned. Evaluation itself
//! is infallible.

use std::cmp::Ordering;

use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock;
use crate::timetable::Timetable;

/// Errors from constructing a [`Filter`] or [`Preferences`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Day count outside the week.
    #[error("day count must be between 1 and 7, got {count}")]
    DayCountOutOfRange { count: usize },

    /// An allowed-days filter with no days allowed matches nothing.
    #[error("allowed day set cannot be empty")]
    NoDaysAllowed,

    /// A time window whose start is after its finish.
    #[error("time window start {start} is after finish {finish}")]
    WindowInverted { start: NaiveTime, finish: NaiveTime },
}

/// Which endpoint a [`Filter::TimeConstraint`] bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Constraint {
    /// No activity may start before the given time.
    Start,
    /// No activity may finish after the given time.
    Finish,
}

/// Set of weekdays, held in Mon..Sun order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySet([bool; 7]);

impl DaySet {
    /// Builds from seven flags in Mon..Sun order.
    pub const fn from_flags(flags: [bool; 7]) -> Self {
        Self(flags)
    }

    pub fn from_days(days: &[Weekday]) -> Self {
        let mut flags = [false; 7];
        for &day in days {
            flags[clock::day_index(day)] = true;
        }
        Self(flags)
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0[clock::day_index(day)]
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&allowed| allowed)
    }
}

/// One timetable predicate plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Bounds the number of distinct days with activities: at most `count`,
    /// or exactly `count` when `exact` is set.
    NumberOfDays { count: usize, exact: bool },

    /// Every day the timetable occupies must be in the allowed set.
    Days { allowed: DaySet },

    /// Bounds one endpoint of every activity, per [`Constraint`].
    TimeConstraint {
        time: NaiveTime,
        constraint: Constraint,
    },
}

impl Filter {
    /// Day-count filter. `count` may be anything from 1 to the full week:
    /// timetables can occupy Saturday and Sunday, so the range is not capped
    /// at the five teaching days.
    pub fn number_of_days(count: usize, exact: bool) -> Result<Self, FilterError> {
        if !(1..=7).contains(&count) {
            return Err(FilterError::DayCountOutOfRange { count });
        }
        Ok(Self::NumberOfDays { count, exact })
    }

    pub fn days(allowed: DaySet) -> Result<Self, FilterError> {
        if allowed.is_empty() {
            return Err(FilterError::NoDaysAllowed);
        }
        Ok(Self::Days { allowed })
    }

    pub fn time_constraint(time: NaiveTime, constraint: Constraint) -> Self {
        Self::TimeConstraint { time, constraint }
    }

    /// Whether the timetable satisfies this filter.
    pub fn matches(&self, timetable: &Timetable) -> bool {
        match self {
            Self::NumberOfDays { count, exact } => {
                let spanned = timetable.days_spanned();
                if *exact {
                    spanned == *count
                } else {
                    spanned <= *count
                }
            }
            Self::Days { allowed } => timetable
                .activities()
                .iter()
                .all(|activity| allowed.contains(activity.day())),
            Self::TimeConstraint { time, constraint } => {
                timetable.activities().iter().all(|activity| {
                    match constraint {
                        Constraint::Start => activity.start() >= *time,
                        Constraint::Finish => activity.finish() <= *time,
                    }
                })
            }
        }
    }
}

/// Comparators for ordering a timetable list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Ascending by total on-campus hours.
    HoursOnCampus,
}

impl SortKey {
    pub fn compare(self, a: &Timetable, b: &Timetable) -> Ordering {
        match self {
            Self::HoursOnCampus => a.hours_on_campus().total_cmp(&b.hours_on_campus()),
        }
    }
}

/// User preferences, as collected from a config file or command line,
/// lowered to the filter catalog by [`to_filters`](Self::to_filters).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    number_of_days: Option<(usize, bool)>,
    allowed_days: Option<DaySet>,
    window_start: Option<NaiveTime>,
    window_finish: Option<NaiveTime>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps (or pins, with `exact`) the number of days on campus. Accepts
    /// 1 through 7, the same range as [`Filter::number_of_days`].
    pub fn number_of_days(mut self, count: usize, exact: bool) -> Result<Self, FilterError> {
        if !(1..=7).contains(&count) {
            return Err(FilterError::DayCountOutOfRange { count });
        }
        self.number_of_days = Some((count, exact));
        Ok(self)
    }

    /// Restricts activities to the given days.
    pub fn allowed_days(mut self, allowed: DaySet) -> Result<Self, FilterError> {
        if allowed.is_empty() {
            return Err(FilterError::NoDaysAllowed);
        }
        self.allowed_days = Some(allowed);
        Ok(self)
    }

    /// Restricts activities to a daily time window. Either bound may be
    /// omitted; when both are given the window must not be inverted.
    pub fn time_window(
        mut self,
        start: Option<NaiveTime>,
        finish: Option<NaiveTime>,
    ) -> Result<Self, FilterError> {
        if let (Some(start), Some(finish)) = (start, finish) {
            if start > finish {
                return Err(FilterError::WindowInverted { start, finish });
            }
        }
        self.window_start = start;
        self.window_finish = finish;
        Ok(self)
    }

    /// Lowers the set preferences into concrete filters, to be AND-ed over
    /// a timetable list.
    pub fn to_filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some((count, exact)) = self.number_of_days {
            filters.push(Filter::NumberOfDays { count, exact });
        }
        if let Some(allowed) = self.allowed_days {
            filters.push(Filter::Days { allowed });
        }
        if let Some(time) = self.window_start {
            filters.push(Filter::TimeConstraint {
                time,
                constraint: Constraint::Start,
            });
        }
        if let Some(time) = self.window_finish {
            filters.push(Filter::TimeConstraint {
                time,
                constraint: Constraint::Finish,
            });
        }
        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::Activity;

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn session(day: Weekday, start: NaiveTime, duration: u32) -> Activity {
        Activity::new("Lecture", "1", day, start, duration, "31251").unwrap()
    }

    fn two_day_timetable() -> Timetable {
        Timetable::new(vec![
            session(Weekday::Mon, hm(9, 0), 90),
            session(Weekday::Wed, hm(14, 0), 120),
        ])
    }

    #[test]
    fn number_of_days_at_most() {
        let filter = Filter::number_of_days(2, false).unwrap();
        assert!(filter.matches(&two_day_timetable()));
        assert!(filter.matches(&Timetable::new(vec![session(Weekday::Mon, hm(9, 0), 60)])));

        let three_days = Timetable::new(vec![
            session(Weekday::Mon, hm(9, 0), 60),
            session(Weekday::Tue, hm(9, 0), 60),
            session(Weekday::Wed, hm(9, 0), 60),
        ]);
        assert!(!filter.matches(&three_days));
    }

    #[test]
    fn number_of_days_exact() {
        let filter = Filter::number_of_days(2, true).unwrap();
        assert!(filter.matches(&two_day_timetable()));
        assert!(!filter.matches(&Timetable::new(vec![session(Weekday::Mon, hm(9, 0), 60)])));
    }

    #[test]
    fn number_of_days_rejects_out_of_range_counts() {
        assert_eq!(
            Filter::number_of_days(0, false),
            Err(FilterError::DayCountOutOfRange { count: 0 })
        );
        assert_eq!(
            Filter::number_of_days(8, true),
            Err(FilterError::DayCountOutOfRange { count: 8 })
        );
    }

    #[test]
    fn number_of_days_covers_the_full_week() {
        // Weekend sessions exist, so 6 and 7 are valid counts
        assert!(Filter::number_of_days(7, false).is_ok());
        assert!(Preferences::new().number_of_days(7, true).is_ok());
    }

    #[test]
    fn days_filter_requires_every_activity_day_allowed() {
        let mon_wed = Filter::days(DaySet::from_days(&[Weekday::Mon, Weekday::Wed])).unwrap();
        assert!(mon_wed.matches(&two_day_timetable()));

        let mon_only = Filter::days(DaySet::from_days(&[Weekday::Mon])).unwrap();
        assert!(!mon_only.matches(&two_day_timetable()));
    }

    #[test]
    fn empty_day_set_is_rejected() {
        assert_eq!(
            Filter::days(DaySet::from_flags([false; 7])),
            Err(FilterError::NoDaysAllowed)
        );
    }

    #[test]
    fn start_constraint_bounds_earliest_activity() {
        let timetable = two_day_timetable(); // earliest start 09:00
        let nine = Filter::time_constraint(hm(9, 0), Constraint::Start);
        let ten = Filter::time_constraint(hm(10, 0), Constraint::Start);
        assert!(nine.matches(&timetable));
        assert!(!ten.matches(&timetable));
    }

    #[test]
    fn finish_constraint_bounds_latest_activity() {
        let timetable = two_day_timetable(); // latest finish 16:00
        let four = Filter::time_constraint(hm(16, 0), Constraint::Finish);
        let three = Filter::time_constraint(hm(15, 0), Constraint::Finish);
        assert!(four.matches(&timetable));
        assert!(!three.matches(&timetable));
    }

    #[test]
    fn preferences_lower_to_filters_in_order() {
        let prefs = Preferences::new()
            .number_of_days(3, false)
            .unwrap()
            .allowed_days(DaySet::from_days(&[Weekday::Mon, Weekday::Tue]))
            .unwrap()
            .time_window(Some(hm(9, 0)), Some(hm(17, 0)))
            .unwrap();

        let filters = prefs.to_filters();
        assert_eq!(filters.len(), 4);
        assert_eq!(
            filters[0],
            Filter::NumberOfDays {
                count: 3,
                exact: false
            }
        );
        assert!(matches!(filters[1], Filter::Days { .. }));
        assert!(matches!(
            filters[2],
            Filter::TimeConstraint {
                constraint: Constraint::Start,
                ..
            }
        ));
        assert!(matches!(
            filters[3],
            Filter::TimeConstraint {
                constraint: Constraint::Finish,
                ..
            }
        ));
    }

    #[test]
    fn empty_preferences_lower_to_no_filters() {
        assert!(Preferences::new().to_filters().is_empty());
    }

    #[test]
    fn inverted_window_is_rejected() {
        assert_eq!(
            Preferences::new().time_window(Some(hm(17, 0)), Some(hm(9, 0))),
            Err(FilterError::WindowInverted {
                start: hm(17, 0),
                finish: hm(9, 0)
            })
        );
    }

    #[test]
    fn half_open_window_needs_only_one_bound() {
        let prefs = Preferences::new()
            .time_window(None, Some(hm(15, 0)))
            .unwrap();
        assert_eq!(prefs.to_filters().len(), 1);
    }

    #[test]
    fn sort_key_orders_by_hours() {
        let short = Timetable::new(vec![session(Weekday::Mon, hm(9, 0), 60)]);
        let long = two_day_timetable();
        assert_eq!(
            SortKey::HoursOnCampus.compare(&short, &long),
            Ordering::Less
        );
    }
}
