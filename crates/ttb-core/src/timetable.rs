//! Candidate timetables and their derived metrics.

use chrono::{NaiveTime, Weekday};

use crate::activity::Activity;
use crate::clock;

/// Earliest start and latest finish across one day's activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySpan {
    pub day: Weekday,
    pub start: NaiveTime,
    pub finish: NaiveTime,
}

impl DaySpan {
    /// Length of the span in fractional hours.
    pub fn hours(&self) -> f64 {
        clock::hours_between(self.start, self.finish)
    }
}

/// One candidate timetable: an ordered selection of activities, exactly one
/// per activity-group across the chosen subjects.
///
/// Immutable once constructed except for [`sort`](Self::sort), which only
/// reorders the activity sequence for presentation. All metrics are derived
/// on demand; nothing is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timetable {
    activities: Vec<Activity>,
}

impl Timetable {
    pub fn new(activities: Vec<Activity>) -> Self {
        Self { activities }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Whether no two activities on the same day overlap.
    ///
    /// Walks the activities once, bucketing accepted ones by day and
    /// scanning the bucket for a clash before accepting the next. Quadratic
    /// per day in the worst case, but day buckets hold only a handful of
    /// sessions.
    pub fn is_valid(&self) -> bool {
        let mut accepted: [Vec<&Activity>; 7] = std::array::from_fn(|_| Vec::new());

        for activity in &self.activities {
            let bucket = &mut accepted[clock::day_index(activity.day())];
            if bucket.iter().any(|other| activity.clashes_with(other)) {
                return false;
            }
            bucket.push(activity);
        }

        true
    }

    /// Per-day earliest start and latest finish, in Mon..Sun order.
    pub fn day_spans(&self) -> Vec<DaySpan> {
        let mut spans: [Option<(NaiveTime, NaiveTime)>; 7] = [None; 7];

        for activity in &self.activities {
            let slot = &mut spans[clock::day_index(activity.day())];
            *slot = match *slot {
                None => Some((activity.start(), activity.finish())),
                Some((start, finish)) => Some((
                    start.min(activity.start()),
                    finish.max(activity.finish()),
                )),
            };
        }

        const WEEK: [Weekday; 7] = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        WEEK.iter()
            .zip(spans)
            .filter_map(|(&day, span)| span.map(|(start, finish)| DaySpan { day, start, finish }))
            .collect()
    }

    /// Number of distinct days with at least one activity.
    pub fn days_spanned(&self) -> usize {
        self.day_spans().len()
    }

    /// Total hours on campus: per day, latest finish minus earliest start,
    /// summed across days.
    pub fn hours_on_campus(&self) -> f64 {
        self.day_spans().iter().map(DaySpan::hours).sum()
    }

    /// Reorders activities by day of week, then start time. Presentation
    /// only; validity and metrics are unaffected.
    pub fn sort(&mut self) {
        self.activities.sort_by(Activity::compare);
    }

    /// One summary line per activity, in current order.
    pub fn summaries(&self) -> Vec<String> {
        self.activities.iter().map(Activity::summary).collect()
    }
}
