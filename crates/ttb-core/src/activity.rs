//! Single class session records and clash detection.

use std::cmp::Ordering;

use chrono::{Duration, NaiveTime, Weekday};
use thiserror::Error;

use crate::clock;

/// Errors from constructing an [`Activity`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActivityError {
    /// A required field was empty.
    #[error("activity {field} cannot be empty")]
    Empty { field: &'static str },

    /// The session has no duration.
    #[error("activity duration must be at least one minute")]
    ZeroDuration,

    /// The session would run past midnight, which the timetable page
    /// never produces.
    #[error("activity starting {start} cannot run for {duration_minutes} minutes without crossing midnight")]
    PastMidnight {
        start: NaiveTime,
        duration_minutes: u32,
    },
}

/// A single class session: one offering of one activity-type on one day.
///
/// Activities are immutable once parsed, with one exception: when the same
/// `(kind, day, start, finish, subject)` slot recurs under a different
/// session number, the numbers are merged into the existing record rather
/// than creating a duplicate (see [`merge_numbers`](Self::merge_numbers)).
///
/// The finish time is derived from start + duration at construction, so
/// `start < finish` and duration consistency hold by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    kind: String,
    numbers: Vec<String>,
    day: Weekday,
    start: NaiveTime,
    finish: NaiveTime,
    duration_minutes: u32,
    subject_code: String,
}

impl Activity {
    /// Creates an activity from one scraped row's worth of data.
    pub fn new(
        kind: impl Into<String>,
        number: impl Into<String>,
        day: Weekday,
        start: NaiveTime,
        duration_minutes: u32,
        subject_code: impl Into<String>,
    ) -> Result<Self, ActivityError> {
        let kind = kind.into();
        let number = number.into();
        let subject_code = subject_code.into();

        if kind.is_empty() {
            return Err(ActivityError::Empty { field: "kind" });
        }
        if number.is_empty() {
            return Err(ActivityError::Empty { field: "number" });
        }
        if subject_code.is_empty() {
            return Err(ActivityError::Empty {
                field: "subject code",
            });
        }
        if duration_minutes == 0 {
            return Err(ActivityError::ZeroDuration);
        }

        let (finish, wrapped) =
            start.overflowing_add_signed(Duration::minutes(i64::from(duration_minutes)));
        if wrapped != 0 {
            return Err(ActivityError::PastMidnight {
                start,
                duration_minutes,
            });
        }

        Ok(Self {
            kind,
            numbers: vec![number],
            day,
            start,
            finish,
            duration_minutes,
            subject_code,
        })
    }

    /// The activity-type tag, e.g. `Lecture`, `Tutorial`, `Laboratory`.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Session identifiers, in first-seen order, without duplicates.
    pub fn numbers(&self) -> &[String] {
        &self.numbers
    }

    pub fn day(&self) -> Weekday {
        self.day
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn finish(&self) -> NaiveTime {
        self.finish
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Code of the owning subject.
    pub fn subject_code(&self) -> &str {
        &self.subject_code
    }

    /// Whether two activities occupy overlapping time on the same day.
    ///
    /// Intervals are half-open: touching endpoints (one session finishing
    /// at 10:30, the next starting at 10:30) do not clash.
    pub fn clashes_with(&self, other: &Self) -> bool {
        self.day == other.day && self.start < other.finish && self.finish > other.start
    }

    /// Whether two activities describe the same session slot, i.e. they are
    /// interchangeable offerings that differ only in session number.
    pub fn matches(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.day == other.day
            && self.start == other.start
            && self.finish == other.finish
            && self.subject_code == other.subject_code
    }

    /// Absorbs session numbers from a duplicate slot. Idempotent: numbers
    /// already present are not added again.
    pub fn merge_numbers(&mut self, numbers: &[String]) {
        for number in numbers {
            if !self.numbers.contains(number) {
                self.numbers.push(number.clone());
            }
        }
    }

    /// Human-readable one-line summary, e.g.
    /// `Mon 09:00-10:30: 31251 Lecture 1,2 (90)`.
    pub fn summary(&self) -> String {
        format!(
            "{} {}-{}: {} {} {} ({})",
            self.day,
            clock::format_hm(self.start),
            clock::format_hm(self.finish),
            self.subject_code,
            self.kind,
            self.numbers.join(","),
            self.duration_minutes,
        )
    }

    /// Orders activities by day of week, then start time.
    pub fn compare(a: &Self, b: &Self) -> Ordering {
        clock::day_index(a.day)
            .cmp(&clock::day_index(b.day))
            .then(a.start.cmp(&b.start))
    }
}
