//! Core domain logic for the timetable builder.
//!
//! This crate contains the fundamental types and logic for:
//! - Parsing: turning scraped timetable rows into subjects and activities
//! - Generation: the lazy cartesian product of activity-groups
//! - Filtering and sorting: the user-preference filter catalog

pub mod clock;

mod activity;
mod filter;
mod generate;
mod parse;
mod subject;
mod timetable;

pub use activity::{Activity, ActivityError};
pub use filter::{Constraint, DaySet, Filter, FilterError, Preferences, SortKey};
pub use generate::{Candidates, GenerateError, TimetableList, candidate_count};
pub use parse::{ParseError, RawRow, parse_rows};
pub use subject::{ActivityGroup, Semester, Subject, SubjectError};
pub use timetable::{DaySpan, Timetable};
