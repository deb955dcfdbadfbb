//! Raw scraped rows → subjects with activities.
//!
//! The scraper hands the engine an ordered sequence of [`RawRow`] records
//! lifted from the timetable page's table. Each row is either a subject
//! header (it carries a subject link), an activity row (its `bgcolor`
//! attribute is the activity marker), or page furniture that is skipped.
//! Activity rows attach to the most recently seen subject.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::{Activity, ActivityError};
use crate::clock;
use crate::subject::{Semester, Subject, SubjectError};

/// `bgcolor` value that marks an activity row on the timetable page.
pub const ACTIVITY_ROW_MARKER: &str = "#EEEEEE";

/// Cells an activity row must carry: kind, session number, day, start,
/// duration.
const ACTIVITY_CELLS: usize = 5;

/// Substring in a subject link that marks the autumn semester.
const AUTUMN_MARKER: &str = "AUT";

/// Activity kinds (3-letter lowercase prefixes) that are administrative
/// markers, not real sessions: dropped and to-be-assigned placeholders.
const SKIPPED_KIND_PREFIXES: [&str; 2] = ["ups", "drp"];

/// One table row as scraped from the timetable page.
///
/// This is the hand-off format between the scraper and the engine; the
/// engine never sees HTML. Fields it does not recognize simply stay unset,
/// which classifies the row as ignorable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    /// Subject link href. Presence marks a subject header row; the link
    /// carries the subject code and semester marker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Bold header text, e.g. `- Data Structures and Algorithms`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,

    /// Row `bgcolor` attribute. [`ACTIVITY_ROW_MARKER`] marks an activity row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bgcolor: Option<String>,

    /// Cell texts in document order. For activity rows:
    /// kind, session number, day, `HH:MM` start, duration in minutes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<String>,
}

impl RawRow {
    fn is_subject_header(&self) -> bool {
        self.link.is_some()
    }

    fn is_activity(&self) -> bool {
        self.bgcolor.as_deref() == Some(ACTIVITY_ROW_MARKER)
    }
}

/// A row that should have been parseable was not. Aborts the whole batch;
/// the page layout has changed or the scrape was truncated.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A subject header row is missing a required piece.
    #[error("row {row}: subject header is missing {field}")]
    MissingHeaderField { row: usize, field: &'static str },

    /// An activity row has too few cells.
    #[error("row {row}: activity row has {found} cells, expected {ACTIVITY_CELLS}")]
    TooFewCells { row: usize, found: usize },

    /// An activity row appeared before any subject header.
    #[error("row {row}: activity row before any subject header")]
    ActivityBeforeSubject { row: usize },

    /// A cell could not be interpreted.
    #[error("row {row}: invalid {field}: {value:?}")]
    InvalidField {
        row: usize,
        field: &'static str,
        value: String,
    },

    /// The row's values do not form a well-formed activity.
    #[error("row {row}: {source}")]
    Activity {
        row: usize,
        #[source]
        source: ActivityError,
    },

    /// The row's values do not form a well-formed subject.
    #[error("row {row}: {source}")]
    Subject {
        row: usize,
        #[source]
        source: SubjectError,
    },
}

/// Parses scraped rows into subjects, in page order.
///
/// Header and activity rows must be well-formed; anything else is silently
/// skipped. Administrative activity kinds ([`SKIPPED_KIND_PREFIXES`]) never
/// become activities.
pub fn parse_rows(rows: &[RawRow]) -> Result<Vec<Subject>, ParseError> {
    let mut subjects: Vec<Subject> = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        if row.is_subject_header() {
            let subject = subject_from_header(index, row)?;
            tracing::debug!(
                code = subject.code(),
                semester = %subject.semester(),
                "parsed subject header"
            );
            subjects.push(subject);
        } else if row.is_activity() {
            let Some(subject) = subjects.last_mut() else {
                return Err(ParseError::ActivityBeforeSubject { row: index });
            };
            if let Some(activity) = activity_from_row(index, row, subject.code())? {
                subject.add_activity(activity);
            }
        }
        // Anything else is page furniture (column headers, separators).
    }

    Ok(subjects)
}

fn subject_from_header(index: usize, row: &RawRow) -> Result<Subject, ParseError> {
    let link = row.link.as_deref().unwrap_or_default();
    let heading = row
        .heading
        .as_deref()
        .ok_or(ParseError::MissingHeaderField {
            row: index,
            field: "heading",
        })?;

    // Headings look like "- Data Structures and Algorithms".
    let name = heading.trim_start_matches('-').trim();
    let code = first_digit_run(link).ok_or(ParseError::MissingHeaderField {
        row: index,
        field: "subject code",
    })?;
    let semester = if link.contains(AUTUMN_MARKER) {
        Semester::Autumn
    } else {
        Semester::Spring
    };

    Subject::new(name, code, semester).map_err(|source| ParseError::Subject { row: index, source })
}

/// Builds an activity from a row, or `None` for administrative kinds.
fn activity_from_row(
    index: usize,
    row: &RawRow,
    subject_code: &str,
) -> Result<Option<Activity>, ParseError> {
    if row.cells.len() < ACTIVITY_CELLS {
        return Err(ParseError::TooFewCells {
            row: index,
            found: row.cells.len(),
        });
    }

    let kind = row.cells[0].trim();
    let number = row.cells[1].trim();
    let day_text = row.cells[2].trim();
    let start_text = row.cells[3].trim();
    let duration_text = row.cells[4].trim();

    if is_skipped_kind(kind) {
        return Ok(None);
    }

    let day = day_text
        .parse::<chrono::Weekday>()
        .map_err(|_| ParseError::InvalidField {
            row: index,
            field: "day",
            value: day_text.to_string(),
        })?;
    let start = clock::parse_hm(start_text).ok_or_else(|| ParseError::InvalidField {
        row: index,
        field: "start time",
        value: start_text.to_string(),
    })?;
    let duration_minutes =
        duration_text
            .parse::<u32>()
            .map_err(|_| ParseError::InvalidField {
                row: index,
                field: "duration",
                value: duration_text.to_string(),
            })?;

    Activity::new(kind, number, day, start, duration_minutes, subject_code)
        .map(Some)
        .map_err(|source| ParseError::Activity { row: index, source })
}

fn is_skipped_kind(kind: &str) -> bool {
    let prefix: String = kind.chars().take(3).collect::<String>().to_lowercase();
    SKIPPED_KIND_PREFIXES.contains(&prefix.as_str())
}

/// First contiguous run of ASCII digits in the text, if any.
fn first_digit_run(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(heading: &str, link: &str) -> RawRow {
        RawRow {
            link: Some(link.to_string()),
            heading: Some(heading.to_string()),
            ..RawRow::default()
        }
    }

    fn activity(cells: &[&str]) -> RawRow {
        RawRow {
            bgcolor: Some(ACTIVITY_ROW_MARKER.to_string()),
            cells: cells.iter().map(ToString::to_string).collect(),
            ..RawRow::default()
        }
    }

    fn furniture() -> RawRow {
        RawRow {
            cells: vec!["Activity".to_string(), "Day".to_string()],
            ..RawRow::default()
        }
    }

    #[test]
    fn parses_subjects_with_activities() {
        let rows = vec![
            furniture(),
            header(
                "- Data Structures",
                "aptimetable?fun=unit_display&unit=31251_AUT_U",
            ),
            activity(&["Lecture", "1", "Mon", "09:00", "90"]),
            activity(&["Tutorial", "1", "Tue", "13:00", "60"]),
            header(
                "- Applications Programming",
                "aptimetable?fun=unit_display&unit=48024_SPR_U",
            ),
            activity(&["Lecture", "1", "Wed", "10:00", "120"]),
        ];

        let subjects = parse_rows(&rows).unwrap();
        assert_eq!(subjects.len(), 2);

        assert_eq!(subjects[0].name(), "Data Structures");
        assert_eq!(subjects[0].code(), "31251");
        assert_eq!(subjects[0].semester(), Semester::Autumn);
        assert_eq!(subjects[0].activity_groups().len(), 2);

        assert_eq!(subjects[1].code(), "48024");
        assert_eq!(subjects[1].semester(), Semester::Spring);
        assert_eq!(subjects[1].activity_groups().len(), 1);
    }

    #[test]
    fn duplicate_slots_merge_during_parse() {
        let rows = vec![
            header("- Data Structures", "unit=31251_AUT_U"),
            activity(&["Tutorial", "1", "Mon", "13:00", "60"]),
            activity(&["Tutorial", "5", "Mon", "13:00", "60"]),
        ];

        let subjects = parse_rows(&rows).unwrap();
        let group = &subjects[0].activity_groups()[0];
        assert_eq!(group.len(), 1);
        assert_eq!(group.activities()[0].numbers(), ["1", "5"]);
    }

    #[test]
    fn administrative_kinds_are_skipped() {
        let rows = vec![
            header("- Data Structures", "unit=31251_AUT_U"),
            activity(&["UPS Class", "1", "Mon", "09:00", "60"]),
            activity(&["Drp", "1", "Mon", "09:00", "60"]),
            activity(&["Lecture", "1", "Mon", "10:00", "60"]),
        ];

        let subjects = parse_rows(&rows).unwrap();
        assert_eq!(subjects[0].activity_groups().len(), 1);
        assert_eq!(subjects[0].activity_groups()[0].kind(), "Lecture");
    }

    #[test]
    fn activity_before_header_is_an_error() {
        let rows = vec![activity(&["Lecture", "1", "Mon", "09:00", "60"])];
        assert!(matches!(
            parse_rows(&rows),
            Err(ParseError::ActivityBeforeSubject { row: 0 })
        ));
    }

    #[test]
    fn malformed_rows_abort_the_batch() {
        let missing_cells = vec![
            header("- Data Structures", "unit=31251_AUT_U"),
            activity(&["Lecture", "1", "Mon"]),
        ];
        assert!(matches!(
            parse_rows(&missing_cells),
            Err(ParseError::TooFewCells { row: 1, found: 3 })
        ));

        let bad_day = vec![
            header("- Data Structures", "unit=31251_AUT_U"),
            activity(&["Lecture", "1", "Someday", "09:00", "60"]),
        ];
        assert!(matches!(
            parse_rows(&bad_day),
            Err(ParseError::InvalidField { field: "day", .. })
        ));

        let codeless_header = vec![header("- Data Structures", "unit=???")];
        assert!(matches!(
            parse_rows(&codeless_header),
            Err(ParseError::MissingHeaderField {
                field: "subject code",
                ..
            })
        ));
    }

    #[test]
    fn furniture_rows_are_ignored() {
        let rows = vec![furniture(), furniture()];
        assert!(parse_rows(&rows).unwrap().is_empty());
    }

    #[test]
    fn raw_row_json_roundtrip() {
        let row = activity(&["Lecture", "1", "Mon", "09:00", "90"]);
        let json = serde_json::to_string(&row).unwrap();
        assert!(!json.contains("link"), "unset fields stay out of the JSON");
        let parsed: RawRow = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, row);
    }

    #[test]
    fn first_digit_run_finds_subject_codes() {
        assert_eq!(first_digit_run("unit=31251_AUT_U"), Some("31251"));
        assert_eq!(first_digit_run("no digits"), None);
    }
}
