//! Generate command: scraped rows in, clash-free timetables out.
//!
//! Implements `ttb generate` with preference flags (--max-days, --days,
//! --start, --finish) and output formats (human-readable, JSON).

use std::fmt::Write;

use anyhow::{Context, Result, anyhow};
use chrono::Weekday;
use serde::Serialize;

use ttb_core::{
    Activity, DaySet, Preferences, RawRow, SortKey, Timetable, TimetableList, clock, parse_rows,
};

/// Parses the rows, generates all valid timetables, applies the preference
/// filters, and prints the result ordered by hours on campus.
pub fn run(rows: &[RawRow], prefs: &Preferences, limit: Option<usize>, json: bool) -> Result<()> {
    let subjects = parse_rows(rows).context("failed to parse timetable rows")?;
    let mut list = TimetableList::build(&subjects).context("failed to generate timetables")?;
    list.sort(SortKey::HoursOnCampus);

    let matching = list.filter_many(&prefs.to_filters());
    let shown = limit.unwrap_or(matching.len()).min(matching.len());

    if json {
        let payload: Vec<JsonTimetable> = matching[..shown]
            .iter()
            .map(|timetable| JsonTimetable::from_timetable(timetable))
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("failed to serialize timetables")?
        );
    } else {
        print!("{}", render_human(&matching[..shown], list.len(), matching.len()));
    }
    Ok(())
}

/// Lowers the generate flags into validated preferences.
pub fn preferences_from_flags(
    max_days: Option<usize>,
    exact: bool,
    days: Option<&[String]>,
    start: Option<&str>,
    finish: Option<&str>,
) -> Result<Preferences> {
    let mut prefs = Preferences::new();

    if let Some(count) = max_days {
        prefs = prefs.number_of_days(count, exact)?;
    }

    if let Some(names) = days {
        let mut parsed = Vec::with_capacity(names.len());
        for name in names {
            let day: Weekday = name
                .parse()
                .map_err(|_| anyhow!("unrecognized day: {name:?}"))?;
            parsed.push(day);
        }
        prefs = prefs.allowed_days(DaySet::from_days(&parsed))?;
    }

    let start = parse_time_flag(start, "--start")?;
    let finish = parse_time_flag(finish, "--finish")?;
    if start.is_some() || finish.is_some() {
        prefs = prefs.time_window(start, finish)?;
    }

    Ok(prefs)
}

fn parse_time_flag(value: Option<&str>, flag: &str) -> Result<Option<chrono::NaiveTime>> {
    value
        .map(|text| {
            clock::parse_hm(text).ok_or_else(|| anyhow!("{flag} expects HH:MM, got {text:?}"))
        })
        .transpose()
}

// ========== Human-Readable Output ==========

/// Formats the shown timetables, one block each, activities in week order.
fn render_human(shown: &[&Timetable], valid: usize, matching: usize) -> String {
    let mut output = String::new();

    if matching == 0 {
        writeln!(
            output,
            "No timetables match the given preferences ({valid} valid)."
        )
        .unwrap();
        return output;
    }

    writeln!(
        output,
        "{matching} of {valid} valid timetables match, showing {}",
        shown.len()
    )
    .unwrap();

    for (position, timetable) in shown.iter().enumerate() {
        let mut ordered = (*timetable).clone();
        ordered.sort();
        writeln!(output).unwrap();
        writeln!(
            output,
            "#{}  {} days, {:.1}h on campus",
            position + 1,
            ordered.days_spanned(),
            ordered.hours_on_campus()
        )
        .unwrap();
        for line in ordered.summaries() {
            writeln!(output, "  {line}").unwrap();
        }
    }

    output
}

// ========== JSON Output ==========

/// One activity with times in the page's HHMM integer encoding.
#[derive(Debug, Serialize)]
struct JsonActivity {
    day: String,
    start: u32,
    finish: u32,
    subject: String,
    kind: String,
    numbers: Vec<String>,
    duration_minutes: u32,
}

impl JsonActivity {
    fn from_activity(activity: &Activity) -> Self {
        Self {
            day: activity.day().to_string(),
            start: clock::hhmm(activity.start()),
            finish: clock::hhmm(activity.finish()),
            subject: activity.subject_code().to_string(),
            kind: activity.kind().to_string(),
            numbers: activity.numbers().to_vec(),
            duration_minutes: activity.duration_minutes(),
        }
    }
}

/// Earliest start and latest finish for one day.
#[derive(Debug, Serialize)]
struct JsonSpan {
    day: String,
    start: u32,
    finish: u32,
    hours: f64,
}

/// One timetable of the result set.
#[derive(Debug, Serialize)]
struct JsonTimetable {
    days: usize,
    hours: f64,
    spans: Vec<JsonSpan>,
    activities: Vec<JsonActivity>,
}

impl JsonTimetable {
    fn from_timetable(timetable: &Timetable) -> Self {
        let mut ordered = timetable.clone();
        ordered.sort();
        Self {
            days: ordered.days_spanned(),
            hours: ordered.hours_on_campus(),
            spans: ordered
                .day_spans()
                .iter()
                .map(|span| JsonSpan {
                    day: span.day.to_string(),
                    start: clock::hhmm(span.start),
                    finish: clock::hhmm(span.finish),
                    hours: span.hours(),
                })
                .collect(),
            activities: ordered
                .activities()
                .iter()
                .map(JsonActivity::from_activity)
                .collect(),
        }
    }
}
