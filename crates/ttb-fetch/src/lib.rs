//! Timetable page access for the timetable builder.
//!
//! Talks to the university's legacy timetable endpoint and turns its HTML
//! into the row records the engine consumes:
//! - Flat timetable download for a set of enrolled subjects
//! - Subject catalogue download, sharded by subject-code prefix
//!
//! All HTML handling lives in pure helpers so it can be tested without a
//! network.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ttb_core::RawRow;

/// Default request timeout for timetable page calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum entries the subject select endpoint returns in one response.
/// A full page means the shard was truncated and must be split further.
const PAGE_LIMIT: usize = 400;

/// Fetch client errors.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provided base URL was unusable.
    #[error("invalid base URL: {reason}")]
    InvalidBaseUrl { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("timetable endpoint returned status {status}")]
    Status { status: reqwest::StatusCode },
    /// A subject shard came back with no entries at all. The endpoint
    /// always includes at least a placeholder option, so an empty shard
    /// means the page layout changed.
    #[error("subject shard {prefix:?} returned no entries")]
    EmptyShard { prefix: String },
}

/// One entry of the downloaded subject catalogue, e.g.
/// `{ "value": "31251_AUT_U", "name": "31251: Data Structures" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectEntry {
    /// Enrolment value as posted back to the timetable form.
    pub value: String,
    /// Display name, normalized to `<code>: <name>`.
    pub name: String,
}

/// Timetable endpoint client.
///
/// Safe to clone and share; clones reuse the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Creates a client for the given timetable endpoint, e.g.
    /// `https://mysubjects.uts.edu.au/aplus2015/aptimetable`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is empty or not HTTP(S), or if the HTTP
    /// client fails to build.
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let base_url = base_url.into();

        if base_url.trim().is_empty() {
            return Err(FetchError::InvalidBaseUrl {
                reason: "base URL cannot be empty",
            });
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(FetchError::InvalidBaseUrl {
                reason: "base URL must be http or https",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self { http, base_url })
    }

    /// Downloads the flat timetable for the given enrolment values and
    /// extracts its table rows.
    ///
    /// No retry is attempted; the caller decides how to handle failure.
    pub async fn fetch_rows(&self, enrolments: &[String]) -> Result<Vec<RawRow>, FetchError> {
        let body = enrolments.iter().fold(
            "student_set=".to_string(),
            |body, value| body + "&assigned=" + value,
        );
        let html = self
            .post_form("unit_select&flat_timetable=yes", body)
            .await?;

        let rows = rows_from_html(&html);
        tracing::debug!(enrolments = enrolments.len(), rows = rows.len(), "fetched timetable rows");
        Ok(rows)
    }

    /// Downloads the full subject catalogue.
    ///
    /// The endpoint caps each response at [`PAGE_LIMIT`] entries, so the
    /// catalogue is fetched in subject-code-prefix shards starting from the
    /// ten single digits. A full shard is split by appending the next digit
    /// of its last entry's code; entries the deeper shards will re-deliver
    /// are dropped before the split. The result is deduplicated and sorted
    /// by enrolment value.
    pub async fn fetch_subject_list(&self) -> Result<Vec<SubjectEntry>, FetchError> {
        let mut pending: Vec<String> = (0..=9).map(|digit| digit.to_string()).collect();
        let mut collected = Vec::new();

        while let Some(prefix) = pending.pop() {
            let mut entries = self.fetch_subject_shard(&prefix).await?;
            tracing::debug!(prefix = %prefix, entries = entries.len(), "fetched subject shard");

            if entries.len() == PAGE_LIMIT {
                let last = entries.pop().unwrap_or_default();
                if let Some(deeper) = deeper_prefixes(&prefix, &code_of(&last.0)) {
                    let overlap = &deeper[0];
                    entries.retain(|(value, _)| !value.starts_with(overlap.as_str()));
                    pending.extend(deeper);
                }
            }

            collected.extend(entries);
        }

        Ok(consolidate(collected))
    }

    /// Fetches one prefix shard of the subject select list, skipping the
    /// leading placeholder option.
    async fn fetch_subject_shard(
        &self,
        prefix: &str,
    ) -> Result<Vec<(String, String)>, FetchError> {
        let body = format!("filter={prefix}&filter_name=&faculty=ALL");
        let html = self.post_form("unit_select", body).await?;

        let mut options = options_from_html(&html);
        if options.is_empty() {
            return Err(FetchError::EmptyShard {
                prefix: prefix.to_string(),
            });
        }
        options.remove(0);
        Ok(options)
    }

    async fn post_form(&self, fun: &str, body: String) -> Result<String, FetchError> {
        let url = format!("{}?fun={fun}", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }
        Ok(response.text().await?)
    }
}

static ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b([^>]*)>(.*?)</tr>").expect("static pattern"));
static BGCOLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)bgcolor\s*=\s*["']([^"']+)["']"#).expect("static pattern"));
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<a\b[^>]*href\s*=\s*["']([^"']+)["']"#).expect("static pattern"));
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<strong[^>]*>(.*?)</strong>").expect("static pattern"));
static CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p[^>]*>(.*?)</p>").expect("static pattern"));
static OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<option\b[^>]*value\s*=\s*["']([^"']*)["'][^>]*>(.*?)</option>"#)
        .expect("static pattern")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("static pattern"));

/// Extracts the timetable page's `<tr>` rows as raw row records.
///
/// Only the attributes the engine classifies on are lifted: the row's
/// `bgcolor`, the first link href, the bold heading, and the `<p>` cell
/// texts in document order.
pub fn rows_from_html(html: &str) -> Vec<RawRow> {
    ROW_RE
        .captures_iter(html)
        .map(|row| {
            let attrs = &row[1];
            let inner = &row[2];
            RawRow {
                link: LINK_RE.captures(inner).map(|c| c[1].to_string()),
                heading: HEADING_RE
                    .captures(inner)
                    .map(|c| clean_text(&c[1])),
                bgcolor: BGCOLOR_RE.captures(attrs).map(|c| c[1].to_string()),
                cells: CELL_RE
                    .captures_iter(inner)
                    .map(|c| clean_text(&c[1]))
                    .collect(),
            }
        })
        .collect()
}

/// Extracts `(value, text)` pairs from the subject select's options.
pub fn options_from_html(html: &str) -> Vec<(String, String)> {
    OPTION_RE
        .captures_iter(html)
        .map(|c| (c[1].to_string(), clean_text(&c[2])))
        .collect()
}

/// Strips nested tags and decodes the handful of entities the page uses.
fn clean_text(fragment: &str) -> String {
    TAG_RE
        .replace_all(fragment, "")
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Leading digit run of an enrolment value, i.e. the subject code.
fn code_of(value: &str) -> String {
    value
        .chars()
        .take_while(char::is_ascii_digit)
        .collect()
}

/// Prefixes covering the rest of a truncated shard: the prefix extended by
/// the next digit of the last delivered code, through `9`. `None` when the
/// code does not extend the prefix by a digit.
fn deeper_prefixes(prefix: &str, last_code: &str) -> Option<Vec<String>> {
    let next = last_code
        .chars()
        .nth(prefix.len())
        .and_then(|c| c.to_digit(10))?;
    Some((next..=9).map(|digit| format!("{prefix}{digit}")).collect())
}

/// Deduplicates by enrolment value, normalizes names to `<code>: <name>`,
/// and sorts by enrolment value.
fn consolidate(entries: Vec<(String, String)>) -> Vec<SubjectEntry> {
    let mut seen = HashSet::new();
    let mut subjects: Vec<SubjectEntry> = entries
        .into_iter()
        .filter(|(value, _)| seen.insert(value.clone()))
        .map(|(value, text)| {
            let code = code_of(&value);
            // Option text looks like "31251_AUT_U: Data Structures".
            let name = text.split_once(": ").map_or(text.as_str(), |(_, name)| name);
            SubjectEntry {
                name: format!("{code}: {}", name.trim()),
                value,
            }
        })
        .collect();
    subjects.sort_by(|a, b| a.value.cmp(&b.value));
    subjects
}
