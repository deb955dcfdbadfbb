//! Subjects and their activity-groups.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::Activity;

/// Errors from constructing a [`Subject`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubjectError {
    /// A required field was empty.
    #[error("subject {field} cannot be empty")]
    Empty { field: &'static str },
}

/// Teaching semester a subject runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Semester {
    Autumn,
    Spring,
}

impl Semester {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Autumn => "autumn",
            Self::Spring => "spring",
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The interchangeable session offerings of one activity-type for one
/// subject (e.g. all Tutorial sections of 31251). Exactly one member must
/// be chosen per group to form a timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityGroup {
    kind: String,
    activities: Vec<Activity>,
}

impl ActivityGroup {
    fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            activities: Vec::new(),
        }
    }

    /// The activity-type tag shared by every member.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

/// A university subject: a name, a numeric code, a semester, and the
/// activities it offers, grouped by activity-type in first-seen order.
///
/// A subject exclusively owns its activities. It is mutated only during the
/// parse phase (activities appended or merged); afterwards it is read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    name: String,
    code: String,
    semester: Semester,
    groups: Vec<ActivityGroup>,
}

impl Subject {
    /// Creates an empty subject from a parsed header row.
    pub fn new(
        name: impl Into<String>,
        code: impl Into<String>,
        semester: Semester,
    ) -> Result<Self, SubjectError> {
        let name = name.into();
        let code = code.into();

        if name.is_empty() {
            return Err(SubjectError::Empty { field: "name" });
        }
        if code.is_empty() {
            return Err(SubjectError::Empty { field: "code" });
        }

        Ok(Self {
            name,
            code,
            semester,
            groups: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The numeric subject code, e.g. `31251`.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn semester(&self) -> Semester {
        self.semester
    }

    /// Activity-groups in the order their first session was seen.
    pub fn activity_groups(&self) -> &[ActivityGroup] {
        &self.groups
    }

    /// Files an activity under the group for its kind, creating the group
    /// on first sight.
    ///
    /// If the group already holds an activity for the same session slot
    /// (same kind, day, start, finish, subject), the new session numbers are
    /// merged into it instead of appending a duplicate. Genuinely distinct
    /// time-slots stay separate group members.
    pub fn add_activity(&mut self, activity: Activity) {
        let group = match self.groups.iter_mut().find(|g| g.kind == activity.kind()) {
            Some(group) => group,
            None => {
                self.groups.push(ActivityGroup::new(activity.kind()));
                self.groups.last_mut().expect("group was just pushed")
            }
        };

        if let Some(existing) = group.activities.iter_mut().find(|a| a.matches(&activity)) {
            existing.merge_numbers(activity.numbers());
        } else {
            group.activities.push(activity);
        }
    }
}
