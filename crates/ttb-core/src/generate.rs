//! Timetable generation: the cartesian product of activity-groups.
//!
//! Every valid timetable picks exactly one activity from every group, so the
//! candidate space is the cartesian product of all groups across the chosen
//! subjects. That space grows multiplicatively: five subjects with three
//! groups of two offerings each is already 2^15 candidates. Candidates are
//! therefore produced lazily, one at a time, and clash-checked as they are
//! consumed; only the survivors are ever materialized.

use std::cmp::Ordering;

use thiserror::Error;

use crate::filter::{Filter, SortKey};
use crate::subject::{ActivityGroup, Subject};
use crate::timetable::Timetable;

/// Errors from building a [`TimetableList`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The chosen subjects offer no activity-groups to combine.
    #[error("no activity groups to combine")]
    NoActivityGroups,

    /// A list was constructed from an empty candidate set.
    #[error("no candidate timetables supplied")]
    NoCandidates,
}

/// Exact number of candidates the product of these groups will yield, or
/// `None` if it overflows `usize`. Callers should check this before
/// generating: the count is the product of all group sizes and is the
/// dominant cost of a generation run.
pub fn candidate_count(groups: &[&ActivityGroup]) -> Option<usize> {
    groups
        .iter()
        .try_fold(1usize, |product, group| product.checked_mul(group.len()))
}

/// Lazy iterator over the cartesian product of activity-groups.
///
/// Advances a mixed-radix counter over the group sizes, yielding one
/// candidate [`Timetable`] per step. Memory use is bounded by one candidate
/// at a time regardless of how large the product is; dropping and rebuilding
/// the iterator restarts the sequence from the first combination.
///
/// An empty group list, or any empty group, yields no candidates.
#[derive(Debug)]
pub struct Candidates<'a> {
    groups: Vec<&'a ActivityGroup>,
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Candidates<'a> {
    pub fn new(groups: Vec<&'a ActivityGroup>) -> Self {
        let done = groups.is_empty() || groups.iter().any(|g| g.is_empty());
        let indices = vec![0; groups.len()];
        Self {
            groups,
            indices,
            done,
        }
    }

    /// Advances the counter; returns false once every combination is spent.
    fn advance(&mut self) -> bool {
        for (index, group) in self.indices.iter_mut().zip(&self.groups).rev() {
            *index += 1;
            if *index < group.len() {
                return true;
            }
            *index = 0;
        }
        false
    }
}

impl Iterator for Candidates<'_> {
    type Item = Timetable;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let activities = self
            .indices
            .iter()
            .zip(&self.groups)
            .map(|(&index, group)| group.activities()[index].clone())
            .collect();

        if !self.advance() {
            self.done = true;
        }

        Some(Timetable::new(activities))
    }
}

/// The set of clash-free timetables for one generation run.
///
/// Invalid candidates are discarded at construction and never resurface.
/// Filtering is non-destructive; sorting reorders in place.
#[derive(Debug, Clone)]
pub struct TimetableList {
    timetables: Vec<Timetable>,
}

impl TimetableList {
    /// Generates the list for the chosen subjects: flattens their
    /// activity-groups in order, walks the cartesian product lazily, and
    /// keeps only clash-free candidates.
    pub fn build(subjects: &[Subject]) -> Result<Self, GenerateError> {
        let groups: Vec<&ActivityGroup> = subjects
            .iter()
            .flat_map(Subject::activity_groups)
            .collect();
        if groups.is_empty() {
            return Err(GenerateError::NoActivityGroups);
        }

        let candidates = candidate_count(&groups);
        let timetables: Vec<Timetable> = Candidates::new(groups)
            .filter(Timetable::is_valid)
            .collect();
        tracing::debug!(
            candidates = ?candidates,
            valid = timetables.len(),
            "generated timetables"
        );

        Ok(Self { timetables })
    }

    /// Wraps pre-built candidates, keeping only the valid ones. Fails fast
    /// when handed nothing at all; an all-clashing candidate set is fine
    /// and yields an empty list.
    pub fn new(candidates: Vec<Timetable>) -> Result<Self, GenerateError> {
        if candidates.is_empty() {
            return Err(GenerateError::NoCandidates);
        }

        let timetables = candidates.into_iter().filter(Timetable::is_valid).collect();
        Ok(Self { timetables })
    }

    pub fn timetables(&self) -> &[Timetable] {
        &self.timetables
    }

    pub fn len(&self) -> usize {
        self.timetables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timetables.is_empty()
    }

    /// Timetables matching a single filter, in current order.
    pub fn filter(&self, filter: &Filter) -> Vec<&Timetable> {
        self.timetables.iter().filter(|t| filter.matches(t)).collect()
    }

    /// Timetables matching every filter. Conjunction is commutative, so
    /// filter order never changes the result set; no filters keeps
    /// everything.
    pub fn filter_many(&self, filters: &[Filter]) -> Vec<&Timetable> {
        self.timetables
            .iter()
            .filter(|t| filters.iter().all(|f| f.matches(t)))
            .collect()
    }

    /// Sorts in place by the given key, ascending. Ties may reorder.
    pub fn sort(&mut self, key: SortKey) {
        self.sort_by(|a, b| key.compare(a, b));
    }

    /// Sorts in place by an arbitrary comparator.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Timetable, &Timetable) -> Ordering,
    {
        self.timetables.sort_by(|a, b| compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::Activity;
    use crate::subject::Semester;
    use chrono::{NaiveTime, Weekday};

    fn hm(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn session(
        code: &str,
        kind: &str,
        number: &str,
        day: Weekday,
        start: NaiveTime,
        duration: u32,
    ) -> Activity {
        Activity::new(kind, number, day, start, duration, code).unwrap()
    }

    /// One subject: 2 lectures × 3 tutorials, all clash-free.
    fn subject_2x3() -> Subject {
        let mut subject = Subject::new("Data Structures", "31251", Semester::Autumn).unwrap();
        subject.add_activity(session("31251", "Lecture", "1", Weekday::Mon, hm(9, 0), 90));
        subject.add_activity(session("31251", "Lecture", "2", Weekday::Tue, hm(9, 0), 90));
        subject.add_activity(session("31251", "Tutorial", "1", Weekday::Wed, hm(10, 0), 60));
        subject.add_activity(session("31251", "Tutorial", "2", Weekday::Wed, hm(12, 0), 60));
        subject.add_activity(session("31251", "Tutorial", "3", Weekday::Thu, hm(10, 0), 60));
        subject
    }

    /// One subject with a single lecture slot.
    fn subject_1(day: Weekday, start: NaiveTime) -> Subject {
        let mut subject = Subject::new("Networking", "48730", Semester::Autumn).unwrap();
        subject.add_activity(session("48730", "Lecture", "1", day, start, 120));
        subject
    }

    #[test]
    fn candidate_count_is_product_of_group_sizes() {
        let a = subject_2x3(); // groups of 2 and 3
        let b = subject_1(Weekday::Fri, hm(9, 0)); // group of 1
        let groups: Vec<_> = a
            .activity_groups()
            .iter()
            .chain(b.activity_groups())
            .collect();

        assert_eq!(candidate_count(&groups), Some(6));
        assert_eq!(Candidates::new(groups).count(), 6);
    }

    #[test]
    fn candidates_pick_one_per_group() {
        let subject = subject_2x3();
        let groups: Vec<_> = subject.activity_groups().iter().collect();

        for timetable in Candidates::new(groups) {
            assert_eq!(timetable.activities().len(), 2);
            assert_eq!(timetable.activities()[0].kind(), "Lecture");
            assert_eq!(timetable.activities()[1].kind(), "Tutorial");
        }
    }

    #[test]
    fn candidates_restart_from_scratch() {
        let subject = subject_2x3();
        let groups: Vec<_> = subject.activity_groups().iter().collect();

        let first: Vec<_> = Candidates::new(groups.clone()).collect();
        let second: Vec<_> = Candidates::new(groups).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_group_list_yields_nothing() {
        assert_eq!(Candidates::new(Vec::new()).count(), 0);
    }

    #[test]
    fn build_discards_clashing_candidates() {
        // Second subject's only lecture clashes with 31251's Monday lecture,
        // so every candidate using that lecture is dropped.
        let a = subject_2x3();
        let b = subject_1(Weekday::Mon, hm(9, 30)); // 09:30-11:30, clashes 09:00-10:30

        let list = TimetableList::build(&[a, b]).unwrap();
        // 2 × 3 × 1 = 6 candidates; only the Tuesday-lecture half survives.
        assert_eq!(list.len(), 3);
        for timetable in list.timetables() {
            assert!(timetable.is_valid());
            assert_eq!(timetable.activities()[0].day(), Weekday::Tue);
        }
    }

    #[test]
    fn build_without_groups_fails_fast() {
        let empty = Subject::new("Reading Unit", "99999", Semester::Spring).unwrap();
        assert_eq!(
            TimetableList::build(&[empty]).unwrap_err(),
            GenerateError::NoActivityGroups
        );
        assert_eq!(
            TimetableList::build(&[]).unwrap_err(),
            GenerateError::NoActivityGroups
        );
    }

    #[test]
    fn new_rejects_empty_candidate_set() {
        assert_eq!(
            TimetableList::new(Vec::new()).unwrap_err(),
            GenerateError::NoCandidates
        );
    }

    #[test]
    fn new_keeps_only_valid_candidates() {
        let valid = Timetable::new(vec![session(
            "31251",
            "Lecture",
            "1",
            Weekday::Mon,
            hm(9, 0),
            90,
        )]);
        let clashing = Timetable::new(vec![
            session("31251", "Lecture", "1", Weekday::Mon, hm(9, 0), 90),
            session("48730", "Lecture", "1", Weekday::Mon, hm(10, 0), 60),
        ]);

        let list = TimetableList::new(vec![valid, clashing]).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn all_clashing_candidates_yield_an_empty_list() {
        let clashing = Timetable::new(vec![
            session("31251", "Lecture", "1", Weekday::Mon, hm(9, 0), 90),
            session("48730", "Lecture", "1", Weekday::Mon, hm(9, 0), 90),
        ]);
        let list = TimetableList::new(vec![clashing]).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn filter_many_with_no_filters_keeps_everything() {
        let list = TimetableList::build(&[subject_2x3()]).unwrap();
        assert_eq!(list.filter_many(&[]).len(), list.len());
    }

    #[test]
    fn sort_by_hours_ascending_and_reversed_agree() {
        let list = {
            let mut list = TimetableList::build(&[subject_2x3()]).unwrap();
            list.sort(SortKey::HoursOnCampus);
            list
        };
        let hours: Vec<f64> = list
            .timetables()
            .iter()
            .map(Timetable::hours_on_campus)
            .collect();
        assert!(hours.windows(2).all(|pair| pair[0] <= pair[1]));

        // Sorting by the negated comparator equals reversing the ascending order
        let mut descending = list.clone();
        descending.sort_by(|a, b| SortKey::HoursOnCampus.compare(b, a));
        let reversed: Vec<f64> = hours.iter().rev().copied().collect();
        let descending_hours: Vec<f64> = descending
            .timetables()
            .iter()
            .map(Timetable::hours_on_campus)
            .collect();
        assert_eq!(descending_hours, reversed);
    }
}
