//! The relationship timeline: milestones kept in ascending date order.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{Milestone, MilestoneDraft, MilestoneError, MilestoneId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TimelineError {
    #[error("milestone not found: {0}")]
    NotFound(MilestoneId),

    #[error("milestone already exists: {0}")]
    Duplicate(MilestoneId),

    #[error(transparent)]
    Milestone(#[from] MilestoneError),
}

/// Milestones sorted ascending by date. Equal dates keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    milestones: Vec<Milestone>,
}

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from milestones in any order.
    ///
    /// Later duplicates of an id are dropped; the second value is how many.
    #[must_use]
    pub fn from_milestones(milestones: Vec<Milestone>) -> (Self, usize) {
        let mut timeline = Self::new();
        let mut dropped = 0;
        for milestone in milestones {
            if timeline.insert(milestone).is_err() {
                dropped += 1;
            }
        }
        (timeline, dropped)
    }

    /// # Errors
    ///
    /// Returns `TimelineError::Duplicate` if a milestone with the same id exists.
    pub fn insert(&mut self, milestone: Milestone) -> Result<(), TimelineError> {
        if self.position(milestone.id()).is_some() {
            return Err(TimelineError::Duplicate(milestone.id()));
        }
        self.insert_sorted(milestone);
        Ok(())
    }

    /// Replace a milestone's fields, keeping its id, and re-sort.
    ///
    /// An edited milestone moves behind others sharing its date.
    ///
    /// # Errors
    ///
    /// Returns `TimelineError::NotFound` for an unknown id or
    /// `TimelineError::Milestone` if the draft is invalid. The timeline is
    /// unchanged on error.
    pub fn edit(
        &mut self,
        id: MilestoneId,
        draft: MilestoneDraft,
    ) -> Result<&Milestone, TimelineError> {
        let idx = self.position(id).ok_or(TimelineError::NotFound(id))?;
        let updated = draft.validate(id)?;
        self.milestones.remove(idx);
        let at = self.insert_sorted(updated);
        Ok(&self.milestones[at])
    }

    /// # Errors
    ///
    /// Returns `TimelineError::NotFound` for an unknown id.
    pub fn remove(&mut self, id: MilestoneId) -> Result<Milestone, TimelineError> {
        let idx = self.position(id).ok_or(TimelineError::NotFound(id))?;
        Ok(self.milestones.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: MilestoneId) -> Option<&Milestone> {
        self.milestones.iter().find(|m| m.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Milestone> {
        self.milestones.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Milestone] {
        &self.milestones
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.milestones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.milestones.is_empty()
    }

    /// Dates of the first and last milestones.
    #[must_use]
    pub fn span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.milestones.first()?;
        let last = self.milestones.last()?;
        Some((first.date(), last.date()))
    }

    /// Number of distinct key milestone kinds recorded.
    #[must_use]
    pub fn key_kinds_recorded(&self) -> usize {
        let mut kinds: Vec<_> = self
            .milestones
            .iter()
            .map(Milestone::kind)
            .filter(|k| k.is_key())
            .collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds.dedup();
        kinds.len()
    }

    fn insert_sorted(&mut self, milestone: Milestone) -> usize {
        let at = self
            .milestones
            .partition_point(|m| m.date() <= milestone.date());
        self.milestones.insert(at, milestone);
        at
    }

    fn position(&self, id: MilestoneId) -> Option<usize> {
        self.milestones.iter().position(|m| m.id() == id)
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Milestone;
    type IntoIter = std::slice::Iter<'a, Milestone>;

    fn into_iter(self) -> Self::IntoIter {
        self.milestones.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MilestoneKind;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn milestone(days: i64, title: &str) -> Milestone {
        MilestoneDraft::new(
            fixed_now() + Duration::days(days),
            MilestoneKind::Other,
            title,
        )
        .validate(MilestoneId::generate())
        .unwrap()
    }

    fn assert_sorted(timeline: &Timeline) {
        assert!(
            timeline
                .as_slice()
                .windows(2)
                .all(|w| w[0].date() <= w[1].date())
        );
    }

    fn titles(timeline: &Timeline) -> Vec<&str> {
        timeline.iter().map(Milestone::title).collect()
    }

    #[test]
    fn insert_keeps_ascending_order() {
        let mut timeline = Timeline::new();
        for (days, title) in [(10, "c"), (-5, "a"), (3, "b"), (40, "d")] {
            timeline.insert(milestone(days, title)).unwrap();
            assert_sorted(&timeline);
        }
        assert_eq!(titles(&timeline), vec!["a", "b", "c", "d"]);
        let (first, last) = timeline.span().unwrap();
        assert_eq!(last - first, Duration::days(45));
    }

    #[test]
    fn equal_dates_keep_insertion_order() {
        let mut timeline = Timeline::new();
        timeline.insert(milestone(1, "first")).unwrap();
        timeline.insert(milestone(1, "second")).unwrap();
        timeline.insert(milestone(0, "earlier")).unwrap();
        assert_eq!(titles(&timeline), vec!["earlier", "first", "second"]);
    }

    #[test]
    fn edit_moves_milestone_to_new_date() {
        let mut timeline = Timeline::new();
        let moving = milestone(1, "moving");
        let id = moving.id();
        timeline.insert(moving).unwrap();
        timeline.insert(milestone(5, "anchor")).unwrap();

        let edited = timeline
            .edit(
                id,
                MilestoneDraft::new(
                    fixed_now() + Duration::days(9),
                    MilestoneKind::Travel,
                    "moved",
                ),
            )
            .unwrap();
        assert_eq!(edited.id(), id);
        assert_eq!(edited.kind(), MilestoneKind::Travel);
        assert_eq!(titles(&timeline), vec!["anchor", "moved"]);
        assert_sorted(&timeline);
    }

    #[test]
    fn invalid_edit_leaves_timeline_untouched() {
        let mut timeline = Timeline::new();
        let m = milestone(1, "keep");
        let id = m.id();
        timeline.insert(m).unwrap();
        let before = timeline.clone();

        let err = timeline
            .edit(id, MilestoneDraft::new(fixed_now(), MilestoneKind::Other, " "))
            .unwrap_err();
        assert_eq!(err, TimelineError::Milestone(MilestoneError::EmptyTitle));
        assert_eq!(timeline, before);

        let ghost = MilestoneId::generate();
        assert_eq!(timeline.remove(ghost), Err(TimelineError::NotFound(ghost)));
    }

    #[test]
    fn many_operations_stay_sorted() {
        let mut timeline = Timeline::new();
        let mut ids = Vec::new();
        for i in 0..40_i64 {
            let m = milestone((i * 37) % 23 - 11, &format!("m{i}"));
            ids.push(m.id());
            timeline.insert(m).unwrap();
            if i % 3 == 0 {
                let target = ids[(i as usize * 5) % ids.len()];
                timeline
                    .edit(
                        target,
                        MilestoneDraft::new(
                            fixed_now() + Duration::days((i * 13) % 17 - 8),
                            MilestoneKind::FamilyEvent,
                            format!("edited {i}"),
                        ),
                    )
                    .unwrap();
            }
            assert_sorted(&timeline);
        }
        assert_eq!(timeline.len(), 40);
    }

    #[test]
    fn from_milestones_sorts_and_dedups() {
        let a = milestone(5, "a");
        let b = milestone(-1, "b");
        let (timeline, dropped) = Timeline::from_milestones(vec![a.clone(), b, a]);
        assert_eq!(titles(&timeline), vec!["b", "a"]);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn key_kinds_are_counted_once() {
        let mut timeline = Timeline::new();
        for kind in [
            MilestoneKind::FirstMet,
            MilestoneKind::FirstMet,
            MilestoneKind::Travel,
            MilestoneKind::Married,
        ] {
            timeline
                .insert(
                    MilestoneDraft::new(fixed_now(), kind, "x")
                        .validate(MilestoneId::generate())
                        .unwrap(),
                )
                .unwrap();
        }
        assert_eq!(timeline.key_kinds_recorded(), 2);
    }
}
