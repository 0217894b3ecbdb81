use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::MilestoneId;

/// What kind of relationship event a milestone records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    FirstMet,
    StartedDating,
    MovedIn,
    Engaged,
    Married,
    Travel,
    FamilyEvent,
    Financial,
    Other,
}

impl MilestoneKind {
    pub const ALL: [MilestoneKind; 9] = [
        MilestoneKind::FirstMet,
        MilestoneKind::StartedDating,
        MilestoneKind::MovedIn,
        MilestoneKind::Engaged,
        MilestoneKind::Married,
        MilestoneKind::Travel,
        MilestoneKind::FamilyEvent,
        MilestoneKind::Financial,
        MilestoneKind::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MilestoneKind::FirstMet => "first_met",
            MilestoneKind::StartedDating => "started_dating",
            MilestoneKind::MovedIn => "moved_in",
            MilestoneKind::Engaged => "engaged",
            MilestoneKind::Married => "married",
            MilestoneKind::Travel => "travel",
            MilestoneKind::FamilyEvent => "family_event",
            MilestoneKind::Financial => "financial",
            MilestoneKind::Other => "other",
        }
    }

    /// Kinds that case officers expect to see on a relationship timeline.
    #[must_use]
    pub fn is_key(self) -> bool {
        matches!(
            self,
            MilestoneKind::FirstMet
                | MilestoneKind::StartedDating
                | MilestoneKind::MovedIn
                | MilestoneKind::Engaged
                | MilestoneKind::Married
                | MilestoneKind::Financial
        )
    }
}

impl fmt::Display for MilestoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MilestoneKind {
    type Err = MilestoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        MilestoneKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| MilestoneError::UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MilestoneError {
    #[error("milestone title cannot be empty")]
    EmptyTitle,

    #[error("unknown milestone kind: {0}")]
    UnknownKind(String),
}

/// A dated relationship event on the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    id: MilestoneId,
    date: DateTime<Utc>,
    kind: MilestoneKind,
    title: String,
    description: String,
    location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MilestoneDraft {
    pub date: DateTime<Utc>,
    pub kind: MilestoneKind,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
}

impl MilestoneDraft {
    #[must_use]
    pub fn new(date: DateTime<Utc>, kind: MilestoneKind, title: impl Into<String>) -> Self {
        Self {
            date,
            kind,
            title: title.into(),
            description: String::new(),
            location: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// # Errors
    ///
    /// Returns `MilestoneError::EmptyTitle` if the title is blank after trimming.
    pub fn validate(self, id: MilestoneId) -> Result<Milestone, MilestoneError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(MilestoneError::EmptyTitle);
        }
        let location = self
            .location
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty());

        Ok(Milestone {
            id,
            date: self.date,
            kind: self.kind,
            title,
            description: self.description.trim().to_string(),
            location,
        })
    }
}

impl Milestone {
    #[must_use]
    pub fn id(&self) -> MilestoneId {
        self.id
    }

    #[must_use]
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    #[must_use]
    pub fn kind(&self) -> MilestoneKind {
        self.kind
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn draft_trims_and_drops_blank_location() {
        let m = MilestoneDraft::new(fixed_now(), MilestoneKind::MovedIn, " Moved in ")
            .with_description(" Signed the lease together ")
            .with_location("  ")
            .validate(MilestoneId::generate())
            .unwrap();
        assert_eq!(m.title(), "Moved in");
        assert_eq!(m.description(), "Signed the lease together");
        assert_eq!(m.location(), None);
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = MilestoneDraft::new(fixed_now(), MilestoneKind::Other, "")
            .validate(MilestoneId::generate())
            .unwrap_err();
        assert_eq!(err, MilestoneError::EmptyTitle);
    }

    #[test]
    fn kind_parses_dashes_and_underscores() {
        assert_eq!(
            "first-met".parse::<MilestoneKind>().unwrap(),
            MilestoneKind::FirstMet
        );
        assert_eq!(
            "family_event".parse::<MilestoneKind>().unwrap(),
            MilestoneKind::FamilyEvent
        );
        assert!("honeymoon".parse::<MilestoneKind>().is_err());
    }
}
