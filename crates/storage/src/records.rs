//! Persisted JSON shapes.
//!
//! These mirror the domain types so the local store can serialize without
//! leaking storage concerns into the domain layer. Dates are written as
//! RFC 3339 strings by chrono's serde support.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use visa_core::model::{
    CategoryCounts, DocumentCounts, InterviewAnswer, InterviewAnswers, Milestone, MilestoneDraft,
    MilestoneError, MilestoneId, MilestoneKind, ProfileError, ProgressError, ProgressState,
    UserProfile, UserProfileDraft, VisaSubclass,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountsRecord {
    pub completed: u32,
    pub total: u32,
}

impl CountsRecord {
    #[must_use]
    pub fn from_counts(counts: CategoryCounts) -> Self {
        Self {
            completed: counts.completed(),
            total: counts.total(),
        }
    }

    /// # Errors
    ///
    /// Returns `ProgressError` if `completed > total`.
    pub fn into_counts(self) -> Result<CategoryCounts, ProgressError> {
        CategoryCounts::new(self.completed, self.total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentCountsRecord {
    pub required: CountsRecord,
    pub optional: CountsRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub documents: DocumentCountsRecord,
    pub forms: CountsRecord,
    pub timeline: CountsRecord,
    pub interview: CountsRecord,
}

impl ProgressRecord {
    #[must_use]
    pub fn from_state(state: &ProgressState) -> Self {
        Self {
            documents: DocumentCountsRecord {
                required: CountsRecord::from_counts(state.documents.required()),
                optional: CountsRecord::from_counts(state.documents.optional()),
            },
            forms: CountsRecord::from_counts(state.forms),
            timeline: CountsRecord::from_counts(state.timeline),
            interview: CountsRecord::from_counts(state.interview),
        }
    }

    /// # Errors
    ///
    /// Returns `ProgressError` if any counter has `completed > total`.
    pub fn into_state(self) -> Result<ProgressState, ProgressError> {
        Ok(ProgressState {
            documents: DocumentCounts::new(
                self.documents.required.into_counts()?,
                self.documents.optional.into_counts()?,
            ),
            forms: self.forms.into_counts()?,
            timeline: self.timeline.into_counts()?,
            interview: self.interview.into_counts()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneRecord {
    pub id: MilestoneId,
    pub date: DateTime<Utc>,
    pub kind: MilestoneKind,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl MilestoneRecord {
    #[must_use]
    pub fn from_milestone(milestone: &Milestone) -> Self {
        Self {
            id: milestone.id(),
            date: milestone.date(),
            kind: milestone.kind(),
            title: milestone.title().to_owned(),
            description: milestone.description().to_owned(),
            location: milestone.location().map(str::to_owned),
        }
    }

    /// # Errors
    ///
    /// Returns `MilestoneError` if the stored title is blank.
    pub fn into_milestone(self) -> Result<Milestone, MilestoneError> {
        MilestoneDraft {
            date: self.date,
            kind: self.kind,
            title: self.title,
            description: self.description,
            location: self.location,
        }
        .validate(self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub answer: String,
    pub updated_at: DateTime<Utc>,
}

/// Interview answers keyed by question id.
pub type InterviewRecord = BTreeMap<String, AnswerRecord>;

#[must_use]
pub fn interview_record(answers: &InterviewAnswers) -> InterviewRecord {
    answers
        .iter()
        .map(|(id, answer)| {
            (
                id.to_string(),
                AnswerRecord {
                    answer: answer.text.clone(),
                    updated_at: answer.updated_at,
                },
            )
        })
        .collect()
}

#[must_use]
pub fn interview_answers(record: InterviewRecord) -> InterviewAnswers {
    InterviewAnswers::from_persisted(record.into_iter().map(|(id, r)| {
        (
            id,
            InterviewAnswer {
                text: r.answer,
                updated_at: r.updated_at,
            },
        )
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_name: Option<String>,
    pub visa_subclass: VisaSubclass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lodged_on: Option<NaiveDate>,
}

impl UserRecord {
    #[must_use]
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            id: profile.id().to_owned(),
            email: profile.email().to_owned(),
            full_name: profile.full_name().to_owned(),
            partner_name: profile.partner_name().map(str::to_owned),
            visa_subclass: profile.visa_subclass(),
            lodged_on: profile.lodged_on(),
        }
    }

    /// # Errors
    ///
    /// Returns `ProfileError` if the stored fields no longer validate.
    pub fn into_profile(self) -> Result<UserProfile, ProfileError> {
        UserProfileDraft {
            id: self.id,
            email: self.email,
            full_name: self.full_name,
            partner_name: self.partner_name,
            visa_subclass: self.visa_subclass,
            lodged_on: self.lodged_on,
        }
        .validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visa_core::time::fixed_now;

    #[test]
    fn milestone_date_is_written_as_iso_string() {
        let milestone = MilestoneDraft::new(fixed_now(), MilestoneKind::Engaged, "Engaged")
            .validate(MilestoneId::generate())
            .unwrap();
        let json = serde_json::to_value(MilestoneRecord::from_milestone(&milestone)).unwrap();
        assert_eq!(json["date"], "2024-03-01T09:30:00Z");
        assert_eq!(json["kind"], "engaged");
        assert!(json.get("location").is_none());
    }

    #[test]
    fn progress_record_rejects_impossible_counts() {
        let record = ProgressRecord {
            forms: CountsRecord {
                completed: 3,
                total: 2,
            },
            ..ProgressRecord::default()
        };
        assert!(record.into_state().is_err());
    }

    #[test]
    fn visa_subclass_serializes_as_code() {
        let json = serde_json::to_string(&VisaSubclass::Onshore820).unwrap();
        assert_eq!(json, "\"820\"");
    }
}
