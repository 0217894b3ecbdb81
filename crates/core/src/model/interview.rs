use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::CategoryCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterviewTopic {
    HowYouMet,
    Relationship,
    Household,
    Finances,
    Future,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterviewQuestion {
    pub id: &'static str,
    pub topic: InterviewTopic,
    pub prompt: &'static str,
}

/// Practice questions, in the order they are presented.
pub const QUESTION_BANK: &[InterviewQuestion] = &[
    InterviewQuestion {
        id: "met-where",
        topic: InterviewTopic::HowYouMet,
        prompt: "Where and when did you first meet your partner?",
    },
    InterviewQuestion {
        id: "met-first-impression",
        topic: InterviewTopic::HowYouMet,
        prompt: "What was your first impression of each other?",
    },
    InterviewQuestion {
        id: "rel-commitment",
        topic: InterviewTopic::Relationship,
        prompt: "When did you decide to commit to each other exclusively?",
    },
    InterviewQuestion {
        id: "rel-proposal",
        topic: InterviewTopic::Relationship,
        prompt: "Describe the proposal or the decision to marry.",
    },
    InterviewQuestion {
        id: "home-chores",
        topic: InterviewTopic::Household,
        prompt: "How do you share household chores?",
    },
    InterviewQuestion {
        id: "home-routine",
        topic: InterviewTopic::Household,
        prompt: "Describe a typical weekday in your household.",
    },
    InterviewQuestion {
        id: "fin-bills",
        topic: InterviewTopic::Finances,
        prompt: "How do you split rent, bills and other expenses?",
    },
    InterviewQuestion {
        id: "fin-accounts",
        topic: InterviewTopic::Finances,
        prompt: "Which bank accounts or assets do you hold jointly?",
    },
    InterviewQuestion {
        id: "future-plans",
        topic: InterviewTopic::Future,
        prompt: "What are your plans for the next five years together?",
    },
    InterviewQuestion {
        id: "future-family",
        topic: InterviewTopic::Future,
        prompt: "Have you discussed having children or caring for family?",
    },
];

#[must_use]
pub fn find_question(id: &str) -> Option<&'static InterviewQuestion> {
    QUESTION_BANK.iter().find(|q| q.id == id)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InterviewError {
    #[error("unknown interview question: {0}")]
    UnknownQuestion(String),

    #[error("answer cannot be empty")]
    EmptyAnswer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewAnswer {
    pub text: String,
    pub updated_at: DateTime<Utc>,
}

/// Practice answers keyed by question id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterviewAnswers {
    answers: BTreeMap<String, InterviewAnswer>,
}

impl InterviewAnswers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted entries, skipping answers to retired questions
    /// and blank answers.
    #[must_use]
    pub fn from_persisted(entries: impl IntoIterator<Item = (String, InterviewAnswer)>) -> Self {
        let answers = entries
            .into_iter()
            .filter(|(id, answer)| find_question(id).is_some() && !answer.text.trim().is_empty())
            .collect();
        Self { answers }
    }

    /// Store or overwrite the answer to a bank question.
    ///
    /// # Errors
    ///
    /// Returns `InterviewError::UnknownQuestion` if `question_id` is not in the bank
    /// and `InterviewError::EmptyAnswer` for a blank answer.
    pub fn record(
        &mut self,
        question_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<(), InterviewError> {
        let question = find_question(question_id)
            .ok_or_else(|| InterviewError::UnknownQuestion(question_id.to_string()))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(InterviewError::EmptyAnswer);
        }
        self.answers.insert(
            question.id.to_string(),
            InterviewAnswer {
                text: text.to_string(),
                updated_at: now,
            },
        );
        Ok(())
    }

    /// Returns true if an answer was removed.
    pub fn remove(&mut self, question_id: &str) -> bool {
        self.answers.remove(question_id).is_some()
    }

    #[must_use]
    pub fn get(&self, question_id: &str) -> Option<&InterviewAnswer> {
        self.answers.get(question_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InterviewAnswer)> {
        self.answers.iter().map(|(id, answer)| (id.as_str(), answer))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Answered questions against the size of the bank.
    #[must_use]
    pub fn counts(&self) -> CategoryCounts {
        let total = u32::try_from(QUESTION_BANK.len()).unwrap_or(u32::MAX);
        let answered = u32::try_from(self.answers.len())
            .unwrap_or(u32::MAX)
            .min(total);
        CategoryCounts::new(answered, total).unwrap_or_default()
    }
}
