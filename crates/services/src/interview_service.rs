use log::info;
use storage::LocalStore;
use visa_core::Clock;
use visa_core::model::interview::{InterviewQuestion, QUESTION_BANK};
use visa_core::model::{CategoryCounts, InterviewAnswers};

use crate::error::InterviewServiceError;

/// Practice answers for the interview question bank.
pub struct InterviewService {
    store: LocalStore,
    clock: Clock,
    answers: InterviewAnswers,
}

impl InterviewService {
    /// # Errors
    ///
    /// Returns `InterviewServiceError::Storage` if the store cannot be read.
    pub async fn load(store: LocalStore, clock: Clock) -> Result<Self, InterviewServiceError> {
        let answers = store.load_interview().await?;
        Ok(Self {
            store,
            clock,
            answers,
        })
    }

    /// Store or overwrite an answer.
    ///
    /// # Errors
    ///
    /// Returns `InterviewServiceError::Interview` for an unknown question or
    /// blank answer, or `InterviewServiceError::Storage` if the save fails.
    pub async fn answer(&mut self, question_id: &str, text: &str) -> Result<(), InterviewServiceError> {
        let mut next = self.answers.clone();
        next.record(question_id, text, self.clock.now())?;
        self.store.save_interview(&next).await?;
        self.answers = next;
        info!(
            "event=interview_answered question={question_id} answered={}",
            self.answers.len()
        );
        Ok(())
    }

    /// Returns true if an answer was removed.
    ///
    /// # Errors
    ///
    /// Returns `InterviewServiceError::Storage` if the save fails.
    pub async fn clear_answer(&mut self, question_id: &str) -> Result<bool, InterviewServiceError> {
        let mut next = self.answers.clone();
        if !next.remove(question_id) {
            return Ok(false);
        }
        self.store.save_interview(&next).await?;
        self.answers = next;
        Ok(true)
    }

    #[must_use]
    pub fn answers(&self) -> &InterviewAnswers {
        &self.answers
    }

    #[must_use]
    pub fn counts(&self) -> CategoryCounts {
        self.answers.counts()
    }

    /// Bank questions still without an answer, in presentation order.
    pub fn unanswered(&self) -> impl Iterator<Item = &'static InterviewQuestion> + '_ {
        QUESTION_BANK
            .iter()
            .filter(|q| self.answers.get(q.id).is_none())
    }
}
