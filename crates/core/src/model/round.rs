use crate::model::Question;

/// Outcome of scoring one submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub is_correct: bool,
}

/// Mutable per-round progress, owned by a single writer (the presenter).
///
/// `answering_locked` is true exactly while a result is displayed and during
/// the post-answer delay; `current_index` stays below `total` until the round
/// is finalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundState {
    total: u32,
    current_index: u32,
    correct_count: u32,
    active_question: Option<Question>,
    answering_locked: bool,
}

impl RoundState {
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            current_index: 0,
            correct_count: 0,
            active_question: None,
            answering_locked: false,
        }
    }

    /// Start over: index and score to zero, no active question, unlocked.
    pub fn reset(&mut self) {
        self.current_index = 0;
        self.correct_count = 0;
        self.active_question = None;
        self.answering_locked = false;
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.answering_locked
    }

    #[must_use]
    pub fn active_question(&self) -> Option<&Question> {
        self.active_question.as_ref()
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.total
    }

    /// "3/10"-style progress label for the active question.
    #[must_use]
    pub fn progress_label(&self) -> String {
        format!("{}/{}", self.current_index + 1, self.total)
    }

    /// Install the next question to answer.
    pub fn install_question(&mut self, question: Question) {
        self.active_question = Some(question);
    }

    /// Score an answer against the active question.
    ///
    /// Returns `None` (and changes nothing) while locked or without an active
    /// question; this is the guard against double submission during the
    /// result-display window. On success the question is consumed and the
    /// state locks until [`RoundState::advance`].
    pub fn submit_answer(&mut self, choice: bool) -> Option<AnswerOutcome> {
        if self.answering_locked {
            return None;
        }
        let question = self.active_question.take()?;
        let is_correct = choice == question.correct_answer();
        if is_correct {
            self.correct_count += 1;
        }
        self.answering_locked = true;
        Some(AnswerOutcome { is_correct })
    }

    /// Move to the next question after the reveal delay.
    ///
    /// Returns `false` (and stays put) when the round just finished its last
    /// question, so the index never exceeds `total - 1`.
    pub fn advance(&mut self) -> bool {
        if self.is_last_question() {
            return false;
        }
        self.current_index += 1;
        self.answering_locked = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: bool) -> Question {
        Question::new(vec![1, 2, 3], "Is this movie's rating higher than 8.3?", correct)
    }

    #[test]
    fn scores_correct_answer_and_locks() {
        let mut round = RoundState::new(10);
        round.install_question(question(true));
        let outcome = round.submit_answer(true).unwrap();
        assert!(outcome.is_correct);
        assert_eq!(round.correct_count(), 1);
        assert!(round.is_locked());
        assert!(round.active_question().is_none());
    }

    #[test]
    fn second_submission_is_ignored_while_locked() {
        let mut round = RoundState::new(10);
        round.install_question(question(true));
        assert!(round.submit_answer(true).is_some());
        assert!(round.submit_answer(true).is_none());
        assert_eq!(round.correct_count(), 1);
    }

    #[test]
    fn submission_without_question_is_ignored() {
        let mut round = RoundState::new(10);
        assert!(round.submit_answer(false).is_none());
        assert_eq!(round.correct_count(), 0);
        assert!(!round.is_locked());
    }

    #[test]
    fn advance_unlocks_and_stops_at_last_index() {
        let mut round = RoundState::new(3);
        for expected in 1..3 {
            round.install_question(question(false));
            round.submit_answer(false);
            assert!(round.advance());
            assert_eq!(round.current_index(), expected);
            assert!(!round.is_locked());
        }
        round.install_question(question(false));
        round.submit_answer(false);
        assert!(!round.advance());
        assert_eq!(round.current_index(), 2);
    }

    #[test]
    fn progress_label_is_one_based() {
        let mut round = RoundState::new(10);
        assert_eq!(round.progress_label(), "1/10");
        round.install_question(question(true));
        round.submit_answer(true);
        round.advance();
        assert_eq!(round.progress_label(), "2/10");
    }

    #[test]
    fn reset_clears_progress() {
        let mut round = RoundState::new(10);
        round.install_question(question(true));
        round.submit_answer(true);
        round.reset();
        assert_eq!(round.current_index(), 0);
        assert_eq!(round.correct_count(), 0);
        assert!(!round.is_locked());
        assert!(round.active_question().is_none());
    }
}
