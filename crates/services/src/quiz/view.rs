//! View models and events exchanged with the display collaborator.

/// What the display needs to render one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub image: Vec<u8>,
    pub prompt: String,
    /// One-based progress label, e.g. "3/10".
    pub progress: String,
}

/// End-of-round alert content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummaryView {
    pub title: String,
    pub message: String,
    pub button_label: String,
}

/// Events the presenter emits to its display collaborator.
///
/// The display never mutates round state; it renders these and feeds user
/// input back as [`QuizCommand`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    ShowLoading(bool),
    ShowQuestion(QuestionView),
    ShowAnswerFeedback { is_correct: bool },
    ShowRoundSummary(RoundSummaryView),
    ShowError { message: String, retry_label: String },
}

/// User inputs flowing into the quiz loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizCommand {
    /// Begin a fresh round.
    Start,
    /// Answer the active question with yes (`true`) or no (`false`).
    Answer(bool),
    /// Retry after an error alert.
    Retry,
    /// Acknowledge the round summary and play again.
    Continue,
}
