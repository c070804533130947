//! The round state machine.
//!
//! The presenter is synchronous and single-writer: every handler runs on the
//! quiz loop, consumes a command or a task completion, mutates `RoundState`,
//! pushes display events, and returns the side effects the loop should run.

use tokio::sync::mpsc;

use quiz_core::model::{Question, RoundState};

use crate::error::{GenerationError, LoadError};
use crate::quiz::view::{DisplayEvent, QuestionView, RoundSummaryView};

/// Fixed round length.
pub const QUESTIONS_PER_ROUND: u32 = 10;

const RETRY_LABEL: &str = "Try again";
const SUMMARY_TITLE: &str = "That's the end of the round!";
const PLAY_AGAIN_LABEL: &str = "Play again";

/// Where the round currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Idle,
    /// Catalog or next question is loading.
    Loading,
    AwaitingAnswer,
    /// Feedback is on screen; answering is locked until the reveal delay ends.
    ShowingResult,
    Finished,
    /// Catalog load failed; retry reloads.
    LoadFailed,
    /// Question generation failed; retry redraws without reloading.
    QuestionFailed,
}

/// Side effects the quiz loop runs on the presenter's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    LoadCatalog,
    RequestQuestion,
    ScheduleReveal,
    /// One automatic retry after a back-off, best effort.
    ScheduleRetry,
    Finalize { correct: u32, total: u32 },
}

pub struct QuizPresenter {
    round: RoundState,
    phase: RoundPhase,
    display: mpsc::UnboundedSender<DisplayEvent>,
    auto_retry_used: bool,
}

impl QuizPresenter {
    #[must_use]
    pub fn new(questions_per_round: u32, display: mpsc::UnboundedSender<DisplayEvent>) -> Self {
        Self {
            round: RoundState::new(questions_per_round),
            phase: RoundPhase::Idle,
            display,
            auto_retry_used: false,
        }
    }

    /// Change the round length; takes effect when the next round starts.
    pub fn set_round_length(&mut self, total: u32) {
        self.round = RoundState::new(total);
    }

    #[must_use]
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    #[must_use]
    pub fn round(&self) -> &RoundState {
        &self.round
    }

    /// Begin a fresh round: counters reset, catalog load requested.
    pub fn on_start(&mut self) -> Vec<Effect> {
        self.round.reset();
        self.auto_retry_used = false;
        self.phase = RoundPhase::Loading;
        self.emit(DisplayEvent::ShowLoading(true));
        vec![Effect::LoadCatalog]
    }

    /// Catalog load finished.
    pub fn on_catalog_loaded(&mut self, result: Result<(), LoadError>) -> Vec<Effect> {
        if self.phase != RoundPhase::Loading {
            return Vec::new();
        }
        match result {
            Ok(()) => vec![Effect::RequestQuestion],
            Err(err) => {
                self.phase = RoundPhase::LoadFailed;
                self.emit(DisplayEvent::ShowLoading(false));
                self.emit(DisplayEvent::ShowError {
                    message: err.to_string(),
                    retry_label: RETRY_LABEL.to_owned(),
                });
                if self.auto_retry_used {
                    Vec::new()
                } else {
                    self.auto_retry_used = true;
                    vec![Effect::ScheduleRetry]
                }
            }
        }
    }

    /// Question generation finished.
    pub fn on_question_ready(&mut self, result: Result<Question, GenerationError>) -> Vec<Effect> {
        if self.phase != RoundPhase::Loading {
            return Vec::new();
        }
        match result {
            Ok(question) => {
                let view = QuestionView {
                    image: question.image().to_vec(),
                    prompt: question.prompt().to_owned(),
                    progress: self.round.progress_label(),
                };
                self.round.install_question(question);
                self.phase = RoundPhase::AwaitingAnswer;
                self.emit(DisplayEvent::ShowLoading(false));
                self.emit(DisplayEvent::ShowQuestion(view));
            }
            Err(err) => {
                // An empty catalog means the snapshot is unusable and must be
                // reloaded; a missing poster only voids this one draw.
                self.phase = match err {
                    GenerationError::EmptyCatalog => RoundPhase::LoadFailed,
                    GenerationError::ImageUnavailable { .. } => RoundPhase::QuestionFailed,
                };
                self.emit(DisplayEvent::ShowLoading(false));
                self.emit(DisplayEvent::ShowError {
                    message: err.to_string(),
                    retry_label: RETRY_LABEL.to_owned(),
                });
            }
        }
        Vec::new()
    }

    /// Score a user answer; ignored outside the answering window.
    pub fn on_answer(&mut self, choice: bool) -> Vec<Effect> {
        if self.phase != RoundPhase::AwaitingAnswer {
            return Vec::new();
        }
        let Some(outcome) = self.round.submit_answer(choice) else {
            return Vec::new();
        };
        self.phase = RoundPhase::ShowingResult;
        self.emit(DisplayEvent::ShowAnswerFeedback {
            is_correct: outcome.is_correct,
        });
        vec![Effect::ScheduleReveal]
    }

    /// The reveal delay elapsed: advance or finalize.
    pub fn on_reveal_elapsed(&mut self) -> Vec<Effect> {
        if self.phase != RoundPhase::ShowingResult {
            return Vec::new();
        }
        if self.round.is_last_question() {
            return vec![Effect::Finalize {
                correct: self.round.correct_count(),
                total: self.round.total(),
            }];
        }
        self.round.advance();
        self.phase = RoundPhase::Loading;
        self.emit(DisplayEvent::ShowLoading(true));
        vec![Effect::RequestQuestion]
    }

    /// Statistics were recorded (or failed non-fatally); show the summary.
    pub fn on_finalized(&mut self, stats_text: String) {
        let correct = self.round.correct_count();
        let total = self.round.total();
        let prefix = if correct == total {
            format!("Congratulations, you answered {total} out of {total}!")
        } else {
            format!("Your result: {correct}/{total}")
        };
        self.phase = RoundPhase::Finished;
        self.emit(DisplayEvent::ShowRoundSummary(RoundSummaryView {
            title: SUMMARY_TITLE.to_owned(),
            message: format!("{prefix}\n{stats_text}"),
            button_label: PLAY_AGAIN_LABEL.to_owned(),
        }));
    }

    /// Explicit user retry from an error alert.
    pub fn on_retry(&mut self) -> Vec<Effect> {
        match self.phase {
            RoundPhase::LoadFailed => {
                self.round.reset();
                self.auto_retry_used = false;
                self.phase = RoundPhase::Loading;
                self.emit(DisplayEvent::ShowLoading(true));
                vec![Effect::LoadCatalog]
            }
            RoundPhase::QuestionFailed => {
                self.phase = RoundPhase::Loading;
                self.emit(DisplayEvent::ShowLoading(true));
                vec![Effect::RequestQuestion]
            }
            _ => Vec::new(),
        }
    }

    /// The scheduled automatic retry fired; only acts if still failed.
    pub fn on_auto_retry_elapsed(&mut self) -> Vec<Effect> {
        if self.phase != RoundPhase::LoadFailed {
            return Vec::new();
        }
        self.round.reset();
        self.phase = RoundPhase::Loading;
        self.emit(DisplayEvent::ShowLoading(true));
        vec![Effect::LoadCatalog]
    }

    /// The user acknowledged the summary: straight into a new round.
    pub fn on_continue(&mut self) -> Vec<Effect> {
        if self.phase != RoundPhase::Finished {
            return Vec::new();
        }
        self.on_start()
    }

    fn emit(&self, event: DisplayEvent) {
        // The display owning the receiver may already be gone on shutdown.
        let _ = self.display.send(event);
    }
}
