//! The quiz loop: the single sequencing context for round state.
//!
//! Commands and task completions funnel into one receiver; every state
//! mutation happens inline here. Catalog loads, question generation, and
//! timers run as spawned tasks that post completions back tagged with the
//! round token current at spawn time, and completions from a superseded
//! round are dropped.

use std::time::Duration;

use tokio::sync::mpsc;

use quiz_core::Clock;
use quiz_core::model::Question;

use crate::error::{GenerationError, LoadError};
use crate::question_generator::QuestionGenerator;
use crate::quiz::presenter::{Effect, QUESTIONS_PER_ROUND, QuizPresenter};
use crate::quiz::view::{DisplayEvent, QuizCommand};
use crate::statistics::StatisticsService;

const DEFAULT_REVEAL_DELAY: Duration = Duration::from_secs(1);
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(5);

enum LoopEvent {
    Command(QuizCommand),
    CatalogLoaded {
        token: u64,
        result: Result<(), LoadError>,
    },
    QuestionReady {
        token: u64,
        result: Result<Question, GenerationError>,
    },
    RevealElapsed {
        token: u64,
    },
    AutoRetryElapsed {
        token: u64,
    },
}

/// Cloneable input side of the quiz loop.
#[derive(Clone)]
pub struct QuizHandle {
    commands: mpsc::UnboundedSender<QuizCommand>,
}

impl QuizHandle {
    /// Send a command; returns false when the loop has shut down.
    pub fn send(&self, command: QuizCommand) -> bool {
        self.commands.send(command).is_ok()
    }
}

/// Owns the presenter and sequences every state change.
pub struct QuizLoop {
    presenter: QuizPresenter,
    generator: QuestionGenerator,
    stats: StatisticsService,
    reveal_delay: Duration,
    retry_backoff: Duration,
    token: u64,
    commands_rx: mpsc::UnboundedReceiver<QuizCommand>,
    events_tx: mpsc::UnboundedSender<LoopEvent>,
    events_rx: mpsc::UnboundedReceiver<LoopEvent>,
}

impl QuizLoop {
    /// Wire up a quiz loop emitting display events on `display`.
    #[must_use]
    pub fn new(
        generator: QuestionGenerator,
        stats: StatisticsService,
        clock: Clock,
        display: mpsc::UnboundedSender<DisplayEvent>,
    ) -> (QuizHandle, Self) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let stats = stats.with_clock(clock);
        (
            QuizHandle {
                commands: commands_tx,
            },
            Self {
                presenter: QuizPresenter::new(QUESTIONS_PER_ROUND, display),
                generator,
                stats,
                reveal_delay: DEFAULT_REVEAL_DELAY,
                retry_backoff: DEFAULT_RETRY_BACKOFF,
                token: 0,
                commands_rx,
                events_tx,
                events_rx,
            },
        )
    }

    /// Override the number of questions per round (default 10).
    #[must_use]
    pub fn with_questions_per_round(mut self, questions: u32) -> Self {
        self.presenter.set_round_length(questions);
        self
    }

    /// How long answer feedback stays on screen before advancing.
    #[must_use]
    pub fn with_reveal_delay(mut self, delay: Duration) -> Self {
        self.reveal_delay = delay;
        self
    }

    /// Back-off before the single automatic load retry.
    #[must_use]
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Run until every command sender is dropped.
    pub async fn run(mut self) {
        loop {
            let event = tokio::select! {
                command = self.commands_rx.recv() => match command {
                    Some(command) => LoopEvent::Command(command),
                    None => break,
                },
                // We hold a sender ourselves, so this arm never yields None.
                Some(event) = self.events_rx.recv() => event,
            };
            self.dispatch(event).await;
        }
    }

    async fn dispatch(&mut self, event: LoopEvent) {
        let effects = match event {
            LoopEvent::Command(command) => self.handle_command(command),
            LoopEvent::CatalogLoaded { token, result } => {
                if token != self.token {
                    tracing::debug!("dropping stale catalog completion");
                    return;
                }
                self.presenter.on_catalog_loaded(result)
            }
            LoopEvent::QuestionReady { token, result } => {
                if token != self.token {
                    tracing::debug!("dropping stale question completion");
                    return;
                }
                self.presenter.on_question_ready(result)
            }
            LoopEvent::RevealElapsed { token } => {
                if token != self.token {
                    return;
                }
                self.presenter.on_reveal_elapsed()
            }
            LoopEvent::AutoRetryElapsed { token } => {
                if token != self.token {
                    return;
                }
                self.presenter.on_auto_retry_elapsed()
            }
        };
        self.run_effects(effects).await;
    }

    fn handle_command(&mut self, command: QuizCommand) -> Vec<Effect> {
        // Start/Retry/Continue supersede in-flight completions and timers;
        // an extra Answer must not cancel the pending reveal.
        match command {
            QuizCommand::Start => {
                self.token += 1;
                self.presenter.on_start()
            }
            QuizCommand::Answer(choice) => self.presenter.on_answer(choice),
            QuizCommand::Retry => {
                let effects = self.presenter.on_retry();
                if !effects.is_empty() {
                    self.token += 1;
                }
                effects
            }
            QuizCommand::Continue => {
                let effects = self.presenter.on_continue();
                if !effects.is_empty() {
                    self.token += 1;
                }
                effects
            }
        }
    }

    async fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::LoadCatalog => {
                    let generator = self.generator.clone();
                    let tx = self.events_tx.clone();
                    let token = self.token;
                    tokio::spawn(async move {
                        let result = generator.load_catalog().await;
                        let _ = tx.send(LoopEvent::CatalogLoaded { token, result });
                    });
                }
                Effect::RequestQuestion => {
                    let generator = self.generator.clone();
                    let tx = self.events_tx.clone();
                    let token = self.token;
                    tokio::spawn(async move {
                        let result = generator.generate().await;
                        let _ = tx.send(LoopEvent::QuestionReady { token, result });
                    });
                }
                Effect::ScheduleReveal => {
                    let tx = self.events_tx.clone();
                    let token = self.token;
                    let delay = self.reveal_delay;
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(LoopEvent::RevealElapsed { token });
                    });
                }
                Effect::ScheduleRetry => {
                    let tx = self.events_tx.clone();
                    let token = self.token;
                    let backoff = self.retry_backoff;
                    tokio::spawn(async move {
                        tokio::time::sleep(backoff).await;
                        let _ = tx.send(LoopEvent::AutoRetryElapsed { token });
                    });
                }
                Effect::Finalize { correct, total } => self.finalize(correct, total).await,
            }
        }
    }

    /// Record the finished round and show the summary.
    ///
    /// A failed statistics write is logged, not fatal: the round still
    /// completes for the user, and the atomic batch guarantees the stored
    /// counters stay consistent with each other.
    async fn finalize(&mut self, correct: u32, total: u32) {
        let stats_text = match self.stats.record(correct, total).await {
            Ok(updated) => StatisticsService::render_summary(&updated),
            Err(err) => {
                tracing::error!(%err, "failed to record game statistics");
                match self.stats.summary_text().await {
                    Ok(text) => text,
                    Err(_) => "Statistics are unavailable".to_owned(),
                }
            }
        };
        self.presenter.on_finalized(stats_text);
    }
}
