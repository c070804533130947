//! Quiz orchestration: view events, the presenter state machine, and the
//! async loop that sequences them.

mod presenter;
mod view;
mod workflow;

pub use presenter::{Effect, QUESTIONS_PER_ROUND, QuizPresenter, RoundPhase};
pub use view::{DisplayEvent, QuestionView, QuizCommand, RoundSummaryView};
pub use workflow::{QuizHandle, QuizLoop};
