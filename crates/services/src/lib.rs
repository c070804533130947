#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod question_generator;
pub mod quiz;
pub mod statistics;

pub use quiz_core::Clock;

pub use catalog::{CatalogFetcher, HttpCatalogFetcher, HttpImageFetcher, ImageFetcher};
pub use error::{GenerationError, ImageFetchError, LoadError, StatsError};
pub use question_generator::QuestionGenerator;
pub use quiz::{
    DisplayEvent, QuestionView, QuizCommand, QuizHandle, QuizLoop, QuizPresenter, RoundPhase,
    RoundSummaryView, QUESTIONS_PER_ROUND,
};
pub use statistics::StatisticsService;
