//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::GameRecordError;
use storage::repository::StorageError;

/// Errors emitted while loading the movie catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("catalog request failed with status {0}")]
    Status(reqwest::StatusCode),
    #[error("catalog payload is malformed: {0}")]
    Malformed(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted while fetching a poster image.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImageFetchError {
    #[error("image request failed with status {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `QuestionGenerator::generate`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    #[error("no movies are loaded")]
    EmptyCatalog,
    #[error("could not load the poster for \"{title}\"; check your connection and try again")]
    ImageUnavailable { title: String },
}

/// Errors emitted by `StatisticsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatsError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("best game payload: {0}")]
    Codec(#[from] serde_json::Error),
    #[error(transparent)]
    InvalidRecord(#[from] GameRecordError),
    #[error("stored statistics are corrupt: {0}")]
    Corrupt(String),
}
