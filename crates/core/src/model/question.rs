use std::fmt;
use thiserror::Error;

use crate::model::Movie;

/// Tenths bounds for a quiz threshold: 8.1..=8.8.
///
/// The range is deliberately narrow and high so that both answers stay
/// plausible for a catalog of popular, well-rated movies.
pub const THRESHOLD_MIN_TENTHS: u8 = 81;
pub const THRESHOLD_MAX_TENTHS: u8 = 88;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("threshold {0} tenths is outside {THRESHOLD_MIN_TENTHS}..={THRESHOLD_MAX_TENTHS}")]
    OutOfRange(u8),
}

/// The rating value a question asks the user to compare against.
///
/// Stored in tenths so equality between consecutive draws is exact; a
/// threshold always prints with one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RatingThreshold(u8);

impl RatingThreshold {
    /// Build a threshold from tenths (e.g. 83 => 8.3).
    ///
    /// # Errors
    ///
    /// Returns `ThresholdError::OutOfRange` outside the allowed band.
    pub fn from_tenths(tenths: u8) -> Result<Self, ThresholdError> {
        if !(THRESHOLD_MIN_TENTHS..=THRESHOLD_MAX_TENTHS).contains(&tenths) {
            return Err(ThresholdError::OutOfRange(tenths));
        }
        Ok(Self(tenths))
    }

    #[must_use]
    pub fn tenths(&self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl fmt::Display for RatingThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0 / 10, self.0 % 10)
    }
}

/// Which direction a question asks about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionPolarity {
    Higher,
    Lower,
}

impl QuestionPolarity {
    /// Render the prompt for this polarity and threshold.
    #[must_use]
    pub fn prompt(&self, threshold: RatingThreshold) -> String {
        match self {
            QuestionPolarity::Higher => {
                format!("Is this movie's rating higher than {threshold}?")
            }
            QuestionPolarity::Lower => {
                format!("Is this movie's rating lower than {threshold}?")
            }
        }
    }

    /// Whether "yes" is the correct answer for the given movie and threshold.
    #[must_use]
    pub fn resolve(&self, movie: &Movie, threshold: RatingThreshold) -> bool {
        match self {
            QuestionPolarity::Higher => movie.rating() > threshold.value(),
            QuestionPolarity::Lower => movie.rating() < threshold.value(),
        }
    }
}

/// One true/false quiz question, consumed once and discarded after scoring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    image: Vec<u8>,
    prompt: String,
    correct_answer: bool,
}

impl Question {
    #[must_use]
    pub fn new(image: Vec<u8>, prompt: impl Into<String>, correct_answer: bool) -> Self {
        Self {
            image,
            prompt: prompt.into(),
            correct_answer,
        }
    }

    #[must_use]
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn correct_answer(&self) -> bool {
        self.correct_answer
    }
}
