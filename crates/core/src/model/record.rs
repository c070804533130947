use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameRecordError {
    #[error("correct count {correct} exceeds total {total}")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatsIntegrityError {
    #[error("total correct {total_correct} exceeds total questions {total_questions}")]
    CorrectExceedsQuestions {
        total_correct: u32,
        total_questions: u32,
    },
}

/// Result of one completed round.
///
/// The serde shape doubles as the persisted bestGame payload, so field names
/// are part of the stored format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    correct: u32,
    total: u32,
    played_at: DateTime<Utc>,
}

impl GameRecord {
    /// Build a validated record.
    ///
    /// # Errors
    ///
    /// Returns `GameRecordError::CorrectExceedsTotal` when `correct > total`.
    pub fn new(correct: u32, total: u32, played_at: DateTime<Utc>) -> Result<Self, GameRecordError> {
        if correct > total {
            return Err(GameRecordError::CorrectExceedsTotal { correct, total });
        }
        Ok(Self {
            correct,
            total,
            played_at,
        })
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn played_at(&self) -> DateTime<Utc> {
        self.played_at
    }

    #[must_use]
    pub fn wrong(&self) -> u32 {
        self.total - self.correct
    }

    /// Best-result comparison: lexicographic on `(correct, wrong)`.
    ///
    /// More correct answers wins; on equal correct counts, fewer wrong
    /// answers wins. An exact tie is not better, so the earlier record is
    /// kept.
    #[must_use]
    pub fn is_better_than(&self, other: &GameRecord) -> bool {
        if self.correct != other.correct {
            return self.correct > other.correct;
        }
        self.wrong() < other.wrong()
    }
}

/// Cumulative counters plus the best round, persisted across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateStats {
    games_played: u32,
    total_correct: u32,
    total_questions: u32,
    best_game: Option<GameRecord>,
}

impl AggregateStats {
    /// Rehydrate stats from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `StatsIntegrityError` when the counters contradict each other.
    pub fn from_persisted(
        games_played: u32,
        total_correct: u32,
        total_questions: u32,
        best_game: Option<GameRecord>,
    ) -> Result<Self, StatsIntegrityError> {
        if total_correct > total_questions {
            return Err(StatsIntegrityError::CorrectExceedsQuestions {
                total_correct,
                total_questions,
            });
        }
        Ok(Self {
            games_played,
            total_correct,
            total_questions,
            best_game,
        })
    }

    #[must_use]
    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    #[must_use]
    pub fn total_correct(&self) -> u32 {
        self.total_correct
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn best_game(&self) -> Option<&GameRecord> {
        self.best_game.as_ref()
    }

    /// Overall accuracy in `0.0..=1.0`; 0.0 before any game has been played.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.total_correct) / f64::from(self.total_questions)
    }

    /// Fold one finished round into the counters, applying the best-game rule.
    #[must_use]
    pub fn with_game(&self, record: GameRecord) -> Self {
        let best_game = match &self.best_game {
            Some(current) if !record.is_better_than(current) => Some(current.clone()),
            _ => Some(record.clone()),
        };
        Self {
            games_played: self.games_played + 1,
            total_correct: self.total_correct + record.correct(),
            total_questions: self.total_questions + record.total(),
            best_game,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn record(correct: u32, total: u32) -> GameRecord {
        GameRecord::new(correct, total, fixed_now()).unwrap()
    }

    #[test]
    fn rejects_correct_above_total() {
        let err = GameRecord::new(11, 10, fixed_now()).unwrap_err();
        assert_eq!(
            err,
            GameRecordError::CorrectExceedsTotal {
                correct: 11,
                total: 10
            }
        );
    }

    #[test]
    fn more_correct_wins() {
        assert!(record(10, 10).is_better_than(&record(7, 10)));
        assert!(!record(7, 10).is_better_than(&record(10, 10)));
    }

    #[test]
    fn equal_correct_fewer_wrong_wins() {
        assert!(record(5, 7).is_better_than(&record(5, 10)));
        assert!(!record(5, 10).is_better_than(&record(5, 7)));
    }

    #[test]
    fn exact_tie_is_not_better() {
        assert!(!record(5, 10).is_better_than(&record(5, 10)));
    }

    #[test]
    fn first_game_becomes_best() {
        let stats = AggregateStats::default().with_game(record(0, 10));
        assert_eq!(stats.best_game(), Some(&record(0, 10)));
        assert_eq!(stats.games_played(), 1);
    }

    #[test]
    fn best_game_never_regresses() {
        let stats = AggregateStats::default()
            .with_game(record(10, 10))
            .with_game(record(7, 10));
        assert_eq!(stats.best_game(), Some(&record(10, 10)));
        assert_eq!(stats.total_correct(), 17);
        assert_eq!(stats.total_questions(), 20);
    }

    #[test]
    fn tie_keeps_first_recorded_game() {
        let first = GameRecord::new(5, 10, fixed_now()).unwrap();
        let later = GameRecord::new(5, 10, fixed_now() + Duration::hours(1)).unwrap();
        let stats = AggregateStats::default().with_game(first.clone()).with_game(later);
        assert_eq!(stats.best_game(), Some(&first));
    }

    #[test]
    fn accuracy_is_zero_without_games() {
        assert!(AggregateStats::default().accuracy().abs() < f64::EPSILON);
    }

    #[test]
    fn persisted_counters_must_be_consistent() {
        let err = AggregateStats::from_persisted(1, 11, 10, None).unwrap_err();
        assert!(matches!(
            err,
            StatsIntegrityError::CorrectExceedsQuestions { .. }
        ));
    }
}
