mod ids;
mod movie;
mod question;
mod record;
mod round;

pub use ids::MovieId;
pub use movie::{Movie, MovieCatalog, MovieError};
pub use question::{
    Question, QuestionPolarity, RatingThreshold, ThresholdError, THRESHOLD_MAX_TENTHS,
    THRESHOLD_MIN_TENTHS,
};
pub use record::{AggregateStats, GameRecord, GameRecordError, StatsIntegrityError};
pub use round::{AnswerOutcome, RoundState};
