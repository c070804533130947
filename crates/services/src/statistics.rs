//! Durable quiz statistics over an injected key-value store.

use std::sync::Arc;

use tokio::sync::Mutex;

use quiz_core::Clock;
use quiz_core::model::{AggregateStats, GameRecord};
use storage::repository::{KeyValueStore, KvWrite};

use crate::error::StatsError;

const KEY_GAMES_COUNT: &str = "games_count";
const KEY_TOTAL_CORRECT: &str = "total_correct";
const KEY_TOTAL_QUESTIONS: &str = "total_questions";
const KEY_BEST_GAME: &str = "best_game";

const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Cumulative counters and the best-game record, persisted across runs.
///
/// Every `record` call is one atomic read-modify-write: the counters and the
/// best-game payload land in a single storage batch, so a crash mid-update
/// cannot leave them contradicting each other. Clones share one write lock,
/// so concurrent `record` calls serialize instead of interleaving their
/// load-then-apply pairs and dropping games.
#[derive(Clone)]
pub struct StatisticsService {
    store: Arc<dyn KeyValueStore>,
    clock: Clock,
    write_lock: Arc<Mutex<()>>,
}

impl StatisticsService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            clock: Clock::default_clock(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Rehydrate the aggregate statistics.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Corrupt` when the stored counters contradict each
    /// other, `StatsError::Codec` for an undecodable best-game payload, and
    /// `StatsError::Storage` for backend failures.
    pub async fn load(&self) -> Result<AggregateStats, StatsError> {
        let games_played = self.read_counter(KEY_GAMES_COUNT).await?;
        let total_correct = self.read_counter(KEY_TOTAL_CORRECT).await?;
        let total_questions = self.read_counter(KEY_TOTAL_QUESTIONS).await?;
        let best_game = match self.store.get_bytes(KEY_BEST_GAME).await? {
            None => None,
            Some(bytes) => Some(serde_json::from_slice::<GameRecord>(&bytes)?),
        };
        AggregateStats::from_persisted(games_played, total_correct, total_questions, best_game)
            .map_err(|e| StatsError::Corrupt(e.to_string()))
    }

    /// Fold one finished round into the stored statistics.
    ///
    /// Returns the updated aggregate so callers can render a summary without
    /// a second read.
    ///
    /// # Errors
    ///
    /// Returns `StatsError` for invalid inputs, codec failures, or a failed
    /// storage commit; on error nothing is persisted.
    pub async fn record(&self, correct: u32, total: u32) -> Result<AggregateStats, StatsError> {
        let record = GameRecord::new(correct, total, self.clock.now())?;
        // Held across the load and the apply; without it two in-flight
        // records read the same counters and the later commit wins.
        let _guard = self.write_lock.lock().await;
        let updated = self.load().await?.with_game(record);

        let mut writes = vec![
            KvWrite::int(KEY_GAMES_COUNT, i64::from(updated.games_played())),
            KvWrite::int(KEY_TOTAL_CORRECT, i64::from(updated.total_correct())),
            KvWrite::int(KEY_TOTAL_QUESTIONS, i64::from(updated.total_questions())),
        ];
        if let Some(best) = updated.best_game() {
            writes.push(KvWrite::bytes(KEY_BEST_GAME, serde_json::to_vec(best)?));
        }
        self.store.apply(&writes).await?;
        Ok(updated)
    }

    /// Render the cross-session summary block.
    ///
    /// # Errors
    ///
    /// Returns `StatsError` when the stored statistics cannot be read.
    pub async fn summary_text(&self) -> Result<String, StatsError> {
        Ok(Self::render_summary(&self.load().await?))
    }

    /// Format an aggregate as the user-facing summary block.
    ///
    /// Before any game has been played the accuracy reads 0.00% and the best
    /// result shows a placeholder; no division by zero happens.
    #[must_use]
    pub fn render_summary(stats: &AggregateStats) -> String {
        let best = match stats.best_game() {
            Some(best) => format!(
                "{}/{} ({})",
                best.correct(),
                best.total(),
                best.played_at().format(DATE_FORMAT)
            ),
            None => "—".to_owned(),
        };
        format!(
            "Games played: {}\nBest result: {}\nAverage accuracy: {:.2}%",
            stats.games_played(),
            best,
            stats.accuracy() * 100.0
        )
    }

    async fn read_counter(&self, key: &str) -> Result<u32, StatsError> {
        let raw = self.store.get_i64(key).await?.unwrap_or(0);
        u32::try_from(raw).map_err(|_| StatsError::Corrupt(format!("negative {key}: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::time::fixed_now;
    use storage::repository::InMemoryStore;

    fn service(store: &InMemoryStore) -> StatisticsService {
        StatisticsService::new(Arc::new(store.clone())).with_clock(Clock::fixed(fixed_now()))
    }

    #[tokio::test]
    async fn summary_before_any_game_is_the_fallback() {
        let store = InMemoryStore::new();
        let text = service(&store).summary_text().await.unwrap();
        assert_eq!(
            text,
            "Games played: 0\nBest result: —\nAverage accuracy: 0.00%"
        );
    }

    #[tokio::test]
    async fn record_accumulates_counters() {
        let store = InMemoryStore::new();
        let stats = service(&store);
        stats.record(8, 10).await.unwrap();
        let loaded = stats.record(6, 10).await.unwrap();
        assert_eq!(loaded.games_played(), 2);
        assert_eq!(loaded.total_correct(), 14);
        assert_eq!(loaded.total_questions(), 20);
        assert!((loaded.accuracy() - 0.7).abs() < 1e-9);
    }

    #[tokio::test]
    async fn best_game_never_regresses() {
        let store = InMemoryStore::new();
        let stats = service(&store);
        stats.record(10, 10).await.unwrap();
        let loaded = stats.record(7, 10).await.unwrap();
        let best = loaded.best_game().unwrap();
        assert_eq!((best.correct(), best.total()), (10, 10));
    }

    #[tokio::test]
    async fn exact_tie_keeps_the_first_record() {
        let store = InMemoryStore::new();
        let first_at = fixed_now();
        let first = StatisticsService::new(Arc::new(store.clone()))
            .with_clock(Clock::fixed(first_at));
        first.record(5, 10).await.unwrap();

        let later = StatisticsService::new(Arc::new(store.clone()))
            .with_clock(Clock::fixed(first_at + Duration::hours(1)));
        let loaded = later.record(5, 10).await.unwrap();

        assert_eq!(loaded.best_game().unwrap().played_at(), first_at);
    }

    #[tokio::test]
    async fn summary_formats_best_game_with_date() {
        let store = InMemoryStore::new();
        let stats = service(&store);
        stats.record(9, 10).await.unwrap();
        let text = stats.summary_text().await.unwrap();
        assert_eq!(
            text,
            "Games played: 1\nBest result: 9/10 (14.11.2023 22:13)\nAverage accuracy: 90.00%"
        );
    }

    #[tokio::test]
    async fn best_game_payload_survives_a_reload() {
        let store = InMemoryStore::new();
        service(&store).record(10, 10).await.unwrap();
        // A fresh service over the same store sees the same record.
        let loaded = service(&store).load().await.unwrap();
        let best = loaded.best_game().unwrap();
        assert_eq!((best.correct(), best.total()), (10, 10));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_records_lose_no_games() {
        let store = InMemoryStore::new();
        let stats = service(&store);

        let mut handles = Vec::new();
        for _ in 0..32 {
            let stats = stats.clone();
            handles.push(tokio::spawn(async move { stats.record(1, 1).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let loaded = stats.load().await.unwrap();
        assert_eq!(loaded.games_played(), 32);
        assert_eq!(loaded.total_correct(), 32);
        assert_eq!(loaded.total_questions(), 32);
    }

    #[tokio::test]
    async fn invalid_record_input_is_rejected() {
        let store = InMemoryStore::new();
        let err = service(&store).record(11, 10).await.unwrap_err();
        assert!(matches!(err, StatsError::InvalidRecord(_)));
    }
}
