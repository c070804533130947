//! Turns the loaded catalog into randomized true/false rating questions.

use std::sync::{Arc, Mutex, PoisonError};

use rand::Rng;
use rand::seq::IndexedRandom;

use quiz_core::model::{
    Movie, MovieCatalog, Question, QuestionPolarity, RatingThreshold, THRESHOLD_MAX_TENTHS,
    THRESHOLD_MIN_TENTHS,
};

use crate::catalog::{CatalogFetcher, ImageFetcher};
use crate::error::{GenerationError, LoadError};

/// One random draw before the poster is fetched.
#[derive(Debug, Clone)]
struct Draw {
    movie: Movie,
    threshold: RatingThreshold,
    polarity: QuestionPolarity,
}

/// Produces one question at a time from a read-only catalog snapshot.
///
/// Cloneable with shared interior so the quiz loop can run `generate` as a
/// spawned task; the snapshot and the previous threshold sit behind mutexes
/// that are only held between awaits, never across them.
#[derive(Clone)]
pub struct QuestionGenerator {
    catalog_fetcher: Arc<dyn CatalogFetcher>,
    image_fetcher: Arc<dyn ImageFetcher>,
    catalog: Arc<Mutex<MovieCatalog>>,
    last_threshold: Arc<Mutex<Option<RatingThreshold>>>,
}

impl QuestionGenerator {
    #[must_use]
    pub fn new(
        catalog_fetcher: Arc<dyn CatalogFetcher>,
        image_fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        Self {
            catalog_fetcher,
            image_fetcher,
            catalog: Arc::new(Mutex::new(MovieCatalog::default())),
            last_threshold: Arc::new(Mutex::new(None)),
        }
    }

    /// Fetch the catalog and install it as the active snapshot.
    ///
    /// The last successful load wins; a failed load leaves any previously
    /// installed snapshot untouched.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the catalog is unreachable or malformed.
    pub async fn load_catalog(&self) -> Result<(), LoadError> {
        let catalog = self.catalog_fetcher.fetch_catalog().await?;
        tracing::info!(movies = catalog.len(), "catalog loaded");
        let mut guard = self.catalog.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = catalog;
        Ok(())
    }

    /// Draw one question: random movie, resampled threshold, fair-coin
    /// polarity, then the poster payload.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::EmptyCatalog` when nothing is loaded and
    /// `GenerationError::ImageUnavailable` when the poster fetch fails; the
    /// caller decides whether to retry.
    pub async fn generate(&self) -> Result<Question, GenerationError> {
        let draw = self.draw()?;
        let image = self
            .image_fetcher
            .fetch_image(&draw.movie.resized_poster_url())
            .await
            .map_err(|err| {
                tracing::warn!(%err, title = draw.movie.title(), "poster fetch failed");
                GenerationError::ImageUnavailable {
                    title: draw.movie.title().to_owned(),
                }
            })?;
        let prompt = draw.polarity.prompt(draw.threshold);
        let correct_answer = draw.polarity.resolve(&draw.movie, draw.threshold);
        Ok(Question::new(image, prompt, correct_answer))
    }

    fn draw(&self) -> Result<Draw, GenerationError> {
        let movie = {
            let catalog = self.catalog.lock().unwrap_or_else(PoisonError::into_inner);
            catalog
                .movies()
                .choose(&mut rand::rng())
                .cloned()
                .ok_or(GenerationError::EmptyCatalog)?
        };

        let mut rng = rand::rng();
        let mut last = self
            .last_threshold
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Reject-and-resample so no two consecutive questions share a threshold.
        let threshold = loop {
            let tenths = rng.random_range(THRESHOLD_MIN_TENTHS..=THRESHOLD_MAX_TENTHS);
            let Ok(candidate) = RatingThreshold::from_tenths(tenths) else {
                continue;
            };
            if Some(candidate) != *last {
                break candidate;
            }
        };
        *last = Some(threshold);

        let polarity = if rng.random_bool(0.5) {
            QuestionPolarity::Higher
        } else {
            QuestionPolarity::Lower
        };

        Ok(Draw {
            movie,
            threshold,
            polarity,
        })
    }
}
