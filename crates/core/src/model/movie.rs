use thiserror::Error;
use url::Url;

use crate::model::MovieId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MovieError {
    #[error("movie title must not be empty")]
    EmptyTitle,

    #[error("rating {0} is outside the 0..=10 scale")]
    RatingOutOfRange(String),

    #[error("rating is not a number: {0}")]
    UnparsableRating(String),
}

/// A single catalog entry: what the quiz asks questions about.
///
/// Instances are immutable; the catalog snapshot owns them for the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    id: MovieId,
    title: String,
    rating: f64,
    poster_url: Url,
}

impl Movie {
    /// Build a validated movie from catalog fields.
    ///
    /// # Errors
    ///
    /// Returns `MovieError` for an empty title or a rating outside `0..=10`.
    pub fn new(
        id: MovieId,
        title: impl Into<String>,
        rating: f64,
        poster_url: Url,
    ) -> Result<Self, MovieError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(MovieError::EmptyTitle);
        }
        if !rating.is_finite() || !(0.0..=10.0).contains(&rating) {
            return Err(MovieError::RatingOutOfRange(rating.to_string()));
        }
        Ok(Self {
            id,
            title,
            rating,
            poster_url,
        })
    }

    /// Parse the rating from its catalog string form, then validate.
    ///
    /// # Errors
    ///
    /// Returns `MovieError::UnparsableRating` when the string is not a number,
    /// plus the `new` validations.
    pub fn from_catalog_fields(
        id: MovieId,
        title: impl Into<String>,
        rating: &str,
        poster_url: Url,
    ) -> Result<Self, MovieError> {
        let parsed: f64 = rating
            .trim()
            .parse()
            .map_err(|_| MovieError::UnparsableRating(rating.to_string()))?;
        Self::new(id, title, parsed, poster_url)
    }

    #[must_use]
    pub fn id(&self) -> &MovieId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn rating(&self) -> f64 {
        self.rating
    }

    #[must_use]
    pub fn poster_url(&self) -> &Url {
        &self.poster_url
    }

    /// The 600px-wide poster variant.
    ///
    /// Catalog image URLs embed render parameters after a `._` marker
    /// (`...abc._V1_Ratio0.6800_AL_.jpg`); truncating at the marker and
    /// appending `._V0_UX600_.jpg` yields a smaller crop. URLs without the
    /// marker are returned unchanged.
    #[must_use]
    pub fn resized_poster_url(&self) -> Url {
        let raw = self.poster_url.as_str();
        match raw.split_once("._") {
            Some((base, _)) => {
                Url::parse(&format!("{base}._V0_UX600_.jpg")).unwrap_or_else(|_| self.poster_url.clone())
            }
            None => self.poster_url.clone(),
        }
    }
}

/// Read-only snapshot of the loaded movie list.
///
/// The generator draws from this without mutating it; a reload replaces the
/// whole snapshot at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieCatalog {
    movies: Vec<Movie>,
}

impl MovieCatalog {
    #[must_use]
    pub fn new(movies: Vec<Movie>) -> Self {
        Self { movies }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    #[must_use]
    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Movie> {
        self.movies.get(index)
    }
}
