use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a Movie, as assigned by the catalog (e.g. `tt0111161`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MovieId(String);

impl MovieId {
    /// Creates a new `MovieId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying string value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MovieId({})", self.0)
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_value() {
        let id = MovieId::new("tt0111161");
        assert_eq!(id.to_string(), "tt0111161");
        assert_eq!(id.value(), "tt0111161");
    }
}
