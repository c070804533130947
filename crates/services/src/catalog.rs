//! Remote movie catalog and poster fetching.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use quiz_core::model::{Movie, MovieCatalog, MovieId};

use crate::error::{ImageFetchError, LoadError};

/// Fetches the raw movie list once per round start or retry.
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    /// Download and validate the movie catalog.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the catalog is unreachable or malformed.
    async fn fetch_catalog(&self) -> Result<MovieCatalog, LoadError>;
}

/// Fetches one poster payload per generated question.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Download the poster bytes at the given URL.
    ///
    /// # Errors
    ///
    /// Returns `ImageFetchError` if the payload cannot be retrieved.
    async fn fetch_image(&self, url: &Url) -> Result<Vec<u8>, ImageFetchError>;
}

/// Catalog fetcher over the movie-rating HTTP API.
#[derive(Clone)]
pub struct HttpCatalogFetcher {
    client: Client,
    endpoint: Url,
}

impl HttpCatalogFetcher {
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl CatalogFetcher for HttpCatalogFetcher {
    async fn fetch_catalog(&self) -> Result<MovieCatalog, LoadError> {
        let response = self.client.get(self.endpoint.clone()).send().await?;
        if !response.status().is_success() {
            return Err(LoadError::Status(response.status()));
        }
        let page: CatalogPage = response.json().await?;
        parse_catalog(page)
    }
}

/// Poster fetcher over plain HTTP GET.
#[derive(Clone)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_image(&self, url: &Url) -> Result<Vec<u8>, ImageFetchError> {
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(ImageFetchError::Status(response.status()));
        }
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

fn parse_catalog(page: CatalogPage) -> Result<MovieCatalog, LoadError> {
    if !page.error_message.is_empty() {
        return Err(LoadError::Malformed(page.error_message));
    }
    let mut movies = Vec::with_capacity(page.items.len());
    for item in page.items {
        match Movie::from_catalog_fields(
            MovieId::new(item.id),
            item.title,
            &item.rating,
            item.image_url,
        ) {
            Ok(movie) => movies.push(movie),
            Err(err) => {
                // A single bad row should not sink the whole catalog.
                tracing::warn!(%err, "skipping invalid catalog entry");
            }
        }
    }
    if movies.is_empty() {
        return Err(LoadError::Malformed("catalog contains no usable movies".into()));
    }
    Ok(MovieCatalog::new(movies))
}

#[derive(Debug, Deserialize)]
struct CatalogPage {
    #[serde(default, rename = "errorMessage")]
    error_message: String,
    #[serde(default)]
    items: Vec<CatalogItem>,
}

#[derive(Debug, Deserialize)]
struct CatalogItem {
    id: String,
    #[serde(rename = "fullTitle")]
    title: String,
    #[serde(rename = "imDbRating")]
    rating: String,
    #[serde(rename = "image")]
    image_url: Url,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(json: &str) -> CatalogPage {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_catalog_items() {
        let page = page(
            r#"{
                "errorMessage": "",
                "items": [
                    {
                        "id": "tt0111161",
                        "fullTitle": "The Shawshank Redemption (1994)",
                        "imDbRating": "9.3",
                        "image": "https://example.com/p._V1_.jpg"
                    }
                ]
            }"#,
        );
        let catalog = parse_catalog(page).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(0).unwrap().title(), "The Shawshank Redemption (1994)");
    }

    #[test]
    fn api_error_message_is_malformed() {
        let page = page(r#"{ "errorMessage": "Invalid API Key", "items": [] }"#);
        let err = parse_catalog(page).unwrap_err();
        assert!(matches!(err, LoadError::Malformed(msg) if msg == "Invalid API Key"));
    }

    #[test]
    fn skips_invalid_rows_but_keeps_valid_ones() {
        let page = page(
            r#"{
                "errorMessage": "",
                "items": [
                    {
                        "id": "tt1",
                        "fullTitle": "Broken",
                        "imDbRating": "n/a",
                        "image": "https://example.com/a.jpg"
                    },
                    {
                        "id": "tt2",
                        "fullTitle": "Fine",
                        "imDbRating": "8.4",
                        "image": "https://example.com/b.jpg"
                    }
                ]
            }"#,
        );
        let catalog = parse_catalog(page).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(0).unwrap().title(), "Fine");
    }

    #[test]
    fn all_rows_invalid_is_malformed() {
        let page = page(
            r#"{
                "errorMessage": "",
                "items": [
                    {
                        "id": "tt1",
                        "fullTitle": "Broken",
                        "imDbRating": "",
                        "image": "https://example.com/a.jpg"
                    }
                ]
            }"#,
        );
        assert!(matches!(parse_catalog(page), Err(LoadError::Malformed(_))));
    }

    #[test]
    fn empty_item_list_is_malformed() {
        let page = page(r#"{ "errorMessage": "", "items": [] }"#);
        assert!(matches!(parse_catalog(page), Err(LoadError::Malformed(_))));
    }
}
