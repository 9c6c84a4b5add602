use foundation::GeoRect;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Upstream(String),
}

/// One candidate place match from the search backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResult {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// `[south, north, west, east]` in degrees, when the backend has one.
    #[serde(default)]
    pub boundingbox: Option<[f64; 4]>,
}

impl SearchResult {
    pub fn bounds(&self) -> Option<GeoRect> {
        self.boundingbox
            .map(|[south, north, west, east]| GeoRect::new(west, south, east, north))
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for `GET /api/search/?q=`.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl SearchClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ApiError> {
        let url = format!("{}/api/search/", self.base_url.trim_end_matches('/'));
        tracing::debug!("search query: {query:?}");
        let body: SearchResponse = self
            .http
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await?
            .json()
            .await?;
        if let Some(error) = body.error {
            return Err(ApiError::Upstream(error));
        }
        Ok(body.results)
    }
}
