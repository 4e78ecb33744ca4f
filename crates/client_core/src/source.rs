use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared::protocol::{Character, Episode};
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://www.breakingbadapi.com/api/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogResource {
    Characters,
    Episodes,
}

impl CatalogResource {
    pub fn path(self) -> &'static str {
        match self {
            Self::Characters => "characters",
            Self::Episodes => "episodes",
        }
    }
}

impl fmt::Display for CatalogResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// The data source could not be reached or its answer could not be decoded.
///
/// Transport, status and JSON failures all collapse into this one error; the
/// cause is kept only so it can be logged.
#[derive(Debug, Error)]
#[error("{resource} data source unavailable or unparsable: {source}")]
pub struct SourceError {
    pub resource: CatalogResource,
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl SourceError {
    pub fn new(
        resource: CatalogResource,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            resource,
            source: cause.into(),
        }
    }
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_characters(&self) -> Result<Vec<Character>, SourceError>;
    async fn fetch_episodes(&self) -> Result<Vec<Episode>, SourceError>;
}

/// Reads both collections from `<base_url>characters` and `<base_url>episodes`.
pub struct HttpCatalogSource {
    http: Client,
    base_url: Url,
}

impl HttpCatalogSource {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
        }
    }

    pub fn parse(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self::new(Url::parse(base_url)?))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, resource: CatalogResource) -> Result<Url, url::ParseError> {
        self.base_url.join(resource.path())
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        resource: CatalogResource,
    ) -> Result<T, SourceError> {
        let url = self
            .endpoint(resource)
            .map_err(|err| SourceError::new(resource, err))?;
        self.http
            .get(url)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|err| SourceError::new(resource, err))?
            .json()
            .await
            .map_err(|err| SourceError::new(resource, err))
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_characters(&self) -> Result<Vec<Character>, SourceError> {
        self.fetch(CatalogResource::Characters).await
    }

    async fn fetch_episodes(&self) -> Result<Vec<Episode>, SourceError> {
        self.fetch(CatalogResource::Episodes).await
    }
}

/// Ensures the path ends in `/` so joining appends a segment instead of
/// replacing the last one.
pub fn normalize_base_url(mut base_url: Url) -> Url {
    if !base_url.path().ends_with('/') {
        let path = format!("{}/", base_url.path());
        base_url.set_path(&path);
    }
    base_url
}

#[cfg(test)]
#[path = "tests/source_tests.rs"]
mod tests;
