//! HTTP source backed by the public Open Library JSON API.

use crate::error::{ErrorKind, Result};
use crate::models::Query;
use crate::source::{AuthorRecord, Edition, Source, Work};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::instrument;

/// Public web origin of Open Library. Record keys (`/books/...`) appended to
/// this form browsable URLs.
pub const ORIGIN: &str = "https://openlibrary.org";
pub const USER_AGENT: &str = concat!("shelf/", env!("CARGO_PKG_VERSION"));

/// Open Library API client.
#[derive(Debug, Clone)]
pub struct OpenLibrary {
    http: reqwest::Client,
    origin: String,
}
impl OpenLibrary {
    /// Client for the public service with default settings.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> OpenLibraryBuilder {
        OpenLibraryBuilder::default()
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn url(&self, path: &str) -> String {
        // Keys start with a slash; paths are built from keys.
        format!("{}{}", self.origin.trim_end_matches('/'), path)
    }

    #[instrument(skip(self), fields(origin = %self.origin))]
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self.http.get(&url).send().await.or_raise(|| ErrorKind::Network)?;
        let status = response.status();
        tracing::debug!(%status, "Open Library responded");
        if status == StatusCode::NOT_FOUND {
            exn::bail!(ErrorKind::NotFound(path.to_string()));
        }
        if !status.is_success() {
            exn::bail!(ErrorKind::Status(status.as_u16(), path.to_string()));
        }
        // Read the body first so a dropped connection is reported as a network
        // error rather than a malformed payload.
        let body = response.bytes().await.or_raise(|| ErrorKind::Network)?;
        serde_json::from_slice(&body).or_raise(|| ErrorKind::Payload(path.to_string()))
    }
}

#[async_trait]
impl Source for OpenLibrary {
    fn name(&self) -> &str {
        "openlibrary"
    }

    async fn edition(&self, query: &Query) -> Result<Edition> {
        self.get_json(&query.path()).await
    }

    async fn work(&self, key: &str) -> Result<Work> {
        self.get_json(&format!("{key}.json")).await
    }

    async fn author(&self, key: &str) -> Result<AuthorRecord> {
        self.get_json(&format!("{key}.json")).await
    }
}

/// Builder for [`OpenLibrary`].
///
/// No timeout is applied unless one is configured: a slow lookup simply
/// takes as long as the service does.
#[derive(Debug, Clone)]
pub struct OpenLibraryBuilder {
    origin: String,
    user_agent: String,
    timeout: Option<Duration>,
}
impl Default for OpenLibraryBuilder {
    fn default() -> Self {
        Self {
            origin: ORIGIN.to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: None,
        }
    }
}
impl OpenLibraryBuilder {
    /// Point the client at a different deployment (a mirror, or a local stub).
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OpenLibrary> {
        let mut builder = reqwest::Client::builder().user_agent(self.user_agent);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().or_raise(|| ErrorKind::Network)?;
        Ok(OpenLibrary { http, origin: self.origin })
    }
}
