//! Remote store backed by a GitHub gist.
//!
//! The gist holds one JSON file with the whole `{mealPlan, mealLibrary}`
//! document. Reads fetch the gist and pull that file's content out of the
//! file map; writes PATCH the same file with new content.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

use super::error::RemoteError;
use super::remote::{RemoteDocument, RemoteStore};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_FILE_NAME: &str = "meal-planner.json";

const USER_AGENT: &str = concat!("meal-planner/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct Gist {
    #[serde(default)]
    files: HashMap<String, Option<GistFile>>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
    raw_url: Option<String>,
}

/// Where a file's content lives in a gist response.
#[derive(Debug, PartialEq)]
enum FileContent {
    Missing,
    Inline(String),
    /// Large files are truncated in the API response and must be read from `raw_url`
    Raw(String),
}

/// Gist-backed [`RemoteStore`].
#[derive(Debug, Clone)]
pub struct GistStore {
    client: reqwest::Client,
    api_url: String,
    gist_id: String,
    token: String,
    file_name: String,
}

impl GistStore {
    pub fn new(gist_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: DEFAULT_API_URL.to_string(),
            gist_id: gist_id.into(),
            token: token.into(),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn gist_id(&self) -> &str {
        &self.gist_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    fn gist_url(&self) -> String {
        format!(
            "{}/gists/{}",
            self.api_url.trim_end_matches('/'),
            self.gist_id
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, RemoteError> {
        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }
        Ok(response)
    }

    fn patch_body(&self, document: &RemoteDocument) -> Result<serde_json::Value, RemoteError> {
        let mut files = serde_json::Map::new();
        files.insert(
            self.file_name.clone(),
            serde_json::json!({ "content": document.to_json()? }),
        );
        Ok(serde_json::json!({ "files": files }))
    }
}

fn file_content(mut gist: Gist, file_name: &str) -> FileContent {
    let Some(file) = gist.files.remove(file_name).flatten() else {
        return FileContent::Missing;
    };
    match (file.truncated, file.raw_url, file.content) {
        (true, Some(raw_url), _) => FileContent::Raw(raw_url),
        (_, _, Some(content)) if !content.trim().is_empty() => FileContent::Inline(content),
        _ => FileContent::Missing,
    }
}

#[async_trait]
impl RemoteStore for GistStore {
    async fn probe(&self) -> Result<(), RemoteError> {
        let url = self.gist_url();
        self.send(self.request(reqwest::Method::GET, &url)).await?;
        tracing::debug!("Gist {} is reachable", self.gist_id);
        Ok(())
    }

    async fn fetch(&self) -> Result<Option<RemoteDocument>, RemoteError> {
        let url = self.gist_url();
        let gist: Gist = self
            .send(self.request(reqwest::Method::GET, &url))
            .await?
            .json()
            .await
            .map_err(|e| RemoteError::Parse(e.to_string()))?;

        let content = match file_content(gist, &self.file_name) {
            FileContent::Missing => return Ok(None),
            FileContent::Inline(content) => content,
            FileContent::Raw(raw_url) => {
                self.send(self.request(reqwest::Method::GET, &raw_url))
                    .await?
                    .text()
                    .await?
            }
        };

        RemoteDocument::from_json(&content).map(Some)
    }

    async fn replace(&self, document: &RemoteDocument) -> Result<(), RemoteError> {
        let url = self.gist_url();
        let body = self.patch_body(document)?;
        self.send(self.request(reqwest::Method::PATCH, &url).json(&body))
            .await?;
        tracing::debug!("Replaced {} in gist {}", self.file_name, self.gist_id);
        Ok(())
    }
}
