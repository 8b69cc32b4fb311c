//! Modrinth API client implementation
//!
//! Provides production (Live) and test (Mock) implementations of the remote
//! catalog. The catalog trait is object safe so command sessions can hand out
//! `&dyn CatalogClient`.

use crate::networking::{NetworkingError, RateLimitedClient};
use crate::primitives::{ModLoader, SearchSort};
use chrono::{DateTime, Utc};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.modrinth.com/v2";

/// Modrinth API errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {source}")]
    RequestFailed {
        #[from]
        source: reqwest::Error,
    },

    #[error("Network error: {source}")]
    NetworkError {
        #[from]
        source: NetworkingError,
    },

    #[error("JSON parsing failed: {source}")]
    JsonError {
        #[from]
        source: serde_json::Error,
    },

    #[error("Project not found: {project_id}")]
    ProjectNotFound { project_id: String },

    #[error("No version matches file hash {hash}")]
    HashNotFound { hash: String },

    #[error("Catalog returned HTTP {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Invalid search parameters: {message}")]
    InvalidSearchParams { message: String },
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProjectNotFound { .. } | Self::HashNotFound { .. }
        )
    }
}

/// Client/server support declared by a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideSupport {
    Required,
    Optional,
    Unsupported,
    #[serde(other)]
    Unknown,
}

impl SideSupport {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::Unsupported => "unsupported",
            Self::Unknown => "unknown",
        }
    }

    /// Everything but an explicit `unsupported` counts as supported
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

fn unknown_side() -> SideSupport {
    SideSupport::Unknown
}

/// Project metadata needed to install a mod
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "unknown_side")]
    pub client_side: SideSupport,
    #[serde(default = "unknown_side")]
    pub server_side: SideSupport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Full project page, as shown by `view`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetails {
    #[serde(flatten)]
    pub summary: ProjectSummary,
    /// Long-form description (markdown)
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub license: Option<License>,
    /// Supported game versions, oldest first
    #[serde(default)]
    pub game_versions: Vec<String>,
    #[serde(default)]
    pub issues_url: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub wiki_url: Option<String>,
    #[serde(default)]
    pub discord_url: Option<String>,
}

impl From<ProjectSummary> for ProjectDetails {
    fn from(summary: ProjectSummary) -> Self {
        Self {
            summary,
            body: String::new(),
            categories: Vec::new(),
            status: String::new(),
            downloads: 0,
            followers: 0,
            license: None,
            game_versions: Vec::new(),
            issues_url: None,
            source_url: None,
            wiki_url: None,
            discord_url: None,
        }
    }
}

impl ProjectDetails {
    pub fn page_url(&self) -> String {
        format!("https://modrinth.com/mod/{}", self.summary.slug)
    }

    /// External links in display order, skipping the unset ones
    pub fn links(&self) -> Vec<(&'static str, &str)> {
        [
            ("Issues", &self.issues_url),
            ("Source", &self.source_url),
            ("Wiki", &self.wiki_url),
            ("Discord", &self.discord_url),
        ]
        .into_iter()
        .filter_map(|(label, url)| {
            url.as_deref()
                .filter(|url| !url.is_empty())
                .map(|url| (label, url))
        })
        .collect()
    }
}

/// Search result hit from Modrinth API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub project_id: String,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub author: String,
    #[serde(default = "unknown_side")]
    pub client_side: SideSupport,
    #[serde(default = "unknown_side")]
    pub server_side: SideSupport,
}

/// Search results response from Modrinth API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    pub offset: usize,
    pub limit: usize,
    pub total_hits: usize,
}

/// Dependency relationship type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Required,
    Optional,
    Incompatible,
    Embedded,
}

/// Dependency declared by a version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRef {
    #[serde(default)]
    pub version_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    pub dependency_type: DependencyKind,
}

/// File hashes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHashes {
    pub sha512: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
}

/// Version file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionFile {
    pub hashes: FileHashes,
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// Release channel of a version
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    #[default]
    Release,
    Beta,
    Alpha,
}

/// Immutable description of one published version of a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: String,
    pub project_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version_number: String,
    #[serde(default)]
    pub version_type: VersionType,
    #[serde(default)]
    pub date_published: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changelog: Option<String>,
    #[serde(default)]
    pub downloads: u64,
    pub game_versions: Vec<String>,
    pub loaders: Vec<ModLoader>,
    #[serde(default)]
    pub dependencies: Vec<DependencyRef>,
    pub files: Vec<VersionFile>,
}

impl VersionRecord {
    /// The file to install: first flagged primary, otherwise the first listed
    pub fn primary_file(&self) -> Option<&VersionFile> {
        self.files
            .iter()
            .find(|file| file.primary)
            .or_else(|| self.files.first())
    }

    /// `date_published` as a point in time; `None` if it is not RFC 3339
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date_published)
            .ok()
            .map(|published| published.with_timezone(&Utc))
    }
}

/// Boxed future returned by catalog operations
pub type CatalogFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CatalogError>> + Send + 'a>>;

/// Read-only view of the remote mod catalog
pub trait CatalogClient: Send + Sync {
    /// Search for projects
    ///
    /// `facets` is a Modrinth facet expression (`[["a:b"],["c:d"]]`).
    fn search<'a>(
        &'a self,
        query: &'a str,
        facets: Option<&'a str>,
        sort: SearchSort,
        limit: usize,
        offset: usize,
    ) -> CatalogFuture<'a, SearchResults>;

    /// Look up a project by slug or id
    fn get_project<'a>(&'a self, id_or_slug: &'a str) -> CatalogFuture<'a, ProjectSummary>;

    /// Full project page; catalogs without one fall back to the summary
    fn project_details<'a>(&'a self, id_or_slug: &'a str) -> CatalogFuture<'a, ProjectDetails> {
        Box::pin(async move {
            self.get_project(id_or_slug)
                .await
                .map(ProjectDetails::from)
        })
    }

    /// List versions in catalog order (newest first), optionally narrowed by game version and loader
    fn list_versions<'a>(
        &'a self,
        project_id: &'a str,
        game_version: Option<&'a str>,
        loader: Option<ModLoader>,
    ) -> CatalogFuture<'a, Vec<VersionRecord>>;

    /// Find the version that published a file with this sha512
    fn version_from_hash<'a>(&'a self, sha512: &'a str) -> CatalogFuture<'a, VersionRecord>;
}

/// Live Modrinth API client (production)
pub struct LiveModrinthClient {
    http: Arc<RateLimitedClient>,
    base_url: String,
}

impl LiveModrinthClient {
    pub fn new(http: Arc<RateLimitedClient>) -> Self {
        Self::with_base_url(http, DEFAULT_BASE_URL.to_string())
    }

    /// Create client with custom base URL (for staging/testing)
    pub fn with_base_url(http: Arc<RateLimitedClient>, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET a JSON document; `Ok(None)` on 404
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, CatalogError> {
        let response = self.http.get(url).await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(CatalogError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn fetch_project<T: DeserializeOwned>(&self, id_or_slug: &str) -> Result<T, CatalogError> {
        let url = format!("{}/project/{}", self.base_url, encode(id_or_slug));
        self.get_json(&url)
            .await?
            .ok_or_else(|| CatalogError::ProjectNotFound {
                project_id: id_or_slug.to_string(),
            })
    }

    async fn fetch_versions(
        &self,
        project_id: &str,
        game_version: Option<&str>,
        loader: Option<ModLoader>,
    ) -> Result<Vec<VersionRecord>, CatalogError> {
        let mut params = Vec::new();
        if let Some(loader) = loader {
            params.push(format!("loaders={}", encode(&json_list(loader.as_str()))));
        }
        if let Some(game_version) = game_version {
            params.push(format!("game_versions={}", encode(&json_list(game_version))));
        }

        let mut url = format!("{}/project/{}/version", self.base_url, encode(project_id));
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.join("&"));
        }

        let versions: Vec<VersionRecord> =
            self.get_json(&url)
                .await?
                .ok_or_else(|| CatalogError::ProjectNotFound {
                    project_id: project_id.to_string(),
                })?;

        debug!("{} versions listed for {}", versions.len(), project_id);
        Ok(versions)
    }

    async fn fetch_search(
        &self,
        query: &str,
        facets: Option<&str>,
        sort: SearchSort,
        limit: usize,
        offset: usize,
    ) -> Result<SearchResults, CatalogError> {
        if limit > 100 {
            return Err(CatalogError::InvalidSearchParams {
                message: "limit must be <= 100".to_string(),
            });
        }

        let mut url = format!(
            "{}/search?query={}&limit={}&offset={}&index={}",
            self.base_url,
            encode(query),
            limit,
            offset,
            sort.index()
        );
        if let Some(facets) = facets {
            url.push_str(&format!("&facets={}", encode(facets)));
        }

        Ok(self.get_json(&url).await?.unwrap_or(SearchResults {
            hits: Vec::new(),
            offset,
            limit,
            total_hits: 0,
        }))
    }

    async fn fetch_version_from_hash(&self, sha512: &str) -> Result<VersionRecord, CatalogError> {
        let url = format!(
            "{}/version_file/{}?algorithm=sha512",
            self.base_url,
            encode(sha512)
        );
        self.get_json(&url)
            .await?
            .ok_or_else(|| CatalogError::HashNotFound {
                hash: sha512.to_string(),
            })
    }
}

impl CatalogClient for LiveModrinthClient {
    fn search<'a>(
        &'a self,
        query: &'a str,
        facets: Option<&'a str>,
        sort: SearchSort,
        limit: usize,
        offset: usize,
    ) -> CatalogFuture<'a, SearchResults> {
        Box::pin(self.fetch_search(query, facets, sort, limit, offset))
    }

    fn get_project<'a>(&'a self, id_or_slug: &'a str) -> CatalogFuture<'a, ProjectSummary> {
        Box::pin(self.fetch_project::<ProjectSummary>(id_or_slug))
    }

    fn project_details<'a>(&'a self, id_or_slug: &'a str) -> CatalogFuture<'a, ProjectDetails> {
        Box::pin(self.fetch_project::<ProjectDetails>(id_or_slug))
    }

    fn list_versions<'a>(
        &'a self,
        project_id: &'a str,
        game_version: Option<&'a str>,
        loader: Option<ModLoader>,
    ) -> CatalogFuture<'a, Vec<VersionRecord>> {
        Box::pin(self.fetch_versions(project_id, game_version, loader))
    }

    fn version_from_hash<'a>(&'a self, sha512: &'a str) -> CatalogFuture<'a, VersionRecord> {
        Box::pin(self.fetch_version_from_hash(sha512))
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

fn json_list(value: &str) -> String {
    serde_json::json!([value]).to_string()
}

/// Build the facet expression used when searching for server mods
pub fn server_mod_facets(game_version: &str, loader: ModLoader) -> String {
    let mut facets = vec![
        vec!["project_type:mod".to_string()],
        vec!["server_side!=unsupported".to_string()],
        vec![format!("versions:{game_version}")],
    ];
    if loader.is_known() {
        facets.push(vec![format!("categories:{}", loader.as_str())]);
    }
    serde_json::json!(facets).to_string()
}

/// In-memory catalog for tests
///
/// `list_versions` returns versions in insertion order and ignores the
/// game version and loader hints, so selection logic is exercised on
/// unfiltered candidates.
#[derive(Default)]
pub struct MockCatalogClient {
    projects: Mutex<HashMap<String, ProjectSummary>>,
    details: Mutex<HashMap<String, ProjectDetails>>,
    versions: Mutex<HashMap<String, Vec<VersionRecord>>>,
    hashes: Mutex<HashMap<String, VersionRecord>>,
    search_results: Mutex<HashMap<String, SearchResults>>,
    failing: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
    search_sorts: Mutex<Vec<SearchSort>>,
}

impl MockCatalogClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a project with its versions (newest first)
    pub fn with_project(self, project: ProjectSummary, versions: Vec<VersionRecord>) -> Self {
        if let Ok(mut stored) = self.versions.lock() {
            stored.insert(project.id.clone(), versions.clone());
        }
        if let Ok(mut hashes) = self.hashes.lock() {
            for version in &versions {
                for file in &version.files {
                    hashes.insert(file.hashes.sha512.clone(), version.clone());
                }
            }
        }
        if let Ok(mut projects) = self.projects.lock() {
            projects.insert(project.slug.clone(), project.clone());
            projects.insert(project.id.clone(), project);
        }
        self
    }

    /// Register a full project page; also registers its summary
    pub fn with_details(self, details: ProjectDetails) -> Self {
        if let Ok(mut projects) = self.projects.lock() {
            projects.insert(details.summary.slug.clone(), details.summary.clone());
            projects.insert(details.summary.id.clone(), details.summary.clone());
        }
        if let Ok(mut stored) = self.details.lock() {
            stored.insert(details.summary.slug.clone(), details.clone());
            stored.insert(details.summary.id.clone(), details);
        }
        self
    }

    pub fn with_search_result(self, query: &str, results: SearchResults) -> Self {
        if let Ok(mut stored) = self.search_results.lock() {
            stored.insert(query.to_string(), results);
        }
        self
    }

    /// Make every lookup of `id_or_slug` fail with a transport style error
    pub fn with_failure(self, id_or_slug: &str, message: &str) -> Self {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(id_or_slug.to_string(), message.to_string());
        }
        self
    }

    /// Every catalog call made so far, as `"<operation>:<argument>"`
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Ordering requested by the most recent search
    pub fn last_search_sort(&self) -> Option<SearchSort> {
        self.search_sorts
            .lock()
            .ok()
            .and_then(|sorts| sorts.last().copied())
    }

    pub fn count_calls(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn failure(&self, key: &str) -> Option<CatalogError> {
        let failing = self.failing.lock().ok()?;
        failing
            .get(key)
            .map(|message| CatalogError::InvalidSearchParams {
                message: message.clone(),
            })
    }
}

impl CatalogClient for MockCatalogClient {
    fn search<'a>(
        &'a self,
        query: &'a str,
        _facets: Option<&'a str>,
        sort: SearchSort,
        limit: usize,
        offset: usize,
    ) -> CatalogFuture<'a, SearchResults> {
        self.record(format!("search:{query}"));
        if let Ok(mut sorts) = self.search_sorts.lock() {
            sorts.push(sort);
        }
        let result = self
            .search_results
            .lock()
            .ok()
            .and_then(|stored| stored.get(query).cloned())
            .unwrap_or(SearchResults {
                hits: Vec::new(),
                offset,
                limit,
                total_hits: 0,
            });
        Box::pin(async move { Ok(result) })
    }

    fn get_project<'a>(&'a self, id_or_slug: &'a str) -> CatalogFuture<'a, ProjectSummary> {
        self.record(format!("project:{id_or_slug}"));
        let result = match self.failure(id_or_slug) {
            Some(error) => Err(error),
            None => self
                .projects
                .lock()
                .ok()
                .and_then(|projects| projects.get(id_or_slug).cloned())
                .ok_or_else(|| CatalogError::ProjectNotFound {
                    project_id: id_or_slug.to_string(),
                }),
        };
        Box::pin(async move { result })
    }

    fn project_details<'a>(&'a self, id_or_slug: &'a str) -> CatalogFuture<'a, ProjectDetails> {
        let stored = self
            .details
            .lock()
            .ok()
            .and_then(|details| details.get(id_or_slug).cloned());
        match stored {
            Some(details) => {
                self.record(format!("details:{id_or_slug}"));
                Box::pin(async move { Ok(details) })
            }
            None => {
                let summary = self.get_project(id_or_slug);
                Box::pin(async move { summary.await.map(ProjectDetails::from) })
            }
        }
    }

    fn list_versions<'a>(
        &'a self,
        project_id: &'a str,
        _game_version: Option<&'a str>,
        _loader: Option<ModLoader>,
    ) -> CatalogFuture<'a, Vec<VersionRecord>> {
        self.record(format!("versions:{project_id}"));
        let result = self
            .versions
            .lock()
            .ok()
            .and_then(|versions| versions.get(project_id).cloned())
            .ok_or_else(|| CatalogError::ProjectNotFound {
                project_id: project_id.to_string(),
            });
        Box::pin(async move { result })
    }

    fn version_from_hash<'a>(&'a self, sha512: &'a str) -> CatalogFuture<'a, VersionRecord> {
        self.record(format!("hash:{sha512}"));
        let result = self
            .hashes
            .lock()
            .ok()
            .and_then(|hashes| hashes.get(sha512).cloned())
            .ok_or_else(|| CatalogError::HashNotFound {
                hash: sha512.to_string(),
            });
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    include!("modrinth.test.rs");
}
