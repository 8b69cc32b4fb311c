//! Per-run memoisation of catalog lookups
//!
//! Walking a dependency tree asks for the same popular projects (fabric-api,
//! cloth-config, ...) many times. Successful project and version lookups are
//! kept for the lifetime of the wrapper; errors are never cached.

use crate::api::modrinth::{
    CatalogClient, CatalogError, CatalogFuture, ProjectDetails, ProjectSummary, SearchResults,
    VersionRecord,
};
use crate::primitives::{ModLoader, SearchSort};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::trace;

type VersionKey = (String, Option<String>, Option<ModLoader>);

pub struct CachedCatalog {
    inner: Arc<dyn CatalogClient>,
    projects: RwLock<HashMap<String, ProjectSummary>>,
    versions: RwLock<HashMap<VersionKey, Vec<VersionRecord>>>,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn CatalogClient>) -> Self {
        Self {
            inner,
            projects: RwLock::new(HashMap::new()),
            versions: RwLock::new(HashMap::new()),
        }
    }

    pub async fn cached_projects(&self) -> usize {
        self.projects.read().await.len()
    }

    async fn project(&self, id_or_slug: &str) -> Result<ProjectSummary, CatalogError> {
        if let Some(hit) = self.projects.read().await.get(id_or_slug) {
            trace!("catalog cache hit: project {}", id_or_slug);
            return Ok(hit.clone());
        }

        let project = self.inner.get_project(id_or_slug).await?;
        let mut projects = self.projects.write().await;
        projects.insert(project.id.clone(), project.clone());
        projects.insert(project.slug.clone(), project.clone());
        projects.insert(id_or_slug.to_string(), project.clone());
        Ok(project)
    }

    async fn versions(
        &self,
        project_id: &str,
        game_version: Option<&str>,
        loader: Option<ModLoader>,
    ) -> Result<Vec<VersionRecord>, CatalogError> {
        let key = (
            project_id.to_string(),
            game_version.map(str::to_string),
            loader,
        );
        if let Some(hit) = self.versions.read().await.get(&key) {
            trace!("catalog cache hit: versions {}", project_id);
            return Ok(hit.clone());
        }

        let versions = self
            .inner
            .list_versions(project_id, game_version, loader)
            .await?;
        self.versions.write().await.insert(key, versions.clone());
        Ok(versions)
    }
}

impl CatalogClient for CachedCatalog {
    fn search<'a>(
        &'a self,
        query: &'a str,
        facets: Option<&'a str>,
        sort: SearchSort,
        limit: usize,
        offset: usize,
    ) -> CatalogFuture<'a, SearchResults> {
        self.inner.search(query, facets, sort, limit, offset)
    }

    fn get_project<'a>(&'a self, id_or_slug: &'a str) -> CatalogFuture<'a, ProjectSummary> {
        Box::pin(self.project(id_or_slug))
    }

    fn project_details<'a>(&'a self, id_or_slug: &'a str) -> CatalogFuture<'a, ProjectDetails> {
        self.inner.project_details(id_or_slug)
    }

    fn list_versions<'a>(
        &'a self,
        project_id: &'a str,
        game_version: Option<&'a str>,
        loader: Option<ModLoader>,
    ) -> CatalogFuture<'a, Vec<VersionRecord>> {
        Box::pin(self.versions(project_id, game_version, loader))
    }

    fn version_from_hash<'a>(&'a self, sha512: &'a str) -> CatalogFuture<'a, VersionRecord> {
        self.inner.version_from_hash(sha512)
    }
}

#[cfg(test)]
mod tests {
    include!("cache.test.rs");
}
