//! # API Module
//!
//! Remote services consulted while resolving and installing mods.
//!
//! ## Modules
//!
//! - [`modrinth`] - Modrinth catalog client and its data model
//! - [`cache`] - Per-run memoisation in front of a catalog
//! - [`fabric`] - Fabric meta service for server launcher jars

pub mod cache;
pub mod fabric;
pub mod modrinth;

pub use cache::CachedCatalog;
pub use fabric::{FabricMetaClient, FabricMetaError, FabricServerSpec};
pub use modrinth::{
    CatalogClient, CatalogError, LiveModrinthClient, MockCatalogClient, ProjectSummary,
    SearchResults, VersionRecord,
};
