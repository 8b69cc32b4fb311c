//! # modman Core
//!
//! Resolution and reconciliation pipeline for a server's mods.
//!
//! ## Modules
//!
//! - [`selector`] - Pick the version matching the server's game version and loader
//! - [`walker`] - Breadth-first dependency resolution from requested roots
//! - [`graph`] - Arena dependency graph built during the walk
//! - [`reconcile`] - Diff resolved targets against the manifest into actions
//! - [`executor`] - Run actions with bounded download concurrency
//! - [`download`] - Streaming, checksum-verified file transfer
//! - [`manifest`] - Persisted `.modman.json` state
//! - [`integrity`] - On-disk checks of installed files
//! - [`pack`] - Client modpack export
//! - [`server`] - Server jar detection

pub mod download;
pub mod errors;
pub mod executor;
pub mod graph;
pub mod integrity;
pub mod manifest;
pub mod pack;
pub mod reconcile;
pub mod selector;
pub mod server;
pub mod walker;

pub use download::Downloader;
pub use errors::{DownloadError, ManifestError, ModFailure, ResolutionError, ResolutionFailure};
pub use executor::{ExecutionReport, Executor};
pub use graph::{DependencyGraph, ModNode, Requiredness};
pub use integrity::{FileState, IntegrityReport};
pub use manifest::{
    InstalledMod, JsonManifestStore, MANIFEST_FILE, MODS_DIR, ManifestStore, ProjectManifest,
};
pub use pack::{PackEntry, PackError};
pub use reconcile::{Action, Reconciliation};
pub use selector::{Channel, SelectionPolicy, Target};
pub use server::{DetectedServer, ServerDetectError};
pub use walker::{Resolution, RootRequest, WalkRequest};
