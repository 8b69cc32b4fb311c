//! Test fixtures shared by unit tests and the workflow test crate
//!
//! Compiled for `cfg(test)` and with the `test-utils` feature.

pub mod catalog;
pub mod filesystem;

pub use catalog::{VersionBuilder, jar_bytes, project, project_id, server_only_project, sha512_hex, version};
pub use filesystem::ServerDirFixture;
