//! Builders for catalog records used across unit and workflow tests
//!
//! Project ids are derived from slugs (`id-<slug>`) so dependency references
//! can be written by slug. Every version gets a deterministic jar body whose
//! sha512 is recorded in the version's primary file.

use crate::api::modrinth::{
    DependencyKind, DependencyRef, FileHashes, ProjectSummary, SideSupport, VersionFile,
    VersionRecord, VersionType,
};
use crate::primitives::ModLoader;
use sha2::{Digest, Sha512};

pub const GAME_VERSION: &str = "1.20.1";

pub fn project_id(slug: &str) -> String {
    format!("id-{slug}")
}

pub fn sha512_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha512::digest(bytes))
}

/// Jar contents served for `slug` at `version_id`
pub fn jar_bytes(slug: &str, version_id: &str) -> Vec<u8> {
    format!("PK fake jar for {slug} {version_id}").into_bytes()
}

pub fn project(slug: &str) -> ProjectSummary {
    ProjectSummary {
        id: project_id(slug),
        slug: slug.to_string(),
        title: slug.replace('-', " "),
        description: String::new(),
        client_side: SideSupport::Required,
        server_side: SideSupport::Required,
    }
}

pub fn server_only_project(slug: &str) -> ProjectSummary {
    ProjectSummary {
        client_side: SideSupport::Unsupported,
        ..project(slug)
    }
}

pub struct VersionBuilder {
    slug: String,
    record: VersionRecord,
}

impl VersionBuilder {
    pub fn new(slug: &str, version_id: &str) -> Self {
        let body = jar_bytes(slug, version_id);
        let record = VersionRecord {
            id: version_id.to_string(),
            project_id: project_id(slug),
            name: format!("{slug} {version_id}"),
            version_number: version_id.to_string(),
            version_type: VersionType::Release,
            date_published: "2024-01-01T00:00:00Z".to_string(),
            changelog: None,
            downloads: 0,
            game_versions: vec![GAME_VERSION.to_string()],
            loaders: vec![ModLoader::Fabric],
            dependencies: Vec::new(),
            files: vec![VersionFile {
                hashes: FileHashes {
                    sha512: sha512_hex(&body),
                    sha1: None,
                },
                url: format!("https://cdn.modrinth.test/{slug}/{version_id}.jar"),
                filename: format!("{slug}-{version_id}.jar"),
                primary: true,
                size: Some(body.len() as u64),
            }],
        };
        Self {
            slug: slug.to_string(),
            record,
        }
    }

    pub fn game_versions(mut self, versions: &[&str]) -> Self {
        self.record.game_versions = versions.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn loaders(mut self, loaders: &[ModLoader]) -> Self {
        self.record.loaders = loaders.to_vec();
        self
    }

    pub fn version_type(mut self, version_type: VersionType) -> Self {
        self.record.version_type = version_type;
        self
    }

    pub fn version_number(mut self, number: &str) -> Self {
        self.record.version_number = number.to_string();
        self
    }

    pub fn published(mut self, date: &str) -> Self {
        self.record.date_published = date.to_string();
        self
    }

    pub fn changelog(mut self, text: &str) -> Self {
        self.record.changelog = Some(text.to_string());
        self
    }

    pub fn downloads(mut self, downloads: u64) -> Self {
        self.record.downloads = downloads;
        self
    }

    fn depends(mut self, slug: &str, kind: DependencyKind) -> Self {
        self.record.dependencies.push(DependencyRef {
            version_id: None,
            project_id: Some(project_id(slug)),
            file_name: None,
            dependency_type: kind,
        });
        self
    }

    pub fn requires(self, slug: &str) -> Self {
        self.depends(slug, DependencyKind::Required)
    }

    pub fn optional(self, slug: &str) -> Self {
        self.depends(slug, DependencyKind::Optional)
    }

    pub fn incompatible(self, slug: &str) -> Self {
        self.depends(slug, DependencyKind::Incompatible)
    }

    pub fn embeds(self, slug: &str) -> Self {
        self.depends(slug, DependencyKind::Embedded)
    }

    pub fn no_files(mut self) -> Self {
        self.record.files.clear();
        self
    }

    /// Point the primary file at `<base_url>/<slug>/<version>.jar`
    pub fn served_from(mut self, base_url: &str) -> Self {
        let url = format!("{base_url}/{}/{}.jar", self.slug, self.record.id);
        if let Some(file) = self.record.files.first_mut() {
            file.url = url;
        }
        self
    }

    /// Record a checksum that the served bytes will not match
    pub fn wrong_checksum(mut self) -> Self {
        if let Some(file) = self.record.files.first_mut() {
            file.hashes.sha512 = sha512_hex(b"something else entirely");
        }
        self
    }

    pub fn build(self) -> VersionRecord {
        self.record
    }
}

pub fn version(slug: &str, version_id: &str) -> VersionRecord {
    VersionBuilder::new(slug, version_id).build()
}
