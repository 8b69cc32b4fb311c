//! Fabric meta client
//!
//! Resolves game, loader and installer versions for a Fabric server launcher
//! and builds the launcher download URL.

use crate::networking::RateLimitedClient;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_META_URL: &str = "https://meta.fabricmc.net/v2";

#[derive(Debug, Error)]
pub enum FabricMetaError {
    #[error("HTTP request failed: {source}")]
    RequestFailed {
        #[from]
        source: reqwest::Error,
    },

    #[error("Network error: {source}")]
    NetworkError {
        #[from]
        source: crate::networking::NetworkingError,
    },

    #[error("Fabric meta returned HTTP {status} for {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Unknown Minecraft version: {version}")]
    UnknownGameVersion { version: String },

    #[error("No {component} versions available for {game_version}")]
    NoStableVersion {
        component: &'static str,
        game_version: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameVersion {
    pub version: String,
    #[serde(default)]
    pub stable: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentVersion {
    pub version: String,
    #[serde(default)]
    pub stable: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct LoaderEntry {
    loader: ComponentVersion,
}

/// Versions that identify one Fabric server launcher build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FabricServerSpec {
    pub game_version: String,
    pub loader_version: String,
    pub installer_version: String,
}

impl FabricServerSpec {
    /// File name Fabric itself suggests for the launcher
    pub fn jar_name(&self) -> String {
        format!(
            "fabric-server-mc.{}-loader.{}-launcher.{}.jar",
            self.game_version, self.loader_version, self.installer_version
        )
    }
}

impl fmt::Display for FabricServerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Minecraft {} / loader {} / installer {}",
            self.game_version, self.loader_version, self.installer_version
        )
    }
}

pub struct FabricMetaClient {
    http: Arc<RateLimitedClient>,
    base_url: String,
}

impl FabricMetaClient {
    pub fn new(http: Arc<RateLimitedClient>) -> Self {
        Self::with_base_url(http, DEFAULT_META_URL.to_string())
    }

    pub fn with_base_url(http: Arc<RateLimitedClient>, base_url: String) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FabricMetaError> {
        let response = self.http.get(url).await?;
        if !response.status().is_success() {
            return Err(FabricMetaError::UnexpectedStatus {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    /// Game versions that have intermediary mappings, newest first
    pub async fn game_versions(&self) -> Result<Vec<GameVersion>, FabricMetaError> {
        self.get_json(&format!("{}/versions/game/intermediary", self.base_url))
            .await
    }

    pub async fn loader_versions(
        &self,
        game_version: &str,
    ) -> Result<Vec<ComponentVersion>, FabricMetaError> {
        let entries: Vec<LoaderEntry> = self
            .get_json(&format!("{}/versions/loader/{}", self.base_url, game_version))
            .await?;
        Ok(entries.into_iter().map(|entry| entry.loader).collect())
    }

    pub async fn installer_versions(&self) -> Result<Vec<ComponentVersion>, FabricMetaError> {
        self.get_json(&format!("{}/versions/installer", self.base_url))
            .await
    }

    /// Fill in missing versions with the latest stable ones
    ///
    /// `game_version` may be `None` or `"latest"` for the newest stable game
    /// release; an explicit version must be known to Fabric.
    pub async fn resolve(
        &self,
        game_version: Option<&str>,
        loader_version: Option<&str>,
        installer_version: Option<&str>,
    ) -> Result<FabricServerSpec, FabricMetaError> {
        let games = self.game_versions().await?;
        let game_version = match game_version {
            None | Some("latest") => games
                .iter()
                .find(|game| game.stable)
                .map(|game| game.version.clone())
                .ok_or_else(|| FabricMetaError::NoStableVersion {
                    component: "game",
                    game_version: "latest".to_string(),
                })?,
            Some(requested) => {
                if !games.iter().any(|game| game.version == requested) {
                    return Err(FabricMetaError::UnknownGameVersion {
                        version: requested.to_string(),
                    });
                }
                requested.to_string()
            }
        };

        let loader_version = match loader_version {
            Some(version) => version.to_string(),
            None => latest_stable(&self.loader_versions(&game_version).await?).ok_or_else(
                || FabricMetaError::NoStableVersion {
                    component: "loader",
                    game_version: game_version.clone(),
                },
            )?,
        };

        let installer_version = match installer_version {
            Some(version) => version.to_string(),
            None => latest_stable(&self.installer_versions().await?).ok_or_else(|| {
                FabricMetaError::NoStableVersion {
                    component: "installer",
                    game_version: game_version.clone(),
                }
            })?,
        };

        let spec = FabricServerSpec {
            game_version,
            loader_version,
            installer_version,
        };
        debug!("resolved Fabric server: {}", spec);
        Ok(spec)
    }

    pub fn server_jar_url(&self, spec: &FabricServerSpec) -> String {
        format!(
            "{}/versions/loader/{}/{}/{}/server/jar",
            self.base_url, spec.game_version, spec.loader_version, spec.installer_version
        )
    }
}

/// Highest stable version by semver; unparsable versions rank below all others
pub fn latest_stable(versions: &[ComponentVersion]) -> Option<String> {
    versions
        .iter()
        .filter(|candidate| candidate.stable)
        .max_by(|a, b| {
            let a_parsed = semver::Version::parse(&a.version).ok();
            let b_parsed = semver::Version::parse(&b.version).ok();
            a_parsed.cmp(&b_parsed)
        })
        .map(|version| version.version.clone())
}

#[cfg(test)]
mod tests {
    include!("fabric.test.rs");
}
