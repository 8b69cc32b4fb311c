//! Carries out a reconciliation plan
//!
//! Downloads run concurrently, bounded by the networking job budget. Only
//! actions that completed are committed to the manifest; on interruption the
//! in-flight transfers are aborted and their partial files discarded.

use crate::modman::download::{Downloader, checked_file_name};
use crate::modman::errors::{DownloadError, ModFailure};
use crate::modman::manifest::{InstalledMod, ProjectManifest};
use crate::modman::reconcile::{Action, release_dependents};
use crate::networking::NetworkingManager;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct ExecutionReport {
    pub completed: Vec<Action>,
    pub failures: Vec<ModFailure>,
    pub interrupted: bool,
    /// Files replaced by an upgrade, removed once the manifest is saved
    pub superseded: Vec<PathBuf>,
}

impl ExecutionReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !self.interrupted
    }

    /// Delete files left behind by upgrades
    pub fn remove_superseded(&self) {
        for path in &self.superseded {
            match std::fs::remove_file(path) {
                Ok(()) => debug!("removed superseded {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("could not remove {}: {}", path.display(), e),
            }
        }
    }
}

pub struct Executor {
    networking: NetworkingManager,
    downloader: Downloader,
}

type Outcome = (usize, Result<InstalledMod, DownloadError>);

impl Executor {
    pub fn new(networking: NetworkingManager) -> Self {
        let downloader = Downloader::new(networking.http());
        Self {
            networking,
            downloader,
        }
    }

    /// Run `actions`, stopping early on Ctrl-C
    pub async fn execute(
        &self,
        manifest: &mut ProjectManifest,
        actions: &[Action],
        mods_dir: &Path,
    ) -> ExecutionReport {
        self.execute_until(manifest, actions, mods_dir, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run `actions` until they finish or `shutdown` resolves
    pub async fn execute_until<F>(
        &self,
        manifest: &mut ProjectManifest,
        actions: &[Action],
        mods_dir: &Path,
        shutdown: F,
    ) -> ExecutionReport
    where
        F: Future<Output = ()>,
    {
        let mut report = ExecutionReport::default();

        for action in actions {
            if let Action::Remove { entry } = action {
                match remove_file(mods_dir, entry) {
                    Ok(()) => {
                        manifest.remove(&entry.slug);
                        for released in release_dependents(manifest, &entry.slug) {
                            info!("{} is no longer a dependency of {}", released, entry.slug);
                        }
                        report.completed.push(action.clone());
                    }
                    Err(e) => report.failures.push(ModFailure::new(&entry.slug, e)),
                }
            } else if action.is_skip() {
                report.completed.push(action.clone());
            }
        }

        let mut tasks: JoinSet<Outcome> = JoinSet::new();
        for (index, action) in actions.iter().enumerate() {
            let Some(target) = action.download().cloned() else {
                continue;
            };
            let networking = self.networking.clone();
            let downloader = self.downloader.clone();
            let dir = mods_dir.to_path_buf();
            tasks.spawn(async move {
                let result = match networking.acquire().await {
                    Ok(_permit) => downloader.fetch(&target, &dir).await,
                    Err(e) => Err(e.into()),
                };
                (index, result)
            });
        }

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    warn!("interrupted, aborting {} pending downloads", tasks.len());
                    report.interrupted = true;
                    tasks.abort_all();
                    break;
                }
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok(outcome)) => commit(manifest, actions, mods_dir, outcome, &mut report),
                    Some(Err(e)) => warn!("download task failed: {}", e),
                },
            }
        }

        // Transfers that finished before the abort took effect still count.
        while let Some(joined) = tasks.join_next().await {
            if let Ok(outcome) = joined {
                commit(manifest, actions, mods_dir, outcome, &mut report);
            }
        }

        report
    }
}

fn commit(
    manifest: &mut ProjectManifest,
    actions: &[Action],
    mods_dir: &Path,
    (index, result): Outcome,
    report: &mut ExecutionReport,
) {
    let action = &actions[index];
    match result {
        Ok(entry) => {
            if let Action::Upgrade { from, .. } = action {
                if from.file_name != entry.file_name {
                    match checked_file_name(&from.file_name) {
                        Ok(name) => report.superseded.push(mods_dir.join(name)),
                        Err(e) => warn!("leaving superseded {} in place: {}", from.file_name, e),
                    }
                }
            }
            debug!("committed {}", action);
            manifest.insert(entry);
            report.completed.push(action.clone());
        }
        Err(e) => report.failures.push(ModFailure::new(action.slug(), e)),
    }
}

fn remove_file(mods_dir: &Path, entry: &InstalledMod) -> Result<(), DownloadError> {
    let path = mods_dir.join(checked_file_name(&entry.file_name)?);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("{} was already gone", path.display());
            Ok(())
        }
        Err(e) => Err(DownloadError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    include!("executor.test.rs");
}
