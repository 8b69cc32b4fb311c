//! Command execution handlers
//!
//! Every handler takes a [`Session`] and returns a [`CommandReport`]. Hard
//! errors (no manifest, corrupt manifest, unusable server directory) abort
//! with `Err`; per-mod failures are collected in the report and printed at
//! the end so one bad mod never stops the rest.

use crate::api::modrinth::{ProjectDetails, VersionRecord, server_mod_facets};
use crate::application::session::{CommandSession, Session};
use crate::application::{CliConfig, Commands};
use crate::display::{DisplayProviderExt, OperationSummary};
use crate::logger::Logger;
use crate::modman::download::{Downloader, checked_file_name};
use crate::modman::errors::{ManifestError, ModFailure};
use crate::modman::executor::Executor;
use crate::modman::integrity::{FileState, IntegrityReport, hash_file};
use crate::modman::manifest::{InstalledMod, MODS_DIR, ProjectManifest, warn_stale};
use crate::modman::reconcile::{self, Action};
use crate::modman::selector::Channel;
use crate::modman::walker::{self, RootRequest, WalkRequest};
use crate::modman::{pack, server};
use crate::primitives::{ChangelogSort, ModLoader, SearchSort, SortDirection};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How many search hits to offer when an identifier is unknown
const SEARCH_CHOICES: usize = 10;

/// Largest page the catalog serves
const MAX_SEARCH_LIMIT: usize = 100;

/// Per-mod failures collected over one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandReport {
    pub failures: Vec<ModFailure>,
}

impl CommandReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, identifier: impl Into<String>, message: impl fmt::Display) {
        self.failures.push(ModFailure::new(identifier, message));
    }
}

/// Execute CLI commands with a live session
pub async fn execute_command(config: CliConfig) -> Result<CommandReport> {
    let logger = Logger::init(config.app_config.to_logger_config())
        .context("Failed to initialise logging")?;
    debug!(level = ?logger.level(), file_logging = logger.file_logging(), "logger ready");

    let session = CommandSession::new(config.app_config)?;

    let Some(command) = config.command else {
        session
            .display()
            .status()
            .message("modman - Minecraft server mod manager");
        session
            .display()
            .status()
            .subtle("Run 'modman --help' for usage information");
        return Ok(CommandReport::default());
    };

    execute_command_with_session(command, &session).await
}

/// Execute a specific command with a provided session (for testing)
pub async fn execute_command_with_session(
    command: Commands,
    session: &dyn Session,
) -> Result<CommandReport> {
    let name = command.name();
    debug!("running {}", name);

    let report = match command {
        Commands::Init {
            name,
            no_auto,
            loader,
            game_version,
        } => handle_init(session, name, no_auto, loader, game_version).await?,
        Commands::Install {
            mods,
            reinstall,
            optional,
            dry,
        } => handle_install(session, mods, reinstall, optional, dry).await?,
        Commands::Uninstall { mods } => handle_uninstall(session, mods).await?,
        Commands::Update {
            mods,
            game_version,
            prerelease,
        } => handle_update(session, mods, game_version, prerelease).await?,
        Commands::List => handle_list(session)?,
        Commands::Pack {
            include_server_side,
        } => handle_pack(session, include_server_side)?,
        Commands::DownloadFabric {
            mc_version,
            loader,
            installer,
        } => handle_download_fabric(session, mc_version, loader, installer).await?,
        Commands::Search {
            query,
            limit,
            page,
            sort_by,
        } => handle_search(session, query, limit, page, sort_by).await?,
        Commands::View { project } => handle_view(session, project).await?,
        Commands::Changelog {
            project,
            version,
            verbose,
            sort_by,
            direction,
            limit,
        } => {
            let order = ChangelogOrder {
                sort_by,
                direction,
                limit,
            };
            handle_changelog(session, project, version, verbose, order).await?
        }
    };

    if !report.is_success() {
        session.display().status().section("Failures");
        for failure in &report.failures {
            session
                .display()
                .status()
                .error(&failure.identifier, &failure.message);
        }
    }
    Ok(report)
}

/// A loaded manifest and the server root it belongs to
struct Project {
    root: PathBuf,
    manifest: ProjectManifest,
}

impl Project {
    fn open(session: &dyn Session) -> Result<Self> {
        let store = session.manifest_store();
        let root = store.locate(session.workdir())?;
        let manifest = store
            .load(&root)
            .with_context(|| format!("Failed to load the manifest in {}", root.display()))?;
        warn_stale(&manifest);
        Ok(Self { root, manifest })
    }

    fn mods_dir(&self) -> PathBuf {
        self.root.join(MODS_DIR)
    }

    fn save(&self, session: &dyn Session) -> Result<()> {
        session
            .manifest_store()
            .save(&self.manifest, &self.root)
            .with_context(|| format!("Failed to save the manifest in {}", self.root.display()))
    }
}

/// The manifest, for commands that only use it to tailor their output
fn optional_manifest(session: &dyn Session) -> Option<ProjectManifest> {
    let store = session.manifest_store();
    store
        .locate(session.workdir())
        .and_then(|root| store.load(&root))
        .map_err(|e| debug!("continuing without a project: {}", e))
        .ok()
}

// ===== INIT =====

async fn handle_init(
    session: &dyn Session,
    name: Option<String>,
    no_auto: bool,
    loader: Option<ModLoader>,
    game_version: Option<String>,
) -> Result<CommandReport> {
    let root = session.workdir().to_path_buf();
    let store = session.manifest_store();
    if store.exists(&root) {
        bail!("{} already has a modman manifest", root.display());
    }
    if no_auto && (loader.is_none() || game_version.is_none()) {
        bail!("--no-auto needs both a loader and a game version");
    }

    let detected = if no_auto {
        None
    } else {
        session.display().status().checking("Looking for a server jar");
        server::find_server_jar(&root)
            .with_context(|| format!("Failed to scan {}", root.display()))?
    };
    if let Some(found) = &detected {
        session.display().status().success(
            "Detected",
            &format!("{} {} ({})", found.loader, found.game_version, found.jar.display()),
        );
    }

    let loader = loader
        .or_else(|| detected.as_ref().map(|found| found.loader))
        .context("No server jar found; pass the loader and game version explicitly")?;
    let game_version = game_version
        .or_else(|| detected.as_ref().map(|found| found.game_version.clone()))
        .context("No server jar found; pass the game version explicitly")?;
    let loader_version = detected
        .as_ref()
        .filter(|found| found.loader == loader)
        .and_then(|found| found.loader_version.clone());
    let name = name.unwrap_or_else(|| {
        root.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "server".to_string())
    });

    let mut manifest = ProjectManifest::new(name, game_version, loader, loader_version);
    manifest.server_jar = detected.map(|found| match found.jar.strip_prefix(&root) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => found.jar.clone(),
    });

    let mut report = CommandReport::default();
    if !no_auto {
        register_existing(session, &mut manifest, &root.join(MODS_DIR), &mut report).await?;
    }

    store
        .save(&manifest, &root)
        .with_context(|| format!("Failed to write the manifest in {}", root.display()))?;

    session.display().status().complete(&format!("Initialised {}", manifest.name));
    session.display().table().properties(&[
        ("Minecraft", manifest.game_version.as_str()),
        ("Loader", manifest.loader.as_str()),
        (
            "Loader version",
            manifest.loader_version.as_deref().unwrap_or("-"),
        ),
        ("Mods", &manifest.mods.len().to_string()),
    ]);
    Ok(report)
}

/// Adopt jars already in `mods/` that the catalog recognises by hash
async fn register_existing(
    session: &dyn Session,
    manifest: &mut ProjectManifest,
    mods_dir: &Path,
    report: &mut CommandReport,
) -> Result<()> {
    if !mods_dir.is_dir() {
        return Ok(());
    }

    let mut jars: Vec<PathBuf> = std::fs::read_dir(mods_dir)
        .with_context(|| format!("Failed to read {}", mods_dir.display()))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "jar"))
        .collect();
    jars.sort();

    for jar in jars {
        let local_name = jar
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match adopt_jar(session, &jar, mods_dir).await {
            Ok(Some(entry)) => {
                session
                    .display()
                    .status()
                    .success(&entry.slug, &entry.version.version_number);
                manifest.insert(entry);
            }
            Ok(None) => session
                .display()
                .status()
                .warning(&format!("{local_name} is not on Modrinth; leaving it unmanaged")),
            Err(e) => report.fail(local_name, format!("{e:#}")),
        }
    }
    Ok(())
}

async fn adopt_jar(
    session: &dyn Session,
    jar: &Path,
    mods_dir: &Path,
) -> Result<Option<InstalledMod>> {
    let checksum = hash_file(jar).with_context(|| format!("Failed to read {}", jar.display()))?;
    let version = match session.catalog().version_from_hash(&checksum).await {
        Ok(version) => version,
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let project = session.catalog().get_project(&version.project_id).await?;
    let mut entry = InstalledMod::from_selection(&project, &version, None)
        .map_err(|reason| anyhow::anyhow!("{}: {reason}", project.slug))?;

    // The hash may match a secondary file of the version
    if let Some(file) = version
        .files
        .iter()
        .find(|file| file.hashes.sha512.eq_ignore_ascii_case(&checksum))
    {
        entry.file_name = file.filename.clone();
        entry.download_url = file.url.clone();
    }
    entry.checksum = checksum;

    let canonical = mods_dir.join(checked_file_name(&entry.file_name)?);
    if canonical != jar {
        std::fs::rename(jar, &canonical).with_context(|| {
            format!("Failed to rename {} to {}", jar.display(), entry.file_name)
        })?;
        debug!("renamed {} to {}", jar.display(), entry.file_name);
    }
    Ok(Some(entry))
}

// ===== INSTALL / UPDATE / UNINSTALL =====

async fn handle_install(
    session: &dyn Session,
    mods: Vec<String>,
    reinstall: bool,
    optional: bool,
    dry: bool,
) -> Result<CommandReport> {
    let mut project = Project::open(session)?;
    let mut report = CommandReport::default();

    let roots: Vec<RootRequest> = if mods.is_empty() {
        if project.manifest.mods.is_empty() {
            session.display().status().info("No mods installed; nothing to check");
            return Ok(report);
        }
        project.manifest.mods.keys().map(RootRequest::new).collect()
    } else {
        resolve_roots(session, &project.manifest, &mods, &mut report).await
    };
    if roots.is_empty() {
        return Ok(report);
    }

    let force: Vec<String> = if reinstall {
        roots.iter().map(|root| root.identifier.clone()).collect()
    } else {
        Vec::new()
    };
    let request = WalkRequest::install(roots, optional).with_force(force);

    resolve_and_apply(session, &mut project, &request, dry, "install", &mut report).await?;
    Ok(report)
}

async fn handle_update(
    session: &dyn Session,
    mods: Vec<String>,
    game_version: Option<String>,
    prerelease: bool,
) -> Result<CommandReport> {
    let mut project = Project::open(session)?;
    let mut report = CommandReport::default();

    if let Some(game_version) = game_version {
        if game_version != project.manifest.game_version {
            session.display().status().info(&format!(
                "Moving from Minecraft {} to {}",
                project.manifest.game_version, game_version
            ));
            project.manifest.game_version = game_version;
        }
    }

    let roots: Vec<RootRequest> = if mods.is_empty() {
        project.manifest.mods.keys().map(RootRequest::new).collect()
    } else {
        let mut roots = Vec::new();
        for identifier in &mods {
            match project.manifest.key_of(identifier) {
                Some(slug) => roots.push(RootRequest::new(slug)),
                None => report.fail(identifier, "not installed; use `modman install`"),
            }
        }
        roots
    };

    let channel = if prerelease { Channel::Any } else { Channel::Stable };
    let request = WalkRequest::install(roots, false).refreshing(channel);

    resolve_and_apply(session, &mut project, &request, false, "update", &mut report).await?;
    Ok(report)
}

async fn handle_uninstall(session: &dyn Session, mods: Vec<String>) -> Result<CommandReport> {
    let mut project = Project::open(session)?;
    let mut report = CommandReport::default();

    let names: Vec<String> = mods
        .iter()
        .map(|raw| uninstall_name(session.workdir(), raw))
        .collect();
    let (plan, missing) = reconcile::remove(&project.manifest, &names);
    for identifier in missing {
        report.fail(identifier, "not installed");
    }
    if plan.actions.is_empty() {
        return Ok(report);
    }

    show_plan(session, &plan.actions);
    execute_plan(session, &mut project, &plan.actions, "uninstall", &mut report).await?;
    Ok(report)
}

/// A path to an existing file names the mod by its jar name
fn uninstall_name(workdir: &Path, raw: &str) -> String {
    let path = workdir.join(raw);
    match path.file_name() {
        Some(name) if path.is_file() => name.to_string_lossy().into_owned(),
        _ => raw.to_string(),
    }
}

/// Turn user identifiers into walk roots, searching for names the catalog does not know
async fn resolve_roots(
    session: &dyn Session,
    manifest: &ProjectManifest,
    identifiers: &[String],
    report: &mut CommandReport,
) -> Vec<RootRequest> {
    let mut roots = Vec::new();
    for raw in identifiers {
        let request = RootRequest::parse(raw);
        if request.identifier.is_empty() {
            report.fail(raw, "empty identifier");
            continue;
        }
        if manifest.contains(&request.identifier) {
            roots.push(request);
            continue;
        }

        match session.catalog().get_project(&request.identifier).await {
            Ok(_) => roots.push(request),
            Err(e) if e.is_not_found() => {
                match search_for(session, manifest, &request.identifier).await {
                    Ok(Some(slug)) => {
                        info!("using {} for '{}'", slug, request.identifier);
                        roots.push(RootRequest {
                            identifier: slug,
                            pinned: request.pinned,
                        });
                    }
                    Ok(None) => report.fail(&request.identifier, "no matching mod found"),
                    Err(e) => report.fail(&request.identifier, format!("{e:#}")),
                }
            }
            Err(e) => report.fail(&request.identifier, e),
        }
    }
    roots
}

/// Search the catalog for `query` and let the user pick a hit
async fn search_for(
    session: &dyn Session,
    manifest: &ProjectManifest,
    query: &str,
) -> Result<Option<String>> {
    let facets = server_mod_facets(&manifest.game_version, manifest.loader);
    let results = session
        .catalog()
        .search(query, Some(&facets), SearchSort::Relevance, SEARCH_CHOICES, 0)
        .await
        .with_context(|| format!("Search for '{query}' failed"))?;
    if results.hits.is_empty() {
        return Ok(None);
    }

    let options: Vec<String> = results
        .hits
        .iter()
        .map(|hit| format!("{} ({})", hit.title, hit.slug))
        .collect();
    let choice = session
        .interactive()
        .fuzzy_select(&format!("'{query}' is not a Modrinth project; pick one"), &options)?;
    Ok(choice
        .and_then(|index| results.hits.get(index))
        .map(|hit| hit.slug.clone()))
}

async fn resolve_and_apply(
    session: &dyn Session,
    project: &mut Project,
    request: &WalkRequest,
    dry: bool,
    operation: &str,
    report: &mut CommandReport,
) -> Result<()> {
    session.display().status().checking("Resolving mods");
    let integrity = IntegrityReport::scan(&project.manifest, &project.mods_dir());
    let resolution =
        walker::resolve(request, &project.manifest, &integrity, session.catalog()).await;
    report
        .failures
        .extend(resolution.errors.iter().map(ModFailure::from));

    let plan = reconcile::apply(
        &project.manifest,
        &resolution.to_install,
        &request.force,
        &integrity,
    );
    show_plan(session, &plan.actions);

    if dry {
        session
            .display()
            .status()
            .info(&format!("Dry run: {} downloads planned, nothing changed", plan.downloads()));
        return Ok(());
    }
    if plan.is_noop() {
        session.display().status().success("Up to date", "");
    }
    execute_plan(session, project, &plan.actions, operation, report).await
}

fn show_plan(session: &dyn Session, actions: &[Action]) {
    let skipped = actions.iter().filter(|action| action.is_skip()).count();
    let changes: Vec<String> = actions
        .iter()
        .filter(|action| !action.is_skip())
        .map(ToString::to_string)
        .collect();

    if !changes.is_empty() {
        session.display().status().section("Plan");
        let items: Vec<&str> = changes.iter().map(String::as_str).collect();
        session.display().status().list(&items);
    }
    if skipped > 0 {
        session
            .display()
            .status()
            .subtle(&format!("{skipped} already installed"));
    }
}

async fn execute_plan(
    session: &dyn Session,
    project: &mut Project,
    actions: &[Action],
    operation: &str,
    report: &mut CommandReport,
) -> Result<()> {
    let executor = Executor::new(session.networking().clone());
    let mods_dir = project.mods_dir();
    let execution = executor
        .execute(&mut project.manifest, actions, &mods_dir)
        .await;

    project.save(session)?;
    execution.remove_superseded();

    let mut changed = 0;
    for action in execution.completed.iter().filter(|action| !action.is_skip()) {
        session
            .display()
            .status()
            .success(action.slug(), &action.to_string());
        changed += 1;
    }
    let failed = execution.failures.len();
    report.failures.extend(execution.failures);

    if execution.interrupted {
        bail!("Interrupted; {changed} completed changes were saved");
    }
    if changed > 0 || failed > 0 {
        session
            .display()
            .display_summary(operation, &OperationSummary::new(changed, failed));
    }
    Ok(())
}

// ===== LIST / PACK =====

fn state_label(entry: &InstalledMod, state: Option<&FileState>, game_version: &str) -> String {
    match state {
        Some(FileState::Valid) if !entry.supports_game_version(game_version) => "stale".into(),
        Some(FileState::Valid) => "ok".into(),
        Some(FileState::Missing) | None => "missing".into(),
        Some(FileState::Corrupt { .. }) => "corrupt".into(),
        Some(FileState::Unreadable { .. }) => "unreadable".into(),
    }
}

fn handle_list(session: &dyn Session) -> Result<CommandReport> {
    let project = Project::open(session)?;
    let manifest = &project.manifest;

    session.display().table().properties(&[
        ("Server", manifest.name.as_str()),
        ("Minecraft", manifest.game_version.as_str()),
        ("Loader", manifest.loader.as_str()),
    ]);
    if manifest.mods.is_empty() {
        session.display().status().info("No mods installed");
        return Ok(CommandReport::default());
    }

    let integrity = IntegrityReport::scan(manifest, &project.mods_dir());
    let rows: Vec<Vec<String>> = manifest
        .mods
        .values()
        .map(|entry| {
            vec![
                entry.slug.clone(),
                entry.title.clone(),
                entry.version.version_number.clone(),
                entry.file_name.clone(),
                state_label(entry, integrity.state(&entry.slug), &manifest.game_version),
            ]
        })
        .collect();
    session
        .display()
        .table()
        .table(&["Slug", "Title", "Version", "File", "State"], &rows);

    let broken = integrity.broken();
    if !broken.is_empty() {
        session.display().status().subtle(&format!(
            "Run 'modman install' to repair {}",
            broken.join(", ")
        ));
    }
    Ok(CommandReport::default())
}

fn handle_pack(session: &dyn Session, include_server_side: bool) -> Result<CommandReport> {
    let project = Project::open(session)?;
    let entries = pack::collect(&project.manifest, &project.mods_dir(), include_server_side)
        .context("Cannot pack the mods directory; run 'modman install' to repair it")?;
    let path = project.root.join(pack::archive_name(&project.manifest));
    pack::write_archive(&entries, &path)?;

    session.display().status().success(
        "Packed",
        &format!("{} mods into {}", entries.len(), path.display()),
    );
    Ok(CommandReport::default())
}

// ===== FABRIC / SEARCH =====

async fn handle_download_fabric(
    session: &dyn Session,
    mc_version: String,
    loader: Option<String>,
    installer: Option<String>,
) -> Result<CommandReport> {
    let store = session.manifest_store();
    let project = match store.locate(session.workdir()) {
        Ok(_) => Some(Project::open(session)?),
        Err(ManifestError::NotFound { .. }) => None,
        Err(e) => return Err(e.into()),
    };

    session
        .display()
        .status()
        .checking("Resolving Fabric versions");
    let spec = session
        .fabric()
        .resolve(Some(&mc_version), loader.as_deref(), installer.as_deref())
        .await
        .context("Failed to resolve Fabric versions")?;

    let root = project
        .as_ref()
        .map(|p| p.root.clone())
        .unwrap_or_else(|| session.workdir().to_path_buf());
    let jar_name = spec.jar_name();
    let dest = root.join(&jar_name);
    Downloader::new(session.networking().http())
        .fetch_file(&session.fabric().server_jar_url(&spec), &dest, None)
        .await
        .with_context(|| format!("Failed to download {jar_name}"))?;
    session
        .display()
        .status()
        .success("Downloaded", &format!("{jar_name} ({spec})"));

    if let Some(mut project) = project {
        if project.manifest.loader != ModLoader::Fabric {
            warn!(
                "switching server loader from {} to fabric",
                project.manifest.loader
            );
        }
        project.manifest.loader = ModLoader::Fabric;
        project.manifest.game_version = spec.game_version.clone();
        project.manifest.loader_version = Some(spec.loader_version.clone());
        project.manifest.server_jar = Some(PathBuf::from(&jar_name));
        project.save(session)?;
        warn_stale(&project.manifest);
        session
            .display()
            .status()
            .info("Updated the manifest; run 'modman update' if mods are stale");
    }
    Ok(CommandReport::default())
}

async fn handle_search(
    session: &dyn Session,
    query: String,
    limit: usize,
    page: usize,
    sort: SearchSort,
) -> Result<CommandReport> {
    if limit == 0 || page == 0 {
        bail!("--limit and --page must be at least 1");
    }
    if limit > MAX_SEARCH_LIMIT {
        bail!("--limit must be at most {MAX_SEARCH_LIMIT}");
    }

    let manifest = optional_manifest(session);
    let facets = manifest
        .as_ref()
        .map(|m| server_mod_facets(&m.game_version, m.loader));

    let results = session
        .catalog()
        .search(&query, facets.as_deref(), sort, limit, (page - 1) * limit)
        .await
        .with_context(|| format!("Search for '{query}' failed"))?;
    if results.hits.is_empty() {
        session
            .display()
            .status()
            .info(&format!("No mods found for '{query}'"));
        return Ok(CommandReport::default());
    }

    let rows: Vec<Vec<String>> = results
        .hits
        .iter()
        .map(|hit| {
            let installed = manifest
                .as_ref()
                .is_some_and(|m| m.contains(&hit.slug) || m.contains(&hit.project_id));
            vec![
                if installed { "yes" } else { "" }.to_string(),
                hit.slug.clone(),
                hit.title.clone(),
                hit.downloads.to_string(),
                hit.description.chars().take(60).collect(),
            ]
        })
        .collect();
    session.display().table().table(
        &["Installed", "Slug", "Title", "Downloads", "Description"],
        &rows,
    );

    let pages = results.total_hits.div_ceil(limit).max(1);
    session.display().status().subtle(&format!(
        "Page {page} of {pages} ({} results)",
        results.total_hits
    ));
    Ok(CommandReport::default())
}

// ===== VIEW / CHANGELOG =====

async fn handle_view(session: &dyn Session, project: String) -> Result<CommandReport> {
    let details = session
        .catalog()
        .project_details(&project)
        .await
        .with_context(|| format!("Failed to look up '{project}'"))?;
    let installed = optional_manifest(session).and_then(|manifest| {
        manifest
            .find(&details.summary.id)
            .map(|entry| entry.version.version_number.clone())
    });

    session.display().status().section(&details.summary.title);
    if !details.summary.description.is_empty() {
        session
            .display()
            .status()
            .message(&details.summary.description);
    }
    let properties = view_properties(&details, installed.as_deref());
    let pairs: Vec<(&str, &str)> = properties
        .iter()
        .map(|(label, value)| (*label, value.as_str()))
        .collect();
    session.display().table().properties(&pairs);

    let links = details.links();
    if !links.is_empty() {
        session.display().status().section("Links");
        session.display().table().properties(&links);
    }
    if !details.body.is_empty() {
        session.display().status().section("Description");
        session.display().status().message(&details.body);
    }
    Ok(CommandReport::default())
}

fn view_properties(details: &ProjectDetails, installed: Option<&str>) -> Vec<(&'static str, String)> {
    let summary = &details.summary;
    let mut properties = vec![
        ("Slug", summary.slug.clone()),
        ("Categories", details.categories.join(", ")),
        ("Server side", summary.server_side.as_str().to_string()),
        ("Client side", summary.client_side.as_str().to_string()),
        ("Status", details.status.clone()),
        ("Downloads", details.downloads.to_string()),
        ("Followers", details.followers.to_string()),
    ];
    if let Some(license) = &details.license {
        let name = if license.name.is_empty() { &license.id } else { &license.name };
        properties.push(("License", name.clone()));
    }
    if !details.game_versions.is_empty() {
        let newest_first: Vec<&str> = details.game_versions.iter().rev().map(String::as_str).collect();
        properties.push(("Game versions", newest_first.join(", ")));
    }
    if let Some(version) = installed {
        properties.push(("Installed", version.to_string()));
    }
    properties.push(("Modrinth", details.page_url()));
    properties
}

/// Ordering and size of a changelog listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChangelogOrder {
    sort_by: ChangelogSort,
    direction: SortDirection,
    limit: usize,
}

async fn handle_changelog(
    session: &dyn Session,
    project: String,
    version: Option<String>,
    verbose: bool,
    order: ChangelogOrder,
) -> Result<CommandReport> {
    if order.limit == 0 {
        bail!("--limit must be at least 1");
    }

    let summary = session
        .catalog()
        .get_project(&project)
        .await
        .with_context(|| format!("Failed to look up '{project}'"))?;
    let loader = optional_manifest(session)
        .map(|manifest| manifest.loader)
        .filter(ModLoader::is_known);
    let versions = session
        .catalog()
        .list_versions(&summary.id, None, loader)
        .await
        .with_context(|| format!("Failed to list versions of {}", summary.slug))?;

    let shown: Vec<&VersionRecord> = match version.as_deref() {
        None => changelog_listing(&versions, order),
        Some(wanted) => {
            let found = match wanted {
                "latest" => versions.first(),
                "oldest" | "first" => versions.last(),
                _ => versions
                    .iter()
                    .find(|v| v.id == wanted || v.version_number == wanted),
            };
            match found {
                Some(found) => vec![found],
                None => bail!("{} has no version '{wanted}'", summary.slug),
            }
        }
    };
    if shown.is_empty() {
        session
            .display()
            .status()
            .info(&format!("{} has no published versions", summary.slug));
        return Ok(CommandReport::default());
    }

    let now = Utc::now();
    for entry in shown {
        session
            .display()
            .status()
            .section(&format!("{} - {}", entry.id, entry.version_number));
        if verbose {
            let released = entry
                .published_at()
                .map(|published| released_ago(published, now))
                .unwrap_or_else(|| "unknown".to_string());
            session.display().status().subtle(&format!(
                "Released {released} | Downloads: {}",
                entry.downloads
            ));
        }
        let text = entry
            .changelog
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or("No changelog for this version.");
        session.display().status().message(text);
    }
    Ok(CommandReport::default())
}

/// Sort, drop repeated version numbers, then cut to the limit
fn changelog_listing(versions: &[VersionRecord], order: ChangelogOrder) -> Vec<&VersionRecord> {
    let mut sorted: Vec<&VersionRecord> = versions.iter().collect();
    sorted.sort_by(|a, b| {
        let ordering = compare_versions(a, b, order.sort_by);
        match order.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|v| seen.insert(v.version_number.as_str()))
        .take(order.limit)
        .collect()
}

fn compare_versions(a: &VersionRecord, b: &VersionRecord, key: ChangelogSort) -> Ordering {
    match key {
        ChangelogSort::Date => a.published_at().cmp(&b.published_at()),
        ChangelogSort::Downloads => a.downloads.cmp(&b.downloads),
        ChangelogSort::ChangelogSize => changelog_len(a).cmp(&changelog_len(b)),
        ChangelogSort::VersionNumber => {
            match (
                semver::Version::parse(&a.version_number),
                semver::Version::parse(&b.version_number),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => a.version_number.cmp(&b.version_number),
            }
        }
    }
}

fn changelog_len(version: &VersionRecord) -> usize {
    version.changelog.as_deref().map_or(0, str::len)
}

/// Coarse age of a release: hours, days, weeks, months, then years
fn released_ago(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(published);
    let days = age.num_days();
    if days > 365 {
        format!("{} years ago", (days as f64 / 365.0).round())
    } else if days > 30 {
        format!("{} months ago", (days as f64 / 30.5).round())
    } else if days > 7 {
        format!("{} weeks ago", (days as f64 / 7.0).round())
    } else if days > 0 {
        format!("{days} days ago")
    } else {
        format!("{} hours ago", age.num_hours().max(0))
    }
}

#[cfg(test)]
mod tests {
    include!("commands.test.rs");
}
