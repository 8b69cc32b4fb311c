use super::*;
use crate::modman::integrity::FileState;
use crate::primitives::ModLoader;
use crate::testing::{VersionBuilder, project, version};

fn entry(slug: &str, version_id: &str) -> InstalledMod {
    InstalledMod::from_selection(&project(slug), &version(slug, version_id), None).unwrap()
}

fn manifest_with(entries: Vec<InstalledMod>) -> ProjectManifest {
    let mut manifest = ProjectManifest::new("t", "1.20.1", ModLoader::Fabric, None);
    for e in entries {
        manifest.insert(e);
    }
    manifest
}

fn no_force() -> HashSet<String> {
    HashSet::new()
}

// ===== apply =====

#[test]
fn test_new_mod_is_added() {
    let manifest = manifest_with(vec![]);
    let plan = apply(&manifest, &[entry("fabric-api", "v1")], &no_force(), &IntegrityReport::default());

    assert_eq!(plan.actions.len(), 1);
    assert!(matches!(&plan.actions[0], Action::Add { reinstall: false, .. }));
    assert_eq!(plan.manifest.mods.len(), 1);
    assert_eq!(plan.downloads(), 1);
}

#[test]
fn test_same_version_healthy_is_skipped() {
    let manifest = manifest_with(vec![entry("x", "x1")]);
    let integrity = IntegrityReport::assume_valid(&manifest);

    let plan = apply(&manifest, &[entry("x", "x1")], &no_force(), &integrity);
    assert_eq!(plan.actions, vec![Action::Skip { slug: "x".into() }]);
    assert!(plan.is_noop());
    assert_eq!(plan.manifest, manifest);
}

#[test]
fn test_apply_is_idempotent() {
    let empty = manifest_with(vec![]);
    let targets = vec![entry("a", "a1"), entry("b", "b1")];

    let first = apply(&empty, &targets, &no_force(), &IntegrityReport::default());
    let integrity = IntegrityReport::assume_valid(&first.manifest);
    let second = apply(&first.manifest, &targets, &no_force(), &integrity);

    assert!(second.is_noop());
    assert_eq!(second.actions.len(), 2);
    assert_eq!(second.manifest, first.manifest);
}

#[test]
fn test_broken_or_forced_is_reinstalled_preserving_dependency_of() {
    let mut installed = entry("x", "x1");
    installed.dependency_of = Some("parent".into());
    let manifest = manifest_with(vec![installed, entry("y", "y1")]);
    let mut integrity = IntegrityReport::assume_valid(&manifest);
    integrity.set("x", FileState::Missing);

    let force: HashSet<String> = ["id-y".to_string()].into_iter().collect();
    let plan = apply(&manifest, &[entry("x", "x1"), entry("y", "y1")], &force, &integrity);

    match &plan.actions[0] {
        Action::Add { target, reinstall } => {
            assert!(*reinstall);
            assert_eq!(target.dependency_of.as_deref(), Some("parent"));
        }
        other => panic!("expected reinstall, got {other:?}"),
    }
    assert!(matches!(&plan.actions[1], Action::Add { reinstall: true, .. }));
    assert_eq!(plan.manifest.find("x").unwrap().dependency_of.as_deref(), Some("parent"));
}

#[test]
fn test_different_version_is_upgrade() {
    let mut old = entry("x", "x1");
    old.dependency_of = Some("p".into());
    let manifest = manifest_with(vec![old.clone()]);
    let integrity = IntegrityReport::assume_valid(&manifest);

    let new = InstalledMod::from_selection(&project("x"), &VersionBuilder::new("x", "x2").build(), None).unwrap();
    let plan = apply(&manifest, &[new], &no_force(), &integrity);

    match &plan.actions[0] {
        Action::Upgrade { from, to } => {
            assert_eq!(from, &old);
            assert_eq!(to.version_id, "x2");
            assert_eq!(to.dependency_of.as_deref(), Some("p"));
        }
        other => panic!("expected upgrade, got {other:?}"),
    }
    assert_eq!(plan.manifest.find("x").unwrap().version_id, "x2");
}

#[test]
fn test_duplicates_are_planned_once() {
    let plan = apply(
        &manifest_with(vec![]),
        &[entry("x", "x1"), entry("x", "x1")],
        &no_force(),
        &IntegrityReport::default(),
    );
    assert_eq!(plan.actions.len(), 1);
}

#[test]
fn test_action_display() {
    let add = Action::Add {
        target: entry("x", "x1"),
        reinstall: false,
    };
    assert_eq!(add.to_string(), "add x x1");
    assert_eq!(Action::Skip { slug: "x".into() }.to_string(), "skip x");
}

// ===== remove =====

#[test]
fn test_remove_orphans_dependencies_without_cascading() {
    let mut y = entry("y", "y1");
    y.dependency_of = Some("x".into());
    let manifest = manifest_with(vec![entry("x", "x1"), y]);

    let (plan, missing) = remove(&manifest, &["x".to_string()]);

    assert!(missing.is_empty());
    assert_eq!(plan.actions.len(), 1);
    assert!(matches!(&plan.actions[0], Action::Remove { entry } if entry.slug == "x"));
    assert!(!plan.manifest.contains("x"));
    assert_eq!(plan.manifest.find("y").unwrap().dependency_of, None);
}

#[test]
fn test_remove_reports_unknown_identifiers() {
    let manifest = manifest_with(vec![entry("x", "x1")]);
    let (plan, missing) = remove(
        &manifest,
        &["id-x".to_string(), "x".to_string(), "ghost".to_string()],
    );
    assert_eq!(plan.actions.len(), 1);
    assert_eq!(missing, vec!["ghost"]);
}

#[test]
fn test_remove_accepts_titles_and_jar_names() {
    let manifest = manifest_with(vec![entry("fabric-api", "v1"), entry("lithium", "v2")]);
    let (plan, missing) = remove(
        &manifest,
        &[
            "Fabric API".to_string(),
            "lithium-v2.jar".to_string(),
            "fabric-api".to_string(),
        ],
    );

    assert!(missing.is_empty());
    let removed: Vec<&str> = plan.actions.iter().map(Action::slug).collect();
    assert_eq!(removed, vec!["fabric-api", "lithium"]);
    assert!(plan.manifest.mods.is_empty());
}
