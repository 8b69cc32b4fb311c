use super::*;
use crate::modman::manifest::InstalledMod;
use crate::primitives::ModLoader;
use crate::testing::{ServerDirFixture, jar_bytes, project, server_only_project, version};
use std::io::Read;

fn installed(fixture: &ServerDirFixture, server_only: bool, slug: &str) -> InstalledMod {
    let summary = if server_only {
        server_only_project(slug)
    } else {
        project(slug)
    };
    let entry = InstalledMod::from_selection(&summary, &version(slug, "v1"), None).unwrap();
    fixture.materialize(&entry, &jar_bytes(slug, "v1")).unwrap();
    entry
}

fn manifest(entries: Vec<InstalledMod>) -> ProjectManifest {
    let mut manifest = ProjectManifest::new("My Server", "1.20.1", ModLoader::Fabric, None);
    for entry in entries {
        manifest.insert(entry);
    }
    manifest
}

#[test]
fn test_archive_name() {
    assert_eq!(archive_name(&manifest(vec![])), "My-Server.zip");
    let mut unnamed = manifest(vec![]);
    unnamed.name = "../".into();
    assert_eq!(archive_name(&unnamed), "modpack.zip");
}

#[test]
fn test_collect_skips_server_only_by_default() {
    let fixture = ServerDirFixture::new().unwrap();
    let manifest = manifest(vec![
        installed(&fixture, false, "sodium"),
        installed(&fixture, true, "chunky"),
        installed(&fixture, false, "fabric-api"),
    ]);

    let entries = collect(&manifest, &fixture.mods_dir(), false).unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.file_name.as_str()).collect();
    assert_eq!(names, vec!["fabric-api-v1.jar", "sodium-v1.jar"]);
    assert_eq!(entries[1].bytes, jar_bytes("sodium", "v1"));

    let everything = collect(&manifest, &fixture.mods_dir(), true).unwrap();
    assert_eq!(everything.len(), 3);
}

#[test]
fn test_collect_refuses_missing_or_corrupt_files() {
    let fixture = ServerDirFixture::new().unwrap();
    let entry = installed(&fixture, false, "sodium");
    let manifest = manifest(vec![entry.clone()]);

    fixture.write_mod(&entry.file_name, b"garbage").unwrap();
    assert!(matches!(
        collect(&manifest, &fixture.mods_dir(), false),
        Err(PackError::CorruptFile { .. })
    ));

    std::fs::remove_file(fixture.mods_dir().join(&entry.file_name)).unwrap();
    assert!(matches!(
        collect(&manifest, &fixture.mods_dir(), false),
        Err(PackError::MissingFile { .. })
    ));
}

#[test]
fn test_write_archive_contains_entries() {
    let fixture = ServerDirFixture::new().unwrap();
    let entries = vec![
        PackEntry {
            file_name: "a.jar".into(),
            bytes: b"aaa".to_vec(),
        },
        PackEntry {
            file_name: "b.jar".into(),
            bytes: b"bbb".to_vec(),
        },
    ];
    let path = fixture.path().join("pack.zip");

    write_archive(&entries, &path).unwrap();

    let mut archive = zip::ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
    assert_eq!(archive.len(), 2);
    let mut contents = String::new();
    archive
        .by_name("b.jar")
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    assert_eq!(contents, "bbb");
}
