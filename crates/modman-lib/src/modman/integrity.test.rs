use super::*;
use crate::primitives::ModLoader;
use crate::testing::{ServerDirFixture, VersionBuilder, jar_bytes, project, sha512_hex};

fn installed(slug: &str) -> InstalledMod {
    InstalledMod::from_selection(&project(slug), &VersionBuilder::new(slug, "v1").build(), None)
        .unwrap()
}

#[test]
fn test_hash_file_matches_digest() {
    let fixture = ServerDirFixture::new().unwrap();
    let path = fixture.write_mod("a.jar", b"hello").unwrap();
    assert_eq!(hash_file(&path).unwrap(), sha512_hex(b"hello"));
}

#[test]
fn test_scan_classifies_entries() {
    let fixture = ServerDirFixture::new().unwrap();
    let mut manifest = ProjectManifest::new("s", "1.20.1", ModLoader::Fabric, None);
    for slug in ["good", "gone", "tampered"] {
        manifest.insert(installed(slug));
    }

    fixture
        .materialize(manifest.find("good").unwrap(), &jar_bytes("good", "v1"))
        .unwrap();
    fixture
        .materialize(manifest.find("tampered").unwrap(), b"not the jar")
        .unwrap();

    let report = IntegrityReport::scan(&manifest, &fixture.mods_dir());

    assert_eq!(report.state("good"), Some(&FileState::Valid));
    assert_eq!(report.state("gone"), Some(&FileState::Missing));
    assert!(matches!(
        report.state("tampered"),
        Some(FileState::Corrupt { .. })
    ));
    assert_eq!(report.broken(), vec!["gone", "tampered"]);
    assert!(report.is_healthy("good"));
    assert!(!report.is_healthy("never-scanned"));
}

#[test]
fn test_state_display_labels() {
    assert_eq!(FileState::Valid.to_string(), "ok");
    assert_eq!(FileState::Missing.to_string(), "missing");
    assert_eq!(
        FileState::Corrupt {
            actual: "x".into()
        }
        .to_string(),
        "corrupt"
    );
}
