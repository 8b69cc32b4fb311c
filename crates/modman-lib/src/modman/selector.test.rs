use super::*;
use crate::testing::VersionBuilder;

fn target() -> Target {
    Target::new("1.20.1", ModLoader::Fabric)
}

// ===== select =====

#[test]
fn test_select_takes_first_compatible_in_catalog_order() {
    let candidates = vec![
        VersionBuilder::new("lithium", "v3")
            .game_versions(&["1.20.2"])
            .build(),
        VersionBuilder::new("lithium", "v2").build(),
        VersionBuilder::new("lithium", "v1").build(),
    ];

    let chosen = select(&candidates, &target()).unwrap();
    assert_eq!(chosen.id, "v2");
}

#[test]
fn test_select_never_returns_incompatible_record() {
    let candidates = vec![
        VersionBuilder::new("x", "forge-only")
            .loaders(&[ModLoader::Forge])
            .build(),
        VersionBuilder::new("x", "wrong-game")
            .game_versions(&["1.19.4"])
            .build(),
        VersionBuilder::new("x", "both-wrong")
            .game_versions(&["1.19.4"])
            .loaders(&[ModLoader::Quilt])
            .build(),
    ];

    let err = select(&candidates, &target()).unwrap_err();
    assert_eq!(err, SelectError::NotFound { target: target() });

    for candidate in &candidates {
        let single = std::slice::from_ref(candidate);
        if let Ok(chosen) = select(single, &target()) {
            assert!(chosen.game_versions.contains(&"1.20.1".to_string()));
            assert!(chosen.loaders.contains(&ModLoader::Fabric));
        }
    }
}

#[test]
fn test_select_empty_candidates() {
    assert!(select(&[], &target()).is_err());
}

#[test]
fn test_unknown_loader_never_matches() {
    let candidates = vec![
        VersionBuilder::new("x", "v1")
            .loaders(&[ModLoader::Unknown])
            .build(),
    ];
    let unknown = Target::new("1.20.1", ModLoader::Unknown);
    assert!(select(&candidates, &unknown).is_err());
}

#[test]
fn test_client_and_server_duplicates_first_listed_wins() {
    let candidates = vec![
        VersionBuilder::new("x", "client-build").build(),
        VersionBuilder::new("x", "server-build").build(),
    ];
    assert_eq!(select(&candidates, &target()).unwrap().id, "client-build");
}

// ===== select_with_policy =====

#[test]
fn test_stable_channel_prefers_release() {
    let candidates = vec![
        VersionBuilder::new("x", "beta")
            .version_type(VersionType::Beta)
            .build(),
        VersionBuilder::new("x", "release").build(),
    ];

    let stable = select_with_policy(&candidates, &target(), &SelectionPolicy::default()).unwrap();
    assert_eq!(stable.id, "release");

    let any = select_with_policy(&candidates, &target(), &SelectionPolicy::any()).unwrap();
    assert_eq!(any.id, "beta");
}

#[test]
fn test_stable_channel_falls_back_to_prerelease() {
    let candidates = vec![
        VersionBuilder::new("x", "alpha")
            .version_type(VersionType::Alpha)
            .build(),
        VersionBuilder::new("x", "old-release")
            .game_versions(&["1.19.2"])
            .build(),
    ];

    let chosen = select_with_policy(&candidates, &target(), &SelectionPolicy::default()).unwrap();
    assert_eq!(chosen.id, "alpha");
}

#[test]
fn test_pinned_by_id_or_number() {
    let candidates = vec![
        VersionBuilder::new("x", "AbCd").version_number("2.0.0").build(),
        VersionBuilder::new("x", "EfGh").version_number("1.0.0").build(),
    ];

    let by_number =
        select_with_policy(&candidates, &target(), &SelectionPolicy::pinned("1.0.0")).unwrap();
    assert_eq!(by_number.id, "EfGh");

    let by_id =
        select_with_policy(&candidates, &target(), &SelectionPolicy::pinned("AbCd")).unwrap();
    assert_eq!(by_id.version_number, "2.0.0");
}

#[test]
fn test_pinned_incompatible_version_is_rejected() {
    let candidates = vec![
        VersionBuilder::new("x", "new").build(),
        VersionBuilder::new("x", "old")
            .game_versions(&["1.16.5"])
            .build(),
    ];

    let err =
        select_with_policy(&candidates, &target(), &SelectionPolicy::pinned("old")).unwrap_err();
    assert!(matches!(err, SelectError::PinnedUnavailable { .. }));
}
