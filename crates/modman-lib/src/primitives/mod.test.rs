use super::*;

// =============================================================================
// VALUE ENUM PARSING
// =============================================================================

macro_rules! test_enum_completeness {
    ($enum_type:ty, $test_name:ident) => {
        #[test]
        fn $test_name() {
            for variant in <$enum_type>::value_variants() {
                let possible_value = variant
                    .to_possible_value()
                    .expect("PossibleValue should exist for all variants");

                let parsed: $enum_type = possible_value.get_name().parse().unwrap();
                assert_eq!(parsed, *variant, "Round-trip should preserve variant");
                assert_eq!(variant.to_string(), possible_value.get_name());
            }
        }
    };
}

macro_rules! test_fromstr_aliases {
    ($enum_type:ty, $test_name:ident, $expected_mappings:expr) => {
        #[test]
        fn $test_name() {
            let mappings: &[(&str, $enum_type)] = &$expected_mappings;

            for (input, expected) in mappings {
                let parsed: Result<$enum_type, _> = input.parse();
                assert_eq!(
                    parsed.unwrap(),
                    *expected,
                    "Wrong variant for input '{}'",
                    input
                );
            }
        }
    };
}

test_enum_completeness!(LogLevel, test_log_level_completeness);
test_enum_completeness!(LogFormat, test_log_format_completeness);
test_enum_completeness!(LogOutput, test_log_output_completeness);
test_enum_completeness!(ColorChoice, test_color_choice_completeness);
test_enum_completeness!(ModLoader, test_mod_loader_completeness);
test_enum_completeness!(SearchSort, test_search_sort_completeness);
test_enum_completeness!(ChangelogSort, test_changelog_sort_completeness);
test_enum_completeness!(SortDirection, test_sort_direction_completeness);

test_fromstr_aliases!(
    LogLevel,
    test_log_level_names_are_case_insensitive,
    [
        ("DEBUG", LogLevel::Debug),
        ("debug", LogLevel::Debug),
        ("Info", LogLevel::Info),
        ("WARNING", LogLevel::Warning),
        ("warn", LogLevel::Warning),
        ("error", LogLevel::Error),
        ("CRITICAL", LogLevel::Critical),
        ("fatal", LogLevel::Critical),
    ]
);

test_fromstr_aliases!(
    ColorChoice,
    test_color_choice_aliases,
    [
        ("auto", ColorChoice::Auto),
        ("detect", ColorChoice::Auto),
        ("always", ColorChoice::Always),
        ("on", ColorChoice::Always),
        ("never", ColorChoice::Never),
        ("off", ColorChoice::Never),
    ]
);

#[test]
fn test_unknown_loader_is_not_parseable() {
    assert!("unknown".parse::<ModLoader>().is_err());
    assert!("neoforge".parse::<ModLoader>().is_err());
    assert_eq!(ModLoader::Unknown.to_string(), "unknown");
}

#[test]
fn test_parse_error_carries_value() {
    let err = "loud".parse::<LogLevel>().unwrap_err();
    match err {
        ConfigError::ParseError { value, .. } => assert_eq!(value, "loud"),
        other => panic!("unexpected error: {other:?}"),
    }
}

// =============================================================================
// BEHAVIOUR
// =============================================================================

#[test]
fn test_critical_and_error_share_a_directive() {
    assert_eq!(LogLevel::Critical.as_directive(), "error");
    assert_eq!(LogLevel::Error.as_directive(), "error");
    assert_eq!(LogLevel::Warning.as_directive(), "warn");
    assert_eq!(LogLevel::Debug.as_directive(), "debug");
}

#[test]
fn test_log_level_should_log_matrix() {
    let levels = [
        LogLevel::Critical,
        LogLevel::Error,
        LogLevel::Warning,
        LogLevel::Info,
        LogLevel::Debug,
    ];

    for (i, message_level) in levels.iter().enumerate() {
        for (j, current_level) in levels.iter().enumerate() {
            assert_eq!(message_level.should_log(*current_level), i <= j);
        }
    }
}

#[test]
fn test_mod_loader_deserializes_unknown_strings() {
    let loaders: Vec<ModLoader> =
        serde_json::from_str(r#"["fabric", "quilt", "neoforge", "paper"]"#).unwrap();
    assert_eq!(
        loaders,
        vec![
            ModLoader::Fabric,
            ModLoader::Quilt,
            ModLoader::Unknown,
            ModLoader::Unknown
        ]
    );
    assert!(!ModLoader::Unknown.is_known());
    assert_eq!(serde_json::to_string(&ModLoader::Forge).unwrap(), "\"forge\"");
}

#[test]
fn test_search_sort_maps_to_catalog_index() {
    assert_eq!(SearchSort::default().index(), "relevance");
    assert_eq!("created".parse::<SearchSort>().unwrap().index(), "newest");
    assert_eq!(SearchSort::Updated.index(), "updated");
}
