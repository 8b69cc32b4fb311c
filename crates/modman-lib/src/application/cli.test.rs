use super::*;
use crate::primitives::LogLevel;
use clap::CommandFactory;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("modman").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_log_level_precedes_subcommand_case_insensitive() {
    let cli = parse(&["-L", "debug", "list"]);
    assert_eq!(cli.config.log_level, LogLevel::Debug);
    assert_eq!(cli.command, Some(Commands::List));

    let cli = parse(&["-L", "CRITICAL", "list"]);
    assert_eq!(cli.config.log_level, LogLevel::Critical);
}

#[test]
fn test_log_level_after_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(["modman", "list", "-L", "DEBUG"]).is_err());
}

#[test]
fn test_install_flags() {
    let cli = parse(&["install", "sodium", "lithium==mc1.20.1-0.11.2", "-R", "-O"]);
    assert_eq!(
        cli.command,
        Some(Commands::Install {
            mods: vec!["sodium".into(), "lithium==mc1.20.1-0.11.2".into()],
            reinstall: true,
            optional: true,
            dry: false,
        })
    );
}

#[test]
fn test_update_and_pack_flags() {
    let cli = parse(&["update", "-V", "1.20.4", "-P"]);
    assert_eq!(
        cli.command,
        Some(Commands::Update {
            mods: vec![],
            game_version: Some("1.20.4".into()),
            prerelease: true,
        })
    );

    let cli = parse(&["pack", "-S"]);
    assert_eq!(cli.command, Some(Commands::Pack { include_server_side: true }));

    let cli = parse(&["pack", "--server-side"]);
    assert_eq!(cli.command, Some(Commands::Pack { include_server_side: true }));
}

#[test]
fn test_init_positionals() {
    let cli = parse(&["init", "--name", "smp", "fabric", "1.20.1"]);
    assert_eq!(
        cli.command,
        Some(Commands::Init {
            name: Some("smp".into()),
            no_auto: false,
            loader: Some(ModLoader::Fabric),
            game_version: Some("1.20.1".into()),
        })
    );
}

#[test]
fn test_uninstall_requires_ids() {
    assert!(Cli::try_parse_from(["modman", "uninstall"]).is_err());
}

#[test]
fn test_download_fabric_arguments() {
    let cli = parse(&["download-fabric", "latest", "0.15.11"]);
    assert_eq!(
        cli.command,
        Some(Commands::DownloadFabric {
            mc_version: "latest".into(),
            loader: Some("0.15.11".into()),
            installer: None,
        })
    );
}

#[test]
fn test_from_cli_applies_environment() {
    let cli = parse(&["list"]);
    let env = EnvironmentConfig {
        ci: Some("true".into()),
        ..EnvironmentConfig::default()
    };

    let config = CliConfig::from_cli(cli, &env).unwrap();
    assert!(config.app_config.yes);
    assert_eq!(config.app_config.color, crate::primitives::ColorChoice::Never);
    assert!(config.app_config.workdir.is_some());
}

#[test]
fn test_search_sort_and_defaults() {
    let cli = parse(&["search", "perf"]);
    assert_eq!(
        cli.command,
        Some(Commands::Search {
            query: "perf".into(),
            limit: 10,
            page: 1,
            sort_by: SearchSort::Relevance,
        })
    );

    let cli = parse(&["search", "perf", "--sort-by", "created", "-l", "50"]);
    assert!(matches!(
        cli.command,
        Some(Commands::Search { sort_by: SearchSort::Created, limit: 50, .. })
    ));
    assert!(Cli::try_parse_from(["modman", "search", "x", "-S", "popular"]).is_err());
}

#[test]
fn test_view_aliases() {
    for name in ["view", "info", "show"] {
        let cli = parse(&[name, "sodium"]);
        assert_eq!(
            cli.command,
            Some(Commands::View {
                project: "sodium".into()
            })
        );
    }
}

#[test]
fn test_changelog_options() {
    let cli = parse(&["changelog", "sodium"]);
    assert_eq!(
        cli.command,
        Some(Commands::Changelog {
            project: "sodium".into(),
            version: None,
            verbose: false,
            sort_by: ChangelogSort::Date,
            direction: SortDirection::Desc,
            limit: 10,
        })
    );

    let cli = parse(&[
        "changelog",
        "sodium",
        "latest",
        "-V",
        "-S",
        "changelog-size",
        "-D",
        "asc",
        "-L",
        "3",
    ]);
    assert_eq!(
        cli.command,
        Some(Commands::Changelog {
            project: "sodium".into(),
            version: Some("latest".into()),
            verbose: true,
            sort_by: ChangelogSort::ChangelogSize,
            direction: SortDirection::Asc,
            limit: 3,
        })
    );
}

#[test]
fn test_command_names() {
    assert_eq!(Commands::List.name(), "list");
    assert_eq!(
        Commands::View {
            project: "x".into()
        }
        .name(),
        "view"
    );
}
