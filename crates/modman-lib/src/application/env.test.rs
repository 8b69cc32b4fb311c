use super::*;

fn env(pairs: &[(&str, &str)]) -> EnvironmentConfig {
    EnvironmentConfig::from_vars(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>(),
    )
    .unwrap()
}

#[test]
fn test_reads_standard_variables() {
    let config = env(&[("NO_COLOR", "1"), ("CI", "true"), ("PATH", "/bin")]);
    assert_eq!(config.no_color.as_deref(), Some("1"));
    assert!(config.is_ci());
    assert!(config.force_color.is_none());
}

#[test]
fn test_no_color_disables() {
    assert_eq!(
        env(&[("NO_COLOR", "1")]).apply_color_config(ColorChoice::Auto),
        ColorChoice::Never
    );
    assert_eq!(
        env(&[("NO_COLOR", "")]).apply_color_config(ColorChoice::Auto),
        ColorChoice::Auto
    );
}

#[test]
fn test_force_color_wins() {
    let config = env(&[("CLICOLOR", "0"), ("NO_COLOR", "1"), ("FORCE_COLOR", "1")]);
    assert_eq!(config.apply_color_config(ColorChoice::Auto), ColorChoice::Always);
}

#[test]
fn test_ci_disables_color() {
    assert_eq!(
        env(&[("CI", "1")]).apply_color_config(ColorChoice::Auto),
        ColorChoice::Never
    );
    assert!(!env(&[("CI", "false")]).is_ci());
}

#[test]
fn test_explicit_choice_is_kept() {
    let config = env(&[("NO_COLOR", "1")]);
    assert_eq!(config.apply_color_config(ColorChoice::Always), ColorChoice::Always);
}
