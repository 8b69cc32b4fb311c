use super::*;

#[test]
fn test_plain_formatting_without_color() {
    let styling = StyleManager::new(false);
    assert!(!styling.color_enabled());
    assert_eq!(styling.format_success("sodium installed"), "✓ sodium installed");
    assert_eq!(styling.format_error("lithium: not found"), "✗ lithium: not found");
    assert_eq!(styling.format_warning("stale"), "! stale");
    assert_eq!(styling.format_info("nothing to do"), "· nothing to do");
    assert_eq!(styling.style_emphasis("bold"), "bold");
}

#[test]
fn test_color_adds_escape_codes() {
    let styling = StyleManager::new(true);
    let styled = styling.style_error("boom");
    assert!(styled.contains("boom"));
    assert!(styled.contains('\u{1b}'));
    assert_eq!(console::strip_ansi_codes(&styled), "boom");
}
