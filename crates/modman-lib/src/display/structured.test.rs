use super::*;

fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_table_aligns_columns() {
    let styling = StyleManager::new(false);
    let text = render_table(
        &styling,
        &strings(&["Slug", "Version"]),
        &[strings(&["sodium", "0.5.3"]), strings(&["fabric-api", "0.92.0"])],
    );

    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Slug        Version");
    assert_eq!(lines[1], "----------  -------");
    assert_eq!(lines[2], "sodium      0.5.3");
    assert_eq!(lines[3], "fabric-api  0.92.0");
}

#[test]
fn test_short_rows_are_padded() {
    let styling = StyleManager::new(false);
    let text = render_table(&styling, &[], &[strings(&["a", "bb"]), strings(&["ccc"])]);
    assert_eq!(text, "a    bb\nccc");
}

#[test]
fn test_builder_matches_render() {
    let styling = StyleManager::new(false);
    let table = StructuredDisplay::new(&styling)
        .table()
        .header(&["A"])
        .row(&["x"]);
    assert_eq!(table.to_text(), "A\n-\nx");
}
