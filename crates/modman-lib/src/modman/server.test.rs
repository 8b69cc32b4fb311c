use super::*;
use std::io::Write;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn write_jar(dir: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(name);
    let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
    for (file_name, contents) in files {
        writer.start_file(*file_name, SimpleFileOptions::default()).unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    path
}

const LAUNCHER_PROPERTIES: &str =
    "#Fabric server launcher\nfabric-loader-version=0.15.11\ngame-version=1.20.1\n";

#[test]
fn test_parse_install_properties() {
    let (game, loader) = parse_install_properties(LAUNCHER_PROPERTIES);
    assert_eq!(game.as_deref(), Some("1.20.1"));
    assert_eq!(loader.as_deref(), Some("0.15.11"));

    assert_eq!(parse_install_properties("game-version=\n"), (None, None));
}

#[test]
fn test_detect_fabric_launcher() {
    let dir = TempDir::new().unwrap();
    let jar = write_jar(
        dir.path(),
        "server.jar",
        &[("install.properties", LAUNCHER_PROPERTIES)],
    );

    let detected = detect_server(&jar).unwrap().unwrap();
    assert_eq!(detected.loader, ModLoader::Fabric);
    assert_eq!(detected.game_version, "1.20.1");
    assert_eq!(detected.loader_version.as_deref(), Some("0.15.11"));
    assert_eq!(detected.jar, jar);
}

#[test]
fn test_plain_jar_is_not_a_server() {
    let dir = TempDir::new().unwrap();
    let jar = write_jar(dir.path(), "vanilla.jar", &[("META-INF/MANIFEST.MF", "x")]);
    assert_eq!(detect_server(&jar).unwrap(), None);
}

#[test]
fn test_find_prefers_fabric_named_jar_and_skips_garbage() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.jar"), b"not a zip").unwrap();
    write_jar(
        dir.path(),
        "another.jar",
        &[("install.properties", "game-version=1.19.4\n")],
    );
    write_jar(
        dir.path(),
        "fabric-server-launch.jar",
        &[("install.properties", LAUNCHER_PROPERTIES)],
    );

    let found = find_server_jar(dir.path()).unwrap().unwrap();
    assert_eq!(found.game_version, "1.20.1");
}

#[test]
fn test_find_in_empty_dir() {
    let dir = TempDir::new().unwrap();
    assert_eq!(find_server_jar(dir.path()).unwrap(), None);
}
