use std::io::Write;

use glam::Vec3;
use shapeyard::cli::CliOverrides;
use shapeyard::config::{AppConfig, DEFAULT_CONFIG_PATH};
use shapeyard::editor::SceneEditor;
use shapeyard::shape::ShapeKind;
use shapeyard::viewport::SpawnBounds;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn partial_file_keeps_defaults_for_missing_sections() {
    let file = write_config(r#"{ "window": { "width": 800 }, "spawn": { "seed": 17 } }"#);
    let config = AppConfig::load(file.path()).expect("config loads");
    assert_eq!(config.window.width, 800);
    assert_eq!(config.window.height, 720);
    assert_eq!(config.spawn.seed, Some(17));
    assert_eq!(config.viewport.grid.divisions, 10);
    assert_eq!(config.viewport.camera.position, [0.0, 10.0, -30.0]);
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let file = write_config("{ not json");
    assert!(AppConfig::load(file.path()).is_err());
    let config = AppConfig::load_or_default(file.path());
    assert_eq!(config.window.width, AppConfig::default().window.width);
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = AppConfig::load_or_default(dir.path().join("absent.json"));
    assert!(config.spawn.seed.is_none());
}

#[test]
fn inverted_bounds_are_rejected() {
    let file = write_config(r#"{ "spawn": { "bounds": { "min": [0, 10, 0], "max": [5, 5, 5] } } }"#);
    let err = AppConfig::load(file.path()).expect_err("invalid bounds");
    assert!(format!("{err:#}").contains("spawn.bounds"));
}

#[test]
fn configured_bounds_and_seed_drive_spawning() {
    let file = write_config(
        r#"{ "spawn": { "seed": 3, "bounds": { "min": [1, 2, 3], "max": [4, 5, 6] } } }"#,
    );
    let config = AppConfig::load(file.path()).expect("config loads");
    let bounds = SpawnBounds::from_config(&config.spawn.bounds).expect("valid bounds");
    let mut first = SceneEditor::new(&config.viewport, &config.spawn);
    let mut second = SceneEditor::new(&config.viewport, &config.spawn);
    for kind in ShapeKind::ALL {
        let a = first.spawn(kind, 1.0).unwrap();
        let b = second.spawn(kind, 1.0).unwrap();
        let p = first.position_of(a).unwrap();
        assert!(bounds.contains(p), "{p:?}");
        assert!(p.cmpge(Vec3::new(1.0, 2.0, 3.0)).all());
        assert_eq!(second.position_of(b), Some(p));
    }
}

#[test]
fn command_line_overrides_apply_on_top_of_file() {
    let file = write_config(r#"{ "window": { "width": 640, "height": 480, "vsync": true } }"#);
    let path = file.path().to_string_lossy().to_string();
    let args = ["shapeyard", "--config", path.as_str(), "--height", "900", "--vsync", "off", "--seed", "5"];
    let overrides = CliOverrides::parse(args).expect("cli parses").into_config_overrides();
    assert_eq!(overrides.config_path(), path);

    let mut config = AppConfig::load(overrides.config_path()).expect("config loads");
    config.apply_overrides(&overrides);
    assert_eq!(config.window.width, 640);
    assert_eq!(config.window.height, 900);
    assert!(!config.window.vsync);
    assert_eq!(config.spawn.seed, Some(5));
}

#[test]
fn bundled_config_matches_defaults() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH);
    let config = AppConfig::load(&path).expect("bundled config loads");
    let defaults = AppConfig::default();
    assert_eq!(config.window.width, defaults.window.width);
    assert_eq!(config.viewport.background.linear(), defaults.viewport.background.linear());
    assert_eq!(config.viewport.grid.size, defaults.viewport.grid.size);
    assert_eq!(config.spawn.bounds, defaults.spawn.bounds);
    assert_eq!(config.viewport.orbit, defaults.viewport.orbit);
}
