//! Configuration Tests
//!
//! Loading `CubeConfig` from disk and its effect on new nodes.

use std::fs;

use datacube::config::{ConfigError, CubeConfig};
use datacube::cube::{Cube, SetOptions};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn test_load_partial_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("datacube.json");
    fs::write(
        &path,
        json!({ "append_reserve": 4, "log_level": "warn" }).to_string(),
    )
    .unwrap();

    let config = CubeConfig::load(&path).unwrap();
    assert_eq!(config.append_reserve, 4);
    assert_eq!(config.max_auto_names, 1000);
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_missing_file_is_io_error() {
    let tmp = TempDir::new().unwrap();
    let result = CubeConfig::load(&tmp.path().join("absent.json"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[test]
fn test_invalid_values_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("datacube.json");
    fs::write(&path, json!({ "search_tolerance": -0.5 }).to_string()).unwrap();
    assert!(matches!(
        CubeConfig::load(&path),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_append_reserve_bounds_staged_growth() {
    let config = CubeConfig {
        append_reserve: 4,
        ..CubeConfig::default()
    };
    let cube = Cube::builder("small").config(config).build();
    cube.set_with(SetOptions::committed(), [("a", 1.0)]).unwrap();

    let capacity = cube.read().capacity();
    assert!(capacity >= 1);
    assert!(capacity <= 1 + 4);
}
