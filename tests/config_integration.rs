//! Configuration layering: defaults file, user overrides, then environment.

use std::{env, fs, path::PathBuf};

use furnish::{color::Color, config::ConfigError, AppConfig};
use serial_test::serial;

fn temp_config_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("furnish-config-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn clear_env() {
    for key in [
        "FURNISH_ROOM__WIDTH",
        "FURNISH_WINDOW__TITLE",
        "FURNISH_ASSETS__SPAWN_RADIUS",
    ] {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn shipped_defaults_load() {
    clear_env();
    let config = AppConfig::load_from(concat!(env!("CARGO_MANIFEST_DIR"), "/config")).unwrap();
    assert_eq!(config.room.width, 16.0);
    assert_eq!(config.room.floor_color, Color::rgb(0xF5, 0xF5, 0xF5));
    assert_eq!(config.window.title, "Furnish");
}

#[test]
#[serial]
fn missing_directory_falls_back_to_built_in_defaults() {
    clear_env();
    let config = AppConfig::load_from(temp_config_dir("missing").join("nope")).unwrap();
    assert_eq!(config.room.depth, 16.0);
    assert_eq!(config.assets.spawn_radius, 2.0);
}

#[test]
#[serial]
fn user_file_overrides_defaults() {
    clear_env();
    let dir = temp_config_dir("user");
    fs::write(dir.join("default.toml"), "[room]\nwidth = 10.0\ndepth = 8.0\n").unwrap();
    fs::write(dir.join("user.toml"), "[room]\nwidth = 12.0\n").unwrap();

    let config = AppConfig::load_from(&dir).unwrap();
    assert_eq!(config.room.width, 12.0);
    assert_eq!(config.room.depth, 8.0);
}

#[test]
#[serial]
fn environment_overrides_files() {
    clear_env();
    let dir = temp_config_dir("env");
    fs::write(dir.join("default.toml"), "[room]\nwidth = 10.0\n").unwrap();

    env::set_var("FURNISH_ROOM__WIDTH", "30");
    env::set_var("FURNISH_WINDOW__TITLE", "Living Room");
    let config = AppConfig::load_from(&dir);
    clear_env();

    let config = config.unwrap();
    assert_eq!(config.room.width, 30.0);
    assert_eq!(config.window.title, "Living Room");
}

#[test]
#[serial]
fn invalid_values_are_rejected() {
    clear_env();
    let dir = temp_config_dir("invalid");
    fs::write(dir.join("default.toml"), "[room]\nwidth = -1.0\n").unwrap();
    assert!(matches!(
        AppConfig::load_from(&dir),
        Err(ConfigError::InvalidRoom { .. })
    ));

    fs::write(dir.join("default.toml"), "[assets]\nspawn_radius = -2.0\n").unwrap();
    assert!(matches!(AppConfig::load_from(&dir), Err(ConfigError::Invalid(_))));

    fs::write(dir.join("default.toml"), "[room]\nfloor_color = \"beige\"\n").unwrap();
    assert!(matches!(AppConfig::load_from(&dir), Err(ConfigError::Figment(_))));
}
