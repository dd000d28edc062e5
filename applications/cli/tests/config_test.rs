//! Configuration loading from files and the environment

use std::io::Write;
use std::time::Duration;
use tempfile::TempDir;
use vibes_cli::{CliConfig, CliError};

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("vibes.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
[spotify]
access_token = "file-token"
api_base_url = "http://localhost:9000/v1"

[playback]
poll_interval_ms = 3000
manual_update_grace_ms = 4000

[playlist]
default_id = "37i9dQZF1DXcBWIGoYBM5M"
track_limit = 8
"#,
    );

    let config = CliConfig::load(Some(&path)).unwrap();
    config.validate().unwrap();

    assert_eq!(config.spotify.access_token, "file-token");
    assert_eq!(config.spotify.api_base_url, "http://localhost:9000/v1");
    assert_eq!(config.playlist.default_id.as_deref(), Some("37i9dQZF1DXcBWIGoYBM5M"));
    assert_eq!(config.playlist.track_limit, 8);

    let playback = config.playback_config();
    assert_eq!(playback.poll_interval, Duration::from_secs(3));
    assert_eq!(playback.tick_interval, Duration::from_millis(250));
    assert_eq!(playback.manual_update_grace, Duration::from_secs(4));
}

#[test]
fn test_missing_sections_use_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[spotify]\naccess_token = \"t\"\n");

    let config = CliConfig::load(Some(&path)).unwrap();

    assert_eq!(config.playback.poll_interval_ms, 2000);
    assert_eq!(config.playback.tick_interval_ms, 250);
    assert_eq!(config.playback.optimistic_confirmation_window_ms, 5000);
    assert_eq!(config.playlist.track_limit, 16);
    assert_eq!(config.spotify.request_timeout_secs, 10);
}

#[test]
fn test_environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "[spotify]\naccess_token = \"t\"\ndevice_id = \"from-file\"\n",
    );

    std::env::set_var("VIBES_SPOTIFY__DEVICE_ID", "from-env");
    let config = CliConfig::load(Some(&path));
    std::env::remove_var("VIBES_SPOTIFY__DEVICE_ID");

    assert_eq!(
        config.unwrap().spotify.device_id.as_deref(),
        Some("from-env")
    );
}

#[test]
fn test_explicit_path_must_exist() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    assert!(matches!(
        CliConfig::load(Some(&missing)),
        Err(CliError::Config(_))
    ));
}

#[test]
fn test_invalid_intervals_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "[spotify]\naccess_token = \"t\"\n[playback]\npoll_interval_ms = 200\ntick_interval_ms = 500\n",
    );

    let config = CliConfig::load(Some(&path)).unwrap();
    assert!(matches!(config.validate(), Err(CliError::Config(_))));
}
