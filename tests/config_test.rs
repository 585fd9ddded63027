// Integration tests for config files and the CLI
// Run with: cargo test --test config_test

use std::process::Command;

use cloud_messaging::config::PresenterKind;
use cloud_messaging::platform::{OscStyle, PermissionStatus};
use cloud_messaging::Config;
use tempfile::TempDir;

/// Saved config loads back unchanged
#[test]
fn test_save_and_load_config_file() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("config.json");

    let config = Config {
        initial_token: Some("tok".to_string()),
        requires_permission: false,
        permission: PermissionStatus::Denied,
        presenter: PresenterKind::Log,
        osc_style: OscStyle::Osc9,
        tick_rate_ms: 16,
        toast_duration_ms: 500,
    };
    config.save_to(&path).expect("save");

    assert_eq!(Config::load_from(&path).expect("load"), config);
}

/// Missing keys fall back to defaults
#[test]
fn test_partial_config_file() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, r#"{"presenter": "disabled"}"#).expect("write");

    let config = Config::load_from(&path).expect("load");
    assert_eq!(config.presenter, PresenterKind::Disabled);
    assert!(config.requires_permission);
    assert_eq!(config.permission, PermissionStatus::Granted);
}

/// A config file that does not parse is an error
#[test]
fn test_malformed_config_file() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, "{ nope").expect("write");

    assert!(Config::load_from(&path).is_err());
}

#[cfg(unix)]
#[test]
fn test_saved_config_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().expect("temp dir");
    let path = temp_dir.path().join("config.json");
    Config::default().save_to(&path).expect("save");

    let mode = std::fs::metadata(&path).expect("metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

fn cli(temp_dir: &TempDir) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_cloud-messaging"));
    command
        .env("CLOUD_MESSAGING_CONFIG_DIR", temp_dir.path())
        .env("CLOUD_MESSAGING_PRESENTER", "log")
        .env_remove("CLOUD_MESSAGING_TOKEN")
        .env_remove("CLOUD_MESSAGING_LOG_FILE");
    command
}

/// The config command prints the effective config, env overrides included
#[test]
fn test_config_command_prints_effective_config() {
    let temp_dir = TempDir::new().expect("temp dir");
    let output = cli(&temp_dir)
        .env("CLOUD_MESSAGING_TOKEN", "from-env")
        .arg("config")
        .output()
        .expect("Failed to execute config command");

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("from-env"));
    assert!(stdout.contains("\"presenter\": \"log\""));
    assert!(temp_dir.path().join("cloud-messaging.log").exists());
}

/// A headless run with a feed prints each change and exits when the feed ends
#[test]
fn test_headless_start_with_feed() {
    let temp_dir = TempDir::new().expect("temp dir");
    let feed = temp_dir.path().join("feed.jsonl");
    std::fs::write(
        &feed,
        concat!(
            "{\"type\":\"token\",\"token\":\"abc\"}\n",
            "{\"type\":\"message\",\"data\":{\"title\":\"Hi\",\"body\":\"World\"}}\n",
        ),
    )
    .expect("write feed");

    let output = cli(&temp_dir)
        .args(["start", "--headless", "--feed"])
        .arg(&feed)
        .output()
        .expect("Failed to execute start command");

    assert!(output.status.success(), "Command should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("token: abc"));
    assert!(stdout.contains("message: Hi | World"));
}

/// Reading the feed from stdin needs headless mode
#[test]
fn test_stdin_feed_requires_headless() {
    let temp_dir = TempDir::new().expect("temp dir");
    let output = cli(&temp_dir)
        .args(["start", "--feed", "-"])
        .output()
        .expect("Failed to execute start command");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--headless"));
}
