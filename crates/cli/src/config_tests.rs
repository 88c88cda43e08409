// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

const VARS: [&str; 8] = [
    "REPLICA_OUTPUT_BASE",
    "REPLICA_PROVIDER",
    "REPLICA_API_KEY",
    "ANTHROPIC_API_KEY",
    "REPLICA_CLI_BINARY",
    "REPLICA_CHROME_PATH",
    "REPLICA_MAX_CONCURRENT_JOBS",
    "REPLICA_SIMILARITY_THRESHOLD",
];

fn clear_env() {
    for var in VARS {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn defaults_without_file() {
    clear_env();
    let config = AppConfig::load(None).unwrap();

    assert_eq!(config.runner, RunnerConfig::default());
    assert_eq!(config.runner.max_concurrent_jobs, 2);
    assert_eq!(config.generator.provider, Provider::Cli);
    assert_eq!(config.generator.cli_timeout_secs, 300);
    assert_eq!(config.generator.api_timeout_secs, 900);
}

#[test]
#[serial]
fn file_values_override_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("replica.toml");
    std::fs::write(
        &path,
        r#"
chrome_path = "/opt/chromium"

[runner]
output_base = "/srv/replicas"
similarity_threshold = 90.0

[runner.retry]
max_attempts = 5

[generator]
provider = "api"
api_model = "custom-model"

[crawl]
listing_base = "https://example.com/list/"
"#,
    )
    .unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.runner.output_base, PathBuf::from("/srv/replicas"));
    assert_eq!(config.runner.similarity_threshold, 90.0);
    assert_eq!(config.runner.retry.max_attempts, 5);
    assert_eq!(config.runner.retry.backoff_base, 2);
    assert_eq!(config.runner.max_iterations, 3);
    assert_eq!(config.generator.provider, Provider::Api);
    assert_eq!(config.generator.api_model, "custom-model");
    assert_eq!(config.crawl().listing_base, "https://example.com/list/");
    assert_eq!(config.browser().chrome_path, Some(PathBuf::from("/opt/chromium")));
}

#[test]
#[serial]
fn env_overrides_file() {
    clear_env();
    std::env::set_var("REPLICA_OUTPUT_BASE", "/tmp/env-out");
    std::env::set_var("REPLICA_PROVIDER", "api");
    std::env::set_var("ANTHROPIC_API_KEY", "sk-test");
    std::env::set_var("REPLICA_MAX_CONCURRENT_JOBS", "4");

    let config = AppConfig::load(None).unwrap();
    clear_env();

    assert_eq!(config.runner.output_base, PathBuf::from("/tmp/env-out"));
    assert_eq!(config.generator.provider, Provider::Api);
    assert_eq!(config.generator.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.runner.max_concurrent_jobs, 4);
}

#[test]
#[serial]
fn bad_env_value_is_reported() {
    clear_env();
    std::env::set_var("REPLICA_MAX_CONCURRENT_JOBS", "many");

    let err = AppConfig::load(None).unwrap_err();
    clear_env();

    assert!(matches!(err, ConfigError::InvalidEnv { var: "REPLICA_MAX_CONCURRENT_JOBS", .. }));
    assert_eq!(err.to_string(), "invalid value for REPLICA_MAX_CONCURRENT_JOBS: 'many'");
}

#[test]
#[serial]
fn malformed_file_names_path() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("replica.toml");
    std::fs::write(&path, "[runner\n").unwrap();

    let err = AppConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("replica.toml"));
}

#[test]
fn missing_file_is_a_read_error() {
    let err = AppConfig::from_file(Path::new("/nonexistent/replica.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn viewport_flows_into_generator_settings() {
    let mut config = AppConfig::default();
    config.runner.viewport.width = 1024;
    assert_eq!(config.generator().viewport.width, 1024);
    assert_eq!(config.browser().viewport.width, 1024);
}
