//! Tests for configuration loading
//!
//! Env-var tests are serialized because the process environment is shared.

use serial_test::serial;
use std::path::PathBuf;

use rotapress::config::Config;

fn clear_env() {
    for key in [
        "ARTICLES_PER_DAY",
        "MAX_RETRIES_TITLE",
        "HISTORY_FILE",
        "ROTAPRESS_TOPICS",
        "OPENROUTER_ENDPOINT",
        "OPENROUTER_MODEL",
        "OPENROUTER_API_KEY",
        "PUBLISH_WEBHOOK_URL",
        "FEED_TIMEOUT",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();

    let config = Config::from_env().unwrap();
    assert_eq!(config.run.articles_per_day, 2);
    assert_eq!(config.run.max_title_retries, 5);
    assert_eq!(config.history.path, PathBuf::from("data/history.json"));
    assert_eq!(config.topics.len(), 5);
    assert_eq!(config.topics[0], "Sport");
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var("ARTICLES_PER_DAY", "3");
    std::env::set_var("MAX_RETRIES_TITLE", "2");
    std::env::set_var("HISTORY_FILE", "/var/lib/rotapress/state.json");
    std::env::set_var("ROTAPRESS_TOPICS", "Gardening, Chess ,Cooking");
    std::env::set_var("FEED_TIMEOUT", "3");

    let config = Config::from_env().unwrap();
    assert_eq!(config.run.articles_per_day, 3);
    assert_eq!(config.run.max_title_retries, 2);
    assert_eq!(
        config.history.path,
        PathBuf::from("/var/lib/rotapress/state.json")
    );
    assert_eq!(config.topics, vec!["Gardening", "Chess", "Cooking"]);
    assert_eq!(config.feed_timeout_secs, 3);

    clear_env();
}

#[test]
#[serial]
fn test_from_env_ignores_unparseable_numbers() {
    clear_env();
    std::env::set_var("ARTICLES_PER_DAY", "lots");

    let config = Config::from_env().unwrap();
    assert_eq!(config.run.articles_per_day, 2);

    clear_env();
}

#[test]
fn test_from_file_round_trip() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("rotapress.toml");

    let config = Config::default();
    std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.run.articles_per_day, config.run.articles_per_day);
    assert_eq!(loaded.topics, config.topics);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_from_file_with_feeds() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("rotapress.toml");

    let toml_doc = r#"
        topics = ["Sport", "Finance"]

        [run]
        articles_per_day = 1
        max_title_retries = 3

        [history]
        path = "state/history.json"

        [generator]
        endpoint = "http://localhost:11434/v1"
        model = "qwen2.5:7b"
        timeout_secs = 30
        temperature = 0.5
        max_tokens = 800

        [publisher]
        webhook_url = "https://blog.example.com/ingest"
        timeout_secs = 10

        [logging]
        level = "debug"
        format = "json"

        [feeds]
        Sport = "https://news.example.com/rss/sport"
    "#;
    std::fs::write(&path, toml_doc).unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.run.articles_per_day, 1);
    assert_eq!(config.feeds["Sport"], "https://news.example.com/rss/sport");
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(Config::from_file(std::path::Path::new("/nonexistent/rotapress.toml")).is_err());
}
