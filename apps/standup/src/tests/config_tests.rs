use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
}

#[test]
fn keeps_memory_and_full_urls() {
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(
        normalize_database_url("sqlite://./x.db"),
        "sqlite://./x.db"
    );
    assert_eq!(
        normalize_database_url("  "),
        Settings::default().database_url
    );
}

#[test]
fn creates_parent_dir_for_sqlite_url() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();

    let temp_root = env::temp_dir().join(format!("standup_config_test_{suffix}"));
    let db_path = temp_root.join("data").join("test.db");

    prepare_database_url(db_path.to_string_lossy().as_ref()).expect("prepare db url");
    assert!(temp_root.join("data").exists());

    fs::remove_dir_all(temp_root).expect("cleanup");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    settings.apply_file(
        r#"
        database_url = "sqlite://./elsewhere.db"
        spin_delay_ms = 250
        round_limit = "3"
        locale = "en"
        gemini_model = "gemini-test"
        "#,
    );

    assert_eq!(settings.database_url, "sqlite://./elsewhere.db");
    assert_eq!(settings.spin_delay(), Duration::from_millis(250));
    assert_eq!(settings.default_round_limit, RoundLimit::bounded(3).unwrap());
    assert_eq!(settings.locale, Locale::En);
    assert_eq!(settings.gemini_model, "gemini-test");
    assert_eq!(settings.gemini_api_key, None);
}

#[test]
fn bad_file_values_are_skipped() {
    let mut settings = Settings::default();
    settings.apply_file(r#"round_limit = "0""#);
    settings.apply_file(r#"locale = "klingon""#);
    settings.apply_file("this is = = not toml");
    assert_eq!(settings, Settings::default());
}

#[test]
fn env_overrides_file_and_prefixed_wins() {
    let mut settings = Settings::default();
    settings.apply_file(r#"database_url = "sqlite://./file.db""#);
    settings.apply_env(env_from(&[
        ("DATABASE_URL", "sqlite://./plain.db"),
        ("STANDUP__DATABASE_URL", "sqlite://./prefixed.db"),
        ("STANDUP__SPIN_DELAY_MS", "0"),
        ("STANDUP__ROUND_LIMIT", "all"),
        ("API_KEY", "legacy"),
        ("GEMINI_API_KEY", "g-key"),
    ]));

    assert_eq!(settings.database_url, "sqlite://./prefixed.db");
    assert_eq!(settings.spin_delay_ms, 0);
    assert_eq!(settings.default_round_limit, RoundLimit::Unbounded);
    assert_eq!(settings.gemini_api_key.as_deref(), Some("g-key"));
}

#[test]
fn blank_api_key_counts_as_missing() {
    let mut settings = Settings::default();
    settings.apply_env(env_from(&[("GEMINI_API_KEY", "  ")]));
    assert_eq!(settings.gemini_api_key, None);

    settings.apply_env(env_from(&[("STANDUP__SPIN_DELAY_MS", "soon")]));
    assert_eq!(settings.spin_delay_ms, 4000);
}
