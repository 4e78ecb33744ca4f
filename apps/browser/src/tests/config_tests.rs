use super::*;

use std::{
    collections::HashMap,
    env,
    time::{SystemTime, UNIX_EPOCH},
};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_match_store_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(settings.store_options(), StoreOptions::default());
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file_config(
        &mut settings,
        r#"
api_base_url = "http://localhost:9000/api/"
filter_character = false
current_episode_id = 12
"#,
    )
    .expect("parse");

    assert_eq!(settings.api_base_url, "http://localhost:9000/api/");
    assert!(!settings.filter_character);
    assert_eq!(settings.current_char_id, 1);
    assert_eq!(settings.current_episode_id, 12);
}

#[test]
fn unknown_file_keys_are_rejected() {
    let mut settings = Settings::default();
    assert!(apply_file_config(&mut settings, "bind_addr = \"0.0.0.0\"").is_err());
}

#[test]
fn app_prefixed_env_wins_over_plain_url_var() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_from(&[
            ("CATALOG_API_URL", "http://plain.test/api"),
            ("APP__API_BASE_URL", "http://prefixed.test/api"),
            ("APP__FILTER_CHARACTER", "false"),
            ("APP__CURRENT_CHAR_ID", " 7 "),
        ]),
    )
    .expect("env");

    assert_eq!(settings.api_base_url, "http://prefixed.test/api");
    assert!(!settings.filter_character);
    assert_eq!(settings.store_options().current_char_id, CharId(7));
}

#[test]
fn malformed_env_value_is_an_error() {
    let mut settings = Settings::default();
    let err = apply_env(&mut settings, env_from(&[("APP__CURRENT_EPISODE_ID", "pilot")]))
        .expect_err("must fail");
    assert!(err.to_string().contains("APP__CURRENT_EPISODE_ID"));
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("catalog_browser_missing_{suffix}.toml"));

    let settings = load_settings_with(&path, env_from(&[])).expect("load");
    assert_eq!(settings, Settings::default());
}

#[test]
fn broken_config_file_reports_its_path() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("catalog_browser_broken_{suffix}.toml"));
    fs::write(&path, "filter_character = \"maybe\"").expect("write");

    let err = load_settings_with(&path, env_from(&[])).expect_err("must fail");
    assert!(err.to_string().contains("invalid config file"));

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn env_overrides_file_values() {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let path = env::temp_dir().join(format!("catalog_browser_layered_{suffix}.toml"));
    fs::write(&path, "current_episode_id = 4\nfilter_character = false").expect("write");

    let settings = load_settings_with(&path, env_from(&[("APP__CURRENT_EPISODE_ID", "9")]))
        .expect("load");
    assert_eq!(settings.current_episode_id, 9);
    assert!(!settings.filter_character);

    fs::remove_file(path).expect("cleanup");
}
