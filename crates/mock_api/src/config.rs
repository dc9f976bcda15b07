use std::{collections::HashMap, fs, time::Duration};

use shared::{domain::Item, protocol::default_items};

pub const SETTINGS_FILE: &str = "mock_api.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: String,
    pub latency: Duration,
    pub fail_items: bool,
    pub items: Vec<Item>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8787".into(),
            latency: Duration::from_millis(100),
            fail_items: false,
            items: default_items(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

pub(crate) fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) else {
        tracing::warn!(file = SETTINGS_FILE, "ignoring unparsable settings file");
        return;
    };

    if let Some(v) = file_cfg.get("bind_addr").and_then(toml::Value::as_str) {
        settings.bind_addr = v.to_string();
    }
    if let Some(v) = file_cfg.get("latency_ms").and_then(toml::Value::as_integer) {
        if let Ok(ms) = u64::try_from(v) {
            settings.latency = Duration::from_millis(ms);
        }
    }
    if let Some(v) = file_cfg.get("fail_items").and_then(toml::Value::as_bool) {
        settings.fail_items = v;
    }
    if let Some(names) = file_cfg.get("items").and_then(toml::Value::as_array) {
        let names: Vec<&str> = names.iter().filter_map(toml::Value::as_str).collect();
        settings.items = items_from_names(names);
    }
}

pub(crate) fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("MOCK_API_BIND") {
        settings.bind_addr = v;
    }
    if let Some(v) = lookup("APP__BIND_ADDR") {
        settings.bind_addr = v;
    }

    if let Some(v) = lookup("MOCK_API_LATENCY_MS") {
        if let Ok(ms) = v.trim().parse::<u64>() {
            settings.latency = Duration::from_millis(ms);
        }
    }

    if let Some(v) = lookup("MOCK_API_FAIL_ITEMS") {
        if let Some(flag) = parse_flag(&v) {
            settings.fail_items = flag;
        }
    }

    if let Some(v) = lookup("MOCK_API_ITEMS") {
        settings.items = items_from_names(v.split(','));
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn items_from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<Item> {
    names
        .into_iter()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .zip(1..)
        .map(|(name, id)| Item::new(id, name))
        .collect()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
