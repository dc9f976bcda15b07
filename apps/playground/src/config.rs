use std::{collections::HashMap, fs, time::Duration};

use client_core::RunMode;
use shared::domain::RoutePath;

pub const SETTINGS_FILE: &str = "playground.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: Option<String>,
    pub mode: RunMode,
    pub clicks: u32,
    pub click_interval: Duration,
    pub latency: Duration,
    pub transition_delay: Duration,
    pub fail_fetch: bool,
    pub destination: RoutePath,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: None,
            mode: RunMode::Development,
            clicks: 3,
            click_interval: Duration::from_millis(10),
            latency: Duration::from_millis(100),
            transition_delay: Duration::from_millis(20),
            fail_fetch: false,
            destination: RoutePath::root(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            apply(&mut settings, |key| file_cfg.get(key).cloned());
        }
    }
    apply(&mut settings, |key| {
        std::env::var(format!("PLAYGROUND_{}", key.to_ascii_uppercase())).ok()
    });

    settings
}

/// Applies string overrides looked up by lower-case key. Values that do not
/// parse leave the current setting alone.
pub(crate) fn apply(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("server_url") {
        let v = v.trim();
        settings.server_url = (!v.is_empty()).then(|| v.to_string());
    }
    if let Some(mode) = lookup("mode").and_then(|v| v.parse::<RunMode>().ok()) {
        settings.mode = mode;
    }
    if let Some(clicks) = lookup("clicks").and_then(|v| v.trim().parse().ok()) {
        settings.clicks = clicks;
    }
    if let Some(ms) = lookup("click_interval_ms").and_then(|v| v.trim().parse().ok()) {
        settings.click_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = lookup("latency_ms").and_then(|v| v.trim().parse().ok()) {
        settings.latency = Duration::from_millis(ms);
    }
    if let Some(ms) = lookup("transition_ms").and_then(|v| v.trim().parse().ok()) {
        settings.transition_delay = Duration::from_millis(ms);
    }
    if let Some(v) = lookup("fail_fetch") {
        match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => settings.fail_fetch = true,
            "0" | "false" | "no" => settings.fail_fetch = false,
            _ => {}
        }
    }
    if let Some(v) = lookup("destination") {
        settings.destination = RoutePath::new(v);
    }
}
