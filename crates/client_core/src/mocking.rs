//! Explicit mocking configuration for the network layer.

use std::{str::FromStr, time::Duration};

use shared::{domain::Item, protocol::default_items};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(RunMode::Development),
            "production" | "prod" => Ok(RunMode::Production),
            other => Err(format!(
                "unknown run mode '{other}' (expected development or production)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSettings {
    pub enabled: bool,
    pub latency: Duration,
    pub fail_fetch: bool,
    pub items: Vec<Item>,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            latency: Duration::from_millis(100),
            fail_fetch: false,
            items: default_items(),
        }
    }
}

impl MockSettings {
    /// Mocking is only switched on for development runs.
    pub fn for_mode(mode: RunMode) -> Self {
        Self {
            enabled: mode == RunMode::Development,
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }
}
