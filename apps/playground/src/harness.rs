//! Mounts the submit button on the button page and clicks it.

use std::sync::Arc;

use anyhow::{bail, Result};
use client_core::{
    Button, ControlView, FetchThenNavigate, GuardedTrigger, HttpItemsSource, ItemsSource,
    Location, MockItemsSource, MockSettings, Navigator, RouteTable, Router,
};
use tracing::{debug, info, warn};

use crate::config::Settings;

const BUTTON_PAGE: &str = "/button";

#[derive(Debug)]
pub struct Summary {
    pub clicks: u32,
    pub executions: usize,
    pub dropped: usize,
    pub failures: usize,
    pub transitions: Vec<bool>,
    pub initial_view: ControlView,
    pub final_view: ControlView,
    pub final_location: Location,
}

/// Picks the network layer: the HTTP endpoint when a server URL is
/// configured, otherwise the in-process mock if the run mode allows it.
pub fn items_source(settings: &Settings) -> Result<Arc<dyn ItemsSource>> {
    if let Some(server_url) = &settings.server_url {
        info!(%server_url, "fetching items over http");
        return Ok(Arc::new(HttpItemsSource::new(server_url)?));
    }

    let mock = MockSettings::for_mode(settings.mode).with_latency(settings.latency);
    let mock = if settings.fail_fetch { mock.failing() } else { mock };
    if !mock.enabled {
        bail!("mocking is disabled outside development mode; pass --server-url");
    }
    info!(latency_ms = mock.latency.as_millis() as u64, "fetching items from mock");
    Ok(Arc::new(MockItemsSource::new(mock)))
}

pub async fn run(settings: &Settings) -> Result<Summary> {
    let source = items_source(settings)?;
    let router = Arc::new(
        Router::new(RouteTable::default(), BUTTON_PAGE)
            .with_transition_delay(settings.transition_delay),
    );
    let action = FetchThenNavigate::to(source, Arc::clone(&router), settings.destination.clone());
    let button = Button::new("submit", GuardedTrigger::new("submit", action));
    let initial_view = button.view();

    let mut feed = button.transitions();
    let watcher = tokio::spawn(async move {
        let mut transitions = Vec::new();
        while let Some(busy) = feed.next().await {
            debug!(disabled = busy, "submit button re-rendered");
            transitions.push(busy);
        }
        transitions
    });

    let mut handles = Vec::new();
    let mut dropped = 0;
    for click in 1..=settings.clicks {
        match button.click() {
            Some(handle) => handles.push(handle),
            None => {
                dropped += 1;
                debug!(click, "click dropped while submit is in flight");
            }
        }
        if click < settings.clicks && !settings.click_interval.is_zero() {
            tokio::time::sleep(settings.click_interval).await;
        }
    }

    let executions = handles.len();
    let mut failures = 0;
    for handle in handles {
        if let Err(error) = handle.await? {
            warn!(stage = error.stage(), %error, "submit failed; button re-enabled");
            failures += 1;
        }
    }

    let final_view = button.view();
    drop(button);
    let transitions = watcher.await?;

    Ok(Summary {
        clicks: settings.clicks,
        executions,
        dropped,
        failures,
        transitions,
        initial_view,
        final_view,
        final_location: router.location(),
    })
}

#[cfg(test)]
#[path = "tests/harness_tests.rs"]
mod tests;
