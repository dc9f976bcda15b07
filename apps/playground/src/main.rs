use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use client_core::RunMode;
use shared::domain::RoutePath;

mod config;
mod harness;

use config::{load_settings, Settings};

/// Clicks a guarded submit button and reports what the guard let through.
#[derive(Parser, Debug)]
struct Args {
    /// Base URL of the items API; the in-process mock is used when omitted.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    mode: Option<RunMode>,
    #[arg(long)]
    clicks: Option<u32>,
    #[arg(long)]
    click_interval_ms: Option<u64>,
    /// Mock fetch latency.
    #[arg(long)]
    latency_ms: Option<u64>,
    #[arg(long)]
    transition_ms: Option<u64>,
    /// Make the mock fetch fail.
    #[arg(long)]
    fail_fetch: bool,
    #[arg(long)]
    destination: Option<String>,
}

impl Args {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(v) = self.server_url {
            settings.server_url = Some(v);
        }
        if let Some(v) = self.mode {
            settings.mode = v;
        }
        if let Some(v) = self.clicks {
            settings.clicks = v;
        }
        if let Some(v) = self.click_interval_ms {
            settings.click_interval = Duration::from_millis(v);
        }
        if let Some(v) = self.latency_ms {
            settings.latency = Duration::from_millis(v);
        }
        if let Some(v) = self.transition_ms {
            settings.transition_delay = Duration::from_millis(v);
        }
        if self.fail_fetch {
            settings.fail_fetch = true;
        }
        if let Some(v) = self.destination {
            settings.destination = RoutePath::new(v);
        }
        settings
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    let settings = Args::parse().apply(load_settings());

    let summary = harness::run(&settings).await?;

    println!("before: {}", summary.initial_view);
    let rendered: Vec<&str> = summary
        .transitions
        .iter()
        .map(|busy| if *busy { "disabled" } else { "enabled" })
        .collect();
    println!("button states: {}", rendered.join(" -> "));
    println!("after: {}", summary.final_view);
    println!(
        "clicks={} executions={} dropped={} failures={}",
        summary.clicks, summary.executions, summary.dropped, summary.failures
    );
    println!("location: {}", summary.final_location);

    Ok(())
}
