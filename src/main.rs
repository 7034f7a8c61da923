//! cloudmeter - Track running state and per-minute billing cost of named
//! cloud machines
//!
//! A single-process, in-memory tracker: machines are created under a flat
//! per-minute price plan, started and stopped any number of times, and their
//! accrued cost is aggregated across the fleet, including cost banked from
//! machines that were deleted.

#![allow(dead_code)] // The core keeps its full API surface for embedders

mod core;
mod menu;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::core::Registry;
use crate::menu::Menu;

/// Application name constant
pub const APP_NAME: &str = "cloudmeter";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    info!("{} v{} starting...", APP_NAME, APP_VERSION);

    let mut registry = Registry::new();

    let stdin = io::stdin();
    Menu::new(stdin.lock(), io::stdout()).run(&mut registry)?;

    info!("{} shutting down", APP_NAME);
    Ok(())
}

/// Initialize the logging system
fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cloudmeter=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
