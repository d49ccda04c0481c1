//! Binary crate for the `weather` terminal dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive configuration and city search
//! - Rendering the dashboard to the terminal

use clap::Parser;
use std::io::IsTerminal;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod render;
mod search;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let console = render::Console::stderr();
    let log_sink = console.clone();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(move || log_sink.clone()),
        )
        .init();

    let cmd = cli::Cli::parse();
    cmd.run(console).await
}
