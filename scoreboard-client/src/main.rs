//! Scoreboard command-line entry point.
//!
//! Signs in, loads every table and prints the rankings.

use scoreboard_client::config::ClientConfig;
use scoreboard_client::report::render_report;
use scoreboard_client::telemetry::init_tracing;
use scoreboard_client::RestBackend;
use scoreboard_storage::{Scoreboard, SessionOptions};
use std::time::Duration;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let config = ClientConfig::load()?;
    init_tracing(&config.logging)?;

    let backend = RestBackend::new(&config)?;
    backend
        .sign_in(&config.auth.email, &config.auth.password)
        .await?;

    let options =
        SessionOptions::default().with_timeout(Duration::from_millis(config.request_timeout_ms));
    let mut scoreboard = Scoreboard::new(backend, options);
    scoreboard.open().await?;

    let snapshot = scoreboard.snapshot();
    print!("{}", render_report(&snapshot.views(), snapshot.challenges()));

    if let Err(err) = scoreboard.backend().sign_out().await {
        tracing::warn!(error = %err, "sign-out failed");
    }
    scoreboard.sign_out();
    Ok(())
}
