//! Entry point for the headless inspector.

use anyhow::Result;
use clap::Parser;
use cloud_inspector::{app::InspectorSession, config::InspectorConfig, frame::LogBackend};

fn main() -> Result<()> {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = InspectorConfig::parse();
    let mut session = InspectorSession::open(&config)?;
    let mut backend = LogBackend::default();

    session.render(&mut backend)?;

    if !config.picks.is_empty() {
        session.set_picking_enabled(true);

        for &(x, y) in &config.picks {
            match session.pick_at(x, y) {
                Some(point) => log::info!(
                    "pixel ({}, {}) -> row {} at {:?}",
                    x, y, point.row_index, point.position
                ),
                None => log::info!(
                    "pixel ({}, {}): no point within {}",
                    x, y, session.picker().threshold()
                ),
            }
        }

        session.render(&mut backend)?;
    }

    let report = session.measure();
    println!("{}", report);

    Ok(())
}
