//! Application entry point for the town road network viewer.
//!
//! This binary sets up logging and eframe/egui and delegates all
//! interactive logic and rendering to [`Viewer`] from the `viewer` module.
//!
//! Usage: `town_roads [TOWNS_JSON]`. When a descriptor file is given, its
//! towns can be picked in the side panel.

mod viewer;

use anyhow::{Context, anyhow};
use log::info;
use road_core::town::{Town, parse_towns};
use std::{fs, path::Path};
use viewer::Viewer;

/// Reads and parses a JSON array of town descriptors.
fn load_towns(path: &Path) -> anyhow::Result<Vec<Town>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read towns from {}", path.display()))?;
    let towns = parse_towns(&json)
        .with_context(|| format!("invalid town descriptors in {}", path.display()))?;
    info!("loaded {} towns from {}", towns.len(), path.display());
    Ok(towns)
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if the towns file cannot be loaded, or eframe fails to create
///   the native window or event loop.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let towns = match std::env::args_os().nth(1) {
        Some(path) => load_towns(Path::new(&path))?,
        None => Vec::new(),
    };

    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Town Roads",
        options,
        Box::new(|_cc| {
            // Construct the root app state for the viewer.
            Ok(Box::new(Viewer::new(towns)))
        }),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}
