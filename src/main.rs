// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scenarist - a canvas of connected notes for drafting scenarios.
//!
//! Notes live on an infinite canvas and are linked by undirected
//! connections. Work is autosaved continuously and can be saved to
//! portable `.scen` files.

mod app;
mod cli;
mod error;
mod io;
mod models;
mod persistence;
mod ui;
mod util;

use anyhow::Result;
use app::ScenaristApp;
use clap::Parser;
use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides the -v level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.log_filter()))
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Scenarist"),
        ..Default::default()
    };

    eframe::run_native(
        "Scenarist",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            Ok(Box::new(ScenaristApp::new(&args)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
