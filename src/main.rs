use anyhow::{Context, Result};
use clap::Parser;

mod animation;
mod asset_pipeline;
mod camera;
mod cli;
mod clock;
mod color;
mod config;
mod controls;
mod demo;
mod engine;
mod geometry;
mod gui;
mod lights;
mod material_manager;
mod math;
mod model;
mod rendering;
mod scene_graph;
mod scenery;
mod sky;
mod window;

use crate::{
    cli::Cli,
    config::{RenderConfig, SceneConfig},
    demo::DemoState,
};

fn main() -> Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let mut scene_config = SceneConfig::default();
    let mut render_config = RenderConfig::default();
    cli.apply(&mut scene_config, &mut render_config);

    log::info!("Loading assets from {}", scene_config.assets_dir.display());

    let demo_state =
        DemoState::new(scene_config, render_config).context("Failed to create demo state")?;
    window::run(demo_state)?;

    Ok(())
}
