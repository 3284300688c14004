use std::path::PathBuf;

use clap::Parser;

use crate::config::{RenderConfig, SceneConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "crossroads")]
#[command(about = "A small intersection scene with a day/night cycle", long_about = None)]
pub struct Cli {
    /// Directory containing shaders, images and models
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Seed for the procedural tree heights
    #[arg(long)]
    pub seed: Option<u64>,

    /// Multiplier from wall-clock seconds to day/night phase
    #[arg(long = "cycle-speed")]
    pub cycle_speed: Option<f32>,

    /// Do not watch shader files for changes
    #[arg(long = "no-hot-reload", default_value = "false")]
    pub no_hot_reload: bool,

    /// Hide the camera and stats panels
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}

impl Cli {
    pub fn apply(&self, scene: &mut SceneConfig, render: &mut RenderConfig) {
        if let Some(assets) = &self.assets {
            scene.assets_dir = assets.clone();
        }

        if let Some(seed) = self.seed {
            scene.seed = seed;
        }

        if let Some(cycle_speed) = self.cycle_speed {
            scene.cycle_speed = cycle_speed;
        }

        render.hot_reload_shaders = !self.no_hot_reload;
        render.show_ui = !self.no_ui;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_only_given_values() {
        let cli = Cli::parse_from(["crossroads", "--seed", "7", "--no-ui"]);
        let mut scene = SceneConfig::default();
        let mut render = RenderConfig::default();
        cli.apply(&mut scene, &mut render);

        assert_eq!(scene.seed, 7);
        assert_eq!(scene.cycle_speed, 0.1);
        assert!(!render.show_ui);
        assert!(render.hot_reload_shaders);
    }

    #[test]
    fn parses_assets_dir_and_cycle_speed() {
        let cli = Cli::parse_from(["crossroads", "--assets", "/tmp/a", "--cycle-speed", "0.5"]);
        let mut scene = SceneConfig::default();
        let mut render = RenderConfig::default();
        cli.apply(&mut scene, &mut render);

        assert_eq!(scene.assets_dir, PathBuf::from("/tmp/a"));
        assert_eq!(scene.cycle_speed, 0.5);
    }
}
