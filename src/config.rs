use std::path::PathBuf;

use crate::color::Color;

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub hot_reload_shaders: bool,
    pub show_ui: bool,
    pub vsync: bool,
    pub clear_color: wgpu::Color,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            hot_reload_shaders: true,
            show_ui: true,
            vsync: true,
            // The canvas was transparent; the sky dome covers everything anyway.
            clear_color: wgpu::Color::TRANSPARENT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub assets_dir: PathBuf,
    pub seed: u64,

    pub plane_size: f32,
    pub road_width: f32,
    pub road_length: f32,
    pub road_margin: f32,
    pub tree_spacing: usize,
    pub tree_extent: i32,

    pub sky_radius: f32,
    pub cycle_speed: f32,
    pub celestial_orbit_radius: f32,
    pub celestial_orbit_height: f32,
    pub horizon: f32,

    pub grass_texture: PathBuf,
    pub lava_texture: PathBuf,
    pub bus_material: PathBuf,
    pub bus_geometry: PathBuf,

    pub car_colors: [Color; 2],
}

impl SceneConfig {
    /// Distance from a road's center line to the row of trees beside it.
    pub fn tree_offset(&self) -> f32 {
        self.road_width / 2.0 + self.road_margin
    }

    pub fn asset_path(&self, relative: &std::path::Path) -> PathBuf {
        self.assets_dir.join(relative)
    }

    /// Positions along a road where trees are planted.
    pub fn tree_positions(&self) -> impl Iterator<Item = f32> {
        (-self.tree_extent..=self.tree_extent)
            .step_by(self.tree_spacing)
            .map(|i| i as f32)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            seed: 0x5eed,

            plane_size: 42.0,
            road_width: 6.0,
            road_length: 42.0,
            road_margin: 5.0,
            tree_spacing: 12,
            tree_extent: 20,

            sky_radius: 500.0,
            cycle_speed: 0.1,
            celestial_orbit_radius: 50.0,
            celestial_orbit_height: 30.0,
            horizon: -0.1,

            grass_texture: PathBuf::from("images/grass4.png"),
            lava_texture: PathBuf::from("images/lava.png"),
            bus_material: PathBuf::from("models/bus.mtl"),
            bus_geometry: PathBuf::from("models/bus.obj"),

            car_colors: [Color::from_hex(0xff0000), Color::from_hex(0x0000ff)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trees_sit_beyond_road_margin() {
        let config = SceneConfig::default();
        assert_eq!(config.tree_offset(), 8.0);
    }

    #[test]
    fn tree_positions_cover_the_plane() {
        let config = SceneConfig::default();
        let positions: Vec<f32> = config.tree_positions().collect();
        assert_eq!(positions, vec![-20.0, -8.0, 4.0, 16.0]);
    }
}
