use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};

use super::SceneryBuilder;
use crate::asset_pipeline::materials::{Material, Side, TextureSettings};
use crate::color::Color;
use crate::geometry::plane_geometry;
use crate::lights::Light;
use crate::scene_graph::ObjectId;

impl SceneryBuilder<'_> {
    /// Grass plane with the texture tiled once per two world units and blocky magnification.
    pub fn create_ground(&mut self, plane_size: f32) -> ObjectId {
        let repeats = plane_size / 2.0;
        let settings = TextureSettings {
            wrap_repeat: true,
            nearest_mag_filter: true,
            repeat: Vec2::splat(repeats),
            srgb: true,
        };

        let path = self.config.asset_path(&self.config.grass_texture);
        let grass = self.scene.materials.load_texture_or_fallback(&path, settings);

        let ground = self.model(
            plane_geometry(plane_size, plane_size),
            Material::phong(Color::WHITE)
                .with_map(grass)
                .with_side(Side::Double)
                .named("Ground"),
        );

        let id = self.scene.add_mesh("Ground", ground, None);
        self.scene.set_object_euler(id, -FRAC_PI_2, 0.0, 0.0);
        id
    }

    pub fn create_lights(&mut self) {
        self.scene.add_light(Light::Ambient {
            color: Color::from_hex(0x404040),
            intensity: 1.0,
        });
        self.scene.add_light(Light::Directional {
            color: Color::WHITE,
            intensity: 1.0,
            position: Vec3::new(5.0, 10.0, 7.5),
        });
        self.scene.add_light(Light::Point {
            color: Color::from_hex(0xff0000),
            intensity: 1.0,
            distance: 100.0,
            position: Vec3::new(5.0, 5.0, 5.0),
        });
        self.scene.add_light(Light::Hemisphere {
            sky: Color::from_hex(0xffffbb),
            ground: Color::from_hex(0x080820),
            intensity: 1.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::asset_pipeline::materials::Side;
    use crate::config::SceneConfig;
    use crate::scene_graph::Scene;
    use crate::scenery::SceneryBuilder;

    #[test]
    fn ground_is_flat_double_sided_and_tiled() {
        let mut scene = Scene::new();
        let config = SceneConfig::default();
        let ground = SceneryBuilder::new(&mut scene, &config).create_ground(42.0);
        scene.late_update();

        let bounds = scene.world_bounds(ground).unwrap();
        assert!(bounds.size().y.abs() < 1e-4);
        assert!((bounds.size().x - 42.0).abs() < 1e-3);

        let model_id = scene.get_object(ground).unwrap().model_id.unwrap();
        let material = scene
            .materials
            .material(scene.get_model(model_id).unwrap().material)
            .unwrap();
        assert_eq!(material.side, Side::Double);

        let texture = scene.materials.texture(material.map().unwrap()).unwrap();
        assert_eq!(texture.settings.repeat.x, 21.0);
        assert!(texture.settings.nearest_mag_filter);
    }

    #[test]
    fn four_lights() {
        let mut scene = Scene::new();
        let config = SceneConfig::default();
        SceneryBuilder::new(&mut scene, &config).create_lights();
        assert_eq!(scene.lights().len(), 4);
    }
}
