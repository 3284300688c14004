use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use super::SceneryBuilder;
use crate::asset_pipeline::materials::Material;
use crate::color::Color;
use crate::geometry::plane_geometry;

impl SceneryBuilder<'_> {
    /// Two crossing asphalt strips, slightly above the grass.
    pub fn create_roads(&mut self, length: f32, width: f32) {
        let road = self.model(
            plane_geometry(length, width),
            Material::lambert(Color::from_hex(0x333333)).named("Road"),
        );

        let horizontal = self.scene.add_mesh("Road horizontal", road, None);
        self.scene.set_object_euler(horizontal, -FRAC_PI_2, 0.0, 0.0);
        self.scene
            .set_object_translation(horizontal, Vec3::new(0.0, 0.1, 0.0));

        let vertical = self.scene.add_mesh("Road vertical", road, None);
        self.scene
            .set_object_euler(vertical, -FRAC_PI_2, 0.0, FRAC_PI_2);
        self.scene
            .set_object_translation(vertical, Vec3::new(0.0, 0.1, 0.0));
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SceneConfig;
    use crate::scene_graph::Scene;
    use crate::scenery::SceneryBuilder;

    #[test]
    fn roads_cross_at_the_origin() {
        let mut scene = Scene::new();
        let config = SceneConfig::default();
        SceneryBuilder::new(&mut scene, &config).create_roads(42.0, 6.0);
        scene.late_update();

        let horizontal = scene.get_object_by_name("Road horizontal").unwrap();
        let vertical = scene.get_object_by_name("Road vertical").unwrap();
        let h = scene.world_bounds(horizontal).unwrap();
        let v = scene.world_bounds(vertical).unwrap();

        assert!((h.size().x - 42.0).abs() < 1e-3 && (h.size().z - 6.0).abs() < 1e-3);
        assert!((v.size().z - 42.0).abs() < 1e-3 && (v.size().x - 6.0).abs() < 1e-3);
        assert!((h.center().y - 0.1).abs() < 1e-5);
    }
}
