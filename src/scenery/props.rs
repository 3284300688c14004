use glam::Vec3;

use super::SceneryBuilder;
use crate::asset_pipeline::materials::{Material, TextureSettings};
use crate::color::Color;
use crate::geometry::{box_geometry, cylinder_geometry, sphere_geometry};
use crate::scene_graph::ObjectId;

impl SceneryBuilder<'_> {
    /// Lava cube, green ball and blue column behind the crossing. Returns the cube,
    /// which the render loop animates.
    pub fn create_props(&mut self) -> ObjectId {
        let path = self.config.asset_path(&self.config.lava_texture);
        let lava = self
            .scene
            .materials
            .load_texture_or_fallback(&path, TextureSettings::default());

        let cube = self.model(
            box_geometry(1.0, 1.0, 1.0),
            Material::basic_textured(lava).named("Lava"),
        );
        let cube = self.scene.add_mesh("Cube", cube, None);
        self.scene
            .set_object_translation(cube, Vec3::new(-5.0, 2.0, -5.0));

        let sphere = self.model(
            sphere_geometry(0.5, 16, 16),
            Material::basic(Color::from_hex(0x78ff44)),
        );
        let sphere = self.scene.add_mesh("Sphere", sphere, None);
        self.scene
            .set_object_translation(sphere, Vec3::new(0.0, 0.5, -5.0));

        let cylinder = self.model(
            cylinder_geometry(0.5, 0.5, 2.0, 32),
            Material::phong(Color::from_hex(0x3498db)),
        );
        let cylinder = self.scene.add_mesh("Cylinder", cylinder, None);
        self.scene
            .set_object_translation(cylinder, Vec3::new(5.0, 1.0, -5.0));

        cube
    }
}
