use glam::Vec3;

use super::SceneryBuilder;
use crate::asset_pipeline::materials::Material;
use crate::color::Color;
use crate::geometry::sphere_geometry;
use crate::scene_graph::ObjectId;

/// Below the ground until the first frame places them.
const HIDDEN_START: Vec3 = Vec3::new(0.0, -50.0, 0.0);

impl SceneryBuilder<'_> {
    pub fn create_celestial_body(
        &mut self,
        name: &str,
        size: f32,
        color: Color,
        initial_position: Vec3,
    ) -> ObjectId {
        let model = self.model(
            sphere_geometry(size, 32, 32),
            Material::celestial(name, color),
        );

        let id = self.scene.add_mesh(name, model, None);
        self.scene.set_object_translation(id, initial_position);
        id
    }

    pub fn create_sun_and_moon(&mut self) -> (ObjectId, ObjectId) {
        let sun = self.create_celestial_body("Sun", 5.0, Color::YELLOW, HIDDEN_START);
        let moon = self.create_celestial_body("Moon", 3.0, Color::LIGHT_GRAY, HIDDEN_START);
        (sun, moon)
    }

    /// Inside-out dome shaded by the sky pass.
    pub fn create_skybox(&mut self, radius: f32) -> ObjectId {
        let model = self.model(sphere_geometry(radius, 32, 32), Material::sky());
        self.scene.add_mesh("Skybox", model, None)
    }
}
