use glam::Vec3;

use super::SceneryBuilder;
use crate::asset_pipeline::materials::Material;
use crate::color::Color;
use crate::geometry::{box_geometry, sphere_geometry};
use crate::scene_graph::ObjectId;

impl SceneryBuilder<'_> {
    /// Pole and housing turn with `rotation_y`; the lamps always sit on the +Z face.
    pub fn create_traffic_light(&mut self, x: f32, z: f32, rotation_y: f32) -> ObjectId {
        let group = self.scene.add_group("Traffic light", None);

        let pole = self.shared_model("traffic_pole", || {
            (
                box_geometry(0.1, 4.0, 0.1),
                Material::phong(Color::from_hex(0x202020)).named("Pole"),
            )
        });
        let housing = self.shared_model("traffic_housing", || {
            (
                box_geometry(0.4, 1.0, 0.2),
                Material::phong(Color::BLACK).named("Housing"),
            )
        });

        let id = self.scene.add_mesh("Pole", pole, Some(group));
        self.scene.set_object_euler(id, 0.0, rotation_y, 0.0);
        self.scene.set_object_translation(id, Vec3::new(x, 2.0, z));

        let id = self.scene.add_mesh("Housing", housing, Some(group));
        self.scene.set_object_euler(id, 0.0, rotation_y, 0.0);
        self.scene.set_object_translation(id, Vec3::new(x, 4.0, z));

        let lamps = [
            ("Red lamp", Color::RED),
            ("Yellow lamp", Color::YELLOW),
            ("Green lamp", Color::GREEN),
        ];
        for (i, (name, color)) in lamps.into_iter().enumerate() {
            let lamp = self.shared_model(name, || {
                (sphere_geometry(0.1, 16, 16), Material::basic(color).named(name))
            });

            let id = self.scene.add_mesh(name, lamp, Some(group));
            let dx = (i as f32 - 1.0) * 0.15;
            self.scene
                .set_object_translation(id, Vec3::new(x + dx, 4.0, z + 0.11));
        }

        group
    }
}
