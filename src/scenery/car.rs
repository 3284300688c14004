use std::f32::consts::FRAC_PI_2;

use glam::Vec3;

use super::SceneryBuilder;
use crate::asset_pipeline::materials::Material;
use crate::color::Color;
use crate::geometry::{box_geometry, cylinder_geometry, sphere_geometry};
use crate::scene_graph::ObjectId;

const WHEEL_OFFSETS: [(f32, f32); 4] = [(-1.2, -0.75), (1.2, -0.75), (-1.2, 0.75), (1.2, 0.75)];

impl SceneryBuilder<'_> {
    /// A boxy car facing +X. Parts are placed in world space inside an untransformed group.
    pub fn create_car(&mut self, x: f32, z: f32, color: Color) -> ObjectId {
        let car = self.scene.add_group("Car", None);

        let body_key = format!("car_body_{:?}", color.to_array());
        let body = self.shared_model(&body_key, || {
            (box_geometry(3.0, 1.0, 1.5), Material::phong(color).named("Car body"))
        });
        let cabin = self.shared_model("car_cabin", || {
            (
                box_geometry(1.5, 0.75, 1.0),
                Material::phong(Color::WHITE)
                    .with_flat_shading()
                    .named("Car cabin"),
            )
        });
        let wheel = self.shared_model("car_wheel", || {
            (
                cylinder_geometry(0.4, 0.4, 0.4, 16),
                Material::phong(Color::from_hex(0x808080)).named("Wheel"),
            )
        });
        let headlight = self.shared_model("car_headlight", || {
            (
                sphere_geometry(0.2, 12, 6),
                Material::basic(Color::YELLOW).named("Headlight"),
            )
        });
        let taillight = self.shared_model("car_taillight", || {
            (
                sphere_geometry(0.2, 12, 6),
                Material::basic(Color::RED).named("Tail light"),
            )
        });

        let id = self.scene.add_mesh("Body", body, Some(car));
        self.scene.set_object_translation(id, Vec3::new(x, 0.75, z));

        let id = self.scene.add_mesh("Cabin", cabin, Some(car));
        self.scene
            .set_object_translation(id, Vec3::new(x + 0.5, 1.25, z));

        for (dx, dz) in WHEEL_OFFSETS {
            let id = self.scene.add_mesh("Wheel", wheel, Some(car));
            self.scene.set_object_euler(id, FRAC_PI_2, 0.0, 0.0);
            self.scene
                .set_object_translation(id, Vec3::new(x + dx, 0.4, z + dz));
        }

        for (model, name, dx) in [(headlight, "Headlight", 1.5), (taillight, "Tail light", -1.5)] {
            for dz in [0.55, -0.55] {
                let id = self.scene.add_mesh(name, model, Some(car));
                self.scene
                    .set_object_translation(id, Vec3::new(x + dx, 0.5, z + dz));
            }
        }

        car
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use glam::{EulerRot, Quat, Vec3};

    use super::WHEEL_OFFSETS;
    use crate::color::Color;
    use crate::config::SceneConfig;
    use crate::scene_graph::{Object3D, ObjectId, Scene};
    use crate::scenery::SceneryBuilder;

    fn parts<'a>(scene: &'a Scene, name: &str, car: ObjectId) -> Vec<&'a Object3D> {
        scene
            .get_object(car)
            .unwrap()
            .child_ids
            .iter()
            .map(|&id| scene.get_object(id).unwrap())
            .filter(|object| object.name == name)
            .collect()
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn body_cabin_and_wheels_sit_around_the_anchor() {
        let mut scene = Scene::new();
        let config = SceneConfig::default();
        let car = SceneryBuilder::new(&mut scene, &config).create_car(-4.0, 2.0, Color::RED);

        assert_eq!(scene.get_object(car).unwrap().transform.translation(), Vec3::ZERO);

        let body = parts(&scene, "Body", car);
        assert_eq!(body.len(), 1);
        assert!(close(body[0].transform.translation(), Vec3::new(-4.0, 0.75, 2.0)));

        let cabin = parts(&scene, "Cabin", car);
        assert!(close(cabin[0].transform.translation(), Vec3::new(-3.5, 1.25, 2.0)));

        let upright = Quat::from_euler(EulerRot::XYZ, FRAC_PI_2, 0.0, 0.0);
        let wheels = parts(&scene, "Wheel", car);
        assert_eq!(wheels.len(), 4);
        for (wheel, (dx, dz)) in wheels.iter().zip(WHEEL_OFFSETS) {
            assert!(close(wheel.transform.translation(), Vec3::new(-4.0 + dx, 0.4, 2.0 + dz)));
            assert!(wheel.transform.rotation().angle_between(upright) < 1e-5);
        }
    }

    #[test]
    fn lights_face_forward_and_back() {
        let mut scene = Scene::new();
        let config = SceneConfig::default();
        let car = SceneryBuilder::new(&mut scene, &config).create_car(1.0, 0.0, Color::RED);

        for (name, x) in [("Headlight", 2.5), ("Tail light", -0.5)] {
            let lights = parts(&scene, name, car);
            assert_eq!(lights.len(), 2);
            for (light, z) in lights.iter().zip([0.55, -0.55]) {
                assert!(close(light.transform.translation(), Vec3::new(x, 0.5, z)), "{}", name);
            }
        }
    }

    #[test]
    fn cars_of_one_color_share_a_body() {
        let mut scene = Scene::new();
        let config = SceneConfig::default();
        let mut builder = SceneryBuilder::new(&mut scene, &config);
        let a = builder.create_car(0.0, 0.0, Color::RED);
        let b = builder.create_car(0.0, 5.0, Color::RED);
        let c = builder.create_car(0.0, 10.0, Color::WHITE);

        let body = |car| parts(&scene, "Body", car)[0].model_id;
        assert_eq!(body(a), body(b));
        assert_ne!(body(a), body(c));
        assert_eq!(parts(&scene, "Cabin", a)[0].model_id, parts(&scene, "Cabin", c)[0].model_id);
    }
}
