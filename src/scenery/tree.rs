use glam::Vec3;
use rand::Rng;

use super::SceneryBuilder;
use crate::asset_pipeline::materials::Material;
use crate::color::Color;
use crate::geometry::{cone_geometry, cylinder_geometry};
use crate::scene_graph::ObjectId;

const FOLIAGE_LEVELS: usize = 5;
const FOLIAGE_HEIGHT: f32 = 1.5;

impl SceneryBuilder<'_> {
    /// A trunk of random height topped by five shrinking cones. The top cone has zero
    /// radius and draws nothing, but it is still a node in the graph.
    pub fn create_tree(&mut self, x: f32, y: f32, z: f32) -> ObjectId {
        let tree = self.scene.add_group("Tree", None);
        self.scene.set_object_translation(tree, Vec3::new(x, y, z));

        let trunk_height: f32 = self.rng.gen_range(5.0..7.0);
        let trunk = self.model(
            cylinder_geometry(0.2, 0.3, trunk_height, 32),
            Material::phong(Color::from_hex(0x8B4513)).named("Trunk"),
        );
        let id = self.scene.add_mesh("Trunk", trunk, Some(tree));
        self.scene
            .set_object_translation(id, Vec3::new(0.0, trunk_height / 2.0, 0.0));

        for level in 0..FOLIAGE_LEVELS {
            let radius = 2.0 - level as f32 * 0.5;
            let foliage = self.shared_model(&format!("foliage_{}", level), || {
                (
                    cone_geometry(radius, FOLIAGE_HEIGHT, 16),
                    Material::phong(Color::from_hex(0x228B22)).named("Foliage"),
                )
            });

            let level_height = trunk_height + level as f32 * FOLIAGE_HEIGHT;
            let id = self.scene.add_mesh("Foliage", foliage, Some(tree));
            self.scene.set_object_translation(
                id,
                Vec3::new(0.0, level_height + FOLIAGE_HEIGHT / 2.0, 0.0),
            );
        }

        tree
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SceneConfig;
    use crate::scene_graph::{ObjectId, Scene};
    use crate::scenery::SceneryBuilder;

    fn children(scene: &Scene, id: ObjectId) -> Vec<ObjectId> {
        scene.get_object(id).unwrap().child_ids.clone()
    }

    fn trunk_height(scene: &Scene, tree: ObjectId) -> f32 {
        let trunk = children(scene, tree)[0];
        scene.get_object(trunk).unwrap().transform.translation().y * 2.0
    }

    #[test]
    fn trunk_heights_stay_in_range_for_any_seed() {
        for seed in 0..50 {
            let mut scene = Scene::new();
            let config = SceneConfig {
                seed,
                ..Default::default()
            };
            let mut builder = SceneryBuilder::new(&mut scene, &config);
            let trees: Vec<_> = (0..4).map(|i| builder.create_tree(i as f32, 0.0, 0.0)).collect();

            for tree in trees {
                let height = trunk_height(&scene, tree);
                assert!((5.0..7.0).contains(&height), "seed {}: {}", seed, height);
            }
        }
    }

    #[test]
    fn foliage_cones_stack_and_shrink() {
        let mut scene = Scene::new();
        let config = SceneConfig::default();
        let tree = SceneryBuilder::new(&mut scene, &config).create_tree(3.0, 0.0, -2.0);

        let object = scene.get_object(tree).unwrap();
        assert_eq!(object.transform.translation(), glam::Vec3::new(3.0, 0.0, -2.0));

        let ids = children(&scene, tree);
        assert_eq!(ids.len(), 6);
        assert_eq!(scene.get_object(ids[0]).unwrap().name, "Trunk");

        let height = trunk_height(&scene, tree);
        for (level, &id) in ids[1..].iter().enumerate() {
            let foliage = scene.get_object(id).unwrap();
            assert_eq!(foliage.name, "Foliage");

            let expected_y = height + 1.5 * level as f32 + 0.75;
            assert!((foliage.transform.translation().y - expected_y).abs() < 1e-5);

            let model = &scene.get_model(foliage.model_id.unwrap()).unwrap().model;
            let radius = model.primitives[0]
                .vertices
                .iter()
                .map(|v| v.position.x.hypot(v.position.z))
                .fold(0.0f32, f32::max);
            let expected_radius = 2.0 - 0.5 * level as f32;
            assert!(
                (radius - expected_radius).abs() < 1e-4,
                "level {}: {}",
                level,
                radius
            );
        }
    }

    #[test]
    fn trees_share_foliage_models_per_level() {
        let mut scene = Scene::new();
        let config = SceneConfig::default();
        let mut builder = SceneryBuilder::new(&mut scene, &config);
        let a = builder.create_tree(0.0, 0.0, 0.0);
        let b = builder.create_tree(10.0, 0.0, 0.0);

        let model_of = |id: ObjectId| scene.get_object(id).unwrap().model_id.unwrap();
        let (a, b) = (children(&scene, a), children(&scene, b));

        assert_ne!(model_of(a[0]), model_of(b[0]), "each trunk gets its own model");
        for level in 1..6 {
            assert_eq!(model_of(a[level]), model_of(b[level]));
        }
        let levels: std::collections::HashSet<_> = a[1..].iter().map(|&id| model_of(id)).collect();
        assert_eq!(levels.len(), 5);
    }
}
