//! One-time assembly of the crossroads scene.

mod car;
mod celestial;
mod ground;
mod props;
mod road;
mod traffic_light;
mod tree;

use std::collections::HashMap;
use std::f32::consts::PI;

use rand::{rngs::StdRng, SeedableRng};

use crate::asset_pipeline::materials::Material;
use crate::config::SceneConfig;
use crate::math::bounds::AABB;
use crate::model::Model;
use crate::scene_graph::{ObjectId, Scene, SceneModelId};

/// Objects the render loop keeps touching after assembly.
#[derive(Debug, Clone, Copy)]
pub struct SceneHandles {
    pub sun: ObjectId,
    pub moon: ObjectId,
    pub cube: ObjectId,
    pub skybox: ObjectId,
}

/// Adds scenery to a scene, sharing a model between every mesh that uses the same
/// geometry and material so they render as instances of one another.
pub struct SceneryBuilder<'a> {
    scene: &'a mut Scene,
    config: &'a SceneConfig,
    rng: StdRng,
    shared: HashMap<String, SceneModelId>,
}

impl<'a> SceneryBuilder<'a> {
    pub fn new(scene: &'a mut Scene, config: &'a SceneConfig) -> Self {
        Self {
            scene,
            config,
            rng: StdRng::seed_from_u64(config.seed),
            shared: HashMap::new(),
        }
    }

    fn model(&mut self, model: Model, material: Material) -> SceneModelId {
        let material = self.scene.materials.add_material(material);
        self.scene.add_model(model, material)
    }

    /// Returns the model stored under `key`, creating it on first use.
    fn shared_model(
        &mut self,
        key: &str,
        make: impl FnOnce() -> (Model, Material),
    ) -> SceneModelId {
        if let Some(&id) = self.shared.get(key) {
            return id;
        }

        let (model, material) = make();
        let id = self.model(model, material);
        self.shared.insert(key.to_string(), id);
        id
    }
}

pub fn build_scene(scene: &mut Scene, config: &SceneConfig) -> SceneHandles {
    let mut builder = SceneryBuilder::new(scene, config);

    let skybox = builder.create_skybox(config.sky_radius);
    builder.create_lights();
    builder.create_ground(config.plane_size);
    let cube = builder.create_props();

    builder.create_roads(config.road_length, config.road_width);

    let offset = config.tree_offset();
    let positions: Vec<f32> = config.tree_positions().collect();
    for &i in &positions {
        builder.create_tree(i, 0.1, -offset);
        builder.create_tree(i, 0.1, offset);
    }
    for &i in &positions {
        builder.create_tree(-offset, 0.1, i);
        builder.create_tree(offset, 0.1, i);
    }

    builder.create_traffic_light(3.0, -3.0, PI / 2.0);
    builder.create_traffic_light(-3.0, 3.0, -PI / 2.0);
    builder.create_traffic_light(3.0, 3.0, PI);
    builder.create_traffic_light(-3.0, -3.0, 0.0);

    let [first_color, second_color] = config.car_colors;
    builder.create_car(-10.0, 0.0, first_color);
    builder.create_car(10.0, 0.0, second_color);

    let (sun, moon) = builder.create_sun_and_moon();

    scene.late_update();
    for name in outside_sky_dome(scene, skybox) {
        log::warn!("{} reaches outside the sky dome", name);
    }

    log::info!(
        "Built scene with {} objects, {} meshes and {} models",
        scene.objects.len(),
        scene.mesh_count(),
        scene.models.len()
    );

    SceneHandles {
        sun,
        moon,
        cube,
        skybox,
    }
}

/// Names of top-level objects whose bounds are not enclosed by the sky dome. Needs
/// world matrices, so run it after `late_update`.
fn outside_sky_dome(scene: &Scene, skybox: ObjectId) -> Vec<String> {
    let Some(dome) = scene.world_bounds(skybox) else {
        return Vec::new();
    };

    let mut outside = Vec::new();
    let mut extent: Option<AABB> = None;
    for (id, object) in scene.objects.iter() {
        if object.parent_id.is_some() || id == skybox {
            continue;
        }
        let Some(bounds) = scene.world_bounds(id) else {
            continue;
        };

        if !(dome.contains_point(bounds.min) && dome.contains_point(bounds.max)) {
            outside.push(object.name.clone());
        }
        extent = Some(extent.map_or(bounds, |extent| extent.union(&bounds)));
    }

    if let Some(extent) = extent {
        log::debug!("Scenery spans {} around {}", extent.size(), extent.center());
    }
    outside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built() -> (Scene, SceneHandles) {
        let mut scene = Scene::new();
        let config = SceneConfig {
            assets_dir: "does-not-exist".into(),
            ..Default::default()
        };
        let handles = build_scene(&mut scene, &config);
        scene.late_update();
        (scene, handles)
    }

    #[test]
    fn mesh_inventory() {
        let (scene, _) = built();

        // skybox, ground, 3 props, 16 trees of 6, 2 roads, 4 traffic lights of 5,
        // 2 cars of 10, sun and moon
        assert_eq!(scene.mesh_count(), 1 + 1 + 3 + 16 * 6 + 2 + 4 * 5 + 2 * 10 + 2);
        assert_eq!(scene.mesh_count(), 145);
    }

    #[test]
    fn identical_parts_share_models() {
        let (scene, _) = built();
        // Far fewer models than meshes since wheels, foliage, lamps and roads are shared
        assert!(scene.models.len() < 60);
    }

    #[test]
    fn handles_point_at_named_objects() {
        let (scene, handles) = built();

        assert_eq!(scene.get_object(handles.sun).unwrap().name, "Sun");
        assert_eq!(scene.get_object(handles.moon).unwrap().name, "Moon");
        assert_eq!(scene.get_object(handles.cube).unwrap().name, "Cube");
        assert_eq!(scene.get_object(handles.skybox).unwrap().name, "Skybox");
    }

    #[test]
    fn same_seed_grows_the_same_forest() {
        let (a, _) = built();
        let (b, _) = built();

        let heights = |scene: &Scene| -> Vec<f32> {
            scene
                .objects
                .iter()
                .filter(|(_, object)| object.name == "Trunk")
                .map(|(_, object)| object.transform.translation().y)
                .collect()
        };

        let heights_a = heights(&a);
        assert_eq!(heights_a.len(), 16);
        assert_eq!(heights_a, heights(&b));
    }

    #[test]
    fn everything_sits_inside_the_sky_dome() {
        let (scene, handles) = built();
        assert!(outside_sky_dome(&scene, handles.skybox).is_empty());
    }

    #[test]
    fn far_objects_are_reported_outside_the_dome() {
        let (mut scene, handles) = built();
        let stray = scene.add_group("Stray", None);
        let material = scene.materials.add_material(Material::basic(crate::color::Color::WHITE));
        let model = scene.add_model(crate::geometry::box_geometry(1.0, 1.0, 1.0), material);
        scene.add_mesh("Stray box", model, Some(stray));
        scene.set_object_translation(stray, glam::Vec3::new(0.0, 0.0, 900.0));
        scene.late_update();

        assert_eq!(outside_sky_dome(&scene, handles.skybox), vec!["Stray".to_string()]);
    }
}
