use glam::{Mat4, Quat, Vec3};
use id_arena::Arena;

use crate::lights::Light;
use crate::material_manager::{MaterialId, MaterialManager};
use crate::math::bounds::AABB;
use crate::model::Model;
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::scene_model::{SceneModel, SceneModelId};
use crate::scene_graph::transform::Transform;

pub struct Scene {
    pub objects: Arena<Object3D>,
    pub models: Arena<SceneModel>,
    pub materials: MaterialManager,
    lights: Vec<Light>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            models: Arena::new(),
            materials: MaterialManager::new(),
            lights: Vec::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    /// Adds an empty node that only carries a transform for its children.
    pub fn add_group(&mut self, name: impl Into<String>, parent: Option<ObjectId>) -> ObjectId {
        let id = self.add_object(Object3D::named(name));
        if parent.is_some() {
            self.set_object_parent(id, parent);
        }
        id
    }

    pub fn add_model(&mut self, model: Model, material: MaterialId) -> SceneModelId {
        self.models.alloc(SceneModel::new(model, material))
    }

    pub fn add_mesh(
        &mut self,
        name: impl Into<String>,
        model_id: SceneModelId,
        parent: Option<ObjectId>,
    ) -> ObjectId {
        let mut object = Object3D::named(name);
        object.model_id = Some(model_id);

        let id = self.add_object(object);
        if parent.is_some() {
            self.set_object_parent(id, parent);
        }
        id
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    #[cfg(test)]
    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn get_model(&self, id: SceneModelId) -> Option<&SceneModel> {
        self.models.get(id)
    }

    /// Number of nodes that carry geometry, visible or not.
    pub fn mesh_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|(_, object)| object.is_mesh())
            .count()
    }

    fn root_objects(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects
            .iter()
            .filter(|(_, object)| object.parent_id.is_none())
            .map(|(id, _)| id)
    }

    /// Updates all object transforms in hierarchical order
    fn update_transforms(&self) {
        for root_id in self.root_objects() {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY);
        }
    }

    fn update_object_transform_recursive(&self, object_id: ObjectId, parent_world_matrix: Mat4) {
        let Some(object) = self.objects.get(object_id) else {
            return;
        };

        if object.transform.is_world_dirty() {
            let local_matrix = *object.transform.get_local_matrix();
            object
                .transform
                .set_world_matrix(parent_world_matrix * local_matrix);
        }

        let world_matrix = *object.transform.get_world_matrix();
        for &child_id in &object.child_ids {
            self.update_object_transform_recursive(child_id, world_matrix);
        }
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(old_parent_id) = self.objects.get(child_id).and_then(|c| c.parent_id) {
            if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                old_parent.child_ids.retain(|&id| id != child_id);
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;
        }

        if let Some(new_parent) = new_parent_id.and_then(|id| self.objects.get_mut(id)) {
            new_parent.child_ids.push(child_id);
        }

        self.invalidate_object_hierarchy(child_id);
    }

    fn with_transform(&mut self, object_id: ObjectId, f: impl FnOnce(&mut Transform)) {
        if let Some(object) = self.objects.get_mut(object_id) {
            f(&mut object.transform);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_translation(&mut self, object_id: ObjectId, translation: Vec3) {
        self.with_transform(object_id, |t| t.set_translation(translation));
    }

    pub fn set_object_rotation(&mut self, object_id: ObjectId, rotation: Quat) {
        self.with_transform(object_id, |t| t.set_rotation(rotation));
    }

    pub fn set_object_euler(&mut self, object_id: ObjectId, x: f32, y: f32, z: f32) {
        self.with_transform(object_id, |t| t.set_euler(x, y, z));
    }

    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.objects.get(object_id).map(|object| &object.transform)
    }

    pub fn set_visible(&mut self, object_id: ObjectId, visible: bool) {
        if let Some(object) = self.objects.get_mut(object_id) {
            if object.visible != visible {
                object.visible = visible;
                // Instance lists depend on visibility, so treat it as a transform change
                object.transform.invalidate_local();
            }
        }
    }

    /// An object is drawn only if it and all of its ancestors are visible.
    pub fn is_visible_in_hierarchy(&self, object_id: ObjectId) -> bool {
        let mut current = Some(object_id);
        while let Some(id) = current {
            match self.objects.get(id) {
                Some(object) if object.visible => current = object.parent_id,
                _ => return false,
            }
        }
        true
    }

    /// Calls `f` for every mesh whose whole ancestor chain is visible.
    pub fn for_each_visible_mesh(&self, mut f: impl FnMut(&Object3D, SceneModelId)) {
        let mut stack: Vec<ObjectId> = self.root_objects().collect();

        while let Some(id) = stack.pop() {
            let Some(object) = self.objects.get(id) else {
                continue;
            };
            if !object.visible {
                continue;
            }

            if let Some(model_id) = object.model_id {
                f(object, model_id);
            }
            stack.extend(object.child_ids.iter().copied());
        }
    }

    /// World-space bounds of an object's subtree. Only valid after `late_update`.
    pub fn world_bounds(&self, object_id: ObjectId) -> Option<AABB> {
        let object = self.objects.get(object_id)?;

        let own = object
            .model_id
            .and_then(|model_id| self.models.get(model_id))
            .and_then(|model| model.model.bounding_box())
            .map(|aabb| aabb.transformed(&object.transform.get_world_matrix()));

        object
            .child_ids
            .iter()
            .filter_map(|&child| self.world_bounds(child))
            .chain(own)
            .reduce(|a, b| a.union(&b))
    }

    pub fn early_update(&mut self) {
        for (_, object) in self.objects.iter() {
            object.transform.reset_flags();
        }
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_pipeline::materials::Material;
    use crate::color::Color;
    use crate::geometry::box_geometry;

    fn scene_with_box() -> (Scene, SceneModelId) {
        let mut scene = Scene::new();
        let material = scene.materials.add_material(Material::basic(Color::WHITE));
        let model = scene.add_model(box_geometry(1.0, 1.0, 1.0), material);
        (scene, model)
    }

    #[test]
    fn children_inherit_parent_transform() {
        let (mut scene, model) = scene_with_box();
        let group = scene.add_group("group", None);
        let child = scene.add_mesh("child", model, Some(group));

        scene.set_object_translation(group, Vec3::new(10.0, 0.0, 0.0));
        scene.set_object_translation(child, Vec3::new(0.0, 2.0, 0.0));
        scene.late_update();

        let position = scene.get_object_transform(child).unwrap().get_world_matrix().w_axis;
        assert_eq!(position.truncate(), Vec3::new(10.0, 2.0, 0.0));
    }

    #[test]
    fn moving_parent_invalidates_children() {
        let (mut scene, model) = scene_with_box();
        let group = scene.add_group("group", None);
        let child = scene.add_mesh("child", model, Some(group));
        scene.late_update();

        scene.set_object_translation(group, Vec3::new(0.0, 0.0, 5.0));
        scene.late_update();

        let position = scene.get_object_transform(child).unwrap().get_world_matrix().w_axis;
        assert_eq!(position.truncate(), Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn reparenting_moves_child_lists() {
        let (mut scene, model) = scene_with_box();
        let a = scene.add_group("a", None);
        let b = scene.add_group("b", None);
        let child = scene.add_mesh("child", model, Some(a));

        scene.set_object_parent(child, Some(b));

        assert!(scene.get_object(a).unwrap().child_ids.is_empty());
        assert_eq!(scene.get_object(b).unwrap().child_ids, vec![child]);
        assert_eq!(scene.get_object(child).unwrap().parent_id, Some(b));
    }

    #[test]
    fn hidden_group_hides_descendants() {
        let (mut scene, model) = scene_with_box();
        let group = scene.add_group("group", None);
        let child = scene.add_mesh("child", model, Some(group));
        let other = scene.add_mesh("other", model, None);

        scene.set_visible(group, false);

        assert!(!scene.is_visible_in_hierarchy(child));
        assert!(scene.is_visible_in_hierarchy(other));

        let mut drawn = Vec::new();
        scene.for_each_visible_mesh(|object, _| drawn.push(object.name.clone()));
        assert_eq!(drawn, vec!["other".to_string()]);
        assert_eq!(scene.mesh_count(), 2);
    }

    #[test]
    fn world_bounds_cover_subtree() {
        let (mut scene, model) = scene_with_box();
        let group = scene.add_group("group", None);
        let left = scene.add_mesh("left", model, Some(group));
        let right = scene.add_mesh("right", model, Some(group));
        scene.set_object_translation(left, Vec3::new(-2.0, 0.0, 0.0));
        scene.set_object_translation(right, Vec3::new(2.0, 0.0, 0.0));
        scene.late_update();

        let bounds = scene.world_bounds(group).unwrap();
        assert_eq!(bounds.min.x, -2.5);
        assert_eq!(bounds.max.x, 2.5);
        assert!(scene.get_object_by_name("right").is_some());
    }
}
