use id_arena::Id;

use crate::{
    material_manager::MaterialId, model::Model, rendering::render_model::RenderModelId,
};

pub type SceneModelId = Id<SceneModel>;

/// Geometry plus the material it is drawn with. Several objects may share one
/// scene model; the renderer draws them as instances.
pub struct SceneModel {
    pub model: Model,
    pub material: MaterialId,
    pub render_model: Option<RenderModelId>,
}

impl SceneModel {
    pub fn new(model: Model, material: MaterialId) -> Self {
        Self {
            model,
            material,
            render_model: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.model.name
    }
}
