use std::sync::Arc;

use id_arena::Arena;

use crate::{
    rendering::{
        instance::{InstanceBuffer, Instances},
        render_common::RenderCommon,
        render_material_manager::{DrawPipeline, RenderMaterialManager},
        render_model::RenderModel,
        shader_loader::{PipelineCache, PipelineCacheBuilder},
    },
    scene_graph::Scene,
};

pub struct PassCreationContext<'a> {
    pub device: &'a wgpu::Device,
    pub common: Arc<RenderCommon>,
    pub cache_builder: &'a mut PipelineCacheBuilder,
    pub material_manager: &'a RenderMaterialManager,
}

impl PassCreationContext<'_> {
    /// Camera, globals and material, in that order. Every pass uses the same layout.
    pub fn pipeline_layout(&self, label: &str) -> wgpu::PipelineLayout {
        self.device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &[
                    &self.common.camera_bind_group_layout,
                    &self.common.global_uniform.bind_group_layout,
                    self.material_manager.bind_group_layout(),
                ],
                push_constant_ranges: &[],
            })
    }
}

/// Everything a pass reads to record its draws for one frame.
pub struct RenderPassContext<'a> {
    pub pipeline_cache: &'a PipelineCache,
    pub common: &'a RenderCommon,
    pub scene: &'a Scene,
    pub instances: &'a Instances,
    pub instance_buffer: &'a InstanceBuffer,
    pub material_manager: &'a RenderMaterialManager,
    pub render_models: &'a Arena<RenderModel>,
}

impl RenderPassContext<'_> {
    pub fn bind_common(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(0, &self.common.camera_bind_group, &[]);
        render_pass.set_bind_group(1, &self.common.global_uniform.bind_group, &[]);
        self.instance_buffer.bind(render_pass);
    }

    /// Draws every batch whose material wants `kind`. Returns the number of draw calls.
    pub fn draw_batches(&self, render_pass: &mut wgpu::RenderPass<'_>, kind: DrawPipeline) -> usize {
        let mut draw_calls = 0;

        for batch in self.instances.batches() {
            let Some(material) = self.material_manager.get(batch.material) else {
                continue;
            };
            if material.pipeline != kind {
                continue;
            }

            let Some(render_model) = self
                .scene
                .get_model(batch.model)
                .and_then(|model| model.render_model)
                .and_then(|id| self.render_models.get(id))
            else {
                continue;
            };

            render_pass.set_bind_group(2, &material.bind_group, &[]);
            for primitive in &render_model.primitives {
                primitive.draw(render_pass, batch.instances.clone());
                draw_calls += 1;
            }
        }

        draw_calls
    }
}
