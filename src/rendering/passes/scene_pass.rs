use crate::rendering::{
    passes::{
        mesh_pipeline::{create_mesh_pipeline, MeshPipelineDesc},
        pass::Pass,
        render_pass_context::{PassCreationContext, RenderPassContext},
    },
    render_material_manager::DrawPipeline,
    shader_loader::{PipelineId, ShaderDefinition},
};

const SCENE_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Scene",
    path: "scene.wgsl",
};

const CELESTIAL_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Celestial",
    path: "celestial.wgsl",
};

/// Depth-tested draw of everything except the sky: opaque meshes with one pipeline per
/// face culling mode, the sun and moon, then translucent meshes.
pub struct ScenePass {
    pipelines: Vec<(DrawPipeline, PipelineId)>,
}

pub struct ScenePassTextureViews {
    pub color: wgpu::TextureView,
    pub depth: wgpu::TextureView,
}

impl ScenePass {
    fn add_pipeline(
        context: &mut PassCreationContext,
        layout: &wgpu::PipelineLayout,
        shader_def: ShaderDefinition,
        desc: MeshPipelineDesc,
    ) -> PipelineId {
        let layout = layout.clone();
        context.cache_builder.add_shader(
            shader_def,
            Box::new(
                move |device: &wgpu::Device, shader_def: &ShaderDefinition, source: &str| {
                    Ok(create_mesh_pipeline(device, &layout, shader_def, source, desc))
                },
            ),
        )
    }
}

impl Pass for ScenePass {
    type TextureViews = ScenePassTextureViews;

    fn create(context: &mut PassCreationContext) -> anyhow::Result<Self> {
        let layout = context.pipeline_layout("Scene pipeline layout");
        let format = context.common.surface_format();

        let back = Some(wgpu::Face::Back);
        // Drawn in this order
        let variants = [
            (DrawPipeline::SceneFront, SCENE_SHADER, "Scene pipeline (front)", back, false),
            (DrawPipeline::SceneBack, SCENE_SHADER, "Scene pipeline (back)", Some(wgpu::Face::Front), false),
            (DrawPipeline::SceneDouble, SCENE_SHADER, "Scene pipeline (double sided)", None, false),
            (DrawPipeline::Celestial, CELESTIAL_SHADER, "Celestial pipeline", back, false),
            (DrawPipeline::SceneTransparent, SCENE_SHADER, "Scene pipeline (translucent)", back, true),
        ];

        let pipelines = variants
            .into_iter()
            .map(|(kind, shader_def, label, cull_mode, translucent)| {
                let desc = MeshPipelineDesc {
                    label,
                    format,
                    cull_mode,
                    depth: true,
                    translucent,
                };
                (kind, Self::add_pipeline(context, &layout, shader_def, desc))
            })
            .collect();

        Ok(Self { pipelines })
    }

    fn render(
        &self,
        texture_views: &Self::TextureViews,
        encoder: &mut wgpu::CommandEncoder,
        context: &RenderPassContext,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &texture_views.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        context.bind_common(&mut render_pass);

        for &(kind, pipeline_id) in &self.pipelines {
            let Some(pipeline) = context.pipeline_cache.get(pipeline_id) else {
                continue;
            };
            render_pass.set_pipeline(pipeline);
            context.draw_batches(&mut render_pass, kind);
        }
    }
}
