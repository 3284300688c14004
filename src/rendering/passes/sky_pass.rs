use crate::rendering::{
    passes::{
        mesh_pipeline::{create_mesh_pipeline, MeshPipelineDesc},
        pass::Pass,
        render_pass_context::{PassCreationContext, RenderPassContext},
    },
    render_material_manager::DrawPipeline,
    shader_loader::{PipelineId, ShaderDefinition},
};

const SKY_SHADER: ShaderDefinition = ShaderDefinition {
    name: "Sky",
    path: "sky.wgsl",
};

/// Clears the frame and draws the sky dome from the inside. Writes no depth, so the
/// dome never hides anything drawn after it.
pub struct SkyPass {
    pipeline_id: PipelineId,
    clear_color: wgpu::Color,
}

pub struct SkyPassTextureViews {
    pub color: wgpu::TextureView,
}

impl SkyPass {
    pub fn with_clear_color(mut self, clear_color: wgpu::Color) -> Self {
        self.clear_color = clear_color;
        self
    }
}

impl Pass for SkyPass {
    type TextureViews = SkyPassTextureViews;

    fn create(context: &mut PassCreationContext) -> anyhow::Result<Self> {
        let layout = context.pipeline_layout("Sky pipeline layout");
        let desc = MeshPipelineDesc {
            label: "Sky pipeline",
            format: context.common.surface_format(),
            cull_mode: Some(wgpu::Face::Front),
            depth: false,
            translucent: false,
        };

        let pipeline_id = context.cache_builder.add_shader(
            SKY_SHADER,
            Box::new(
                move |device: &wgpu::Device, shader_def: &ShaderDefinition, source: &str| {
                    Ok(create_mesh_pipeline(device, &layout, shader_def, source, desc))
                },
            ),
        );

        Ok(Self {
            pipeline_id,
            clear_color: wgpu::Color::BLACK,
        })
    }

    fn render(
        &self,
        texture_views: &Self::TextureViews,
        encoder: &mut wgpu::CommandEncoder,
        context: &RenderPassContext,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Sky pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &texture_views.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        let Some(pipeline) = context.pipeline_cache.get(self.pipeline_id) else {
            return;
        };

        render_pass.set_pipeline(pipeline);
        context.bind_common(&mut render_pass);
        context.draw_batches(&mut render_pass, DrawPipeline::Sky);
    }
}
