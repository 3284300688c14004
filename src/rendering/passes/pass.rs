use crate::rendering::passes::render_pass_context::{PassCreationContext, RenderPassContext};

pub(crate) trait Pass {
    type TextureViews;

    fn create(context: &mut PassCreationContext) -> anyhow::Result<Self>
    where
        Self: Sized;

    fn render(
        &self,
        texture_views: &Self::TextureViews,
        encoder: &mut wgpu::CommandEncoder,
        context: &RenderPassContext,
    );
}
