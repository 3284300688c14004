use anyhow::Context;
use imgui_wgpu::RendererConfig;

/// Whether the overlay pass is worth recording this frame.
fn overlay_needed(show_ui: bool, draw_lists: usize, vertices: i32) -> bool {
    // imgui-wgpu also misbehaves on frames without any draw lists
    show_ui && draw_lists > 0 && vertices > 0
}

/// Draws the imgui panels on top of the finished scene.
pub struct GuiOverlay {
    renderer: imgui_wgpu::Renderer,
}

impl GuiOverlay {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture_format: wgpu::TextureFormat,
        context: &mut imgui::Context,
    ) -> Self {
        let config = RendererConfig {
            texture_format,
            ..Default::default()
        };

        Self {
            renderer: imgui_wgpu::Renderer::new(context, device, queue, config),
        }
    }

    /// Ends the imgui frame and, if the panels are shown and produced geometry, loads
    /// `view` and draws them over it. Returns whether a pass was recorded.
    pub fn draw(
        &mut self,
        view: &wgpu::TextureView,
        context: &mut imgui::Context,
        show_ui: bool,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
    ) -> anyhow::Result<bool> {
        // Every started frame has to be ended, drawn or not
        let draw_data = context.render();

        if !overlay_needed(show_ui, draw_data.draw_lists_count(), draw_data.total_vtx_count) {
            return Ok(false);
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("GUI overlay"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        self.renderer
            .render(draw_data, queue, device, &mut render_pass)
            .context("Failed to draw the GUI overlay")?;

        Ok(true)
    }
}
