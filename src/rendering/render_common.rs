use std::sync::RwLock;

use wgpu::SurfaceConfiguration;
use winit::dpi::PhysicalSize;

use crate::{
    camera::CameraUniform,
    config::RenderConfig,
    lights::LightsUniform,
    sky::CelestialState,
    rendering::{
        global_uniform::{GlobalUniform, GlobalUniformState},
        util::bind_group_builder::BindGroupBuilder,
    },
};

/// GPU state shared by every pass: the surface configuration plus the camera and
/// global uniforms with their bind groups.
pub struct RenderCommon {
    pub output_surface_config: RwLock<SurfaceConfiguration>,
    pub camera_uniform_buffer: wgpu::Buffer,
    pub camera_bind_group_layout: wgpu::BindGroupLayout,
    pub camera_bind_group: wgpu::BindGroup,
    pub global_uniform: GlobalUniform,
}

impl RenderCommon {
    pub fn new(
        device: &wgpu::Device,
        adapter: &wgpu::Adapter,
        surface: &wgpu::Surface,
        size: PhysicalSize<u32>,
        render_config: &RenderConfig,
    ) -> anyhow::Result<Self> {
        let surface_caps = surface.get_capabilities(adapter);
        let Some(&first_format) = surface_caps.formats.first() else {
            anyhow::bail!("Surface reports no supported formats");
        };

        // Colors are computed in linear space, so let the surface do the encoding
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(first_format);

        let present_mode = if render_config.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let output_surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(device, &output_surface_config);
        log::info!(
            "Configured surface: {:?}, {}x{}, {:?}",
            surface_format,
            output_surface_config.width,
            output_surface_config.height,
            present_mode
        );

        let camera_uniform_buffer = CameraUniform::default().create_buffer(device);
        let (camera_bind_group_layout, camera_bind_group) =
            BindGroupBuilder::new("Camera", wgpu::ShaderStages::VERTEX_FRAGMENT)
                .uniform(
                    0,
                    "Camera uniform buffer",
                    camera_uniform_buffer.as_entire_binding(),
                )
                .build(device);

        let global_uniform = GlobalUniform::new(
            device,
            GlobalUniformState::new(
                size,
                0.0,
                &CelestialState::at(0.0),
                LightsUniform::default(),
            ),
        );

        Ok(Self {
            output_surface_config: RwLock::new(output_surface_config),
            camera_uniform_buffer,
            camera_bind_group_layout,
            camera_bind_group,
            global_uniform,
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.output_surface_config
            .read()
            .map(|config| config.format)
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb)
    }
}
