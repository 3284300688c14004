use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use id_arena::Arena;
use wgpu::CommandEncoderDescriptor;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    camera::CameraUniform,
    config::RenderConfig,
    demo::DemoState,
    lights::LightsUniform,
    rendering::{
        global_uniform::GlobalUniformState,
        gui_overlay::GuiOverlay,
        instance::{InstanceBuffer, Instances},
        passes::{
            pass::Pass,
            render_pass_context::{PassCreationContext, RenderPassContext},
            scene_pass::{ScenePass, ScenePassTextureViews},
            sky_pass::{SkyPass, SkyPassTextureViews},
        },
        render_common::RenderCommon,
        render_material_manager::RenderMaterialManager,
        render_model::RenderModel,
        shader_loader::{PipelineCacheBuilder, ShaderLoader},
        texture::DepthTexture,
    },
    scene_graph::Scene,
};

/// A frame whose scene passes are recorded but not yet submitted, so the GUI can be
/// drawn on top once the engine has built it.
pub struct FrameResult {
    output: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
    encoder: wgpu::CommandEncoder,
}

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,

    common: Arc<RenderCommon>,
    depth_texture: DepthTexture,
    render_models: Arena<RenderModel>,
    material_manager: RenderMaterialManager,

    instances: Instances,
    instance_buffer: InstanceBuffer,
    camera_uniform: CameraUniform,

    shader_loader: ShaderLoader,

    sky_pass: SkyPass,
    scene_pass: ScenePass,
    gui_overlay: GuiOverlay,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        render_config: &RenderConfig,
        shader_dir: PathBuf,
        imgui_context: &mut imgui::Context,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable graphics adapter")?;

        log::info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        let common = Arc::new(RenderCommon::new(
            &device,
            &adapter,
            &surface,
            size,
            render_config,
        )?);

        let depth_texture = {
            let config = common
                .output_surface_config
                .read()
                .map_err(|_| anyhow::anyhow!("Surface config lock poisoned"))?;
            DepthTexture::new(&device, &config, "Depth texture")
        };

        let material_manager = RenderMaterialManager::new(&device, &queue);

        let mut cache_builder = PipelineCacheBuilder::new();
        let (sky_pass, scene_pass) = {
            let mut context = PassCreationContext {
                device: &device,
                common: common.clone(),
                cache_builder: &mut cache_builder,
                material_manager: &material_manager,
            };

            (
                SkyPass::create(&mut context)?.with_clear_color(render_config.clear_color),
                ScenePass::create(&mut context)?,
            )
        };

        let shader_loader = ShaderLoader::new(
            device.clone(),
            cache_builder,
            shader_dir,
            render_config.hot_reload_shaders,
        )?;

        let gui_overlay = GuiOverlay::new(&device, &queue, common.surface_format(), imgui_context);

        let instance_buffer = InstanceBuffer::new(&device);

        Ok(Self {
            window,
            size,
            surface,
            device,
            queue,
            common,
            depth_texture,
            render_models: Arena::new(),
            material_manager,
            instances: Instances::new(),
            instance_buffer,
            camera_uniform: CameraUniform::default(),
            shader_loader,
            sky_pass,
            scene_pass,
            gui_overlay,
        })
    }

    /// Creates GPU buffers for scene models that don't have them yet. Returns how many
    /// were uploaded.
    pub fn load_models(&mut self, scene: &mut Scene) -> usize {
        let mut uploaded = 0;

        for (_id, scene_model) in scene.models.iter_mut() {
            if scene_model.render_model.is_some() {
                continue;
            }

            let render_model = RenderModel::from_model(&self.device, &scene_model.model);
            scene_model.render_model = Some(self.render_models.alloc(render_model));
            uploaded += 1;

            log::debug!(
                "Loaded model {} with {} primitives",
                scene_model.name(),
                scene_model.model.primitives.len()
            );
        }

        if uploaded > 0 {
            log::info!("Uploaded {} models ({} total)", uploaded, self.render_models.len());
        }

        uploaded
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        let Ok(mut config) = self.common.output_surface_config.write() else {
            log::error!("Surface config lock poisoned; ignoring resize");
            return;
        };

        self.size = new_size;
        config.width = new_size.width;
        config.height = new_size.height;
        self.depth_texture.resize(&self.device, &config);
        self.surface.configure(&self.device, &config);
    }

    pub fn render(&mut self, demo_state: &mut DemoState) -> Result<FrameResult, wgpu::SurfaceError> {
        self.shader_loader.load_pending_shaders();

        let uploaded = self.load_models(&mut demo_state.scene);
        self.material_manager.sync(&demo_state.scene.materials);

        let scene = &demo_state.scene;
        let moved = scene
            .objects
            .iter()
            .any(|(_, object)| object.transform.has_changed());
        if moved || uploaded > 0 {
            self.instances.gather(scene);
            self.instance_buffer
                .write(&self.device, &self.queue, &self.instances);
        }

        self.camera_uniform.update(&demo_state.camera);
        self.camera_uniform
            .update_buffer(&self.queue, &self.common.camera_uniform_buffer);
        self.common.global_uniform.update(
            &self.queue,
            GlobalUniformState::new(
                self.size,
                demo_state.clock.elapsed(),
                &demo_state.celestial,
                LightsUniform::from_lights(scene.lights()),
            ),
        );

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let context = RenderPassContext {
            pipeline_cache: &self.shader_loader.cache,
            common: &self.common,
            scene,
            instances: &self.instances,
            instance_buffer: &self.instance_buffer,
            material_manager: &self.material_manager,
            render_models: &self.render_models,
        };

        self.sky_pass.render(
            &SkyPassTextureViews {
                color: view.clone(),
            },
            &mut encoder,
            &context,
        );

        self.scene_pass.render(
            &ScenePassTextureViews {
                color: view.clone(),
                depth: self.depth_texture.view().clone(),
            },
            &mut encoder,
            &context,
        );

        Ok(FrameResult {
            output,
            view,
            encoder,
        })
    }

    /// Ends the GUI frame, draws it over the scene when shown, then submits and presents.
    pub fn finish_frame(
        &mut self,
        frame: FrameResult,
        imgui_context: &mut imgui::Context,
        show_ui: bool,
    ) -> anyhow::Result<()> {
        let FrameResult {
            output,
            view,
            mut encoder,
        } = frame;

        self.gui_overlay.draw(
            &view,
            imgui_context,
            show_ui,
            &self.device,
            &self.queue,
            &mut encoder,
        )?;

        self.queue.submit([encoder.finish()]);
        self.window.pre_present_notify();
        output.present();

        Ok(())
    }
}
