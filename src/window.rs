use std::{path::PathBuf, sync::Arc, time::Instant};

use anyhow::Context;
use glam::Vec2;
use imgui::{FontConfig, FontSource};
use imgui_winit_support::WinitPlatform;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, Event, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use crate::{demo::DemoState, engine, rendering::renderer::Renderer};

struct ImguiState {
    context: imgui::Context,
    platform: WinitPlatform,
}

struct App {
    renderer: Option<Renderer>,
    demo_state: DemoState,
    shader_dir: PathBuf,
    imgui: Option<ImguiState>,
    last_frame: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    fn from_demo_state(demo_state: DemoState) -> Self {
        let shader_dir = demo_state.config.assets_dir.join("shaders");

        Self {
            renderer: None,
            demo_state,
            shader_dir,
            imgui: None,
            last_frame: Instant::now(),
            error: None,
        }
    }

    fn setup_imgui(window: &Window) -> ImguiState {
        let mut context = imgui::Context::create();
        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(
            context.io_mut(),
            window,
            imgui_winit_support::HiDpiMode::Default,
        );

        let font_size = 14.0;
        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: font_size,
                ..Default::default()
            }),
        }]);

        // Disable INI support because it's broken in the published version of imgui
        context.set_ini_filename(None);

        ImguiState { context, platform }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes().with_title("Crossroads");
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );

        let mut imgui = Self::setup_imgui(&window);
        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            &self.demo_state.render_config,
            self.shader_dir.clone(),
            &mut imgui.context,
        ))?;

        let size = window.inner_size();
        self.demo_state
            .camera
            .set_aspect_from_size(size.width, size.height);
        self.demo_state.controls.set_viewport_height(size.height);

        window.request_redraw();
        self.imgui = Some(imgui);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let (Some(renderer), Some(imgui)) = (self.renderer.as_mut(), self.imgui.as_mut()) else {
            return Ok(());
        };

        let now = Instant::now();
        imgui
            .context
            .io_mut()
            .update_delta_time(now - self.last_frame);
        self.last_frame = now;

        renderer.window.request_redraw();

        imgui
            .platform
            .prepare_frame(imgui.context.io_mut(), &renderer.window)
            .context("Failed to prepare imgui frame")?;

        let ui = imgui.context.new_frame();
        let show_ui = self.demo_state.render_config.show_ui;
        engine::update(&mut self.demo_state, show_ui.then_some(&*ui))?;
        imgui.platform.prepare_render(ui, &renderer.window);

        match renderer.render(&mut self.demo_state) {
            Ok(result) => renderer.finish_frame(result, &mut imgui.context, show_ui)?,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated; reconfiguring");
                renderer.resize(renderer.size);
                // imgui still expects the frame it started to be rendered
                imgui.context.render();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                imgui.context.render();
                anyhow::bail!("Out of memory");
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timeout");
                imgui.context.render();
            }
            Err(other) => {
                log::error!("Unexpected surface error: {:?}", other);
                imgui.context.render();
                event_loop.exit();
            }
        }

        Ok(())
    }

    /// Feeds mouse input to the orbit controls unless imgui is using the mouse.
    fn route_mouse(&mut self, event: &WindowEvent) {
        let gui_wants_mouse = self
            .imgui
            .as_ref()
            .is_some_and(|imgui| imgui.context.io().want_capture_mouse);
        let state = &mut self.demo_state;

        match *event {
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } => {
                // Releases always go through so a drag can't get stuck
                if !gui_wants_mouse || button_state == ElementState::Released {
                    state.controls.on_mouse_button(button, button_state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let position = Vec2::new(position.x as f32, position.y as f32);
                state.controls.on_cursor_moved(position, &state.camera);
            }
            WindowEvent::MouseWheel { delta, .. } if !gui_wants_mouse => {
                state.controls.on_scroll(delta);
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }

        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e.context("Failed to initialise renderer"));
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        match &event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(*new_size);
                }
                self.demo_state
                    .camera
                    .set_aspect_from_size(new_size.width, new_size.height);
                self.demo_state.controls.set_viewport_height(new_size.height);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw(event_loop) {
                    self.fail(event_loop, e);
                }
            }
            WindowEvent::MouseInput { .. }
            | WindowEvent::CursorMoved { .. }
            | WindowEvent::MouseWheel { .. } => self.route_mouse(&event),
            _ => (),
        }

        if let (Some(renderer), Some(imgui)) = (self.renderer.as_ref(), self.imgui.as_mut()) {
            imgui.platform.handle_event::<()>(
                imgui.context.io_mut(),
                &renderer.window,
                &Event::WindowEvent { window_id, event },
            );
        }
    }
}

pub fn run(demo_state: DemoState) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::from_demo_state(demo_state);
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
