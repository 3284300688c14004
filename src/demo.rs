use anyhow::Context;
use glam::Vec3;

use crate::{
    animation::{AnimationClip, AnimationMixer},
    asset_pipeline::loader::{self, AssetLoader},
    camera::PerspectiveCamera,
    clock::FrameClock,
    config::{RenderConfig, SceneConfig},
    controls::OrbitControls,
    gui::{CameraPanel, FrameStats, StatsPanel},
    scene_graph::{ObjectId, Scene},
    scenery::{build_scene, SceneHandles},
    sky::{CelestialState, DayNightCycle},
};

const BUS_POSITION: Vec3 = Vec3::new(0.0, 0.0, 5.0);
const ORBIT_TARGET: Vec3 = Vec3::new(0.0, 5.0, 0.0);

pub struct DemoState {
    pub config: SceneConfig,
    pub render_config: RenderConfig,

    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,

    pub scene: Scene,
    pub handles: SceneHandles,

    pub clock: FrameClock,
    pub cycle: DayNightCycle,
    pub celestial: CelestialState,
    pub mixer: AnimationMixer,

    pub bus_loader: AssetLoader,
    pub bus: Option<ObjectId>,

    pub camera_panel: CameraPanel,
    pub stats_panel: StatsPanel,
}

impl DemoState {
    pub fn new(config: SceneConfig, render_config: RenderConfig) -> anyhow::Result<Self> {
        let mut scene = Scene::new();
        let handles = build_scene(&mut scene, &config);

        let mut mixer = AnimationMixer::new(handles.cube);
        mixer.play(AnimationClip::cube_rotation().context("Failed to build cube animation")?);

        let bus_loader = AssetLoader::spawn(
            "Bus",
            config.asset_path(&config.bus_material),
            config.asset_path(&config.bus_geometry),
        );

        let cycle = DayNightCycle::from_config(&config);
        let celestial = cycle.state_at(0.0);

        Ok(Self {
            camera: PerspectiveCamera::default(),
            controls: OrbitControls::new(ORBIT_TARGET),
            scene,
            handles,
            clock: FrameClock::new(),
            cycle,
            celestial,
            mixer,
            bus_loader,
            bus: None,
            camera_panel: CameraPanel::default(),
            stats_panel: StatsPanel::default(),
            config,
            render_config,
        })
    }

    /// Attaches the bus once its worker thread delivers it. A failed load is logged and
    /// the scene carries on without it.
    pub fn poll_assets(&mut self) {
        match self.bus_loader.poll() {
            Some(Ok(asset)) => {
                self.bus = Some(loader::attach(&mut self.scene, asset, BUS_POSITION));
            }
            Some(Err(e)) => log::error!("Failed to load the bus: {:#}", e),
            None => {}
        }
    }

    /// Moves the sun and moon along their orbits and hides whichever is below the horizon.
    pub fn update_sky(&mut self) {
        self.celestial = self.cycle.state_at(self.clock.elapsed());

        let CelestialState {
            sun_position,
            moon_position,
            sun_visible,
            moon_visible,
            ..
        } = self.celestial;

        self.scene
            .set_object_translation(self.handles.sun, sun_position);
        self.scene
            .set_object_translation(self.handles.moon, moon_position);
        self.scene.set_visible(self.handles.sun, sun_visible);
        self.scene.set_visible(self.handles.moon, moon_visible);
    }

    pub fn frame_stats(&self) -> FrameStats {
        FrameStats {
            object_count: self.scene.objects.len(),
            mesh_count: self.scene.mesh_count(),
            sun_visible: self.scene.is_visible_in_hierarchy(self.handles.sun),
            moon_visible: self.scene.is_visible_in_hierarchy(self.handles.moon),
            sky_time: self.celestial.sky_time,
            asset_status: self.bus_loader.status().to_string(),
        }
    }

}
