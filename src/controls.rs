use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

use crate::camera::PerspectiveCamera;

const EPS: f32 = 1e-6;
/// Pixels per scroll "line" when the platform reports pixel deltas
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    None,
    Rotate,
    Pan,
}

/// Orbits the camera around `target`: left drag rotates, right or middle drag pans, the
/// wheel zooms. Input only accumulates; `update` applies it to the camera.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,

    viewport_height: f32,
    drag: DragMode,
    cursor: Option<Vec2>,

    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_offset: Vec3,
    force_update: bool,
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,

            viewport_height: 1.0,
            drag: DragMode::None,
            cursor: None,

            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            force_update: true,
        }
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    /// Re-centres the orbit on whatever the camera now faces, keeping the distance, so
    /// a camera edited from the GUI does not snap back on the next drag.
    pub fn retarget(&mut self, camera: &PerspectiveCamera) {
        let distance = (camera.position - self.target).length().max(EPS);
        self.target = camera.position + camera.forward() * distance;
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        self.drag = match (state, button) {
            (ElementState::Pressed, MouseButton::Left) => DragMode::Rotate,
            (ElementState::Pressed, MouseButton::Right | MouseButton::Middle) => DragMode::Pan,
            (ElementState::Released, _) => DragMode::None,
            (ElementState::Pressed, _) => self.drag,
        };
    }

    /// Feeds an absolute cursor position; drags use the movement since the previous one.
    pub fn on_cursor_moved(&mut self, position: Vec2, camera: &PerspectiveCamera) {
        let previous = self.cursor.replace(position);
        let Some(previous) = previous else {
            return;
        };
        let delta = position - previous;

        match self.drag {
            DragMode::Rotate => self.rotate_by_pixels(delta),
            DragMode::Pan => self.pan_by_pixels(delta, camera),
            DragMode::None => {}
        }
    }

    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
        };
        self.zoom_by_lines(lines);
    }

    pub fn rotate_by_pixels(&mut self, delta: Vec2) {
        let per_pixel = TAU * self.rotate_speed / self.viewport_height;
        self.theta_delta -= delta.x * per_pixel;
        self.phi_delta -= delta.y * per_pixel;
    }

    /// Moves the target in the camera's view plane so that the point under the cursor
    /// follows it at the target's depth.
    pub fn pan_by_pixels(&mut self, delta: Vec2, camera: &PerspectiveCamera) {
        let distance = (camera.position - self.target).length();
        let visible_height = 2.0 * distance * (camera.fov.to_radians() / 2.0).tan();
        let world_per_pixel = visible_height / self.viewport_height * self.pan_speed;

        let orientation = camera.orientation();
        let right = orientation * Vec3::X;
        let up = orientation * Vec3::Y;

        self.pan_offset += (-delta.x * right + delta.y * up) * world_per_pixel;
    }

    /// Positive values zoom in.
    pub fn zoom_by_lines(&mut self, lines: f32) {
        let step = 0.95f32.powf(self.zoom_speed);
        self.scale *= step.powf(lines);
    }

    /// Applies accumulated input to `camera`. Returns whether the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let idle = self.theta_delta.abs() < EPS
            && self.phi_delta.abs() < EPS
            && (self.scale - 1.0).abs() < EPS
            && self.pan_offset.length_squared() < EPS * EPS;

        if idle && !self.force_update {
            self.reset_deltas();
            return false;
        }
        self.force_update = false;

        let offset = camera.position - self.target;
        let mut radius = offset.length();
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = if radius > 0.0 {
            (offset.y / radius).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };

        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        theta += self.theta_delta * factor;
        phi += self.phi_delta * factor;
        phi = phi
            .clamp(self.min_polar_angle, self.max_polar_angle)
            .clamp(EPS, PI - EPS);

        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * factor;

        let sin_phi = phi.sin();
        let new_offset = Vec3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );

        camera.position = self.target + new_offset;
        camera.look_at(self.target);

        if self.enable_damping {
            self.theta_delta *= 1.0 - self.damping_factor;
            self.phi_delta *= 1.0 - self.damping_factor;
            self.pan_offset *= 1.0 - self.damping_factor;
            self.scale = 1.0;
        } else {
            self.reset_deltas();
        }

        true
    }

    fn reset_deltas(&mut self) {
        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.scale = 1.0;
        self.pan_offset = Vec3::ZERO;
    }
}
