use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::{
    lights::LightsUniform, rendering::util::bind_group_builder::BindGroupBuilder,
    sky::CelestialState,
};

/// This should match `Globals` in shared/globals.wgsl
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GlobalUniformState {
    pub resolution: [f32; 2],
    pub now: f32,
    /// Day/night phase in radians; the sky shader derives its colors from this
    pub sky_time: f32,
    /// xyz = unit vector towards the sun, w = 1 while it is above the horizon
    pub sun_direction: Vec4,
    pub lights: LightsUniform,
}

impl GlobalUniformState {
    pub fn new(
        resolution: PhysicalSize<u32>,
        now: f32,
        celestial: &CelestialState,
        lights: LightsUniform,
    ) -> Self {
        let visible = if celestial.sun_visible { 1.0 } else { 0.0 };

        Self {
            resolution: [resolution.width as f32, resolution.height as f32],
            now,
            sky_time: celestial.sky_time,
            sun_direction: celestial
                .sun_position
                .normalize_or(Vec3::Y)
                .extend(visible),
            lights,
        }
    }
}

pub struct GlobalUniform {
    buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl GlobalUniform {
    pub fn new(device: &wgpu::Device, initial_state: GlobalUniformState) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Global uniform buffer"),
            contents: bytemuck::cast_slice(&[initial_state]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let (bind_group_layout, bind_group) =
            BindGroupBuilder::new("Global uniform", wgpu::ShaderStages::VERTEX_FRAGMENT)
                .uniform(0, "Global uniform buffer", buffer.as_entire_binding())
                .build(device);

        Self {
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn update(&self, queue: &wgpu::Queue, state: GlobalUniformState) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[state]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_shader() {
        assert_eq!(std::mem::offset_of!(GlobalUniformState, sun_direction), 16);
        assert_eq!(std::mem::offset_of!(GlobalUniformState, lights), 32);
        assert_eq!(
            std::mem::size_of::<GlobalUniformState>(),
            32 + std::mem::size_of::<LightsUniform>()
        );
    }

    #[test]
    fn sun_direction_follows_the_cycle() {
        let celestial = CelestialState::at(std::f32::consts::FRAC_PI_2 / 0.1);
        let state = GlobalUniformState::new(
            PhysicalSize::new(800, 600),
            0.0,
            &celestial,
            LightsUniform::default(),
        );

        let expected = Vec3::new(0.0, 30.0, 50.0).normalize();
        assert!((state.sun_direction.truncate() - expected).length() < 1e-4);
        assert_eq!(state.sun_direction.w, 1.0);
    }
}
