use std::ops::Range;

use itertools::Itertools;
use wgpu::BufferUsages;

use crate::{
    material_manager::MaterialId,
    model::Instance,
    scene_graph::{Scene, SceneModelId},
};

/// One instanced draw: every visible object that shares a scene model.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBatch {
    pub model: SceneModelId,
    pub material: MaterialId,
    pub instances: Range<u32>,
}

/// Instance transforms for the visible scene, sorted so that objects sharing a model
/// are contiguous.
#[derive(Default)]
pub struct Instances {
    instances: Vec<Instance>,
    batches: Vec<DrawBatch>,
}

impl Instances {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gather(&mut self, scene: &Scene) {
        self.instances.clear();
        self.batches.clear();

        let mut visible = Vec::new();
        scene.for_each_visible_mesh(|object, model_id| {
            visible.push((model_id, *object.transform.get_world_matrix()));
        });
        visible.sort_by_key(|(model_id, _)| model_id.index());

        for (model_id, group) in &visible.into_iter().chunk_by(|(model_id, _)| *model_id) {
            let Some(scene_model) = scene.get_model(model_id) else {
                continue;
            };

            let start = self.instances.len() as u32;
            self.instances
                .extend(group.map(|(_, model)| Instance { model }));

            self.batches.push(DrawBatch {
                model: model_id,
                material: scene_model.material,
                instances: start..self.instances.len() as u32,
            });
        }
    }

    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    pub fn as_slice(&self) -> &[Instance] {
        &self.instances
    }

    pub fn should_render(&self) -> bool {
        !self.instances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }
}

pub struct InstanceBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
}

impl InstanceBuffer {
    const INITIAL_CAPACITY: u64 = 256;

    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            buffer: Self::create_buffer(device, Self::INITIAL_CAPACITY),
            capacity: Self::INITIAL_CAPACITY,
        }
    }

    fn create_buffer(device: &wgpu::Device, capacity: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance buffer"),
            size: std::mem::size_of::<Instance>() as u64 * capacity,
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Uploads `instances`, reallocating at twice the size when they don't fit.
    pub fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, instances: &Instances) {
        let needed = instances.len() as u64;
        if needed > self.capacity {
            let capacity = needed.next_power_of_two();
            log::debug!("Growing instance buffer from {} to {}", self.capacity, capacity);
            self.buffer = Self::create_buffer(device, capacity);
            self.capacity = capacity;
        }

        if instances.should_render() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(instances.as_slice()));
        }
    }

    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(1, self.buffer.slice(..));
    }
}
