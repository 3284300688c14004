use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};
use wgpu::util::DeviceExt;

use crate::{
    asset_pipeline::materials::{Material, Shading, Side, TextureId},
    color::Color,
    material_manager::{MaterialId, MaterialManager},
    rendering::{texture::GpuTexture, util::bind_group_builder::BindGroupBuilder},
};

/// Which pipeline draws a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawPipeline {
    Sky,
    SceneFront,
    SceneBack,
    SceneDouble,
    Celestial,
    SceneTransparent,
}

impl DrawPipeline {
    pub fn for_material(material: &Material) -> Self {
        match (&material.shading, material.side) {
            (Shading::Sky, _) => DrawPipeline::Sky,
            (Shading::CelestialBody { .. }, _) => DrawPipeline::Celestial,
            _ if material.is_transparent() => DrawPipeline::SceneTransparent,
            (_, Side::Front) => DrawPipeline::SceneFront,
            (_, Side::Back) => DrawPipeline::SceneBack,
            (_, Side::Double) => DrawPipeline::SceneDouble,
        }
    }
}

pub const SHADING_BASIC: u32 = 0;
pub const SHADING_LAMBERT: u32 = 1;
pub const SHADING_PHONG: u32 = 2;
pub const SHADING_SKY: u32 = 3;
pub const SHADING_CELESTIAL: u32 = 4;

pub const FLAG_HAS_MAP: u32 = 1;
pub const FLAG_FLAT_SHADING: u32 = 1 << 1;
pub const FLAG_DOUBLE_SIDED: u32 = 1 << 2;

/// This should match `Material` in scene.wgsl
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    /// w = opacity
    pub color: Vec4,
    /// w = shininess
    pub specular: Vec4,
    pub uv_repeat: Vec2,
    pub shading_model: u32,
    pub flags: u32,
}

impl MaterialUniform {
    pub fn new(material: &Material, materials: &MaterialManager) -> Self {
        let (color, specular, shininess, shading_model, mut flags) = match material.shading {
            Shading::Basic { color, .. } => (color, Color::BLACK, 0.0, SHADING_BASIC, 0),
            Shading::Lambert { color } => (color, Color::BLACK, 0.0, SHADING_LAMBERT, 0),
            Shading::Phong {
                color,
                flat_shading,
                specular,
                shininess,
                ..
            } => {
                let flags = if flat_shading { FLAG_FLAT_SHADING } else { 0 };
                (color, specular, shininess, SHADING_PHONG, flags)
            }
            Shading::Sky => (Color::WHITE, Color::BLACK, 0.0, SHADING_SKY, 0),
            Shading::CelestialBody { color } => {
                (color, Color::BLACK, 0.0, SHADING_CELESTIAL, 0)
            }
        };

        let texture = material.map().and_then(|id| materials.texture(id));
        if texture.is_some() {
            flags |= FLAG_HAS_MAP;
        }
        if material.side == Side::Double {
            flags |= FLAG_DOUBLE_SIDED;
        }

        Self {
            color: color.0.extend(material.opacity),
            specular: specular.0.extend(shininess),
            uv_repeat: texture.map_or(Vec2::ONE, |texture| texture.settings.repeat),
            shading_model,
            flags,
        }
    }
}

pub struct RenderMaterial {
    _uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub pipeline: DrawPipeline,
}

/// GPU side of `MaterialManager`: one uniform buffer and bind group per material,
/// plus every texture a material maps.
pub struct RenderMaterialManager {
    device: wgpu::Device,
    queue: wgpu::Queue,

    textures: HashMap<TextureId, GpuTexture>,
    materials: HashMap<MaterialId, RenderMaterial>,

    white: GpuTexture,
    bind_group_layout: wgpu::BindGroupLayout,
}

impl RenderMaterialManager {
    const LABEL: &'static str = "Material";

    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let white = GpuTexture::white(device, queue);

        let template = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material layout template"),
            contents: bytemuck::cast_slice(&[MaterialUniform::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let bind_group_layout = Self::builder(&template, &white).layout(device);

        Self {
            device: device.clone(),
            queue: queue.clone(),
            textures: HashMap::new(),
            materials: HashMap::new(),
            white,
            bind_group_layout,
        }
    }

    fn builder<'a>(buffer: &'a wgpu::Buffer, texture: &'a GpuTexture) -> BindGroupBuilder<'a> {
        BindGroupBuilder::new(Self::LABEL, wgpu::ShaderStages::VERTEX_FRAGMENT)
            .uniform(0, "Material uniform buffer", buffer.as_entire_binding())
            .texture(1, &texture.view)
            .sampler(2, &texture.sampler)
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Uploads materials and textures added since the last call.
    pub fn sync(&mut self, manager: &MaterialManager) {
        for (material_id, material) in manager.materials() {
            if self.materials.contains_key(&material_id) {
                continue;
            }

            if let Some(texture_id) = material.map() {
                if let (false, Some(data)) = (
                    self.textures.contains_key(&texture_id),
                    manager.texture(texture_id),
                ) {
                    log::debug!("Uploading texture {}", data.name);
                    self.textures.insert(
                        texture_id,
                        GpuTexture::from_data(&self.device, &self.queue, data),
                    );
                }
            }

            let uniform = MaterialUniform::new(material, manager);
            let buffer = self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Material uniform buffer ({})", material.name)),
                    contents: bytemuck::cast_slice(&[uniform]),
                    usage: wgpu::BufferUsages::UNIFORM,
                });

            let texture = material
                .map()
                .and_then(|id| self.textures.get(&id))
                .unwrap_or(&self.white);
            let bind_group =
                Self::builder(&buffer, texture).build_with_layout(&self.device, &self.bind_group_layout);

            self.materials.insert(
                material_id,
                RenderMaterial {
                    _uniform_buffer: buffer,
                    bind_group,
                    pipeline: DrawPipeline::for_material(material),
                },
            );
        }
    }

    pub fn get(&self, id: MaterialId) -> Option<&RenderMaterial> {
        self.materials.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::asset_pipeline::materials::TextureSettings;
    use crate::material_manager::fallback_texture;

    #[test]
    fn phong_packs_specular_and_flags() {
        let manager = MaterialManager::new();
        let material = Material::phong(Color::from_hex(0x3498db)).with_flat_shading();
        let uniform = MaterialUniform::new(&material, &manager);

        assert_eq!(uniform.shading_model, SHADING_PHONG);
        assert_eq!(uniform.specular.w, 30.0);
        assert_eq!(uniform.flags, FLAG_FLAT_SHADING);
    }

    #[test]
    fn mapped_material_carries_texture_repeat() {
        let mut manager = MaterialManager::new();
        let settings = TextureSettings {
            wrap_repeat: true,
            repeat: Vec2::splat(10.0),
            ..Default::default()
        };
        let texture = manager.add_texture(fallback_texture(Path::new("grass.jpg"), settings));
        let material = Material::basic_textured(texture).with_side(Side::Double);
        let uniform = MaterialUniform::new(&material, &manager);

        assert_eq!(uniform.uv_repeat, Vec2::splat(10.0));
        assert_eq!(uniform.flags, FLAG_HAS_MAP | FLAG_DOUBLE_SIDED);
        assert_eq!(DrawPipeline::for_material(&material), DrawPipeline::SceneDouble);
    }

    #[test]
    fn sky_and_bodies_get_their_own_pipelines() {
        assert_eq!(DrawPipeline::for_material(&Material::sky()), DrawPipeline::Sky);
        assert_eq!(
            DrawPipeline::for_material(&Material::celestial("Sun", Color::YELLOW)),
            DrawPipeline::Celestial
        );
    }

    #[test]
    fn translucent_materials_blend_after_opaque_ones() {
        let manager = MaterialManager::new();
        let glass = Material::phong(Color::WHITE)
            .with_side(Side::Double)
            .with_opacity(0.25);
        let uniform = MaterialUniform::new(&glass, &manager);

        assert_eq!(uniform.color.w, 0.25);
        assert_eq!(DrawPipeline::for_material(&glass), DrawPipeline::SceneTransparent);

        let opaque = Material::phong(Color::WHITE).with_opacity(1.5);
        assert_eq!(MaterialUniform::new(&opaque, &manager).color.w, 1.0);
        assert_eq!(DrawPipeline::for_material(&opaque), DrawPipeline::SceneFront);
    }

    #[test]
    fn uniform_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 48);
    }
}
