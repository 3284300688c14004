use std::path::Path;

use anyhow::Context;
use id_arena::{Arena, Id};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::asset_pipeline::materials::{Material, TextureData, TextureId, TextureSettings};

pub type MaterialId = Id<Material>;

/// Scene-side registry of materials and decoded textures. The renderer uploads
/// whatever it has not seen yet.
pub struct MaterialManager {
    materials: Arena<Material>,
    textures: Arena<TextureData>,
}

impl MaterialManager {
    pub fn new() -> Self {
        Self {
            materials: Arena::new(),
            textures: Arena::new(),
        }
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.alloc(material)
    }

    pub fn add_texture(&mut self, texture: TextureData) -> TextureId {
        self.textures.alloc(texture)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn texture(&self, id: TextureId) -> Option<&TextureData> {
        self.textures.get(id)
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials.iter()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Decodes an image file, or logs a warning and substitutes a procedural texture
    /// so that the scene still renders without its image assets.
    pub fn load_texture_or_fallback(
        &mut self,
        path: &Path,
        settings: TextureSettings,
    ) -> TextureId {
        let texture = match load_texture(path, settings) {
            Ok(texture) => texture,
            Err(e) => {
                log::warn!("{:#}; using a generated texture instead", e);
                fallback_texture(path, settings)
            }
        };

        self.add_texture(texture)
    }

    pub fn draw_ui(&self, ui: &imgui::Ui) {
        ui.window("Materials").build(|| {
            ui.text(format!("Textures: {}", self.textures.len()));
            ui.separator();

            for (id, material) in self.materials.iter() {
                ui.text(format!("{}: {}", id.index(), material.name));
            }
        });
    }
}

pub fn load_texture(path: &Path, settings: TextureSettings) -> anyhow::Result<TextureData> {
    let image = image::open(path)
        .with_context(|| format!("Failed to load texture {}", path.display()))?
        .to_rgba8();

    log::debug!(
        "Decoded texture {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );

    Ok(TextureData {
        name: texture_name(path),
        image,
        settings,
    })
}

/// Speckled noise seeded by the file name, so each missing texture gets a stable look.
pub fn fallback_texture(path: &Path, settings: TextureSettings) -> TextureData {
    const SIZE: u32 = 64;

    let name = texture_name(path);
    let seed = name.bytes().fold(0u64, |hash, b| {
        hash.wrapping_mul(31).wrapping_add(b as u64)
    });
    let mut rng = StdRng::seed_from_u64(seed);
    let base = [
        rng.gen_range(40..200u8),
        rng.gen_range(40..200u8),
        rng.gen_range(40..200u8),
    ];

    let image = image::RgbaImage::from_fn(SIZE, SIZE, |_, _| {
        let shade: i16 = rng.gen_range(-30..30);
        let channel = |c: u8| (c as i16 + shade).clamp(0, 255) as u8;
        image::Rgba([channel(base[0]), channel(base[1]), channel(base[2]), 255])
    });

    TextureData {
        name,
        image,
        settings,
    }
}

fn texture_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    #[test]
    fn missing_file_falls_back_to_generated_texture() {
        let mut manager = MaterialManager::new();
        let id = manager.load_texture_or_fallback(
            Path::new("does/not/exist/grass4.jpg"),
            TextureSettings::default(),
        );

        let texture = manager.texture(id).unwrap();
        assert_eq!(texture.name, "grass4.jpg");
        assert_eq!(texture.image.dimensions(), (64, 64));
    }

    #[test]
    fn shipped_scene_textures_decode() {
        let config = crate::config::SceneConfig::default();
        for relative in [&config.grass_texture, &config.lava_texture] {
            let path = Path::new(env!("CARGO_MANIFEST_DIR"))
                .join(config.asset_path(relative));
            let texture = load_texture(&path, TextureSettings::default()).unwrap();
            assert_eq!(texture.image.dimensions(), (128, 128));
        }
    }

    #[test]
    fn fallback_is_deterministic_per_name() {
        let a = fallback_texture(Path::new("lava.jpg"), TextureSettings::default());
        let b = fallback_texture(Path::new("other/lava.jpg"), TextureSettings::default());
        assert_eq!(a.image, b.image);
    }

    #[test]
    fn materials_keep_their_texture_map() {
        let mut manager = MaterialManager::new();
        let texture = manager.add_texture(fallback_texture(
            Path::new("x.png"),
            TextureSettings::default(),
        ));
        let id = manager.add_material(Material::phong(Color::WHITE).with_map(texture));

        assert_eq!(manager.material(id).unwrap().map(), Some(texture));
        assert_eq!(manager.material_count(), 1);
    }
}
