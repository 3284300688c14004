use glam::Vec2;
use id_arena::Id;

use crate::color::Color;

pub type TextureId = Id<TextureData>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureSettings {
    pub wrap_repeat: bool,
    pub nearest_mag_filter: bool,
    pub repeat: Vec2,
    /// Whether the pixels hold sRGB-encoded color (as opposed to raw data).
    pub srgb: bool,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            wrap_repeat: false,
            nearest_mag_filter: false,
            repeat: Vec2::ONE,
            srgb: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextureData {
    pub name: String,
    pub image: image::RgbaImage,
    pub settings: TextureSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shading {
    /// Unlit: color times texture
    Basic { color: Color, map: Option<TextureId> },
    /// Diffuse only
    Lambert { color: Color },
    Phong {
        color: Color,
        map: Option<TextureId>,
        flat_shading: bool,
        specular: Color,
        shininess: f32,
    },
    /// Day/night dome driven by the global sky time
    Sky,
    /// Glowing sun or moon
    CelestialBody { color: Color },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub shading: Shading,
    pub side: Side,
    /// Below 1 the material is alpha blended after every opaque mesh
    pub opacity: f32,
}

impl Material {
    pub fn basic(color: Color) -> Self {
        Self::new("Basic", Shading::Basic { color, map: None })
    }

    pub fn basic_textured(map: TextureId) -> Self {
        Self::new(
            "Basic",
            Shading::Basic {
                color: Color::WHITE,
                map: Some(map),
            },
        )
    }

    pub fn lambert(color: Color) -> Self {
        Self::new("Lambert", Shading::Lambert { color })
    }

    pub fn phong(color: Color) -> Self {
        Self::new(
            "Phong",
            Shading::Phong {
                color,
                map: None,
                flat_shading: false,
                specular: Color::from_hex(0x111111),
                shininess: 30.0,
            },
        )
    }

    pub fn sky() -> Self {
        Self::new("Sky", Shading::Sky).with_side(Side::Back)
    }

    pub fn celestial(name: impl Into<String>, color: Color) -> Self {
        Self::new(name, Shading::CelestialBody { color })
    }

    pub fn new(name: impl Into<String>, shading: Shading) -> Self {
        Self {
            name: name.into(),
            shading,
            side: Side::Front,
            opacity: 1.0,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn with_map(mut self, texture: TextureId) -> Self {
        match &mut self.shading {
            Shading::Basic { map, .. } | Shading::Phong { map, .. } => *map = Some(texture),
            _ => log::warn!("Material {} cannot take a texture map", self.name),
        }
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }

    pub fn with_flat_shading(mut self) -> Self {
        if let Shading::Phong { flat_shading, .. } = &mut self.shading {
            *flat_shading = true;
        }
        self
    }

    pub fn map(&self) -> Option<TextureId> {
        match &self.shading {
            Shading::Basic { map, .. } | Shading::Phong { map, .. } => *map,
            _ => None,
        }
    }
}
