use glam::Vec3;

/// Linear RGB color. Hex values are treated as sRGB and converted on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub Vec3);

impl Color {
    pub const WHITE: Color = Color(Vec3::ONE);
    pub const BLACK: Color = Color(Vec3::ZERO);
    pub const RED: Color = Color(Vec3::new(1.0, 0.0, 0.0));
    pub const GREEN: Color = Color(Vec3::new(0.0, 1.0, 0.0));
    pub const YELLOW: Color = Color(Vec3::new(1.0, 1.0, 0.0));
    // CSS lightgray (0xd3d3d3) in linear space
    pub const LIGHT_GRAY: Color = Color(Vec3::new(0.651_406, 0.651_406, 0.651_406));

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;

        Self::from_srgb(r, g, b)
    }

    pub fn from_srgb(r: f32, g: f32, b: f32) -> Self {
        Color(Vec3::new(
            srgb_to_linear(r),
            srgb_to_linear(g),
            srgb_to_linear(b),
        ))
    }

    pub fn to_array(self) -> [f32; 3] {
        self.0.to_array()
    }

    pub fn scaled(self, intensity: f32) -> Vec3 {
        self.0 * intensity
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_channels_survive_conversion() {
        assert_eq!(Color::from_hex(0xff0000), Color::RED);
        assert_eq!(Color::from_hex(0x000000), Color::BLACK);
        let white = Color::from_hex(0xffffff);
        assert!((white.0 - Vec3::ONE).abs().max_element() < 1e-5);
    }

    #[test]
    fn mid_gray_is_darker_in_linear_space() {
        let gray = Color::from_hex(0x808080);
        assert!(gray.0.x > 0.2 && gray.0.x < 0.23);
    }

    #[test]
    fn light_gray_constant_matches_hex() {
        let converted = Color::from_hex(0xd3d3d3);
        assert!((converted.0 - Color::LIGHT_GRAY.0).abs().max_element() < 1e-4);
    }
}
