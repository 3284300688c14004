use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

use crate::color::Color;

pub const MAX_DIRECTIONAL_LIGHTS: usize = 4;
pub const MAX_POINT_LIGHTS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    Ambient {
        color: Color,
        intensity: f32,
    },
    /// Shines from `position` towards the origin.
    Directional {
        color: Color,
        intensity: f32,
        position: Vec3,
    },
    /// `distance` is the cutoff radius; zero means unbounded.
    Point {
        color: Color,
        intensity: f32,
        distance: f32,
        position: Vec3,
    },
    Hemisphere {
        sky: Color,
        ground: Color,
        intensity: f32,
    },
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct DirectionalLightUniform {
    /// Unit vector pointing towards the light
    pub direction: Vec4,
    pub color: Vec4,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct PointLightUniform {
    /// xyz = position, w = cutoff distance
    pub position_distance: Vec4,
    pub color: Vec4,
}

/// This should match `Lights` in shared/globals.wgsl
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct LightsUniform {
    pub ambient: Vec4,
    pub hemisphere_sky: Vec4,
    pub hemisphere_ground: Vec4,
    pub directional: [DirectionalLightUniform; MAX_DIRECTIONAL_LIGHTS],
    pub point: [PointLightUniform; MAX_POINT_LIGHTS],
    pub directional_count: u32,
    pub point_count: u32,
    _padding: [u32; 2],
}

impl LightsUniform {
    pub fn from_lights<'a>(lights: impl IntoIterator<Item = &'a Light>) -> Self {
        let mut uniform = LightsUniform::default();
        let mut ambient = Vec3::ZERO;
        let mut sky = Vec3::ZERO;
        let mut ground = Vec3::ZERO;

        for light in lights {
            match *light {
                Light::Ambient { color, intensity } => ambient += color.scaled(intensity),
                Light::Directional {
                    color,
                    intensity,
                    position,
                } => {
                    let index = uniform.directional_count as usize;
                    if index == MAX_DIRECTIONAL_LIGHTS {
                        log::warn!("Ignoring directional light beyond {}", MAX_DIRECTIONAL_LIGHTS);
                        continue;
                    }

                    uniform.directional[index] = DirectionalLightUniform {
                        direction: position.normalize_or(Vec3::Y).extend(0.0),
                        color: color.scaled(intensity).extend(1.0),
                    };
                    uniform.directional_count += 1;
                }
                Light::Point {
                    color,
                    intensity,
                    distance,
                    position,
                } => {
                    let index = uniform.point_count as usize;
                    if index == MAX_POINT_LIGHTS {
                        log::warn!("Ignoring point light beyond {}", MAX_POINT_LIGHTS);
                        continue;
                    }

                    uniform.point[index] = PointLightUniform {
                        position_distance: position.extend(distance),
                        color: color.scaled(intensity).extend(1.0),
                    };
                    uniform.point_count += 1;
                }
                Light::Hemisphere {
                    sky: sky_color,
                    ground: ground_color,
                    intensity,
                } => {
                    sky += sky_color.scaled(intensity);
                    ground += ground_color.scaled(intensity);
                }
            }
        }

        uniform.ambient = ambient.extend(1.0);
        uniform.hemisphere_sky = sky.extend(1.0);
        uniform.hemisphere_ground = ground.extend(1.0);
        uniform
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_each_kind_of_light() {
        let lights = [
            Light::Ambient {
                color: Color::from_hex(0x404040),
                intensity: 1.0,
            },
            Light::Directional {
                color: Color::WHITE,
                intensity: 1.0,
                position: Vec3::new(5.0, 10.0, 7.5),
            },
            Light::Point {
                color: Color::RED,
                intensity: 1.0,
                distance: 100.0,
                position: Vec3::new(5.0, 5.0, 5.0),
            },
            Light::Hemisphere {
                sky: Color::from_hex(0xffffbb),
                ground: Color::from_hex(0x080820),
                intensity: 1.0,
            },
        ];

        let uniform = LightsUniform::from_lights(&lights);

        assert_eq!(uniform.directional_count, 1);
        assert_eq!(uniform.point_count, 1);
        assert!((uniform.directional[0].direction.length() - 1.0).abs() < 1e-5);
        assert_eq!(uniform.point[0].position_distance.w, 100.0);
        assert!(uniform.ambient.x > 0.0);
        assert!(uniform.hemisphere_sky.x > uniform.hemisphere_ground.x);
    }

    #[test]
    fn excess_point_lights_are_dropped() {
        let lights: Vec<Light> = (0..6)
            .map(|i| Light::Point {
                color: Color::WHITE,
                intensity: 1.0,
                distance: 0.0,
                position: Vec3::splat(i as f32),
            })
            .collect();

        let uniform = LightsUniform::from_lights(&lights);
        assert_eq!(uniform.point_count as usize, MAX_POINT_LIGHTS);
    }

    #[test]
    fn uniform_size_is_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<LightsUniform>() % 16, 0);
    }

    #[test]
    fn field_order_matches_the_shared_globals_shader() {
        let source = include_str!("../assets/shaders/shared/globals.wgsl");
        let body = source
            .split("struct Lights {")
            .nth(1)
            .and_then(|rest| rest.split('}').next())
            .unwrap();
        let fields: Vec<&str> = body
            .lines()
            .filter_map(|line| line.trim().split_once(':'))
            .map(|(name, _)| name.trim())
            .collect();

        assert_eq!(
            fields,
            [
                "ambient",
                "hemisphere_sky",
                "hemisphere_ground",
                "directional",
                "point",
                "directional_count",
                "point_count",
            ]
        );
        assert_eq!(MAX_DIRECTIONAL_LIGHTS, 4);
        assert!(body.contains("array<DirectionalLight, 4>"));
        assert!(body.contains("array<PointLight, 4>"));
    }
}
