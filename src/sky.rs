use std::f32::consts::PI;

use glam::Vec3;

use crate::config::SceneConfig;

/// Drives the sun and moon around the scene from elapsed wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayNightCycle {
    pub speed: f32,
    pub orbit_radius: f32,
    pub orbit_height: f32,
    /// A body stays visible while the sine of its phase is above this value
    pub horizon: f32,
}

impl Default for DayNightCycle {
    fn default() -> Self {
        Self {
            speed: 0.1,
            orbit_radius: 50.0,
            orbit_height: 30.0,
            horizon: -0.1,
        }
    }
}

impl DayNightCycle {
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            speed: config.cycle_speed,
            orbit_radius: config.celestial_orbit_radius,
            orbit_height: config.celestial_orbit_height,
            horizon: config.horizon,
        }
    }

    /// Phase in radians. This is also the `time` uniform the sky shader sees.
    pub fn phase(&self, elapsed: f32) -> f32 {
        elapsed * self.speed
    }

    pub fn sun_position(&self, phase: f32) -> Vec3 {
        Vec3::new(
            self.orbit_radius * phase.cos(),
            self.orbit_height * phase.sin(),
            self.orbit_radius * phase.sin(),
        )
    }

    pub fn moon_position(&self, phase: f32) -> Vec3 {
        self.sun_position(phase + PI)
    }

    pub fn sun_visible(&self, phase: f32) -> bool {
        phase.sin() > self.horizon
    }

    pub fn moon_visible(&self, phase: f32) -> bool {
        (phase + PI).sin() > self.horizon
    }

    pub fn state_at(&self, elapsed: f32) -> CelestialState {
        let phase = self.phase(elapsed);

        CelestialState {
            sky_time: phase,
            sun_position: self.sun_position(phase),
            moon_position: self.moon_position(phase),
            sun_visible: self.sun_visible(phase),
            moon_visible: self.moon_visible(phase),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelestialState {
    pub sky_time: f32,
    pub sun_position: Vec3,
    pub moon_position: Vec3,
    pub sun_visible: bool,
    pub moon_visible: bool,
}

impl CelestialState {
    pub fn at(elapsed: f32) -> Self {
        DayNightCycle::default().state_at(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn starts_at_sunrise() {
        let state = CelestialState::at(0.0);

        assert_eq!(state.sky_time, 0.0);
        assert!(approx(state.sun_position, Vec3::new(50.0, 0.0, 0.0)));
        assert!(approx(state.moon_position, Vec3::new(-50.0, 0.0, 0.0)));
        // sin(0) = 0 and sin(pi) is a hair above zero, both above the horizon
        assert!(state.sun_visible);
        assert!(state.moon_visible);
    }

    #[test]
    fn sun_is_overhead_at_quarter_cycle() {
        let cycle = DayNightCycle::default();
        let elapsed = (PI / 2.0) / cycle.speed;
        let state = cycle.state_at(elapsed);

        assert!(approx(state.sun_position, Vec3::new(0.0, 30.0, 50.0)));
        assert!(approx(state.moon_position, Vec3::new(0.0, -30.0, -50.0)));
        assert!(state.sun_visible);
        assert!(!state.moon_visible);
    }

    #[test]
    fn night_hides_the_sun() {
        let cycle = DayNightCycle::default();
        let state = cycle.state_at((3.0 * PI / 2.0) / cycle.speed);

        assert!(!state.sun_visible);
        assert!(state.moon_visible);
    }

    #[test]
    fn horizon_threshold_is_exclusive() {
        let cycle = DayNightCycle::default();
        // sin(phase) == horizon exactly
        let phase = (-0.1f32).asin();
        let just_below = phase - 1e-3;

        assert!(!cycle.sun_visible(just_below));
        assert!(cycle.sun_visible(phase + 1e-3));

        // Exactly on the threshold counts as below it
        let on_horizon = DayNightCycle {
            horizon: 0.0,
            ..Default::default()
        };
        assert_eq!(0.0f32.sin(), on_horizon.horizon);
        assert!(!on_horizon.sun_visible(0.0));

        let tilted = DayNightCycle {
            horizon: 0.5f32.sin(),
            ..Default::default()
        };
        assert!(!tilted.sun_visible(0.5));
    }

    #[test]
    fn bodies_are_always_opposite() {
        let cycle = DayNightCycle::default();
        for step in 0..32 {
            let phase = step as f32 * 0.37;
            let sum = cycle.sun_position(phase) + cycle.moon_position(phase);
            assert!(sum.length() < 1e-3);
        }
    }

    #[test]
    fn config_overrides_speed() {
        let config = SceneConfig {
            cycle_speed: 1.0,
            ..Default::default()
        };
        let cycle = DayNightCycle::from_config(&config);
        assert_eq!(cycle.phase(2.0), 2.0);
    }
}
