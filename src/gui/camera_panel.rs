use std::f32::consts::PI;

use imgui::{Condition, TreeNodeFlags};

use crate::camera::PerspectiveCamera;

/// Keeps a pair of values at least `min_dif` apart. Raising `min` pushes `max` up;
/// setting `max` re-applies `min`, which pushes `max` back up if it came too close.
#[derive(Debug, Clone, Copy)]
pub struct MinMaxGuiHelper {
    pub min_dif: f32,
}

impl MinMaxGuiHelper {
    pub fn new(min_dif: f32) -> Self {
        Self { min_dif }
    }

    pub fn set_min(&self, min: &mut f32, max: &mut f32, value: f32) {
        *min = value;
        *max = max.max(value + self.min_dif);
    }

    pub fn set_max(&self, min: &mut f32, max: &mut f32, value: f32) {
        *max = value;
        let current_min = *min;
        self.set_min(min, max, current_min);
    }
}

/// Rounds to the slider's 0.1 step.
fn snap_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

pub struct CameraPanel {
    clip_planes: MinMaxGuiHelper,
}

impl Default for CameraPanel {
    fn default() -> Self {
        Self {
            clip_planes: MinMaxGuiHelper::new(0.1),
        }
    }
}

impl CameraPanel {
    /// Returns whether any camera field was edited this frame.
    pub fn draw(&self, ui: &imgui::Ui, camera: &mut PerspectiveCamera) -> bool {
        let mut changed = false;

        ui.window("Camera")
            .position([10.0, 10.0], Condition::FirstUseEver)
            .size([320.0, 300.0], Condition::FirstUseEver)
            .build(|| {
                changed |= ui.slider("Field of View", 1.0, 180.0, &mut camera.fov);

                let mut near = camera.near;
                if ui
                    .slider_config("Near Plane", 0.1, 50.0)
                    .display_format("%.1f")
                    .build(&mut near)
                {
                    self.clip_planes
                        .set_min(&mut camera.near, &mut camera.far, snap_tenth(near));
                    changed = true;
                }

                let mut far = camera.far;
                if ui
                    .slider_config("Far Plane", 0.1, 1000.0)
                    .display_format("%.1f")
                    .build(&mut far)
                {
                    self.clip_planes
                        .set_max(&mut camera.near, &mut camera.far, snap_tenth(far));
                    changed = true;
                }

                changed |= ui.slider("Position X", -100.0, 100.0, &mut camera.position.x);
                changed |= ui.slider("Position Y", -100.0, 100.0, &mut camera.position.y);
                changed |= ui.slider("Position Z", -100.0, 100.0, &mut camera.position.z);

                if ui.collapsing_header("Rotation", TreeNodeFlags::DEFAULT_OPEN) {
                    changed |= ui.slider("Rotate X", -PI, PI, &mut camera.rotation.x);
                    changed |= ui.slider("Rotate Y", -PI, PI, &mut camera.rotation.y);
                    changed |= ui.slider("Rotate Z", -PI, PI, &mut camera.rotation.z);
                }
            });

        changed
    }
}
