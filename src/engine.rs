use crate::demo::DemoState;

/// Advances the demo by one frame. `ui` is `None` when the panels are hidden.
pub fn update(state: &mut DemoState, ui: Option<&imgui::Ui>) -> anyhow::Result<()> {
    state.scene.early_update();

    state.poll_assets();

    let frame_time = state.clock.since_last_tick();
    let delta = state.clock.tick();
    state.stats_panel.record_frame(frame_time);

    state.update_sky();
    state.mixer.update(&mut state.scene, delta);

    state.controls.update(&mut state.camera);

    if let Some(ui) = ui {
        if state.camera_panel.draw(ui, &mut state.camera) {
            state.controls.retarget(&state.camera);
        }
        state.stats_panel.draw(ui, &state.frame_stats());
        state.scene.materials.draw_ui(ui);
    }

    state.scene.late_update();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RenderConfig, SceneConfig};

    #[test]
    fn frames_advance_the_cube_animation() {
        let mut state = DemoState::new(SceneConfig::default(), RenderConfig::default()).unwrap();
        let cube = state.handles.cube;

        update(&mut state, None).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(30));
        update(&mut state, None).unwrap();

        let rotation = state.scene.get_object_transform(cube).unwrap().rotation();
        assert!(state.mixer.actions()[0].time > 0.0);
        assert!(rotation.angle_between(glam::Quat::IDENTITY) > 0.0);
    }
}
