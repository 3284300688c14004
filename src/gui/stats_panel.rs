use std::collections::VecDeque;
use std::time::Duration;

use imgui::Condition;

const HISTORY: usize = 120;

/// Per-frame numbers shown in the stats window.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    pub object_count: usize,
    pub mesh_count: usize,
    pub sun_visible: bool,
    pub moon_visible: bool,
    pub sky_time: f32,
    pub asset_status: String,
}

pub struct StatsPanel {
    frame_times: VecDeque<Duration>,
}

impl Default for StatsPanel {
    fn default() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(HISTORY),
        }
    }
}

impl StatsPanel {
    pub fn record_frame(&mut self, frame_time: Duration) {
        if self.frame_times.len() == HISTORY {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);
    }

    pub fn average_frame_time(&self) -> Option<Duration> {
        let count = self.frame_times.len() as u32;
        if count == 0 {
            return None;
        }
        Some(self.frame_times.iter().sum::<Duration>() / count)
    }

    pub fn draw(&self, ui: &imgui::Ui, stats: &FrameStats) {
        ui.window("Stats")
            .position([340.0, 10.0], Condition::FirstUseEver)
            .size([260.0, 170.0], Condition::FirstUseEver)
            .build(|| {
                if let Some(average) = self.average_frame_time() {
                    let ms = average.as_secs_f32() * 1000.0;
                    ui.text(format!("Frame: {:.2} ms ({:.0} fps)", ms, 1000.0 / ms.max(0.001)));
                }

                ui.text(format!("Objects: {}", stats.object_count));
                ui.text(format!("Meshes: {}", stats.mesh_count));
                ui.separator();

                ui.text(format!("Sky time: {:.2}", stats.sky_time));
                ui.text(format!(
                    "Sun: {}  Moon: {}",
                    visibility(stats.sun_visible),
                    visibility(stats.moon_visible)
                ));
                ui.text(format!("Bus: {}", stats.asset_status));
            });
    }
}

fn visibility(visible: bool) -> &'static str {
    if visible {
        "up"
    } else {
        "down"
    }
}
