pub mod camera_panel;
pub mod stats_panel;

pub use camera_panel::{CameraPanel, MinMaxGuiHelper};
pub use stats_panel::{FrameStats, StatsPanel};
