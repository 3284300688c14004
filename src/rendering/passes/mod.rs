pub mod mesh_pipeline;
pub mod pass;
pub mod render_pass_context;
pub mod scene_pass;
pub mod sky_pass;
