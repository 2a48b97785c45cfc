// Infrastructure layer - Configuration, payload loading and surfaces
pub mod config;
pub mod payload_loader;
pub mod recording_surface;
