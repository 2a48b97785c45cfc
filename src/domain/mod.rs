// Domain layer - Series, chart and render models
pub mod chart;
pub mod render;
pub mod series;
