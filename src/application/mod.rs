// Application layer - Series preparation and chart lifecycle
pub mod chart_adapter;
pub mod labels;
pub mod plot_surface;
pub mod report_service;
pub mod series_filter;
pub mod timestamps;
