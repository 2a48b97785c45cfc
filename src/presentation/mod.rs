// Presentation layer - Page interaction events
pub mod page_events;
