// Chart preparation for pre-computed load-test report metrics
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
