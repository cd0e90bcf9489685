// WI 511 construction project map editor service
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
