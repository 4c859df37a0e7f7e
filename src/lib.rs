pub mod body_frame;
pub mod config;
pub mod geometry;
pub mod metrics;
pub mod pose;
pub mod session;
pub mod tracker;
