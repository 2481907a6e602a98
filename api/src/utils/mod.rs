//! Ambient plumbing: configuration, constants and request extractors

pub mod config;
pub mod constants;
pub mod extractors;
