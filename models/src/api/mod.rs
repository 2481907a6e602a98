//! Request and response types for every endpoint exposed by the service

pub mod auth;
