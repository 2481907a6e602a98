//! The authentication surface: device registration and the token endpoint

pub mod device;
pub mod oauth;
