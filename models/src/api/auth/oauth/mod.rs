//! The token endpoint and its device-authentication grant

mod token;

pub use self::token::*;
