//! Internal models of the service

mod access_token_data;

pub use self::access_token_data::AccessTokenData;
