//! Small utility types shared across the API contract

mod base64string;

pub use self::base64string::Base64String;
