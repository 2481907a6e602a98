//! The two-step device registration flow: a bearer-token-gated initiation
//! that triggers an OTP challenge, and an OTP-verified completion that
//! finalizes device trust

mod complete_registration;
mod init_registration;

pub use self::{complete_registration::*, init_registration::*};
