//! Commonly used items, re-exported so that every module can `use
//! crate::prelude::*` the way the rest of the codebase expects

pub use models::{
	api::auth::{device::*, oauth::*},
	ErrorType,
	UserDevice,
};
pub use tracing::{debug, error, info, instrument, trace, warn};
pub use uuid::Uuid;

pub use crate::{
	app::App,
	utils::{config::AppConfig, constants},
};
