//! HTTP inbound adapter exposing the users REST endpoints and health probes.

pub mod context;
pub mod error;
pub mod health;
pub mod state;
pub mod users;
mod validation;

pub use error::{ApiError, ApiResult};
