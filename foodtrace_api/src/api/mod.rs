pub mod cors;
pub mod errors;
pub mod handlers;
pub mod server;

pub use errors::{ApiError, ApiResult};
