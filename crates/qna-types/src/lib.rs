pub mod api;
pub mod error;
pub mod models;
pub mod timestamp;

pub use error::{ValidationError, ValidationReason};
