pub mod answers;
pub mod convert;
pub mod error;
pub mod extract;
pub mod questions;
pub mod routes;
pub mod state;
pub mod users;

pub use routes::router;
pub use state::{AppState, AppStateInner};
