pub mod api;
pub mod config;
pub mod services;

pub use api::{create_router, AppState};
