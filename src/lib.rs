pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod services;
pub mod store;

pub use api::routes::create_routes;
pub use api::AppState;
