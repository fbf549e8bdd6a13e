pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use app::build_router;
pub use client::HttpBackend;
pub use config::Config;
pub use state::AppState;
