pub mod config;
pub mod service;

pub use config::{ConfigError, LogFormat, ServiceConfig};
pub use service::{AppState, build_router, create_app};
