pub mod config;
pub mod tracing;
pub mod wiring;

pub use config::{apply_env_overrides, default_config_path, load_config, resolve_config};
pub use self::tracing::init_tracing_subscriber;
pub use wiring::{wire_services, wire_with, SearchServices};
