mod app;
mod log;
mod service;

pub use app::AppConfig;
pub use log::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use service::ServiceConfig;

pub const NS_PREFIX: &str = "NS";
pub const DEFAULT_CONFIG_FILE_PATH: &str = "nutriscan.toml";

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

// 30 seconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

// 5 seconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
