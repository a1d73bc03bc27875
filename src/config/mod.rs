//! Client configuration: backend endpoints, polling cadence and view limits.

mod loader;
mod store;
mod types;

pub use loader::{ConfigError, API_URL_ENV};
pub use store::ConfigStore;
pub use types::{ApiConfig, ChatConfig, Config, PollingConfig, SearchConfig, StorageConfig};
