use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// REST backend location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend (e.g., "http://localhost:8081").
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    /// Connection timeout in seconds (default: 5).
    ///
    /// Only the connect phase is bounded; overall request latency is
    /// whatever the transport gives us.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u32,
}

/// Binary object store used for profile pictures and post media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_base_url")]
    pub base_url: String,
}

/// Poll intervals for views that keep remote collections fresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Open chat window message refresh (default: 3000).
    #[serde(default = "default_chat_messages_ms")]
    pub chat_messages_ms: u64,
    /// Navbar unread badge refresh (default: 5000).
    #[serde(default = "default_unread_count_ms")]
    pub unread_count_ms: u64,
    /// Chat list following refresh (default: 5000).
    #[serde(default = "default_following_ms")]
    pub following_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Quick search debounce window (default: 300).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Minimum query length before hitting the server (default: 2).
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Hard bound on message length, in characters (default: 100).
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,
    /// Length after which the composer warns (default: 80).
    #[serde(default = "default_near_limit_chars")]
    pub near_limit_chars: usize,
    /// Messages fetched per poll (default: 50).
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_api_base_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_connect_timeout() -> u32 {
    5
}

fn default_storage_base_url() -> String {
    "http://localhost:8082/storage".to_string()
}

fn default_chat_messages_ms() -> u64 {
    3000
}

fn default_unread_count_ms() -> u64 {
    5000
}

fn default_following_ms() -> u64 {
    5000
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_min_query_chars() -> usize {
    2
}

fn default_max_message_chars() -> usize {
    100
}

fn default_near_limit_chars() -> usize {
    80
}

fn default_page_size() -> u32 {
    50
}

impl ApiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.connect_timeout_seconds))
    }
}

impl PollingConfig {
    pub fn chat_messages(&self) -> Duration {
        Duration::from_millis(self.chat_messages_ms)
    }

    pub fn unread_count(&self) -> Duration {
        Duration::from_millis(self.unread_count_ms)
    }

    pub fn following(&self) -> Duration {
        Duration::from_millis(self.following_ms)
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            connect_timeout_seconds: default_connect_timeout(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_url: default_storage_base_url(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            chat_messages_ms: default_chat_messages_ms(),
            unread_count_ms: default_unread_count_ms(),
            following_ms: default_following_ms(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            min_query_chars: default_min_query_chars(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_chars: default_max_message_chars(),
            near_limit_chars: default_near_limit_chars(),
            page_size: default_page_size(),
        }
    }
}
