use std::env;
use std::str::FromStr;

use crate::pagination::PageSize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Upper bound on the duration of a single request.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,

    /// Static key passed through as the `x-api-key` header.
    pub api_key: Option<String>,

    pub timeout_ms: u64,

    pub default_page_size: PageSize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            default_page_size: PageSize::default(),
        }
    }
}

impl ClientConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let page_size: u64 = get_env(&lookup, "QUEUE_ADMIN_PAGE_SIZE", PageSize::default().get());
        Self {
            base_url:          get_env(&lookup, "QUEUE_ADMIN_BASE_URL", DEFAULT_BASE_URL.to_owned()),
            api_key:           lookup("QUEUE_ADMIN_API_KEY").filter(|key| !key.trim().is_empty()),
            timeout_ms:        get_env(&lookup, "QUEUE_ADMIN_TIMEOUT_MS", DEFAULT_TIMEOUT_MS),
            default_page_size: PageSize::new(page_size).unwrap_or_default(),
        }
    }
}

fn get_env<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring invalid value `{}` for {}", raw, key);
                default
            }
        },
        None => default,
    }
}
