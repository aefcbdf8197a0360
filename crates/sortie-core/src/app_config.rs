use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub places_api_key: String,
    pub places_base_url: String,
    pub weather_base_url: String,
    pub kv_rest_url: Option<String>,
    pub kv_rest_token: Option<String>,
    pub places_timeout_secs: u64,
    pub weather_timeout_secs: u64,
    pub kv_timeout_secs: u64,
    pub lane_concurrency: usize,
    pub detail_concurrency: usize,
    pub detail_budget: usize,
    pub search_cache_ttl_secs: u64,
    pub detail_cache_ttl_secs: u64,
    pub pool_fill_target: usize,
    pub guest_per_minute: u32,
    pub guest_per_day: u32,
    pub auth_per_minute: u32,
    pub auth_per_day: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("places_api_key", &"[redacted]")
            .field("places_base_url", &self.places_base_url)
            .field("weather_base_url", &self.weather_base_url)
            .field("kv_rest_url", &self.kv_rest_url)
            .field(
                "kv_rest_token",
                &self.kv_rest_token.as_ref().map(|_| "[redacted]"),
            )
            .field("places_timeout_secs", &self.places_timeout_secs)
            .field("weather_timeout_secs", &self.weather_timeout_secs)
            .field("kv_timeout_secs", &self.kv_timeout_secs)
            .field("lane_concurrency", &self.lane_concurrency)
            .field("detail_concurrency", &self.detail_concurrency)
            .field("detail_budget", &self.detail_budget)
            .field("search_cache_ttl_secs", &self.search_cache_ttl_secs)
            .field("detail_cache_ttl_secs", &self.detail_cache_ttl_secs)
            .field("pool_fill_target", &self.pool_fill_target)
            .field("guest_per_minute", &self.guest_per_minute)
            .field("guest_per_day", &self.guest_per_day)
            .field("auth_per_minute", &self.auth_per_minute)
            .field("auth_per_day", &self.auth_per_day)
            .finish()
    }
}
