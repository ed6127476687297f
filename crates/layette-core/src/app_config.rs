use std::path::PathBuf;

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

/// Resolved runtime configuration.
///
/// Feed endpoints are all optional: a source with no URL/key configured is
/// an intentionally disabled integration, and its sync is a warn-and-skip
/// rather than an error. Everything else carries a default.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub cj_api_url: Option<String>,
    pub cj_api_key: Option<String>,
    pub impact_api_url: Option<String>,
    pub impact_api_key: Option<String>,
    pub silvercross_feed_url: Option<String>,
    pub myregistry_api_url: Option<String>,
    pub myregistry_api_key: Option<String>,
    pub babylist_api_url: Option<String>,
    pub babylist_api_key: Option<String>,
    pub macrobaby_suggest_url: Option<String>,
    pub seed_path: PathBuf,
    pub feed_timeout_secs: u64,
    pub feed_user_agent: String,
    pub suggest_cache_ttl_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl AppConfig {
    /// CJ endpoint and bearer key, or `None` unless both are configured.
    #[must_use]
    pub fn cj_feed(&self) -> Option<(&str, &str)> {
        self.cj_api_url.as_deref().zip(self.cj_api_key.as_deref())
    }

    /// Impact endpoint and bearer key, or `None` unless both are configured.
    #[must_use]
    pub fn impact_feed(&self) -> Option<(&str, &str)> {
        self.impact_api_url
            .as_deref()
            .zip(self.impact_api_key.as_deref())
    }

    /// MyRegistry endpoint and bearer key, or `None` unless both are configured.
    #[must_use]
    pub fn myregistry_feed(&self) -> Option<(&str, &str)> {
        self.myregistry_api_url
            .as_deref()
            .zip(self.myregistry_api_key.as_deref())
    }

    /// Babylist endpoint and bearer key, or `None` unless both are configured.
    #[must_use]
    pub fn babylist_feed(&self) -> Option<(&str, &str)> {
        self.babylist_api_url
            .as_deref()
            .zip(self.babylist_api_key.as_deref())
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "[redacted]");
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("cj_api_url", &self.cj_api_url)
            .field("cj_api_key", &redact(&self.cj_api_key))
            .field("impact_api_url", &self.impact_api_url)
            .field("impact_api_key", &redact(&self.impact_api_key))
            .field("silvercross_feed_url", &self.silvercross_feed_url)
            .field("myregistry_api_url", &self.myregistry_api_url)
            .field("myregistry_api_key", &redact(&self.myregistry_api_key))
            .field("babylist_api_url", &self.babylist_api_url)
            .field("babylist_api_key", &redact(&self.babylist_api_key))
            .field("macrobaby_suggest_url", &self.macrobaby_suggest_url)
            .field("seed_path", &self.seed_path)
            .field("feed_timeout_secs", &self.feed_timeout_secs)
            .field("feed_user_agent", &self.feed_user_agent)
            .field("suggest_cache_ttl_secs", &self.suggest_cache_ttl_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
