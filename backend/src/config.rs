use jsonwebtoken::Algorithm;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_JWT_SECRET: &str = "dev-secret-key-change-in-production";

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub app: AppConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub cache: CacheConfig,
    pub llm: LlmConfig,
    pub cors: CorsConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    /// Include panic details in 500 responses
    pub debug: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Access token lifetime, e.g. "30m" or "24h"
    pub jwt_expires_in: String,
    /// HMAC algorithm: HS256, HS384 or HS512
    pub algorithm: String,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// "redis", "memory" or "none"
    pub backend: String,
    pub host: String,
    pub port: u16,
    pub db: u32,
    pub password: String,
    /// Entry lifetime in seconds (accepts "300", "5m", "1h")
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    pub api_base: String,
    /// Empty key disables the AI endpoints
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(deserialize_with = "deserialize_duration_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Comma separated origins, or "*"
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Config {
    /// Load configuration with environment variable override support
    ///
    /// Loading order:
    /// 1. Load from the explicit path, or the first config.toml found
    /// 2. Override with environment variables (prefixed with APP_)
    ///
    /// Runs before the subscriber exists, so what happened while loading is
    /// returned as notes for the caller to log. Call [`Config::validate`]
    /// once logging is up.
    pub fn load(explicit_path: Option<&str>) -> Result<(Self, Vec<String>), anyhow::Error> {
        let mut notes = Vec::new();
        let mut config = match explicit_path {
            Some(path) => {
                notes.push(format!("Loaded configuration from {}", path));
                Self::from_toml(path)?
            },
            None => match Self::find_config_file() {
                Some(config_path) => {
                    notes.push(format!("Loaded configuration from {}", config_path));
                    Self::from_toml(&config_path)?
                },
                None => {
                    notes.push("Configuration file not found, using defaults".to_string());
                    Config::default()
                },
            },
        };

        notes.extend(config.apply_overrides(|key| std::env::var(key).ok()));
        Ok((config, notes))
    }

    /// Apply APP_* overrides read through `lookup`, returning one note per variable seen
    ///
    /// Supported variables:
    /// - APP_SERVER_HOST / APP_SERVER_PORT
    /// - APP_DATABASE_URL
    /// - APP_JWT_SECRET / APP_JWT_EXPIRES_IN
    /// - APP_LOG_LEVEL
    /// - APP_CACHE_BACKEND / APP_CACHE_TTL
    /// - APP_REDIS_HOST / APP_REDIS_PORT / APP_REDIS_DB / APP_REDIS_PASSWORD
    /// - APP_LLM_API_BASE / APP_LLM_API_KEY / APP_LLM_MODEL
    /// - APP_CORS_ALLOWED_ORIGINS
    /// - APP_DEBUG
    ///
    /// Secrets are never echoed into the notes.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut notes = Vec::new();

        if let Some(host) = lookup("APP_SERVER_HOST") {
            self.server.host = host;
            notes.push(format!("Override server.host from env: {}", self.server.host));
        }

        if let Some(port) = lookup("APP_SERVER_PORT") {
            match port.parse() {
                Ok(port) => {
                    self.server.port = port;
                    notes.push(format!("Override server.port from env: {}", self.server.port));
                },
                Err(_) => notes.push(format!("Ignoring invalid APP_SERVER_PORT '{}'", port)),
            }
        }

        if let Some(db_url) = lookup("APP_DATABASE_URL") {
            self.database.url = db_url;
            notes.push("Override database.url from env".to_string());
        }

        if let Some(secret) = lookup("APP_JWT_SECRET") {
            self.auth.jwt_secret = secret;
            notes.push("Override auth.jwt_secret from env".to_string());
        }

        if let Some(expires) = lookup("APP_JWT_EXPIRES_IN") {
            self.auth.jwt_expires_in = expires;
            notes.push(format!(
                "Override auth.jwt_expires_in from env: {}",
                self.auth.jwt_expires_in
            ));
        }

        if let Some(level) = lookup("APP_LOG_LEVEL") {
            self.logging.level = level;
            notes.push(format!("Override logging.level from env: {}", self.logging.level));
        }

        if let Some(backend) = lookup("APP_CACHE_BACKEND") {
            self.cache.backend = backend;
            notes.push(format!("Override cache.backend from env: {}", self.cache.backend));
        }

        if let Some(ttl) = lookup("APP_CACHE_TTL") {
            match parse_duration_to_secs(&ttl) {
                Ok(val) => {
                    self.cache.ttl_secs = val;
                    notes.push(format!("Override cache.ttl_secs from env: {}", self.cache.ttl_secs));
                },
                Err(e) => notes.push(format!(
                    "Ignoring invalid APP_CACHE_TTL '{}': {} (keep {})",
                    ttl, e, self.cache.ttl_secs
                )),
            }
        }

        if let Some(host) = lookup("APP_REDIS_HOST") {
            self.cache.host = host;
            notes.push(format!("Override cache.host from env: {}", self.cache.host));
        }

        if let Some(port) = lookup("APP_REDIS_PORT") {
            match port.parse() {
                Ok(port) => {
                    self.cache.port = port;
                    notes.push(format!("Override cache.port from env: {}", self.cache.port));
                },
                Err(_) => notes.push(format!("Ignoring invalid APP_REDIS_PORT '{}'", port)),
            }
        }

        if let Some(db) = lookup("APP_REDIS_DB") {
            match db.parse() {
                Ok(db) => {
                    self.cache.db = db;
                    notes.push(format!("Override cache.db from env: {}", self.cache.db));
                },
                Err(_) => notes.push(format!("Ignoring invalid APP_REDIS_DB '{}'", db)),
            }
        }

        if let Some(password) = lookup("APP_REDIS_PASSWORD") {
            self.cache.password = password;
            notes.push("Override cache.password from env".to_string());
        }

        if let Some(api_base) = lookup("APP_LLM_API_BASE") {
            self.llm.api_base = api_base;
            notes.push(format!("Override llm.api_base from env: {}", self.llm.api_base));
        }

        if let Some(api_key) = lookup("APP_LLM_API_KEY") {
            self.llm.api_key = api_key;
            notes.push("Override llm.api_key from env".to_string());
        }

        if let Some(model) = lookup("APP_LLM_MODEL") {
            self.llm.model = model;
            notes.push(format!("Override llm.model from env: {}", self.llm.model));
        }

        if let Some(origins) = lookup("APP_CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = origins;
            notes.push(format!(
                "Override cors.allowed_origins from env: {}",
                self.cors.allowed_origins
            ));
        }

        if let Some(debug) = lookup("APP_DEBUG") {
            match debug.parse() {
                Ok(val) => {
                    self.app.debug = val;
                    notes.push(format!("Override app.debug from env: {}", self.app.debug));
                },
                Err(_) => notes.push(format!("Ignoring invalid APP_DEBUG '{}'", debug)),
            }
        }

        notes
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.auth.jwt_secret == DEFAULT_JWT_SECRET {
            tracing::warn!("⚠️  WARNING: Using default JWT secret!");
            tracing::warn!(
                "⚠️  Please set APP_JWT_SECRET environment variable or update config.toml"
            );
        }

        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.database.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        self.auth.expires_in_secs()?;
        self.auth.algorithm()?;
        if !(4..=31).contains(&self.auth.bcrypt_cost) {
            anyhow::bail!("auth.bcrypt_cost must be between 4 and 31");
        }

        if !matches!(self.cache.backend.as_str(), "redis" | "memory" | "none") {
            anyhow::bail!(
                "cache.backend must be one of redis, memory, none (got '{}')",
                self.cache.backend
            );
        }
        if self.cache.ttl_secs == 0 {
            anyhow::bail!("cache.ttl_secs must be > 0");
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            anyhow::bail!("llm.temperature must be between 0 and 2");
        }
        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be > 0");
        }

        if self.pagination.default_page_size == 0 || self.pagination.max_page_size == 0 {
            anyhow::bail!("pagination page sizes must be > 0");
        }
        if self.pagination.default_page_size > self.pagination.max_page_size {
            anyhow::bail!("pagination.default_page_size cannot exceed max_page_size");
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl AuthConfig {
    pub fn expires_in_secs(&self) -> Result<u64, anyhow::Error> {
        parse_duration_to_secs(&self.jwt_expires_in)
            .map_err(|e| anyhow::anyhow!("Invalid auth.jwt_expires_in '{}': {}", self.jwt_expires_in, e))
    }

    pub fn algorithm(&self) -> Result<Algorithm, anyhow::Error> {
        match Algorithm::from_str(&self.algorithm) {
            Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
            _ => anyhow::bail!(
                "auth.algorithm must be one of HS256, HS384, HS512 (got '{}')",
                self.algorithm
            ),
        }
    }
}

impl CacheConfig {
    /// Connection URL assembled from host/port/db and the (url-encoded) password
    pub fn redis_url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}:{}/{}", self.host, self.port, self.db)
        } else {
            format!(
                "redis://:{}@{}:{}/{}",
                urlencoding::encode(&self.password),
                self.host,
                self.port,
                self.db
            )
        }
    }
}

impl LlmConfig {
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl CorsConfig {
    pub fn origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    }

    pub fn allows_any(&self) -> bool {
        self.origins().iter().any(|origin| origin == "*")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { name: "Bookwise".to_string(), debug: false }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: "sqlite://data/bookwise.db".to_string(), max_connections: 10 }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expires_in: "30m".to_string(),
            algorithm: "HS256".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,bookwise=debug,tower_http=info".to_string(),
            file: Some("logs/bookwise.log".to_string()),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: "redis".to_string(),
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            password: String::new(),
            ttl_secs: 3600,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key: String::new(),
            model: "llama-3.1-8b-instant".to_string(),
            max_tokens: 500,
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { allowed_origins: "http://localhost:3000,http://localhost:8080".to_string() }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { default_page_size: 10, max_page_size: 100 }
    }
}

// =========================
// Helpers for parsing values
// =========================

pub fn parse_duration_to_secs(input: &str) -> Result<u64, String> {
    // Accept plain numbers (treated as seconds)
    if let Ok(val) = input.parse::<u64>() {
        return Ok(val);
    }

    let s = input.trim().to_lowercase();
    let (num_str, unit) = s.split_at(s.chars().take_while(|c| c.is_ascii_digit()).count());
    if num_str.is_empty() || unit.is_empty() {
        return Err("missing number or unit".into());
    }
    let n: u64 = num_str.parse().map_err(|_| "invalid number".to_string())?;
    match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => Ok(n),
        "m" | "min" | "mins" | "minute" | "minutes" => Ok(n * 60),
        "h" | "hr" | "hour" | "hours" => Ok(n * 60 * 60),
        "d" | "day" | "days" => Ok(n * 60 * 60 * 24),
        _ => Err(format!("unsupported unit: {}", unit)),
    }
}

// Custom serde deserializer to support numeric or human-friendly string values
fn deserialize_duration_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Visitor;
    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = u64;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number of seconds or a string like '30s', '5m', '1h'")
        }
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v)
        }
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if v >= 0 { Ok(v as u64) } else { Err(E::custom("negative not allowed")) }
        }
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            parse_duration_to_secs(v).map_err(E::custom)
        }
        fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            parse_duration_to_secs(&v).map_err(E::custom)
        }
    }
    deserializer.deserialize_any(Visitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_to_secs() {
        assert_eq!(parse_duration_to_secs("45"), Ok(45));
        assert_eq!(parse_duration_to_secs("30s"), Ok(30));
        assert_eq!(parse_duration_to_secs("5m"), Ok(300));
        assert_eq!(parse_duration_to_secs("24h"), Ok(86_400));
        assert_eq!(parse_duration_to_secs("1d"), Ok(86_400));
        assert!(parse_duration_to_secs("10y").is_err());
        assert!(parse_duration_to_secs("h").is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.auth.expires_in_secs().unwrap(), 1800);
        assert_eq!(config.auth.algorithm().unwrap(), Algorithm::HS256);
        assert!(!config.llm.is_configured());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [cache]
            backend = "memory"
            ttl_secs = "10m"

            [llm]
            api_key = "gsk-test"
            timeout_secs = "30s"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.cache.backend, "memory");
        assert_eq!(config.cache.ttl_secs, 600);
        assert_eq!(config.llm.timeout_secs, 30);
        assert!(config.llm.is_configured());
        assert_eq!(config.pagination.max_page_size, 100);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.cache.backend = "memcached".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.algorithm = "RS256".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.pagination.default_page_size = 200;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.auth.jwt_expires_in = "soon".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides_are_reported_without_secrets() {
        let env: std::collections::HashMap<&str, &str> = [
            ("APP_SERVER_PORT", "9100"),
            ("APP_JWT_SECRET", "s3cret-value"),
            ("APP_CACHE_TTL", "5m"),
            ("APP_REDIS_PORT", "not-a-port"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        let notes = config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.auth.jwt_secret, "s3cret-value");
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.cache.port, 6379);

        assert_eq!(notes.len(), 4);
        assert!(notes.iter().any(|n| n == "Override server.port from env: 9100"));
        assert!(notes.iter().any(|n| n.starts_with("Ignoring invalid APP_REDIS_PORT")));
        assert!(notes.iter().all(|n| !n.contains("s3cret-value")));
    }

    #[test]
    fn test_no_overrides_without_env() {
        let mut config = Config::default();
        assert!(config.apply_overrides(|_| None).is_empty());
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_redis_url_encodes_password() {
        let mut cache = CacheConfig::default();
        assert_eq!(cache.redis_url(), "redis://127.0.0.1:6379/0");

        cache.password = "p@ss/word".to_string();
        cache.db = 2;
        assert_eq!(cache.redis_url(), "redis://:p%40ss%2Fword@127.0.0.1:6379/2");
    }

    #[test]
    fn test_cors_origins() {
        let cors = CorsConfig { allowed_origins: " http://a.test , http://b.test,".to_string() };
        assert_eq!(cors.origins(), vec!["http://a.test", "http://b.test"]);
        assert!(!cors.allows_any());

        let cors = CorsConfig { allowed_origins: "*".to_string() };
        assert!(cors.allows_any());
    }
}
