use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub quoting: QuotingConfig,
    pub rates: RatesConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_event_capacity() -> usize { 100 }

#[derive(Debug, Deserialize, Clone)]
pub struct QuotingConfig {
    /// ISO code of the currency quotes are sold in
    #[serde(default = "default_local_currency")]
    pub local_currency: String,
    #[serde(default = "default_display_decimals")]
    pub display_decimals: u32,
}

fn default_local_currency() -> String { "CLP".to_string() }
fn default_display_decimals() -> u32 { 2 }

impl Default for QuotingConfig {
    fn default() -> Self {
        Self {
            local_currency: default_local_currency(),
            display_decimals: default_display_decimals(),
        }
    }
}

/// Fallback rates served when no market feed is wired in.
#[derive(Debug, Deserialize, Clone)]
pub struct RatesConfig {
    pub eur_usd: f64,
    pub usd_local: f64,
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: u64,
}

fn default_cache_ttl() -> u64 { 900 }

/// Location of the JSON seed document (boundary defaults, override scopes, products).
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SeedConfig {
    pub path: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // per-environment and local files are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. LANDED__SERVER__PORT=9000
            .add_source(config::Environment::with_prefix("LANDED").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Parse a single TOML document with no environment layering.
    pub fn from_toml(contents: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
