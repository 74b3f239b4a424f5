//! Server configuration from flags and `NOTEKEEPER_*` environment variables.

use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::Duration;
use clap::{Args, Parser};
use notekeeper_core::search::SearchWeights;

use crate::services::RateLimitConfig;

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "NOTEKEEPER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port for HTTP API
    #[arg(short, long, env = "NOTEKEEPER_PORT", default_value = "3000")]
    pub port: u16,

    /// SQLite database file (defaults to the platform data directory)
    #[arg(long, env = "NOTEKEEPER_DATABASE")]
    pub database: Option<PathBuf>,

    /// Shared secret expected in the `x-api-key` header
    #[arg(long, env = "NOTEKEEPER_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Note creations allowed per key per window
    #[arg(long, env = "NOTEKEEPER_RATE_LIMIT", default_value = "5")]
    pub rate_limit: u32,

    /// Rate limit window length in seconds
    #[arg(long, env = "NOTEKEEPER_RATE_WINDOW_SECS", default_value = "60")]
    pub rate_window_secs: i64,

    /// How long search results stay cached, in seconds
    #[arg(long, env = "NOTEKEEPER_CACHE_TTL_SECS", default_value = "60")]
    pub cache_ttl_secs: i64,

    #[arg(long, env = "NOTEKEEPER_TITLE_WEIGHT", default_value = "3.0")]
    pub title_weight: f64,

    #[arg(long, env = "NOTEKEEPER_CONTENT_WEIGHT", default_value = "2.0")]
    pub content_weight: f64,

    #[arg(long, env = "NOTEKEEPER_POSITION_WEIGHT", default_value = "1.0")]
    pub position_weight: f64,
}

/// `ServeArgs` as a standalone command line, for running without a subcommand.
#[derive(Parser)]
#[command(name = "notekeeper")]
struct ServeCommand {
    #[command(flatten)]
    serve: ServeArgs,
}

/// Settings for the request-handling services, independent of how the
/// server is bound.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_key: String,
    pub rate_limit: RateLimitConfig,
    pub cache_ttl: Duration,
    pub weights: SearchWeights,
}

impl ServiceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            rate_limit: RateLimitConfig::default(),
            cache_ttl: Duration::seconds(60),
            weights: SearchWeights::default(),
        }
    }
}

impl ServeArgs {
    /// Builds the serve settings from `NOTEKEEPER_*` variables and defaults
    /// alone.
    pub fn from_env() -> Result<Self, clap::Error> {
        Self::try_parse_from(["notekeeper"])
    }

    fn try_parse_from<I, T>(argv: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        ServeCommand::try_parse_from(argv).map(|cmd| cmd.serve)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn service_config(&self) -> Result<ServiceConfig> {
        if self.api_key.trim().is_empty() {
            bail!("API key must not be empty");
        }
        if self.rate_limit == 0 {
            bail!("--rate-limit must be at least 1");
        }
        if self.rate_window_secs <= 0 {
            bail!("--rate-window-secs must be positive");
        }
        if self.cache_ttl_secs <= 0 {
            bail!("--cache-ttl-secs must be positive");
        }
        let weights = [self.title_weight, self.content_weight, self.position_weight];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            bail!("search weights must be finite and non-negative");
        }
        if self.title_weight < self.content_weight + self.position_weight {
            tracing::warn!(
                "Title weight {} is below content + position weight; content-only matches may outrank title matches",
                self.title_weight
            );
        }

        Ok(ServiceConfig {
            api_key: self.api_key.clone(),
            rate_limit: RateLimitConfig {
                max_requests: self.rate_limit,
                window: Duration::seconds(self.rate_window_secs),
            },
            cache_ttl: Duration::seconds(self.cache_ttl_secs),
            weights: SearchWeights {
                title: self.title_weight,
                content: self.content_weight,
                position: self.position_weight,
            },
        })
    }
}
