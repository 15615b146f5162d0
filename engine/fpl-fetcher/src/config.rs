use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Configuration for the FPL HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FplConfig {
    /// API root, without a trailing slash
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Upper bound on standings pages followed for one league
    pub max_pages: u32,
}

impl Default for FplConfig {
    fn default() -> Self {
        Self {
            base_url: "https://fantasy.premierleague.com/api".to_string(),
            timeout_secs: 30,
            user_agent: format!("lps-fpl-fetcher/{}", env!("CARGO_PKG_VERSION")),
            max_pages: 200,
        }
    }
}

impl FplConfig {
    /// Load defaults, then an optional `fpl.toml`, then `FPL__*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let config: Self = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Self::default())?)
            .add_source(::config::File::with_name("fpl").required(false))
            .add_source(::config::Environment::with_prefix("FPL").separator("__").try_parsing(true))
            .build()
            .context("Failed to build FPL configuration")?
            .try_deserialize()
            .context("Failed to parse FPL configuration")?;

        if config.max_pages == 0 {
            anyhow::bail!("FPL max_pages must be at least 1");
        }
        Ok(config)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}
