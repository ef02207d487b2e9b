use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The production voting API.
pub const DEFAULT_API_URL: &str = "https://online-voting-br3j.onrender.com";

/// Optional configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "Univote.toml";

/// Prefix of environment variables that override the configuration file.
pub const ENV_PREFIX: &str = "UNIVOTE_";

/// Name of the file, inside the data directory, holding the session token.
pub const TOKEN_KEY: &str = "token";

/// Application configuration, derived from defaults, `Univote.toml` and
/// `UNIVOTE_*` environment variables, in increasing order of precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    api_url: String,
    data_dir: PathBuf,
    log_config: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: PathBuf::from(".univote"),
            log_config: PathBuf::from("log4rs.yaml"),
        }
    }
}

impl Config {
    /// The layered configuration sources.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and validate the configuration.
    pub fn load() -> Result<Self> {
        let config: Config = Self::figment().extract()?;
        config.validated()
    }

    /// Replace the API URL, e.g. from a command-line flag.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Result<Self> {
        self.api_url = api_url.into();
        self.validated()
    }

    fn validated(mut self) -> Result<Self> {
        let trimmed = self.api_url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(Error::Url(self.api_url));
        }
        self.api_url = trimmed.to_string();
        Ok(self)
    }

    /// Base URL of the voting API, without a trailing slash.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Directory for client-side persisted state.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Where the session token is persisted.
    pub fn token_path(&self) -> PathBuf {
        self.data_dir.join(TOKEN_KEY)
    }

    /// The log4rs configuration file.
    pub fn log_config(&self) -> &Path {
        &self.log_config
    }
}
