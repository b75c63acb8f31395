use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the template catalog API.
    pub api_base: Url,
    /// Catalog language, sent as `?lang=`.
    pub lang: String,
    /// Per-image fetch timeout while inlining images for export.
    pub image_timeout_ms: u64,
    /// Pixel density of exported PNGs.
    pub pixel_ratio: f64,
}

impl Config {
    /// Default catalog endpoint, served by the site the cards mirror.
    pub const DEFAULT_API_BASE: &'static str = "https://daggerheart.su/api";
    pub const DEFAULT_LANG: &'static str = "ru";
    pub const DEFAULT_IMAGE_TIMEOUT_MS: u64 = 8000;
    pub const DEFAULT_PIXEL_RATIO: f64 = 2.0;

    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// Optional env vars:
    /// - `CARDWRIGHT_API_BASE`: catalog base URL
    /// - `CARDWRIGHT_LANG`: catalog language
    /// - `CARDWRIGHT_IMAGE_TIMEOUT_MS`: per-image export fetch timeout
    /// - `CARDWRIGHT_PIXEL_RATIO`: export pixel density
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().merge_env(|var| std::env::var(var).ok())
    }

    /// Override fields from a variable lookup. Split out from
    /// [`Config::from_env`] so it can be driven without touching the process
    /// environment.
    pub fn merge_env(
        mut self,
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(base) = lookup("CARDWRIGHT_API_BASE") {
            self.api_base = Url::parse(&base).map_err(|e| ConfigError::UrlParse {
                url: base,
                message: e.to_string(),
            })?;
        }

        if let Some(lang) = lookup("CARDWRIGHT_LANG") {
            self.lang = lang;
        }

        if let Some(timeout) = lookup("CARDWRIGHT_IMAGE_TIMEOUT_MS") {
            self.image_timeout_ms = timeout.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "CARDWRIGHT_IMAGE_TIMEOUT_MS",
                value: timeout,
            })?;
        }

        if let Some(ratio) = lookup("CARDWRIGHT_PIXEL_RATIO") {
            self.pixel_ratio = ratio
                .parse()
                .ok()
                .filter(|r: &f64| *r > 0.0)
                .ok_or(ConfigError::InvalidEnv {
                    var: "CARDWRIGHT_PIXEL_RATIO",
                    value: ratio,
                })?;
        }

        Ok(self)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: Url::parse(Self::DEFAULT_API_BASE)
                .unwrap_or_else(|_| unreachable!("default api base is a valid url")),
            lang: Self::DEFAULT_LANG.to_string(),
            image_timeout_ms: Self::DEFAULT_IMAGE_TIMEOUT_MS,
            pixel_ratio: Self::DEFAULT_PIXEL_RATIO,
        }
    }
}

/// Reads and writes a [`Config`] as a JSON file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    ///
    /// Only `.json` files are supported.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_format(&self) -> Result<(), ConfigError> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(()),
            _ => Err(ConfigError::UnsupportedFormat {
                path: self.path.display().to_string(),
            }),
        }
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        self.check_format()?;
        let path = self.path.display().to_string();
        let contents = std::fs::read_to_string(&self.path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Like [`FileStore::load`], but a missing file yields the defaults.
    pub fn load_or_default(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            self.load()
        } else {
            tracing::debug!(path = %self.path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        self.check_format()?;
        let path = self.path.display().to_string();
        let contents = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
        }
        std::fs::write(&self.path, contents).map_err(|source| ConfigError::Io { path, source })
    }
}
