//! Error types shared across cardwright crates.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for cardwright operations
#[derive(Debug, Error, Diagnostic)]
pub enum CardwrightError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Media(#[from] MediaError),
}

/// Template catalog errors.
///
/// The `Display` output of the user-facing variants is shown in the UI
/// as is.
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("Не удалось загрузить {category} (статус {status})")]
    #[diagnostic(code(catalog::status))]
    Status { category: String, status: u16 },

    #[error("Некорректный ответ для категории {category}")]
    #[diagnostic(
        code(catalog::payload),
        help("the catalog must answer with result \"ok\" and an array in data")
    )]
    InvalidPayload { category: String },

    #[error("Не удалось загрузить каталог: {message}")]
    #[diagnostic(code(catalog::request))]
    Request {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid catalog url {url}: {message}")]
    #[diagnostic(code(catalog::url))]
    Url { url: String, message: String },
}

/// Configuration errors
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    #[diagnostic(code(config::env))]
    InvalidEnv { var: &'static str, value: String },

    #[error("failed to parse url {url}: {message}")]
    #[diagnostic(code(config::url))]
    UrlParse { url: String, message: String },

    #[error("unsupported config file format: {path}")]
    #[diagnostic(code(config::format), help("only .json config files are supported"))]
    UnsupportedFormat { path: String },

    #[error("failed to read config file {path}")]
    #[diagnostic(code(config::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    #[diagnostic(code(config::parse))]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Remote media (image) errors
#[derive(Debug, Error, Diagnostic)]
pub enum MediaError {
    #[error("failed to load {url}")]
    #[diagnostic(code(media::request))]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to load {url} ({status})")]
    #[diagnostic(code(media::status))]
    Status { url: String, status: u16 },

    #[error("empty response body for {url}")]
    #[diagnostic(code(media::empty))]
    Empty { url: String },
}
