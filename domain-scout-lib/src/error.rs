//! Error handling for domain probing.
//!
//! Only setup can fail with these errors: loading word lists, parsing
//! configuration, building the HTTP client. A single lookup never returns
//! an error; its failures are folded into an `Unknown` lookup result.

use std::fmt;

/// Main error type for the library.
#[derive(Debug, Clone)]
pub enum DomainScoutError {
    /// The TLD has no entry in the registry
    UnsupportedTld { tld: String },

    /// Invalid domain or label
    InvalidDomain { domain: String, reason: String },

    /// Network-related errors while setting up clients
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// Malformed JSON or TOML content
    ParseError {
        message: String,
        content: Option<String>,
    },

    /// Configuration errors (invalid settings, conflicting registry entries)
    ConfigError { message: String },

    /// File I/O errors when reading word lists or config files
    FileError { path: String, message: String },
}

impl DomainScoutError {
    /// Create a new unsupported TLD error.
    pub fn unsupported_tld<T: Into<String>>(tld: T) -> Self {
        Self::UnsupportedTld { tld: tld.into() }
    }

    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new parse error.
    pub fn parse<M: Into<String>>(message: M) -> Self {
        Self::ParseError {
            message: message.into(),
            content: None,
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for DomainScoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedTld { tld } => write!(f, "unsupported TLD '{}'", tld),
            Self::InvalidDomain { domain, reason } => {
                write!(f, "Invalid domain '{}': {}", domain, reason)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::ParseError { message, .. } => write!(f, "Parse error: {}", message),
            Self::ConfigError { message } => write!(f, "Configuration error: {}", message),
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for DomainScoutError {}

impl From<reqwest::Error> for DomainScoutError {
    fn from(err: reqwest::Error) -> Self {
        Self::network_with_source("HTTP client error", err.to_string())
    }
}

impl From<serde_json::Error> for DomainScoutError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse(format!("JSON parsing failed: {}", err))
    }
}

impl From<toml::de::Error> for DomainScoutError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}
