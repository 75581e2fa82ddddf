//! Library error type.
//!
//! Only recording, summary, and configuration problems surface as errors.
//! A diagnostic command that fails or prints something unexpected is not an
//! error; it simply leaves the affected sample fields absent.

/// Errors produced by linkmon-core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Chart rendering error: {0}")]
    Chart(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    pub(crate) fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Error::InvalidConfig(msg.into())
    }

    #[cfg_attr(not(feature = "charts"), allow(dead_code))]
    pub(crate) fn chart<S: Into<String>>(msg: S) -> Self {
        Error::Chart(msg.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
