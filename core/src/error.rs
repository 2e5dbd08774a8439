//! Crate error handling

pub use std::result::Result;
use thiserror::Error as ThisError;

/// Error enum that rolls-up all error messages in this crate
#[derive(Debug, ThisError)]
pub enum Error {
    /// Missing or malformed coordinate, token, pattern or reserved entry.
    /// Always raised before any request is sent to the vault server.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The vault server could not be reached, or answered with something
    /// other than a well-formed 200 response.
    #[error("Protocol failure: {0}")]
    Protocol(String),

    /// The integrity digest stored in a property set does not match its
    /// coordinates.
    #[error("Tamper detected: {0}")]
    Tamper(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    IOError(std::io::Error),
}

impl Error {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, Error::Protocol(_))
    }

    pub fn is_tamper(&self) -> bool {
        matches!(self, Error::Tamper(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::IOError(e)
    }
}

impl From<regex::Error> for Error {
    fn from(e: regex::Error) -> Error {
        Error::Configuration(format!("invalid key pattern: {}", e))
    }
}
