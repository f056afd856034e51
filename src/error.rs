//! Error types and handling for `AtollTravel`

use thiserror::Error;

/// Main error type for the `AtollTravel` library
#[derive(Error, Debug)]
pub enum TravelError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Backend or geocoding API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Client-side request budget exhausted
    #[error("Rate limit exceeded, retry in {wait_seconds}s")]
    RateLimited { wait_seconds: u64 },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Persistent store errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl TravelError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Short text suitable for a transient notification
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            TravelError::Api { .. } => {
                "Unable to reach the booking service. Please check your connection and retry."
                    .to_string()
            }
            TravelError::RateLimited { wait_seconds } => {
                format!("Too many requests. Please wait {wait_seconds} seconds and retry.")
            }
            TravelError::Validation { message } => format!("Invalid input: {message}"),
            TravelError::Storage { .. } => {
                "Saved preferences could not be accessed. Defaults are in use.".to_string()
            }
            TravelError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for TravelError {
    fn from(err: reqwest::Error) -> Self {
        TravelError::api(err.to_string())
    }
}

impl From<fjall::Error> for TravelError {
    fn from(err: fjall::Error) -> Self {
        TravelError::storage(err.to_string())
    }
}

impl From<postcard::Error> for TravelError {
    fn from(err: postcard::Error) -> Self {
        TravelError::storage(format!("corrupt entry: {err}"))
    }
}
