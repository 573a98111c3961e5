use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    // Channel errors
    #[error("Channel misconfigured: {channel}: {message}")]
    Configuration { channel: String, message: String },

    #[error("Delivery failed: {channel}: {message}")]
    Delivery { channel: String, message: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    pub fn configuration(channel: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            channel: channel.to_string(),
            message: message.into(),
        }
    }

    pub fn delivery(channel: &str, message: impl Into<String>) -> Self {
        Self::Delivery {
            channel: channel.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
