use thiserror::Error;

/// Failure handing a dispatch batch to the external sender.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("No forwarding webhook URL is configured")]
    NotConfigured,

    #[error("Forward request failed: {0}")]
    Request(String),

    #[error("Sender responded with HTTP {status}")]
    Status { status: u16 },

    #[error("Forward queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("Forward queue is closed")]
    QueueClosed,

    #[error("Failed to build forward client: {0}")]
    Client(String),
}

impl ForwardError {
    /// Transport failures, throttling and server errors are worth another attempt
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Status { status } => *status == 429 || *status >= 500,
            Self::NotConfigured | Self::QueueFull { .. } | Self::QueueClosed | Self::Client(_) => {
                false
            }
        }
    }
}

impl From<reqwest::Error> for ForwardError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
            },
            None => Self::Request(err.to_string()),
        }
    }
}
