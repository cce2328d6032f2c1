use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Failed to open serial port '{port}': {source}")]
    Connect {
        port: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Already connected to '{port}'")]
    AlreadyConnected { port: String },

    #[error("Device is not connected")]
    NotConnected,

    #[error("No plate code to send")]
    EmptyPayload,

    #[error("Transport failure while writing {stage}: {source}")]
    Transport {
        stage: TransferStage,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

/// Point in the reset-then-payload stream where a transport write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStage {
    Reset,
    Payload { index: usize },
    Flush,
}

impl std::fmt::Display for TransferStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferStage::Reset => write!(f, "reset byte"),
            TransferStage::Payload { index } => write!(f, "payload byte {}", index),
            TransferStage::Flush => write!(f, "flush"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Connection,
    Usage,
    Data,
    Transport,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LinkError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LinkError::Connect { .. } => ErrorCategory::Connection,
            LinkError::AlreadyConnected { .. } | LinkError::NotConnected => ErrorCategory::Usage,
            LinkError::EmptyPayload | LinkError::SerializationError(_) => ErrorCategory::Data,
            LinkError::Transport { .. } => ErrorCategory::Transport,
            LinkError::ConfigValidationError { .. }
            | LinkError::InvalidConfigValueError { .. }
            | LinkError::MissingConfigError { .. } => ErrorCategory::Configuration,
            LinkError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Usage => ErrorSeverity::Low,
            ErrorCategory::Transport | ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Connection | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for the binaries; low-severity errors still exit 0.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    /// Errors a caller can reasonably resolve by reconnecting and resending.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LinkError::Connect { .. } | LinkError::Transport { .. }
        )
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LinkError::Connect { port, .. } => format!(
                "Check that '{}' exists, is not held by another program and that you may open it",
                port
            ),
            LinkError::AlreadyConnected { .. } => {
                "Disconnect the current device before connecting again".to_string()
            }
            LinkError::NotConnected => "Connect to the device before sending".to_string(),
            LinkError::EmptyPayload => {
                "Use a clearer image; no digits were recognized on the plate".to_string()
            }
            LinkError::Transport { .. } => {
                "The device may have been unplugged; reconnect and send again".to_string()
            }
            LinkError::IoError(_) => "Check file paths and permissions".to_string(),
            LinkError::SerializationError(_) => {
                "Detections must be a JSON array or one JSON object per line".to_string()
            }
            LinkError::ConfigValidationError { field, .. }
            | LinkError::InvalidConfigValueError { field, .. }
            | LinkError::MissingConfigError { field } => {
                format!("Fix the '{}' setting and try again", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LinkError::Connect { port, .. } => format!("Could not connect to {}", port),
            LinkError::AlreadyConnected { port } => format!("Already connected to {}", port),
            LinkError::NotConnected => "Please connect the device first".to_string(),
            LinkError::EmptyPayload => "No data to send".to_string(),
            LinkError::Transport { .. } => "Connection lost, could not send data".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;
