//! Error types for the crate.
//!
//! Everything that can fail in this crate returns [`ScpiError`]. Each variant maps to
//! exactly one [`ErrorKind`] so callers can branch on the category without matching
//! message text:
//!
//! - **`Connection`** / **`Timeout`**: transport failures. The only retry-safe kinds.
//!   Both carry the `host:port` endpoint and, when one was in flight, the command.
//! - **`Command`**: the bytes came back but did not make sense. Block-framing failures
//!   ([`BlockError`]), errors reported by the instrument through `SYST:ERR?`, and
//!   responses that could not be parsed all land here.
//! - **`UnknownCommand`** / **`MissingParameter`** / **`InvalidParameter`**: contract
//!   errors. The call itself is wrong and retrying will not help.
//! - **`Configuration`**: bad resource strings, config files, or a transport that was
//!   not compiled in.
//! - **`Io`**: local I/O outside of an instrument exchange, such as waveform export.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type Result<T> = std::result::Result<T, ScpiError>;

/// Machine-checkable category of a [`ScpiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Refused, unreachable, or not-connected transport.
    Connection,
    /// No response within the configured timeout.
    Timeout,
    /// Malformed response, block framing failure, or device-reported error.
    Command,
    /// Operation name absent from every table for the variant.
    UnknownCommand,
    /// Template placeholder without a value.
    MissingParameter,
    /// Value outside the instrument's limits or otherwise rejected before sending.
    InvalidParameter,
    /// Bad configuration or resource string.
    Configuration,
    /// Local I/O failure.
    Io,
}

impl ErrorKind {
    /// Stable lowercase tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Command => "command",
            ErrorKind::UnknownCommand => "unknown_command",
            ErrorKind::MissingParameter => "missing_parameter",
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures while framing an IEEE-488.2 definite-length block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    /// No `#` in the response.
    #[error("no block-length marker")]
    MissingMarker,

    /// `#0` indefinite-length blocks are not supported.
    #[error("length digit must be positive")]
    ZeroLengthDigit,

    /// The character after `#` is not a digit.
    #[error("non-numeric length digit")]
    NonNumericLengthDigit,

    /// Fewer length digits than announced.
    #[error("truncated length field")]
    TruncatedLengthField,

    /// The length field contains a non-digit.
    #[error("non-numeric length field")]
    NonNumericLengthField,

    /// The block is shorter than its declared length.
    #[error("declared data length exceeds available data (declared {declared}, available {available})")]
    LengthExceedsData {
        /// Length from the header.
        declared: usize,
        /// Bytes actually present.
        available: usize,
    },

    /// 16-bit samples need an even byte count.
    #[error("WORD data length must be even (got {0} bytes)")]
    OddWordLength(usize),
}

/// The crate-wide error type.
#[derive(Debug, Error)]
pub enum ScpiError {
    /// Link-level failure: refused, reset, closed or not connected.
    #[error("connection error on {endpoint}{}: {message}", in_flight(.command))]
    Connection {
        /// `host:port` or device path.
        endpoint: String,
        /// Command in flight, if any.
        command: Option<String>,
        /// Underlying cause.
        message: String,
    },

    /// No complete response within the timeout.
    #[error("timeout after {} ms on {endpoint}{}", .timeout.as_millis(), in_flight(.command))]
    Timeout {
        /// `host:port` or device path.
        endpoint: String,
        /// Command in flight, if any.
        command: Option<String>,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// Malformed binary block.
    #[error("block decode failed: {0}")]
    Block(#[from] BlockError),

    /// Nonzero entry from the instrument error queue.
    #[error("instrument reported error {code}: {message}")]
    Device {
        /// Error number.
        code: i32,
        /// Error text.
        message: String,
    },

    /// A response that does not parse as the expected quantity.
    #[error("could not parse {quantity} from response '{response}'")]
    Response {
        /// What was being parsed.
        quantity: &'static str,
        /// The raw response.
        response: String,
    },

    /// The instrument rejected or misunderstood a command.
    #[error("command error: {0}")]
    Command(String),

    /// No template for the operation in this dialect.
    #[error("unknown command '{operation}' for variant '{variant}'")]
    UnknownCommand {
        /// Requested operation.
        operation: String,
        /// Dialect searched.
        variant: String,
    },

    /// A template placeholder had no value.
    #[error("missing required parameter '{key}' for command '{operation}'")]
    MissingParameter {
        /// Operation being rendered.
        operation: String,
        /// Missing placeholder.
        key: String,
    },

    /// A value outside the channel or protocol limits.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Bad settings or resource string.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Functionality compiled out by a cargo feature.
    #[error("Feature '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(String),

    /// Local I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Waveform export failure.
    #[error("Export error: {0}")]
    Export(String),
}

fn in_flight(command: &Option<String>) -> String {
    match command {
        Some(cmd) => format!(" (command '{}')", cmd.trim_end()),
        None => String::new(),
    }
}

impl ScpiError {
    /// Category tag for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScpiError::Connection { .. } => ErrorKind::Connection,
            ScpiError::Timeout { .. } => ErrorKind::Timeout,
            ScpiError::Block(_)
            | ScpiError::Device { .. }
            | ScpiError::Response { .. }
            | ScpiError::Command(_) => ErrorKind::Command,
            ScpiError::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            ScpiError::MissingParameter { .. } => ErrorKind::MissingParameter,
            ScpiError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            ScpiError::Configuration(_) | ScpiError::FeatureNotEnabled(_) => {
                ErrorKind::Configuration
            }
            ScpiError::Io(_) | ScpiError::Export(_) => ErrorKind::Io,
        }
    }

    /// True for transport failures where repeating the exchange may succeed.
    pub fn is_retry_safe(&self) -> bool {
        matches!(self.kind(), ErrorKind::Connection | ErrorKind::Timeout)
    }

    pub(crate) fn not_connected(endpoint: &str, command: Option<&str>) -> Self {
        ScpiError::Connection {
            endpoint: endpoint.to_string(),
            command: command.map(str::to_string),
            message: "not connected".to_string(),
        }
    }
}

impl From<figment::Error> for ScpiError {
    fn from(err: figment::Error) -> Self {
        ScpiError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_names_endpoint_and_command() {
        let err = ScpiError::Connection {
            endpoint: "192.168.1.100:5024".into(),
            command: Some("*IDN?\n".into()),
            message: "broken pipe".into(),
        };
        let text = err.to_string();
        assert!(text.contains("192.168.1.100:5024"));
        assert!(text.contains("'*IDN?'"));
        assert!(text.contains("broken pipe"));
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(err.is_retry_safe());
    }

    #[test]
    fn timeout_error_mentions_timeout() {
        let err = ScpiError::Timeout {
            endpoint: "10.0.0.2:5025".into(),
            command: Some("READ?".into()),
            timeout: Duration::from_millis(1500),
        };
        let text = err.to_string();
        assert!(text.contains("timeout"));
        assert!(text.contains("1500 ms"));
        assert!(text.contains("10.0.0.2:5025"));
        assert!(text.contains("READ?"));
        assert!(err.is_retry_safe());
    }

    #[test]
    fn connect_errors_omit_command_suffix() {
        let err = ScpiError::Connection {
            endpoint: "host:1".into(),
            command: None,
            message: "refused".into(),
        };
        assert_eq!(err.to_string(), "connection error on host:1: refused");
    }

    #[test]
    fn block_errors_are_command_kind() {
        let err: ScpiError = BlockError::ZeroLengthDigit.into();
        assert_eq!(err.kind(), ErrorKind::Command);
        assert!(!err.is_retry_safe());
        assert!(err.to_string().contains("length digit must be positive"));
    }

    #[test]
    fn contract_errors_are_not_retry_safe() {
        let unknown = ScpiError::UnknownCommand {
            operation: "warp".into(),
            variant: "generic".into(),
        };
        let missing = ScpiError::MissingParameter {
            operation: "set_voltage".into(),
            key: "voltage".into(),
        };
        let invalid = ScpiError::InvalidParameter("frequency 1e9 Hz above 3e7 Hz".into());

        assert_eq!(unknown.kind(), ErrorKind::UnknownCommand);
        assert_eq!(missing.kind(), ErrorKind::MissingParameter);
        assert_eq!(invalid.kind(), ErrorKind::InvalidParameter);
        assert!(missing.to_string().contains("'voltage'"));
        assert!(missing.to_string().contains("'set_voltage'"));
        for err in [unknown, missing, invalid] {
            assert!(!err.is_retry_safe());
        }
    }

    #[test]
    fn feature_errors_are_configuration_kind() {
        let err = ScpiError::FeatureNotEnabled("instrument_serial".into());
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.to_string().contains("--features instrument_serial"));
    }

    #[test]
    fn kind_tags_are_stable() {
        assert_eq!(ErrorKind::UnknownCommand.as_str(), "unknown_command");
        assert_eq!(ErrorKind::Timeout.to_string(), "timeout");
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScpiError>();
    }
}
