use thiserror::Error;

/// Result type for YNCA operations
pub type Result<T> = std::result::Result<T, YncaError>;

/// Errors that can occur when talking to a YNCA device
#[derive(Error, Debug)]
pub enum YncaError {
    /// The serial port or socket could not be opened
    #[error("Could not connect to {target}: {source}")]
    ConnectionFailed {
        /// Serial device path or `socket://` URL that failed
        target: String,
        #[source]
        source: std::io::Error,
    },

    /// `connect` was called on a connection that is already open
    #[error("Already connected")]
    AlreadyConnected,

    /// A command was issued while no link is open
    #[error("Not connected")]
    NotConnected,

    /// Connection was closed while waiting on it
    #[error("Connection closed")]
    ConnectionClosed,

    /// A subunit received no data at all while initializing
    #[error("Initialization of subunit {0} failed: no response from device")]
    InitializationFailed(String),

    /// A value was rejected before being sent to the device
    #[error("Invalid value for {function}: {reason}")]
    InvalidValue {
        /// Wire name of the function being written
        function: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The function can only be read
    #[error("Function {0} is not writable")]
    NotWritable(&'static str),
}

impl YncaError {
    pub(crate) fn invalid_value(function: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            function: function.into(),
            reason: reason.into(),
        }
    }
}
