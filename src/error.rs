use thiserror::Error;

/// Result type for PowerView operations
pub type Result<T> = std::result::Result<T, PowerViewError>;

/// Errors that can occur when talking to a PowerView hub
#[derive(Error, Debug)]
pub enum PowerViewError {
    /// Request exceeded the configured deadline
    #[error("Request timeout")]
    Timeout,

    /// Hub answered with a status other than 200
    #[error("powerview hub: {status}")]
    Hub {
        /// Status line text, e.g. `404 Not Found`
        status: String,
    },

    /// Response body was not the expected JSON shape, or a name was not valid Base64
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Operation on a named entity that the snapshot does not contain
    #[error("nil {kind}: no {kind} named {name:?}")]
    NilEntity {
        /// Entity kind ("scene", "room", "shade")
        kind: &'static str,
        /// Name that was looked up
        name: String,
    },

    /// I/O error on the hub connection
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Hub sent something that is not a well-formed HTTP response
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl PowerViewError {
    pub(crate) fn nil_entity(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NilEntity {
            kind,
            name: name.into(),
        }
    }
}
