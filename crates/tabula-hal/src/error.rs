//! Error types for hardware collaborator operations.
//!
//! The one distinction that matters to callers probing a shared bus is
//! timeout versus everything else: a [`HalError::Timeout`] means the bus
//! itself is stuck and further probing is pointless, while every other
//! failure only says the addressed endpoint did not cooperate.

/// Result type alias for HAL operations.
pub type Result<T> = std::result::Result<T, HalError>;

/// Errors reported by the bus, power, and description-store collaborators.
#[derive(Debug, thiserror::Error)]
pub enum HalError {
    /// A named resource (node, rail, GPIO line) does not exist.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// A resource exists but is held by someone else.
    #[error("busy: {what}")]
    Busy { what: String },

    /// The transport timed out. This is the only error that signals a
    /// stuck bus rather than an uncooperative device.
    #[error("timeout during {operation}")]
    Timeout { operation: String },

    /// The addressed endpoint did not acknowledge.
    #[error("no acknowledge from address {addr:#04x}")]
    Nak { addr: u16 },

    /// A bus operation was attempted without an attached node context.
    #[error("bus adapter is not attached to a node")]
    NotAttached,

    /// Generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

impl HalError {
    /// Create a new not-found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a new busy error.
    pub fn busy(what: impl Into<String>) -> Self {
        Self::Busy { what: what.into() }
    }

    /// Create a new timeout error.
    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::Timeout {
            operation: operation.into(),
        }
    }

    /// Create a new no-acknowledge error for the given bus address.
    pub fn nak(addr: u16) -> Self {
        Self::Nak { addr }
    }

    /// Create a generic error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// True if this error signals a stuck bus rather than a missing or
    /// uncooperative device.
    pub fn is_bus_fault(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
