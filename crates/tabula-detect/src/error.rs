//! Error taxonomy for the detection-and-configuration engine.
//!
//! Not finding a device is deliberately *not* an error: detection returns
//! `Ok(None)` and the boot path stays silent. The variants here are the
//! conditions that must be visible to the caller.

use tabula_hal::HalError;

/// Result type alias for detection operations.
pub type Result<T> = std::result::Result<T, DetectError>;

/// Errors surfaced by a detection/configuration pass.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// The target description node does not exist. This is a board
    /// configuration defect, not a probing outcome.
    #[error("device description node '{node}' is missing")]
    NodeMissing { node: String },

    /// The bus transport reported a stuck-bus condition mid-probe. The
    /// pass was aborted; retry once dependencies have settled.
    #[error("bus fault while probing: {source}")]
    BusFault {
        #[source]
        source: HalError,
    },

    /// A rail, GPIO line or bus adapter could not be acquired. Resources
    /// acquired earlier in the same pass have already been released.
    #[error("required resource unavailable: {reason}")]
    ResourceUnavailable { reason: String },

    /// The final atomic description commit failed. Fatal for this device
    /// only; the rest of the boot sequence may continue.
    #[error("failed to commit device description changes: {source}")]
    CommitFailed {
        #[source]
        source: HalError,
    },
}

impl DetectError {
    /// Create a new missing-node error.
    pub fn node_missing(node: impl Into<String>) -> Self {
        Self::NodeMissing { node: node.into() }
    }

    /// Create a new bus-fault error from the transport error.
    pub fn bus_fault(source: HalError) -> Self {
        Self::BusFault { source }
    }

    /// Create a new resource-unavailable error.
    pub fn resource_unavailable(reason: impl Into<String>) -> Self {
        Self::ResourceUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a new commit-failure error.
    pub fn commit_failed(source: HalError) -> Self {
        Self::CommitFailed { source }
    }

    /// True for conditions worth retrying once the board's dependencies
    /// are ready (a stuck bus, a power subsystem that is not up yet).
    pub fn should_retry_later(&self) -> bool {
        matches!(
            self,
            Self::BusFault { .. } | Self::ResourceUnavailable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_classification() {
        assert!(DetectError::bus_fault(HalError::timeout("read")).should_retry_later());
        assert!(DetectError::resource_unavailable("rail busy").should_retry_later());
        assert!(!DetectError::node_missing("touchscreen").should_retry_later());
        assert!(!DetectError::commit_failed(HalError::other("boom")).should_retry_later());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            DetectError::node_missing("touchscreen").to_string(),
            "device description node 'touchscreen' is missing"
        );
        assert_eq!(
            DetectError::resource_unavailable("gpio busy").to_string(),
            "required resource unavailable: gpio busy"
        );
    }
}
