//! Scoped acquisition of the shared bus adapter.

use crate::error::{DetectError, Result};
use std::ops::{Deref, DerefMut};
use tabula_hal::BusAdapter;

/// Guard binding the bus adapter's working context to one description
/// node for the duration of a probe pass.
///
/// The probed device has no bound driver yet, so the probing logic
/// borrows the caller's context; the guard restores the prior context on
/// drop, which makes the attach/detach pair leak-free on every early
/// return, including probe failures and bus faults.
#[derive(Debug)]
pub struct BusClaim<'a, B: BusAdapter> {
    bus: &'a mut B,
}

impl<'a, B: BusAdapter> BusClaim<'a, B> {
    /// Attach the adapter to the named node.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::ResourceUnavailable`] if the adapter cannot
    /// be bound (missing node fragment, adapter busy elsewhere).
    pub async fn attach(bus: &'a mut B, node: &str) -> Result<Self> {
        bus.attach(node)
            .await
            .map_err(|err| DetectError::resource_unavailable(format!("bus adapter: {err}")))?;
        Ok(Self { bus })
    }
}

impl<B: BusAdapter> Deref for BusClaim<'_, B> {
    type Target = B;

    fn deref(&self) -> &B {
        self.bus
    }
}

impl<B: BusAdapter> DerefMut for BusClaim<'_, B> {
    fn deref_mut(&mut self) -> &mut B {
        self.bus
    }
}

impl<B: BusAdapter> Drop for BusClaim<'_, B> {
    fn drop(&mut self) {
        self.bus.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_hal::mock::MockBoard;

    #[tokio::test]
    async fn test_claim_detaches_on_drop() {
        let board = MockBoard::new();
        let mut bus = board.bus();

        {
            let _claim = BusClaim::attach(&mut bus, "touchscreen").await.unwrap();
            assert_eq!(board.attached_node().as_deref(), Some("touchscreen"));
        }

        assert_eq!(board.attached_node(), None);
        assert_eq!(board.attach_counts(), (1, 1));
    }

    #[tokio::test]
    async fn test_missing_node_is_resource_unavailable() {
        let board = MockBoard::new();
        board.remove_node("touchscreen");
        let mut bus = board.bus();

        let err = BusClaim::attach(&mut bus, "touchscreen").await.unwrap_err();
        assert!(matches!(err, DetectError::ResourceUnavailable { .. }));
        assert_eq!(board.attach_counts(), (0, 0));
    }

    #[tokio::test]
    async fn test_busy_adapter_is_resource_unavailable() {
        let board = MockBoard::new();
        let mut first = board.bus();
        let mut second = board.bus();

        let _claim = BusClaim::attach(&mut first, "touchscreen").await.unwrap();
        let err = BusClaim::attach(&mut second, "touchscreen")
            .await
            .unwrap_err();
        assert!(matches!(err, DetectError::ResourceUnavailable { .. }));
    }
}
