//! Collaborator trait definitions.
//!
//! These traits are the seam between the detection engine and the board it
//! runs on: the shared bus adapter, the power/GPIO subsystem, and the
//! persisted device-description store. Real drivers and the in-memory
//! [`mock`](crate::mock) board both implement them, so the engine can be
//! exercised end to end without hardware.
//!
//! All traits use native `async fn` methods (Edition 2024 RPITIT). They are
//! not object-safe; consumers are expected to stay generic over them.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{ChangeSet, GpioHandle, GpioLevel, RailHandle};

/// Shared bus adapter with addressed byte-exchange primitives.
///
/// The adapter carries a *working context*: before probing, the caller
/// attaches the adapter to the description node of the device being
/// probed (the device has no bound driver yet, so it borrows the caller's
/// context), and detaches when the probe pass is over. `detach` is
/// synchronous by contract so callers can restore the context from a drop
/// guard.
///
/// Transfer results follow one rule: a short transfer is `Ok` with a short
/// buffer, a missing device is [`HalError::Nak`](crate::HalError::Nak),
/// and only [`HalError::Timeout`](crate::HalError::Timeout) means the bus
/// itself is stuck.
pub trait BusAdapter: Send + Sync {
    /// Bind the adapter's working context to the named description node.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist or the adapter is
    /// already attached elsewhere.
    async fn attach(&mut self, node: &str) -> Result<()>;

    /// Restore the context that was active before [`attach`](Self::attach).
    ///
    /// Detaching an adapter that is not attached is a no-op.
    fn detach(&mut self);

    /// Read `len` bytes from a device register.
    ///
    /// # Errors
    ///
    /// Returns [`HalError::Timeout`](crate::HalError::Timeout) if the bus
    /// is stuck, [`HalError::Nak`](crate::HalError::Nak) if nothing
    /// acknowledges at `addr`.
    async fn read_block(&mut self, addr: u16, register: u8, len: usize) -> Result<Vec<u8>>;

    /// Write raw bytes to the device at `addr`, returning the number of
    /// bytes accepted.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`read_block`](Self::read_block).
    async fn send(&mut self, addr: u16, bytes: &[u8]) -> Result<usize>;

    /// Read up to `len` raw bytes from the device at `addr`.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`read_block`](Self::read_block).
    async fn recv(&mut self, addr: u16, len: usize) -> Result<Vec<u8>>;
}

/// Power rail and GPIO line subsystem.
///
/// Acquisition returns `Ok(None)` when the board simply is not wired with
/// the requested rail or line; an `Err` means the subsystem itself is not
/// ready and the caller should come back later. Release is synchronous and
/// consumes the handle, so each acquisition is released at most once.
pub trait PowerController: Send + Sync {
    /// Acquire the named power rail, if the board has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the power subsystem is not ready.
    async fn acquire_rail(&mut self, name: &str) -> Result<Option<RailHandle>>;

    /// Enable a previously acquired rail.
    ///
    /// # Errors
    ///
    /// Returns an error if the rail cannot be brought up.
    async fn enable_rail(&mut self, rail: &RailHandle) -> Result<()>;

    /// Disable a previously acquired rail.
    ///
    /// # Errors
    ///
    /// Returns an error if the rail cannot be brought down.
    async fn disable_rail(&mut self, rail: &RailHandle) -> Result<()>;

    /// Release a rail acquired with [`acquire_rail`](Self::acquire_rail).
    fn release_rail(&mut self, rail: RailHandle);

    /// Acquire the named GPIO line, if the board has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the GPIO subsystem is not ready.
    async fn acquire_gpio(&mut self, name: &str) -> Result<Option<GpioHandle>>;

    /// Drive an acquired GPIO line to the given level.
    ///
    /// # Errors
    ///
    /// Returns an error if the line cannot be driven.
    async fn set_gpio(&mut self, gpio: &GpioHandle, level: GpioLevel) -> Result<()>;

    /// Release a line acquired with [`acquire_gpio`](Self::acquire_gpio).
    fn release_gpio(&mut self, gpio: GpioHandle);
}

/// Persisted device-description store.
///
/// The store applies a [`ChangeSet`] atomically: a failed commit leaves
/// the description exactly as it was, and no partially applied state is
/// ever observable.
pub trait DescriptionStore: Send + Sync {
    /// True if the named node exists in the description.
    fn node_exists(&self, node: &str) -> bool;

    /// True if the named node carries the given property.
    fn has_property(&self, node: &str, key: &str) -> bool;

    /// Apply a change set atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if any operation cannot be applied; in that case
    /// none of them are.
    async fn commit(&mut self, changeset: ChangeSet) -> Result<()>;
}
