//! Hardware abstraction layer for the tabula board-detection engine.
//!
//! This crate defines the collaborator interfaces the detection engine
//! talks to — the shared bus adapter, the power rail / GPIO subsystem and
//! the persisted device-description store — together with the shared types
//! they exchange and an in-memory mock board implementing all of them.
//!
//! # Design Philosophy
//!
//! - **Async-first**: collaborator I/O uses native `async fn` in traits
//!   (Edition 2024 RPITIT); resource *release* operations are synchronous
//!   so they can run from drop guards.
//! - **Fault taxonomy over the bus**: a transfer that times out means the
//!   bus is stuck; everything else (NAK, short transfer, wrong bytes) only
//!   means the addressed device did not cooperate. The engine relies on
//!   this distinction to tell "device absent" from "bus broken".
//! - **Atomic description edits**: a [`ChangeSet`] is applied in full or
//!   not at all; partial application is never observable.
//!
//! # Mock board
//!
//! [`mock::MockBoard`] simulates a complete board for tests and the
//! emulator: fit peripheral simulations at their bus addresses, script
//! power wiring and fault injection, and inspect counters afterwards.
//!
//! ```
//! use tabula_hal::mock::MockBoard;
//! use tabula_hal::traits::DescriptionStore;
//!
//! let board = MockBoard::new();
//! board.fit_silead(0xa082_0000, false);
//! assert!(board.store().node_exists("touchscreen"));
//! ```

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HalError, Result};
pub use traits::{BusAdapter, DescriptionStore, PowerController};
pub use types::{ChangeSet, GpioHandle, GpioLevel, PropertyOp, PropertyValue, RailHandle};
