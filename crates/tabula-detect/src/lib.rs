//! Runtime board-variant detection and configuration.
//!
//! Tablet-formfactor boards ship with one of several touchscreen
//! controllers sharing one bus address space, and the board's description
//! does not say which. This crate finds out at boot time and turns the
//! answer into a committed hardware description, before the real
//! controller driver binds:
//!
//! 1. **Probe** — each supported candidate controller is fingerprinted at
//!    its fixed bus address with a minimal byte exchange
//!    ([`candidates`]), in a fixed priority order ([`orchestrator`]),
//!    under up to two power states — GPIO line only, then GPIO plus the
//!    power rail ([`power`]). A stuck bus aborts the whole pass; a silent
//!    address just moves probing along.
//! 2. **Resolve** — the detected sub-model selects a variant profile of
//!    geometry, orientation and firmware ([`variant`]), over which
//!    operator overrides are merged field by field ([`config`]).
//! 3. **Commit** — the result becomes one atomic change set against the
//!    persisted description node ([`overlay`]), applied exactly once.
//!
//! [`HardwareManager`] drives the whole pass; collaborators (bus, power,
//! description store) come from `tabula-hal`, so the engine runs
//! identically against real hardware and the mock board.
//!
//! Not finding any controller is not an error: the pass returns
//! `Ok(None)` and leaves the description alone.
//!
//! # Examples
//!
//! ```
//! use tabula_detect::{ExplicitOverrides, HardwareManager};
//! use tabula_hal::mock::MockBoard;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), tabula_detect::DetectError> {
//!     let board = MockBoard::new();
//!     board.fit_silead(0xa082_0000, false);
//!
//!     let overrides = ExplicitOverrides::default().with_width(800);
//!     let mut manager =
//!         HardwareManager::new(board.bus(), board.power(), board.store(), overrides);
//!
//!     if let Some(applied) = manager.configure_touchscreen().await? {
//!         assert_eq!(applied.resolved.width, 800);
//!     }
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod candidates;
pub mod config;
pub mod error;
pub mod manager;
pub mod orchestrator;
pub mod overlay;
pub mod power;
pub mod variant;

// Re-export the types one needs to run a configuration pass.
pub use candidates::{
    CANDIDATES, CandidateDescriptor, CandidateKind, DetectedDevice, ProbeVerdict, SubModel,
};
pub use config::{ExplicitOverrides, ResolvedConfig, merge};
pub use error::{DetectError, Result};
pub use manager::{AppliedConfig, HardwareManager};
pub use overlay::TOUCHSCREEN_NODE;
pub use variant::VariantDefaults;
