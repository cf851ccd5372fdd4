//! Shared helpers for the integration tests.

use tabula_detect::{ExplicitOverrides, HardwareManager};
use tabula_hal::mock::{MockBoard, MockBus, MockPower, MockStore};

/// Build a manager over views of the given mock board.
pub fn manager(
    board: &MockBoard,
    overrides: ExplicitOverrides,
) -> HardwareManager<MockBus, MockPower, MockStore> {
    HardwareManager::new(board.bus(), board.power(), board.store(), overrides)
}
