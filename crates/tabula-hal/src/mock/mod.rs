//! In-memory mock board for testing and development.
//!
//! [`MockBoard`] simulates a tablet board well enough to exercise the whole
//! detection engine without hardware: a shared bus with fitted peripheral
//! simulations, an optional power rail and power GPIO line, and a
//! description store with a `touchscreen` node. The board hands out
//! [`MockBus`], [`MockPower`] and [`MockStore`] views over one shared
//! state, and exposes scripting methods (fit devices, stick the bus,
//! inject failures) plus inspection methods (acquire/release counters,
//! node properties) for assertions.
//!
//! # Examples
//!
//! ```
//! use tabula_hal::mock::MockBoard;
//! use tabula_hal::traits::DescriptionStore;
//!
//! let board = MockBoard::new();
//! board.fit_silead(0xa082_0000, false);
//!
//! let store = board.store();
//! assert!(store.node_exists("touchscreen"));
//! assert!(store.has_property("touchscreen", "vddio-supply"));
//! ```

mod bus;
mod power;
mod store;

pub use bus::MockBus;
pub use power::MockPower;
pub use store::MockStore;

use crate::types::{GpioLevel, PropertyValue};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Fixed bus address of the silead controller family.
pub const SILEAD_MOCK_ADDR: u16 = 0x40;

/// Fixed bus address of the ektf2127 controller.
pub const EKTF2127_MOCK_ADDR: u16 = 0x15;

/// Fixed bus address of the zet6251 controller.
pub const ZET6251_MOCK_ADDR: u16 = 0x76;

/// Counters for power-subsystem operations, used by teardown tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerCounters {
    /// Successful rail acquisitions.
    pub rail_acquires: u32,
    /// Rail releases.
    pub rail_releases: u32,
    /// Rail enables.
    pub rail_enables: u32,
    /// Rail disables.
    pub rail_disables: u32,
    /// Successful GPIO acquisitions.
    pub gpio_acquires: u32,
    /// GPIO releases.
    pub gpio_releases: u32,
    /// GPIO level writes.
    pub gpio_writes: u32,
}

/// Simulated peripheral behavior at one bus address.
#[derive(Debug, Clone)]
pub(crate) enum DeviceSim {
    /// Answers register 0xFC block reads with a little-endian identity word.
    Silead { chip_id: u32 },
    /// Speaks the elan request/response protocol.
    Ektf2127,
    /// Answers raw receives with an all-0xff finger-data frame.
    Zet6251,
    /// Acknowledges its address but returns empty transfers.
    Mute,
}

#[derive(Debug)]
pub(crate) struct FittedDevice {
    pub(crate) sim: DeviceSim,
    /// Device only responds while the power rail is enabled.
    pub(crate) needs_rail: bool,
    pub(crate) last_request: Option<Vec<u8>>,
}

#[derive(Debug)]
pub(crate) struct BoardState {
    // Bus
    pub(crate) attached: Option<String>,
    pub(crate) attaches: u32,
    pub(crate) detaches: u32,
    pub(crate) bus_stuck: bool,
    pub(crate) bus_stuck_when_rail_enabled: bool,
    pub(crate) probe_log: Vec<u16>,
    pub(crate) devices: HashMap<u16, FittedDevice>,

    // Power
    pub(crate) rail_wired: bool,
    pub(crate) gpio_wired: bool,
    pub(crate) rail_enabled: bool,
    pub(crate) gpio_level: GpioLevel,
    pub(crate) fail_rail_acquire: bool,
    pub(crate) fail_gpio_acquire: bool,
    pub(crate) fail_rail_enable: bool,
    pub(crate) next_handle: u32,
    pub(crate) counters: PowerCounters,

    // Description store
    pub(crate) nodes: HashMap<String, BTreeMap<String, PropertyValue>>,
    pub(crate) fail_next_commit: bool,
    pub(crate) commits: u32,
}

impl BoardState {
    fn new() -> Self {
        let mut touchscreen = BTreeMap::new();
        touchscreen.insert("status".to_string(), PropertyValue::str("disabled"));
        touchscreen.insert(
            "vddio-supply".to_string(),
            PropertyValue::str("vdd-touchscreen"),
        );

        let mut nodes = HashMap::new();
        nodes.insert("touchscreen".to_string(), touchscreen);

        Self {
            attached: None,
            attaches: 0,
            detaches: 0,
            bus_stuck: false,
            bus_stuck_when_rail_enabled: false,
            probe_log: Vec::new(),
            devices: HashMap::new(),
            rail_wired: true,
            gpio_wired: true,
            rail_enabled: false,
            gpio_level: GpioLevel::Low,
            fail_rail_acquire: false,
            fail_gpio_acquire: false,
            fail_rail_enable: false,
            next_handle: 1,
            counters: PowerCounters::default(),
            nodes,
            fail_next_commit: false,
            commits: 0,
        }
    }

    pub(crate) fn bus_is_stuck(&self) -> bool {
        self.bus_stuck || (self.bus_stuck_when_rail_enabled && self.rail_enabled)
    }

    /// A device answers only when its logic power is up: the GPIO line
    /// must be high if the board has one, and the rail must be enabled if
    /// the device depends on it.
    pub(crate) fn device_responds(&self, device: &FittedDevice) -> bool {
        let logic_up = !self.gpio_wired || self.gpio_level == GpioLevel::High;
        let rail_ok = !device.needs_rail || self.rail_enabled;
        logic_up && rail_ok
    }
}

pub(crate) type SharedState = Arc<Mutex<BoardState>>;

pub(crate) fn lock(state: &SharedState) -> MutexGuard<'_, BoardState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A simulated tablet board.
///
/// Cloning a view (`bus()`, `power()`, `store()`) shares the same board
/// state, so scripting through the board is immediately visible to the
/// engine under test.
#[derive(Debug, Clone)]
pub struct MockBoard {
    state: SharedState,
}

impl MockBoard {
    /// Create a board with a rail, a power GPIO line, a `touchscreen`
    /// description node (status "disabled", rail reference present) and no
    /// fitted peripherals.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BoardState::new())),
        }
    }

    /// Bus adapter view of this board.
    pub fn bus(&self) -> MockBus {
        MockBus::new(Arc::clone(&self.state))
    }

    /// Power controller view of this board.
    pub fn power(&self) -> MockPower {
        MockPower::new(Arc::clone(&self.state))
    }

    /// Description store view of this board.
    pub fn store(&self) -> MockStore {
        MockStore::new(Arc::clone(&self.state))
    }

    // --- scripting ---

    /// Fit a silead controller at its fixed address with the given
    /// little-endian identity word.
    pub fn fit_silead(&self, chip_id: u32, needs_rail: bool) {
        self.fit(
            SILEAD_MOCK_ADDR,
            DeviceSim::Silead { chip_id },
            needs_rail,
        );
    }

    /// Fit an ektf2127 controller at its fixed address.
    pub fn fit_ektf2127(&self, needs_rail: bool) {
        self.fit(EKTF2127_MOCK_ADDR, DeviceSim::Ektf2127, needs_rail);
    }

    /// Fit a zet6251 controller at its fixed address.
    pub fn fit_zet6251(&self, needs_rail: bool) {
        self.fit(ZET6251_MOCK_ADDR, DeviceSim::Zet6251, needs_rail);
    }

    /// Fit a device that acknowledges `addr` but returns empty transfers.
    pub fn fit_mute(&self, addr: u16, needs_rail: bool) {
        self.fit(addr, DeviceSim::Mute, needs_rail);
    }

    fn fit(&self, addr: u16, sim: DeviceSim, needs_rail: bool) {
        lock(&self.state).devices.insert(
            addr,
            FittedDevice {
                sim,
                needs_rail,
                last_request: None,
            },
        );
    }

    /// Make every bus transfer time out.
    pub fn stick_bus(&self) {
        lock(&self.state).bus_stuck = true;
    }

    /// Make bus transfers time out only while the rail is enabled.
    pub fn stick_bus_when_rail_enabled(&self) {
        lock(&self.state).bus_stuck_when_rail_enabled = true;
    }

    /// Remove the power rail wiring from the board.
    pub fn remove_rail(&self) {
        lock(&self.state).rail_wired = false;
    }

    /// Remove the power GPIO line from the board.
    pub fn remove_gpio(&self) {
        lock(&self.state).gpio_wired = false;
    }

    /// Make rail acquisition fail (power subsystem not ready).
    pub fn fail_rail_acquire(&self) {
        lock(&self.state).fail_rail_acquire = true;
    }

    /// Make GPIO acquisition fail (GPIO subsystem not ready).
    pub fn fail_gpio_acquire(&self) {
        lock(&self.state).fail_gpio_acquire = true;
    }

    /// Make the next rail enable fail.
    pub fn fail_rail_enable(&self) {
        lock(&self.state).fail_rail_enable = true;
    }

    /// Make the next change-set commit fail without applying anything.
    pub fn fail_next_commit(&self) {
        lock(&self.state).fail_next_commit = true;
    }

    /// Delete a description node entirely.
    pub fn remove_node(&self, node: &str) {
        lock(&self.state).nodes.remove(node);
    }

    /// Delete one property from a description node.
    pub fn remove_node_property(&self, node: &str, key: &str) {
        if let Some(props) = lock(&self.state).nodes.get_mut(node) {
            props.remove(key);
        }
    }

    // --- inspection ---

    /// Power-subsystem operation counters.
    pub fn power_counters(&self) -> PowerCounters {
        lock(&self.state).counters
    }

    /// Addresses touched by bus transfers, in order.
    pub fn probed_addresses(&self) -> Vec<u16> {
        lock(&self.state).probe_log.clone()
    }

    /// Number of bus attaches and detaches so far.
    pub fn attach_counts(&self) -> (u32, u32) {
        let st = lock(&self.state);
        (st.attaches, st.detaches)
    }

    /// Node the bus is currently attached to, if any.
    pub fn attached_node(&self) -> Option<String> {
        lock(&self.state).attached.clone()
    }

    /// Whether the rail is currently enabled.
    pub fn rail_enabled(&self) -> bool {
        lock(&self.state).rail_enabled
    }

    /// Current GPIO line level.
    pub fn gpio_level(&self) -> GpioLevel {
        lock(&self.state).gpio_level
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> u32 {
        lock(&self.state).commits
    }

    /// Snapshot of a node's properties, if the node exists.
    pub fn node_properties(&self, node: &str) -> Option<BTreeMap<String, PropertyValue>> {
        lock(&self.state).nodes.get(node).cloned()
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}
