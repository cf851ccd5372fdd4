//! Mock power rail and GPIO controller.

use super::{SharedState, lock};
use crate::error::{HalError, Result};
use crate::traits::PowerController;
use crate::types::{GpioHandle, GpioLevel, RailHandle};

/// Power controller view of a [`MockBoard`](super::MockBoard).
///
/// Every acquire, release, enable, disable and level write is counted so
/// tests can assert that teardown runs exactly once per acquired resource.
#[derive(Debug)]
pub struct MockPower {
    state: SharedState,
}

impl MockPower {
    pub(super) fn new(state: SharedState) -> Self {
        Self { state }
    }
}

impl PowerController for MockPower {
    async fn acquire_rail(&mut self, name: &str) -> Result<Option<RailHandle>> {
        let mut st = lock(&self.state);
        if st.fail_rail_acquire {
            return Err(HalError::busy(format!("power rail '{name}'")));
        }
        if !st.rail_wired {
            return Ok(None);
        }
        let id = st.next_handle;
        st.next_handle += 1;
        st.counters.rail_acquires += 1;
        Ok(Some(RailHandle::new(id)))
    }

    async fn enable_rail(&mut self, _rail: &RailHandle) -> Result<()> {
        let mut st = lock(&self.state);
        if st.fail_rail_enable {
            st.fail_rail_enable = false;
            return Err(HalError::other("rail enable failed"));
        }
        st.rail_enabled = true;
        st.counters.rail_enables += 1;
        Ok(())
    }

    async fn disable_rail(&mut self, _rail: &RailHandle) -> Result<()> {
        let mut st = lock(&self.state);
        st.rail_enabled = false;
        st.counters.rail_disables += 1;
        Ok(())
    }

    fn release_rail(&mut self, _rail: RailHandle) {
        lock(&self.state).counters.rail_releases += 1;
    }

    async fn acquire_gpio(&mut self, name: &str) -> Result<Option<GpioHandle>> {
        let mut st = lock(&self.state);
        if st.fail_gpio_acquire {
            return Err(HalError::busy(format!("gpio line '{name}'")));
        }
        if !st.gpio_wired {
            return Ok(None);
        }
        let id = st.next_handle;
        st.next_handle += 1;
        st.counters.gpio_acquires += 1;
        Ok(Some(GpioHandle::new(id)))
    }

    async fn set_gpio(&mut self, _gpio: &GpioHandle, level: GpioLevel) -> Result<()> {
        let mut st = lock(&self.state);
        st.gpio_level = level;
        st.counters.gpio_writes += 1;
        Ok(())
    }

    fn release_gpio(&mut self, _gpio: GpioHandle) {
        lock(&self.state).counters.gpio_releases += 1;
    }
}
