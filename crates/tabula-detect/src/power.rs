//! Power sequencing for a detection pass.
//!
//! A [`PowerSession`] owns the optional power rail and power GPIO line for
//! exactly one pass. Acquisition unwinds partial failures in reverse
//! order, and the handles are released exactly once whether the pass ends
//! in a match, a no-match, or a fault: the detector calls
//! [`teardown`](PowerSession::teardown) on every path, and a drop guard
//! covers release if a panic unwinds past it.

use crate::error::{DetectError, Result};
use tabula_hal::{GpioHandle, GpioLevel, PowerController, RailHandle};
use tracing::{debug, warn};

/// Name of the switchable supply some controllers need to respond.
pub const RAIL_NAME: &str = "vddio";

/// Name of the GPIO line that power-enables the controller logic.
pub const GPIO_NAME: &str = "power-gpios";

/// Exclusive hold on the board's probe power resources for one pass.
#[derive(Debug)]
pub struct PowerSession<'a, P: PowerController> {
    power: &'a mut P,
    rail: Option<RailHandle>,
    gpio: Option<GpioHandle>,
    gpio_asserted: bool,
    rail_enabled: bool,
}

impl<'a, P: PowerController> PowerSession<'a, P> {
    /// Claim the rail and GPIO line, either of which may be absent on
    /// this board.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::ResourceUnavailable`] if either subsystem is
    /// not ready; anything already claimed is released before returning.
    pub async fn acquire(power: &'a mut P) -> Result<Self> {
        let rail = power.acquire_rail(RAIL_NAME).await.map_err(|err| {
            DetectError::resource_unavailable(format!("power rail '{RAIL_NAME}': {err}"))
        })?;

        let gpio = match power.acquire_gpio(GPIO_NAME).await {
            Ok(gpio) => gpio,
            Err(err) => {
                if let Some(rail) = rail {
                    power.release_rail(rail);
                }
                return Err(DetectError::resource_unavailable(format!(
                    "gpio line '{GPIO_NAME}': {err}"
                )));
            }
        };

        debug!(
            rail = rail.is_some(),
            gpio = gpio.is_some(),
            "power session acquired"
        );

        Ok(Self {
            power,
            rail,
            gpio,
            gpio_asserted: false,
            rail_enabled: false,
        })
    }

    /// True if this board has a power rail to try a second pass with.
    pub fn has_rail(&self) -> bool {
        self.rail.is_some()
    }

    /// Drive the power GPIO line high, if the board has one.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::ResourceUnavailable`] if the line cannot be
    /// driven.
    pub async fn assert_gpio(&mut self) -> Result<()> {
        if let Some(gpio) = &self.gpio {
            self.power
                .set_gpio(gpio, GpioLevel::High)
                .await
                .map_err(|err| {
                    DetectError::resource_unavailable(format!(
                        "gpio line '{GPIO_NAME}': {err}"
                    ))
                })?;
            self.gpio_asserted = true;
        }
        Ok(())
    }

    /// Enable the rail for the second probe attempt.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::ResourceUnavailable`] if the rail cannot be
    /// brought up.
    pub async fn enable_rail(&mut self) -> Result<()> {
        if let Some(rail) = &self.rail {
            self.power.enable_rail(rail).await.map_err(|err| {
                DetectError::resource_unavailable(format!("power rail '{RAIL_NAME}': {err}"))
            })?;
            self.rail_enabled = true;
        }
        Ok(())
    }

    /// Disable the rail. Runs after the second attempt regardless of its
    /// outcome; a failure here is logged, not propagated, because the
    /// probe verdict must still reach the caller.
    pub async fn disable_rail(&mut self) {
        if !self.rail_enabled {
            return;
        }
        if let Some(rail) = &self.rail {
            if let Err(err) = self.power.disable_rail(rail).await {
                warn!(%err, "failed to disable power rail");
            }
            self.rail_enabled = false;
        }
    }

    /// Restore GPIO state and release both resources.
    ///
    /// De-asserts the line if it was asserted (best effort), then releases
    /// the GPIO and rail handles. Runs on every exit path of a detection
    /// pass, after which the drop guard has nothing left to do.
    pub async fn teardown(mut self) {
        self.disable_rail().await;

        if self.gpio_asserted {
            if let Some(gpio) = &self.gpio {
                if let Err(err) = self.power.set_gpio(gpio, GpioLevel::Low).await {
                    warn!(%err, "failed to restore gpio line");
                }
            }
            self.gpio_asserted = false;
        }

        if let Some(gpio) = self.gpio.take() {
            self.power.release_gpio(gpio);
        }
        if let Some(rail) = self.rail.take() {
            self.power.release_rail(rail);
        }
        debug!("power session torn down");
    }
}

impl<P: PowerController> Drop for PowerSession<'_, P> {
    fn drop(&mut self) {
        // Normally empty by the time teardown has run. Release is
        // synchronous precisely so this guard can exist; the async
        // de-assert happens only in teardown().
        if let Some(gpio) = self.gpio.take() {
            self.power.release_gpio(gpio);
        }
        if let Some(rail) = self.rail.take() {
            self.power.release_rail(rail);
        }
    }
}
