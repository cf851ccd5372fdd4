//! Top-level detection-and-configuration flow.
//!
//! One [`HardwareManager`] pass runs the whole engine: probe for a
//! controller under the two power states, resolve the variant profile,
//! merge operator overrides, and commit the description overlay. The
//! caller runs it once per matching board, after its own compatibility
//! gating.

use crate::bus::BusClaim;
use crate::candidates::{DetectedDevice, ProbeVerdict};
use crate::config::{ExplicitOverrides, ResolvedConfig, merge};
use crate::error::{DetectError, Result};
use crate::orchestrator::run_pass;
use crate::overlay::{TOUCHSCREEN_NODE, build_changeset};
use crate::power::PowerSession;
use crate::variant;
use serde::Serialize;
use tabula_hal::{BusAdapter, DescriptionStore, PowerController};
use tracing::{debug, info, warn};

/// Result of a successful configuration pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedConfig {
    /// The controller that was found.
    #[serde(skip)]
    pub detected: DetectedDevice,
    /// Variant index the defaults came from.
    pub variant: usize,
    /// The configuration that was committed.
    pub resolved: ResolvedConfig,
}

/// Boot-time hardware manager for one board.
///
/// Owns its collaborators for the duration of the configuration pass;
/// every hardware resource they hand out is acquired and released within
/// the pass.
///
/// # Examples
///
/// ```
/// use tabula_detect::{ExplicitOverrides, HardwareManager};
/// use tabula_hal::mock::MockBoard;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), tabula_detect::DetectError> {
///     let board = MockBoard::new();
///     board.fit_silead(0xa082_0000, false);
///
///     let mut manager = HardwareManager::new(
///         board.bus(),
///         board.power(),
///         board.store(),
///         ExplicitOverrides::default(),
///     );
///     let applied = manager.configure_touchscreen().await?;
///     assert!(applied.is_some());
///     Ok(())
/// }
/// ```
pub struct HardwareManager<B, P, S> {
    bus: B,
    power: P,
    store: S,
    overrides: ExplicitOverrides,
}

impl<B, P, S> HardwareManager<B, P, S>
where
    B: BusAdapter,
    P: PowerController,
    S: DescriptionStore,
{
    /// Create a manager over the board's collaborators and the overrides
    /// fixed at process start.
    pub fn new(bus: B, power: P, store: S, overrides: ExplicitOverrides) -> Self {
        Self {
            bus,
            power,
            store,
            overrides,
        }
    }

    /// Run one full detection-and-configuration pass.
    ///
    /// Returns `Ok(None)` when no controller was found — that is a normal
    /// outcome, the description is left untouched and the boot path stays
    /// silent.
    ///
    /// # Errors
    ///
    /// See [`DetectError`]; [`DetectError::should_retry_later`] separates
    /// "come back when dependencies are up" from genuine failures.
    pub async fn configure_touchscreen(&mut self) -> Result<Option<AppliedConfig>> {
        let Some(detected) = self.detect_touchscreen().await? else {
            debug!("no touchscreen controller found, leaving description untouched");
            return Ok(None);
        };

        info!(
            compatible = detected.sub_model.compatible(),
            addr = format_args!("{:#04x}", detected.addr),
            rail_required = detected.rail_required,
            "found touchscreen controller"
        );

        let (variant_index, defaults) =
            variant::resolve(detected.sub_model, self.overrides.variant);
        let resolved = merge(defaults, &self.overrides);

        if detected.sub_model.is_gsl1680() {
            log_calibration_hints(variant_index, &resolved, &self.overrides);
        }

        let changeset = build_changeset(TOUCHSCREEN_NODE, &detected, &resolved, &self.store);
        self.store
            .commit(changeset)
            .await
            .map_err(DetectError::commit_failed)?;

        Ok(Some(AppliedConfig {
            detected,
            variant: variant_index,
            resolved,
        }))
    }

    /// Probe for a controller under both power states.
    async fn detect_touchscreen(&mut self) -> Result<Option<DetectedDevice>> {
        let Self {
            bus, power, store, ..
        } = self;

        if !store.node_exists(TOUCHSCREEN_NODE) {
            return Err(DetectError::node_missing(TOUCHSCREEN_NODE));
        }

        let mut claim = BusClaim::attach(bus, TOUCHSCREEN_NODE).await?;
        let mut session = PowerSession::acquire(power).await?;

        // Teardown must run on every path, so the probing itself never
        // early-returns past this point.
        let outcome = run_power_states(&mut *claim, &mut session).await;
        session.teardown().await;
        outcome
    }
}

/// The two-state probe sequence: GPIO only, then GPIO plus rail.
async fn run_power_states<B, P>(
    bus: &mut B,
    session: &mut PowerSession<'_, P>,
) -> Result<Option<DetectedDevice>>
where
    B: BusAdapter,
    P: PowerController,
{
    session.assert_gpio().await?;

    debug!("probing for a touchscreen without the power rail");
    match run_pass(bus).await {
        ProbeVerdict::Match { sub_model, addr } => {
            return Ok(Some(DetectedDevice {
                sub_model,
                addr,
                rail_required: false,
                rail_present: session.has_rail(),
            }));
        }
        ProbeVerdict::BusFault(fault) => return Err(DetectError::bus_fault(fault)),
        ProbeVerdict::NoMatch => {}
    }

    if !session.has_rail() {
        return Ok(None);
    }

    session.enable_rail().await?;
    debug!("probing for a touchscreen with the power rail enabled");
    let verdict = run_pass(bus).await;
    // The rail goes back down before the verdict is interpreted; the
    // matched controller keeps its supply reference and gets re-powered
    // by the real driver.
    session.disable_rail().await;

    match verdict {
        ProbeVerdict::Match { sub_model, addr } => Ok(Some(DetectedDevice {
            sub_model,
            addr,
            rail_required: true,
            rail_present: true,
        })),
        ProbeVerdict::BusFault(fault) => Err(DetectError::bus_fault(fault)),
        ProbeVerdict::NoMatch => Ok(None),
    }
}

/// gsl1680 boards frequently need operator-supplied calibration; tell the
/// operator which knobs exist and where each current value came from.
fn log_calibration_hints(
    variant_index: usize,
    resolved: &ResolvedConfig,
    overrides: &ExplicitOverrides,
) {
    warn!("gsl1680 touchscreens may need explicit overrides to work properly");
    warn!(
        try_invert_x = !resolved.invert_x,
        "if x coordinates are inverted, override invert-x"
    );
    warn!(
        try_variant = usize::from(variant_index == 0),
        "if coordinates are all over the place, override the variant"
    );

    let provenance = |overridden: bool| if overridden { "user supplied" } else { "auto" };
    info!(
        value = variant_index,
        source = provenance(overrides.variant.is_some()),
        "touchscreen variant"
    );
    info!(
        value = resolved.width,
        source = provenance(overrides.width.is_some()),
        "touchscreen width"
    );
    info!(
        value = resolved.height,
        source = provenance(overrides.height.is_some()),
        "touchscreen height"
    );
    info!(
        value = resolved.invert_x,
        source = provenance(overrides.invert_x.is_some()),
        "touchscreen invert-x"
    );
    info!(
        value = resolved.invert_y,
        source = provenance(overrides.invert_y.is_some()),
        "touchscreen invert-y"
    );
    info!(
        value = resolved.swap_axes,
        source = provenance(overrides.swap_axes.is_some()),
        "touchscreen swap-axes"
    );
    info!(
        value = resolved.firmware.as_deref().unwrap_or("none"),
        source = provenance(overrides.firmware.is_some()),
        "touchscreen firmware"
    );
}
