//! Operator overrides and the configuration merge.
//!
//! Overrides are constructed once at process start and passed by
//! reference into the engine; nothing in here is ambient state. Every
//! field is independently optional — absent means "auto", i.e. keep the
//! variant default.

use crate::variant::VariantDefaults;
use serde::{Deserialize, Serialize};

/// Operator-supplied configuration overrides.
///
/// # Examples
///
/// ```
/// use tabula_detect::config::ExplicitOverrides;
///
/// let overrides = ExplicitOverrides::default()
///     .with_width(800)
///     .with_variant(1);
/// assert_eq!(overrides.width, Some(800));
/// assert_eq!(overrides.height, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExplicitOverrides {
    /// Board variant index; out-of-range values fall back to 0.
    pub variant: Option<usize>,
    /// Touch surface width.
    pub width: Option<u32>,
    /// Touch surface height.
    pub height: Option<u32>,
    /// Force X inversion on or off.
    pub invert_x: Option<bool>,
    /// Force Y inversion on or off.
    pub invert_y: Option<bool>,
    /// Force axis swapping on or off.
    pub swap_axes: Option<bool>,
    /// Firmware file name.
    pub firmware: Option<String>,
}

impl ExplicitOverrides {
    /// True if every field is "auto".
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set the variant index.
    pub fn with_variant(mut self, variant: usize) -> Self {
        self.variant = Some(variant);
        self
    }

    /// Set the width.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Set the height.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Force X inversion.
    pub fn with_invert_x(mut self, invert: bool) -> Self {
        self.invert_x = Some(invert);
        self
    }

    /// Force Y inversion.
    pub fn with_invert_y(mut self, invert: bool) -> Self {
        self.invert_y = Some(invert);
        self
    }

    /// Force axis swapping.
    pub fn with_swap_axes(mut self, swap: bool) -> Self {
        self.swap_axes = Some(swap);
        self
    }

    /// Set the firmware file name.
    pub fn with_firmware(mut self, firmware: impl Into<String>) -> Self {
        self.firmware = Some(firmware.into());
        self
    }
}

/// Fully resolved configuration after the merge.
///
/// Zero geometry and false flags are valid values here — "unset" exists
/// only in the override layer, never in the resolved one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    /// Touch surface width; 0 means the controller reports its own.
    pub width: u32,
    /// Touch surface height; 0 means the controller reports its own.
    pub height: u32,
    /// X axis inverted.
    pub invert_x: bool,
    /// Y axis inverted.
    pub invert_y: bool,
    /// X and Y swapped.
    pub swap_axes: bool,
    /// Firmware file to load, if any.
    pub firmware: Option<String>,
}

/// Merge explicit overrides over variant defaults, field by field. An
/// override that is present wins unconditionally; an absent one keeps the
/// default.
pub fn merge(defaults: &VariantDefaults, overrides: &ExplicitOverrides) -> ResolvedConfig {
    ResolvedConfig {
        width: overrides.width.unwrap_or(defaults.width),
        height: overrides.height.unwrap_or(defaults.height),
        invert_x: overrides.invert_x.unwrap_or(defaults.invert_x),
        invert_y: overrides.invert_y.unwrap_or(defaults.invert_y),
        swap_axes: overrides.swap_axes.unwrap_or(defaults.swap_axes),
        firmware: overrides
            .firmware
            .clone()
            .or_else(|| defaults.firmware.map(str::to_owned)),
    }
}
