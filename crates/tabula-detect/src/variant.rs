//! Per-sub-model tables of known board variants.
//!
//! Some controllers are wired differently depending on the PCB variant a
//! board vendor used, so the same detected silicon can need different
//! geometry and firmware. The tables below hold the known-good profiles;
//! index 0 is the most common wiring and the fallback.

use crate::candidates::SubModel;
use tracing::warn;

/// Default configuration profile for one board variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantDefaults {
    /// Touch surface width in device units; 0 means "not forced".
    pub width: u32,
    /// Touch surface height in device units; 0 means "not forced".
    pub height: u32,
    /// X axis is inverted on this wiring.
    pub invert_x: bool,
    /// Y axis is inverted on this wiring.
    pub invert_y: bool,
    /// X and Y are swapped on this wiring.
    pub swap_axes: bool,
    /// Firmware file to load, if the controller needs one.
    pub firmware: Option<&'static str>,
}

impl VariantDefaults {
    const fn unforced() -> Self {
        Self {
            width: 0,
            height: 0,
            invert_x: false,
            invert_y: false,
            swap_axes: false,
            firmware: None,
        }
    }
}

const GSL1680_A082_VARIANTS: &[VariantDefaults] = &[
    // Variant 0: 7" Q8 formfactor.
    VariantDefaults {
        width: 1024,
        height: 600,
        invert_x: false,
        invert_y: false,
        swap_axes: false,
        firmware: Some("gsl1680-a082-q8-700.fw"),
    },
    // Variant 1: A70 wiring, portrait panel behind a landscape controller.
    VariantDefaults {
        width: 480,
        height: 800,
        invert_x: false,
        invert_y: false,
        swap_axes: true,
        firmware: Some("gsl1680-a082-q8-a70.fw"),
    },
];

const GSL1680_B482_VARIANTS: &[VariantDefaults] = &[
    VariantDefaults {
        width: 960,
        height: 640,
        invert_x: false,
        invert_y: false,
        swap_axes: false,
        firmware: Some("gsl1680-b482-q8-d702.fw"),
    },
    VariantDefaults {
        width: 960,
        height: 640,
        invert_x: false,
        invert_y: false,
        swap_axes: false,
        firmware: Some("gsl1680-b482-q8-a70.fw"),
    },
];

// ektf2127 and zet6251 report their own geometry and need no firmware
// selection, so they have a single unforced profile.
const SINGLE_VARIANT: &[VariantDefaults] = &[VariantDefaults::unforced()];

/// Known variants for a sub-model, in index order.
pub fn table(sub_model: SubModel) -> &'static [VariantDefaults] {
    match sub_model {
        SubModel::Gsl1680A082 => GSL1680_A082_VARIANTS,
        SubModel::Gsl1680B482 => GSL1680_B482_VARIANTS,
        SubModel::Ektf2127 | SubModel::Zet6251 => SINGLE_VARIANT,
    }
}

/// Select the variant profile for a detected sub-model.
///
/// An explicit in-range index wins; an out-of-range index falls back to
/// variant 0 with a diagnostic, because a bad override must never take
/// down the boot path. Sub-models with a single known variant ignore the
/// index entirely.
pub fn resolve(
    sub_model: SubModel,
    explicit: Option<usize>,
) -> (usize, &'static VariantDefaults) {
    let variants = table(sub_model);
    if variants.len() == 1 {
        return (0, &variants[0]);
    }

    let index = match explicit {
        Some(index) if index < variants.len() => index,
        Some(index) => {
            warn!(
                requested = index,
                known = variants.len(),
                sub_model = sub_model.name(),
                "unknown touchscreen variant requested, using variant 0"
            );
            0
        }
        None => 0,
    };
    (index, &variants[index])
}
