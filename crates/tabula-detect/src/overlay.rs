//! Building and applying the device-description overlay.
//!
//! Everything the detection pass learned is condensed into one
//! [`ChangeSet`] against the touchscreen node and committed exactly once.
//! Properties are only emitted for values that actually constrain the
//! bound driver: zero geometry and false flags are omitted, matching how
//! the description format treats absent properties.

use crate::candidates::DetectedDevice;
use crate::config::ResolvedConfig;
use tabula_hal::{ChangeSet, DescriptionStore, PropertyValue};
use tracing::warn;

/// Description node this engine configures.
pub const TOUCHSCREEN_NODE: &str = "touchscreen";

const PROP_REG: &str = "reg";
const PROP_COMPATIBLE: &str = "compatible";
const PROP_STATUS: &str = "status";
const PROP_RAIL_SUPPLY: &str = "vddio-supply";
const PROP_SIZE_X: &str = "touchscreen-size-x";
const PROP_SIZE_Y: &str = "touchscreen-size-y";
const PROP_INVERTED_X: &str = "touchscreen-inverted-x";
const PROP_INVERTED_Y: &str = "touchscreen-inverted-y";
const PROP_SWAPPED_X_Y: &str = "touchscreen-swapped-x-y";
const PROP_FIRMWARE_NAME: &str = "firmware-name";

/// Build the change set that turns the disabled placeholder node into a
/// bindable description of the detected controller.
///
/// The rail reference is dropped only when the controller was found
/// *without* the rail — then the supply is dead weight the real driver
/// should not request.
pub fn build_changeset<S: DescriptionStore>(
    node: &str,
    detected: &DetectedDevice,
    resolved: &ResolvedConfig,
    store: &S,
) -> ChangeSet {
    let mut changeset = ChangeSet::begin(node);

    changeset.add_property(PROP_REG, PropertyValue::U32(u32::from(detected.addr)));
    changeset.add_property(
        PROP_COMPATIBLE,
        PropertyValue::str(detected.sub_model.compatible()),
    );
    changeset.update_property(PROP_STATUS, PropertyValue::str("okay"));

    if detected.rail_present && !detected.rail_required {
        if store.has_property(node, PROP_RAIL_SUPPLY) {
            changeset.remove_property(PROP_RAIL_SUPPLY);
        } else {
            // The power subsystem handed out a rail the description does
            // not reference; nothing to remove, but worth a trace.
            warn!(node, "rail acquired but '{PROP_RAIL_SUPPLY}' not in description");
        }
    }

    if resolved.width != 0 {
        changeset.add_property(PROP_SIZE_X, PropertyValue::U32(resolved.width));
    }
    if resolved.height != 0 {
        changeset.add_property(PROP_SIZE_Y, PropertyValue::U32(resolved.height));
    }
    if resolved.invert_x {
        changeset.add_property(PROP_INVERTED_X, PropertyValue::Flag);
    }
    if resolved.invert_y {
        changeset.add_property(PROP_INVERTED_Y, PropertyValue::Flag);
    }
    if resolved.swap_axes {
        changeset.add_property(PROP_SWAPPED_X_Y, PropertyValue::Flag);
    }
    if let Some(firmware) = &resolved.firmware {
        changeset.add_property(PROP_FIRMWARE_NAME, PropertyValue::str(firmware.clone()));
    }

    changeset
}
