//! Shared types for the hardware collaborator interfaces.

use serde::{Deserialize, Serialize};

/// Logic level of a GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GpioLevel {
    /// Line driven low.
    Low,
    /// Line driven high.
    High,
}

/// Opaque handle to an acquired power rail.
///
/// Handles are not `Clone`: releasing consumes the handle, so a rail can
/// only be released once per acquisition.
#[derive(Debug, PartialEq, Eq)]
pub struct RailHandle(u32);

impl RailHandle {
    /// Create a handle with the given controller-assigned id.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Controller-assigned id of this handle.
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Opaque handle to an acquired GPIO line.
///
/// Same ownership rules as [`RailHandle`].
#[derive(Debug, PartialEq, Eq)]
pub struct GpioHandle(u32);

impl GpioHandle {
    /// Create a handle with the given controller-assigned id.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Controller-assigned id of this handle.
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// Value of a device-description property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    /// 32-bit integer property (addresses, geometry).
    U32(u32),

    /// String property (compatible strings, firmware names).
    Str(String),

    /// Presence-only boolean property; existing means true.
    Flag,
}

impl PropertyValue {
    /// Create a string property value.
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    /// Get the integer value, if this is a `U32` property.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the string value, if this is a `Str` property.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// One edit in a [`ChangeSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyOp {
    /// Add a property that must not already exist.
    Add { key: String, value: PropertyValue },

    /// Update a property that must already exist.
    Update { key: String, value: PropertyValue },

    /// Remove a property that must already exist.
    Remove { key: String },
}

impl PropertyOp {
    /// Key this operation targets.
    pub fn key(&self) -> &str {
        match self {
            Self::Add { key, .. } | Self::Update { key, .. } | Self::Remove { key } => key,
        }
    }
}

/// An ordered, all-or-nothing batch of edits to one description node.
///
/// A change set is built incrementally and handed to
/// [`DescriptionStore::commit`](crate::traits::DescriptionStore::commit)
/// exactly once. The store contract guarantees that either every
/// operation is applied, in order, or none are.
///
/// # Examples
///
/// ```
/// use tabula_hal::types::{ChangeSet, PropertyValue};
///
/// let mut cs = ChangeSet::begin("touchscreen");
/// cs.add_property("reg", PropertyValue::U32(0x40));
/// cs.update_property("status", PropertyValue::str("okay"));
/// cs.remove_property("vddio-supply");
/// assert_eq!(cs.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    node: String,
    ops: Vec<PropertyOp>,
}

impl ChangeSet {
    /// Start an empty change set against the named node.
    pub fn begin(node: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            ops: Vec::new(),
        }
    }

    /// Queue adding a new property.
    pub fn add_property(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.ops.push(PropertyOp::Add {
            key: key.into(),
            value,
        });
    }

    /// Queue updating an existing property.
    pub fn update_property(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.ops.push(PropertyOp::Update {
            key: key.into(),
            value,
        });
    }

    /// Queue removing an existing property.
    pub fn remove_property(&mut self, key: impl Into<String>) {
        self.ops.push(PropertyOp::Remove { key: key.into() });
    }

    /// Node this change set targets.
    pub fn node(&self) -> &str {
        &self.node
    }

    /// Queued operations, in application order.
    pub fn ops(&self) -> &[PropertyOp] {
        &self.ops
    }

    /// Number of queued operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True if no operations have been queued.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
