//! Host-facing layer abstractions.
//!
//! The core never materializes a layer: all feature access goes through the
//! [`LayerSource`] capability as a lazy sequence, so arbitrarily large
//! layers stay bounded in working-set size.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::value::AttributeValue;

/// Identifier of a vector layer in the host project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Feature identifier within one layer.
pub type FeatureId = i64;

/// Field name to value mapping for one feature. Ordered for deterministic
/// iteration.
pub type AttributeMap = BTreeMap<String, AttributeValue>;

/// Opaque geometry handle into the external layer source. The core never
/// inspects it; it is only passed back at locate time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryRef(pub u64);

/// Immutable snapshot of one feature at match time. Constructed lazily
/// during a scan and discarded after the search; never cached.
#[derive(Debug, Clone)]
pub struct FeatureRecord {
    pub layer: LayerId,
    pub id: FeatureId,
    pub attributes: AttributeMap,
    pub geometry: GeometryRef,
}

impl FeatureRecord {
    /// Display name used by name-based sort orders: the first text
    /// attribute in field order, falling back to "layer/id".
    pub fn display_name(&self) -> String {
        for value in self.attributes.values() {
            if let AttributeValue::Text(text) = value {
                if !text.trim().is_empty() {
                    return text.clone();
                }
            }
        }
        format!("{}/{}", self.layer, self.id)
    }
}

/// Axis-aligned bounding box in map units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Grows the box by `padding` map units on every side.
    pub fn expanded(&self, padding: f64) -> Self {
        Self {
            min_x: self.min_x - padding,
            min_y: self.min_y - padding,
            max_x: self.max_x + padding,
            max_y: self.max_y + padding,
        }
    }
}

/// Lazy feature sequence produced by a [`LayerSource`].
pub type FeatureIter<'a> = Box<dyn Iterator<Item = (FeatureId, AttributeMap, GeometryRef)> + 'a>;

/// Capability interface over the host's feature/layer storage.
///
/// Iteration must be lazy: implementations should stream features rather
/// than collecting a layer up front. An `Err` from `features` marks the
/// layer unavailable (removed or locked); the search continues with the
/// remaining layers and reports a warning.
pub trait LayerSource: Send + Sync {
    /// Opens a fresh, finite iteration over the layer's features.
    fn features(&self, layer: &LayerId) -> Result<FeatureIter<'_>>;

    /// Resolves a feature back to its bounding geometry at locate time.
    /// Returns `None` if the feature or layer no longer exists.
    fn resolve_bounds(&self, layer: &LayerId, feature: FeatureId) -> Option<Rect>;
}
