//! Takes the map to a selected feature result.

use log::info;

use crate::error::{Result, SearchError};
use crate::layer::{LayerSource, Rect};
use crate::types::ResultRef;

/// Padding added around a feature's bounds, as a fraction of the larger
/// side.
pub const PADDING_RATIO: f64 = 0.20;
/// Floor for the padding, in map units, so point features still get a
/// visible extent.
pub const MIN_PADDING: f64 = 10.0;

/// The map view the locator drives. Implemented by the host application.
pub trait MapCanvas {
    fn zoom_to(&mut self, extent: Rect);
    fn highlight(&mut self, reference: &ResultRef);
}

fn padded_extent(bounds: Rect) -> Rect {
    let padding = (bounds.width().max(bounds.height()) * PADDING_RATIO).max(MIN_PADDING);
    bounds.expanded(padding)
}

/// Zooms and highlights a feature result. File results have no location;
/// the caller opens those externally instead.
pub fn locate(
    source: &dyn LayerSource,
    canvas: &mut dyn MapCanvas,
    reference: &ResultRef,
) -> Result<()> {
    let record = match reference {
        ResultRef::Feature(record) => record,
        ResultRef::File(_) => return Err(SearchError::NotAFeatureResult),
    };
    let bounds = source
        .resolve_bounds(&record.layer, record.id)
        .ok_or_else(|| SearchError::FeatureUnavailable {
            layer: record.layer.to_string(),
            feature: record.id,
        })?;
    let extent = padded_extent(bounds);
    info!(
        "locate layer={} feature={} extent=({:.1},{:.1})-({:.1},{:.1})",
        record.layer, record.id, extent.min_x, extent.min_y, extent.max_x, extent.max_y
    );
    canvas.zoom_to(extent);
    canvas.highlight(reference);
    Ok(())
}
