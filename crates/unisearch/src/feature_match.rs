//! Streams one layer's features through the query evaluator.

use log::warn;

use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::layer::{FeatureRecord, LayerId, LayerSource};
use crate::query::evaluate::feature_match_score;
use crate::query::Query;

/// A matched feature paired with its relevance score.
#[derive(Debug, Clone)]
pub struct FeatureMatch {
    pub record: FeatureRecord,
    pub score: i64,
}

/// Scans every feature of `layer`, emitting matches through `emit` as they
/// are found. Returns `None` when the cancellation token fired mid-scan.
///
/// An unavailable layer surfaces as an error so the coordinator can record
/// a warning and keep the other layers' results.
pub fn search_layer<S: LayerSource + ?Sized>(
    source: &S,
    layer: &LayerId,
    query: &Query,
    cancel: &CancellationToken,
    mut emit: impl FnMut(FeatureMatch),
) -> Result<Option<usize>> {
    let features = match source.features(layer) {
        Ok(features) => features,
        Err(err) => {
            warn!("layer scan failed layer={layer} err={err}");
            return Err(err);
        }
    };

    let mut matched = 0usize;
    for (id, attributes, geometry) in features {
        if cancel.is_cancelled().is_none() {
            return Ok(None);
        }
        if let Some(score) = feature_match_score(&attributes, query) {
            matched += 1;
            emit(FeatureMatch {
                record: FeatureRecord {
                    layer: layer.clone(),
                    id,
                    attributes,
                    geometry,
                },
                score,
            });
        }
    }
    Ok(Some(matched))
}
