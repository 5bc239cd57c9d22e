//! Marker sizing and placement.
//!
//! A marker's diameter is `metric / max * scale_factor`, so the record
//! holding the maximum gets exactly `scale_factor` pixels. When the
//! aggregate has no positive maximum (an all-zero or empty dataset) every
//! diameter is zero and no division takes place.

use covid_map_aggregate::AggregateResult;
use covid_map_dataset_models::Dataset;
use covid_map_projection::{GeoProjector, PixelPoint};
use image::Rgba;

/// Diameter, in pixels, of the marker for the maximal record.
pub const DEFAULT_SCALE_FACTOR: f64 = 100.0;

/// Default marker fill (`#007BFF`).
pub const DEFAULT_COLOR: Rgba<u8> = Rgba([0, 123, 255, 255]);

/// How markers are sized and filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub scale_factor: f64,
    pub color: Rgba<u8>,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            color: DEFAULT_COLOR,
        }
    }
}

/// A planned filled circle.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Row of the record this marker represents.
    pub row: usize,
    /// Record display name.
    pub label: String,
    /// Projected center.
    pub center: PixelPoint,
    /// Diameter in pixels. Zero draws nothing.
    pub diameter: f64,
}

/// Computes a marker diameter relative to the scan-wide maximum.
///
/// Returns `0.0` when `max` is not a positive finite number, and never
/// returns a negative diameter.
#[must_use]
pub fn marker_diameter(metric: f64, max: f64, scale_factor: f64) -> f64 {
    if !max.is_finite() || max <= 0.0 {
        return 0.0;
    }
    (metric / max * scale_factor).max(0.0)
}

/// Builds one marker per assigned record, in dataset order.
///
/// Unassigned rows are skipped. Records that project outside the canvas
/// are kept (they simply clip) but logged.
#[must_use]
pub fn plan_markers(
    dataset: &Dataset,
    aggregate: &AggregateResult,
    projector: &GeoProjector,
    style: &MarkerStyle,
) -> Vec<Marker> {
    let max = aggregate.max_value();

    if aggregate.is_degenerate() {
        log::warn!("Maximum {} is not positive; all markers have zero diameter", max);
    }

    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.is_assigned())
        .filter_map(|(row, record)| {
            let Some(position) = record.position else {
                log::debug!("Row {row} ({}) has no coordinates", record.display_name());
                return None;
            };

            let center = projector.project(position.latitude, position.longitude);
            if !center.is_on_canvas(projector.canvas()) {
                log::warn!(
                    "{} at ({}, {}) projects off-canvas to ({:.1}, {:.1})",
                    record.display_name(),
                    position.latitude,
                    position.longitude,
                    center.x,
                    center.y
                );
            }

            Some(Marker {
                row,
                label: record.display_name().to_owned(),
                center,
                diameter: marker_diameter(record.metric, max, style.scale_factor),
            })
        })
        .collect()
}
