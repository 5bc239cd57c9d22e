#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Proportional marker rendering over a static base map.
//!
//! Rendering is a second pass over a dataset that has already been
//! aggregated: [`marker::plan_markers`] needs a finished
//! [`AggregateResult`](covid_map_aggregate::AggregateResult), so the
//! maximum is always known before the first marker is sized.
//! [`canvas`] owns the raster side, from base map download to PNG.

pub mod canvas;
pub mod marker;

use std::sync::Arc;

use covid_map_aggregate::AggregateResult;
use covid_map_dataset::DatasetError;
use covid_map_dataset::progress::ProgressCallback;
use covid_map_dataset_models::Dataset;
use covid_map_projection::GeoProjector;
use image::RgbaImage;

pub use marker::{Marker, MarkerStyle};

/// Errors that can occur while producing the rendered map.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The base map could not be downloaded.
    #[error("Base map download failed: {0}")]
    Download(#[from] DatasetError),

    /// The base map could not be decoded, or the output could not be
    /// encoded.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error while writing the output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Returns `true` when the base map download failed on the network
    /// side. A download that arrived but could not be used is not a
    /// network failure.
    #[must_use]
    pub const fn is_network_failure(&self) -> bool {
        matches!(self, Self::Download(e) if e.is_network_failure())
    }
}

/// Plans and paints one marker per assigned record onto `canvas`.
///
/// Returns the number of markers actually painted (zero-diameter markers
/// are skipped).
pub fn render_markers(
    canvas: &mut RgbaImage,
    dataset: &Dataset,
    aggregate: &AggregateResult,
    projector: &GeoProjector,
    style: &MarkerStyle,
    progress: &Arc<dyn ProgressCallback>,
) -> usize {
    canvas::warn_on_size_mismatch(canvas, projector.canvas());

    let markers = marker::plan_markers(dataset, aggregate, projector, style);
    let painted = canvas::draw_markers(canvas, &markers, style.color, progress);

    log::info!(
        "Painted {painted} of {} markers (max {})",
        markers.len(),
        aggregate.max_value()
    );

    painted
}
