#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Linear projection from a geographic bounding box onto a pixel canvas.
//!
//! ```text
//! x = W * (lon - minLon) / (maxLon - minLon)
//! y = H * (1 - (lat - minLat) / (maxLat - minLat))
//! ```
//!
//! Pixel row 0 is the top of the canvas, so the vertical axis is inverted.
//! Points outside the bounds are not rejected; they land off-canvas.

use geo::{Coord, Intersects as _, Rect};
use serde::{Deserialize, Serialize};

/// Configuration errors detected when building a [`GeoProjector`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    /// A min/max pair is equal or inverted.
    #[error("Degenerate {axis} span: min {min} must be less than max {max}")]
    DegenerateSpan {
        /// `"longitude"` or `"latitude"`.
        axis: &'static str,
        /// Configured minimum.
        min: f64,
        /// Configured maximum.
        max: f64,
    },

    /// A bound is NaN or infinite.
    #[error("Bounding box contains a non-finite value")]
    NonFiniteBound,

    /// The canvas has a zero dimension.
    #[error("Canvas must be non-empty, got {width}x{height}")]
    EmptyCanvas {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
}

/// The projection domain in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

/// Canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

/// A projected position. Fractional, and possibly off-canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    /// Returns `true` if the point falls within `[0, W] x [0, H]`.
    #[must_use]
    pub fn is_on_canvas(&self, canvas: CanvasSize) -> bool {
        (0.0..=f64::from(canvas.width)).contains(&self.x)
            && (0.0..=f64::from(canvas.height)).contains(&self.y)
    }
}

/// Maps latitude/longitude onto a fixed canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoProjector {
    bounds: Rect<f64>,
    canvas: CanvasSize,
}

impl GeoProjector {
    /// Validates the configuration and builds a projector.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError`] if any bound is non-finite, if either
    /// span is zero or inverted, or if the canvas is empty.
    pub fn new(bounds: GeoBounds, canvas: CanvasSize) -> Result<Self, ProjectionError> {
        let GeoBounds {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        } = bounds;

        if ![min_lon, max_lon, min_lat, max_lat]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ProjectionError::NonFiniteBound);
        }
        // Rect::new silently swaps inverted corners, so check first.
        if min_lon >= max_lon {
            return Err(ProjectionError::DegenerateSpan {
                axis: "longitude",
                min: min_lon,
                max: max_lon,
            });
        }
        if min_lat >= max_lat {
            return Err(ProjectionError::DegenerateSpan {
                axis: "latitude",
                min: min_lat,
                max: max_lat,
            });
        }
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ProjectionError::EmptyCanvas {
                width: canvas.width,
                height: canvas.height,
            });
        }

        Ok(Self {
            bounds: Rect::new(
                Coord {
                    x: min_lon,
                    y: min_lat,
                },
                Coord {
                    x: max_lon,
                    y: max_lat,
                },
            ),
            canvas,
        })
    }

    #[must_use]
    pub const fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Projects a latitude/longitude pair to pixel coordinates.
    #[must_use]
    pub fn project(&self, lat: f64, lon: f64) -> PixelPoint {
        let min = self.bounds.min();
        let width = f64::from(self.canvas.width);
        let height = f64::from(self.canvas.height);

        PixelPoint {
            x: width * (lon - min.x) / self.bounds.width(),
            y: height * (1.0 - (lat - min.y) / self.bounds.height()),
        }
    }

    /// Returns `true` if the position lies inside the bounding box
    /// (edges included).
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.bounds.intersects(&Coord { x: lon, y: lat })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITALY: GeoBounds = GeoBounds {
        min_lon: 6.527_265_8,
        max_lon: 18.710_247_023_2,
        min_lat: 36.689_987_291,
        max_lat: 47.305_146_2,
    };

    const CANVAS: CanvasSize = CanvasSize {
        width: 930,
        height: 1096,
    };

    fn projector() -> GeoProjector {
        GeoProjector::new(ITALY, CANVAS).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn min_corner_projects_to_bottom_left() {
        let p = projector().project(ITALY.min_lat, ITALY.min_lon);
        assert!(approx(p.x, 0.0));
        assert!(approx(p.y, 1096.0));
    }

    #[test]
    fn max_corner_projects_to_top_right() {
        let p = projector().project(ITALY.max_lat, ITALY.max_lon);
        assert!(approx(p.x, 930.0));
        assert!(approx(p.y, 0.0));
    }

    #[test]
    fn increasing_longitude_increases_x() {
        let proj = projector();
        let mut previous = proj.project(42.0, 5.0).x;
        for step in 1..40 {
            let x = proj.project(42.0, 5.0 + f64::from(step) * 0.37).x;
            assert!(x > previous);
            previous = x;
        }
    }

    #[test]
    fn increasing_latitude_decreases_y() {
        let proj = projector();
        let mut previous = proj.project(35.0, 12.0).y;
        for step in 1..40 {
            let y = proj.project(35.0 + f64::from(step) * 0.33, 12.0).y;
            assert!(y < previous);
            previous = y;
        }
    }

    #[test]
    fn out_of_range_points_project_off_canvas() {
        let proj = projector();
        let p = proj.project(50.0, 3.0);
        assert!(p.x < 0.0);
        assert!(p.y < 0.0);
        assert!(!p.is_on_canvas(CANVAS));
        assert!(!proj.contains(50.0, 3.0));
        assert!(proj.contains(45.46, 9.19));
    }

    #[test]
    fn rejects_zero_longitude_span() {
        let bounds = GeoBounds {
            max_lon: ITALY.min_lon,
            ..ITALY
        };
        assert!(matches!(
            GeoProjector::new(bounds, CANVAS),
            Err(ProjectionError::DegenerateSpan {
                axis: "longitude",
                ..
            })
        ));
    }

    #[test]
    fn rejects_inverted_latitude_span() {
        let bounds = GeoBounds {
            min_lat: ITALY.max_lat,
            max_lat: ITALY.min_lat,
            ..ITALY
        };
        assert!(matches!(
            GeoProjector::new(bounds, CANVAS),
            Err(ProjectionError::DegenerateSpan {
                axis: "latitude",
                ..
            })
        ));
    }

    #[test]
    fn rejects_nan_bound_and_empty_canvas() {
        let bounds = GeoBounds {
            min_lat: f64::NAN,
            ..ITALY
        };
        assert_eq!(
            GeoProjector::new(bounds, CANVAS),
            Err(ProjectionError::NonFiniteBound)
        );
        assert!(matches!(
            GeoProjector::new(
                ITALY,
                CanvasSize {
                    width: 0,
                    height: 10
                }
            ),
            Err(ProjectionError::EmptyCanvas { .. })
        ));
    }
}
