//! The raster side of rendering: base map in, painted PNG out.

use std::path::Path;
use std::sync::Arc;

use covid_map_dataset::http;
use covid_map_dataset::progress::ProgressCallback;
use covid_map_projection::CanvasSize;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_circle_mut;

use crate::RenderError;
use crate::marker::Marker;

/// Downloads and decodes the base map into a mutable RGBA canvas.
///
/// # Errors
///
/// Returns [`RenderError::Download`] if the request fails and
/// [`RenderError::Image`] if the bytes are not a decodable image.
pub async fn fetch_base_map(client: &reqwest::Client, url: &str) -> Result<RgbaImage, RenderError> {
    let bytes = http::fetch_bytes(client, url).await?;
    decode_base_map(&bytes)
}

/// Decodes image bytes into an RGBA canvas.
///
/// # Errors
///
/// Returns [`RenderError::Image`] if the format is unknown or corrupt.
pub fn decode_base_map(bytes: &[u8]) -> Result<RgbaImage, RenderError> {
    let canvas = image::load_from_memory(bytes)?.to_rgba8();
    log::debug!(
        "Decoded base map: {}x{}",
        canvas.width(),
        canvas.height()
    );
    Ok(canvas)
}

/// Logs a warning when the raster and the projection canvas disagree.
pub fn warn_on_size_mismatch(canvas: &RgbaImage, expected: CanvasSize) {
    if canvas.width() != expected.width || canvas.height() != expected.height {
        log::warn!(
            "Base map is {}x{} but the projection expects {}x{}; markers may be misplaced",
            canvas.width(),
            canvas.height(),
            expected.width,
            expected.height
        );
    }
}

/// Paints markers as filled circles in slice order, so later markers
/// cover earlier ones. Zero-diameter and NaN-diameter markers are skipped.
///
/// Circles that cannot reach the canvas are counted but not drawn. For
/// the rest, the radius is capped at the canvas diagonal and the center is
/// clamped to one diagonal beyond the edges, keeping pixel arithmetic
/// within `i32`.
///
/// Returns the number of markers painted.
#[allow(clippy::cast_possible_truncation)]
pub fn draw_markers(
    canvas: &mut RgbaImage,
    markers: &[Marker],
    color: Rgba<u8>,
    progress: &Arc<dyn ProgressCallback>,
) -> usize {
    progress.set_total(markers.len() as u64);

    let width = f64::from(canvas.width());
    let height = f64::from(canvas.height());
    let diagonal = width.hypot(height).ceil();
    let margin = diagonal + 1.0;

    let mut painted = 0;
    for marker in markers {
        progress.inc(1);
        if marker.diameter.is_nan() || marker.diameter <= 0.0 {
            continue;
        }

        painted += 1;

        let half = marker.diameter / 2.0;
        let gap_x = (-marker.center.x).max(marker.center.x - width).max(0.0);
        let gap_y = (-marker.center.y).max(marker.center.y - height).max(0.0);
        if gap_x.hypot(gap_y) > half {
            continue;
        }

        let center = (
            marker.center.x.clamp(-margin, width + margin).round() as i32,
            marker.center.y.clamp(-margin, height + margin).round() as i32,
        );
        let radius = half.min(diagonal).round() as i32;
        draw_filled_circle_mut(canvas, center, radius, color);
    }

    progress.finish(format!("Painted {painted} markers"));
    painted
}

/// Writes the canvas as PNG, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`RenderError::Io`] if the directory cannot be created and
/// [`RenderError::Image`] if encoding or writing fails.
pub fn save_canvas(canvas: &RgbaImage, path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    canvas.save_with_format(path, image::ImageFormat::Png)?;
    log::info!("Saved rendered map to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use covid_map_dataset::progress::null_progress;
    use covid_map_projection::PixelPoint;

    use super::*;
    use crate::marker::DEFAULT_COLOR;

    const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn blank(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, BACKGROUND)
    }

    fn marker(x: f64, y: f64, diameter: f64) -> Marker {
        Marker {
            row: 0,
            label: "test".to_owned(),
            center: PixelPoint { x, y },
            diameter,
        }
    }

    #[test]
    fn paints_filled_circle_at_center() {
        let mut canvas = blank(50, 50);
        let painted = draw_markers(
            &mut canvas,
            &[marker(25.0, 25.0, 20.0)],
            DEFAULT_COLOR,
            &null_progress(),
        );

        assert_eq!(painted, 1);
        assert_eq!(*canvas.get_pixel(25, 25), DEFAULT_COLOR);
        assert_eq!(*canvas.get_pixel(30, 25), DEFAULT_COLOR);
        assert_eq!(*canvas.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*canvas.get_pixel(25, 45), BACKGROUND);
    }

    #[test]
    fn zero_diameter_markers_leave_canvas_untouched() {
        let mut canvas = blank(20, 20);
        let painted = draw_markers(
            &mut canvas,
            &[marker(10.0, 10.0, 0.0), marker(5.0, 5.0, 0.0)],
            DEFAULT_COLOR,
            &null_progress(),
        );

        assert_eq!(painted, 0);
        assert!(canvas.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn later_markers_cover_earlier_ones() {
        let red = Rgba([255, 0, 0, 255]);
        let mut canvas = blank(40, 40);
        draw_markers(&mut canvas, &[marker(20.0, 20.0, 30.0)], DEFAULT_COLOR, &null_progress());
        draw_markers(&mut canvas, &[marker(20.0, 20.0, 10.0)], red, &null_progress());

        assert_eq!(*canvas.get_pixel(20, 20), red);
        assert_eq!(*canvas.get_pixel(32, 20), DEFAULT_COLOR);
    }

    #[test]
    fn off_canvas_markers_are_clipped() {
        let mut canvas = blank(10, 10);
        let painted = draw_markers(
            &mut canvas,
            &[marker(-500.0, 900.0, 40.0)],
            DEFAULT_COLOR,
            &null_progress(),
        );
        assert_eq!(painted, 1);
        assert!(canvas.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn oversized_markers_are_capped_to_the_canvas() {
        let mut canvas = blank(16, 12);
        let painted = draw_markers(
            &mut canvas,
            &[marker(8.0, 6.0, f64::INFINITY), marker(3.0, 3.0, 1e300)],
            DEFAULT_COLOR,
            &null_progress(),
        );

        assert_eq!(painted, 2);
        assert!(canvas.pixels().all(|p| *p == DEFAULT_COLOR));
    }

    #[test]
    fn far_off_canvas_centers_do_not_overflow() {
        let mut canvas = blank(10, 10);
        let painted = draw_markers(
            &mut canvas,
            &[
                marker(f64::MAX, -f64::MAX, 1e12),
                marker(-1e15, 5.0, 40.0),
            ],
            DEFAULT_COLOR,
            &null_progress(),
        );

        assert_eq!(painted, 2);
        assert!(canvas.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn nan_diameter_is_skipped() {
        let mut canvas = blank(10, 10);
        let painted = draw_markers(
            &mut canvas,
            &[marker(5.0, 5.0, f64::NAN)],
            DEFAULT_COLOR,
            &null_progress(),
        );

        assert_eq!(painted, 0);
        assert!(canvas.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn decodes_png_base_map() {
        let source = blank(3, 2);
        let mut bytes = Cursor::new(Vec::new());
        source.write_to(&mut bytes, image::ImageFormat::Png).unwrap();

        let canvas = decode_base_map(bytes.get_ref()).unwrap();
        assert_eq!(canvas.dimensions(), (3, 2));
    }

    #[test]
    fn rejects_undecodable_base_map() {
        assert!(matches!(
            decode_base_map(b"definitely not an image"),
            Err(RenderError::Image(_))
        ));
    }
}
