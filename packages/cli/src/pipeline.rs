//! One complete render: fetch, aggregate, report, draw, save.
//!
//! The base map is downloaded fresh on every run so each run paints on a
//! clean canvas. The aggregate is finished before the first marker is
//! sized.

use std::path::{Path, PathBuf};
use std::time::Instant;

use covid_map_aggregate::{aggregate, report::render_report};
use covid_map_cli_utils::{IndicatifProgress, MultiProgress};
use covid_map_config::Settings;
use covid_map_dataset::fetch_dataset;
use covid_map_render::{canvas, render_markers};
use covid_map_selector::DatasetSelection;

/// Runs the pipeline for `selection` and writes the map to `output`.
///
/// Returns the path of the saved PNG.
///
/// # Errors
///
/// Returns an error if a download fails, the feed is malformed, the base
/// map cannot be decoded, or the output cannot be written.
#[allow(clippy::future_not_send)]
pub async fn run(
    settings: &Settings,
    client: &reqwest::Client,
    selection: DatasetSelection,
    output: &Path,
    multi: &MultiProgress,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let request = selection.request(&settings.feeds);
    log::info!("Rendering {selection} from {}", request.url);

    let spinner = IndicatifProgress::download_spinner(multi, "Downloading base map");
    let base_map = canvas::fetch_base_map(client, &settings.map_url).await;
    spinner.finish_and_clear();
    let mut map = base_map?;

    let progress = IndicatifProgress::download_spinner(multi, "Downloading case data");
    let dataset = fetch_dataset(client, &request, &progress).await;
    if dataset.is_err() {
        progress.finish_and_clear();
    }
    let dataset = dataset?;

    let result = aggregate(&dataset)?;
    let lines = render_report(&dataset, &result);
    multi.suspend(|| {
        for line in &lines {
            println!("{line}");
        }
    });

    let progress = IndicatifProgress::markers_bar(multi, "Drawing markers");
    render_markers(
        &mut map,
        &dataset,
        &result,
        &settings.projector,
        &settings.marker_style,
        &progress,
    );

    canvas::save_canvas(&map, output)?;
    log::info!(
        "Finished {selection} in {:.1}s",
        start.elapsed().as_secs_f64()
    );

    Ok(output.to_path_buf())
}
