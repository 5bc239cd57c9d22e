#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Retrieval and parsing of the Civil Protection COVID-19 CSV feeds.
//!
//! [`http`] downloads feed text and the base map bytes, [`parse`] turns
//! CSV text into a typed [`Dataset`], and [`fetch_dataset`] chains the two
//! for a resolved [`DatasetRequest`].

pub mod http;
pub mod parse;
pub mod progress;

use std::sync::Arc;

use covid_map_dataset_models::{Dataset, DatasetKind, MetricColumn};

use crate::progress::ProgressCallback;

/// A row that is missing a required field or holds a non-numeric value
/// where a number is required.
///
/// `row` is the zero-based index of the data row (the header is not
/// counted), which is also the record's index in [`Dataset::records`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed record at row {row}: column `{column}` {problem}")]
pub struct MalformedRecord {
    /// Zero-based data row index.
    pub row: usize,
    /// Offending column.
    pub column: String,
    /// What is wrong with it.
    pub problem: String,
}

impl MalformedRecord {
    #[must_use]
    pub fn new(row: usize, column: &str, problem: impl Into<String>) -> Self {
        Self {
            row,
            column: column.to_owned(),
            problem: problem.into(),
        }
    }
}

/// Errors that can occur while fetching or parsing a feed.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// HTTP request failed, timed out, or returned a non-2xx status.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The CSV text could not be tokenized.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A column required by the feed schema is absent from the header.
    #[error("CSV header is missing required column `{column}`")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },

    /// A data row is malformed.
    #[error(transparent)]
    Malformed(#[from] MalformedRecord),
}

impl DatasetError {
    /// Returns `true` when the failure happened on the network side
    /// (connection, timeout, status code, or body decoding).
    #[must_use]
    pub const fn is_network_failure(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

/// A fully resolved feed to download: where, what shape, which metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRequest {
    /// Feed granularity.
    pub kind: DatasetKind,
    /// Column to read as the metric.
    pub metric: MetricColumn,
    /// CSV URL.
    pub url: String,
}

/// Downloads and parses the feed described by `request`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the download fails or any row is malformed.
pub async fn fetch_dataset(
    client: &reqwest::Client,
    request: &DatasetRequest,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Dataset, DatasetError> {
    progress.set_message(format!("Downloading {} feed", request.kind));
    let text = http::fetch_text(client, &request.url).await?;

    progress.set_message(format!("Parsing {} feed", request.kind));
    let dataset = parse::parse_dataset(&text, request.kind, request.metric)?;

    progress.finish(format!(
        "{} feed: {} records ({})",
        request.kind,
        dataset.len(),
        request.metric
    ));

    Ok(dataset)
}
