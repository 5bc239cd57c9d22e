#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Chooses which feed and metric column a run reads.
//!
//! The user picks province or region data; for regions, either the latest
//! cumulative total or the new positives of one day. The day is checked by
//! [`date::DateRules`] against the first published date, today's date in
//! the publisher's timezone, and the daily publication hour.

pub mod date;

use chrono::NaiveDate;
use covid_map_dataset::DatasetRequest;
use covid_map_dataset_models::{DatasetKind, MetricColumn};
use serde::{Deserialize, Serialize};

pub use date::{DateRules, DateValidationError};

/// A menu answer that is not one of the accepted values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChoiceError {
    #[error("You can only enter 'p' for the provinces or 'r' for the regions")]
    Kind,
    #[error("You can only enter 'y' or 'n'")]
    YesNo,
}

/// Feed URL templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedUrls {
    /// Latest province snapshot.
    pub province_latest: String,
    /// Latest region snapshot.
    pub region_latest: String,
    /// Dated region snapshots; `YYYYMMDD.csv` is appended.
    pub region_daily_prefix: String,
}

/// The dataset a run will fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetSelection {
    /// Latest cumulative totals per province.
    Province,
    /// Latest cumulative totals per region.
    RegionTotal,
    /// New positives per region on one day.
    RegionDaily(NaiveDate),
}

impl DatasetSelection {
    /// Resolves the feed URL, kind, and metric column.
    #[must_use]
    pub fn request(&self, feeds: &FeedUrls) -> DatasetRequest {
        match self {
            Self::Province => DatasetRequest {
                kind: DatasetKind::Province,
                metric: MetricColumn::TotalCases,
                url: feeds.province_latest.clone(),
            },
            Self::RegionTotal => DatasetRequest {
                kind: DatasetKind::Region,
                metric: MetricColumn::TotalCases,
                url: feeds.region_latest.clone(),
            },
            Self::RegionDaily(date) => DatasetRequest {
                kind: DatasetKind::Region,
                metric: MetricColumn::NewPositives,
                url: format!(
                    "{}{}.csv",
                    feeds.region_daily_prefix,
                    date.format("%Y%m%d")
                ),
            },
        }
    }
}

impl std::fmt::Display for DatasetSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Province => write!(f, "province totals"),
            Self::RegionTotal => write!(f, "region totals"),
            Self::RegionDaily(date) => write!(f, "region new cases on {date}"),
        }
    }
}

/// Parses the dataset-kind menu answer (`p` or `r`).
///
/// # Errors
///
/// Returns [`ChoiceError::Kind`] for anything else.
pub fn parse_kind_choice(input: &str) -> Result<DatasetKind, ChoiceError> {
    match input.trim() {
        "p" => Ok(DatasetKind::Province),
        "r" => Ok(DatasetKind::Region),
        _ => Err(ChoiceError::Kind),
    }
}

/// Parses the region sub-choice: `total`, or a `YYYYMMDD` date validated
/// against `rules` at instant `now`.
///
/// # Errors
///
/// Returns [`DateValidationError`] if the input is neither `total` nor an
/// acceptable date.
pub fn parse_region_choice(
    input: &str,
    rules: &DateRules,
    now: chrono::DateTime<chrono_tz::Tz>,
) -> Result<DatasetSelection, DateValidationError> {
    let input = input.trim();
    if input == "total" {
        return Ok(DatasetSelection::RegionTotal);
    }
    rules.validate(input, now).map(DatasetSelection::RegionDaily)
}

/// Parses the re-run answer (`y` or `n`).
///
/// # Errors
///
/// Returns [`ChoiceError::YesNo`] for anything else.
pub fn parse_yes_no(input: &str) -> Result<bool, ChoiceError> {
    match input.trim() {
        "y" => Ok(true),
        "n" => Ok(false),
        _ => Err(ChoiceError::YesNo),
    }
}
