#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Single-pass aggregation over a [`Dataset`].
//!
//! [`aggregate`] is pure: it walks the records once and returns an
//! [`AggregateResult`] holding the maximum among assigned records, the
//! per-region subtotals, and the totals of rows excluded from group
//! assignment. Console output is produced separately by [`report`] from
//! the dataset and the finished result.
//!
//! Subtotals are a streaming group-by: the feed is expected to list each
//! region's rows contiguously. The scan does not sort; a region that shows
//! up again after a different one is rejected with
//! [`AggregateError::NonContiguousGroup`].

pub mod report;

use std::collections::BTreeSet;

use covid_map_dataset::MalformedRecord;
use covid_map_dataset_models::{Dataset, RecordClass};
use serde::Serialize;

/// Errors that can occur while aggregating a dataset.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    /// A record's metric is unusable.
    #[error(transparent)]
    Malformed(#[from] MalformedRecord),

    /// The input is not grouped by region.
    #[error(
        "Region `{region}` reappears at row {row} after a different region; \
         rows must be grouped by region"
    )]
    NonContiguousGroup {
        /// The region that reappeared.
        region: String,
        /// Zero-based row of the reappearance.
        row: usize,
    },
}

/// The largest metric among assigned records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Maximum {
    /// Display name of the record (province, or region for region data).
    pub name: String,
    /// Its metric value.
    pub value: f64,
    /// Its zero-based row index.
    pub row: usize,
}

/// Subtotal over one contiguous run of rows sharing a region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSubtotal {
    pub region: String,
    /// Row index of the first record in the run.
    pub first_row: usize,
    /// Number of records in the run, assigned or not.
    pub record_count: usize,
    /// Sum of every metric in the run.
    pub total: f64,
}

impl GroupSubtotal {
    /// Row indices covered by this group.
    #[must_use]
    pub const fn rows(&self) -> std::ops::Range<usize> {
        self.first_row..self.first_row + self.record_count
    }
}

/// Result of one full scan. Read-only; rescan to refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    /// `None` when no record qualifies.
    pub max: Option<Maximum>,
    /// Region subtotals in feed order.
    pub groups: Vec<GroupSubtotal>,
    /// Residents counted outside their own region.
    pub out_of_region_total: f64,
    /// Cases not yet attributed to a province.
    pub pending_total: f64,
    /// Sum of every record's metric.
    pub grand_total: f64,
}

impl AggregateResult {
    /// The maximum value, or `0.0` when nothing qualified.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.max.as_ref().map_or(0.0, |m| m.value)
    }

    /// Total of rows excluded from group assignment.
    #[must_use]
    pub fn unassigned_total(&self) -> f64 {
        self.out_of_region_total + self.pending_total
    }

    /// `true` when marker sizes cannot be normalized (no positive maximum).
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.max_value() <= 0.0
    }

    #[must_use]
    pub fn group(&self, region: &str) -> Option<&GroupSubtotal> {
        self.groups.iter().find(|g| g.region == region)
    }
}

/// Scans `dataset` once.
///
/// The first assigned record seeds the maximum and only a strictly greater
/// metric replaces it, so ties keep the first occurrence.
///
/// # Errors
///
/// * [`AggregateError::Malformed`] if a metric is NaN or infinite.
/// * [`AggregateError::NonContiguousGroup`] if the rows are not grouped
///   by region.
pub fn aggregate(dataset: &Dataset) -> Result<AggregateResult, AggregateError> {
    let mut max: Option<Maximum> = None;
    let mut groups: Vec<GroupSubtotal> = Vec::new();
    let mut seen_regions: BTreeSet<&str> = BTreeSet::new();
    let mut out_of_region_total = 0.0;
    let mut pending_total = 0.0;
    let mut grand_total = 0.0;

    for (row, record) in dataset.records.iter().enumerate() {
        if !record.metric.is_finite() {
            return Err(MalformedRecord::new(
                row,
                dataset.metric.as_ref(),
                format!("is not a finite number ({})", record.metric),
            )
            .into());
        }

        match groups.last_mut() {
            Some(current) if current.region == record.region => {
                current.record_count += 1;
                current.total += record.metric;
            }
            _ => {
                if !seen_regions.insert(record.region.as_str()) {
                    return Err(AggregateError::NonContiguousGroup {
                        region: record.region.clone(),
                        row,
                    });
                }
                groups.push(GroupSubtotal {
                    region: record.region.clone(),
                    first_row: row,
                    record_count: 1,
                    total: record.metric,
                });
            }
        }

        grand_total += record.metric;

        match record.class {
            RecordClass::Assigned => {
                if max.as_ref().is_none_or(|m| record.metric > m.value) {
                    max = Some(Maximum {
                        name: record.display_name().to_owned(),
                        value: record.metric,
                        row,
                    });
                }
            }
            RecordClass::OutOfRegion => out_of_region_total += record.metric,
            RecordClass::PendingAssignment => pending_total += record.metric,
        }
    }

    if let Some(m) = &max {
        log::debug!(
            "Aggregated {} records in {} groups; max {} = {}",
            dataset.len(),
            groups.len(),
            m.name,
            m.value
        );
    }

    Ok(AggregateResult {
        max,
        groups,
        out_of_region_total,
        pending_total,
        grand_total,
    })
}
