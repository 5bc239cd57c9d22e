#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record types for the Civil Protection COVID-19 CSV feeds.
//!
//! A [`Dataset`] is an ordered list of [`Record`]s parsed from either the
//! province-level or the region-level feed, together with the
//! [`MetricColumn`] that was selected for the run. Order is the feed's
//! insertion order and is never re-sorted.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// CSV column names used by the feeds.
pub mod columns {
    /// Region name (`"Lombardia"`).
    pub const REGION: &str = "denominazione_regione";
    /// Province name (province feed only).
    pub const PROVINCE: &str = "denominazione_provincia";
    /// Two-letter province code. Empty for rows not assigned to a province.
    pub const PROVINCE_CODE: &str = "sigla_provincia";
    /// Latitude (WGS84).
    pub const LATITUDE: &str = "lat";
    /// Longitude (WGS84).
    pub const LONGITUDE: &str = "long";
}

/// Province name the feed uses for residents found positive outside their
/// own region.
pub const OUT_OF_REGION_PROVINCE: &str = "Fuori Regione / Provincia Autonoma";

/// Granularity of a feed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatasetKind {
    /// One row per province, plus unassigned placeholder rows per region.
    Province,
    /// One row per region.
    Region,
}

/// The numeric column selected as the metric for a run.
///
/// `Display`/`AsRef<str>` yield the CSV column name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum MetricColumn {
    /// Cumulative case count.
    #[serde(rename = "totale_casi")]
    #[strum(serialize = "totale_casi")]
    TotalCases,
    /// New positives for a single day (dated region feed only).
    #[serde(rename = "nuovi_positivi")]
    #[strum(serialize = "nuovi_positivi")]
    NewPositives,
}

impl MetricColumn {
    /// Human-readable description used in report lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TotalCases => "cases",
            Self::NewPositives => "new cases",
        }
    }
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
}

impl GeoPosition {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Whether a row is attributed to a specific sub-region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordClass {
    /// A province with a code, or any region-level row.
    Assigned,
    /// Residents of the region found positive elsewhere.
    OutOfRegion,
    /// Cases not yet attributed to any province of the region.
    PendingAssignment,
}

impl RecordClass {
    /// Classifies a province-feed row from its code and name.
    #[must_use]
    pub fn for_province_row(province_code: &str, province: &str) -> Self {
        if !province_code.trim().is_empty() {
            Self::Assigned
        } else if province.trim() == OUT_OF_REGION_PROVINCE {
            Self::OutOfRegion
        } else {
            Self::PendingAssignment
        }
    }

    /// Returns `true` for rows excluded from group assignment.
    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        matches!(self, Self::OutOfRegion | Self::PendingAssignment)
    }
}

/// One parsed CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Region name.
    pub region: String,
    /// Province name. `None` for region-level rows.
    pub province: Option<String>,
    /// Province code. `None` for region-level rows and unassigned rows.
    pub province_code: Option<String>,
    /// Coordinates. Only unassigned province rows may lack them.
    pub position: Option<GeoPosition>,
    /// Value of the selected metric column.
    pub metric: f64,
    /// Assignment class.
    pub class: RecordClass,
}

impl Record {
    /// Builds an assigned region-level record.
    #[must_use]
    pub fn region(region: impl Into<String>, position: GeoPosition, metric: f64) -> Self {
        Self {
            region: region.into(),
            province: None,
            province_code: None,
            position: Some(position),
            metric,
            class: RecordClass::Assigned,
        }
    }

    /// Builds an assigned province-level record.
    #[must_use]
    pub fn province(
        region: impl Into<String>,
        province: impl Into<String>,
        province_code: impl Into<String>,
        position: GeoPosition,
        metric: f64,
    ) -> Self {
        Self {
            region: region.into(),
            province: Some(province.into()),
            province_code: Some(province_code.into()),
            position: Some(position),
            metric,
            class: RecordClass::Assigned,
        }
    }

    /// Builds an unassigned province-feed placeholder record.
    #[must_use]
    pub fn unassigned(region: impl Into<String>, province: impl Into<String>, metric: f64) -> Self {
        let province = province.into();
        let class = RecordClass::for_province_row("", &province);
        Self {
            region: region.into(),
            province: Some(province),
            province_code: None,
            position: None,
            metric,
            class,
        }
    }

    /// Name shown in reports: the province when present, else the region.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.province.as_deref().unwrap_or(&self.region)
    }

    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        matches!(self.class, RecordClass::Assigned)
    }
}

/// An ordered sequence of records sharing one schema and metric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Feed granularity.
    pub kind: DatasetKind,
    /// Selected metric column.
    pub metric: MetricColumn,
    /// Rows in feed order.
    pub records: Vec<Record>,
}

impl Dataset {
    #[must_use]
    pub const fn new(kind: DatasetKind, metric: MetricColumn, records: Vec<Record>) -> Self {
        Self {
            kind,
            metric,
            records,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
