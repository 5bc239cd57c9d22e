//! CSV feed parsing.
//!
//! Columns are located by header name, so extra or reordered columns in
//! the feed are harmless. Any row with a missing or non-numeric required
//! value aborts the whole parse with a [`MalformedRecord`]; nothing is
//! coerced to zero.

use covid_map_dataset_models::{
    Dataset, DatasetKind, GeoPosition, MetricColumn, Record, RecordClass, columns,
};

use crate::{DatasetError, MalformedRecord};

/// Header positions of the columns a feed kind needs.
struct ColumnIndex {
    region: usize,
    province: Option<usize>,
    province_code: Option<usize>,
    latitude: usize,
    longitude: usize,
    metric: usize,
}

impl ColumnIndex {
    fn resolve(
        headers: &[String],
        kind: DatasetKind,
        metric: MetricColumn,
    ) -> Result<Self, DatasetError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DatasetError::MissingColumn {
                    column: name.to_owned(),
                })
        };

        let (province, province_code) = match kind {
            DatasetKind::Province => (
                Some(find(columns::PROVINCE)?),
                Some(find(columns::PROVINCE_CODE)?),
            ),
            DatasetKind::Region => (None, None),
        };

        Ok(Self {
            region: find(columns::REGION)?,
            province,
            province_code,
            latitude: find(columns::LATITUDE)?,
            longitude: find(columns::LONGITUDE)?,
            metric: find(metric.as_ref())?,
        })
    }
}

/// Parses feed text into a [`Dataset`] of the given kind and metric.
///
/// # Errors
///
/// * [`DatasetError::Csv`] if the text is not valid CSV.
/// * [`DatasetError::MissingColumn`] if a required header is absent.
/// * [`DatasetError::Malformed`] for the first row with a missing or
///   non-numeric required value.
pub fn parse_dataset(
    text: &str,
    kind: DatasetKind,
    metric: MetricColumn,
) -> Result<Dataset, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
        .collect();

    let index = ColumnIndex::resolve(&headers, kind, metric)?;
    let metric_name = metric.as_ref();

    let mut records = Vec::new();

    for (row, result) in reader.records().enumerate() {
        let raw = result?;
        let field = |idx: usize| raw.get(idx).map(str::trim);

        let region = required_text(row, columns::REGION, field(index.region))?;
        let value = required_f64(row, metric_name, field(index.metric))?;

        let record = match (index.province, index.province_code) {
            (Some(province_idx), Some(code_idx)) => {
                let province = field(province_idx).unwrap_or("");
                let code = field(code_idx).unwrap_or("");
                let class = RecordClass::for_province_row(code, province);

                let position = if class == RecordClass::Assigned {
                    Some(required_position(row, &field, &index)?)
                } else {
                    optional_position(row, &field, &index)?
                };

                Record {
                    region: region.to_owned(),
                    province: Some(province.to_owned()),
                    province_code: (class == RecordClass::Assigned).then(|| code.to_owned()),
                    position,
                    metric: value,
                    class,
                }
            }
            _ => Record::region(region, required_position(row, &field, &index)?, value),
        };

        records.push(record);
    }

    log::info!(
        "Parsed {} {kind} records (metric column `{metric_name}`)",
        records.len()
    );

    Ok(Dataset::new(kind, metric, records))
}

fn required_text<'a>(
    row: usize,
    column: &str,
    value: Option<&'a str>,
) -> Result<&'a str, MalformedRecord> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(MalformedRecord::new(row, column, "is missing")),
    }
}

fn required_f64(row: usize, column: &str, value: Option<&str>) -> Result<f64, MalformedRecord> {
    let text = required_text(row, column, value)?;
    parse_f64(row, column, text)
}

fn parse_f64(row: usize, column: &str, text: &str) -> Result<f64, MalformedRecord> {
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(MalformedRecord::new(
            row,
            column,
            format!("is not numeric ('{text}')"),
        )),
    }
}

fn required_position<'a>(
    row: usize,
    field: &impl Fn(usize) -> Option<&'a str>,
    index: &ColumnIndex,
) -> Result<GeoPosition, MalformedRecord> {
    let latitude = required_f64(row, columns::LATITUDE, field(index.latitude))?;
    let longitude = required_f64(row, columns::LONGITUDE, field(index.longitude))?;
    Ok(GeoPosition::new(latitude, longitude))
}

/// Unassigned rows usually carry empty coordinates. Present values must
/// still be numeric.
fn optional_position<'a>(
    row: usize,
    field: &impl Fn(usize) -> Option<&'a str>,
    index: &ColumnIndex,
) -> Result<Option<GeoPosition>, MalformedRecord> {
    let lat = field(index.latitude).filter(|v| !v.is_empty());
    let lng = field(index.longitude).filter(|v| !v.is_empty());
    match (lat, lng) {
        (Some(lat), Some(lng)) => Ok(Some(GeoPosition::new(
            parse_f64(row, columns::LATITUDE, lat)?,
            parse_f64(row, columns::LONGITUDE, lng)?,
        ))),
        _ => Ok(None),
    }
}
