//! Console report formatting.
//!
//! Consumes a dataset and its finished [`AggregateResult`] and returns the
//! lines to print. Nothing here writes to the terminal.

use covid_map_dataset_models::{Dataset, DatasetKind, RecordClass};

use crate::AggregateResult;

const RULE: &str = "-----------------------------------------------------------------";

/// Formats the report appropriate for the dataset's kind.
#[must_use]
pub fn render_report(dataset: &Dataset, result: &AggregateResult) -> Vec<String> {
    match dataset.kind {
        DatasetKind::Province => province_report(dataset, result),
        DatasetKind::Region => region_report(dataset, result),
    }
}

/// One block per region listing its provinces, unassigned rows and
/// subtotal, followed by the national summary.
///
/// `result` must come from aggregating `dataset`. A group whose rows fall
/// outside the dataset is logged and left out.
#[must_use]
pub fn province_report(dataset: &Dataset, result: &AggregateResult) -> Vec<String> {
    let label = dataset.metric.label();
    let mut lines = Vec::new();

    for group in &result.groups {
        let Some(records) = dataset.records.get(group.rows()) else {
            log::warn!(
                "Region {} covers rows {:?} but the dataset has {} records",
                group.region,
                group.rows(),
                dataset.len()
            );
            continue;
        };

        lines.push(format!("REGION: {}", group.region));
        lines.push(String::new());

        for record in records {
            let line = match record.class {
                RecordClass::Assigned => format!(
                    "In the province of {} there have been {} {label}.",
                    record.display_name(),
                    record.metric
                ),
                RecordClass::OutOfRegion => format!(
                    "{} residents found positive outside of the region: {}",
                    record.region, record.metric
                ),
                RecordClass::PendingAssignment => format!(
                    "Still to be assigned in the region {}: {} {label}",
                    record.region, record.metric
                ),
            };
            lines.push(line);
        }

        lines.push(format!(
            "The total amount of {label} for the region {} is {}",
            group.region, group.total
        ));
        lines.push(RULE.to_owned());
        lines.push(String::new());
    }

    lines.push(format!(
        "Total {label} outside of the regions or still to be assigned: {}",
        result.unassigned_total()
    ));
    lines.push(match &result.max {
        Some(max) => format!(
            "The highest no. of {label} throughout all provinces is found in the province of {}: {} {label}",
            max.name, max.value
        ),
        None => format!("No province reported any {label}."),
    });
    lines.push(format!(
        "The number of {label} in the entire country is: {}",
        result.grand_total
    ));

    lines
}

/// One line per region followed by the maximum and national total.
#[must_use]
pub fn region_report(dataset: &Dataset, result: &AggregateResult) -> Vec<String> {
    let label = dataset.metric.label();
    let mut lines: Vec<String> = dataset
        .records
        .iter()
        .map(|record| {
            format!(
                "In the region {} there have been {} {label}.",
                record.display_name(),
                record.metric
            )
        })
        .collect();

    lines.push(String::new());
    lines.push(RULE.to_owned());
    lines.push(match &result.max {
        Some(max) => format!(
            "The highest no. of {label} throughout all regions is found in {}: {} {label}",
            max.name, max.value
        ),
        None => format!("No region reported any {label}."),
    });
    lines.push(format!(
        "The number of {label} in the entire country is: {}",
        result.grand_total
    ));

    lines
}

#[cfg(test)]
mod tests {
    use covid_map_dataset_models::{GeoPosition, MetricColumn, OUT_OF_REGION_PROVINCE, Record};

    use super::*;
    use crate::aggregate;

    const POS: GeoPosition = GeoPosition::new(42.0, 13.0);

    #[test]
    fn province_report_lists_blocks_and_summary() {
        let dataset = Dataset::new(
            DatasetKind::Province,
            MetricColumn::TotalCases,
            vec![
                Record::province("Abruzzo", "Teramo", "TE", POS, 50.0),
                Record::unassigned("Abruzzo", OUT_OF_REGION_PROVINCE, 2.0),
                Record::unassigned("Abruzzo", "In fase di definizione/aggiornamento", 3.0),
                Record::province("Basilicata", "Matera", "MT", POS, 8.0),
            ],
        );
        let result = aggregate(&dataset).unwrap();
        let lines = render_report(&dataset, &result);

        assert_eq!(lines[0], "REGION: Abruzzo");
        assert!(lines.contains(&"In the province of Teramo there have been 50 cases.".to_owned()));
        assert!(
            lines.contains(&"Abruzzo residents found positive outside of the region: 2".to_owned())
        );
        assert!(lines.contains(&"Still to be assigned in the region Abruzzo: 3 cases".to_owned()));
        assert!(lines.contains(&"The total amount of cases for the region Abruzzo is 55".to_owned()));
        assert!(lines.contains(&"REGION: Basilicata".to_owned()));
        assert!(lines.contains(
            &"Total cases outside of the regions or still to be assigned: 5".to_owned()
        ));
        assert_eq!(
            lines[lines.len() - 2],
            "The highest no. of cases throughout all provinces is found in the province of Teramo: 50 cases"
        );
        assert_eq!(
            lines[lines.len() - 1],
            "The number of cases in the entire country is: 63"
        );
    }

    #[test]
    fn region_report_uses_metric_label() {
        let dataset = Dataset::new(
            DatasetKind::Region,
            MetricColumn::NewPositives,
            vec![
                Record::region("Lazio", POS, 120.0),
                Record::region("Molise", POS, 3.0),
            ],
        );
        let result = aggregate(&dataset).unwrap();
        let lines = render_report(&dataset, &result);

        assert_eq!(lines[0], "In the region Lazio there have been 120 new cases.");
        assert_eq!(lines[1], "In the region Molise there have been 3 new cases.");
        assert!(lines.contains(
            &"The highest no. of new cases throughout all regions is found in Lazio: 120 new cases"
                .to_owned()
        ));
        assert_eq!(
            lines.last().unwrap(),
            "The number of new cases in the entire country is: 123"
        );
    }

    #[test]
    fn mismatched_result_skips_out_of_range_groups() {
        let full = Dataset::new(
            DatasetKind::Province,
            MetricColumn::TotalCases,
            vec![
                Record::province("Abruzzo", "Teramo", "TE", POS, 50.0),
                Record::province("Basilicata", "Matera", "MT", POS, 8.0),
            ],
        );
        let result = aggregate(&full).unwrap();
        let truncated = Dataset::new(
            DatasetKind::Province,
            MetricColumn::TotalCases,
            vec![Record::province("Abruzzo", "Teramo", "TE", POS, 50.0)],
        );

        let lines = province_report(&truncated, &result);

        assert_eq!(lines[0], "REGION: Abruzzo");
        assert!(!lines.contains(&"REGION: Basilicata".to_owned()));
    }

    #[test]
    fn empty_dataset_reports_no_maximum() {
        let dataset = Dataset::new(DatasetKind::Region, MetricColumn::TotalCases, Vec::new());
        let result = aggregate(&dataset).unwrap();
        let lines = region_report(&dataset, &result);
        assert!(lines.contains(&"No region reported any cases.".to_owned()));
    }
}
