use crate::error::AnalysisError;
use crate::types::{RawRow, Record};
use crate::util::{parse_f64_safe, parse_label, parse_period_safe};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    /// Lines the CSV reader could not turn into a row at all.
    pub parse_errors: usize,
    /// Cells that were filled in but held an unusable value; they load as missing.
    pub invalid_cells: usize,
}

pub fn load_records(path: impl AsRef<Path>) -> Result<(Vec<Record>, LoadReport), AnalysisError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let (records, report) = read_records(file)?;
    info!(
        path = %path.display(),
        rows = report.total_rows,
        parse_errors = report.parse_errors,
        invalid_cells = report.invalid_cells,
        "dataset loaded"
    );
    Ok((records, report))
}

pub fn read_records<R: Read>(input: R) -> Result<(Vec<Record>, LoadReport), AnalysisError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);
    let mut report = LoadReport::default();
    let mut records = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "skipping unreadable row");
                report.parse_errors += 1;
                continue;
            }
        };

        // A cell that is present but fails to parse counts against the row;
        // it still loads, just with that field missing.
        let mut invalid = 0usize;
        let mut checked = |raw: &Option<String>, parsed: Option<f64>| {
            if parsed.is_none() && raw.as_deref().is_some_and(|s| !s.trim().is_empty()) {
                invalid += 1;
            }
            parsed
        };
        let tourism = checked(&row.tourism_activity, parse_f64_safe(row.tourism_activity.as_deref()));
        let price = checked(&row.avg_meter_price, parse_f64_safe(row.avg_meter_price.as_deref()));
        let transactions = checked(
            &row.transactions_count,
            parse_f64_safe(row.transactions_count.as_deref()).filter(|v| *v >= 0.0),
        );
        let period = parse_period_safe(row.year_month.as_deref());
        if period.is_none() && row.year_month.as_deref().is_some_and(|s| !s.trim().is_empty()) {
            invalid += 1;
        }
        report.invalid_cells += invalid;

        records.push(Record {
            area: parse_label(row.area_name),
            property_type: parse_label(row.property_type),
            period,
            tourism,
            price,
            transactions,
        });
    }

    Ok((records, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Period;

    const SAMPLE: &str = "\
area_name_en,property_type_en,year_month,tourism_activity,avg_meter_price,transactions_count,extra
Marina,Unit,2022-01,120.5,\"15,000\",4,x
Marina,Villa,2022-02,,14000,2,y
Jumeirah, ,2021-12-01,80,9000,-1,z
Deira,Unit,not-a-date,50,abc,1,w
";

    #[test]
    fn reads_and_parses_rows() {
        let (records, report) = read_records(SAMPLE.as_bytes()).unwrap();
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.parse_errors, 0);
        assert_eq!(records.len(), 4);

        let first = &records[0];
        assert_eq!(first.area.as_deref(), Some("Marina"));
        assert_eq!(first.period, Some(Period { year: 2022, month: 1 }));
        assert_eq!(first.price, Some(15_000.0));
        assert_eq!(first.transactions, Some(4.0));
    }

    #[test]
    fn bad_cells_load_as_missing() {
        let (records, report) = read_records(SAMPLE.as_bytes()).unwrap();
        // empty tourism is simply missing, not invalid
        assert_eq!(records[1].tourism, None);
        // blank property type, negative transactions
        assert_eq!(records[2].property_type, None);
        assert_eq!(records[2].transactions, None);
        // unparseable date and price
        assert_eq!(records[3].period, None);
        assert_eq!(records[3].price, None);
        assert_eq!(report.invalid_cells, 3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_records(dir.path().join("missing.csv")).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        let (records, _) = load_records(&path).unwrap();
        assert_eq!(records.len(), 4);
    }
}
