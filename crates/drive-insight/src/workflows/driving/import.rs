use super::domain::{parse_numeric, DrivingRecord, RiskCategory, RiskCounters};
use std::io::Read;
use std::path::Path;

const VEHICLE_HEADERS: [&str; 4] = ["vehicleNumber", "vehicle_number", "vehicle", "차량번호"];
const DISTANCE_HEADERS: [&str; 4] = ["totalDistance", "total_distance", "distance", "총주행거리"];

#[derive(Debug, thiserror::Error)]
pub enum BulkImportError {
    #[error("failed to read driving export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid driving export CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("driving export has no recognizable columns")]
    NoRecognizedColumns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Vehicle,
    Distance,
    Risk(RiskCategory),
    Ignored,
}

impl Column {
    fn from_header(header: &str) -> Self {
        let header = header.trim();
        if VEHICLE_HEADERS.iter().any(|name| name.eq_ignore_ascii_case(header)) {
            Column::Vehicle
        } else if DISTANCE_HEADERS.iter().any(|name| name.eq_ignore_ascii_case(header)) {
            Column::Distance
        } else {
            RiskCategory::parse(header).map_or(Column::Ignored, Column::Risk)
        }
    }
}

/// Reads multi-vehicle CSV exports, one [`DrivingRecord`] per row. Cells use
/// the same zero-fallback parsing as the input form.
pub struct BulkImporter;

impl BulkImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<DrivingRecord>, BulkImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<DrivingRecord>, BulkImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<Column> = csv_reader
            .headers()?
            .iter()
            .map(Column::from_header)
            .collect();
        if columns.iter().all(|column| *column == Column::Ignored) {
            return Err(BulkImportError::NoRecognizedColumns);
        }

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            let mut vehicle = String::new();
            let mut distance = 0.0;
            let mut risks = RiskCounters::new();

            for (column, cell) in columns.iter().zip(row.iter()) {
                match column {
                    Column::Vehicle => vehicle = cell.to_string(),
                    Column::Distance => distance = parse_numeric(cell),
                    Column::Risk(category) => risks.set(*category, parse_numeric(cell)),
                    Column::Ignored => {}
                }
            }

            records.push(DrivingRecord::new(vehicle, distance, risks));
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_resolve_to_columns() {
        assert_eq!(Column::from_header(" vehicleNumber "), Column::Vehicle);
        assert_eq!(Column::from_header("총주행거리"), Column::Distance);
        assert_eq!(
            Column::from_header("급U턴"),
            Column::Risk(RiskCategory::SuddenUTurn)
        );
        assert_eq!(Column::from_header("memo"), Column::Ignored);
    }

    #[test]
    fn rejects_exports_without_known_columns() {
        let csv = "memo,notes\nhello,world\n";
        let err = BulkImporter::from_reader(csv.as_bytes()).expect_err("no usable columns");
        assert!(matches!(err, BulkImportError::NoRecognizedColumns));
    }
}
