use std::{fs::File, path::Path};

use csv::DeserializeRecordsIntoIter;

use crate::importer::record::CsvCodeRow;

#[derive(thiserror::Error, Debug)]
pub enum OpenCsvError {
    #[error("Could not open the csv file: {0}")]
    CouldNotOpenCsv(#[from] csv::Error),
}

/// Lazy, single-pass reader over the RAMQ csv export.
///
/// The first line of the file is the header and drives the field mapping,
/// so column order in the file does not matter.
pub struct CodeCsvSource {
    rows: DeserializeRecordsIntoIter<File, CsvCodeRow>,
}

impl CodeCsvSource {
    pub fn open(path: &Path) -> Result<Self, OpenCsvError> {
        let reader = csv::Reader::from_path(path)?;
        Ok(Self { rows: reader.into_deserialize() })
    }
}

impl Iterator for CodeCsvSource {
    type Item = Result<CsvCodeRow, csv::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    const HEADER: &str = "billing_code,place,description,unit_require,tariff_value,extra_unit_value,source_file,top_level,level1_group,level2_group,leaf,indicators,anchor_id";

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file
    }

    #[test]
    fn reads_rows_in_file_order() {
        let file = write_csv(&[
            "ABC123,,Consultation,FALSE,42.50,1.25,ramq_all.csv,A,A1,A1.2,leaf,IND,anchor-1",
            "XYZ9,O,Visit,TRUE,10.00,0.00,ramq_all.csv,B,B1,B1.2,leaf,IND,anchor-2",
        ]);

        let rows: Vec<CsvCodeRow> =
            CodeCsvSource::open(file.path()).unwrap().map(|row| row.unwrap()).collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].billing_code, "ABC123");
        assert_eq!(rows[0].place, "");
        assert_eq!(rows[1].billing_code, "XYZ9");
        assert_eq!(rows[1].place, "O");
    }

    #[test]
    fn empty_cells_stay_empty_strings() {
        let file = write_csv(&["ABC123,,,,,,,,,,,,"]);

        let rows: Vec<CsvCodeRow> =
            CodeCsvSource::open(file.path()).unwrap().map(|row| row.unwrap()).collect();

        assert_eq!(rows[0].description, "");
        assert_eq!(rows[0].unit_require, "");
        assert_eq!(rows[0].anchor_id, "");
    }

    #[test]
    fn missing_expected_column_errors_per_row() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "billing_code,place").unwrap();
        writeln!(file, "ABC123,O").unwrap();

        let mut source = CodeCsvSource::open(file.path()).unwrap();

        assert!(source.next().unwrap().is_err());
    }

    #[test]
    fn missing_file_fails_to_open() {
        assert!(CodeCsvSource::open(Path::new("/definitely/not/here.csv")).is_err());
    }
}
