//! Feature Table Output

use crate::error::BatchError;
use std::io::Write;
use std::path::Path;
use stenosis_features::FeatureCatalog;
use tracing::info;

/// One evaluated case
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub case_id: String,
    pub values: Vec<f64>,
}

/// CSV writer with a `case_id` column followed by the catalog names
pub struct FeatureTable<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl FeatureTable<std::fs::File> {
    /// Create the output file and write the header
    pub fn create(path: &Path, catalog: &FeatureCatalog) -> Result<Self, BatchError> {
        let table = Self::new(csv::Writer::from_path(path)?, catalog)?;
        info!("Writing feature table to {}", path.display());
        Ok(table)
    }
}

impl<W: Write> FeatureTable<W> {
    /// Wrap any writer and write the header
    pub fn from_writer(writer: W, catalog: &FeatureCatalog) -> Result<Self, BatchError> {
        Self::new(csv::Writer::from_writer(writer), catalog)
    }

    fn new(mut writer: csv::Writer<W>, catalog: &FeatureCatalog) -> Result<Self, BatchError> {
        writer.write_field("case_id")?;
        for name in catalog.names() {
            writer.write_field(name)?;
        }
        writer.write_record(None::<&[u8]>)?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn write_row(&mut self, row: &FeatureRow) -> Result<(), BatchError> {
        self.writer.write_field(&row.case_id)?;
        for value in &row.values {
            self.writer.write_field(value.to_string())?;
        }
        self.writer.write_record(None::<&[u8]>)?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and return the underlying writer
    pub fn finish(self) -> Result<W, BatchError> {
        self.writer
            .into_inner()
            .map_err(|e| BatchError::Io(e.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stenosis_features::{FeatureRequest, LesionParams, Measure};

    fn small_catalog() -> FeatureCatalog {
        FeatureCatalog::new(vec![
            FeatureRequest::new("MLA", Measure::MinimumLumenArea, LesionParams::default()),
            FeatureRequest::new("len_PB40", Measure::LesionLength, LesionParams::default()),
        ])
    }

    #[test]
    fn test_header_and_rows() {
        let mut table = FeatureTable::from_writer(Vec::new(), &small_catalog()).unwrap();
        table
            .write_row(&FeatureRow {
                case_id: "p01".to_string(),
                values: vec![2.5, 0.0],
            })
            .unwrap();
        assert_eq!(table.rows(), 1);

        let bytes = table.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "case_id,MLA,len_PB40\np01,2.5,0\n");
    }

    #[test]
    fn test_empty_table_has_header() {
        let table = FeatureTable::from_writer(Vec::new(), &small_catalog()).unwrap();
        let text = String::from_utf8(table.finish().unwrap()).unwrap();
        assert_eq!(text, "case_id,MLA,len_PB40\n");
    }
}
