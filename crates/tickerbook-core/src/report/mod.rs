//! # Workbook Output
//!
//! [`layout`] turns a [`ReportBundle`] into nine ordered sheets; the
//! workbook writer renders them with `rust_xlsxwriter`. Categories that came
//! back unavailable still get their sheet, holding an `Error` header and the
//! reason.

pub mod layout;
mod workbook;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::aggregator::ReportBundle;

pub use layout::{Cell, CellStyle, CellValue, NumberStyle, Row, Sheet};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write workbook {}: {source}", path.display())]
    Xlsx {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

/// Lays out every category and saves the workbook at `path`, replacing any
/// previous file.
pub fn write_workbook(bundle: &ReportBundle, path: &Path) -> Result<(), ReportError> {
    let sheets = layout::layout(bundle);
    workbook::save(&sheets, path).map_err(|source| ReportError::Xlsx {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CalendarDate, Symbol};

    #[test]
    fn all_unavailable_bundle_still_writes_a_workbook() {
        let temp = tempfile::tempdir().expect("temp dir");
        let path = temp.path().join("ZZZZ.xlsx");
        let bundle = ReportBundle::new(
            Symbol::parse("ZZZZ").expect("symbol"),
            CalendarDate::from_ymd(2026, 10, 19).expect("date"),
            Vec::new(),
        );

        write_workbook(&bundle, &path).expect("workbook saved");

        let bytes = std::fs::read(&path).expect("workbook readable");
        assert!(bytes.starts_with(b"PK"));
    }
}
