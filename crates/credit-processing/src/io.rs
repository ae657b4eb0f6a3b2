//! CSV input and output.
//!
//! The whole file is scanned for schema inference so that a numeric-looking
//! column with a stray `"28_"` deep in the file is read as text rather than
//! failing to parse.

use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Result, ResultExt};

fn read_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
}

/// Read a CSV file from disk.
pub fn read_csv_path(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let df = read_options()
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .context(format!("While opening '{}'", path.display()))?
        .finish()
        .context(format!("While parsing '{}'", path.display()))?;
    debug!("Read {:?} from {}", df.shape(), path.display());
    Ok(df)
}

/// Read CSV content held in memory, such as an uploaded file.
pub fn read_csv_bytes(bytes: &[u8]) -> Result<DataFrame> {
    let df = read_options()
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .context("While parsing uploaded CSV")?;
    debug!("Read {:?} from {} bytes", df.shape(), bytes.len());
    Ok(df)
}

/// Write a frame as CSV with a header row.
pub fn write_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df)
        .context(format!("While writing '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_bytes_keeps_dirty_numbers_as_text() {
        let csv = b"Age,Annual_Income\n23,19114.12\n28_,34847.84\n";
        let df = read_csv_bytes(csv).unwrap();
        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.column("Age").unwrap().dtype(), &DataType::String);
        assert_eq!(
            df.column("Annual_Income").unwrap().dtype(),
            &DataType::Float64
        );
    }

    #[test]
    fn test_write_then_read() {
        let mut df = df!["x" => [1.0, 2.5], "y" => ["a", "b"]].unwrap();
        let path = std::env::temp_dir().join(format!("credit_io_{}.csv", std::process::id()));
        write_csv(&mut df, &path).unwrap();
        let back = read_csv_path(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back.shape(), (2, 2));
    }
}
