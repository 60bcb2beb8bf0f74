/*!
 * Reader for provider uploads
 *
 * Loads a CSV file or the first worksheet of a workbook (xlsx, xlsm, xls,
 * xlsb, ods) into `ProviderRecord`s after checking the required columns are
 * present.
 */

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use log::{debug, info, warn};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    Result, FinderError, ErrorContext,
    config::FinderConfig,
    data_types::ProviderRecord,
    schema::{columns, ProviderSchema},
};

/// File extensions the reader accepts
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Only the first few skipped rows are logged individually
const MAX_LOGGED_INVALID: usize = 10;

/// Usage cell before validation
#[derive(Debug, Clone, PartialEq)]
enum UsageCell {
    Blank,
    Number(f64),
    Text(String),
}

/// One row pulled out of the source, not yet validated
#[derive(Debug, Clone)]
struct RawRow {
    npi: String,
    specialty: String,
    state: String,
    region: String,
    usage: UsageCell,
}

impl RawRow {
    fn is_blank(&self) -> bool {
        self.npi.is_empty()
            && self.specialty.is_empty()
            && self.state.is_empty()
            && self.region.is_empty()
            && self.usage == UsageCell::Blank
    }
}

/// Provider upload reader
pub struct ProviderReader {
    /// Whether to skip rows with unusable values (true) or fail (false)
    skip_invalid_records: bool,
    /// Whether to show progress bar
    #[cfg(feature = "progress")]
    show_progress_bar: bool,
}

impl Default for ProviderReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderReader {
    /// Create a new reader with default settings
    pub fn new() -> Self {
        Self {
            skip_invalid_records: false,
            #[cfg(feature = "progress")]
            show_progress_bar: false,
        }
    }

    /// Create a reader following the loading options of a configuration
    pub fn from_config(config: &FinderConfig) -> Self {
        let reader = Self::new().with_skip_invalid_records(config.skip_invalid_records);
        #[cfg(feature = "progress")]
        let reader = reader.with_progress_bar(config.enable_progress_bar);
        reader
    }

    /// Enable or disable skipping invalid records
    pub fn with_skip_invalid_records(mut self, skip: bool) -> Self {
        self.skip_invalid_records = skip;
        self
    }

    #[cfg(feature = "progress")]
    /// Enable or disable the progress bar
    pub fn with_progress_bar(mut self, show: bool) -> Self {
        self.show_progress_bar = show;
        self
    }

    /// Load an upload, choosing the parser from the file extension
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Vec<ProviderRecord>> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(FinderError::file_not_found_with_suggestion(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => self.load_csv(path),
            ext if SUPPORTED_EXTENSIONS.contains(&ext) => self.load_workbook(path),
            ext => Err(FinderError::unsupported_format(ext)),
        }
    }

    /// Load a CSV upload from disk
    pub fn load_csv<P: AsRef<Path>>(&self, path: P) -> Result<Vec<ProviderRecord>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        let start_time = Instant::now();

        #[cfg(feature = "progress")]
        let progress_bar = self.byte_progress_bar(file_size);
        #[cfg(not(feature = "progress"))]
        let _ = file_size;

        let records = self
            .read_csv(file, |_byte| {
                #[cfg(feature = "progress")]
                if let Some(ref pb) = progress_bar {
                    pb.set_position(_byte);
                }
            })
            .map_err(|e| with_file_context(e, path))?;

        #[cfg(feature = "progress")]
        if let Some(pb) = progress_bar {
            pb.finish_and_clear();
        }

        info!(
            "Loaded {} provider records from {} in {:.2}s",
            records.len(),
            path.display(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(records)
    }

    /// Load CSV content from any reader (an in-memory upload, stdin, ...)
    pub fn load_csv_from_reader<R: Read>(&self, rdr: R) -> Result<Vec<ProviderRecord>> {
        self.read_csv(rdr, |_| {})
    }

    fn read_csv<R: Read, F: Fn(u64)>(&self, rdr: R, on_progress: F) -> Result<Vec<ProviderRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(rdr);

        let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
        let index = ProviderSchema::validate_headers(&headers)?;
        debug!("CSV header resolved to {:?}", index);

        let mut records = Vec::new();
        let mut invalid_count = 0;

        for (idx, result) in reader.records().enumerate() {
            // +2 for the header row and 0-based index
            let line = idx + 2;
            let csv_record = result.map_err(|e| FinderError::CsvParse {
                message: e.to_string(),
                line: Some(line),
                context: ErrorContext {
                    line_number: Some(line),
                    ..Default::default()
                },
            })?;

            if let Some(pos) = csv_record.position() {
                on_progress(pos.byte());
            }

            let cell = |i: usize| csv_record.get(i).unwrap_or("").to_string();
            let usage_text = cell(index.usage_time);
            let raw = RawRow {
                npi: cell(index.npi),
                specialty: cell(index.specialty),
                state: cell(index.state),
                region: cell(index.region),
                usage: if usage_text.trim().is_empty() {
                    UsageCell::Blank
                } else {
                    UsageCell::Text(usage_text)
                },
            };

            self.accept(raw, line, &mut records, &mut invalid_count)?;
        }

        self.report_skipped(invalid_count);
        Ok(records)
    }

    /// Load the first worksheet of a workbook
    pub fn load_workbook<P: AsRef<Path>>(&self, path: P) -> Result<Vec<ProviderRecord>> {
        let path = path.as_ref();
        let start_time = Instant::now();

        let mut workbook = open_workbook_auto(path).map_err(|e| workbook_error(e, path))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| FinderError::Spreadsheet {
                message: "Workbook contains no worksheets".to_string(),
                context: ErrorContext {
                    file_path: Some(path.to_path_buf()),
                    ..Default::default()
                },
            })?
            .map_err(|e| workbook_error(e, path))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .map(|row| row.iter().map(cell_text).collect())
            .unwrap_or_default();
        let index = ProviderSchema::validate_headers(&headers)?;
        debug!("Worksheet header resolved to {:?}", index);

        #[cfg(feature = "progress")]
        let progress_bar = self.row_progress_bar(range.height().saturating_sub(1) as u64);

        let mut records = Vec::new();
        let mut invalid_count = 0;

        for (idx, row) in rows.enumerate() {
            let line = idx + 2;
            let cell = |i: usize| row.get(i).map(cell_text).unwrap_or_default();
            let raw = RawRow {
                npi: cell(index.npi),
                specialty: cell(index.specialty),
                state: cell(index.state),
                region: cell(index.region),
                usage: row.get(index.usage_time).map(usage_cell).unwrap_or(UsageCell::Blank),
            };

            self.accept(raw, line, &mut records, &mut invalid_count)
                .map_err(|e| with_file_context(e, path))?;

            #[cfg(feature = "progress")]
            if let Some(ref pb) = progress_bar {
                pb.inc(1);
            }
        }

        #[cfg(feature = "progress")]
        if let Some(pb) = progress_bar {
            pb.finish_and_clear();
        }

        self.report_skipped(invalid_count);
        info!(
            "Loaded {} provider records from {} in {:.2}s",
            records.len(),
            path.display(),
            start_time.elapsed().as_secs_f64()
        );

        Ok(records)
    }

    /// Validate a raw row and push it, or skip/fail per configuration
    fn accept(
        &self,
        raw: RawRow,
        line: usize,
        records: &mut Vec<ProviderRecord>,
        invalid_count: &mut usize,
    ) -> Result<()> {
        if raw.is_blank() {
            return Ok(());
        }

        match parse_record(raw, line) {
            Ok(record) => records.push(record),
            Err(e) if self.skip_invalid_records => {
                *invalid_count += 1;
                if *invalid_count <= MAX_LOGGED_INVALID {
                    warn!("Skipping invalid record at row {}: {}", line, e);
                }
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn report_skipped(&self, invalid_count: usize) {
        if invalid_count > 0 {
            warn!("Skipped {} invalid records", invalid_count);
        }
    }

    #[cfg(feature = "progress")]
    fn byte_progress_bar(&self, total_bytes: u64) -> Option<ProgressBar> {
        if !self.show_progress_bar {
            return None;
        }
        let pb = ProgressBar::new(total_bytes);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }

    #[cfg(feature = "progress")]
    fn row_progress_bar(&self, total_rows: u64) -> Option<ProgressBar> {
        if !self.show_progress_bar {
            return None;
        }
        let pb = ProgressBar::new(total_rows);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}

fn parse_record(raw: RawRow, line: usize) -> Result<ProviderRecord> {
    let usage_minutes = parse_usage(&raw.usage, line)?;
    Ok(ProviderRecord::new(raw.npi, raw.specialty, raw.state, raw.region, usage_minutes))
}

/// Usage must be a finite, non-negative number of minutes, or blank
fn parse_usage(cell: &UsageCell, line: usize) -> Result<Option<f64>> {
    let invalid = |value: String, reason: &str| FinderError::InvalidValue {
        column: columns::USAGE_TIME.to_string(),
        value,
        row: line,
        reason: reason.to_string(),
    };

    let value = match cell {
        UsageCell::Blank => return Ok(None),
        UsageCell::Number(n) => *n,
        UsageCell::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid(text.clone(), "expected a number of minutes"))?,
    };

    if !value.is_finite() {
        return Err(invalid(value.to_string(), "value must be finite"));
    }
    if value < 0.0 {
        return Err(invalid(value.to_string(), "usage time cannot be negative"));
    }
    Ok(Some(value))
}

/// Render a workbook cell the way it reads in a text column
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        // whole numbers (typically NPIs) lose the spurious ".0"
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

fn usage_cell(cell: &Data) -> UsageCell {
    match cell {
        Data::Empty => UsageCell::Blank,
        Data::Int(i) => UsageCell::Number(*i as f64),
        Data::Float(f) => UsageCell::Number(*f),
        Data::String(s) if s.trim().is_empty() => UsageCell::Blank,
        other => UsageCell::Text(cell_text(other)),
    }
}

fn workbook_error(err: calamine::Error, path: &Path) -> FinderError {
    FinderError::Spreadsheet {
        message: err.to_string(),
        context: ErrorContext {
            file_path: Some(path.to_path_buf()),
            ..Default::default()
        },
    }
}

/// Attach the file path to parse errors raised without one
fn with_file_context(err: FinderError, path: &Path) -> FinderError {
    match err {
        FinderError::CsvParse { message, line, mut context } => {
            context.file_path = Some(path.to_path_buf());
            FinderError::CsvParse { message, line, context }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
NPI,Speciality,State,Region,Usage Time (mins)
1234567890,Cardiology,NY,Northeast,45.2
2345678901,Pediatrics,CA,West,32.7
3456789012,Oncology,TX,South,
";

    #[test]
    fn test_load_csv_from_reader() {
        let records = ProviderReader::new()
            .load_csv_from_reader(SAMPLE.as_bytes())
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].npi.as_str(), "1234567890");
        assert_eq!(records[0].specialty, "Cardiology");
        assert_eq!(records[1].state, "CA");
        assert_eq!(records[1].usage_minutes, Some(32.7));
        assert_eq!(records[2].usage_minutes, None);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let data = "NPI,Specialty,State,Region,Usage Time (mins)\n1,Cardiology,NY,Northeast,1\n";
        let err = ProviderReader::new()
            .load_csv_from_reader(data.as_bytes())
            .unwrap_err();
        assert!(matches!(err, FinderError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_invalid_usage_fails_or_skips() {
        let data = "\
NPI,Speciality,State,Region,Usage Time (mins)
1,Cardiology,NY,Northeast,abc
2,Cardiology,NY,Northeast,-4
3,Cardiology,NY,Northeast,12
";
        let err = ProviderReader::new()
            .load_csv_from_reader(data.as_bytes())
            .unwrap_err();
        match err {
            FinderError::InvalidValue { row, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let records = ProviderReader::new()
            .with_skip_invalid_records(true)
            .load_csv_from_reader(data.as_bytes())
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].npi.as_str(), "3");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("providers.txt");
        std::fs::write(&path, SAMPLE).unwrap();

        let err = ProviderReader::new().load(&path).unwrap_err();
        assert!(matches!(err, FinderError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = ProviderReader::new().load("does/not/exist.xlsx").unwrap_err();
        assert!(matches!(err, FinderError::FileNotFound { .. }));
    }

    #[test]
    fn test_cell_text_drops_whole_float_fraction() {
        assert_eq!(cell_text(&Data::Float(1234567890.0)), "1234567890");
        assert_eq!(cell_text(&Data::Float(45.2)), "45.2");
        assert_eq!(cell_text(&Data::Empty), "");
        assert_eq!(usage_cell(&Data::Int(30)), UsageCell::Number(30.0));
    }
}
