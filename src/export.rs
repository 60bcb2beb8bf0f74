/*!
 * Export functionality for dashboard reports
 *
 * Writes the normalized rows of a [`DashboardReport`] as CSV or as a
 * single-sheet Excel workbook, the choropleth as a standalone HTML page,
 * and the whole report as JSON.
 */

use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::{Path, PathBuf};

use log::info;

use crate::{
    ExportFormat, FinderError, Result,
    analytics::StateCount,
    dashboard::DashboardReport,
    data_types::NormalizedRecord,
    filter::Selection,
    reference::StateCode,
    schema::ProviderSchema,
};

/// Trait for report exporters
pub trait ReportExporter {
    /// Export the report to `path`
    fn export(&self, report: &DashboardReport, path: &Path) -> Result<()>;

    /// Get the export format
    fn format(&self) -> ExportFormat;
}

/// File name for a selection's export, e.g. `Cardiology__West_data.csv`
pub fn export_file_name(selection: &Selection, format: ExportFormat) -> String {
    let suffix = match format {
        ExportFormat::Csv | ExportFormat::Excel => "data",
        ExportFormat::Html => "map",
        ExportFormat::Json => "report",
    };
    format!("{}_{}.{}", selection.file_stem(), suffix, format.extension())
}

/// Exporter with default settings for `format`
pub fn exporter_for(format: ExportFormat) -> Box<dyn ReportExporter> {
    match format {
        ExportFormat::Csv => Box::new(CsvExporter::default()),
        ExportFormat::Excel => Box::new(ExcelExporter::default()),
        ExportFormat::Html => Box::new(HtmlMapExporter::default()),
        ExportFormat::Json => Box::new(JsonExporter::default()),
    }
}

/// Write `report` into `dir` under its standard file name
pub fn export_report<P: AsRef<Path>>(report: &DashboardReport, format: ExportFormat, dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let path = dir.join(export_file_name(&report.selection, format));
    exporter_for(format).export(report, &path)?;

    info!("Exported {} ({} rows) to {}", format, report.records.len(), path.display());
    Ok(path)
}

/// Cell text for the export columns, in `ProviderSchema::export_column_names` order
fn row_values(record: &NormalizedRecord) -> [String; 8] {
    let provider = &record.provider;
    [
        provider.npi.to_string(),
        provider.specialty.clone(),
        provider.state.clone(),
        provider.region.clone(),
        provider.usage_minutes.map(format_usage).unwrap_or_default(),
        record.state_code.clone(),
        record.state_name.clone(),
        record.mapped_region.to_string(),
    ]
}

const USAGE_COLUMN: usize = 4;

/// Whole numbers keep one decimal place (`30.0`), everything else uses the
/// shortest round-trip form
fn format_usage(minutes: f64) -> String {
    if minutes.fract() == 0.0 && minutes.abs() < 1e16 {
        format!("{:.1}", minutes)
    } else {
        minutes.to_string()
    }
}

/// CSV exporter
pub struct CsvExporter {
    /// Whether to include headers
    pub include_headers: bool,
    /// Field delimiter
    pub delimiter: u8,
}

impl Default for CsvExporter {
    fn default() -> Self {
        Self {
            include_headers: true,
            delimiter: b',',
        }
    }
}

impl CsvExporter {
    /// Create a new CSV exporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Write rows to any writer
    pub fn write_records<W: Write>(&self, records: &[NormalizedRecord], writer: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(writer);

        if self.include_headers {
            writer.write_record(ProviderSchema::export_column_names())?;
        }
        for record in records {
            writer.write_record(&row_values(record))?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl ReportExporter for CsvExporter {
    fn export(&self, report: &DashboardReport, path: &Path) -> Result<()> {
        self.write_records(&report.records, File::create(path)?)
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }
}

/// Excel exporter writing a minimal single-sheet OOXML workbook
pub struct ExcelExporter {
    pub sheet_name: String,
}

impl Default for ExcelExporter {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
        }
    }
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs></styleSheet>"#;

impl ExcelExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet_name<S: Into<String>>(mut self, name: S) -> Self {
        self.sheet_name = name.into();
        self
    }

    fn validate_sheet_name(&self) -> Result<()> {
        let invalid = self.sheet_name.is_empty()
            || self.sheet_name.chars().count() > 31
            || self.sheet_name.contains(['\\', '/', '?', '*', '[', ']', ':']);
        if invalid {
            return Err(FinderError::Export {
                message: format!("invalid worksheet name '{}'", self.sheet_name),
                format: ExportFormat::Excel,
                suggestion: Some("Use 1-31 characters without \\ / ? * [ ] :".to_string()),
            });
        }
        Ok(())
    }

    /// Write the workbook package to any seekable writer
    pub fn write_workbook<W: Write + Seek>(&self, records: &[NormalizedRecord], writer: W) -> Result<W> {
        self.validate_sheet_name()?;

        let mut zip = zip::ZipWriter::new(writer);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(ROOT_RELS_XML.as_bytes())?;

        zip.start_file("xl/workbook.xml", options)?;
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            xml_escape(&self.sheet_name)
        )?;

        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(WORKBOOK_RELS_XML.as_bytes())?;

        zip.start_file("xl/styles.xml", options)?;
        zip.write_all(STYLES_XML.as_bytes())?;

        zip.start_file("xl/worksheets/sheet1.xml", options)?;
        self.write_sheet(&mut zip, records)?;

        Ok(zip.finish()?)
    }

    fn write_sheet<W: Write>(&self, out: &mut W, records: &[NormalizedRecord]) -> Result<()> {
        write!(
            out,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#
        )?;

        write!(out, r#"<row r="1">"#)?;
        for (col, header) in ProviderSchema::export_column_names().iter().enumerate() {
            write_text_cell(out, col, 1, header)?;
        }
        write!(out, "</row>")?;

        for (idx, record) in records.iter().enumerate() {
            let row = idx + 2;
            write!(out, r#"<row r="{}">"#, row)?;
            for (col, value) in row_values(record).iter().enumerate() {
                if col == USAGE_COLUMN {
                    if let Some(minutes) = record.usage_minutes() {
                        write!(out, r#"<c r="{}{}"><v>{}</v></c>"#, column_letter(col), row, minutes)?;
                    }
                } else {
                    write_text_cell(out, col, row, value)?;
                }
            }
            write!(out, "</row>")?;
        }

        write!(out, "</sheetData></worksheet>")?;
        Ok(())
    }
}

fn write_text_cell<W: Write>(out: &mut W, col: usize, row: usize, value: &str) -> std::io::Result<()> {
    if value.is_empty() {
        return Ok(());
    }
    write!(
        out,
        r#"<c r="{}{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        column_letter(col),
        row,
        xml_escape(value)
    )
}

/// Spreadsheet column name for a zero-based index: 0 → A, 25 → Z, 26 → AA
fn column_letter(mut col: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (col % 26) as u8);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

impl ReportExporter for ExcelExporter {
    fn export(&self, report: &DashboardReport, path: &Path) -> Result<()> {
        self.write_workbook(&report.records, File::create(path)?)?;
        Ok(())
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Excel
    }
}

/// JSON exporter for the full report
pub struct JsonExporter {
    /// Whether to pretty-print the JSON
    pub pretty_print: bool,
}

impl Default for JsonExporter {
    fn default() -> Self {
        Self { pretty_print: true }
    }
}

impl JsonExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pretty_print(mut self, pretty: bool) -> Self {
        self.pretty_print = pretty;
        self
    }
}

impl ReportExporter for JsonExporter {
    fn export(&self, report: &DashboardReport, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        if self.pretty_print {
            serde_json::to_writer_pretty(writer, report)?;
        } else {
            serde_json::to_writer(writer, report)?;
        }
        Ok(())
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Json
    }
}

/// Tile positions (column, row) of the US tile-grid map
const TILE_GRID: [(StateCode, u32, u32); 51] = {
    use StateCode::*;
    [
        (AK, 0, 0), (ME, 11, 0),
        (VT, 10, 1), (NH, 11, 1),
        (WA, 1, 2), (ID, 2, 2), (MT, 3, 2), (ND, 4, 2), (MN, 5, 2), (IL, 6, 2),
        (WI, 7, 2), (MI, 8, 2), (NY, 9, 2), (RI, 10, 2), (MA, 11, 2),
        (OR, 1, 3), (NV, 2, 3), (WY, 3, 3), (SD, 4, 3), (IA, 5, 3), (IN, 6, 3),
        (OH, 7, 3), (PA, 8, 3), (NJ, 9, 3), (CT, 10, 3),
        (CA, 1, 4), (UT, 2, 4), (CO, 3, 4), (NE, 4, 4), (MO, 5, 4), (KY, 6, 4),
        (WV, 7, 4), (VA, 8, 4), (MD, 9, 4), (DE, 10, 4),
        (AZ, 2, 5), (NM, 3, 5), (KS, 4, 5), (AR, 5, 5), (TN, 6, 5), (NC, 7, 5),
        (SC, 8, 5), (DC, 9, 5),
        (OK, 4, 6), (LA, 5, 6), (MS, 6, 6), (AL, 7, 6), (GA, 8, 6),
        (HI, 0, 7), (TX, 4, 7), (FL, 9, 7),
    ]
};

/// Yellow-green-blue sequential scale, light to dark
const COLOR_SCALE: [&str; 9] = [
    "#ffffd9", "#edf8b1", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8", "#253494", "#081d58",
];
const EMPTY_TILE: &str = "#e8e8e8";
const TILE: u32 = 56;
const GAP: u32 = 4;

/// Standalone HTML choropleth of provider counts
#[derive(Default)]
pub struct HtmlMapExporter {
    /// Page title; the report heading when `None`
    pub title: Option<String>,
}

impl HtmlMapExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Render the page as a string
    pub fn render(&self, report: &DashboardReport) -> String {
        let title = self.title.as_deref().unwrap_or(&report.heading);
        let max_count = report.map_counts.iter().map(|c| c.count).max().unwrap_or(0);

        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{}</title>\n", xml_escape(title)));
        html.push_str(
            "<style>\nbody{font-family:Arial,Helvetica,sans-serif;margin:24px;color:#222}\n\
             rect:hover{stroke:#000;stroke-width:2}\n\
             table{border-collapse:collapse;margin-top:16px}\n\
             td,th{border:1px solid #ccc;padding:4px 10px;text-align:left}\n</style>\n",
        );
        html.push_str("</head>\n<body>\n");
        html.push_str(&format!("<h1>{}</h1>\n", xml_escape(title)));
        html.push_str(&format!(
            "<p>Provider Distribution by State. Generated {}.</p>\n",
            report.generated_at.format("%Y-%m-%d %H:%M UTC")
        ));

        if report.map_counts.is_empty() {
            html.push_str("<p>No data available for the selected filters.</p>\n");
        }

        html.push_str(&self.render_svg(&report.map_counts, max_count));
        html.push_str(&render_legend(max_count));
        html.push_str(&render_table(&report.map_counts));
        html.push_str("</body>\n</html>\n");
        html
    }

    fn render_svg(&self, counts: &[StateCount], max_count: usize) -> String {
        let width = 12 * (TILE + GAP);
        let height = 8 * (TILE + GAP);
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" role=\"img\">\n",
            w = width,
            h = height
        );

        for (code, col, row) in TILE_GRID {
            let count = counts
                .iter()
                .find(|c| c.state_code == code.as_code())
                .map(|c| c.count);
            let shade = count.and_then(|n| color_index(n, max_count));
            let fill = shade.map(|i| COLOR_SCALE[i]).unwrap_or(EMPTY_TILE);
            let tooltip = match count {
                Some(n) => format!("{}: {} providers", code.name(), n),
                None => format!("{}: no providers", code.name()),
            };
            let (x, y) = (col * (TILE + GAP), row * (TILE + GAP));
            let text_fill = if shade.is_some_and(|i| i >= 5) {
                "#fff"
            } else {
                "#222"
            };

            svg.push_str(&format!(
                "<g><title>{}</title><rect x=\"{}\" y=\"{}\" width=\"{t}\" height=\"{t}\" rx=\"4\" fill=\"{}\"/>\
                 <text x=\"{}\" y=\"{}\" font-size=\"14\" text-anchor=\"middle\" fill=\"{}\">{}</text></g>\n",
                xml_escape(&tooltip),
                x,
                y,
                fill,
                x + TILE / 2,
                y + TILE / 2 + 5,
                text_fill,
                code.as_code(),
                t = TILE
            ));
        }

        svg.push_str("</svg>\n");
        svg
    }
}

/// Position of a count on the color scale, `None` for zero
fn color_index(count: usize, max_count: usize) -> Option<usize> {
    if count == 0 || max_count == 0 {
        return None;
    }
    let last = COLOR_SCALE.len() - 1;
    let idx = ((count as f64 / max_count as f64) * last as f64).round() as usize;
    Some(idx.min(last))
}

fn render_legend(max_count: usize) -> String {
    let mut legend = String::from("<div>Number of Providers: ");
    for color in COLOR_SCALE {
        legend.push_str(&format!(
            "<span style=\"display:inline-block;width:24px;height:12px;background:{}\"></span>",
            color
        ));
    }
    legend.push_str(&format!(" 0 to {}</div>\n", max_count));
    legend
}

fn render_table(counts: &[StateCount]) -> String {
    let mut table = String::from("<table>\n<tr><th>State</th><th>Code</th><th>Region</th><th>Providers</th></tr>\n");
    for count in counts {
        table.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            xml_escape(&count.state_name),
            xml_escape(&count.state_code),
            count.region,
            count.count
        ));
    }
    table.push_str("</table>\n");
    table
}

impl ReportExporter for HtmlMapExporter {
    fn export(&self, report: &DashboardReport, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        writer.write_all(self.render(report).as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    fn format(&self) -> ExportFormat {
        ExportFormat::Html
    }
}

/// Escape markup and drop characters XML 1.0 does not allow
fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\t' | '\n' | '\r' => escaped.push(c),
            c if c < '\u{20}' || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
