/*!
 * End-to-end tests: load an upload from disk, render reports, and export.
 */

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};
use npi_finder::prelude::*;
use npi_finder::reference::Region;
use tempfile::TempDir;

const CODE_FORM_CSV: &str = "\
NPI,Speciality,State,Region,Usage Time (mins)
1000000001,Cardiology,NY,Northeast,45.2
1000000002,Cardiology,CA,West,32.7
1000000003,Cardiology,NY,Northeast,58.1
1000000004,Cardiology,CA,West,41.5
1000000005,Cardiology,NY,Northeast,37.8
1000000006,Pediatrics,TX,South,60.0
1000000007,Pediatrics,FL,South,
";

fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path
}

fn load(path: &Path) -> ProviderDataset {
    ProviderDatasetBuilder::new()
        .path(path)
        .show_progress(false)
        .build()
        .unwrap()
}

#[test]
fn test_csv_upload_report() {
    let dir = TempDir::new().unwrap();
    let dataset = load(&write_file(&dir, "providers.csv", CODE_FORM_CSV));
    assert_eq!(dataset.len(), 7);

    let options = dataset.filter_options();
    assert_eq!(options.specialties, vec!["Cardiology", "Pediatrics"]);
    assert_eq!(options.regions[0], ALL_REGIONS);

    let report = dataset.render(&Selection::specialty_only("Cardiology").unwrap());
    assert_eq!(report.overview.total_providers, 5);
    assert_eq!(report.overview.states_represented, 2);

    let counts: Vec<_> = report
        .state_counts
        .iter()
        .map(|c| (c.state_code.as_str(), c.count))
        .collect();
    assert_eq!(counts, vec![("NY", 3), ("CA", 2)]);

    let regions = report.region_counts.as_ref().unwrap();
    assert_eq!(regions.len(), 2);
    assert_eq!((regions[0].region, regions[0].count, regions[0].percentage), (Region::Northeast, 3, 60.0));
    assert_eq!((regions[1].region, regions[1].count, regions[1].percentage), (Region::West, 2, 40.0));

    let stats = report.usage_statistics.as_ref().unwrap();
    assert_eq!(stats.mean, 43.06);
    assert_eq!(stats.median, 41.5);
    assert_eq!(stats.min, 32.7);
    assert_eq!(stats.max, 58.1);
}

#[test]
fn test_full_name_states_are_resolved() {
    let csv = "\
Usage Time (mins),State,NPI,Region,Speciality,Notes
30,New York,1,Northeast,Neurology,x
40,California,2,West,Neurology,y
50,Puerto Rico,3,South,Neurology,z
";
    let dir = TempDir::new().unwrap();
    let dataset = load(&write_file(&dir, "names.csv", csv));
    let report = dataset.render(&Selection::specialty_only("Neurology").unwrap());

    let resolved: Vec<_> = report
        .records
        .iter()
        .map(|r| (r.state_code.as_str(), r.mapped_region))
        .collect();
    assert_eq!(
        resolved,
        vec![("NY", Region::Northeast), ("CA", Region::West), ("Puerto Rico", Region::Unknown)]
    );
}

#[test]
fn test_no_matching_specialty_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let dataset = load(&write_file(&dir, "providers.csv", CODE_FORM_CSV));
    let report = dataset.render(&Selection::specialty_only("Dermatology").unwrap());

    assert!(report.is_empty());
    assert!(report.state_counts.is_empty());
    assert!(report.region_counts.as_ref().unwrap().is_empty());
    assert!(report.usage_statistics.is_none());
    assert!(report.top_states.is_empty());
}

#[test]
fn test_missing_specialty_is_reported() {
    let err = Selection::new("", None).unwrap_err();
    assert_eq!(err.user_message(), "Please select a specialty to continue.");
}

#[test]
fn test_missing_column_names_the_column() {
    let csv = "NPI,Speciality,State,Usage Time (mins)\n1,Cardiology,NY,10\n";
    let dir = TempDir::new().unwrap();
    let result = ProviderDatasetBuilder::new()
        .path(write_file(&dir, "bad.csv", csv))
        .show_progress(false)
        .build();

    let err = result.unwrap_err();
    match &err {
        FinderError::SchemaMismatch { missing_columns, .. } => {
            assert_eq!(missing_columns, &vec!["Region".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.user_message().starts_with("Error processing data: "));
}

#[test]
fn test_invalid_usage_skipped_when_configured() {
    let csv = "NPI,Speciality,State,Region,Usage Time (mins)\n1,Cardiology,NY,Northeast,abc\n2,Cardiology,CA,West,12\n";
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "invalid.csv", csv);

    let strict = ProviderDatasetBuilder::new().path(&path).show_progress(false).build();
    assert!(matches!(strict, Err(FinderError::InvalidValue { .. })));

    let lenient = ProviderDatasetBuilder::new()
        .path(&path)
        .show_progress(false)
        .skip_invalid_records(true)
        .build()
        .unwrap();
    assert_eq!(lenient.len(), 1);
}

#[test]
fn test_excel_export_reads_back() {
    let dir = TempDir::new().unwrap();
    let dataset = load(&write_file(&dir, "providers.csv", CODE_FORM_CSV));
    let selection = Selection::new("Pediatrics", Some("South")).unwrap();

    let out = dir.path().join("out");
    let path = dataset.export(&selection, ExportFormat::Excel, &out).unwrap();
    assert_eq!(path.file_name().unwrap(), "Pediatrics__South_data.xlsx");

    let mut workbook = open_workbook_auto(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Sheet1".to_string()]);
    let range = workbook.worksheet_range("Sheet1").unwrap();
    let rows: Vec<_> = range.rows().collect();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0][0], Data::String("NPI".to_string()));
    assert_eq!(rows[0][7], Data::String("MappedRegion".to_string()));
    assert_eq!(rows[1][2], Data::String("TX".to_string()));
    assert_eq!(rows[1][4], Data::Float(60.0));
    assert_eq!(rows[1][6], Data::String("Texas".to_string()));
    assert_eq!(rows[2][4], Data::Empty);

    // the export is itself a valid upload
    let reloaded = load(&path);
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.records[1].usage_minutes, None);
}

#[test]
fn test_export_all_formats() {
    let dir = TempDir::new().unwrap();
    let dataset = load(&write_file(&dir, "providers.csv", CODE_FORM_CSV));
    let selection = Selection::new("Cardiology", Some("West")).unwrap();
    let out = dir.path().join("exports");

    let files = npi_finder::cookbook::export_all(&dataset, &selection, &out).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "Cardiology__West_data.csv",
            "Cardiology__West_data.xlsx",
            "Cardiology__West_map.html",
            "Cardiology__West_report.json",
        ]
    );

    let csv = fs::read_to_string(&files[0]).unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("1000000002,Cardiology,CA,West,32.7,CA,California,West"));

    let html = fs::read_to_string(&files[2]).unwrap();
    assert!(html.contains("Cardiology Providers in West Region"));
    assert!(html.contains("California: 2 providers"));
    assert!(!html.contains("<script src="));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&files[3]).unwrap()).unwrap();
    assert_eq!(json["heading"], "Cardiology Providers in West Region");
    assert_eq!(json["records"].as_array().unwrap().len(), 2);
    assert!(json["region_counts"].is_null());
}

#[test]
fn test_unsupported_and_missing_files() {
    let dir = TempDir::new().unwrap();
    let txt = write_file(&dir, "providers.txt", CODE_FORM_CSV);

    assert!(matches!(
        ProviderDataset::load(&txt),
        Err(FinderError::UnsupportedFormat { .. })
    ));
    assert!(matches!(
        ProviderDataset::load(dir.path().join("nope.csv")),
        Err(FinderError::FileNotFound { .. })
    ));
}
