/*!
 * Command-line behavior of the `npfinder` binary.
 */

use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn npfinder() -> Command {
    Command::new(env!("CARGO_BIN_EXE_npfinder"))
}

#[test]
fn test_bad_upload_reported_before_missing_specialty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "NPI,Speciality,State,Usage Time (mins)\n1,Cardiology,NY,10\n").unwrap();

    let out_dir = dir.path().join("out");
    let mut report = npfinder();
    report.arg("report").arg("--input").arg(&path).arg("--json");
    let mut export = npfinder();
    export.arg("export").arg("--input").arg(&path).arg("--output").arg(&out_dir);

    for mut command in [report, export] {
        let output = command.output().unwrap();
        let stderr = String::from_utf8_lossy(&output.stderr);

        assert_eq!(output.status.code(), Some(1));
        assert!(stderr.contains("Error processing data:"), "{stderr}");
        assert!(!stderr.contains("Please select a specialty"), "{stderr}");
    }
}

#[test]
fn test_missing_specialty_after_successful_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("providers.csv");
    fs::write(
        &path,
        "NPI,Speciality,State,Region,Usage Time (mins)\n1,Cardiology,NY,Northeast,10\n",
    )
    .unwrap();

    let output = npfinder().arg("report").arg("--input").arg(&path).output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("Please select a specialty to continue."), "{stderr}");
}
