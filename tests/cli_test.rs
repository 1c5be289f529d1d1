//! Integration tests for the formgen binary

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn shipped_templates() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")
}

fn formgen(work_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("formgen").unwrap();
    cmd.current_dir(work_dir)
        .env_remove("FORMGEN_TEMPLATE_DIR")
        .arg("--templates-dir")
        .arg(shipped_templates());
    cmd
}

fn write_form(dir: &Path) -> PathBuf {
    let path = dir.join("contact.json");
    std::fs::write(
        &path,
        r#"{
  "name": "Contact",
  "fields": [
    { "name": "full_name", "type": "text", "required": true, "maxLength": 80 },
    { "name": "email", "type": "email", "required": true },
    { "name": "message", "type": "textarea" }
  ]
}"#,
    )
    .unwrap();
    path
}

#[test]
fn test_templates_list_command() {
    let temp_dir = TempDir::new().unwrap();

    formgen(temp_dir.path())
        .args(["templates", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backend:"))
        .stdout(predicate::str::contains("stored_procedures"))
        .stdout(predicate::str::contains("{EntityName}Form.tsx"))
        .stdout(predicate::str::contains("18 templates"))
        .stdout(predicate::str::contains("(missing)").not());
}

#[test]
fn test_templates_validate_command() {
    let temp_dir = TempDir::new().unwrap();

    formgen(temp_dir.path())
        .args(["templates", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All 18 templates present"));
}

#[test]
fn test_templates_validate_reports_missing_sources() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("formgen").unwrap();

    cmd.current_dir(temp_dir.path())
        .env_remove("FORMGEN_TEMPLATE_DIR")
        .arg("--templates-dir")
        .arg(temp_dir.path().join("nothing-here"))
        .args(["templates", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing: entity"))
        .stderr(predicate::str::contains("18 of 18 templates are missing"));
}

#[test]
fn test_generate_and_unpack_archive() {
    let temp_dir = TempDir::new().unwrap();
    let form = write_form(temp_dir.path());
    let output_dir = temp_dir.path().join("out");
    let archive_dir = temp_dir.path().join("archives");

    formgen(temp_dir.path())
        .arg("generate")
        .arg("--form")
        .arg(&form)
        .args(["--project-name", "Contact Request"])
        .arg("--output-dir")
        .arg(&output_dir)
        .arg("--archive-dir")
        .arg(&archive_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Completed"))
        .stdout(predicate::str::contains("Artifacts: 14"))
        .stdout(predicate::str::contains("ContactRequest_Table.sql"))
        .stdout(predicate::str::contains("Archive:"));

    let controller = output_dir
        .join("Contact Request")
        .join("Backend/Controllers/ContactRequestController.cs");
    assert!(controller.is_file());

    let archive = std::fs::read_dir(&archive_dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .find(|path| path.extension().is_some_and(|ext| ext == "zip"))
        .expect("archive written");

    formgen(temp_dir.path())
        .args(["archive", "list"])
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Frontend/src/types/ContactRequest.types.ts"));

    let unpacked = temp_dir.path().join("unpacked");
    formgen(temp_dir.path())
        .args(["archive", "extract"])
        .arg(&archive)
        .arg(&unpacked)
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted"));
    assert!(unpacked.join("Database/Tables/ContactRequest_Table.sql").is_file());
}

#[test]
fn test_generate_json_output() {
    let temp_dir = TempDir::new().unwrap();
    let form = write_form(temp_dir.path());

    let output = formgen(temp_dir.path())
        .arg("generate")
        .arg("--form")
        .arg(&form)
        .args(["--project-name", "Contact", "--relational-schema", "--json"])
        .arg("--output-dir")
        .arg(temp_dir.path().join("out"))
        .arg("--archive-dir")
        .arg(temp_dir.path().join("archives"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let job: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(job["status"], "Completed");
    assert_eq!(job["generated_artifact_count"], 2);
}

#[test]
fn test_generate_rejects_invalid_form() {
    let temp_dir = TempDir::new().unwrap();
    let form = temp_dir.path().join("empty.json");
    std::fs::write(&form, r#"{ "fields": [] }"#).unwrap();

    formgen(temp_dir.path())
        .arg("generate")
        .arg("--form")
        .arg(&form)
        .args(["--project-name", "Empty"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no fields"));
}
