//! Integration tests for the abx binary.
//!
//! These tests verify end-to-end behavior including:
//! - Profile validation at the boundary
//! - Recommendation output and the audit trail
//! - CSV batch processing
//! - Reference table overrides

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI command isolated from any user config
fn cli(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("abx"));
    cmd.env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"));
    cmd
}

fn write_file(temp_dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = temp_dir.path().join(name);
    fs::write(&path, contents).expect("Failed to write fixture");
    path
}

fn respiratory_profile(temp_dir: &TempDir, allergies: &str) -> PathBuf {
    write_file(
        temp_dir,
        "profile.json",
        &format!(
            r#"{{
                "age_years": 45,
                "sex": "male",
                "weight_kg": 80,
                "height_cm": 180,
                "infection_site": "respiratory",
                "symptoms": ["cough"],
                "duration_days": 3,
                "allergies": {{ "classes": [{}], "free_text": [] }}
            }}"#,
            allergies
        ),
    )
}

fn audit_log(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("data").join("audit.jsonl")
}

fn recommend_json(temp_dir: &TempDir, profile: &Path) -> serde_json::Value {
    let output = cli(temp_dir)
        .arg("recommend")
        .arg("--profile")
        .arg(profile)
        .arg("--json")
        .arg("--no-audit")
        .output()
        .expect("Failed to run abx");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_cli_help() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Antibiotic recommendation engine"));
}

#[test]
fn test_recommend_mild_respiratory() {
    let temp_dir = setup_test_dir();
    let profile = respiratory_profile(&temp_dir, "");

    cli(&temp_dir)
        .arg("recommend")
        .arg("--profile")
        .arg(&profile)
        .assert()
        .success()
        .stdout(predicate::str::contains("Amoxicillin"))
        .stdout(predicate::str::contains("COMMUNITY-ACQUIRED"));
}

#[test]
fn test_recommend_json_substitutes_for_penicillin_allergy() {
    let temp_dir = setup_test_dir();
    let profile = respiratory_profile(&temp_dir, r#""penicillin""#);

    let result = recommend_json(&temp_dir, &profile);
    assert_eq!(result["primary"]["name"], "Azithromycin");
    assert_eq!(result["rationale"]["severity"], "mild");
    assert!(result["alternatives"]
        .as_array()
        .unwrap()
        .iter()
        .all(|alt| alt["name"] != "Amoxicillin"));
}

#[test]
fn test_recommend_appends_audit_record() {
    let temp_dir = setup_test_dir();
    let profile = respiratory_profile(&temp_dir, "");

    for _ in 0..2 {
        cli(&temp_dir)
            .arg("recommend")
            .arg("--profile")
            .arg(&profile)
            .assert()
            .success();
    }

    let contents = fs::read_to_string(audit_log(&temp_dir)).unwrap();
    assert_eq!(contents.lines().count(), 2);

    cli(&temp_dir)
        .arg("audit")
        .arg("--limit")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Amoxicillin"));
}

#[test]
fn test_no_audit_flag_skips_log() {
    let temp_dir = setup_test_dir();
    let profile = respiratory_profile(&temp_dir, "");

    cli(&temp_dir)
        .arg("recommend")
        .arg("--profile")
        .arg(&profile)
        .arg("--no-audit")
        .assert()
        .success();

    assert!(!audit_log(&temp_dir).exists());
}

#[test]
fn test_audit_disabled_in_config() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config").join("abx");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[audit]\nenabled = false\n").unwrap();
    let profile = respiratory_profile(&temp_dir, "");

    cli(&temp_dir)
        .arg("recommend")
        .arg("--profile")
        .arg(&profile)
        .assert()
        .success();

    assert!(!audit_log(&temp_dir).exists());
}

#[test]
fn test_empty_audit_log() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("No audit records found"));
}

#[test]
fn test_invalid_profile_is_rejected() {
    let temp_dir = setup_test_dir();
    let profile = write_file(
        &temp_dir,
        "bad.json",
        r#"{"age_years": -4, "sex": "female", "weight_kg": 60, "height_cm": 160, "infection_site": "skin"}"#,
    );

    cli(&temp_dir)
        .arg("recommend")
        .arg("--profile")
        .arg(&profile)
        .assert()
        .failure();
    assert!(!audit_log(&temp_dir).exists());
}

#[test]
fn test_unknown_enum_value_fails() {
    let temp_dir = setup_test_dir();
    let profile = write_file(
        &temp_dir,
        "bad.json",
        r#"{"age_years": 40, "sex": "female", "weight_kg": 60, "height_cm": 160, "infection_site": "ear"}"#,
    );

    cli(&temp_dir)
        .arg("recommend")
        .arg("--profile")
        .arg(&profile)
        .assert()
        .failure();
}

#[test]
fn test_medication_list_triggers_interaction_substitution() {
    let temp_dir = setup_test_dir();
    let profile = write_file(
        &temp_dir,
        "profile.json",
        r#"{
            "age_years": 50,
            "sex": "female",
            "weight_kg": 70,
            "height_cm": 165,
            "infection_site": "urinary",
            "symptoms": ["fever", "dysuria"],
            "duration_days": 3,
            "confirmed_severity": "moderate"
        }"#,
    );
    let medications = write_file(&temp_dir, "meds.json", r#"{"medications": ["Warfarin"]}"#);

    let output = cli(&temp_dir)
        .arg("recommend")
        .arg("--profile")
        .arg(&profile)
        .arg("--medications")
        .arg(&medications)
        .arg("--json")
        .arg("--no-audit")
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["primary"]["name"], "Amoxicillin-Clavulanate");
}

#[test]
fn test_malformed_medication_list_is_unavailable() {
    let temp_dir = setup_test_dir();
    let profile = respiratory_profile(&temp_dir, "");
    let medications = write_file(&temp_dir, "meds.json", "not json");

    cli(&temp_dir)
        .arg("recommend")
        .arg("--profile")
        .arg(&profile)
        .arg("--medications")
        .arg(&medications)
        .arg("--no-audit")
        .assert()
        .success()
        .stderr(predicate::str::contains("interaction check skipped"));
}

#[test]
fn test_recommend_is_deterministic() {
    let temp_dir = setup_test_dir();
    let profile = respiratory_profile(&temp_dir, r#""macrolide""#);

    let first = recommend_json(&temp_dir, &profile);
    let second = recommend_json(&temp_dir, &profile);
    assert_eq!(first, second);
}

#[test]
fn test_batch_writes_summary_csv() {
    let temp_dir = setup_test_dir();
    let input = write_file(
        &temp_dir,
        "batch.csv",
        "patient_ref,age_years,sex,weight_kg,height_cm,pregnancy_status,serum_creatinine_mg_dl,infection_site,is_hospital_acquired,symptoms,duration_days,comorbidities,allergy_classes,allergy_notes,recent_antibiotics,confirmed_severity,current_medications\n\
         p1,45,male,80,180,,,respiratory,false,cough,3,,,,,,\n\
         p2,40,other,70,170,,,other,,,,,,,,,\n",
    );
    let output = temp_dir.path().join("out").join("summary.csv");

    cli(&temp_dir)
        .arg("batch")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 recommendations"))
        .stdout(predicate::str::contains("1 require specialist consultation"));

    let contents = fs::read_to_string(&output).unwrap();
    let mut lines = contents.lines();
    assert!(lines.next().unwrap().starts_with("patient_ref,"));
    assert!(lines.next().unwrap().starts_with("p1,"));
    assert!(lines.next().unwrap().contains("Consultation Required"));
}

#[test]
fn test_batch_reports_bad_row() {
    let temp_dir = setup_test_dir();
    let input = write_file(
        &temp_dir,
        "batch.csv",
        "patient_ref,age_years,sex,weight_kg,height_cm,pregnancy_status,serum_creatinine_mg_dl,infection_site,is_hospital_acquired,symptoms,duration_days,comorbidities,allergy_classes,allergy_notes,recent_antibiotics,confirmed_severity,current_medications\n\
         p1,45,male,0,180,,,urinary,,,,,,,,,\n",
    );

    cli(&temp_dir)
        .arg("batch")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(temp_dir.path().join("summary.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_calc_commands() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["calc", "bmi", "--weight", "80", "--height", "200"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BMI: 20.0"));

    cli(&temp_dir)
        .args(["calc", "gfr", "--value", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("G3a"));

    // (140 - 50) * 70 / (72 * 3.0) = 29.2
    cli(&temp_dir)
        .args([
            "calc",
            "crcl",
            "--age",
            "50",
            "--weight",
            "70",
            "--creatinine",
            "3.0",
            "--sex",
            "male",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("29.2 mL/min"))
        .stdout(predicate::str::contains("G4"));

    cli(&temp_dir)
        .args(["calc", "ibw", "--height", "180", "--sex", "robot"])
        .assert()
        .failure();
}

#[test]
fn test_tables_validate_and_export_round_trip() {
    let temp_dir = setup_test_dir();
    let exported = temp_dir.path().join("tables.json");

    cli(&temp_dir)
        .args(["tables", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("are valid"));

    cli(&temp_dir)
        .args(["tables", "export", "--output"])
        .arg(&exported)
        .assert()
        .success();
    assert!(exported.exists());

    // Exported tables load back as an override
    let profile = respiratory_profile(&temp_dir, "");
    cli(&temp_dir)
        .arg("--tables")
        .arg(&exported)
        .arg("recommend")
        .arg("--profile")
        .arg(&profile)
        .arg("--no-audit")
        .assert()
        .success()
        .stdout(predicate::str::contains("Amoxicillin"));
}

#[test]
fn test_inconsistent_tables_are_rejected() {
    let temp_dir = setup_test_dir();
    let exported = temp_dir.path().join("tables.json");

    cli(&temp_dir)
        .args(["tables", "export", "--output"])
        .arg(&exported)
        .assert()
        .success();

    let mut tables: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&exported).unwrap()).unwrap();
    tables["version"] = serde_json::Value::String(String::new());
    fs::write(&exported, tables.to_string()).unwrap();

    cli(&temp_dir)
        .arg("--tables")
        .arg(&exported)
        .args(["tables", "validate"])
        .assert()
        .failure();
}

#[test]
fn test_summary_is_deidentified() {
    let temp_dir = setup_test_dir();
    let profile = write_file(
        &temp_dir,
        "profile.json",
        r#"{
            "age_years": 37,
            "sex": "female",
            "weight_kg": 62,
            "height_cm": 168,
            "infection_site": "skin",
            "allergies": { "classes": [], "free_text": ["Rash from amoxicillin at Mercy General"] }
        }"#,
    );

    let output = cli(&temp_dir)
        .arg("summary")
        .arg("--profile")
        .arg(&profile)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("Mercy General"));
    let summary: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(summary["age_range"], "35-39");
    assert_eq!(summary["allergy_classes"][0], "penicillin");
}

#[test]
fn test_summary_prompt_rendering() {
    let temp_dir = setup_test_dir();
    let profile = write_file(
        &temp_dir,
        "profile.json",
        r#"{
            "age_years": 37,
            "sex": "female",
            "weight_kg": 62,
            "height_cm": 168,
            "infection_site": "skin",
            "allergies": { "classes": [], "free_text": ["Rash from amoxicillin at Mercy General"] }
        }"#,
    );

    cli(&temp_dir)
        .arg("summary")
        .arg("--profile")
        .arg(&profile)
        .arg("--prompt")
        .assert()
        .success()
        .stdout(predicate::str::contains("Patient: age 35-39"))
        .stdout(predicate::str::contains("Infection:"))
        .stdout(predicate::str::contains("Allergies:"))
        .stdout(predicate::str::contains("Engine recommendation:"))
        .stdout(predicate::str::contains("Mercy General").not());
}
