//! CSV batch processing.
//!
//! Input is one patient per row. Set-valued columns (symptoms, comorbidities,
//! allergy classes, free-text allergies, co-medications) hold `;`-separated
//! entries. Output is one summary row per recommendation.

use crate::{
    Allergies, Error, InfectionSite, PatientProfile, PregnancyStatus, RecommendationResult,
    Result, SeverityTier, Sex,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::path::Path;

const LIST_SEPARATOR: char = ';';

/// A row in the input CSV
#[derive(Debug, Deserialize)]
struct ProfileRow {
    patient_ref: String,
    age_years: f64,
    sex: Sex,
    weight_kg: f64,
    height_cm: f64,
    #[serde(default)]
    pregnancy_status: Option<PregnancyStatus>,
    #[serde(default)]
    serum_creatinine_mg_dl: Option<f64>,
    infection_site: InfectionSite,
    #[serde(default)]
    is_hospital_acquired: Option<bool>,
    #[serde(default)]
    symptoms: Option<String>,
    #[serde(default)]
    duration_days: Option<u32>,
    #[serde(default)]
    comorbidities: Option<String>,
    #[serde(default)]
    allergy_classes: Option<String>,
    #[serde(default)]
    allergy_notes: Option<String>,
    #[serde(default)]
    recent_antibiotics: Option<bool>,
    #[serde(default)]
    confirmed_severity: Option<SeverityTier>,
    /// Empty means unknown, which skips the interaction check
    #[serde(default)]
    current_medications: Option<String>,
}

/// One patient read from a batch file
#[derive(Clone, Debug, PartialEq)]
pub struct BatchEntry {
    pub patient_ref: String,
    pub profile: PatientProfile,
}

/// A row in the output CSV
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SummaryRow {
    pub patient_ref: String,
    pub infection_type: String,
    pub severity: SeverityTier,
    pub primary: String,
    pub dose: String,
    pub route: String,
    pub duration: String,
    pub consultation_required: bool,
    pub alternatives: String,
    pub precautions: String,
    pub tables_version: String,
}

impl SummaryRow {
    pub fn new(patient_ref: &str, result: &RecommendationResult) -> Self {
        Self {
            patient_ref: patient_ref.to_string(),
            infection_type: result.rationale.infection_type.clone(),
            severity: result.rationale.severity,
            primary: result.primary.name.clone(),
            dose: result.primary.dose.clone(),
            route: result.primary.route.clone(),
            duration: result.primary.duration.clone(),
            consultation_required: result.is_consultation_required(),
            alternatives: result
                .alternatives
                .iter()
                .map(|r| r.name.as_str())
                .collect::<Vec<_>>()
                .join("; "),
            precautions: result.precautions.join(" | "),
            tables_version: result.tables_version.clone(),
        }
    }
}

fn split_list(field: Option<&str>) -> impl Iterator<Item = &str> {
    field
        .unwrap_or("")
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// Parse a snake_case tag into an enum the same way JSON profiles do
fn parse_tag<T: DeserializeOwned>(tag: &str) -> std::result::Result<T, String> {
    serde_json::from_value(serde_json::Value::String(tag.to_string()))
        .map_err(|_| format!("unknown value '{}'", tag))
}

fn parse_set<T: DeserializeOwned + Ord>(
    field: Option<&str>,
) -> std::result::Result<BTreeSet<T>, String> {
    split_list(field).map(parse_tag::<T>).collect()
}

impl ProfileRow {
    fn into_entry(self) -> std::result::Result<BatchEntry, String> {
        let mut profile = PatientProfile::new(
            self.age_years,
            self.sex,
            self.weight_kg,
            self.height_cm,
            self.infection_site,
        );
        profile.pregnancy_status = self
            .pregnancy_status
            .unwrap_or(PregnancyStatus::NotApplicable);
        profile.serum_creatinine_mg_dl = self.serum_creatinine_mg_dl;
        profile.is_hospital_acquired = self.is_hospital_acquired.unwrap_or(false);
        profile.symptoms = parse_set(self.symptoms.as_deref())?;
        profile.duration_days = self.duration_days.unwrap_or(0);
        profile.comorbidities = parse_set(self.comorbidities.as_deref())?;
        profile.allergies = Allergies {
            classes: parse_set(self.allergy_classes.as_deref())?,
            free_text: split_list(self.allergy_notes.as_deref())
                .map(str::to_string)
                .collect(),
        };
        profile.recent_antibiotics = self.recent_antibiotics.unwrap_or(false);
        profile.confirmed_severity = self.confirmed_severity;
        profile.current_medications = self
            .current_medications
            .as_deref()
            .filter(|field| !field.trim().is_empty())
            .map(|field| split_list(Some(field)).map(str::to_string).collect());

        Ok(BatchEntry {
            patient_ref: self.patient_ref,
            profile,
        })
    }
}

/// Read and validate every profile in a batch CSV
///
/// The first bad row fails the whole batch, naming the row.
pub fn read_profiles(path: &Path) -> Result<Vec<BatchEntry>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut entries = Vec::new();

    for (index, row) in reader.deserialize::<ProfileRow>().enumerate() {
        // Header is line 1
        let line = index + 2;
        let entry = row?
            .into_entry()
            .map_err(|e| Error::InvalidProfile(format!("line {}: {}", line, e)))?;
        entry
            .profile
            .validate()
            .map_err(|e| Error::InvalidProfile(format!("line {}: {}", line, e)))?;
        entries.push(entry);
    }

    tracing::info!("Read {} profile(s) from {:?}", entries.len(), path);
    Ok(entries)
}

/// Write summary rows to a CSV file, replacing any existing file
pub fn write_summaries(path: &Path, rows: &[SummaryRow]) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    let mut writer = csv::Writer::from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} summary row(s) to {:?}", rows.len(), path);
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{recommend, AllergyClass, Comorbidity, Symptom};

    const HEADER: &str = "patient_ref,age_years,sex,weight_kg,height_cm,pregnancy_status,serum_creatinine_mg_dl,infection_site,is_hospital_acquired,symptoms,duration_days,comorbidities,allergy_classes,allergy_notes,recent_antibiotics,confirmed_severity,current_medications";

    fn write_batch(rows: &[&str]) -> (tempfile::TempDir, std::path::PathBuf) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("batch.csv");
        let mut contents = String::from(HEADER);
        for row in rows {
            contents.push('\n');
            contents.push_str(row);
        }
        std::fs::write(&path, contents).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_read_profiles_with_lists() {
        let (_dir, path) = write_batch(&[
            "p1,45,male,80,180,,,respiratory,false,fever;cough,3,diabetes,penicillin,rash to keflex,true,,",
            "p2,30,female,60,165,pregnant,0.8,skin,,,,,,,,moderate,Warfarin; Metformin",
        ]);

        let entries = read_profiles(&path).unwrap();
        assert_eq!(entries.len(), 2);

        let p1 = &entries[0].profile;
        assert_eq!(entries[0].patient_ref, "p1");
        assert!(p1.symptoms.contains(&Symptom::Fever));
        assert!(p1.symptoms.contains(&Symptom::Cough));
        assert!(p1.has_comorbidity(Comorbidity::Diabetes));
        assert!(p1.allergies.classes.contains(&AllergyClass::Penicillin));
        assert_eq!(p1.allergies.free_text, vec!["rash to keflex"]);
        assert!(p1.recent_antibiotics);
        assert!(p1.current_medications.is_none());

        let p2 = &entries[1].profile;
        assert_eq!(p2.pregnancy_status, PregnancyStatus::Pregnant);
        assert_eq!(p2.serum_creatinine_mg_dl, Some(0.8));
        assert_eq!(p2.confirmed_severity, Some(SeverityTier::Moderate));
        assert_eq!(
            p2.current_medications,
            Some(vec!["Warfarin".to_string(), "Metformin".to_string()])
        );
    }

    #[test]
    fn test_unknown_tag_names_the_line() {
        let (_dir, path) = write_batch(&[
            "p1,45,male,80,180,,,respiratory,,fever;hiccups,,,,,,,",
        ]);

        match read_profiles(&path) {
            Err(Error::InvalidProfile(msg)) => {
                assert!(msg.contains("line 2"));
                assert!(msg.contains("hiccups"));
            }
            other => panic!("expected invalid profile, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_biometrics_rejected() {
        let (_dir, path) = write_batch(&["p1,45,male,0,180,,,urinary,,,,,,,,,"]);
        assert!(matches!(read_profiles(&path), Err(Error::InvalidProfile(_))));
    }

    #[test]
    fn test_write_summaries() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out").join("summary.csv");

        let profile = PatientProfile::new(40.0, Sex::Male, 75.0, 178.0, InfectionSite::Respiratory);
        let rows = vec![SummaryRow::new("p1", &recommend(&profile))];
        assert_eq!(write_summaries(&path, &rows).unwrap(), 1);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let read: Vec<SummaryRow> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(read, rows);
        assert_eq!(read[0].primary, "Amoxicillin");
        assert!(!read[0].consultation_required);
    }
}
