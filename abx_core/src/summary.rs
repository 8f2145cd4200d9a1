//! De-identified summary for an optional external advisory service.
//!
//! The engine never calls that service. Callers serialise this summary, send
//! it out of band, and display whatever comes back alongside the
//! recommendation without feeding it into selection.

use crate::{
    AllergyClass, Comorbidity, GfrCategory, InfectionSite, PatientProfile, PregnancyStatus,
    RecommendationResult, SeverityTier, Sex,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::Write;

/// Ages are reported in five-year buckets
const AGE_BUCKET_YEARS: u32 = 5;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AdvisorySummary {
    /// e.g. "40-44"; children under one are reported as "<1"
    pub age_range: String,
    pub sex: Sex,
    pub pregnancy_status: PregnancyStatus,
    pub infection_site: InfectionSite,
    pub hospital_acquired: bool,
    pub severity: SeverityTier,
    pub comorbidities: BTreeSet<Comorbidity>,
    /// Structured classes only; free-text notes may identify the patient
    pub allergy_classes: BTreeSet<AllergyClass>,
    pub gfr_category: Option<GfrCategory>,
    pub primary: String,
    pub alternatives: Vec<String>,
    pub precautions: Vec<String>,
    pub tables_version: String,
}

impl AdvisorySummary {
    pub fn from_result(profile: &PatientProfile, result: &RecommendationResult) -> Self {
        Self {
            age_range: age_range(profile.age_years),
            sex: profile.sex,
            pregnancy_status: profile.pregnancy_status,
            infection_site: profile.infection_site,
            hospital_acquired: profile.is_hospital_acquired,
            severity: result.rationale.severity,
            comorbidities: profile.comorbidities.clone(),
            allergy_classes: result.derived.allergy_classes.clone(),
            gfr_category: result.derived.gfr_category,
            primary: result.primary.name.clone(),
            alternatives: result.alternatives.iter().map(|r| r.name.clone()).collect(),
            precautions: result.precautions.clone(),
            tables_version: result.tables_version.clone(),
        }
    }

    /// Plain-text rendering for services that take a prompt rather than JSON
    pub fn to_prompt(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Patient: age {}, {:?}, pregnancy status {:?}",
            self.age_range, self.sex, self.pregnancy_status
        );
        let _ = writeln!(
            out,
            "Infection: {} ({}), severity {}",
            self.infection_site,
            if self.hospital_acquired {
                "hospital-acquired"
            } else {
                "community-acquired"
            },
            self.severity
        );
        if !self.comorbidities.is_empty() {
            let list: Vec<_> = self.comorbidities.iter().map(|c| format!("{:?}", c)).collect();
            let _ = writeln!(out, "Comorbidities: {}", list.join(", "));
        }
        if !self.allergy_classes.is_empty() {
            let list: Vec<_> = self.allergy_classes.iter().map(|c| c.label()).collect();
            let _ = writeln!(out, "Allergies: {}", list.join(", "));
        }
        if let Some(gfr) = self.gfr_category {
            let _ = writeln!(out, "Renal function: {} ({})", gfr, gfr.description());
        }
        let _ = writeln!(out, "Engine recommendation: {}", self.primary);
        if !self.alternatives.is_empty() {
            let _ = writeln!(out, "Alternatives: {}", self.alternatives.join(", "));
        }
        for precaution in &self.precautions {
            let _ = writeln!(out, "- {}", precaution);
        }
        out
    }
}

fn age_range(age_years: f64) -> String {
    if !(age_years >= 1.0) {
        return "<1".into();
    }
    let lower = (age_years as u32 / AGE_BUCKET_YEARS) * AGE_BUCKET_YEARS;
    format!("{}-{}", lower, lower + AGE_BUCKET_YEARS - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend;

    #[test]
    fn test_age_ranges() {
        assert_eq!(age_range(0.4), "<1");
        assert_eq!(age_range(3.0), "0-4");
        assert_eq!(age_range(42.7), "40-44");
    }

    #[test]
    fn test_summary_excludes_free_text() {
        let mut profile =
            PatientProfile::new(42.0, Sex::Female, 60.0, 160.0, InfectionSite::Urinary);
        profile
            .allergies
            .free_text
            .push("Sulfa rash, Dr Smith 2019".into());

        let summary = AdvisorySummary::from_result(&profile, &recommend(&profile));
        let json = serde_json::to_string(&summary).unwrap();

        assert!(!json.contains("Smith"));
        assert!(summary.allergy_classes.contains(&AllergyClass::Sulfonamide));
        assert_eq!(summary.age_range, "40-44");
        assert_eq!(summary.primary, "Nitrofurantoin");
    }

    #[test]
    fn test_prompt_mentions_recommendation() {
        let profile = PatientProfile::new(70.0, Sex::Male, 82.0, 175.0, InfectionSite::Skin);
        let summary = AdvisorySummary::from_result(&profile, &recommend(&profile));
        let prompt = summary.to_prompt();

        assert!(prompt.contains("Engine recommendation: Cephalexin"));
        assert!(prompt.contains("community-acquired"));
    }
}
