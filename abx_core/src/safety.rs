//! Safety screening for a candidate regimen.
//!
//! Blocking checks run in a fixed order and the first hit wins:
//! 1. Absolute contraindications (allergy class, kidney disease, liver
//!    disease, pediatric age limit), then free-text allergies naming the drug
//! 2. Pregnancy/breastfeeding unsafe list
//! 3. Contraindicated or major interactions with known co-medications
//!
//! Relative contraindications, minor/moderate interactions, hepatic monitoring
//! and renal dose guidance never block; they become precautions.

use crate::reference::ReferenceTables;
use crate::{
    dosing, Comorbidity, ContraindicationCondition, ContraindicationSeverity, DerivedFacts,
    GuidelineEntry, PatientProfile, Regimen,
};
use std::collections::BTreeSet;

/// Creatinine clearance below which the kidney-disease condition applies
pub const KIDNEY_DISEASE_CRCL: f64 = 30.0;

/// What a safety note is about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SafetyCategory {
    Allergy,
    Renal,
    Hepatic,
    Age,
    Pregnancy,
    Interaction,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SafetyNote {
    pub category: SafetyCategory,
    pub text: String,
}

impl SafetyNote {
    fn new(category: SafetyCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }
}

/// Outcome of screening one candidate
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    Clear {
        precautions: Vec<SafetyNote>,
    },
    /// Replacements are listed in preference order and are not yet screened
    Blocked {
        finding: SafetyNote,
        replacements: Vec<Regimen>,
    },
}

impl Verdict {
    pub fn is_clear(&self) -> bool {
        matches!(self, Verdict::Clear { .. })
    }
}

/// Everything a screen needs, borrowed for the duration of one call
#[derive(Clone, Copy)]
pub struct SafetyContext<'a> {
    pub profile: &'a PatientProfile,
    pub facts: &'a DerivedFacts,
    pub tables: &'a ReferenceTables,
    /// Guideline in force, used to resolve replacement regimens
    pub guideline: Option<&'a GuidelineEntry>,
}

/// Result of the single substitution pass
#[derive(Clone, Debug, PartialEq)]
pub enum Substitution {
    Replaced {
        regimen: Regimen,
        precautions: Vec<SafetyNote>,
    },
    NoSafeAlternative,
}

impl<'a> SafetyContext<'a> {
    /// Screen one candidate regimen
    pub fn screen(&self, candidate: &Regimen) -> Verdict {
        let drug = candidate.name.as_str();
        let mut precautions = Vec::new();

        if let Some(blocked) = self.check_contraindications(drug, &mut precautions) {
            return blocked;
        }
        if let Some(blocked) = self.check_free_text_allergies(drug) {
            return blocked;
        }
        if let Some(blocked) = self.check_pregnancy(drug) {
            return blocked;
        }
        if let Some(blocked) = self.check_interactions(drug, &mut precautions) {
            return blocked;
        }

        self.check_hepatic(drug, &mut precautions);
        self.check_renal(drug, &mut precautions);

        Verdict::Clear { precautions }
    }

    /// Scan replacements in order and take the first that screens clear
    ///
    /// Candidates are screened once each; a blocked replacement is skipped,
    /// never substituted in turn.
    pub fn substitute(&self, blocked_drug: &str, replacements: &[Regimen]) -> Substitution {
        let blocked_key = self.tables.canonical_key(blocked_drug);
        for candidate in replacements {
            if self.tables.canonical_key(&candidate.name) == blocked_key {
                continue;
            }
            match self.screen(candidate) {
                Verdict::Clear { precautions } => {
                    tracing::info!("Substituting {} for {}", candidate.name, blocked_drug);
                    return Substitution::Replaced {
                        regimen: candidate.clone(),
                        precautions,
                    };
                }
                Verdict::Blocked { finding, .. } => {
                    tracing::debug!(
                        "Replacement {} also blocked: {}",
                        candidate.name,
                        finding.text
                    );
                }
            }
        }
        Substitution::NoSafeAlternative
    }

    /// Resolve a drug name to a regimen: guideline lines first, then the formulary
    pub fn resolve_regimen(&self, drug: &str) -> Option<Regimen> {
        let key = self.tables.canonical_key(drug);
        if let Some(guideline) = self.guideline {
            if let Some(found) = guideline
                .second_line
                .iter()
                .chain(&guideline.first_line)
                .find(|r| self.tables.canonical_key(&r.name) == key)
            {
                return Some(found.clone());
            }
        }
        self.tables.formulary_regimen(drug).cloned()
    }

    fn resolve_all(&self, drugs: &[String]) -> Vec<Regimen> {
        drugs
            .iter()
            .filter_map(|drug| {
                let resolved = self.resolve_regimen(drug);
                if resolved.is_none() {
                    tracing::warn!("Alternative '{}' is not in the formulary", drug);
                }
                resolved
            })
            .collect()
    }

    fn guideline_second_line(&self) -> Vec<Regimen> {
        self.guideline
            .map(|g| g.second_line.clone())
            .unwrap_or_default()
    }

    fn kidney_disease(&self) -> bool {
        self.profile.has_comorbidity(Comorbidity::KidneyDisease)
            || self
                .facts
                .creatinine_clearance_ml_min
                .map_or(false, |crcl| crcl < KIDNEY_DISEASE_CRCL)
    }

    fn check_contraindications(
        &self,
        drug: &str,
        precautions: &mut Vec<SafetyNote>,
    ) -> Option<Verdict> {
        let allergy_classes = &self.facts.allergy_classes;

        for entry in self.tables.contraindications_for(drug) {
            let category = match &entry.condition {
                ContraindicationCondition::Allergy { class } if allergy_classes.contains(class) => {
                    SafetyCategory::Allergy
                }
                ContraindicationCondition::KidneyDisease if self.kidney_disease() => {
                    SafetyCategory::Renal
                }
                ContraindicationCondition::LiverDisease
                    if self.profile.has_comorbidity(Comorbidity::LiverDisease) =>
                {
                    SafetyCategory::Hepatic
                }
                ContraindicationCondition::AgeBelow { years } if self.profile.age_years < *years => {
                    SafetyCategory::Age
                }
                _ => continue,
            };

            match entry.severity {
                ContraindicationSeverity::Absolute => {
                    tracing::debug!("Absolute contraindication for {}: {}", drug, entry.rationale);
                    return Some(Verdict::Blocked {
                        finding: SafetyNote::new(
                            category,
                            format!("{} contraindicated: {}", drug, entry.rationale),
                        ),
                        replacements: self.resolve_all(&entry.alternatives),
                    });
                }
                ContraindicationSeverity::Relative => {
                    precautions.push(SafetyNote::new(
                        category,
                        format!("Use {} with caution: {}", drug, entry.rationale),
                    ));
                }
            }
        }
        None
    }

    fn check_free_text_allergies(&self, drug: &str) -> Option<Verdict> {
        let note = self
            .profile
            .allergies
            .free_text
            .iter()
            .find(|text| self.tables.note_names_drug(text, drug))?;

        Some(Verdict::Blocked {
            finding: SafetyNote::new(
                SafetyCategory::Allergy,
                format!("{} avoided: documented allergy \"{}\"", drug, note.trim()),
            ),
            replacements: self.guideline_second_line(),
        })
    }

    fn check_pregnancy(&self, drug: &str) -> Option<Verdict> {
        if !self.profile.pregnancy_status.restricts_prescribing()
            || !self.tables.is_pregnancy_unsafe(drug)
        {
            return None;
        }

        Some(Verdict::Blocked {
            finding: SafetyNote::new(
                SafetyCategory::Pregnancy,
                format!(
                    "{} is not safe during pregnancy or breastfeeding; a pregnancy-safe alternative is required",
                    drug
                ),
            ),
            replacements: self
                .tables
                .pregnancy_safe_fallbacks(self.profile.infection_site)
                .to_vec(),
        })
    }

    fn check_interactions(
        &self,
        drug: &str,
        precautions: &mut Vec<SafetyNote>,
    ) -> Option<Verdict> {
        let Some(medications) = &self.profile.current_medications else {
            tracing::debug!("Co-medications unknown, skipping interaction check for {}", drug);
            return None;
        };

        // Report each (interacting drug) once even if listed under several names
        let mut seen = BTreeSet::new();
        for entry in self.tables.interactions_for(drug) {
            let Some(medication) = medications
                .iter()
                .find(|med| self.tables.medication_matches(med, &entry.interacting_drug))
            else {
                continue;
            };
            if !seen.insert(entry.interacting_drug.as_str()) {
                continue;
            }

            let text = format!(
                "{} interaction between {} and {}: {}. {}",
                severity_label(entry.severity),
                drug,
                medication.trim(),
                entry.mechanism,
                entry.management
            );
            if entry.severity.is_blocking() {
                return Some(Verdict::Blocked {
                    finding: SafetyNote::new(SafetyCategory::Interaction, text),
                    replacements: self.guideline_second_line(),
                });
            }
            precautions.push(SafetyNote::new(SafetyCategory::Interaction, text));
        }
        None
    }

    fn check_hepatic(&self, drug: &str, precautions: &mut Vec<SafetyNote>) {
        if self.profile.has_comorbidity(Comorbidity::LiverDisease) && self.tables.is_hepatotoxic(drug)
        {
            precautions.push(SafetyNote::new(
                SafetyCategory::Hepatic,
                format!(
                    "{} is hepatotoxic: monitor liver function tests during therapy",
                    drug
                ),
            ));
        }
    }

    fn check_renal(&self, drug: &str, precautions: &mut Vec<SafetyNote>) {
        if let Some(adjustment) =
            dosing::renal_adjustment(self.tables, drug, self.profile, self.facts)
        {
            let band = adjustment
                .gfr_category
                .map(|c| format!(" (GFR {})", c))
                .unwrap_or_default();
            precautions.push(SafetyNote::new(
                SafetyCategory::Renal,
                format!("Renal dose adjustment for {}{}: {}", drug, band, adjustment.guidance),
            ));
        }
    }
}

fn severity_label(severity: crate::InteractionSeverity) -> &'static str {
    match severity {
        crate::InteractionSeverity::Minor => "Minor",
        crate::InteractionSeverity::Moderate => "Moderate",
        crate::InteractionSeverity::Major => "Major",
        crate::InteractionSeverity::Contraindicated => "Contraindicated",
    }
}
