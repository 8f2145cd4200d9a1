//! Core domain types for the antibiotic recommendation engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Patient profile inputs (demographics, comorbidities, allergies)
//! - Derived facts (biometrics, renal function, severity, pathogens)
//! - Reference table entries (guidelines, contraindications, interactions)
//! - The recommendation output

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// Patient Inputs
// ============================================================================

/// Biological sex as recorded on the patient profile
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
    Other,
    Unknown,
}

/// Pregnancy and lactation status
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PregnancyStatus {
    None,
    Pregnant,
    Breastfeeding,
    #[serde(alias = "not-applicable")]
    NotApplicable,
}

impl PregnancyStatus {
    /// True when the pregnancy-unsafe drug list applies
    pub fn restricts_prescribing(self) -> bool {
        matches!(self, PregnancyStatus::Pregnant | PregnancyStatus::Breastfeeding)
    }
}

/// Anatomical site of the infection
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InfectionSite {
    Respiratory,
    Urinary,
    Skin,
    Other,
}

impl InfectionSite {
    pub fn as_str(self) -> &'static str {
        match self {
            InfectionSite::Respiratory => "respiratory",
            InfectionSite::Urinary => "urinary",
            InfectionSite::Skin => "skin",
            InfectionSite::Other => "other",
        }
    }

    /// Human-readable infection type used in the rationale
    pub fn description(self) -> &'static str {
        match self {
            InfectionSite::Respiratory => "Respiratory tract infection",
            InfectionSite::Urinary => "Urinary tract infection",
            InfectionSite::Skin => "Skin and soft tissue infection",
            InfectionSite::Other => "Unclassified infection",
        }
    }
}

impl fmt::Display for InfectionSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presenting symptom tags
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Symptom {
    Fever,
    ShortnessOfBreath,
    AlteredMentalStatus,
    Cough,
    Dysuria,
    UrinaryFrequency,
    FlankPain,
    Erythema,
    Swelling,
    Purulence,
    Chills,
    Fatigue,
}

/// Comorbidities that influence regimen choice and safety screening
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Comorbidity {
    KidneyDisease,
    LiverDisease,
    Diabetes,
    Immunosuppressed,
}

/// Drug class used both for allergy tags and for classifying formulary drugs
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AllergyClass {
    Penicillin,
    Cephalosporin,
    Carbapenem,
    Macrolide,
    Tetracycline,
    Fluoroquinolone,
    Sulfonamide,
    Lincosamide,
    Glycopeptide,
    Aminoglycoside,
    Nitrofuran,
    Oxazolidinone,
}

impl AllergyClass {
    pub fn label(self) -> &'static str {
        match self {
            AllergyClass::Penicillin => "Penicillin",
            AllergyClass::Cephalosporin => "Cephalosporin",
            AllergyClass::Carbapenem => "Carbapenem",
            AllergyClass::Macrolide => "Macrolide",
            AllergyClass::Tetracycline => "Tetracycline",
            AllergyClass::Fluoroquinolone => "Fluoroquinolone",
            AllergyClass::Sulfonamide => "Sulfonamide",
            AllergyClass::Lincosamide => "Lincosamide",
            AllergyClass::Glycopeptide => "Glycopeptide",
            AllergyClass::Aminoglycoside => "Aminoglycoside",
            AllergyClass::Nitrofuran => "Nitrofuran",
            AllergyClass::Oxazolidinone => "Oxazolidinone",
        }
    }

    /// Every class a free-text note names by class or drug-family stem
    ///
    /// Specific drug and brand names are resolved against the reference
    /// tables instead (see `ReferenceTables::classes_in_note`).
    pub fn from_free_text(text: &str) -> BTreeSet<Self> {
        let lower = text.to_lowercase();
        const STEMS: &[(&str, AllergyClass)] = &[
            ("penicillin", AllergyClass::Penicillin),
            ("cillin", AllergyClass::Penicillin),
            ("cephalosporin", AllergyClass::Cephalosporin),
            ("ceph", AllergyClass::Cephalosporin),
            ("cef", AllergyClass::Cephalosporin),
            ("carbapenem", AllergyClass::Carbapenem),
            ("penem", AllergyClass::Carbapenem),
            ("macrolide", AllergyClass::Macrolide),
            ("thromycin", AllergyClass::Macrolide),
            ("tetracycline", AllergyClass::Tetracycline),
            ("cycline", AllergyClass::Tetracycline),
            ("quinolone", AllergyClass::Fluoroquinolone),
            ("floxacin", AllergyClass::Fluoroquinolone),
            ("sulfa", AllergyClass::Sulfonamide),
            ("sulpha", AllergyClass::Sulfonamide),
            ("lincosamide", AllergyClass::Lincosamide),
            ("glycopeptide", AllergyClass::Glycopeptide),
            ("aminoglycoside", AllergyClass::Aminoglycoside),
            ("nitrofuran", AllergyClass::Nitrofuran),
            ("oxazolidinone", AllergyClass::Oxazolidinone),
        ];

        STEMS
            .iter()
            .filter(|(stem, _)| lower.contains(stem))
            .map(|(_, class)| *class)
            .collect()
    }
}

impl fmt::Display for AllergyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recorded allergies: structured class tags plus free-text notes
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Allergies {
    #[serde(default)]
    pub classes: BTreeSet<AllergyClass>,
    #[serde(default)]
    pub free_text: Vec<String>,
}

impl Allergies {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.free_text.iter().all(|t| t.trim().is_empty())
    }
}

/// Severity tier used to select a regimen
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Mild,
    Moderate,
    Severe,
}

impl SeverityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            SeverityTier::Mild => "mild",
            SeverityTier::Moderate => "moderate",
            SeverityTier::Severe => "severe",
        }
    }
}

impl fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patient profile supplied by the caller, immutable for the duration of a call
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PatientProfile {
    pub age_years: f64,
    pub sex: Sex,
    pub weight_kg: f64,
    pub height_cm: f64,
    #[serde(default = "default_pregnancy_status")]
    pub pregnancy_status: PregnancyStatus,
    #[serde(default)]
    pub serum_creatinine_mg_dl: Option<f64>,
    pub infection_site: InfectionSite,
    #[serde(default)]
    pub is_hospital_acquired: bool,
    #[serde(default)]
    pub symptoms: BTreeSet<Symptom>,
    #[serde(default)]
    pub duration_days: u32,
    #[serde(default)]
    pub comorbidities: BTreeSet<Comorbidity>,
    #[serde(default)]
    pub allergies: Allergies,
    #[serde(default)]
    pub recent_antibiotics: bool,
    /// Clinician-confirmed severity; overrides the scored tier when present
    #[serde(default)]
    pub confirmed_severity: Option<SeverityTier>,
    /// Co-administered drugs; `None` means the list is unknown
    #[serde(default)]
    pub current_medications: Option<Vec<String>>,
}

fn default_pregnancy_status() -> PregnancyStatus {
    PregnancyStatus::NotApplicable
}

// ============================================================================
// Derived Facts
// ============================================================================

/// WHO body-mass-index category
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

/// Kidney function band derived from estimated GFR (mL/min)
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GfrCategory {
    G1,
    G2,
    G3a,
    G3b,
    G4,
    G5,
}

impl GfrCategory {
    pub fn description(self) -> &'static str {
        match self {
            GfrCategory::G1 => "normal or high",
            GfrCategory::G2 => "mildly decreased",
            GfrCategory::G3a => "mildly to moderately decreased",
            GfrCategory::G3b => "moderately to severely decreased",
            GfrCategory::G4 => "severely decreased",
            GfrCategory::G5 => "kidney failure",
        }
    }
}

impl fmt::Display for GfrCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Point-based severity score and the tier it maps to
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeverityScore {
    pub points: u32,
    pub tier: SeverityTier,
}

/// A likely pathogen with an independent probability (0-100)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PathogenLikelihood {
    pub pathogen: String,
    pub probability: u8,
    #[serde(default)]
    pub known_resistance: Option<String>,
}

/// Facts derived from a profile, built once per call
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DerivedFacts {
    pub bmi: Option<f64>,
    pub bmi_category: Option<BmiCategory>,
    pub ideal_body_weight_kg: Option<f64>,
    /// Equal to actual weight unless actual exceeds 1.2x ideal
    pub adjusted_body_weight_kg: Option<f64>,
    pub creatinine_clearance_ml_min: Option<f64>,
    pub gfr_category: Option<GfrCategory>,
    pub age_band: Option<AgeBand>,
    pub severity: SeverityScore,
    pub likely_pathogens: Vec<PathogenLikelihood>,
    /// Structured classes plus every class the free-text notes name
    #[serde(default)]
    pub allergy_classes: BTreeSet<AllergyClass>,
}

/// Pediatric age bands used for weight-based dosing
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    Neonate,
    Infant,
    Toddler,
    Preschool,
    SchoolAge,
    Adolescent,
}

impl AgeBand {
    pub fn label(self) -> &'static str {
        match self {
            AgeBand::Neonate => "neonate",
            AgeBand::Infant => "infant",
            AgeBand::Toddler => "toddler",
            AgeBand::Preschool => "preschool",
            AgeBand::SchoolAge => "school-age",
            AgeBand::Adolescent => "adolescent",
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Reference Table Entries
// ============================================================================

/// Strength of the evidence behind a guideline
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum EvidenceLevel {
    A,
    B,
    C,
}

/// A named drug + dose + route + duration tuple with the reason it applies
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Regimen {
    pub name: String,
    pub dose: String,
    pub route: String,
    pub duration: String,
    pub reason: String,
}

/// Name used for the terminal "no safe rule" outcome
pub const CONSULTATION_REQUIRED: &str = "Consultation Required";

impl Regimen {
    pub fn new(name: &str, dose: &str, route: &str, duration: &str, reason: &str) -> Self {
        Self {
            name: name.into(),
            dose: dose.into(),
            route: route.into(),
            duration: duration.into(),
            reason: reason.into(),
        }
    }

    /// Terminal regimen used when no rule or no safe drug applies
    pub fn consultation_required(reason: impl Into<String>) -> Self {
        Self {
            name: CONSULTATION_REQUIRED.into(),
            dose: "N/A".into(),
            route: "N/A".into(),
            duration: "N/A".into(),
            reason: reason.into(),
        }
    }

    pub fn is_consultation_required(&self) -> bool {
        self.name == CONSULTATION_REQUIRED
    }

    /// Same regimen with a different reason
    pub fn with_reason(&self, reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            ..self.clone()
        }
    }
}

/// Guideline for one condition key (site + severity + modifiers)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GuidelineEntry {
    pub condition_key: String,
    pub first_line: Vec<Regimen>,
    pub second_line: Vec<Regimen>,
    pub duration_text: String,
    #[serde(default)]
    pub special_considerations: Vec<String>,
    pub evidence_level: EvidenceLevel,
}

/// Whether a contraindication forbids the drug or only warrants caution
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContraindicationSeverity {
    Absolute,
    Relative,
}

/// Patient condition that triggers a contraindication
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContraindicationCondition {
    Allergy { class: AllergyClass },
    /// Kidney disease flag, or creatinine clearance below 30 mL/min
    KidneyDisease,
    LiverDisease,
    /// Patient younger than the given age in years
    AgeBelow { years: f64 },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContraindicationEntry {
    pub drug: String,
    pub condition: ContraindicationCondition,
    pub severity: ContraindicationSeverity,
    pub rationale: String,
    #[serde(default)]
    pub alternatives: Vec<String>,
}

/// Drug-drug interaction severity, ordered from least to most serious
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum InteractionSeverity {
    Minor,
    Moderate,
    Major,
    Contraindicated,
}

impl InteractionSeverity {
    /// Contraindicated and major interactions block the candidate
    pub fn is_blocking(self) -> bool {
        matches!(
            self,
            InteractionSeverity::Major | InteractionSeverity::Contraindicated
        )
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InteractionEntry {
    pub drug: String,
    pub interacting_drug: String,
    pub severity: InteractionSeverity,
    pub mechanism: String,
    pub management: String,
}

/// Renal dose guidance for a set of GFR bands
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RenalDoseRule {
    pub bands: Vec<GfrCategory>,
    pub guidance: String,
}

/// Renal dosing data for one drug
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RenalDosing {
    pub drug: String,
    pub rules: Vec<RenalDoseRule>,
    /// Used when kidney disease is flagged but clearance cannot be computed
    pub unknown_function_guidance: String,
}

/// Adult weight-based dose rule (mg/kg per dose)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeightBasedRule {
    pub mg_per_kg: f64,
    pub max_dose_mg: f64,
    pub frequency: String,
    /// Dose obese patients on adjusted rather than actual body weight
    #[serde(default)]
    pub use_adjusted_weight: bool,
}

/// Pediatric mg/kg rule for one age band
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PediatricDoseRule {
    pub band: AgeBand,
    pub mg_per_kg: f64,
    pub max_dose_mg: f64,
    pub frequency: String,
}

// ============================================================================
// Recommendation Output
// ============================================================================

/// Which weight a weight-based dose was computed from
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WeightBasis {
    Actual,
    Adjusted,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WeightBasedDose {
    pub dosing_weight_kg: f64,
    pub weight_basis: WeightBasis,
    pub mg_per_kg: f64,
    pub dose_mg: f64,
    pub max_dose_mg: f64,
    pub frequency: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RenalAdjustment {
    pub creatinine_clearance_ml_min: Option<f64>,
    pub gfr_category: Option<GfrCategory>,
    pub guidance: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PediatricFactors {
    pub age_band: AgeBand,
    pub mg_per_kg: f64,
    pub calculated_dose_mg: f64,
    pub max_dose_mg: f64,
    pub capped: bool,
    pub frequency: String,
}

/// Dose calculation annotations attached to the primary regimen
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Calculations {
    pub weight_based: Option<WeightBasedDose>,
    pub renal_adjustment: Option<RenalAdjustment>,
    pub pediatric_factors: Option<PediatricFactors>,
}

/// Structured explanation of how the recommendation was reached
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rationale {
    pub infection_type: String,
    pub severity: SeverityTier,
    pub scored_severity: SeverityScore,
    pub reasons: Vec<String>,
    pub allergy_considerations: Vec<String>,
    pub dose_adjustments: Vec<String>,
    pub likely_pathogens: Vec<PathogenLikelihood>,
}

/// The engine's output, built once per call and never mutated afterwards
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub primary: Regimen,
    pub alternatives: Vec<Regimen>,
    pub calculations: Calculations,
    pub precautions: Vec<String>,
    pub rationale: Rationale,
    pub derived: DerivedFacts,
    pub tables_version: String,
}

impl RecommendationResult {
    pub fn is_consultation_required(&self) -> bool {
        self.primary.is_consultation_required()
    }
}
