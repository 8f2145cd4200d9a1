//! Recommendation selector.
//!
//! A four-state pipeline, each state a distinct type so a transition cannot be
//! skipped or repeated:
//!
//! ```text
//! SiteSelected -> BaseRegimenChosen -> SafetyScreened -> Finalized
//! ```
//!
//! 1. **SiteSelected**: facts are derived and the operative severity fixed
//! 2. **BaseRegimenChosen**: the guideline's first-line regimen for
//!    (site, severity, diabetes), or "Consultation Required" when no rule exists
//! 3. **SafetyScreened**: one screening pass with at most one substitution
//! 4. **Finalized**: dose annotations, precautions and screened alternatives
//!
//! Every path ends in a [`RecommendationResult`]; nothing here returns an error.

use crate::biometrics::derive_facts_with;
use crate::rationale::{push_unique, RationaleBuilder};
use crate::reference::{get_default_tables, ReferenceTables};
use crate::safety::{SafetyCategory, SafetyContext, SafetyNote, Substitution, Verdict};
use crate::{
    dosing, pathogens, severity, Comorbidity, DerivedFacts, GuidelineEntry, InfectionSite,
    PatientProfile, RecommendationResult, Regimen, SeverityTier, WeightBasis,
};

const UNCLASSIFIED_SITE_REASON: &str = "Complex infection requiring specialist consultation";

/// Recommend a regimen using the embedded reference tables
pub fn recommend(profile: &PatientProfile) -> RecommendationResult {
    recommend_with(profile, get_default_tables())
}

/// Recommend a regimen against a specific set of reference tables
pub fn recommend_with(profile: &PatientProfile, tables: &ReferenceTables) -> RecommendationResult {
    SiteSelected::new(profile, tables)
        .choose_base_regimen()
        .screen()
        .finalize()
}

/// Guideline key for a (site, severity, diabetes) combination
///
/// Diabetes broadens skin coverage: mild diabetic infections get their own
/// oral regimen, moderate and severe ones share the complicated regimen.
pub fn condition_key(
    site: InfectionSite,
    severity: SeverityTier,
    diabetic: bool,
) -> Option<&'static str> {
    use InfectionSite::*;
    use SeverityTier::*;

    match (site, severity, diabetic) {
        (Respiratory, Mild, _) => Some("respiratory:mild"),
        (Respiratory, Moderate, _) => Some("respiratory:moderate"),
        (Respiratory, Severe, _) => Some("respiratory:severe"),
        (Urinary, Mild, _) => Some("urinary:mild"),
        (Urinary, Moderate, _) => Some("urinary:moderate"),
        (Urinary, Severe, _) => Some("urinary:severe"),
        (Skin, Mild, true) => Some("skin:diabetic:mild"),
        (Skin, Moderate | Severe, true) => Some("skin:diabetic:complicated"),
        (Skin, Mild, false) => Some("skin:mild"),
        (Skin, Moderate, false) => Some("skin:moderate"),
        (Skin, Severe, false) => Some("skin:severe"),
        (Other, _, _) => None,
    }
}

/// State carried through every transition
struct Selection<'a> {
    profile: &'a PatientProfile,
    tables: &'a ReferenceTables,
    facts: DerivedFacts,
    severity: SeverityTier,
    rationale: RationaleBuilder,
    /// Precaution text in the order it was raised
    precautions: Vec<String>,
}

impl<'a> Selection<'a> {
    fn safety(&self, guideline: Option<&'a GuidelineEntry>) -> SafetyContext<'_> {
        SafetyContext {
            profile: self.profile,
            facts: &self.facts,
            tables: self.tables,
            guideline,
        }
    }

    fn record_note(&mut self, note: &SafetyNote) {
        if note.category == SafetyCategory::Allergy {
            self.rationale.allergy_consideration(note.text.clone());
        }
        push_unique(&mut self.precautions, note.text.clone());
    }
}

struct SiteSelected<'a> {
    selection: Selection<'a>,
}

struct BaseRegimenChosen<'a> {
    selection: Selection<'a>,
    guideline: Option<&'a GuidelineEntry>,
    base: Regimen,
}

struct SafetyScreened<'a> {
    selection: Selection<'a>,
    guideline: Option<&'a GuidelineEntry>,
    base: Regimen,
    primary: Regimen,
}

impl<'a> SiteSelected<'a> {
    fn new(profile: &'a PatientProfile, tables: &'a ReferenceTables) -> Self {
        let facts = derive_facts_with(profile, tables);
        let scored = facts.severity;
        let operative = severity::operative_severity(scored, profile.confirmed_severity);

        let mut rationale = RationaleBuilder::new(
            profile.infection_site,
            profile.is_hospital_acquired,
            operative,
            scored,
        );
        match profile.confirmed_severity {
            Some(confirmed) if confirmed != scored.tier => {
                rationale.reason(format!(
                    "Clinician-confirmed severity '{}' used; symptom score suggested '{}' ({} points)",
                    confirmed, scored.tier, scored.points
                ));
            }
            Some(confirmed) => {
                rationale.reason(format!(
                    "Clinician-confirmed severity '{}' matches the symptom score ({} points)",
                    confirmed, scored.points
                ));
            }
            None => {
                rationale.reason(format!(
                    "Severity '{}' from symptom score ({} points)",
                    scored.tier, scored.points
                ));
            }
        }

        for class in &facts.allergy_classes {
            rationale.allergy_consideration(format!("Documented {} allergy", class));
        }
        rationale.pathogens(facts.likely_pathogens.clone());

        tracing::debug!(
            "SiteSelected: site={}, severity={}",
            profile.infection_site,
            operative
        );

        Self {
            selection: Selection {
                profile,
                tables,
                facts,
                severity: operative,
                rationale,
                precautions: Vec::new(),
            },
        }
    }

    fn choose_base_regimen(self) -> BaseRegimenChosen<'a> {
        let mut selection = self.selection;
        let profile = selection.profile;
        let key = condition_key(
            profile.infection_site,
            selection.severity,
            profile.has_comorbidity(Comorbidity::Diabetes),
        );

        let (guideline, base) = match key {
            None => (None, Regimen::consultation_required(UNCLASSIFIED_SITE_REASON)),
            Some(key) => match selection.tables.guideline(key) {
                Some(entry) => match entry.first_line.first() {
                    Some(first) => {
                        selection.rationale.reason(format!(
                            "Guideline {} (evidence level {:?}): {} first line",
                            key, entry.evidence_level, first.name
                        ));
                        (Some(entry), first.clone())
                    }
                    None => (
                        Some(entry),
                        Regimen::consultation_required(format!(
                            "No first-line regimen for {}; specialist consultation required",
                            key
                        )),
                    ),
                },
                None => {
                    tracing::warn!("No guideline for condition key '{}'", key);
                    (
                        None,
                        Regimen::consultation_required(format!(
                            "No guideline for {}; specialist consultation required",
                            key
                        )),
                    )
                }
            },
        };

        if base.is_consultation_required() {
            selection.rationale.reason(base.reason.clone());
        }

        tracing::debug!("BaseRegimenChosen: {}", base.name);
        BaseRegimenChosen {
            selection,
            guideline,
            base,
        }
    }
}

impl<'a> BaseRegimenChosen<'a> {
    fn screen(self) -> SafetyScreened<'a> {
        let mut selection = self.selection;
        let guideline = self.guideline;
        let base = self.base;

        if base.is_consultation_required() {
            return SafetyScreened {
                selection,
                guideline,
                primary: base.clone(),
                base,
            };
        }

        let verdict = selection.safety(guideline).screen(&base);
        let primary = match verdict {
            Verdict::Clear { precautions } => {
                for note in &precautions {
                    selection.record_note(note);
                }
                base.clone()
            }
            Verdict::Blocked {
                finding,
                replacements,
            } => {
                selection.record_note(&finding);
                let substitution = selection
                    .safety(guideline)
                    .substitute(&base.name, &replacements);

                match substitution {
                    Substitution::Replaced {
                        regimen,
                        precautions,
                    } => {
                        for note in &precautions {
                            selection.record_note(note);
                        }
                        selection.rationale.reason(format!(
                            "{} substituted for {}",
                            regimen.name, base.name
                        ));
                        regimen.with_reason(format!("Replaces {}. {}", base.name, finding.text))
                    }
                    Substitution::NoSafeAlternative => {
                        tracing::info!("No safe alternative to {}, escalating", base.name);
                        let reason = format!(
                            "No safe alternative to {} ({}); specialist consultation required",
                            base.name, finding.text
                        );
                        selection.rationale.reason(reason.clone());
                        Regimen::consultation_required(reason)
                    }
                }
            }
        };

        tracing::debug!("SafetyScreened: {} -> {}", base.name, primary.name);
        SafetyScreened {
            selection,
            guideline,
            base,
            primary,
        }
    }
}

impl<'a> SafetyScreened<'a> {
    fn finalize(self) -> RecommendationResult {
        let mut selection = self.selection;
        let mut primary = self.primary;
        let profile = selection.profile;
        let tables = selection.tables;

        let calculations = if primary.is_consultation_required() {
            Default::default()
        } else {
            dosing::annotate(tables, &primary.name, profile, &selection.facts)
        };

        if let Some(pediatric) = &calculations.pediatric_factors {
            primary.dose = dosing::format_dose(pediatric.calculated_dose_mg, &pediatric.frequency);
            selection.rationale.dose_adjustment(format!(
                "Pediatric {} dosing: {} mg/kg x {:.1} kg = {:.0} mg{}",
                pediatric.age_band,
                pediatric.mg_per_kg,
                profile.weight_kg,
                pediatric.calculated_dose_mg,
                if pediatric.capped {
                    format!(" (capped at the {:.0} mg maximum)", pediatric.max_dose_mg)
                } else {
                    String::new()
                }
            ));
        }
        if let Some(weight_based) = &calculations.weight_based {
            let basis = match weight_based.weight_basis {
                WeightBasis::Actual => "actual",
                WeightBasis::Adjusted => "adjusted",
            };
            selection.rationale.dose_adjustment(format!(
                "{} {} mg/kg x {:.1} kg {} body weight = {:.0} mg {}",
                primary.name,
                weight_based.mg_per_kg,
                weight_based.dosing_weight_kg,
                basis,
                weight_based.dose_mg,
                weight_based.frequency
            ));
        }
        if let Some(renal) = &calculations.renal_adjustment {
            selection
                .rationale
                .dose_adjustment(format!("Renal adjustment: {}", renal.guidance));
        }

        let alternatives = self.guideline.map_or_else(Vec::new, |guideline| {
            screened_alternatives(&selection, guideline, &primary, &self.base)
        });

        if let Some(guideline) = self.guideline {
            for consideration in &guideline.special_considerations {
                push_unique(&mut selection.precautions, consideration.clone());
            }
        }
        if profile.recent_antibiotics {
            push_unique(
                &mut selection.precautions,
                "Recent antibiotic exposure raises the risk of resistant organisms; obtain cultures before starting therapy".into(),
            );
        }
        if profile.is_hospital_acquired {
            let resistant = pathogens::resistant_pathogens(&selection.facts.likely_pathogens);
            if !resistant.is_empty() {
                push_unique(
                    &mut selection.precautions,
                    format!(
                        "Hospital-acquired infection: consider coverage for {}",
                        resistant.join(", ")
                    ),
                );
            }
        }
        if profile.has_comorbidity(Comorbidity::Immunosuppressed) {
            push_unique(
                &mut selection.precautions,
                "Immunosuppressed patient: low threshold for broader coverage and specialist input".into(),
            );
        }
        if primary.is_consultation_required() {
            push_unique(
                &mut selection.precautions,
                "Specialist consultation required before prescribing".into(),
            );
        }

        tracing::debug!(
            "Finalized: {} with {} alternative(s)",
            primary.name,
            alternatives.len()
        );

        RecommendationResult {
            primary,
            alternatives,
            calculations,
            precautions: selection.precautions,
            rationale: selection.rationale.build(),
            derived: selection.facts,
            tables_version: tables.version.clone(),
        }
    }
}

/// Second-line regimens that screen clear, excluding the primary and the blocked base
fn screened_alternatives(
    selection: &Selection<'_>,
    guideline: &GuidelineEntry,
    primary: &Regimen,
    base: &Regimen,
) -> Vec<Regimen> {
    let tables = selection.tables;
    let excluded = [
        tables.canonical_key(&primary.name),
        tables.canonical_key(&base.name),
    ];
    let safety = selection.safety(Some(guideline));

    guideline
        .second_line
        .iter()
        .filter(|candidate| !excluded.contains(&tables.canonical_key(&candidate.name)))
        .filter(|candidate| match safety.screen(candidate) {
            Verdict::Clear { .. } => true,
            Verdict::Blocked { finding, .. } => {
                tracing::debug!("Alternative {} dropped: {}", candidate.name, finding.text);
                false
            }
        })
        .cloned()
        .collect()
}
