//! Dose calculation annotations.
//!
//! Three independent annotators, each returning `None` when it does not apply
//! or its inputs are missing:
//! - Adult weight-based dosing (mg/kg with an absolute cap)
//! - Renal adjustment keyed to the GFR band
//! - Pediatric mg/kg dosing per age band
//!
//! None of them invent a dose: no table entry means no annotation.

use crate::reference::ReferenceTables;
use crate::{
    Calculations, Comorbidity, DerivedFacts, PatientProfile, PediatricFactors, RenalAdjustment,
    WeightBasedDose, WeightBasis,
};

/// Creatinine clearance below which renal guidance applies without the comorbidity flag
pub const RENAL_ADJUSTMENT_CRCL: f64 = 60.0;

/// Adult weight-based dose, capped at the rule's maximum
pub fn weight_based_dose(
    tables: &ReferenceTables,
    drug: &str,
    profile: &PatientProfile,
    facts: &DerivedFacts,
) -> Option<WeightBasedDose> {
    if profile.is_pediatric() || !profile.has_usable_biometrics() {
        return None;
    }
    let rule = tables.weight_based_rule(drug)?;

    let (dosing_weight_kg, weight_basis) = match facts.adjusted_body_weight_kg {
        Some(adjusted) if rule.use_adjusted_weight && adjusted < profile.weight_kg => {
            (adjusted, WeightBasis::Adjusted)
        }
        _ => (profile.weight_kg, WeightBasis::Actual),
    };

    let dose_mg = (rule.mg_per_kg * dosing_weight_kg).min(rule.max_dose_mg);
    tracing::debug!(
        "Weight-based dose for {}: {:.1} kg x {} mg/kg = {:.0} mg",
        drug,
        dosing_weight_kg,
        rule.mg_per_kg,
        dose_mg
    );

    Some(WeightBasedDose {
        dosing_weight_kg,
        weight_basis,
        mg_per_kg: rule.mg_per_kg,
        dose_mg,
        max_dose_mg: rule.max_dose_mg,
        frequency: rule.frequency.clone(),
    })
}

/// Does renal dose guidance apply to this patient at all?
pub fn renal_impairment_suspected(profile: &PatientProfile, facts: &DerivedFacts) -> bool {
    profile.has_comorbidity(Comorbidity::KidneyDisease)
        || facts
            .creatinine_clearance_ml_min
            .map_or(false, |crcl| crcl < RENAL_ADJUSTMENT_CRCL)
}

/// Renal dose guidance for the drug's GFR band
///
/// With kidney disease flagged but no computable clearance, the drug's
/// "function unknown" guidance is returned instead.
pub fn renal_adjustment(
    tables: &ReferenceTables,
    drug: &str,
    profile: &PatientProfile,
    facts: &DerivedFacts,
) -> Option<RenalAdjustment> {
    if !renal_impairment_suspected(profile, facts) {
        return None;
    }
    let dosing = tables.renal_dosing_for(drug)?;

    let guidance = match facts.gfr_category {
        Some(category) => {
            let Some(rule) = dosing.rules.iter().find(|rule| rule.bands.contains(&category)) else {
                tracing::warn!("No renal rule for {} in band {}, omitting adjustment", drug, category);
                return None;
            };
            rule.guidance.clone()
        }
        None => dosing.unknown_function_guidance.clone(),
    };

    Some(RenalAdjustment {
        creatinine_clearance_ml_min: facts.creatinine_clearance_ml_min,
        gfr_category: facts.gfr_category,
        guidance,
    })
}

/// Pediatric mg/kg dose for the patient's age band
pub fn pediatric_factors(
    tables: &ReferenceTables,
    drug: &str,
    profile: &PatientProfile,
    facts: &DerivedFacts,
) -> Option<PediatricFactors> {
    let band = facts.age_band?;
    if !(profile.weight_kg > 0.0) || !profile.weight_kg.is_finite() {
        return None;
    }
    let Some(rule) = tables.pediatric_rule(drug, band) else {
        tracing::debug!("No pediatric rule for {} ({}), omitting", drug, band);
        return None;
    };

    let calculated = rule.mg_per_kg * profile.weight_kg;
    let capped = calculated > rule.max_dose_mg;

    Some(PediatricFactors {
        age_band: band,
        mg_per_kg: rule.mg_per_kg,
        calculated_dose_mg: calculated.min(rule.max_dose_mg),
        max_dose_mg: rule.max_dose_mg,
        capped,
        frequency: rule.frequency.clone(),
    })
}

/// All calculation annotations for one drug
pub fn annotate(
    tables: &ReferenceTables,
    drug: &str,
    profile: &PatientProfile,
    facts: &DerivedFacts,
) -> Calculations {
    Calculations {
        weight_based: weight_based_dose(tables, drug, profile, facts),
        renal_adjustment: renal_adjustment(tables, drug, profile, facts),
        pediatric_factors: pediatric_factors(tables, drug, profile, facts),
    }
}

/// Render a dose in whole milligrams with its frequency
pub fn format_dose(dose_mg: f64, frequency: &str) -> String {
    format!("{:.0}mg {}", dose_mg, frequency)
}
