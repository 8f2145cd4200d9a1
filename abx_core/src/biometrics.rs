//! Biometric calculators.
//!
//! Pure functions usable on their own (e.g. for display) or through
//! [`derive_facts`], which assembles everything the selector needs. Unusable
//! inputs produce a sentinel (`0.0` or `None`) rather than a fault.

use crate::reference::{get_default_tables, ReferenceTables};
use crate::{
    pathogens, severity, AgeBand, BmiCategory, Comorbidity, DerivedFacts, GfrCategory,
    PatientProfile, Sex,
};

const CM_PER_INCH: f64 = 2.54;

/// Actual weight above this multiple of ideal weight switches to adjusted weight
pub const OBESITY_RATIO: f64 = 1.2;

/// Fraction of excess weight counted by the adjusted body weight formula
const ADJUSTMENT_FACTOR: f64 = 0.4;

/// Body-mass index in kg/m²; returns 0.0 for non-positive height or weight
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    if !(height_cm > 0.0) || !(weight_kg > 0.0) || !height_cm.is_finite() {
        return 0.0;
    }
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

pub fn bmi_category(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Devine ideal body weight in kg
///
/// Male base is 50 kg; every other recorded sex uses the 45.5 kg base.
pub fn ideal_body_weight(height_cm: f64, sex: Sex) -> f64 {
    let base = match sex {
        Sex::Male => 50.0,
        Sex::Female | Sex::Other | Sex::Unknown => 45.5,
    };
    let height_inches = height_cm / CM_PER_INCH;
    base + 2.3 * (height_inches - 60.0)
}

/// Adjusted body weight for dosing obese patients
///
/// Returns actual weight unchanged unless it exceeds 1.2x ideal.
pub fn adjusted_body_weight(actual_weight_kg: f64, ideal_weight_kg: f64) -> f64 {
    if actual_weight_kg <= OBESITY_RATIO * ideal_weight_kg {
        actual_weight_kg
    } else {
        ideal_weight_kg + ADJUSTMENT_FACTOR * (actual_weight_kg - ideal_weight_kg)
    }
}

/// Cockcroft-Gault creatinine clearance in mL/min
///
/// Returns `None` when serum creatinine or weight is not positive, so callers
/// skip renal adjustment instead of propagating infinity. Ages above 140
/// clamp to zero clearance.
pub fn creatinine_clearance(
    age_years: f64,
    weight_kg: f64,
    serum_creatinine_mg_dl: f64,
    is_female: bool,
) -> Option<f64> {
    if !(serum_creatinine_mg_dl > 0.0) || !(weight_kg > 0.0) || !serum_creatinine_mg_dl.is_finite()
    {
        return None;
    }
    let mut clearance = ((140.0 - age_years) * weight_kg) / (72.0 * serum_creatinine_mg_dl);
    if is_female {
        clearance *= 0.85;
    }
    Some(clearance.max(0.0))
}

/// One band of the GFR table: `lower` is inclusive, `upper` exclusive, `None` unbounded
#[derive(Clone, Copy, Debug)]
pub struct GfrBand {
    pub category: GfrCategory,
    pub lower: f64,
    pub upper: Option<f64>,
}

/// Contiguous, exhaustive bands over [0, ∞), highest first
pub const GFR_BANDS: &[GfrBand] = &[
    GfrBand { category: GfrCategory::G1, lower: 90.0, upper: None },
    GfrBand { category: GfrCategory::G2, lower: 60.0, upper: Some(90.0) },
    GfrBand { category: GfrCategory::G3a, lower: 45.0, upper: Some(60.0) },
    GfrBand { category: GfrCategory::G3b, lower: 30.0, upper: Some(45.0) },
    GfrBand { category: GfrCategory::G4, lower: 15.0, upper: Some(30.0) },
    GfrBand { category: GfrCategory::G5, lower: 0.0, upper: Some(15.0) },
];

impl GfrBand {
    pub fn contains(&self, gfr: f64) -> bool {
        gfr >= self.lower && self.upper.map_or(true, |upper| gfr < upper)
    }
}

/// Classify a GFR value; first matching band wins
///
/// Values outside [0, ∞) (negative or NaN) fall to G5, the most
/// conservative band.
pub fn gfr_category(gfr: f64) -> GfrCategory {
    GFR_BANDS
        .iter()
        .find(|band| band.contains(gfr))
        .map(|band| band.category)
        .unwrap_or(GfrCategory::G5)
}

/// Pediatric age band; `None` for adults
pub fn age_band(age_years: f64) -> Option<AgeBand> {
    const CUTOFFS: &[(f64, AgeBand)] = &[
        (1.0 / 12.0, AgeBand::Neonate),
        (1.0, AgeBand::Infant),
        (3.0, AgeBand::Toddler),
        (5.0, AgeBand::Preschool),
        (12.0, AgeBand::SchoolAge),
        (18.0, AgeBand::Adolescent),
    ];
    CUTOFFS
        .iter()
        .find(|(limit, _)| age_years < *limit)
        .map(|(_, band)| *band)
}

/// Build every derived fact for a profile against the default tables
pub fn derive_facts(profile: &PatientProfile) -> DerivedFacts {
    derive_facts_with(profile, get_default_tables())
}

/// Build every derived fact for a profile
pub fn derive_facts_with(profile: &PatientProfile, tables: &ReferenceTables) -> DerivedFacts {
    let severity = severity::score(
        &profile.symptoms,
        profile.duration_days,
        &profile.comorbidities,
    );
    let likely_pathogens = pathogens::likely_pathogens(
        tables,
        profile.infection_site,
        profile.is_hospital_acquired,
        profile.has_comorbidity(Comorbidity::Diabetes),
    );
    let allergy_classes = tables.allergy_classes(&profile.allergies);

    if !profile.has_usable_biometrics() {
        tracing::debug!("Biometric derivations omitted: weight or height not positive");
        return DerivedFacts {
            bmi: None,
            bmi_category: None,
            ideal_body_weight_kg: None,
            adjusted_body_weight_kg: None,
            creatinine_clearance_ml_min: None,
            gfr_category: None,
            age_band: age_band(profile.age_years),
            severity,
            likely_pathogens,
            allergy_classes,
        };
    }

    let body_mass_index = bmi(profile.weight_kg, profile.height_cm);
    let ideal = ideal_body_weight(profile.height_cm, profile.sex);
    let adjusted = adjusted_body_weight(profile.weight_kg, ideal);

    // Devine is undefined below 60 inches, so children use actual weight
    let clearance_weight = if profile.is_pediatric() {
        profile.weight_kg
    } else {
        adjusted
    };
    let clearance = profile.serum_creatinine_mg_dl.and_then(|creatinine| {
        creatinine_clearance(
            profile.age_years,
            clearance_weight,
            creatinine,
            profile.is_female(),
        )
    });

    DerivedFacts {
        bmi: Some(body_mass_index),
        bmi_category: Some(bmi_category(body_mass_index)),
        ideal_body_weight_kg: Some(ideal),
        adjusted_body_weight_kg: Some(adjusted),
        creatinine_clearance_ml_min: clearance,
        gfr_category: clearance.map(gfr_category),
        age_band: age_band(profile.age_years),
        severity,
        likely_pathogens,
        allergy_classes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InfectionSite;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn test_bmi() {
        assert!(close(bmi(70.0, 175.0), 22.857));
        assert_eq!(bmi_category(bmi(70.0, 175.0)), BmiCategory::Normal);
    }

    #[test]
    fn test_bmi_non_positive_height_returns_sentinel() {
        assert_eq!(bmi(70.0, 0.0), 0.0);
        assert_eq!(bmi(70.0, -10.0), 0.0);
    }

    #[test]
    fn test_ideal_body_weight_devine() {
        // 6 ft male: 50 + 2.3 * 12 = 77.6
        assert!(close(ideal_body_weight(182.88, Sex::Male), 77.6));
        // 5 ft 4 in female: 45.5 + 2.3 * 4 = 54.7
        assert!(close(ideal_body_weight(162.56, Sex::Female), 54.7));
    }

    #[test]
    fn test_adjusted_body_weight_threshold() {
        assert_eq!(adjusted_body_weight(72.0, 60.0), 72.0);
        // 60 + 0.4 * 40 = 76
        assert!(close(adjusted_body_weight(100.0, 60.0), 76.0));
    }

    #[test]
    fn test_creatinine_clearance() {
        // (140 - 60) * 70 / (72 * 1.0) = 77.78
        let male = creatinine_clearance(60.0, 70.0, 1.0, false).unwrap();
        assert!(close(male, 77.78));
        let female = creatinine_clearance(60.0, 70.0, 1.0, true).unwrap();
        assert!(close(female, 77.78 * 0.85));
    }

    #[test]
    fn test_creatinine_clearance_not_computable() {
        assert_eq!(creatinine_clearance(60.0, 70.0, 0.0, false), None);
        assert_eq!(creatinine_clearance(60.0, 70.0, f64::NAN, false), None);
        assert_eq!(creatinine_clearance(150.0, 70.0, 1.0, false), Some(0.0));
    }

    #[test]
    fn test_gfr_band_boundaries() {
        assert_eq!(gfr_category(120.0), GfrCategory::G1);
        assert_eq!(gfr_category(90.0), GfrCategory::G1);
        assert_eq!(gfr_category(89.99), GfrCategory::G2);
        assert_eq!(gfr_category(60.0), GfrCategory::G2);
        assert_eq!(gfr_category(45.0), GfrCategory::G3a);
        assert_eq!(gfr_category(30.0), GfrCategory::G3b);
        assert_eq!(gfr_category(15.0), GfrCategory::G4);
        assert_eq!(gfr_category(14.9), GfrCategory::G5);
        assert_eq!(gfr_category(0.0), GfrCategory::G5);
    }

    #[test]
    fn test_age_bands() {
        assert_eq!(age_band(0.05), Some(AgeBand::Neonate));
        assert_eq!(age_band(0.5), Some(AgeBand::Infant));
        assert_eq!(age_band(2.0), Some(AgeBand::Toddler));
        assert_eq!(age_band(4.0), Some(AgeBand::Preschool));
        assert_eq!(age_band(8.0), Some(AgeBand::SchoolAge));
        assert_eq!(age_band(17.9), Some(AgeBand::Adolescent));
        assert_eq!(age_band(18.0), None);
    }

    #[test]
    fn test_derive_facts_without_creatinine() {
        let profile = PatientProfile::new(40.0, Sex::Male, 80.0, 180.0, InfectionSite::Skin);
        let facts = derive_facts(&profile);
        assert!(facts.bmi.is_some());
        assert!(facts.creatinine_clearance_ml_min.is_none());
        assert!(facts.gfr_category.is_none());
    }

    #[test]
    fn test_derive_facts_omits_biometrics_for_bad_height() {
        let profile = PatientProfile::new(40.0, Sex::Male, 80.0, 0.0, InfectionSite::Skin);
        let facts = derive_facts(&profile);
        assert!(facts.bmi.is_none());
        assert!(facts.ideal_body_weight_kg.is_none());
        assert!(!facts.likely_pathogens.is_empty());
    }
}
