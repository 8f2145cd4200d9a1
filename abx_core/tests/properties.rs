//! Property tests for the calculators and the selector.

use abx_core::biometrics::{adjusted_body_weight, gfr_category, ideal_body_weight, GFR_BANDS};
use abx_core::{
    get_default_tables, recommend, AllergyClass, Comorbidity, InfectionSite, PatientProfile,
    PregnancyStatus, SeverityTier, Sex, Symptom,
};
use proptest::collection::btree_set;
use proptest::option;
use proptest::prelude::*;
use proptest::sample::select;

const MEDICATIONS: &[&str] = &[
    "Warfarin",
    "Amiodarone",
    "Methotrexate",
    "Sertraline",
    "Lisinopril",
    "Metformin",
    "Furosemide",
    "Valproic acid",
    "Coumadin 5mg",
    "Warfarin sodium 5mg",
    "Tizanidine 4mg",
    "Theophylline ER",
    "coumadin daily",
];

const ALLERGY_NOTES: &[&str] = &[
    "penicillin and cephalosporin - anaphylaxis",
    "Macrobid - rash",
    "Z-Pak hives",
    "Levaquin",
    "Cleocin",
    "Zosyn",
    "Rocephin",
    "Merrem",
    "Zyvox",
    "Vibramycin",
    "sulfa",
    "Augmentin and Bactrim",
    "shellfish",
];

fn arb_sex() -> impl Strategy<Value = Sex> {
    select(vec![Sex::Male, Sex::Female, Sex::Other, Sex::Unknown])
}

fn arb_site() -> impl Strategy<Value = InfectionSite> {
    select(vec![
        InfectionSite::Respiratory,
        InfectionSite::Urinary,
        InfectionSite::Skin,
        InfectionSite::Other,
    ])
}

fn arb_pregnancy() -> impl Strategy<Value = PregnancyStatus> {
    select(vec![
        PregnancyStatus::None,
        PregnancyStatus::Pregnant,
        PregnancyStatus::Breastfeeding,
        PregnancyStatus::NotApplicable,
    ])
}

fn arb_symptom() -> impl Strategy<Value = Symptom> {
    select(vec![
        Symptom::Fever,
        Symptom::ShortnessOfBreath,
        Symptom::AlteredMentalStatus,
        Symptom::Cough,
        Symptom::Dysuria,
        Symptom::FlankPain,
        Symptom::Erythema,
        Symptom::Purulence,
    ])
}

fn arb_comorbidity() -> impl Strategy<Value = Comorbidity> {
    select(vec![
        Comorbidity::KidneyDisease,
        Comorbidity::LiverDisease,
        Comorbidity::Diabetes,
        Comorbidity::Immunosuppressed,
    ])
}

fn arb_allergy() -> impl Strategy<Value = AllergyClass> {
    select(vec![
        AllergyClass::Penicillin,
        AllergyClass::Cephalosporin,
        AllergyClass::Carbapenem,
        AllergyClass::Macrolide,
        AllergyClass::Tetracycline,
        AllergyClass::Fluoroquinolone,
        AllergyClass::Sulfonamide,
        AllergyClass::Lincosamide,
        AllergyClass::Glycopeptide,
        AllergyClass::Aminoglycoside,
        AllergyClass::Nitrofuran,
        AllergyClass::Oxazolidinone,
    ])
}

fn arb_severity() -> impl Strategy<Value = SeverityTier> {
    select(vec![
        SeverityTier::Mild,
        SeverityTier::Moderate,
        SeverityTier::Severe,
    ])
}

fn arb_profile() -> impl Strategy<Value = PatientProfile> {
    let demographics = (
        0.0f64..95.0,
        arb_sex(),
        2.0f64..180.0,
        45.0f64..210.0,
        arb_pregnancy(),
        option::of(0.3f64..9.0),
        arb_site(),
        any::<bool>(),
    );
    let clinical = (
        btree_set(arb_symptom(), 0..5),
        0u32..21,
        btree_set(arb_comorbidity(), 0..4),
        btree_set(arb_allergy(), 0..4),
        proptest::collection::vec(select(ALLERGY_NOTES), 0..3),
        any::<bool>(),
        option::of(arb_severity()),
        option::of(proptest::collection::vec(select(MEDICATIONS), 0..3)),
    );

    (demographics, clinical).prop_map(
        |(
            (age, sex, weight, height, pregnancy, creatinine, site, hospital),
            (symptoms, duration, comorbidities, allergies, notes, recent, confirmed, medications),
        )| {
            let mut profile = PatientProfile::new(age, sex, weight, height, site);
            profile.pregnancy_status = pregnancy;
            profile.serum_creatinine_mg_dl = creatinine;
            profile.is_hospital_acquired = hospital;
            profile.symptoms = symptoms;
            profile.duration_days = duration;
            profile.comorbidities = comorbidities;
            profile.allergies.classes = allergies;
            profile.allergies.free_text = notes.into_iter().map(str::to_string).collect();
            profile.recent_antibiotics = recent;
            profile.confirmed_severity = confirmed;
            profile.current_medications =
                medications.map(|meds| meds.into_iter().map(str::to_string).collect());
            profile
        },
    )
}

proptest! {
    #[test]
    fn adjusted_weight_equals_actual_when_not_obese(
        height in 140.0f64..210.0,
        sex in arb_sex(),
        factor in 0.5f64..1.2,
    ) {
        let ideal = ideal_body_weight(height, sex);
        let actual = ideal * factor;
        prop_assert_eq!(adjusted_body_weight(actual, ideal), actual);
    }

    #[test]
    fn adjusted_weight_lies_between_ideal_and_actual_when_obese(
        height in 140.0f64..210.0,
        sex in arb_sex(),
        factor in 1.25f64..4.0,
    ) {
        let ideal = ideal_body_weight(height, sex);
        let actual = ideal * factor;
        let adjusted = adjusted_body_weight(actual, ideal);
        prop_assert!(adjusted > ideal);
        prop_assert!(adjusted < actual);
    }

    #[test]
    fn every_gfr_maps_to_exactly_one_band(gfr in 0.0f64..1000.0) {
        let matching: Vec<_> = GFR_BANDS.iter().filter(|band| band.contains(gfr)).collect();
        prop_assert_eq!(matching.len(), 1);
        prop_assert_eq!(matching[0].category, gfr_category(gfr));
    }

    #[test]
    fn recommend_is_idempotent(profile in arb_profile()) {
        let first = serde_json::to_vec(&recommend(&profile)).unwrap();
        let second = serde_json::to_vec(&recommend(&profile)).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn pregnant_patients_never_get_unsafe_primary(
        profile in arb_profile(),
        status in select(vec![PregnancyStatus::Pregnant, PregnancyStatus::Breastfeeding]),
    ) {
        let mut profile = profile;
        profile.pregnancy_status = status;

        let result = recommend(&profile);
        let tables = get_default_tables();
        prop_assert!(
            !tables.is_pregnancy_unsafe(&result.primary.name),
            "{} recommended during pregnancy",
            result.primary.name
        );
        for alternative in &result.alternatives {
            prop_assert!(!tables.is_pregnancy_unsafe(&alternative.name));
        }
    }

    #[test]
    fn primary_is_consultation_or_a_known_drug(profile in arb_profile()) {
        let result = recommend(&profile);
        let tables = get_default_tables();
        prop_assert!(
            result.is_consultation_required()
                || tables.formulary_regimen(&result.primary.name).is_some()
        );
        prop_assert!(result
            .alternatives
            .iter()
            .all(|alternative| alternative.name != result.primary.name));
    }

    #[test]
    fn allergic_class_never_recommended(profile in arb_profile()) {
        let result = recommend(&profile);
        let tables = get_default_tables();
        if let Some(class) = tables.drug_class(&result.primary.name) {
            prop_assert!(
                !result.derived.allergy_classes.contains(&class),
                "{} recommended despite {} allergy",
                result.primary.name,
                class
            );
        }
        if !result.is_consultation_required() {
            for note in &profile.allergies.free_text {
                prop_assert!(!tables.note_names_drug(note, &result.primary.name));
            }
        }
    }

    #[test]
    fn blocking_interaction_never_survives(profile in arb_profile()) {
        let result = recommend(&profile);
        let tables = get_default_tables();
        if result.is_consultation_required() {
            return Ok(());
        }
        let medications = profile.current_medications.clone().unwrap_or_default();
        for entry in tables.interactions_for(&result.primary.name) {
            if !entry.severity.is_blocking() {
                continue;
            }
            for medication in &medications {
                prop_assert!(
                    !tables.medication_matches(medication, &entry.interacting_drug),
                    "{} recommended alongside {}",
                    result.primary.name,
                    medication
                );
            }
        }
    }
}
