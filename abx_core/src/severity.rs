//! Severity scoring.
//!
//! Deterministic point accumulation:
//! - Fever: +2
//! - Shortness of breath: +3
//! - Altered mental status: +4
//! - Symptoms lasting more than 7 days: +2
//! - Each distinct comorbidity: +2
//!
//! A score of 8 or more is severe, 4 or more moderate, anything lower mild.

use crate::{Comorbidity, SeverityScore, SeverityTier, Symptom};
use std::collections::BTreeSet;

const FEVER_POINTS: u32 = 2;
const DYSPNEA_POINTS: u32 = 3;
const ALTERED_MENTAL_STATUS_POINTS: u32 = 4;
const PROLONGED_DURATION_POINTS: u32 = 2;
const PROLONGED_DURATION_DAYS: u32 = 7;
const COMORBIDITY_POINTS: u32 = 2;

const SEVERE_THRESHOLD: u32 = 8;
const MODERATE_THRESHOLD: u32 = 4;

fn symptom_points(symptom: Symptom) -> u32 {
    match symptom {
        Symptom::Fever => FEVER_POINTS,
        Symptom::ShortnessOfBreath => DYSPNEA_POINTS,
        Symptom::AlteredMentalStatus => ALTERED_MENTAL_STATUS_POINTS,
        _ => 0,
    }
}

/// Map a point total onto a tier
pub fn tier_for(points: u32) -> SeverityTier {
    if points >= SEVERE_THRESHOLD {
        SeverityTier::Severe
    } else if points >= MODERATE_THRESHOLD {
        SeverityTier::Moderate
    } else {
        SeverityTier::Mild
    }
}

/// Score symptoms, duration and comorbidity count
pub fn score(
    symptoms: &BTreeSet<Symptom>,
    duration_days: u32,
    comorbidities: &BTreeSet<Comorbidity>,
) -> SeverityScore {
    let mut points: u32 = symptoms.iter().map(|s| symptom_points(*s)).sum();

    if duration_days > PROLONGED_DURATION_DAYS {
        points += PROLONGED_DURATION_POINTS;
    }

    points += COMORBIDITY_POINTS * comorbidities.len() as u32;

    let tier = tier_for(points);
    tracing::debug!("Severity score {} -> {:?}", points, tier);
    SeverityScore { points, tier }
}

/// The severity that drives regimen selection
///
/// A clinician-confirmed tier wins; the score is the fallback.
pub fn operative_severity(scored: SeverityScore, confirmed: Option<SeverityTier>) -> SeverityTier {
    confirmed.unwrap_or(scored.tier)
}
