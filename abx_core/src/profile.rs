//! Patient profile construction and boundary validation.

use crate::{
    Allergies, Comorbidity, Error, InfectionSite, PatientProfile, PregnancyStatus, Result, Sex,
};
use std::collections::BTreeSet;

impl PatientProfile {
    /// Create a profile with the required fields; everything else starts empty
    pub fn new(
        age_years: f64,
        sex: Sex,
        weight_kg: f64,
        height_cm: f64,
        infection_site: InfectionSite,
    ) -> Self {
        Self {
            age_years,
            sex,
            weight_kg,
            height_cm,
            pregnancy_status: PregnancyStatus::NotApplicable,
            serum_creatinine_mg_dl: None,
            infection_site,
            is_hospital_acquired: false,
            symptoms: BTreeSet::new(),
            duration_days: 0,
            comorbidities: BTreeSet::new(),
            allergies: Allergies::default(),
            recent_antibiotics: false,
            confirmed_severity: None,
            current_medications: None,
        }
    }

    pub fn has_comorbidity(&self, comorbidity: Comorbidity) -> bool {
        self.comorbidities.contains(&comorbidity)
    }

    pub fn is_female(&self) -> bool {
        self.sex == Sex::Female
    }

    pub fn is_pediatric(&self) -> bool {
        self.age_years < 18.0
    }

    /// True when weight and height allow biometric derivations
    pub fn has_usable_biometrics(&self) -> bool {
        self.weight_kg.is_finite()
            && self.height_cm.is_finite()
            && self.weight_kg > 0.0
            && self.height_cm > 0.0
    }

    /// Reject profiles the engine cannot reason about
    ///
    /// The engine itself tolerates missing biometrics by omitting derivations;
    /// callers use this to fail loudly at the boundary instead.
    pub fn validate(&self) -> Result<()> {
        if !self.age_years.is_finite() || self.age_years < 0.0 {
            return Err(Error::InvalidProfile(format!(
                "age must be a non-negative number, got {}",
                self.age_years
            )));
        }
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(Error::InvalidProfile(format!(
                "weight_kg must be positive, got {}",
                self.weight_kg
            )));
        }
        if !self.height_cm.is_finite() || self.height_cm <= 0.0 {
            return Err(Error::InvalidProfile(format!(
                "height_cm must be positive, got {}",
                self.height_cm
            )));
        }
        if let Some(creatinine) = self.serum_creatinine_mg_dl {
            if !creatinine.is_finite() || creatinine <= 0.0 {
                return Err(Error::InvalidProfile(format!(
                    "serum_creatinine_mg_dl must be positive when present, got {}",
                    creatinine
                )));
            }
        }
        if self.sex == Sex::Male && self.pregnancy_status.restricts_prescribing() {
            tracing::warn!(
                "Profile lists sex=male with pregnancy status {:?}; screening as recorded",
                self.pregnancy_status
            );
        }
        Ok(())
    }
}
