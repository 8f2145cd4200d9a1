//! Pathogen profiling.
//!
//! A pure lookup from (site, acquisition context) to an ordered list of likely
//! pathogens. The result is advisory: it feeds rationale and precaution text
//! but never changes which regimen is selected.

use crate::reference::ReferenceTables;
use crate::{InfectionSite, PathogenLikelihood};

/// Key into the pathogen profile table
///
/// Diabetic skin infections use their own broadened profile regardless of
/// acquisition context. Unclassified sites have no profile.
pub fn profile_key(
    site: InfectionSite,
    hospital_acquired: bool,
    diabetic: bool,
) -> Option<&'static str> {
    match (site, hospital_acquired, diabetic) {
        (InfectionSite::Respiratory, true, _) => Some("respiratory:hospital"),
        (InfectionSite::Respiratory, false, _) => Some("respiratory:community"),
        (InfectionSite::Urinary, true, _) => Some("urinary:hospital"),
        (InfectionSite::Urinary, false, _) => Some("urinary:community"),
        (InfectionSite::Skin, _, true) => Some("skin:diabetic"),
        (InfectionSite::Skin, true, false) => Some("skin:hospital"),
        (InfectionSite::Skin, false, false) => Some("skin:community"),
        (InfectionSite::Other, _, _) => None,
    }
}

/// Ordered likely pathogens; empty when no profile exists
pub fn likely_pathogens(
    tables: &ReferenceTables,
    site: InfectionSite,
    hospital_acquired: bool,
    diabetic: bool,
) -> Vec<PathogenLikelihood> {
    let Some(key) = profile_key(site, hospital_acquired, diabetic) else {
        return Vec::new();
    };

    match tables.pathogen_profiles.get(key) {
        Some(profile) => profile.clone(),
        None => {
            tracing::warn!("No pathogen profile for key '{}'", key);
            Vec::new()
        }
    }
}

/// Pathogens in the list that carry a known resistance pattern
pub fn resistant_pathogens(pathogens: &[PathogenLikelihood]) -> Vec<String> {
    pathogens
        .iter()
        .filter_map(|p| {
            p.known_resistance
                .as_ref()
                .map(|resistance| format!("{} ({})", p.pathogen, resistance))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::build_default_tables;

    #[test]
    fn test_community_respiratory_favours_pneumococcus() {
        let tables = build_default_tables();
        let pathogens = likely_pathogens(&tables, InfectionSite::Respiratory, false, false);
        assert_eq!(pathogens[0].pathogen, "Streptococcus pneumoniae");
        assert!(pathogens.iter().any(|p| p.pathogen == "Mycoplasma pneumoniae"));
    }

    #[test]
    fn test_hospital_respiratory_shifts_to_resistant_organisms() {
        let tables = build_default_tables();
        let pathogens = likely_pathogens(&tables, InfectionSite::Respiratory, true, false);
        let names: Vec<_> = pathogens.iter().map(|p| p.pathogen.as_str()).collect();
        assert!(names.iter().any(|n| n.contains("MRSA")));
        assert!(names.contains(&"Pseudomonas aeruginosa"));
        assert!(names.contains(&"Klebsiella pneumoniae"));
        assert!(!resistant_pathogens(&pathogens).is_empty());
    }

    #[test]
    fn test_diabetic_skin_broadens_coverage() {
        let tables = build_default_tables();
        let pathogens = likely_pathogens(&tables, InfectionSite::Skin, false, true);
        let names: Vec<_> = pathogens.iter().map(|p| p.pathogen.as_str()).collect();
        assert!(names.iter().any(|n| n.contains("Anaerobes")));
        assert!(names.iter().any(|n| n.contains("Gram-negative")));
    }

    #[test]
    fn test_other_site_has_no_profile() {
        let tables = build_default_tables();
        assert!(likely_pathogens(&tables, InfectionSite::Other, true, true).is_empty());
    }

    #[test]
    fn test_probabilities_are_percentages() {
        let tables = build_default_tables();
        for profile in tables.pathogen_profiles.values() {
            assert!(profile.iter().all(|p| p.probability <= 100));
        }
    }
}
