//! Reference tables: guidelines, contraindications, interactions and dosing data.
//!
//! Tables are static, versioned data. The embedded defaults are built once and
//! shared read-only across calls; a deployment can replace them with a JSON or
//! TOML file without code changes. All drug keys are normalised (see
//! [`normalize_drug_name`]) and lookups tolerate extra words in the query, so
//! "Warfarin sodium 5mg" still matches the `warfarin` entry.

mod defaults;

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

pub use defaults::build_default_tables;

/// Queries shorter than this only match exactly
const MIN_FUZZY_LEN: usize = 4;

/// Cached default tables - built once and reused across all calls
static DEFAULT_TABLES: Lazy<ReferenceTables> = Lazy::new(build_default_tables);

/// Get a reference to the cached default tables
pub fn get_default_tables() -> &'static ReferenceTables {
    &DEFAULT_TABLES
}

/// Lowercase a drug name and fold punctuation/whitespace runs into `-`
pub fn normalize_drug_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out
}

fn names_match(query: &str, key: &str) -> bool {
    query == key || (key.len() >= MIN_FUZZY_LEN && query.contains(key))
}

/// Exact key first, then the longest key contained in the query
fn lookup<'a, V>(map: &'a BTreeMap<String, V>, query: &str) -> Option<&'a V> {
    if let Some(value) = map.get(query) {
        return Some(value);
    }
    if query.len() < MIN_FUZZY_LEN {
        return None;
    }
    map.iter()
        .filter(|(key, _)| names_match(query, key))
        .max_by_key(|(key, _)| key.len())
        .map(|(_, value)| value)
}

/// Replace each occurrence of `word` that is not part of a longer word
fn replace_word(text: &str, word: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (pos, _) in text.match_indices(word) {
        let end = pos + word.len();
        let starts_word = text[..pos].chars().next_back().map_or(true, |c| !c.is_alphabetic());
        let ends_word = text[end..].chars().next().map_or(true, |c| !c.is_alphabetic());
        if starts_word && ends_word {
            out.push_str(&text[last..pos]);
            out.push_str(replacement);
            last = end;
        }
    }
    out.push_str(&text[last..]);
    out
}

fn set_contains(set: &BTreeSet<String>, query: &str) -> bool {
    set.contains(query) || (query.len() >= MIN_FUZZY_LEN && set.iter().any(|key| names_match(query, key)))
}

/// The complete set of reference data the engine consults
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ReferenceTables {
    pub version: String,
    /// Brand names and abbreviations mapped to normalised generic names
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    /// Keyed by condition key, e.g. `respiratory:mild`
    pub guidelines: BTreeMap<String, GuidelineEntry>,
    /// Default adult regimen for every drug the tables mention
    pub formulary: BTreeMap<String, Regimen>,
    pub drug_classes: BTreeMap<String, AllergyClass>,
    pub contraindications: BTreeMap<String, Vec<ContraindicationEntry>>,
    pub interactions: BTreeMap<String, Vec<InteractionEntry>>,
    pub pregnancy_unsafe: BTreeSet<String>,
    /// Keyed by infection site
    pub pregnancy_safe_fallbacks: BTreeMap<String, Vec<Regimen>>,
    pub hepatotoxic: BTreeSet<String>,
    pub renal_dosing: BTreeMap<String, RenalDosing>,
    pub weight_based: BTreeMap<String, WeightBasedRule>,
    pub pediatric_dosing: BTreeMap<String, Vec<PediatricDoseRule>>,
    pub pathogen_profiles: BTreeMap<String, Vec<PathogenLikelihood>>,
}

impl ReferenceTables {
    /// Normalised name with brand aliases resolved
    ///
    /// Aliases are replaced wherever they appear as a whole word, longest
    /// first, so "Coumadin 5mg" becomes `warfarin-5mg` and a note naming two
    /// brands resolves both.
    pub fn canonical_key(&self, drug: &str) -> String {
        let normalized = normalize_drug_name(drug);
        if let Some(generic) = self.aliases.get(&normalized) {
            return generic.clone();
        }
        if normalized.len() < MIN_FUZZY_LEN {
            return normalized;
        }

        let mut aliases: Vec<_> = self
            .aliases
            .iter()
            .filter(|(alias, _)| alias.len() >= MIN_FUZZY_LEN)
            .collect();
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
        aliases
            .into_iter()
            .fold(normalized, |key, (alias, generic)| replace_word(&key, alias, generic))
    }

    /// Allergy classes named by a free-text note
    ///
    /// Class and drug-family words are recognised directly; drug and brand
    /// names are resolved through the alias and drug-class tables.
    pub fn classes_in_note(&self, note: &str) -> BTreeSet<AllergyClass> {
        let mut classes = AllergyClass::from_free_text(note);
        let key = self.canonical_key(note);
        classes.extend(
            self.drug_classes
                .iter()
                .filter(|(drug, _)| names_match(&key, drug))
                .map(|(_, class)| *class),
        );
        classes
    }

    /// Structured allergy classes merged with every class the notes name
    pub fn allergy_classes(&self, allergies: &Allergies) -> BTreeSet<AllergyClass> {
        let mut classes = allergies.classes.clone();
        for note in &allergies.free_text {
            classes.extend(self.classes_in_note(note));
        }
        classes
    }

    /// Does a free-text note name this drug, directly or by brand?
    pub fn note_names_drug(&self, note: &str, drug: &str) -> bool {
        let drug_key = self.canonical_key(drug);
        drug_key.len() >= MIN_FUZZY_LEN && self.canonical_key(note).contains(&drug_key)
    }

    pub fn guideline(&self, condition_key: &str) -> Option<&GuidelineEntry> {
        self.guidelines.get(condition_key)
    }

    pub fn formulary_regimen(&self, drug: &str) -> Option<&Regimen> {
        lookup(&self.formulary, &self.canonical_key(drug))
    }

    pub fn drug_class(&self, drug: &str) -> Option<AllergyClass> {
        lookup(&self.drug_classes, &self.canonical_key(drug)).copied()
    }

    pub fn contraindications_for(&self, drug: &str) -> &[ContraindicationEntry] {
        lookup(&self.contraindications, &self.canonical_key(drug))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn interactions_for(&self, drug: &str) -> &[InteractionEntry] {
        lookup(&self.interactions, &self.canonical_key(drug))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Does a co-medication name refer to the entry's interacting drug?
    pub fn medication_matches(&self, medication: &str, interacting_drug: &str) -> bool {
        names_match(
            &self.canonical_key(medication),
            &self.canonical_key(interacting_drug),
        )
    }

    pub fn is_pregnancy_unsafe(&self, drug: &str) -> bool {
        set_contains(&self.pregnancy_unsafe, &self.canonical_key(drug))
    }

    pub fn is_hepatotoxic(&self, drug: &str) -> bool {
        set_contains(&self.hepatotoxic, &self.canonical_key(drug))
    }

    pub fn pregnancy_safe_fallbacks(&self, site: InfectionSite) -> &[Regimen] {
        self.pregnancy_safe_fallbacks
            .get(site.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn renal_dosing_for(&self, drug: &str) -> Option<&RenalDosing> {
        lookup(&self.renal_dosing, &self.canonical_key(drug))
    }

    pub fn weight_based_rule(&self, drug: &str) -> Option<&WeightBasedRule> {
        lookup(&self.weight_based, &self.canonical_key(drug))
    }

    pub fn pediatric_rule(&self, drug: &str, band: AgeBand) -> Option<&PediatricDoseRule> {
        lookup(&self.pediatric_dosing, &self.canonical_key(drug))
            .and_then(|rules| rules.iter().find(|rule| rule.band == band))
    }

    /// Load tables from a JSON or TOML file (chosen by extension)
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let tables: ReferenceTables = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&contents)?,
            _ => serde_json::from_str(&contents)?,
        };

        let problems = tables.validate();
        if !problems.is_empty() {
            return Err(Error::ReferenceData(format!(
                "{} problem(s) in {:?}: {}",
                problems.len(),
                path,
                problems.join("; ")
            )));
        }

        tracing::info!(
            "Loaded reference tables version {} from {:?}",
            tables.version,
            path
        );
        Ok(tables)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the tables for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.version.trim().is_empty() {
            errors.push("Tables have empty version".to_string());
        }

        for (key, entry) in &self.guidelines {
            if key != &entry.condition_key {
                errors.push(format!(
                    "Guideline key '{}' doesn't match condition_key '{}'",
                    key, entry.condition_key
                ));
            }
            if entry.first_line.is_empty() {
                errors.push(format!("Guideline '{}' has no first-line regimen", key));
            }
            for regimen in entry.first_line.iter().chain(&entry.second_line) {
                if self.formulary_regimen(&regimen.name).is_none() {
                    errors.push(format!(
                        "Guideline '{}' references '{}' which is not in the formulary",
                        key, regimen.name
                    ));
                }
            }
        }

        for (drug, entries) in &self.contraindications {
            for entry in entries {
                for alternative in &entry.alternatives {
                    if self.formulary_regimen(alternative).is_none() {
                        errors.push(format!(
                            "Contraindication for '{}' lists unknown alternative '{}'",
                            drug, alternative
                        ));
                    }
                }
            }
        }

        for (site, fallbacks) in &self.pregnancy_safe_fallbacks {
            for regimen in fallbacks {
                if self.is_pregnancy_unsafe(&regimen.name) {
                    errors.push(format!(
                        "Pregnancy fallback '{}' for site '{}' is on the unsafe list",
                        regimen.name, site
                    ));
                }
            }
        }

        for (drug, dosing) in &self.renal_dosing {
            if dosing.rules.iter().any(|rule| rule.bands.is_empty()) {
                errors.push(format!("Renal rule for '{}' has no GFR bands", drug));
            }
        }

        for (drug, rule) in &self.weight_based {
            if rule.mg_per_kg <= 0.0 || rule.max_dose_mg <= 0.0 {
                errors.push(format!("Weight-based rule for '{}' is not positive", drug));
            }
        }

        for (drug, rules) in &self.pediatric_dosing {
            for rule in rules {
                if rule.mg_per_kg <= 0.0 || rule.max_dose_mg <= 0.0 {
                    errors.push(format!(
                        "Pediatric rule for '{}' ({}) is not positive",
                        drug, rule.band
                    ));
                }
            }
        }

        for (key, pathogens) in &self.pathogen_profiles {
            if pathogens.iter().any(|p| p.probability > 100) {
                errors.push(format!("Pathogen profile '{}' has probability > 100", key));
            }
        }

        let keyed_maps = self
            .formulary
            .keys()
            .chain(self.drug_classes.keys())
            .chain(self.contraindications.keys())
            .chain(self.interactions.keys())
            .chain(self.renal_dosing.keys())
            .chain(self.pediatric_dosing.keys())
            .chain(self.weight_based.keys());
        for key in keyed_maps {
            if key != &normalize_drug_name(key) {
                errors.push(format!("Drug key '{}' is not normalised", key));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drug_name() {
        assert_eq!(
            normalize_drug_name("  Piperacillin / Tazobactam "),
            "piperacillin-tazobactam"
        );
        assert_eq!(
            normalize_drug_name("Trimethoprim-Sulfamethoxazole"),
            "trimethoprim-sulfamethoxazole"
        );
        assert_eq!(normalize_drug_name("AMOXICILLIN"), "amoxicillin");
    }

    #[test]
    fn test_default_tables_validate() {
        let tables = build_default_tables();
        let errors = tables.validate();
        assert!(
            errors.is_empty(),
            "Default tables have validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_alias_aware() {
        let tables = get_default_tables();
        assert!(!tables.contraindications_for("AMOXICILLIN").is_empty());
        assert_eq!(
            tables.drug_class("Augmentin"),
            Some(AllergyClass::Penicillin)
        );
        assert_eq!(
            tables.formulary_regimen("Zosyn").map(|r| r.name.as_str()),
            Some("Piperacillin-Tazobactam")
        );
    }

    #[test]
    fn test_lookup_tolerates_extra_words() {
        let tables = get_default_tables();
        assert!(tables.is_pregnancy_unsafe("Doxycycline hyclate 100mg"));
        assert!(tables.medication_matches("Warfarin sodium 5mg", "warfarin"));
        assert!(!tables.medication_matches("Metoprolol", "warfarin"));
    }

    #[test]
    fn test_aliases_resolve_inside_longer_names() {
        let tables = get_default_tables();
        assert_eq!(tables.canonical_key("Coumadin 5mg"), "warfarin-5mg");
        assert_eq!(tables.canonical_key("coumadin5mg daily"), "warfarin5mg-daily");
        assert!(tables.medication_matches("Coumadin 5mg", "Warfarin"));
        assert_eq!(
            tables.formulary_regimen("Zosyn 4.5g").map(|r| r.name.as_str()),
            Some("Piperacillin-Tazobactam")
        );
        // An alias inside a longer word is left alone
        assert_eq!(tables.canonical_key("Ciprofloxacin"), "ciprofloxacin");
    }

    #[test]
    fn test_classes_in_note_use_brand_names() {
        let tables = get_default_tables();
        let cases = [
            ("Macrobid - rash", AllergyClass::Nitrofuran),
            ("Macrodantin", AllergyClass::Nitrofuran),
            ("Z-Pak, hives", AllergyClass::Macrolide),
            ("zithromax", AllergyClass::Macrolide),
            ("Levaquin tendon pain", AllergyClass::Fluoroquinolone),
            ("Cipro - tendon pain", AllergyClass::Fluoroquinolone),
            ("Cleocin (C. diff)", AllergyClass::Lincosamide),
            ("Zosyn", AllergyClass::Penicillin),
            ("Rocephin", AllergyClass::Cephalosporin),
            ("Merrem", AllergyClass::Carbapenem),
            ("Zyvox", AllergyClass::Oxazolidinone),
            ("Vibramycin", AllergyClass::Tetracycline),
        ];
        for (note, class) in cases {
            assert!(
                tables.classes_in_note(note).contains(&class),
                "{} should name {:?}",
                note,
                class
            );
        }
        assert!(tables.classes_in_note("shellfish").is_empty());
    }

    #[test]
    fn test_allergy_classes_merge_structured_and_notes() {
        let tables = get_default_tables();
        let allergies = Allergies {
            classes: BTreeSet::from([AllergyClass::Macrolide]),
            free_text: vec!["Augmentin and Bactrim - rash".into()],
        };
        assert_eq!(
            tables.allergy_classes(&allergies),
            BTreeSet::from([
                AllergyClass::Penicillin,
                AllergyClass::Macrolide,
                AllergyClass::Sulfonamide,
            ])
        );
    }

    #[test]
    fn test_note_names_drug() {
        let tables = get_default_tables();
        assert!(tables.note_names_drug("Macrobid - rash", "Nitrofurantoin"));
        assert!(tables.note_names_drug("fosfomycin: nausea", "Fosfomycin"));
        assert!(!tables.note_names_drug("Macrobid - rash", "Fosfomycin"));
    }

    #[test]
    fn test_exact_key_preferred_over_substring() {
        let tables = get_default_tables();
        // amoxicillin is not hepatotoxic even though amoxicillin-clavulanate is
        assert!(tables.is_hepatotoxic("Amoxicillin-Clavulanate"));
        assert!(!tables.is_hepatotoxic("Amoxicillin"));
    }

    #[test]
    fn test_short_queries_do_not_fuzzy_match() {
        let tables = get_default_tables();
        assert!(tables.contraindications_for("amo").is_empty());
    }

    #[test]
    fn test_json_roundtrip_and_load() {
        let tables = build_default_tables();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tables.json");
        std::fs::write(&path, tables.to_json().unwrap()).unwrap();

        let loaded = ReferenceTables::load_from(&path).unwrap();
        assert_eq!(loaded, tables);
    }

    #[test]
    fn test_load_rejects_inconsistent_tables() {
        let mut tables = build_default_tables();
        tables.guidelines.get_mut("respiratory:mild").unwrap().first_line.clear();

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tables.json");
        std::fs::write(&path, tables.to_json().unwrap()).unwrap();

        assert!(matches!(
            ReferenceTables::load_from(&path),
            Err(Error::ReferenceData(_))
        ));
    }
}
