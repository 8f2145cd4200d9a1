//! Incremental construction of the recommendation rationale.

use crate::{InfectionSite, PathogenLikelihood, Rationale, SeverityScore, SeverityTier};

/// Collects rationale lines while the selector runs
#[derive(Clone, Debug)]
pub struct RationaleBuilder {
    infection_type: String,
    severity: SeverityTier,
    scored_severity: SeverityScore,
    reasons: Vec<String>,
    allergy_considerations: Vec<String>,
    dose_adjustments: Vec<String>,
    likely_pathogens: Vec<PathogenLikelihood>,
}

impl RationaleBuilder {
    pub fn new(
        site: InfectionSite,
        hospital_acquired: bool,
        severity: SeverityTier,
        scored_severity: SeverityScore,
    ) -> Self {
        let infection_type = match site {
            InfectionSite::Other => site.description().to_string(),
            _ if hospital_acquired => format!("Hospital-acquired {}", lowercase_first(site.description())),
            _ => format!("Community-acquired {}", lowercase_first(site.description())),
        };

        Self {
            infection_type,
            severity,
            scored_severity,
            reasons: Vec::new(),
            allergy_considerations: Vec::new(),
            dose_adjustments: Vec::new(),
            likely_pathogens: Vec::new(),
        }
    }

    pub fn reason(&mut self, reason: impl Into<String>) -> &mut Self {
        self.reasons.push(reason.into());
        self
    }

    pub fn allergy_consideration(&mut self, note: impl Into<String>) -> &mut Self {
        push_unique(&mut self.allergy_considerations, note.into());
        self
    }

    pub fn dose_adjustment(&mut self, note: impl Into<String>) -> &mut Self {
        self.dose_adjustments.push(note.into());
        self
    }

    pub fn pathogens(&mut self, pathogens: Vec<PathogenLikelihood>) -> &mut Self {
        self.likely_pathogens = pathogens;
        self
    }

    pub fn build(self) -> Rationale {
        Rationale {
            infection_type: self.infection_type,
            severity: self.severity,
            scored_severity: self.scored_severity,
            reasons: self.reasons,
            allergy_considerations: self.allergy_considerations,
            dose_adjustments: self.dose_adjustments,
            likely_pathogens: self.likely_pathogens,
        }
    }
}

/// Append unless an identical line is already present
pub(crate) fn push_unique(lines: &mut Vec<String>, line: String) {
    if !lines.contains(&line) {
        lines.push(line);
    }
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
