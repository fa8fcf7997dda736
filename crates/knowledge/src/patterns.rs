//! Extraction rules for each concept set.
//!
//! Rules are applied in table order. A rule with a capture group contributes
//! group 1; otherwise the whole match is used. Fragment bodies stop at
//! sentence punctuation, except a period inside a number such as `99.9`.

use sre_copilot_common::ConceptKind;

#[derive(Debug, Clone, Copy)]
pub struct PatternRule {
    pub name: &'static str,
    pub pattern: &'static str,
}

const fn rule(name: &'static str, pattern: &'static str) -> PatternRule {
    PatternRule { name, pattern }
}

pub const JOURNEY_RULES: &[PatternRule] = &[
    rule(
        "critical-user-journey",
        r"(?i)critical user journeys?\s*(?:[:\-]|is|for|of)?\s*((?:[^.\n!?]|\.\d){3,120})",
    ),
    rule("cuj-label", r"(?i)\bcujs?\s*[:\-]\s*((?:[^.\n!?]|\.\d){3,120})"),
    rule("user-journey-label", r"(?i)\buser journey\s*[:\-]\s*((?:[^.\n!?]|\.\d){3,120})"),
];

pub const INDICATOR_RULES: &[PatternRule] = &[
    rule(
        "service-level-indicator",
        r"(?i)service level indicators?\s*(?:[:\-]|is|for|of)?\s*((?:[^.\n!?]|\.\d){3,120})",
    ),
    rule("sli-label", r"(?i)\bslis?\s*[:\-]\s*((?:[^.\n!?]|\.\d){3,120})"),
];

pub const OBJECTIVE_RULES: &[PatternRule] = &[
    rule(
        "service-level-objective",
        r"(?i)service level objectives?\s*(?:[:\-]|is|for|of)?\s*((?:[^.\n!?]|\.\d){3,120})",
    ),
    rule("slo-label", r"(?i)\bslos?\s*[:\-]\s*((?:[^.\n!?]|\.\d){3,120})"),
    rule(
        "percentage-target",
        r"(?i)\d{2,3}(?:\.\d+)?%\s+(?:availability|uptime|of requests|success rate)[^.\n!?]{0,80}",
    ),
];

pub const PRACTICE_RULES: &[PatternRule] = &[
    rule("best-practice", r"(?i)best practices?\s*[:\-]?\s*((?:[^.\n!?]|\.\d){3,160})"),
    rule("recommendation", r"(?i)recommendations?\s*[:\-]\s*((?:[^.\n!?]|\.\d){3,160})"),
    rule("should-statement", r"(?i)[^.\n!?]{0,80}\bshould\b[^.\n!?]{3,120}"),
];

/// The rule table for a concept set.
pub fn rules_for(kind: ConceptKind) -> &'static [PatternRule] {
    match kind {
        ConceptKind::Journeys => JOURNEY_RULES,
        ConceptKind::Indicators => INDICATOR_RULES,
        ConceptKind::Objectives => OBJECTIVE_RULES,
        ConceptKind::Practices => PRACTICE_RULES,
    }
}
