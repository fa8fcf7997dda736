use crate::patterns::{rules_for, PatternRule};
use regex::Regex;
use serde::Serialize;
use sre_copilot_common::{AssistantError, ConceptKind, Result};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// An append-only, insertion-ordered set of extracted fragments.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(transparent)]
pub struct ConceptSet {
    entries: Vec<String>,
    #[serde(skip)]
    seen: HashSet<String>,
}

impl ConceptSet {
    /// Returns `true` if the fragment was new.
    pub fn insert(&mut self, fragment: String) -> bool {
        if self.seen.contains(&fragment) {
            return false;
        }
        self.seen.insert(fragment.clone());
        self.entries.push(fragment);
        true
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct ConceptSets {
    pub journeys: ConceptSet,
    pub indicators: ConceptSet,
    pub objectives: ConceptSet,
    pub practices: ConceptSet,
}

impl ConceptSets {
    pub fn get(&self, kind: ConceptKind) -> &ConceptSet {
        match kind {
            ConceptKind::Journeys => &self.journeys,
            ConceptKind::Indicators => &self.indicators,
            ConceptKind::Objectives => &self.objectives,
            ConceptKind::Practices => &self.practices,
        }
    }

    fn get_mut(&mut self, kind: ConceptKind) -> &mut ConceptSet {
        match kind {
            ConceptKind::Journeys => &mut self.journeys,
            ConceptKind::Indicators => &mut self.indicators,
            ConceptKind::Objectives => &mut self.objectives,
            ConceptKind::Practices => &mut self.practices,
        }
    }
}

struct CompiledRule {
    name: &'static str,
    regex: Regex,
}

/// Applies the pattern tables to document text.
pub struct ConceptExtractor {
    rules: BTreeMap<ConceptKind, Vec<CompiledRule>>,
}

impl ConceptExtractor {
    pub fn new() -> Result<Self> {
        let mut extractor = Self { rules: BTreeMap::new() };
        for kind in ConceptKind::ALL {
            extractor.add_rules(kind, rules_for(kind))?;
        }

        info!(
            "Initialized concept extractor with {} rules",
            extractor.rules.values().map(Vec::len).sum::<usize>()
        );
        Ok(extractor)
    }

    /// An extractor with no rules at all; tables are added with [`Self::add_rules`].
    pub fn empty() -> Self {
        Self { rules: BTreeMap::new() }
    }

    pub fn add_rules(&mut self, kind: ConceptKind, rules: &[PatternRule]) -> Result<()> {
        let compiled = self.rules.entry(kind).or_default();
        for rule in rules {
            let regex = Regex::new(rule.pattern).map_err(|e| {
                AssistantError::Configuration(format!("pattern rule '{}': {}", rule.name, e))
            })?;
            compiled.push(CompiledRule { name: rule.name, regex });
        }
        Ok(())
    }

    /// Fragments matched for one concept kind, trimmed, in rule then position order.
    pub fn fragments(&self, kind: ConceptKind, text: &str) -> Vec<String> {
        let Some(rules) = self.rules.get(&kind) else {
            return Vec::new();
        };

        let mut fragments = Vec::new();
        for rule in rules {
            for captures in rule.regex.captures_iter(text) {
                let matched = captures.get(1).or_else(|| captures.get(0));
                if let Some(m) = matched {
                    let fragment = m.as_str().trim();
                    if !fragment.is_empty() {
                        fragments.push(fragment.to_string());
                    }
                }
            }
            debug!("Rule {} scanned {} bytes", rule.name, text.len());
        }
        fragments
    }

    /// Extract every concept kind from `text` into `sets`. Returns the number
    /// of new entries added.
    pub fn extract_into(&self, text: &str, sets: &mut ConceptSets) -> usize {
        let mut added = 0;
        for kind in ConceptKind::ALL {
            let set = sets.get_mut(kind);
            for fragment in self.fragments(kind, text) {
                if set.insert(fragment) {
                    added += 1;
                }
            }
        }
        added
    }
}
