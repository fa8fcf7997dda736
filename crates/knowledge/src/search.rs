use crate::concept_extractor::ConceptSets;
use crate::document_store::DocumentStore;
use sre_copilot_common::{
    AssistantError, CategoryHits, ConceptKind, DocumentMatch, Result, SearchCategory,
    SearchResponse, SearchResult,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

pub const TITLE_MATCH_POINTS: u32 = 10;
pub const OCCURRENCE_POINTS: u32 = 1;
pub const KEY_TERM_POINTS: u32 = 5;
pub const MAX_SNIPPETS: usize = 3;

/// Domain vocabulary that earns a bonus when present in both query and body.
pub const KEY_TERMS: &[&str] = &[
    "cuj",
    "sli",
    "slo",
    "sla",
    "error budget",
    "latency",
    "availability",
    "reliability",
    "monitoring",
    "observability",
    "alerting",
];

/// Long forms that also qualify a sentence as a snippet when the query is
/// exactly the acronym.
pub const ACRONYM_EXPANSIONS: &[(&str, &str)] = &[
    ("cuj", "critical user journey"),
    ("sli", "service level indicator"),
    ("slo", "service level objective"),
    ("sla", "service level agreement"),
];

/// Score a candidate. All inputs must already be lower-cased.
pub fn relevance_score(query: &str, title: Option<&str>, body: &str) -> u32 {
    let mut score = 0;

    if title.is_some_and(|title| title.contains(query)) {
        score += TITLE_MATCH_POINTS;
    }

    score += body.matches(query).count() as u32 * OCCURRENCE_POINTS;

    for term in KEY_TERMS {
        if query.contains(term) && body.contains(term) {
            score += KEY_TERM_POINTS;
        }
    }

    score
}

fn snippet_terms(query: &str) -> Vec<String> {
    let mut terms = vec![query.to_string()];
    if let Some((_, long_form)) = ACRONYM_EXPANSIONS.iter().find(|(acronym, _)| *acronym == query) {
        terms.push(long_form.to_string());
    }
    terms
}

/// Sentence-like units of `content` that mention the (lower-cased) query,
/// at most [`MAX_SNIPPETS`], in original order.
pub fn snippets<'a>(content: &'a str, query: &str) -> impl Iterator<Item = &'a str> + 'a {
    let terms = snippet_terms(query);
    content
        .split(|c: char| matches!(c, '.' | '!' | '?'))
        .map(str::trim)
        .filter(|unit| !unit.is_empty())
        .filter(move |unit| {
            let lowered = unit.to_lowercase();
            terms.iter().any(|term| lowered.contains(term.as_str()))
        })
        .take(MAX_SNIPPETS)
}

fn normalize_query(query: &str) -> Result<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(AssistantError::InvalidQuery("query must not be empty".to_string()));
    }
    Ok(trimmed.to_lowercase())
}

fn rank(mut results: Vec<SearchResult>) -> Vec<SearchResult> {
    // `sort_by` is stable, so equal scores keep discovery order.
    results.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    results
}

/// Keyword relevance search over the document store and concept sets.
pub struct SearchEngine<'a> {
    store: &'a DocumentStore,
    concepts: &'a ConceptSets,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a DocumentStore, concepts: &'a ConceptSets) -> Self {
        Self { store, concepts }
    }

    /// Run a search across one category, or every category for `All`.
    pub fn search(&self, query: &str, category: SearchCategory) -> Result<SearchResponse> {
        let normalized = normalize_query(query)?;
        debug!("Searching '{}' in {}", normalized, category);

        let scopes: Vec<SearchCategory> = match category {
            SearchCategory::All => SearchCategory::SCOPES.to_vec(),
            single => vec![single],
        };

        let mut results = BTreeMap::new();
        for scope in scopes {
            let hits = match scope {
                SearchCategory::Cujs
                | SearchCategory::Slis
                | SearchCategory::Slos
                | SearchCategory::BestPractices => {
                    let kind = scope
                        .concept_kind()
                        .ok_or_else(|| AssistantError::Internal(format!("{} has no concept set", scope)))?;
                    CategoryHits::Scored(self.scored_concepts(kind, &normalized))
                }
                SearchCategory::Context => CategoryHits::Scored(self.scored_documents(&normalized)),
                SearchCategory::Pdfs => CategoryHits::Documents(self.matching_pdfs(&normalized)),
                SearchCategory::All => continue,
            };
            results.insert(scope, hits);
        }

        let total_matches = results.values().map(CategoryHits::len).sum();
        info!("Search '{}' ({}) found {} matches", normalized, category, total_matches);

        Ok(SearchResponse {
            query: query.trim().to_string(),
            category,
            results,
            total_matches,
        })
    }

    /// Ranked document results for the `context` category.
    pub fn search_documents(&self, query: &str) -> Result<Vec<SearchResult>> {
        let normalized = normalize_query(query)?;
        Ok(self.scored_documents(&normalized))
    }

    /// Ranked entries of one concept set.
    pub fn search_concepts(&self, kind: ConceptKind, query: &str) -> Result<Vec<SearchResult>> {
        let normalized = normalize_query(query)?;
        Ok(self.scored_concepts(kind, &normalized))
    }

    /// PDF-derived documents whose file name or text contains the query.
    pub fn search_pdfs(&self, query: &str) -> Result<Vec<DocumentMatch>> {
        let normalized = normalize_query(query)?;
        Ok(self.matching_pdfs(&normalized))
    }

    fn scored_documents(&self, query: &str) -> Vec<SearchResult> {
        let results = self
            .store
            .all()
            .filter_map(|doc| {
                let body = doc.content.to_lowercase();
                let title = doc.title.to_lowercase();
                let score = relevance_score(query, Some(&title), &body);
                (score > 0).then(|| SearchResult {
                    document_id: doc.id.clone(),
                    title: doc.title.clone(),
                    relevance_score: score,
                    snippets: snippets(&doc.content, query).map(str::to_string).collect(),
                })
            })
            .collect();
        rank(results)
    }

    fn scored_concepts(&self, kind: ConceptKind, query: &str) -> Vec<SearchResult> {
        let category = kind.search_category();
        let results = self
            .concepts
            .get(kind)
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let score = relevance_score(query, None, &entry.to_lowercase());
                (score > 0).then(|| SearchResult {
                    document_id: format!("{}#{}", category, index),
                    title: entry.clone(),
                    relevance_score: score,
                    snippets: snippets(entry, query).map(str::to_string).collect(),
                })
            })
            .collect();
        rank(results)
    }

    fn matching_pdfs(&self, query: &str) -> Vec<DocumentMatch> {
        self.store
            .all()
            .filter(|doc| doc.from_pdf)
            .filter(|doc| {
                doc.file_name.to_lowercase().contains(query)
                    || doc.content.to_lowercase().contains(query)
            })
            .map(|doc| DocumentMatch {
                document_id: doc.id.clone(),
                file_name: doc.file_name.clone(),
                title: doc.title.clone(),
                category: doc.category,
                last_modified: doc.last_modified,
                characters: doc.content.chars().count(),
                snippets: snippets(&doc.content, query).map(str::to_string).collect(),
            })
            .collect()
    }
}
