use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// Document types for the knowledge base
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub category: DocumentCategory,
    pub last_modified: DateTime<Utc>,
    pub file_name: String,
    pub from_pdf: bool,
}

/// Metadata supplied alongside raw text when a document is loaded.
#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    pub title: String,
    pub doc_type: DocumentType,
    pub category: DocumentCategory,
    pub last_modified: DateTime<Utc>,
    pub file_name: String,
    pub from_pdf: bool,
}

impl DocumentMetadata {
    pub fn new(title: impl Into<String>, category: DocumentCategory) -> Self {
        let title = title.into();
        Self {
            file_name: title.clone(),
            title,
            doc_type: DocumentType::Text,
            category,
            last_modified: Utc::now(),
            from_pdf: false,
        }
    }

    pub fn with_type(mut self, doc_type: DocumentType) -> Self {
        self.doc_type = doc_type;
        self
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub fn from_pdf(mut self) -> Self {
        self.from_pdf = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Markdown,
    Json,
    Text,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    Framework,
    Template,
    Knowledge,
    Docs,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Framework => "framework",
            DocumentCategory::Template => "template",
            DocumentCategory::Knowledge => "knowledge",
            DocumentCategory::Docs => "docs",
        }
    }
}

// Concept sets populated by extraction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConceptKind {
    Journeys,
    Indicators,
    Objectives,
    Practices,
}

impl ConceptKind {
    pub const ALL: [ConceptKind; 4] = [
        ConceptKind::Journeys,
        ConceptKind::Indicators,
        ConceptKind::Objectives,
        ConceptKind::Practices,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ConceptKind::Journeys => "critical user journeys",
            ConceptKind::Indicators => "service level indicators",
            ConceptKind::Objectives => "service level objectives",
            ConceptKind::Practices => "best practices",
        }
    }

    pub fn search_category(&self) -> SearchCategory {
        match self {
            ConceptKind::Journeys => SearchCategory::Cujs,
            ConceptKind::Indicators => SearchCategory::Slis,
            ConceptKind::Objectives => SearchCategory::Slos,
            ConceptKind::Practices => SearchCategory::BestPractices,
        }
    }
}

/// Category values accepted by the search interface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum SearchCategory {
    Cujs,
    Slis,
    Slos,
    BestPractices,
    Context,
    Pdfs,
    All,
}

impl SearchCategory {
    /// Concrete categories searched when no filter (or `all`) is requested.
    pub const SCOPES: [SearchCategory; 6] = [
        SearchCategory::Cujs,
        SearchCategory::Slis,
        SearchCategory::Slos,
        SearchCategory::BestPractices,
        SearchCategory::Context,
        SearchCategory::Pdfs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchCategory::Cujs => "cujs",
            SearchCategory::Slis => "slis",
            SearchCategory::Slos => "slos",
            SearchCategory::BestPractices => "best-practices",
            SearchCategory::Context => "context",
            SearchCategory::Pdfs => "pdfs",
            SearchCategory::All => "all",
        }
    }

    pub fn concept_kind(&self) -> Option<ConceptKind> {
        match self {
            SearchCategory::Cujs => Some(ConceptKind::Journeys),
            SearchCategory::Slis => Some(ConceptKind::Indicators),
            SearchCategory::Slos => Some(ConceptKind::Objectives),
            SearchCategory::BestPractices => Some(ConceptKind::Practices),
            SearchCategory::Context | SearchCategory::Pdfs | SearchCategory::All => None,
        }
    }

    /// Unknown or missing category strings mean "no filter".
    pub fn parse_filter(raw: Option<&str>) -> SearchCategory {
        raw.and_then(|value| value.parse().ok())
            .unwrap_or(SearchCategory::All)
    }
}

impl fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchCategory {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "cujs" => Ok(SearchCategory::Cujs),
            "slis" => Ok(SearchCategory::Slis),
            "slos" => Ok(SearchCategory::Slos),
            "best-practices" => Ok(SearchCategory::BestPractices),
            "context" => Ok(SearchCategory::Context),
            "pdfs" => Ok(SearchCategory::Pdfs),
            "all" => Ok(SearchCategory::All),
            other => Err(AssistantError::InvalidQuery(format!("unknown search category '{}'", other))),
        }
    }
}

// Search result shapes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub document_id: String,
    pub title: String,
    pub relevance_score: u32,
    pub snippets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMatch {
    pub document_id: String,
    pub file_name: String,
    pub title: String,
    pub category: DocumentCategory,
    pub last_modified: DateTime<Utc>,
    pub characters: usize,
    pub snippets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CategoryHits {
    Scored(Vec<SearchResult>),
    Documents(Vec<DocumentMatch>),
}

impl CategoryHits {
    pub fn len(&self) -> usize {
        match self {
            CategoryHits::Scored(results) => results.len(),
            CategoryHits::Documents(matches) => matches.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub category: SearchCategory,
    pub results: BTreeMap<SearchCategory, CategoryHits>,
    /// Sum of the per-category list lengths. A PDF matched in `all` mode
    /// counts once under `context` and once under `pdfs`.
    pub total_matches: usize,
}

// Intent classification types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    pub primary: Topic,
    pub question_type: QuestionType,
    pub specificity: Specificity,
}

impl Default for Intent {
    fn default() -> Self {
        Self {
            primary: Topic::General,
            question_type: QuestionType::General,
            specificity: Specificity::General,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Cuj,
    Sli,
    Slo,
    Observability,
    Security,
    Implementation,
    Comparison,
    Troubleshooting,
    General,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QuestionType {
    How,
    What,
    Why,
    When,
    Recommendation,
    General,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Specificity {
    Beginner,
    Advanced,
    Example,
    General,
}

/// Live counts over the loaded knowledge base.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeStats {
    pub documents: usize,
    pub cujs: usize,
    pub slis: usize,
    pub slos: usize,
    pub best_practices: usize,
    pub pdfs: usize,
    pub by_category: BTreeMap<DocumentCategory, usize>,
}

// Error types
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("Failed to load {path}: {reason}")]
    LoadFailure { path: String, reason: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Provider {provider} failed: {reason}")]
    Provider { provider: String, reason: String },

    #[error("Could not synthesize a response: {0}")]
    SynthesisFailure(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AssistantError {
    pub fn provider(provider: impl Into<String>, reason: impl fmt::Display) -> Self {
        AssistantError::Provider {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }

    pub fn load(path: impl Into<String>, reason: impl fmt::Display) -> Self {
        AssistantError::LoadFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AssistantError>;

// API response types
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_category_parsing() {
        assert_eq!("cujs".parse::<SearchCategory>().unwrap(), SearchCategory::Cujs);
        assert_eq!("Best-Practices".parse::<SearchCategory>().unwrap(), SearchCategory::BestPractices);
        assert!("nonsense".parse::<SearchCategory>().is_err());
    }

    #[test]
    fn test_unknown_filter_means_all() {
        assert_eq!(SearchCategory::parse_filter(Some("bogus")), SearchCategory::All);
        assert_eq!(SearchCategory::parse_filter(None), SearchCategory::All);
        assert_eq!(SearchCategory::parse_filter(Some("pdfs")), SearchCategory::Pdfs);
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&SearchCategory::BestPractices).unwrap();
        assert_eq!(json, "\"best-practices\"");

        let mut results = BTreeMap::new();
        results.insert(SearchCategory::Slos, CategoryHits::Scored(vec![]));
        let json = serde_json::to_value(&results).unwrap();
        assert!(json.get("slos").is_some());
    }

    #[test]
    fn test_concept_kind_maps_to_category() {
        for kind in ConceptKind::ALL {
            assert_eq!(kind.search_category().concept_kind(), Some(kind));
        }
    }

    #[test]
    fn test_default_intent_is_general() {
        let intent = Intent::default();
        assert_eq!(intent.primary, Topic::General);
        assert_eq!(intent.question_type, QuestionType::General);
        assert_eq!(intent.specificity, Specificity::General);
    }

    #[test]
    fn test_api_response() {
        let response = ApiResponse::success("data");
        assert!(response.success);
        assert_eq!(response.data, Some("data"));

        let error_response: ApiResponse<String> = ApiResponse::error("error".to_string());
        assert!(!error_response.success);
        assert_eq!(error_response.error, Some("error".to_string()));
    }
}
