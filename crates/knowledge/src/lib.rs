//! Knowledge base: document loading, concept extraction and relevance search.

pub mod concept_extractor;
pub mod document_processor;
pub mod document_store;
pub mod patterns;
pub mod search;

pub use concept_extractor::{ConceptExtractor, ConceptSet, ConceptSets};
pub use document_processor::{FsTextLoader, TextLoader};
pub use document_store::DocumentStore;
pub use search::SearchEngine;

use sre_copilot_common::{DocumentMetadata, KnowledgeStats, Result, SearchCategory, SearchResponse};
use std::path::Path;
use tracing::info;

/// Outcome of a directory load.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
    pub concepts_added: usize,
}

/// Documents plus the concept sets derived from them.
///
/// Built and filled once during startup, then shared read-only.
pub struct KnowledgeBase {
    store: DocumentStore,
    concepts: ConceptSets,
    extractor: ConceptExtractor,
}

impl KnowledgeBase {
    pub fn new() -> Result<Self> {
        Ok(Self::with_extractor(ConceptExtractor::new()?))
    }

    pub fn with_extractor(extractor: ConceptExtractor) -> Self {
        Self {
            store: DocumentStore::new(),
            concepts: ConceptSets::default(),
            extractor,
        }
    }

    /// Store a document and extract its concepts. Returns the number of new
    /// concept entries, or `None` when the content could not be read.
    pub fn load_document(
        &mut self,
        id: impl Into<String>,
        content: Result<String>,
        metadata: DocumentMetadata,
    ) -> Option<usize> {
        let id = id.into();
        if !self.store.load(id.clone(), content, metadata) {
            return None;
        }

        let document = self.store.get(&id).ok()?;
        Some(self.extractor.extract_into(&document.content, &mut self.concepts))
    }

    /// Load every supported file under `root`. Individual failures are
    /// logged and counted; only a missing root is an error.
    pub async fn load_directory(&mut self, root: &Path, loader: &dyn TextLoader) -> Result<LoadReport> {
        info!("Loading documents from {}", root.display());

        let mut report = LoadReport::default();
        for file in document_processor::scan_directory(root)? {
            let content = loader.load_text(&file.path).await;
            let mut metadata = file.metadata;
            if let Ok(text) = &content {
                metadata.title = document_processor::derive_title(&file.path, metadata.doc_type, text);
            }

            match self.load_document(file.id, content, metadata) {
                Some(added) => {
                    report.loaded += 1;
                    report.concepts_added += added;
                }
                None => report.skipped += 1,
            }
        }

        let stats = self.stats();
        info!(
            "Loaded {} documents ({} skipped): {} CUJs, {} SLIs, {} SLOs, {} best practices",
            report.loaded, report.skipped, stats.cujs, stats.slis, stats.slos, stats.best_practices
        );
        Ok(report)
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn concepts(&self) -> &ConceptSets {
        &self.concepts
    }

    pub fn search_engine(&self) -> SearchEngine<'_> {
        SearchEngine::new(&self.store, &self.concepts)
    }

    /// Search with an optional raw category string; unknown values mean "all".
    pub fn search(&self, query: &str, category: Option<&str>) -> Result<SearchResponse> {
        self.search_engine()
            .search(query, SearchCategory::parse_filter(category))
    }

    pub fn stats(&self) -> KnowledgeStats {
        KnowledgeStats {
            documents: self.store.len(),
            cujs: self.concepts.journeys.len(),
            slis: self.concepts.indicators.len(),
            slos: self.concepts.objectives.len(),
            best_practices: self.concepts.practices.len(),
            pdfs: self.store.pdf_count(),
            by_category: self.store.count_by_category(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sre_copilot_common::{AssistantError, DocumentCategory};
    use std::path::Path;

    #[test]
    fn test_loading_same_document_twice_is_idempotent() {
        let mut kb = KnowledgeBase::new().unwrap();
        let text = "Best practice: page on symptoms. SLO: 99.5% of requests under 300ms.";
        let meta = DocumentMetadata::new("Runbook", DocumentCategory::Docs);

        let first = kb.load_document("runbook", Ok(text.to_string()), meta.clone()).unwrap();
        let second = kb.load_document("runbook", Ok(text.to_string()), meta).unwrap();

        assert!(first > 0);
        assert_eq!(second, 0);
        assert_eq!(kb.stats().documents, 1);
    }

    #[test]
    fn test_failed_load_does_not_extract() {
        let mut kb = KnowledgeBase::new().unwrap();
        let result = kb.load_document(
            "bad",
            Err(AssistantError::load("bad.pdf", "unreadable")),
            DocumentMetadata::new("Bad", DocumentCategory::Docs),
        );
        assert!(result.is_none());
        assert_eq!(kb.stats(), KnowledgeStats::default());
    }

    #[test]
    fn test_search_with_unknown_category_searches_everything() {
        let mut kb = KnowledgeBase::new().unwrap();
        kb.load_document(
            "guide",
            Ok("CUJ: checkout. Checkout must be fast.".to_string()),
            DocumentMetadata::new("Guide", DocumentCategory::Framework),
        );

        let response = kb.search("checkout", Some("not-a-category")).unwrap();
        assert_eq!(response.category, SearchCategory::All);
        assert_eq!(response.results[&SearchCategory::Cujs].len(), 1);
        assert_eq!(response.results[&SearchCategory::Context].len(), 1);
    }

    struct FlakyLoader;

    #[async_trait]
    impl TextLoader for FlakyLoader {
        async fn load_text(&self, path: &Path) -> Result<String> {
            if path.to_string_lossy().contains("broken") {
                Err(AssistantError::load(path.display().to_string(), "simulated failure"))
            } else {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| AssistantError::load(path.display().to_string(), e))
            }
        }
    }

    #[tokio::test]
    async fn test_load_directory_skips_failures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("knowledge")).unwrap();
        std::fs::write(
            dir.path().join("knowledge/slo.md"),
            "# SLO Guide\nOur service level objective is 99.9% availability.",
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.txt"), "never read").unwrap();

        let mut kb = KnowledgeBase::new().unwrap();
        let report = kb.load_directory(dir.path(), &FlakyLoader).await.unwrap();

        assert_eq!(report.loaded, 1);
        assert_eq!(report.skipped, 1);

        let doc = kb.store().get("knowledge/slo.md").unwrap();
        assert_eq!(doc.title, "SLO Guide");
        assert_eq!(doc.category, DocumentCategory::Knowledge);
        assert_eq!(kb.stats().slos, 1);

        let results = kb.search_engine().search_documents("slo").unwrap();
        assert!(results[0].relevance_score >= 10);
    }
}
