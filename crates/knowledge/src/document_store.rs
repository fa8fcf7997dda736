use sre_copilot_common::{AssistantError, Document, DocumentCategory, DocumentMetadata, Result};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// In-memory document storage keyed by id.
///
/// Documents are kept in discovery order so that search results with equal
/// scores come back in the order their documents were first loaded.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<String, Document>,
    order: Vec<String>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a document. Content that could not be read is
    /// logged and skipped; the return value tells whether anything was stored.
    pub fn load(
        &mut self,
        id: impl Into<String>,
        content: Result<String>,
        metadata: DocumentMetadata,
    ) -> bool {
        let id = id.into();

        let content = match content {
            Ok(content) => content,
            Err(e) => {
                warn!("Skipping document {}: {}", id, e);
                return false;
            }
        };

        let document = Document {
            id: id.clone(),
            title: metadata.title,
            content,
            doc_type: metadata.doc_type,
            category: metadata.category,
            last_modified: metadata.last_modified,
            file_name: metadata.file_name,
            from_pdf: metadata.from_pdf,
        };

        if self.documents.insert(id.clone(), document).is_some() {
            debug!("Replaced document {}", id);
        } else {
            debug!("Loaded document {}", id);
            self.order.push(id);
        }

        true
    }

    pub fn get(&self, id: &str) -> Result<&Document> {
        self.documents
            .get(id)
            .ok_or_else(|| AssistantError::NotFound(format!("document '{}'", id)))
    }

    /// Iterate documents in discovery order. Each call starts a fresh pass.
    pub fn all(&self) -> impl Iterator<Item = &Document> + '_ {
        self.order.iter().filter_map(move |id| self.documents.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn pdf_count(&self) -> usize {
        self.all().filter(|doc| doc.from_pdf).count()
    }

    pub fn count_by_category(&self) -> BTreeMap<DocumentCategory, usize> {
        let mut counts = BTreeMap::new();
        for doc in self.all() {
            *counts.entry(doc.category).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sre_copilot_common::DocumentType;

    fn meta(title: &str) -> DocumentMetadata {
        DocumentMetadata::new(title, DocumentCategory::Docs).with_type(DocumentType::Markdown)
    }

    #[test]
    fn test_load_and_get() {
        let mut store = DocumentStore::new();
        assert!(store.load("guide", Ok("hello".to_string()), meta("Guide")));

        let doc = store.get("guide").unwrap();
        assert_eq!(doc.title, "Guide");
        assert_eq!(doc.content, "hello");
        assert_eq!(doc.doc_type, DocumentType::Markdown);
    }

    #[test]
    fn test_missing_document_is_not_found() {
        let store = DocumentStore::new();
        assert!(matches!(store.get("nope"), Err(AssistantError::NotFound(_))));
    }

    #[test]
    fn test_failed_content_is_skipped() {
        let mut store = DocumentStore::new();
        let stored = store.load(
            "broken",
            Err(AssistantError::load("broken.pdf", "corrupt xref table")),
            meta("Broken"),
        );

        assert!(!stored);
        assert!(store.is_empty());

        assert!(store.load("fine", Ok("ok".to_string()), meta("Fine")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_reload_replaces_and_keeps_position() {
        let mut store = DocumentStore::new();
        store.load("a", Ok("first".to_string()), meta("A"));
        store.load("b", Ok("second".to_string()), meta("B"));
        store.load("a", Ok("updated".to_string()), meta("A2"));

        let ids: Vec<&str> = store.all().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(store.get("a").unwrap().content, "updated");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_all_is_restartable() {
        let mut store = DocumentStore::new();
        store.load("a", Ok("x".to_string()), meta("A"));
        store.load("b", Ok("y".to_string()), meta("B"));

        assert_eq!(store.all().count(), 2);
        assert_eq!(store.all().count(), 2);
    }

    #[test]
    fn test_counts() {
        let mut store = DocumentStore::new();
        store.load("a", Ok("x".to_string()), meta("A"));
        store.load(
            "b",
            Ok("y".to_string()),
            DocumentMetadata::new("B", DocumentCategory::Framework).from_pdf(),
        );

        let counts = store.count_by_category();
        assert_eq!(counts.get(&DocumentCategory::Docs), Some(&1));
        assert_eq!(counts.get(&DocumentCategory::Framework), Some(&1));
        assert_eq!(store.pdf_count(), 1);
    }
}
