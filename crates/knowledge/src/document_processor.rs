use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sre_copilot_common::{AssistantError, DocumentCategory, DocumentMetadata, DocumentType, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Source of plain text for a file on disk.
#[async_trait]
pub trait TextLoader: Send + Sync {
    async fn load_text(&self, path: &Path) -> Result<String>;
}

/// Reads UTF-8 files directly and PDFs through `pdf-extract`.
#[derive(Debug, Default, Clone)]
pub struct FsTextLoader;

#[async_trait]
impl TextLoader for FsTextLoader {
    async fn load_text(&self, path: &Path) -> Result<String> {
        let display = path.display().to_string();

        if is_pdf(path) {
            let owned = path.to_path_buf();
            return tokio::task::spawn_blocking(move || pdf_extract::extract_text(&owned))
                .await
                .map_err(|e| AssistantError::load(&display, e))?
                .map_err(|e| AssistantError::load(&display, e));
        }

        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AssistantError::load(&display, e))
    }
}

/// A file discovered under the documents root, ready to be loaded.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: String,
    pub path: PathBuf,
    pub metadata: DocumentMetadata,
}

fn is_pdf(path: &Path) -> bool {
    extension(path).as_deref() == Some("pdf")
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|ext| ext.to_string_lossy().to_lowercase())
}

/// Map a file extension to a document type. PDFs become plain text.
pub fn document_type(path: &Path) -> Option<DocumentType> {
    match extension(path)?.as_str() {
        "md" | "markdown" => Some(DocumentType::Markdown),
        "json" => Some(DocumentType::Json),
        "txt" | "pdf" => Some(DocumentType::Text),
        _ => None,
    }
}

/// Infer the category from the directories between the root and the file.
pub fn infer_category(relative: &Path) -> DocumentCategory {
    let dirs = relative
        .parent()
        .map(|p| p.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if dirs.contains("framework") {
        DocumentCategory::Framework
    } else if dirs.contains("template") {
        DocumentCategory::Template
    } else if dirs.contains("knowledge") {
        DocumentCategory::Knowledge
    } else {
        DocumentCategory::Docs
    }
}

/// First heading of a markdown file, otherwise the file stem.
pub fn derive_title(path: &Path, doc_type: DocumentType, content: &str) -> String {
    let heading = (doc_type == DocumentType::Markdown)
        .then(|| {
            content
                .lines()
                .map(str::trim)
                .find(|line| line.starts_with('#'))
                .map(|line| line.trim_start_matches('#').trim())
        })
        .flatten()
        .filter(|title| !title.is_empty());

    match heading {
        Some(title) => title.to_string(),
        None => path
            .file_stem()
            .map(|stem| stem.to_string_lossy().replace(|c: char| c == '-' || c == '_', " "))
            .unwrap_or_else(|| "Untitled".to_string()),
    }
}

fn modified_at(path: &Path) -> DateTime<Utc> {
    std::fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

/// Walk `root` and collect every supported file in a stable order.
pub fn scan_directory(root: &Path) -> Result<Vec<SourceFile>> {
    if !root.exists() {
        return Err(AssistantError::Configuration(format!(
            "documents directory does not exist: {}",
            root.display()
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(doc_type) = document_type(path) else {
            debug!("Skipping unsupported file {}", path.display());
            continue;
        };

        let relative = path.strip_prefix(root).unwrap_or(path);
        let id = relative.to_string_lossy().replace('\\', "/");
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| id.clone());

        let mut metadata = DocumentMetadata::new(file_name.clone(), infer_category(relative))
            .with_type(doc_type)
            .with_file_name(file_name)
            .with_last_modified(modified_at(path));
        if is_pdf(path) {
            metadata = metadata.from_pdf();
        }

        files.push(SourceFile {
            id,
            path: path.to_path_buf(),
            metadata,
        });
    }

    Ok(files)
}
