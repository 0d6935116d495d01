use crate::editing::sync::pages_from_markup;
use crate::models::{Document, Page};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File is not valid UTF-8: {0}")]
    InvalidEncoding(PathBuf),
}

/// How a document file on disk is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Markup,
    Markdown,
}

impl DocumentFormat {
    /// `.md` and `.markdown` are Markdown; everything else is markup
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown") => {
                Self::Markdown
            }
            _ => Self::Markup,
        }
    }
}

/// Read a document file, importing Markdown by extension
pub fn read_document(path: &Path) -> Result<Document, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;
    let invalid = || IoError::InvalidEncoding(path.to_path_buf());

    let document = match DocumentFormat::from_path(path) {
        DocumentFormat::Markdown => {
            let source = String::from_utf8(bytes).map_err(|_| invalid())?;
            Document::from_markdown(&source)
        }
        DocumentFormat::Markup => Document::from_bytes(&bytes).map_err(|_| invalid())?,
    };
    log::debug!("Read {} blocks from {}", document.len(), path.display());
    Ok(document)
}

/// Write the document's canonical markup, creating parent directories
pub fn write_document(path: &Path, document: &Document) -> Result<(), IoError> {
    write_markup(path, &document.to_markup())
}

/// Write paginated output: each page container one after another
pub fn write_pages(path: &Path, pages: &[Page]) -> Result<(), IoError> {
    let markup: Vec<String> = pages.iter().map(Page::to_markup).collect();
    write_markup(path, &markup.join("\n"))
}

/// Read back a paginated file, possibly edited since [`write_pages`]
pub fn read_pages(path: &Path) -> Result<Vec<Page>, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let markup = String::from_utf8(fs::read(path)?)
        .map_err(|_| IoError::InvalidEncoding(path.to_path_buf()))?;
    Ok(pages_from_markup(&markup))
}

fn write_markup(path: &Path, markup: &str) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, markup)?;
    Ok(())
}
