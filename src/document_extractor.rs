use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use epub::doc::EpubDoc;
use log::{debug, warn};

use crate::errors::ExtractorError;

// @module: Document text extraction and word tokenization

// @const: Rendering width handed to the XHTML-to-text pass; RSVP discards
// line structure anyway, so the value only has to be wide enough to avoid
// mid-word wrapping artifacts.
const EPUB_TEXT_WIDTH: usize = 120;

/// Supported source document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Portable Document Format
    Pdf,
    /// EPUB electronic publication
    Epub,
}

impl DocumentFormat {
    // @detects: Format from the file extension, lowercased
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ExtractorError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "epub" => Ok(Self::Epub),
            _ => Err(ExtractorError::UnsupportedFormat { extension }),
        }
    }

    // @returns: Lowercase format identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Epub => "epub",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = ExtractorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "epub" => Ok(Self::Epub),
            _ => Err(ExtractorError::UnsupportedFormat {
                extension: s.to_string(),
            }),
        }
    }
}

// @struct: Ordered, immutable sequence of word tokens
#[derive(Debug, Clone, Default)]
pub struct WordSequence {
    // @field: Word tokens in document order, no empty entries
    words: Vec<String>,
}

impl WordSequence {
    /// Build a word sequence from raw text: split on whitespace, drop empty
    /// tokens, preserve order.
    pub fn from_text(text: &str) -> Self {
        let words = text
            .split_whitespace()
            .map(|word| word.to_string())
            .collect();

        WordSequence { words }
    }

    /// Number of words in the sequence
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the sequence contains no words
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word at the given 0-based position, if in range
    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(|word| word.as_str())
    }

    /// All words as a slice
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Iterate over the words in order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(|word| word.as_str())
    }
}

// @struct: Document-to-words extraction entry point
pub struct DocumentExtractor;

impl DocumentExtractor {
    /// Extract the word sequence from a document, detecting the format from
    /// the file extension.
    pub fn extract<P: AsRef<Path>>(path: P) -> Result<WordSequence, ExtractorError> {
        let format = DocumentFormat::from_path(&path)?;
        Self::extract_with_format(path, format)
    }

    /// Extract the word sequence from a document with a caller-declared format.
    pub fn extract_with_format<P: AsRef<Path>>(
        path: P,
        format: DocumentFormat,
    ) -> Result<WordSequence, ExtractorError> {
        let path = path.as_ref();
        debug!("Extracting text from {:?} as {}", path, format);

        let text = match format {
            DocumentFormat::Pdf => Self::extract_pdf_text(path)?,
            DocumentFormat::Epub => Self::extract_epub_text(path)?,
        };

        let sequence = WordSequence::from_text(&text);
        if sequence.is_empty() {
            // Scanned or image-only documents extract fine but carry no text
            warn!("Document {:?} yielded no words", path);
        } else {
            debug!("Extracted {} words from {:?}", sequence.len(), path);
        }

        Ok(sequence)
    }

    // @extracts: Whole-document PDF text in natural reading order
    fn extract_pdf_text(path: &Path) -> Result<String, ExtractorError> {
        let bytes = std::fs::read(path)?;

        pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| ExtractorError::Extraction(format!("PDF parse failed: {}", e)))
    }

    // @extracts: EPUB text by walking the spine in reading order
    fn extract_epub_text(path: &Path) -> Result<String, ExtractorError> {
        let mut doc: EpubDoc<BufReader<File>> = EpubDoc::new(path)
            .map_err(|e| ExtractorError::Extraction(format!("Failed to open EPUB: {}", e)))?;

        let mut combined = String::new();

        loop {
            let Some((content, _media_type)) = doc.get_current_str() else {
                break;
            };

            if !combined.is_empty() {
                combined.push(' ');
            }
            // Lightweight XHTML-to-text pass to strip markup
            combined.push_str(&html2text::from_read(content.as_bytes(), EPUB_TEXT_WIDTH));

            if !doc.go_next() {
                break;
            }
        }

        Ok(combined)
    }
}
