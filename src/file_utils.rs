use std::fs;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::document_extractor::DocumentFormat;

// @module: File and document-type utilities

// An EPUB is a zip container whose first entry must be an uncompressed
// `mimetype` file, so the media type sits at a fixed offset near the start.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const EPUB_MIMETYPE: &[u8] = b"mimetypeapplication/epub+zip";
const PDF_MAGIC: &[u8] = b"%PDF-";
const SNIFF_LEN: usize = 64;

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Detect whether a file is a PDF or an EPUB.
    ///
    /// Checks the file extension first; when that is inconclusive, falls
    /// back to sniffing the leading bytes. Returns `None` for files that are
    /// neither.
    pub fn detect_document_format<P: AsRef<Path>>(path: P) -> Result<Option<DocumentFormat>> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow!("File does not exist: {:?}", path));
        }

        // Check file extension
        if let Ok(format) = DocumentFormat::from_path(path) {
            return Ok(Some(format));
        }

        // Fall back to examining the file header
        let mut header = [0u8; SNIFF_LEN];
        let mut file = File::open(path)
            .with_context(|| format!("Failed to open file: {:?}", path))?;
        let read = file.read(&mut header)?;
        let header = &header[..read];

        if header.starts_with(PDF_MAGIC) {
            return Ok(Some(DocumentFormat::Pdf));
        }

        if header.starts_with(ZIP_MAGIC)
            && header
                .windows(EPUB_MIMETYPE.len())
                .any(|window| window == EPUB_MIMETYPE)
        {
            return Ok(Some(DocumentFormat::Epub));
        }

        Ok(None)
    }
}
