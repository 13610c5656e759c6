use anyhow::{Context, Result};
use lopdf::Document;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::sync::Arc;

/// The bytes of one uploaded PDF.
///
/// The document is read in full once. Every consumer (page counting,
/// rendering) gets its own view starting at offset 0, so one reader running
/// to EOF never leaves the next one with an empty or truncated stream.
#[derive(Debug, Clone)]
pub struct PdfSource {
    name: String,
    bytes: Arc<Vec<u8>>,
}

impl PdfSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("Failed to open PDF: {}", path.display()))?;
        PdfSource::from_reader(path.display().to_string(), file)
    }

    /// Read a document from a stream that may already have been consumed.
    pub fn from_reader<R: Read + Seek>(name: impl Into<String>, mut reader: R) -> Result<Self> {
        let name = name.into();
        reader
            .rewind()
            .with_context(|| format!("Failed to rewind {}", name))?;

        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read {}", name))?;

        Ok(PdfSource::from_bytes(name, bytes))
    }

    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        PdfSource {
            name: name.into(),
            bytes: Arc::new(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A fresh reader positioned at the start of the document.
    pub fn reader(&self) -> Cursor<&[u8]> {
        Cursor::new(self.bytes.as_slice())
    }

    /// Shared handle to the raw bytes, for renderers that keep them alive.
    pub fn data(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.bytes)
    }

    pub fn page_count(&self) -> Result<u32> {
        let doc = Document::load_from(self.reader())
            .with_context(|| format!("Failed to parse PDF: {}", self.name))?;
        Ok(doc.get_pages().len() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::SeekFrom;

    #[test]
    fn test_reader_always_starts_at_zero() {
        let source = PdfSource::from_bytes("mem", b"%PDF-1.5 body".to_vec());

        let mut first = Vec::new();
        source.reader().read_to_end(&mut first).unwrap();
        let mut second = Vec::new();
        source.reader().read_to_end(&mut second).unwrap();

        assert_eq!(first, b"%PDF-1.5 body");
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_reader_rewinds_consumed_stream() {
        let mut upload = Cursor::new(b"%PDF-1.5 data".to_vec());
        upload.seek(SeekFrom::End(0)).unwrap();

        let source = PdfSource::from_reader("upload.pdf", upload).unwrap();
        assert_eq!(source.data().as_slice(), b"%PDF-1.5 data");
        assert_eq!(source.name(), "upload.pdf");
    }

    #[test]
    fn test_garbage_is_not_a_pdf() {
        let source = PdfSource::from_bytes("junk", b"not a pdf".to_vec());
        let err = source.page_count().unwrap_err();
        assert!(err.to_string().contains("Failed to parse PDF: junk"));
    }
}
