use serde::{Deserialize, Serialize};

use crate::error::CalcKitError;
use crate::CalcKitResult;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// A user-selected file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Summary of a queued file, without its contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedFile {
    pub position: usize,
    pub name: String,
    pub size_bytes: usize,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        SourceFile {
            name: name.into(),
            bytes,
        }
    }

    /// File name without directories or a trailing `.pdf`.
    pub fn stem(&self) -> &str {
        let base = self
            .name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.name.as_str());
        match base.len().checked_sub(4) {
            Some(cut) if base.is_char_boundary(cut) && base[cut..].eq_ignore_ascii_case(".pdf") => {
                &base[..cut]
            }
            _ => base,
        }
    }
}

/// Accept a file when its name ends in `.pdf` or its bytes carry the PDF
/// header; reject empty files outright.
pub fn validate_pdf(file: &SourceFile) -> CalcKitResult<()> {
    if file.bytes.is_empty() {
        return Err(CalcKitError::UnsupportedFile {
            file: file.name.clone(),
            reason: "File is empty".into(),
        });
    }
    let has_extension = file.name.to_ascii_lowercase().ends_with(".pdf");
    let has_header = file.bytes.starts_with(PDF_MAGIC);
    if !has_extension && !has_header {
        return Err(CalcKitError::UnsupportedFile {
            file: file.name.clone(),
            reason: "Only PDF files are supported".into(),
        });
    }
    Ok(())
}

/// Ordered list of files waiting to be merged.
#[derive(Debug, Clone, Default)]
pub struct FileQueue {
    files: Vec<SourceFile>,
}

impl FileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file. Non-PDF files are rejected and the queue is unchanged.
    pub fn push(&mut self, file: SourceFile) -> CalcKitResult<()> {
        validate_pdf(&file)?;
        log::debug!("queued {} ({} bytes)", file.name, file.bytes.len());
        self.files.push(file);
        Ok(())
    }

    /// Add several files, keeping the accepted ones and returning the
    /// rejection for each file that was refused.
    pub fn extend(&mut self, files: impl IntoIterator<Item = SourceFile>) -> Vec<CalcKitError> {
        files
            .into_iter()
            .filter_map(|f| self.push(f).err())
            .collect()
    }

    pub fn remove(&mut self, index: usize) -> Option<SourceFile> {
        (index < self.files.len()).then(|| self.files.remove(index))
    }

    /// Swap two entries; out-of-range indices leave the queue untouched.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if a >= self.files.len() || b >= self.files.len() {
            return false;
        }
        self.files.swap(a, b);
        true
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        index > 0 && self.swap(index, index - 1)
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        index
            .checked_add(1)
            .is_some_and(|next| self.swap(index, next))
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn summary(&self) -> Vec<QueuedFile> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, f)| QueuedFile {
                position: i + 1,
                name: f.name.clone(),
                size_bytes: f.bytes.len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str) -> SourceFile {
        SourceFile::new(name, b"%PDF-1.5\n".to_vec())
    }

    #[test]
    fn test_rejects_non_pdf() {
        let mut q = FileQueue::new();
        let err = q
            .push(SourceFile::new("notes.txt", b"hello".to_vec()))
            .unwrap_err();
        assert!(matches!(err, CalcKitError::UnsupportedFile { .. }));
        assert!(q.is_empty());
    }

    #[test]
    fn test_header_without_extension_accepted() {
        let mut q = FileQueue::new();
        assert!(q.push(pdf("scan")).is_ok());
    }

    #[test]
    fn test_extend_keeps_accepted_files() {
        let mut q = FileQueue::new();
        let rejected = q.extend(vec![
            pdf("a.pdf"),
            SourceFile::new("b.png", vec![0x89, 0x50]),
            pdf("c.pdf"),
        ]);
        assert_eq!(rejected.len(), 1);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn test_reorder() {
        let mut q = FileQueue::new();
        q.extend(vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")]);
        assert!(q.move_up(2));
        assert!(!q.move_up(0));
        assert!(!q.move_down(2));
        let names: Vec<_> = q.files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "c.pdf", "b.pdf"]);
        assert_eq!(q.remove(0).map(|f| f.name), Some("a.pdf".to_string()));
        assert_eq!(q.summary()[0].position, 1);
    }

    #[test]
    fn test_stem() {
        assert_eq!(pdf("dir/Report.PDF").stem(), "Report");
        assert_eq!(pdf("C:\\docs\\a.b.pdf").stem(), "a.b");
        assert_eq!(pdf("scan").stem(), "scan");
    }
}
