//! List state: accepted files, their index-aligned metadata, and the current error.

use dropzone_core::{AcceptedFile, FileMetadata, IntakeError, IntakeResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListState {
    files: Vec<AcceptedFile>,
    metadata: Vec<FileMetadata>,
    error: Option<String>,
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from already-paired lists.
    pub fn with_files(files: Vec<AcceptedFile>, metadata: Vec<FileMetadata>) -> IntakeResult<Self> {
        check_aligned(&files, &metadata)?;
        Ok(Self {
            files,
            metadata,
            error: None,
        })
    }

    pub fn files(&self) -> &[AcceptedFile] {
        &self.files
    }

    pub fn metadata(&self) -> &[FileMetadata] {
        &self.metadata
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Append one finished batch. Both lists grow together or not at all.
    pub fn append_batch(
        &mut self,
        files: Vec<AcceptedFile>,
        metadata: Vec<FileMetadata>,
    ) -> IntakeResult<()> {
        check_aligned(&files, &metadata)?;
        self.files.extend(files);
        self.metadata.extend(metadata);
        Ok(())
    }

    /// Remove the pair at `index`; later entries shift down by one.
    pub fn remove(&mut self, index: usize) -> IntakeResult<(AcceptedFile, FileMetadata)> {
        if index >= self.files.len() {
            return Err(IntakeError::IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }
        let file = self.files.remove(index);
        let metadata = self.metadata.remove(index);
        Ok((file, metadata))
    }

    /// Empty both lists and drop the error.
    pub fn clear(&mut self) {
        self.files.clear();
        self.metadata.clear();
        self.error = None;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}

fn check_aligned(files: &[AcceptedFile], metadata: &[FileMetadata]) -> IntakeResult<()> {
    if files.len() != metadata.len() {
        return Err(IntakeError::MisalignedLists {
            files: files.len(),
            metadata: metadata.len(),
        });
    }
    Ok(())
}
