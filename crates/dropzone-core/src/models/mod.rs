pub mod file;
pub mod metadata;

pub use file::{
    content_type_for_extension, file_extension, AcceptedFile, CandidateFile, FileKind,
    FileSource, MemorySource, PathSource, DEFAULT_CONTENT_TYPE,
};
pub use metadata::{FileMetadata, GpsCoordinates, ImageMetadata};
