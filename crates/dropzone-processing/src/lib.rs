//! Dropzone Processing Library
//!
//! The file intake pipeline: batch validation, data URI encoding, metadata
//! extraction (with embedded image tags behind the `image` feature), the
//! index-aligned list state and the orchestrator that drives them. The `host`
//! module adapts the pipeline to a host that exchanges JSON strings.

pub mod encoder;
pub mod host;
#[cfg(feature = "image")]
pub mod image;
pub mod intake;
pub mod metadata;
pub mod validator;

pub use encoder::{decode_data_uri, encode_data_uri, DataUriEncoder};
pub use host::{parse_initial_files, HostOptions, HostOutputs, HostSession};
pub use intake::{BatchOutcome, IntakeOrchestrator, ListState};
pub use metadata::MetadataExtractor;
pub use validator::{Rejection, ValidationOutcome, ValidationPolicy};
