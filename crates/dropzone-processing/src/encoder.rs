//! Transportable encoding: `data:<content-type>;base64,<payload>`

use std::io;

use base64::{engine::general_purpose, Engine as _};
use dropzone_core::{AcceptedFile, CandidateFile, IntakeError, IntakeResult, DEFAULT_CONTENT_TYPE};

const DATA_URI_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Build the data URI for a payload
pub fn encode_data_uri(content_type: &str, data: &[u8]) -> String {
    let content_type = if content_type.is_empty() {
        DEFAULT_CONTENT_TYPE
    } else {
        content_type
    };
    let payload = general_purpose::STANDARD.encode(data);
    let mut out =
        String::with_capacity(DATA_URI_PREFIX.len() + content_type.len() + BASE64_MARKER.len() + payload.len());
    out.push_str(DATA_URI_PREFIX);
    out.push_str(content_type);
    out.push_str(BASE64_MARKER);
    out.push_str(&payload);
    out
}

/// Split a data URI back into content type and bytes. `None` if it is not a base64 data URI.
pub fn decode_data_uri(encoding: &str) -> Option<(String, Vec<u8>)> {
    let rest = encoding.strip_prefix(DATA_URI_PREFIX)?;
    let (content_type, payload) = rest.split_once(BASE64_MARKER)?;
    let data = general_purpose::STANDARD.decode(payload).ok()?;
    Some((content_type.to_string(), data))
}

/// Reads a candidate's bytes and produces its accepted record.
#[derive(Debug, Clone, Default)]
pub struct DataUriEncoder;

impl DataUriEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Fails when the source bytes cannot be read or no longer match the declared size.
    pub async fn encode(&self, file: &CandidateFile) -> IntakeResult<AcceptedFile> {
        let data = file
            .read()
            .await
            .map_err(|e| IntakeError::read(&file.name, e))?;

        // Limits were checked against the declared size; a source that grew or
        // shrank since then fails the same way as an unreadable one.
        let actual = data.len() as u64;
        if actual != file.size {
            let source = io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "size changed while reading (declared {} bytes, read {})",
                    file.size, actual
                ),
            );
            return Err(IntakeError::read(&file.name, source));
        }

        let encoding = encode_data_uri(&file.content_type, &data);
        Ok(AcceptedFile {
            name: file.name.clone(),
            size: actual,
            content_type: file.content_type.clone(),
            encoding,
        })
    }
}
