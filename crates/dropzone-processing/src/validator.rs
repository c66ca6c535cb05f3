//! Validation policy: count, type and size rules applied to one batch.

use dropzone_core::{CandidateFile, IntakeConfig};

/// Why a single file was kept out of a batch. `Display` is the user-facing sentence.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("Maximum {max} {} allowed. {added} {} will be added.", file_noun(.max), file_noun(.added))]
    CountExceeded { max: usize, added: usize },

    #[error("File type \"{}\" is not allowed. Allowed types: {}", upper(.extension), display_extensions(.allowed))]
    TypeNotAllowed {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("File \"{name}\" exceeds the maximum size of {max_mb} MB and was not added.")]
    TooLarge { name: String, max_mb: f64 },
}

fn file_noun(count: &usize) -> &'static str {
    if *count == 1 {
        "file"
    } else {
        "files"
    }
}

fn upper(extension: &str) -> String {
    extension.to_uppercase()
}

fn display_extensions(extensions: &[String]) -> String {
    extensions
        .iter()
        .map(|e| e.to_uppercase())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of validating one batch
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    /// Accepted files, in original batch order
    pub valid: Vec<CandidateFile>,
    /// Every rejection, one per rejected file
    pub rejections: Vec<(String, Rejection)>,
    /// Distinct user-facing messages, in first-seen order
    messages: Vec<String>,
}

impl ValidationOutcome {
    /// All distinct messages joined by a single space; `None` when nothing was rejected.
    pub fn error_message(&self) -> Option<String> {
        if self.messages.is_empty() {
            None
        } else {
            Some(self.messages.join(" "))
        }
    }

    fn reject(&mut self, file: &CandidateFile, rejection: Rejection) {
        let message = rejection.to_string();
        if !self.messages.contains(&message) {
            self.messages.push(message);
        }
        self.rejections.push((file.name.clone(), rejection));
    }
}

/// Size, count and type rules for incoming files.
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    max_file_size_mb: f64,
    max_file_size_bytes: u64,
    max_file_count: usize,
    allowed_extensions: Vec<String>,
}

impl ValidationPolicy {
    pub fn new(config: &IntakeConfig) -> Self {
        Self {
            max_file_size_mb: config.max_file_size_mb,
            max_file_size_bytes: config.max_file_size_bytes(),
            max_file_count: config.max_file_count,
            allowed_extensions: config.allowed_extensions.clone(),
        }
    }

    pub fn max_file_count(&self) -> usize {
        self.max_file_count
    }

    /// Partition a batch given how many files are already accepted.
    ///
    /// Per file, the first failing rule wins: remaining slots, then type, then size.
    /// The count message is emitted once per batch; identical type and size
    /// messages are collapsed.
    pub fn validate(&self, files: Vec<CandidateFile>, current_count: usize) -> ValidationOutcome {
        let remaining_slots = self.max_file_count.saturating_sub(current_count);
        let mut outcome = ValidationOutcome::default();
        let mut reached_max_count = false;

        for file in files {
            if outcome.valid.len() >= remaining_slots {
                let rejection = Rejection::CountExceeded {
                    max: self.max_file_count,
                    added: outcome.valid.len(),
                };
                if reached_max_count {
                    outcome.rejections.push((file.name.clone(), rejection));
                } else {
                    reached_max_count = true;
                    outcome.reject(&file, rejection);
                }
                continue;
            }

            if let Some(rejection) = self.check_type(&file) {
                outcome.reject(&file, rejection);
                continue;
            }

            if file.size > self.max_file_size_bytes {
                let rejection = Rejection::TooLarge {
                    name: file.name.clone(),
                    max_mb: self.max_file_size_mb,
                };
                outcome.reject(&file, rejection);
                continue;
            }

            outcome.valid.push(file);
        }

        for (name, rejection) in &outcome.rejections {
            tracing::debug!(file_name = %name, reason = %rejection, "File rejected by intake policy");
        }

        outcome
    }

    fn check_type(&self, file: &CandidateFile) -> Option<Rejection> {
        if self.allowed_extensions.is_empty() {
            return None;
        }

        let extension = file.extension();
        if self.allowed_extensions.contains(&extension) {
            None
        } else {
            Some(Rejection::TypeNotAllowed {
                extension,
                allowed: self.allowed_extensions.clone(),
            })
        }
    }

    /// e.g. `Maximum file size: 10 MB`
    pub fn max_size_label(&self) -> String {
        format!("Maximum file size: {} MB", self.max_file_size_mb)
    }

    /// e.g. `Allowed file types: PDF, DOCX`; empty when unrestricted
    pub fn allowed_types_label(&self) -> String {
        if self.allowed_extensions.is_empty() {
            return String::new();
        }
        let label = if self.allowed_extensions.len() == 1 {
            "Allowed file type"
        } else {
            "Allowed file types"
        };
        format!("{}: {}", label, display_extensions(&self.allowed_extensions))
    }
}
