//! Host boundary adapter
//!
//! Hosts hand over options and initial state as JSON and read back the file
//! list (and optionally the metadata list) as JSON strings after every change.

use std::sync::Arc;

use dropzone_core::config::{DEFAULT_MAX_FILE_COUNT, DEFAULT_MAX_FILE_SIZE_MB};
use dropzone_core::{parse_allowed_extensions, AcceptedFile, IntakeConfig, IntakeResult};
use serde::Deserialize;
use tokio::task::JoinHandle;

use crate::intake::{IntakeOrchestrator, ListState};

/// Placeholder hosts send for a string option nobody filled in.
const UNSET_PLACEHOLDER: &str = "val";

/// Options record as sent by the host. Unknown (presentation) keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostOptions {
    #[serde(rename = "maxFileSizeMB")]
    pub max_file_size_mb: Option<f64>,
    pub max_file_count: Option<f64>,
    pub allowed_extensions: Option<String>,
    pub clear_signal: Option<f64>,
}

impl HostOptions {
    pub fn from_json(raw: &str) -> IntakeResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Zero or missing numbers fall back to defaults; empty or placeholder
    /// strings mean "no restriction".
    pub fn to_config(&self) -> IntakeConfig {
        let max_file_size_mb = self
            .max_file_size_mb
            .filter(|mb| mb.is_finite() && *mb > 0.0)
            .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);

        let max_file_count = self
            .max_file_count
            .filter(|count| count.is_finite() && *count >= 1.0)
            .map(|count| count as usize)
            .unwrap_or(DEFAULT_MAX_FILE_COUNT);

        let allowed_extensions = self
            .allowed_extensions
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty() && *raw != UNSET_PLACEHOLDER)
            .map(parse_allowed_extensions)
            .unwrap_or_default();

        let clear_signal = self
            .clear_signal
            .filter(|signal| signal.is_finite())
            .map(|signal| signal as i64)
            .unwrap_or(0);

        IntakeConfig {
            max_file_size_mb,
            max_file_count,
            allowed_extensions,
            clear_signal,
        }
    }
}

/// Parse the host's initial file list. Anything malformed yields an empty list.
pub fn parse_initial_files(raw: Option<&str>) -> Vec<AcceptedFile> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str::<Vec<AcceptedFile>>(raw) {
        Ok(files) => files,
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring malformed initial file list");
            Vec::new()
        }
    }
}

/// Serialized view of the list state handed back to the host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostOutputs {
    pub files_json: String,
    /// Present only when the host registered a metadata consumer
    pub metadata_json: Option<String>,
    pub error: Option<String>,
}

impl HostOutputs {
    pub fn from_state(state: &ListState, include_metadata: bool) -> IntakeResult<Self> {
        let files_json = serde_json::to_string(state.files())?;
        let metadata_json = if include_metadata {
            Some(serde_json::to_string(state.metadata())?)
        } else {
            None
        };

        Ok(Self {
            files_json,
            metadata_json,
            error: state.error().map(str::to_string),
        })
    }
}

/// One host-facing intake instance: init, view updates, outputs.
pub struct HostSession {
    orchestrator: Arc<IntakeOrchestrator>,
    include_metadata: bool,
}

impl HostSession {
    pub fn init(
        options: &HostOptions,
        initial_files: Option<&str>,
        include_metadata: bool,
    ) -> IntakeResult<Self> {
        Self::with_config(options.to_config(), initial_files, include_metadata)
    }

    /// Start a session from limits resolved elsewhere (environment, CLI flags).
    pub fn with_config(
        config: IntakeConfig,
        initial_files: Option<&str>,
        include_metadata: bool,
    ) -> IntakeResult<Self> {
        config.validate()?;

        let files = parse_initial_files(initial_files);
        tracing::debug!(initial_files = files.len(), "Host session started");

        Ok(Self {
            orchestrator: Arc::new(IntakeOrchestrator::with_initial_files(config, files)),
            include_metadata,
        })
    }

    pub fn orchestrator(&self) -> &Arc<IntakeOrchestrator> {
        &self.orchestrator
    }

    /// Apply a fresh options record; returns whether it triggered a bulk clear.
    pub async fn update_view(&self, options: &HostOptions) -> IntakeResult<bool> {
        self.orchestrator.apply_config(options.to_config()).await
    }

    pub fn outputs(&self) -> IntakeResult<HostOutputs> {
        HostOutputs::from_state(&self.orchestrator.snapshot(), self.include_metadata)
    }

    /// Call `notify` with fresh outputs once per list transition, in order.
    /// The task ends once the orchestrator is dropped.
    pub fn spawn_notifier<F>(&self, mut notify: F) -> JoinHandle<()>
    where
        F: FnMut(HostOutputs) + Send + 'static,
    {
        let mut rx = self.orchestrator.subscribe();
        let include_metadata = self.include_metadata;

        tokio::spawn(async move {
            while let Some(state) = rx.recv().await {
                match HostOutputs::from_state(&state, include_metadata) {
                    Ok(outputs) => notify(outputs),
                    Err(err) => err.log(),
                }
            }
        })
    }
}
