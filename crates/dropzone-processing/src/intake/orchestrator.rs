//! Intake orchestrator: validate → encode + extract (concurrently) → merge → report.
//!
//! Every mutation of the list (batch, remove, clear, config change) goes through
//! one FIFO async mutex, so a remove issued while a batch is in flight waits for
//! that batch to merge. Subscribers receive one whole snapshot per transition
//! and never see one list updated without the other.

use std::sync::{Arc, Mutex as SyncMutex, PoisonError};

use chrono::Utc;
use dropzone_core::{
    AcceptedFile, CandidateFile, FileMetadata, IntakeConfig, IntakeError, IntakeResult,
};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinSet;
use tracing::Instrument;
use uuid::Uuid;

use super::state::ListState;
use crate::encoder::DataUriEncoder;
use crate::metadata::MetadataExtractor;
use crate::validator::ValidationPolicy;

/// Summary of one processed batch
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOutcome {
    pub batch_id: Uuid,
    pub accepted: usize,
    pub rejected: usize,
    /// Combined policy message for this batch, if any file was rejected
    pub error: Option<String>,
}

struct Inner {
    state: ListState,
    config: IntakeConfig,
    policy: ValidationPolicy,
}

enum TaskOutput {
    Encoded(IntakeResult<AcceptedFile>),
    Extracted(FileMetadata),
}

pub struct IntakeOrchestrator {
    inner: Mutex<Inner>,
    latest: watch::Sender<Arc<ListState>>,
    subscribers: SyncMutex<Vec<mpsc::UnboundedSender<Arc<ListState>>>>,
    encoder: DataUriEncoder,
    extractor: MetadataExtractor,
}

impl IntakeOrchestrator {
    pub fn new(config: IntakeConfig) -> Self {
        Self::from_state(config, ListState::new())
    }

    /// Seed the list with files restored from the host. Their original handles
    /// are gone, so each gets placeholder metadata to keep the lists aligned.
    pub fn with_initial_files(config: IntakeConfig, files: Vec<AcceptedFile>) -> Self {
        let now = Utc::now();
        let metadata = files
            .iter()
            .map(|f| FileMetadata::placeholder(f, now))
            .collect();
        let state = ListState::with_files(files, metadata).unwrap_or_default();
        Self::from_state(config, state)
    }

    fn from_state(config: IntakeConfig, state: ListState) -> Self {
        let (latest, _) = watch::channel(Arc::new(state.clone()));
        Self {
            inner: Mutex::new(Inner {
                policy: ValidationPolicy::new(&config),
                config,
                state,
            }),
            latest,
            subscribers: SyncMutex::new(Vec::new()),
            encoder: DataUriEncoder::new(),
            extractor: MetadataExtractor::new(),
        }
    }

    /// Receive a snapshot after every list transition, in order. The stream
    /// ends when the orchestrator is dropped.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Arc<ListState>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Latest published state
    pub fn snapshot(&self) -> Arc<ListState> {
        self.latest.borrow().clone()
    }

    pub async fn config(&self) -> IntakeConfig {
        self.inner.lock().await.config.clone()
    }

    /// Process one batch of candidate files.
    ///
    /// Accepted files are appended only after every file of the batch has been
    /// encoded and inspected. If any source cannot be read the whole batch is
    /// dropped and the list is left as it was.
    pub async fn add_files(&self, files: Vec<CandidateFile>) -> IntakeResult<BatchOutcome> {
        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("intake_batch", batch_id = %batch_id, files = files.len());
        self.run_batch(batch_id, files).instrument(span).await
    }

    async fn run_batch(
        &self,
        batch_id: Uuid,
        files: Vec<CandidateFile>,
    ) -> IntakeResult<BatchOutcome> {
        let mut inner = self.inner.lock().await;

        // A new attempt always hides the previous batch's message.
        if inner.state.error().is_some() {
            inner.state.clear_error();
            self.publish(&inner.state);
        }

        let outcome = inner.policy.validate(files, inner.state.len());
        let error = outcome.error_message();
        let rejected = outcome.rejections.len();

        if outcome.valid.is_empty() {
            tracing::debug!(rejected, "No files accepted");
            if error.is_some() {
                inner.state.set_error(error.clone());
                self.publish(&inner.state);
            }
            return Ok(BatchOutcome {
                batch_id,
                accepted: 0,
                rejected,
                error,
            });
        }

        let (new_files, new_metadata) = match self.process(outcome.valid).await {
            Ok(processed) => processed,
            Err(err) => {
                err.log();
                if error.is_some() {
                    inner.state.set_error(error);
                    self.publish(&inner.state);
                }
                return Err(err);
            }
        };

        let accepted = new_files.len();
        inner.state.append_batch(new_files, new_metadata)?;
        self.publish(&inner.state);

        if error.is_some() {
            inner.state.set_error(error.clone());
            self.publish(&inner.state);
        }

        tracing::info!(accepted, rejected, total = inner.state.len(), "Batch merged");

        Ok(BatchOutcome {
            batch_id,
            accepted,
            rejected,
            error,
        })
    }

    /// Run one encode task and one extract task per file, all concurrently, and
    /// reassemble the results by original index.
    async fn process(
        &self,
        files: Vec<CandidateFile>,
    ) -> IntakeResult<(Vec<AcceptedFile>, Vec<FileMetadata>)> {
        let count = files.len();
        let mut tasks = JoinSet::new();

        for (index, file) in files.into_iter().enumerate() {
            let file = Arc::new(file);

            let encoder = self.encoder.clone();
            let source = Arc::clone(&file);
            tasks.spawn(
                async move { (index, TaskOutput::Encoded(encoder.encode(&source).await)) }
                    .in_current_span(),
            );

            let extractor = self.extractor.clone();
            tasks.spawn(
                async move { (index, TaskOutput::Extracted(extractor.extract(&file).await)) }
                    .in_current_span(),
            );
        }

        let mut encoded: Vec<Option<AcceptedFile>> = vec![None; count];
        let mut extracted: Vec<Option<FileMetadata>> = vec![None; count];

        while let Some(joined) = tasks.join_next().await {
            let (index, output) = joined.map_err(|e| IntakeError::Task(e.to_string()))?;
            match output {
                TaskOutput::Encoded(result) => encoded[index] = Some(result?),
                TaskOutput::Extracted(metadata) => extracted[index] = Some(metadata),
            }
            tracing::trace!(index, "File task finished");
        }

        let files: Option<Vec<_>> = encoded.into_iter().collect();
        let metadata: Option<Vec<_>> = extracted.into_iter().collect();
        match (files, metadata) {
            (Some(files), Some(metadata)) => Ok((files, metadata)),
            _ => Err(IntakeError::Task(
                "a file task finished without a result".to_string(),
            )),
        }
    }

    /// Remove the file (and its metadata) at `index`. Clears the current error.
    pub async fn remove_file(&self, index: usize) -> IntakeResult<AcceptedFile> {
        let mut inner = self.inner.lock().await;
        let (file, _) = inner.state.remove(index).inspect_err(|e| e.log())?;
        inner.state.clear_error();
        self.publish(&inner.state);

        tracing::info!(index, file_name = %file.name, remaining = inner.state.len(), "File removed");
        Ok(file)
    }

    /// Empty both lists and the error.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        Self::clear_locked(&mut inner);
        self.publish(&inner.state);
    }

    /// Install new limits. A change of `clear_signal` (to any other value)
    /// triggers a bulk clear; returns whether it did.
    pub async fn apply_config(&self, config: IntakeConfig) -> IntakeResult<bool> {
        config.validate()?;

        let mut inner = self.inner.lock().await;
        let cleared = config.clear_signal != inner.config.clear_signal;
        if cleared {
            tracing::info!(
                previous = inner.config.clear_signal,
                current = config.clear_signal,
                "Clear signal changed"
            );
            Self::clear_locked(&mut inner);
        }

        inner.policy = ValidationPolicy::new(&config);
        inner.config = config;

        if cleared {
            self.publish(&inner.state);
        }
        Ok(cleared)
    }

    fn clear_locked(inner: &mut Inner) {
        let removed = inner.state.len();
        inner.state.clear();
        tracing::info!(removed, "File list cleared");
    }

    fn publish(&self, state: &ListState) {
        let snapshot = Arc::new(state.clone());
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|tx| tx.send(Arc::clone(&snapshot)).is_ok());
        self.latest.send_replace(snapshot);
    }
}
