//! Batch orchestration: scan a folder and file every certificate in it.
//!
//! Each document runs acquire → detect → filename fallback → file on a
//! blocking worker. With one worker (the default) documents are handled
//! strictly one after another; with more, at most `workers` run at once and
//! each document's log lines are flushed as a single block.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::models::{
    BatchCounters, BatchSummary, Document, DocumentInfo, FilingOutcome, NameSource,
    TranscribedText,
};
use crate::ocr::{Acquisition, ExtractionError, ExtractionMethod, TextExtractor};
use crate::progress::{DocumentLog, ProgressSink};
use crate::services::{detect_info, name_from_file_stem};
use crate::storage::{Filer, FilingError};

/// Errors that abort a single document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Filing(#[from] FilingError),
}

impl DocumentError {
    /// Whether a missing tool or language model caused the failure.
    pub fn is_dependency(&self) -> bool {
        matches!(self, DocumentError::Extraction(e) if e.is_dependency())
    }
}

/// Errors that prevent a batch from starting.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("Failed to read source directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// How one document ended.
#[derive(Debug)]
pub enum DocumentStatus {
    Filed(FilingOutcome),
    /// Acquisition produced no text; nothing was copied.
    NoText,
    Failed(DocumentError),
}

impl DocumentStatus {
    pub fn is_filed(&self) -> bool {
        matches!(self, DocumentStatus::Filed(_))
    }
}

/// Notifications for progress displays.
#[derive(Debug)]
pub enum OrganizeEvent {
    Started { total: usize },
    DocumentFinished { file_name: String, filed: bool },
    Finished(BatchSummary),
}

/// What the pipeline found in one document, without filing it.
#[derive(Debug, Clone)]
pub struct Inspection {
    pub info: DocumentInfo,
    pub method: Option<ExtractionMethod>,
    pub text: Option<TranscribedText>,
}

/// List eligible documents in `source`, non-recursively, sorted by path.
pub fn scan(source: &Path) -> Result<Vec<Document>, OrganizeError> {
    if !source.is_dir() {
        return Err(OrganizeError::SourceNotFound(source.to_path_buf()));
    }

    let entries = std::fs::read_dir(source).map_err(|e| OrganizeError::ReadDir {
        path: source.to_path_buf(),
        source: e,
    })?;

    let mut documents: Vec<Document> = entries
        .filter_map(|entry| entry.ok())
        // Follows symlinks
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| Document::from_path(entry.path()))
        .collect();
    documents.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(documents)
}

/// Runs the pipeline over a source folder.
pub struct Organizer {
    extractor: Arc<TextExtractor>,
    filer: Arc<Filer>,
    sink: Arc<dyn ProgressSink>,
    workers: usize,
    event_tx: Option<mpsc::UnboundedSender<OrganizeEvent>>,
}

impl Organizer {
    pub fn new(extractor: TextExtractor, filer: Filer, sink: Arc<dyn ProgressSink>) -> Self {
        Self {
            extractor: Arc::new(extractor),
            filer: Arc::new(filer),
            sink,
            workers: 1,
            event_tx: None,
        }
    }

    /// Maximum documents in flight. Zero is treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_events(mut self, event_tx: mpsc::UnboundedSender<OrganizeEvent>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    fn emit(&self, event: OrganizeEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }

    /// Process every eligible document in `source`.
    ///
    /// Per-document failures are logged and counted; only an unreadable
    /// source directory fails the batch.
    pub async fn run(&self, source: &Path) -> Result<BatchSummary, OrganizeError> {
        let documents = scan(source)?;
        tracing::info!(
            "Organizing {} documents from {} into {} ({} workers)",
            documents.len(),
            source.display(),
            self.filer.root().display(),
            self.workers
        );
        self.emit(OrganizeEvent::Started {
            total: documents.len(),
        });

        let counters = Arc::new(BatchCounters::new());
        let buffered = self.workers > 1;
        let mut handles = Vec::with_capacity(self.workers);

        for document in documents {
            let extractor = self.extractor.clone();
            let filer = self.filer.clone();
            let sink = self.sink.clone();
            let task_counters = counters.clone();
            let event_tx = self.event_tx.clone();

            let handle = tokio::task::spawn_blocking(move || {
                let log = if buffered {
                    DocumentLog::buffered(sink)
                } else {
                    DocumentLog::immediate(sink)
                };
                let status = process_document(&document, &extractor, &filer, &log);
                log.finish();

                // Counters move only once the document is done
                if status.is_filed() {
                    task_counters.record_processed();
                } else {
                    task_counters.record_error();
                }
                if let Some(tx) = event_tx {
                    let _ = tx.send(OrganizeEvent::DocumentFinished {
                        file_name: document.file_name(),
                        filed: status.is_filed(),
                    });
                }
            });

            handles.push(handle);

            if handles.len() >= self.workers {
                for h in handles.drain(..) {
                    if let Err(e) = h.await {
                        tracing::error!("Document worker panicked: {}", e);
                        counters.record_error();
                    }
                }
            }
        }

        for h in handles {
            if let Err(e) = h.await {
                tracing::error!("Document worker panicked: {}", e);
                counters.record_error();
            }
        }

        let summary = counters.snapshot();
        self.emit(OrganizeEvent::Finished(summary));

        tracing::info!(
            "Batch complete: {} processed, {} errors",
            summary.processed,
            summary.errors
        );
        Ok(summary)
    }
}

/// Acquire and detect one file without copying it.
pub fn inspect(
    path: &Path,
    extractor: &TextExtractor,
    log: &dyn ProgressSink,
) -> Result<Inspection, ExtractionError> {
    let document = Document::from_path(path)
        .ok_or_else(|| ExtractionError::UnsupportedFileType(path.display().to_string()))?;

    match extractor.acquire(&document, log)? {
        Acquisition::Text { text, method } => Ok(Inspection {
            info: detect_with_fallback(&document, detect_info(&text)),
            method: Some(method),
            text: Some(text),
        }),
        Acquisition::NoText => Ok(Inspection {
            info: detect_with_fallback(&document, DocumentInfo::default()),
            method: None,
            text: None,
        }),
    }
}

fn detect_with_fallback(document: &Document, info: DocumentInfo) -> DocumentInfo {
    if info.name.is_some() {
        return info;
    }
    info.with_filename_name(name_from_file_stem(&document.file_stem()))
}

/// Run the full pipeline for one document, logging every step.
pub fn process_document(
    document: &Document,
    extractor: &TextExtractor,
    filer: &Filer,
    log: &dyn ProgressSink,
) -> DocumentStatus {
    let file_name = document.file_name();
    log.line(&format!("Analyzing: {}...", file_name));

    match run_pipeline(document, extractor, filer, log) {
        Ok(Some(outcome)) => DocumentStatus::Filed(outcome),
        Ok(None) => {
            log.line(&format!(
                "  [!] Could not extract information from {}",
                file_name
            ));
            DocumentStatus::NoText
        }
        Err(e) => {
            tracing::warn!("Processing failed for {}: {}", file_name, e);
            log.line(&format!("  [X] Error processing {}: {}", file_name, e));
            if e.is_dependency() {
                log.line("      Run `certsort check` to see which tools are missing.");
            }
            DocumentStatus::Failed(e)
        }
    }
}

fn run_pipeline(
    document: &Document,
    extractor: &TextExtractor,
    filer: &Filer,
    log: &dyn ProgressSink,
) -> Result<Option<FilingOutcome>, DocumentError> {
    let text = match extractor.acquire(document, log)? {
        Acquisition::Text { text, method } => {
            tracing::debug!("{}: text acquired via {}", document.file_name(), method);
            text
        }
        Acquisition::NoText => return Ok(None),
    };

    let detected = detect_info(&text);
    let info = detect_with_fallback(document, detected);
    if info.name_source == Some(NameSource::Filename) {
        log.line(&format!(
            "  [i] Name taken from file name: {}",
            info.name_label()
        ));
    }

    let outcome = filer.file(&document.path, &info)?;
    log.line(&format!("  -> Copied to: {}/", outcome.bucket.display()));
    Ok(Some(outcome))
}
