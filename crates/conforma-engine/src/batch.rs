//! # Batch Orchestrator
//!
//! Drives the single-resource validator over many resources. Two entry
//! points with an identical contract over different sources:
//!
//! - [`BatchValidator::validate_directory`] — recursively enumerates
//!   files, retries transient reads with exponential backoff, bounds each
//!   read-and-validate step with an overall timeout, and processes files
//!   in chunks (sequential between chunks, concurrent within one) so peak
//!   parallelism stays bounded without a fixed worker pool.
//! - [`BatchValidator::validate_resources`] — processes an in-memory
//!   collection under a semaphore sized to the configured concurrency; no
//!   chunking since there is no I/O retry concern.
//!
//! ## Shared guarantees
//!
//! - **Failure isolation**: any error reading, parsing, or validating one
//!   item becomes that item's own failed result, never a batch abort.
//! - **Progress**: an atomic counter shared by all workers; snapshots are
//!   emitted best-effort after each item.
//! - **Cancellation**: checked before scheduling each item and raced
//!   against in-flight work; the caller receives `BatchError::Cancelled`,
//!   never a truncated "successful" report.
//! - **Fan-in**: workers *return* their results and a single join step
//!   assembles the report; there is no shared mutable result list.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use conforma_core::issue::codes;
use conforma_core::{
    BatchError, BatchValidationProgress, BatchValidationReport, ValidationConfiguration,
    ValidationResult,
};

use crate::aggregate::aggregate;
use crate::cancel::CancelToken;
use crate::parser::ParsedResource;
use crate::progress::{NoopObserver, ProgressObserver};
use crate::retry::RetryPolicy;
use crate::validator::ResourceValidator;

/// Stage label carried by every progress snapshot this orchestrator emits.
const STAGE_VALIDATING: &str = "validating";

/// Upper bound on one file's read-and-validate step, so an unresponsive
/// filesystem cannot stall the batch indefinitely.
const DEFAULT_FILE_TIMEOUT: Duration = Duration::from_secs(30);

/// Orchestrates batch validation runs.
pub struct BatchValidator {
    validator: ResourceValidator,
    config: ValidationConfiguration,
    retry: RetryPolicy,
    file_timeout: Duration,
    observer: Arc<dyn ProgressObserver>,
    batch_name: String,
}

impl BatchValidator {
    /// Create an orchestrator with default retry policy, file timeout, and
    /// a no-op progress observer.
    pub fn new(validator: ResourceValidator, config: ValidationConfiguration) -> Self {
        Self {
            validator,
            config,
            retry: RetryPolicy::default(),
            file_timeout: DEFAULT_FILE_TIMEOUT,
            observer: Arc::new(NoopObserver),
            batch_name: "batch".to_string(),
        }
    }

    /// Install a progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Override the file-read retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the per-file timeout.
    pub fn with_file_timeout(mut self, timeout: Duration) -> Self {
        self.file_timeout = timeout;
        self
    }

    /// Name the batch; appears in reports.
    pub fn with_batch_name(mut self, name: impl Into<String>) -> Self {
        self.batch_name = name.into();
        self
    }

    /// Validate every matching file under `root`, recursively.
    ///
    /// `pattern` filters file names and supports `*` wildcards
    /// (e.g. `"*"`, `"patient-*.json"`).
    ///
    /// # Errors
    ///
    /// - [`BatchError::Precondition`] when `root` is not an existing
    ///   directory (raised before any processing).
    /// - [`BatchError::Cancelled`] when the token is raised mid-batch.
    ///
    /// Per-file failures are *not* errors: they appear in the report as
    /// failed results tagged `FILE_PROCESSING_ERROR`.
    pub async fn validate_directory(
        &self,
        root: &Path,
        pattern: &str,
        cancel: &CancelToken,
    ) -> Result<BatchValidationReport, BatchError> {
        if !root.is_dir() {
            return Err(BatchError::Precondition {
                reason: format!("directory does not exist: {}", root.display()),
            });
        }

        let files = self.enumerate(root, pattern)?;
        let total = files.len();
        let chunk_size = chunk_size_for(total);
        tracing::info!(
            batch = %self.batch_name,
            root = %root.display(),
            total,
            chunk_size,
            "starting directory batch"
        );

        let started = Instant::now();
        let mut report = BatchValidationReport::new(&self.batch_name, self.config.clone());
        let counter = Arc::new(AtomicUsize::new(0));
        let profiles = Arc::new(self.config.profiles.clone());

        for chunk in files.chunks(chunk_size) {
            if cancel.is_cancelled() {
                return Err(BatchError::Cancelled);
            }

            let mut tasks: JoinSet<Option<ValidationResult>> = JoinSet::new();
            for path in chunk {
                if cancel.is_cancelled() {
                    break;
                }
                let path = path.clone();
                let validator = self.validator.clone();
                let retry = self.retry;
                let timeout = self.file_timeout;
                let profiles = profiles.clone();
                let cancel = cancel.clone();
                let counter = counter.clone();
                let observer = self.observer.clone();

                tasks.spawn(async move {
                    tokio::select! {
                        _ = cancel.cancelled() => None,
                        result = process_file(&validator, &retry, timeout, &path, &profiles) => {
                            emit_progress(&observer, &counter, total, &result.resource_name);
                            Some(result)
                        }
                    }
                });
            }

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(Some(result)) => report.push_result(result),
                    Ok(None) => {} // cancelled before this item ran
                    Err(e) => {
                        // A panicking worker is a bug, not a document
                        // problem; record it against the batch loudly.
                        tracing::error!("validation worker panicked: {e}");
                    }
                }
            }

            if cancel.is_cancelled() {
                return Err(BatchError::Cancelled);
            }
        }

        let wall_clock = started.elapsed();
        let (summary, metrics) = aggregate(&report.results, &self.config, wall_clock);
        tracing::info!(
            batch = %self.batch_name,
            total = summary.total_resources,
            passed = summary.passed_resources,
            failed = summary.failed_resources,
            success = summary.overall_success,
            "directory batch complete"
        );
        report.finalize(wall_clock, summary, metrics);
        Ok(report)
    }

    /// Validate an already-materialized collection of documents under a
    /// concurrency bound of `config.max_concurrency`.
    ///
    /// # Errors
    ///
    /// [`BatchError::Cancelled`] when the token is raised mid-batch.
    pub async fn validate_resources(
        &self,
        resources: Vec<ParsedResource>,
        cancel: &CancelToken,
    ) -> Result<BatchValidationReport, BatchError> {
        let total = resources.len();
        tracing::info!(
            batch = %self.batch_name,
            total,
            concurrency = self.config.max_concurrency,
            "starting in-memory batch"
        );

        let started = Instant::now();
        let mut report = BatchValidationReport::new(&self.batch_name, self.config.clone());
        let counter = Arc::new(AtomicUsize::new(0));
        let profiles = Arc::new(self.config.profiles.clone());
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency.max(1)));

        let mut tasks: JoinSet<Option<ValidationResult>> = JoinSet::new();
        for resource in resources {
            if cancel.is_cancelled() {
                break;
            }
            let validator = self.validator.clone();
            let profiles = profiles.clone();
            let cancel = cancel.clone();
            let counter = counter.clone();
            let observer = self.observer.clone();
            let semaphore = semaphore.clone();

            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return None;
                };
                if cancel.is_cancelled() {
                    return None;
                }
                let result = validator.validate(&resource, &profiles);
                emit_progress(&observer, &counter, total, &result.resource_name);
                Some(result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(result)) => report.push_result(result),
                Ok(None) => {}
                Err(e) => tracing::error!("validation worker panicked: {e}"),
            }
        }

        if cancel.is_cancelled() {
            return Err(BatchError::Cancelled);
        }

        let wall_clock = started.elapsed();
        let (summary, metrics) = aggregate(&report.results, &self.config, wall_clock);
        report.finalize(wall_clock, summary, metrics);
        Ok(report)
    }

    /// Recursively collect matching files, sorted for deterministic
    /// scheduling order.
    fn enumerate(&self, root: &Path, pattern: &str) -> Result<Vec<PathBuf>, BatchError> {
        let mut files = Vec::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in std::fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if self.validator.parser().recognizes(&path) {
                    let name = path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or_default();
                    if wildcard_match(pattern, name) {
                        files.push(path);
                    }
                }
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Read one file (with retry and timeout) and validate it. Infallible by
/// contract: every failure mode collapses into a failed result.
async fn process_file(
    validator: &ResourceValidator,
    retry: &RetryPolicy,
    timeout: Duration,
    path: &Path,
    profiles: &[String],
) -> ValidationResult {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();
    let stem = path
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string();
    let started = Instant::now();

    let step = async {
        let text = retry
            .run(&file_name, || tokio::fs::read_to_string(path))
            .await?;
        Ok::<ValidationResult, std::io::Error>(validator.validate_text(
            &file_name,
            &text,
            profiles,
        ))
    };

    match tokio::time::timeout(timeout, step).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => ValidationResult::fatal(
            stem,
            codes::FILE_PROCESSING_ERROR,
            format!("cannot read {}: {e}", path.display()),
            profiles.to_vec(),
            started.elapsed(),
        ),
        Err(_) => ValidationResult::fatal(
            stem,
            codes::FILE_PROCESSING_ERROR,
            format!(
                "processing {} timed out after {}s",
                path.display(),
                timeout.as_secs()
            ),
            profiles.to_vec(),
            started.elapsed(),
        ),
    }
}

/// Bump the shared counter and emit one snapshot. Best-effort: observers
/// must not block, and no ordering across items is implied.
fn emit_progress(
    observer: &Arc<dyn ProgressObserver>,
    counter: &AtomicUsize,
    total: usize,
    current: &str,
) {
    let completed = counter.fetch_add(1, Ordering::SeqCst) + 1;
    observer.on_progress(&BatchValidationProgress {
        completed,
        total,
        current: current.to_string(),
        stage: STAGE_VALIDATING.to_string(),
    });
}

/// Chunk size for directory mode: `min(10, max(1, total / 4))`.
fn chunk_size_for(total: usize) -> usize {
    (total / 4).clamp(1, 10)
}

/// Minimal `*` wildcard matcher for file-name patterns. Case-sensitive;
/// `*` matches any run of characters including none.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0usize, 0usize);
    let (mut star, mut mark) = (None::<usize>, 0usize);

    while ti < t.len() {
        if pi < p.len() && (p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = ti;
            pi += 1;
        } else if let Some(s) = star {
            // Backtrack: let the last * swallow one more character.
            pi = s + 1;
            mark += 1;
            ti = mark;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}
