//! Batch Run
//!
//! Per-document state machine:
//! `discovered -> loaded -> normalized -> validated -> {published | skipped-invalid | failed}`.
//!
//! Isolation guarantee: a failure or skip for one document never aborts
//! processing of subsequent documents. Every discovered document yields
//! exactly one outcome, so the report always covers the whole corpus.
//!
//! Documents are dispatched across a bounded worker pool. Parsing,
//! normalization, and validation are pure; the only suspension points are
//! storage reads and the publish call. Outcomes carry their discovery
//! index so the report comes out in discovery order regardless of
//! completion order.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::category::CategoryMap;
use crate::corpus::loader::{load_corpus, LoadedItem};
use crate::normalize::normalize;
use crate::types::{BatchReport, PublishOutcome, RegistryClient};
use crate::validate::{validate, ValidationLimits};

/// Detail string recorded for documents the cancellation flag stopped
/// before they started.
const CANCELLED_DETAIL: &str = "run cancelled before this document started";

/// Knobs for one batch run.
#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// Maximum documents in flight at once.
    pub concurrency: usize,
    /// Per-document publish call timeout.
    pub publish_timeout: Duration,
    pub limits: ValidationLimits,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            publish_timeout: Duration::from_secs(30),
            limits: ValidationLimits::default(),
        }
    }
}

/// Per-document audit trail: what the normalizer rewrote and what the
/// validator rejected, human-readable, so a `skipped-invalid` entry can
/// be resolved without reading pipeline internals.
#[derive(Clone, Debug)]
pub struct DocumentAudit {
    pub identifier: String,
    pub notes: Vec<String>,
    pub violations: Vec<String>,
}

/// A completed batch run: the report plus per-document audits, both in
/// discovery order.
#[derive(Debug)]
pub struct BatchRunOutput {
    pub report: BatchReport,
    pub audits: Vec<DocumentAudit>,
}

/// Run the full pipeline over every skill document under `root`.
///
/// `cancel` supports cooperative cancellation: once set, documents not
/// yet started are recorded as `skipped-invalid` with a cancellation
/// detail, while in-flight publish calls run to completion or hit the
/// per-call timeout. Either way the report covers every discovered
/// document.
pub async fn run_batch(
    root: &Path,
    registry: Arc<dyn RegistryClient>,
    categories: Arc<CategoryMap>,
    options: BatchOptions,
    cancel: Arc<AtomicBool>,
) -> Result<BatchRunOutput> {
    let started_at = Utc::now().to_rfc3339();

    let items = load_corpus(root)?;
    info!("Discovered {} skill document(s) under {}", items.len(), root.display());

    let identifiers: Vec<String> = items.iter().map(|i| i.identifier.clone()).collect();
    let semaphore = Arc::new(Semaphore::new(options.concurrency.max(1)));

    let mut handles: Vec<JoinHandle<(usize, PublishOutcome, DocumentAudit)>> = Vec::new();

    for (idx, item) in items.into_iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let registry = Arc::clone(&registry);
        let categories = Arc::clone(&categories);
        let cancel = Arc::clone(&cancel);
        let options = options.clone();

        handles.push(tokio::spawn(async move {
            // acquire only fails once the semaphore is closed, which
            // never happens for the lifetime of the run.
            let _permit = semaphore.acquire().await.expect("semaphore closed");

            if cancel.load(Ordering::SeqCst) {
                let outcome = PublishOutcome::skipped(&item.identifier, CANCELLED_DETAIL);
                let audit = DocumentAudit {
                    identifier: item.identifier.clone(),
                    notes: Vec::new(),
                    violations: Vec::new(),
                };
                return (idx, outcome, audit);
            }

            let (outcome, audit) = process_item(item, &*registry, &categories, &options).await;
            (idx, outcome, audit)
        }));
    }

    // Assemble in discovery order regardless of completion order. The
    // report accumulator is only touched here, one write per document.
    let mut slots: Vec<Option<(PublishOutcome, DocumentAudit)>> =
        identifiers.iter().map(|_| None).collect();

    for (handle_idx, handle) in handles.into_iter().enumerate() {
        match handle.await {
            Ok((idx, outcome, audit)) => slots[idx] = Some((outcome, audit)),
            Err(e) => {
                // A panicked worker still gets an outcome; coverage of the
                // report is the one invariant that must never break.
                let identifier = identifiers[handle_idx].clone();
                warn!("Worker for '{}' did not finish: {}", identifier, e);
                let outcome =
                    PublishOutcome::failed(&identifier, format!("worker failed: {}", e));
                let audit = DocumentAudit {
                    identifier,
                    notes: Vec::new(),
                    violations: Vec::new(),
                };
                slots[handle_idx] = Some((outcome, audit));
            }
        }
    }

    let mut outcomes = Vec::with_capacity(slots.len());
    let mut audits = Vec::with_capacity(slots.len());
    for slot in slots {
        // Every spawned handle was awaited above, so every slot is filled.
        if let Some((outcome, audit)) = slot {
            outcomes.push(outcome);
            audits.push(audit);
        }
    }

    let report = BatchReport {
        started_at,
        finished_at: Utc::now().to_rfc3339(),
        outcomes,
    };

    Ok(BatchRunOutput { report, audits })
}

/// Take one loaded item through normalize -> validate -> publish.
async fn process_item(
    item: LoadedItem,
    registry: &dyn RegistryClient,
    categories: &CategoryMap,
    options: &BatchOptions,
) -> (PublishOutcome, DocumentAudit) {
    let identifier = item.identifier.clone();

    let document = match item.result {
        Ok(doc) => doc,
        Err(e) => {
            let outcome = PublishOutcome::failed(&identifier, format!("load error: {}", e));
            let audit = DocumentAudit {
                identifier,
                notes: Vec::new(),
                violations: Vec::new(),
            };
            return (outcome, audit);
        }
    };

    let normalized = normalize(document);
    let validation = validate(&normalized.document, categories, &options.limits);

    let audit = DocumentAudit {
        identifier: identifier.clone(),
        notes: normalized.notes,
        violations: validation.violations.clone(),
    };

    if !validation.is_publishable() {
        let outcome = PublishOutcome::skipped(
            &identifier,
            format!("validation failed: {}", validation.violations.join(", ")),
        );
        return (outcome, audit);
    }

    let doc = normalized.document;
    let body = doc.body.join("\n");

    let publish_call = registry.publish(&doc.identifier, &doc.metadata, &body);
    let outcome = match tokio::time::timeout(options.publish_timeout, publish_call).await {
        Ok(Ok(())) => PublishOutcome::published(&identifier),
        Ok(Err(e)) => PublishOutcome::failed(&identifier, format!("{:#}", e)),
        Err(_) => PublishOutcome::failed(
            &identifier,
            format!(
                "publish timed out after {}s",
                options.publish_timeout.as_secs()
            ),
        ),
    };

    (outcome, audit)
}
