//! Batch resolution: every record in, one result per record out, same order.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, warn, Instrument};

use crate::app::ports::{RateLimiterPort, RunLogPort};
use crate::common::types::{CleanRecord, CompoundRecord, Resolution, ResolutionResult, RunSummary};
use crate::observability::metrics;
use crate::pipeline::quality_gate::filter_clean;
use crate::pipeline::resolver::Resolver;

/// Everything one batch run produces.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// One entry per input record, in input order
    pub results: Vec<ResolutionResult>,
    pub clean: Vec<CleanRecord>,
    pub summary: RunSummary,
}

/// Running counts, folded over results as they are assembled.
#[derive(Debug, Default)]
struct Tally {
    succeeded: usize,
    failed: usize,
    failed_names: Vec<String>,
}

impl Tally {
    fn record(&mut self, result: &ResolutionResult) {
        if result.status().is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
            self.failed_names.push(result.name().to_string());
        }
    }
}

pub struct BatchOrchestrator {
    resolver: Arc<Resolver>,
    pacer: Arc<dyn RateLimiterPort>,
    run_log: Arc<dyn RunLogPort>,
    workers: usize,
}

impl BatchOrchestrator {
    pub fn new(
        resolver: Arc<Resolver>,
        pacer: Arc<dyn RateLimiterPort>,
        run_log: Arc<dyn RunLogPort>,
        workers: usize,
    ) -> Self {
        Self {
            resolver,
            pacer,
            run_log,
            workers: workers.max(1),
        }
    }

    fn note(&self, line: &str) {
        info!("{}", line);
        self.run_log.append_line(line);
    }

    /// Resolve all records and apply the quality filter.
    pub async fn run(&self, records: Vec<CompoundRecord>) -> BatchOutcome {
        let started = Instant::now();
        let total = records.len();
        self.note(&format!("Total compounds: {}", total));

        if records.is_empty() {
            self.note("No compounds to process");
            let summary = RunSummary::empty();
            self.log_summary(&summary);
            return BatchOutcome {
                results: Vec::new(),
                clean: Vec::new(),
                summary,
            };
        }

        let duplicate_names = find_duplicates(&records);
        for name in &duplicate_names {
            warn!(compound = %name, "Duplicate compound name in input");
            self.run_log
                .append_line(&format!("Warning: '{}' appears more than once in the input", name));
        }

        let results = if self.workers == 1 {
            self.run_sequential(records).await
        } else {
            self.run_pooled(records).await
        };

        let mut tally = Tally::default();
        for result in &results {
            tally.record(result);
        }
        let clean = filter_clean(&results);
        let elapsed_secs = started.elapsed().as_secs_f64();

        let summary = RunSummary {
            total,
            succeeded: tally.succeeded,
            failed: tally.failed,
            success_rate: tally.succeeded as f64 * 100.0 / total as f64,
            clean: clean.len(),
            failed_names: tally.failed_names,
            duplicate_names,
            elapsed_secs,
        };
        metrics::batch::finished(total, clean.len(), elapsed_secs);
        self.log_summary(&summary);

        BatchOutcome {
            results,
            clean,
            summary,
        }
    }

    async fn run_sequential(&self, records: Vec<CompoundRecord>) -> Vec<ResolutionResult> {
        let total = records.len();
        let mut results = Vec::with_capacity(total);
        for record in records {
            self.pacer.acquire().await;
            self.note(&format!("[{}/{}] {}", record.row + 1, total, record.name));
            let span = info_span!("record", row = record.row + 1);
            let resolution = self.resolver.resolve(&record.name).instrument(span).await;
            self.note(&format!("   -> {}", resolution.status()));
            results.push(ResolutionResult::new(record, resolution));
        }
        results
    }

    async fn run_pooled(&self, records: Vec<CompoundRecord>) -> Vec<ResolutionResult> {
        let total = records.len();
        let permits = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();

        for (index, record) in records.iter().cloned().enumerate() {
            let permits = permits.clone();
            let pacer = self.pacer.clone();
            let resolver = self.resolver.clone();
            let run_log = self.run_log.clone();
            let span = info_span!("record", row = record.row + 1);
            tasks.spawn(
                async move {
                    // The semaphore is never closed, so acquire only fails if it is dropped
                    let _permit = permits.acquire_owned().await.ok();
                    pacer.acquire().await;
                    run_log.append_line(&format!("[{}/{}] {}", record.row + 1, total, record.name));
                    let resolution = resolver.resolve(&record.name).await;
                    run_log.append_line(&format!("   [{}] {} -> {}", record.row + 1, record.name, resolution.status()));
                    (index, resolution)
                }
                .instrument(span),
            );
        }

        let mut slots = vec![None; total];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, resolution)) => slots[index] = Some(resolution),
                Err(e) => error!("Resolution task aborted: {}", e),
            }
        }

        // A task that panicked still gets a row, marked as failed
        records
            .into_iter()
            .zip(slots)
            .map(|(record, slot)| {
                let resolution = slot.unwrap_or_else(Resolution::failed);
                ResolutionResult::new(record, resolution)
            })
            .collect()
    }

    fn log_summary(&self, summary: &RunSummary) {
        self.note("FINAL SUMMARY:");
        self.note(&format!("Total compounds: {}", summary.total));
        self.note(&format!("Resolved: {}", summary.succeeded));
        self.note(&format!("Failed: {}", summary.failed));
        self.note(&format!("Success rate: {:.1}%", summary.success_rate));
        self.note(&format!("Clean records (valid SMILES): {}", summary.clean));
        self.note(&format!("Elapsed: {:.1}s", summary.elapsed_secs));
        if !summary.failed_names.is_empty() {
            self.note("Failed compounds:");
            for name in &summary.failed_names {
                self.note(&format!("   - {}", name));
            }
        }
    }
}

/// Names that occur more than once, each reported once, in first-seen order.
fn find_duplicates(records: &[CompoundRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for record in records {
        if !seen.insert(record.name.as_str()) && reported.insert(record.name.as_str()) {
            duplicates.push(record.name.clone());
        }
    }
    duplicates
}
