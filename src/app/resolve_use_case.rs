use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::app::ports::{CompoundLookupPort, RateLimiterPort, RunLogPort};
use crate::common::constants::{ALL_RESULTS_FILE, CLEAN_RESULTS_FILE, RUN_LOG_FILE};
use crate::common::error::Result;
use crate::common::types::RunSummary;
use crate::infra::table::{read_compounds, write_clean, write_results};
use crate::observability::FileRunLog;
use crate::pipeline::{BatchOrchestrator, Resolver};

/// What to resolve and where to put it.
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub delimiter: u8,
    /// Extra copy of the clean table for the downstream prediction step
    pub handoff: Option<PathBuf>,
}

/// Files written by one run.
#[derive(Debug, Clone)]
pub struct RunArtifacts {
    pub run_dir: PathBuf,
    pub all_results: PathBuf,
    pub clean_results: PathBuf,
    pub run_log: PathBuf,
    pub handoff: Option<PathBuf>,
}

/// Use case for the whole Stage 1 run: read, resolve, filter, persist.
pub struct ResolveUseCase {
    lookup: Arc<dyn CompoundLookupPort>,
    pacer: Arc<dyn RateLimiterPort>,
    timeout: Duration,
    workers: usize,
}

impl ResolveUseCase {
    pub fn new(
        lookup: Arc<dyn CompoundLookupPort>,
        pacer: Arc<dyn RateLimiterPort>,
        timeout: Duration,
        workers: usize,
    ) -> Self {
        Self {
            lookup,
            pacer,
            timeout,
            workers,
        }
    }

    /// Input problems abort before anything is written.
    pub async fn run(&self, request: &ResolveRequest) -> Result<(RunSummary, RunArtifacts)> {
        let table = read_compounds(&request.input, request.delimiter)?;

        let run_dir = create_run_dir(&request.output_dir)?;
        let run_log = Arc::new(FileRunLog::open(run_dir.join(RUN_LOG_FILE))?);
        run_log.append_line(&"=".repeat(60));
        run_log.append_line("--- COMPOUND NAME RESOLUTION STARTED ---");
        run_log.append_line(&"=".repeat(60));
        run_log.append_line(&format!(
            "Input file valid: {} rows, {} columns ({})",
            table.records.len(),
            table.column_count,
            request.input.display()
        ));

        let resolver = Arc::new(Resolver::new(self.lookup.clone(), run_log.clone(), self.timeout));
        let orchestrator = BatchOrchestrator::new(resolver, self.pacer.clone(), run_log.clone(), self.workers);
        let outcome = orchestrator.run(table.records).await;

        let all_results = run_dir.join(ALL_RESULTS_FILE);
        let clean_results = run_dir.join(CLEAN_RESULTS_FILE);
        write_results(&all_results, request.delimiter, &table.passthrough_headers, &outcome.results)?;
        write_clean(&clean_results, request.delimiter, &table.passthrough_headers, &outcome.clean)?;
        run_log.append_line(&format!("Full results saved to: {}", all_results.display()));
        run_log.append_line(&format!("Clean results saved to: {}", clean_results.display()));

        let handoff = match &request.handoff {
            Some(target) => {
                copy_handoff(&clean_results, target)?;
                run_log.append_line(&format!("Hand-off file written to: {}", target.display()));
                Some(target.clone())
            }
            None => None,
        };

        run_log.append_line("--- COMPOUND NAME RESOLUTION COMPLETED ---");
        info!("Run artifacts in {}", run_dir.display());

        let artifacts = RunArtifacts {
            run_log: run_log.path().to_path_buf(),
            run_dir,
            all_results,
            clean_results,
            handoff,
        };
        Ok((outcome.summary, artifacts))
    }
}

/// `{output_dir}/curation_{timestamp}`, suffixed if a run already claimed that second.
fn create_run_dir(output_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let mut candidate = output_dir.join(format!("curation_{}", stamp));
    let mut suffix = 1;
    while candidate.exists() {
        candidate = output_dir.join(format!("curation_{}_{}", stamp, suffix));
        suffix += 1;
    }
    fs::create_dir(&candidate)?;
    Ok(candidate)
}

fn copy_handoff(clean_results: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::copy(clean_results, target)?;
    Ok(())
}
