//! Name → (CID, SMILES) resolution with fallback across candidate spellings.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::{CompoundLookupPort, RunLogPort};
use crate::common::constants::ERROR_DETAIL_MAX_CHARS;
use crate::common::error::{truncate_detail, LookupError};
use crate::common::types::Resolution;
use crate::observability::metrics;
use crate::pipeline::normalize::name_candidates;

pub struct Resolver {
    lookup: Arc<dyn CompoundLookupPort>,
    run_log: Arc<dyn RunLogPort>,
    timeout: Duration,
}

impl Resolver {
    pub fn new(lookup: Arc<dyn CompoundLookupPort>, run_log: Arc<dyn RunLogPort>, timeout: Duration) -> Self {
        Self {
            lookup,
            run_log,
            timeout,
        }
    }

    /// Resolve one compound name. Never fails: lookup errors move on to the
    /// next candidate, and exhausting every candidate yields `Failed`.
    #[instrument(skip(self, name), fields(compound = %name))]
    pub async fn resolve(&self, name: &str) -> Resolution {
        let candidates = name_candidates(name);

        for (index, candidate) in candidates.iter().enumerate() {
            metrics::resolve::candidate_attempted();
            self.run_log
                .append_line(&format!("   Trying candidate {}/{}: '{}'", index + 1, candidates.len(), candidate));
            debug!(candidate = %candidate, attempt = index + 1, "Looking up candidate");

            match self.try_candidate(candidate).await {
                Ok((cid, smiles)) => {
                    let resolution = Resolution::success(cid, smiles, index == 0);
                    info!(candidate = %candidate, cid, status = %resolution.status(), "Resolved");
                    self.run_log.append_line(&format!(
                        "   Resolved '{}' via '{}': CID {} ({})",
                        name,
                        candidate,
                        cid,
                        resolution.status()
                    ));
                    metrics::resolve::record_finished(resolution.status());
                    return resolution;
                }
                Err(e) => {
                    let detail = truncate_detail(&e.to_string(), ERROR_DETAIL_MAX_CHARS);
                    warn!(candidate = %candidate, error_type = e.kind(), "Candidate failed: {}", detail);
                    self.run_log
                        .append_line(&format!("   Candidate '{}' failed: {}", candidate, detail));
                }
            }
        }

        let resolution = Resolution::failed();
        warn!(candidates = candidates.len(), "All candidates exhausted");
        self.run_log
            .append_line(&format!("   Failed to resolve '{}' after {} candidate(s)", name, candidates.len()));
        metrics::resolve::record_finished(resolution.status());
        resolution
    }

    /// Two-step lookup for one spelling: first CID returned wins.
    async fn try_candidate(&self, candidate: &str) -> Result<(u64, String), LookupError> {
        let cids = self.bounded(self.lookup.cids_by_name(candidate)).await?;
        let cid = *cids.first().ok_or(LookupError::NotFound)?;
        if cids.len() > 1 {
            debug!(cid, matches = cids.len(), "Multiple CIDs returned, taking the first");
        }

        let smiles = self.bounded(self.lookup.smiles_by_cid(cid)).await?;
        let smiles = smiles.trim();
        if smiles.is_empty() {
            return Err(LookupError::NotFound);
        }
        Ok((cid, smiles.to_string()))
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T, LookupError>>) -> Result<T, LookupError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or(Err(LookupError::Timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::ResolutionStatus;
    use crate::observability::MemoryRunLog;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Service stub: names map to CID lists, CIDs map to SMILES.
    #[derive(Default)]
    struct StubLookup {
        cids: HashMap<String, Result<Vec<u64>, LookupError>>,
        smiles: HashMap<u64, Result<String, LookupError>>,
        calls: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl StubLookup {
        fn name(mut self, name: &str, cids: Result<Vec<u64>, LookupError>) -> Self {
            self.cids.insert(name.to_string(), cids);
            self
        }

        fn cid(mut self, cid: u64, smiles: Result<&str, LookupError>) -> Self {
            self.smiles.insert(cid, smiles.map(str::to_string));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompoundLookupPort for StubLookup {
        async fn cids_by_name(&self, name: &str) -> Result<Vec<u64>, LookupError> {
            self.calls.lock().unwrap().push(format!("name:{}", name));
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.cids.get(name).cloned().unwrap_or(Err(LookupError::NotFound))
        }

        async fn smiles_by_cid(&self, cid: u64) -> Result<String, LookupError> {
            self.calls.lock().unwrap().push(format!("cid:{}", cid));
            self.smiles.get(&cid).cloned().unwrap_or(Err(LookupError::NotFound))
        }
    }

    fn resolver(stub: Arc<StubLookup>) -> (Resolver, Arc<MemoryRunLog>) {
        let log = Arc::new(MemoryRunLog::new());
        (Resolver::new(stub, log.clone(), Duration::from_secs(5)), log)
    }

    #[tokio::test]
    async fn test_original_name_success() {
        let stub = Arc::new(StubLookup::default().name("Caffeine", Ok(vec![2519])).cid(2519, Ok("CN1C=NC2=C1C(=O)N(C(=O)N2C)C")));
        let (resolver, _) = resolver(stub.clone());

        let result = resolver.resolve("Caffeine").await;
        assert_eq!(result.status(), ResolutionStatus::SuccessOriginal);
        assert_eq!(result.cid(), Some(2519));
        assert_eq!(result.smiles(), Some("CN1C=NC2=C1C(=O)N(C(=O)N2C)C"));
        assert_eq!(stub.calls(), vec!["name:Caffeine", "cid:2519"]);
    }

    #[tokio::test]
    async fn test_variant_success_after_original_fails() {
        let stub = Arc::new(
            StubLookup::default()
                .name("α-Tocopherol", Err(LookupError::NotFound))
                .name("alpha-Tocopherol", Ok(vec![14985, 2116]))
                .cid(14985, Ok("CC1=C(C)C2=C(CCC(C)(CCCC(C)CCCC(C)CCCC(C)C)O2)C(C)=C1O")),
        );
        let (resolver, log) = resolver(stub.clone());

        let result = resolver.resolve("α-Tocopherol").await;
        assert_eq!(result.status(), ResolutionStatus::SuccessVariant);
        assert_eq!(result.cid(), Some(14985));
        assert!(result.smiles().unwrap().starts_with("CC1"));
        assert_eq!(stub.calls(), vec!["name:α-Tocopherol", "name:alpha-Tocopherol", "cid:14985"]);
        assert!(log.contains("Trying candidate 2/2: 'alpha-Tocopherol'"));
    }

    #[tokio::test]
    async fn test_ascii_name_fails_without_variant() {
        let stub = Arc::new(StubLookup::default().name("alpha-Pinene", Err(LookupError::Transport("reset".into()))));
        let (resolver, log) = resolver(stub.clone());

        let result = resolver.resolve("alpha-Pinene").await;
        assert_eq!(result, Resolution::failed());
        assert_eq!(stub.calls(), vec!["name:alpha-Pinene"]);
        assert!(log.contains("Failed to resolve 'alpha-Pinene' after 1 candidate(s)"));
    }

    #[tokio::test]
    async fn test_structure_failure_falls_through_to_next_candidate() {
        let stub = Arc::new(
            StubLookup::default()
                .name("β-Carotene", Ok(vec![1]))
                .cid(1, Err(LookupError::Malformed("bad json".into())))
                .name("beta-Carotene", Ok(vec![5280489]))
                .cid(5280489, Ok("CC1=C(C(CCC1)(C)C)C=CC(C)=CC=CC(C)=CC=CC=C(C)C=CC=C(C)C=CC2=C(C)CCCC2(C)C")),
        );
        let (resolver, _) = resolver(stub);

        let result = resolver.resolve("β-Carotene").await;
        assert_eq!(result.status(), ResolutionStatus::SuccessVariant);
        assert_eq!(result.cid(), Some(5280489));
    }

    #[tokio::test]
    async fn test_blank_structure_is_treated_as_failure() {
        let stub = Arc::new(StubLookup::default().name("Mystery", Ok(vec![7])).cid(7, Ok("   ")));
        let (resolver, _) = resolver(stub);

        let result = resolver.resolve("Mystery").await;
        assert_eq!(result.status(), ResolutionStatus::Failed);
        assert!(result.cid().is_none() && result.smiles().is_none());
    }

    #[tokio::test]
    async fn test_empty_cid_list_moves_on() {
        let stub = Arc::new(
            StubLookup::default()
                .name("γ-Terpinene", Ok(vec![]))
                .name("gamma-Terpinene", Ok(vec![7461]))
                .cid(7461, Ok("CC1=CCC(=CC1)C(C)C")),
        );
        let (resolver, _) = resolver(stub);
        assert_eq!(resolver.resolve("γ-Terpinene").await.status(), ResolutionStatus::SuccessVariant);
    }

    #[tokio::test]
    async fn test_slow_call_times_out_as_candidate_failure() {
        let stub = Arc::new(StubLookup {
            delay: Some(Duration::from_millis(200)),
            ..StubLookup::default().name("Slowine", Ok(vec![1])).cid(1, Ok("C"))
        });
        let log = Arc::new(MemoryRunLog::new());
        let resolver = Resolver::new(stub, log.clone(), Duration::from_millis(20));

        let result = resolver.resolve("Slowine").await;
        assert_eq!(result.status(), ResolutionStatus::Failed);
        assert!(log.contains("request timed out"));
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent_against_stable_service() {
        let stub = Arc::new(StubLookup::default().name("Ethanol", Ok(vec![702])).cid(702, Ok("CCO")));
        let (resolver, _) = resolver(stub);
        let first = resolver.resolve("Ethanol").await;
        let second = resolver.resolve("Ethanol").await;
        assert_eq!(first, second);
    }
}
