use async_trait::async_trait;

use crate::common::error::LookupError;

/// Read-only access to the external identifier service.
#[async_trait]
pub trait CompoundLookupPort: Send + Sync {
    /// Identifiers matching `name`, in the order the service returns them.
    async fn cids_by_name(&self, name: &str) -> Result<Vec<u64>, LookupError>;

    /// Structure string (SMILES) for one identifier.
    async fn smiles_by_cid(&self, cid: u64) -> Result<String, LookupError>;
}

#[async_trait]
pub trait RateLimiterPort: Send + Sync {
    /// Wait until one more request may be sent.
    async fn acquire(&self);
}

/// Append-only, human-readable run log.
pub trait RunLogPort: Send + Sync {
    fn append_line(&self, line: &str);
}
