use std::fmt;

/// One input row: the compound name plus every other column, carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundRecord {
    /// Zero-based position in the input table
    pub row: usize,
    /// Compound name, trimmed and non-empty; this is what gets resolved
    pub name: String,
    /// `Name` cell exactly as read, written back unchanged
    pub source_name: String,
    /// Remaining columns as (header, value), in input order
    pub passthrough: Vec<(String, String)>,
}

impl CompoundRecord {
    /// `name` is used both for resolution (trimmed) and as the output cell (as given).
    pub fn new(row: usize, name: impl Into<String>) -> Self {
        let source_name = name.into();
        Self {
            row,
            name: source_name.trim().to_string(),
            source_name,
            passthrough: Vec::new(),
        }
    }

    pub fn with_field(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.passthrough.push((header.into(), value.into()));
        self
    }
}

/// How a record was (or was not) resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionStatus {
    /// Resolved using the name exactly as given
    SuccessOriginal,
    /// Resolved using a normalized spelling
    SuccessVariant,
    /// Every candidate spelling was exhausted
    Failed,
}

impl ResolutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionStatus::SuccessOriginal => "SuccessOriginal",
            ResolutionStatus::SuccessVariant => "SuccessVariant",
            ResolutionStatus::Failed => "Failed",
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, ResolutionStatus::Failed)
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving one name.
///
/// The constructors are the only way to build one, so `cid` and `smiles` are
/// both present exactly when the status is a success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    cid: Option<u64>,
    smiles: Option<String>,
    status: ResolutionStatus,
}

impl Resolution {
    /// `first_candidate` selects between `SuccessOriginal` and `SuccessVariant`.
    pub fn success(cid: u64, smiles: impl Into<String>, first_candidate: bool) -> Self {
        let status = if first_candidate {
            ResolutionStatus::SuccessOriginal
        } else {
            ResolutionStatus::SuccessVariant
        };
        Self {
            cid: Some(cid),
            smiles: Some(smiles.into()),
            status,
        }
    }

    pub fn failed() -> Self {
        Self {
            cid: None,
            smiles: None,
            status: ResolutionStatus::Failed,
        }
    }

    pub fn cid(&self) -> Option<u64> {
        self.cid
    }

    pub fn smiles(&self) -> Option<&str> {
        self.smiles.as_deref()
    }

    pub fn status(&self) -> ResolutionStatus {
        self.status
    }
}

/// A resolved input row, as written to the full-result table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    pub record: CompoundRecord,
    pub resolution: Resolution,
}

impl ResolutionResult {
    pub fn new(record: CompoundRecord, resolution: Resolution) -> Self {
        Self { record, resolution }
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn status(&self) -> ResolutionStatus {
        self.resolution.status()
    }
}

/// A result that passed the quality filter: resolved, with a usable SMILES string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanRecord {
    pub record: CompoundRecord,
    pub cid: u64,
    pub smiles: String,
    pub status: ResolutionStatus,
}

impl CleanRecord {
    /// Returns `None` for failures and for blank structure strings.
    pub fn from_result(result: &ResolutionResult) -> Option<Self> {
        if !result.status().is_success() {
            return None;
        }
        let cid = result.resolution.cid()?;
        let smiles = result.resolution.smiles()?;
        if smiles.trim().is_empty() {
            return None;
        }
        Some(Self {
            record: result.record.clone(),
            cid,
            smiles: smiles.to_string(),
            status: result.status(),
        })
    }
}

/// Aggregate counters for one batch run. Built once, never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Percentage of `total` that resolved, 0.0 for an empty batch
    pub success_rate: f64,
    /// Rows that survived the quality filter
    pub clean: usize,
    pub failed_names: Vec<String>,
    pub duplicate_names: Vec<String>,
    pub elapsed_secs: f64,
}

impl RunSummary {
    pub fn empty() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            success_rate: 0.0,
            clean: 0,
            failed_names: Vec::new(),
            duplicate_names: Vec::new(),
            elapsed_secs: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_record_keeps_source_name() {
        let record = CompoundRecord::new(0, "  α-Pinene ");
        assert_eq!(record.name, "α-Pinene");
        assert_eq!(record.source_name, "  α-Pinene ");
    }

    #[test]
    fn test_resolution_invariant_holds_for_constructors() {
        let ok = Resolution::success(5280343, "CC(C)=O", true);
        assert_eq!(ok.status(), ResolutionStatus::SuccessOriginal);
        assert!(ok.cid().is_some() && ok.smiles().is_some());

        let variant = Resolution::success(14985, "CC", false);
        assert_eq!(variant.status(), ResolutionStatus::SuccessVariant);

        let failed = Resolution::failed();
        assert_eq!(failed.status(), ResolutionStatus::Failed);
        assert!(failed.cid().is_none() && failed.smiles().is_none());
    }

    #[test]
    fn test_status_rendering_starts_with_success() {
        assert!(ResolutionStatus::SuccessOriginal.as_str().starts_with("Success"));
        assert!(ResolutionStatus::SuccessVariant.as_str().starts_with("Success"));
        assert_eq!(ResolutionStatus::Failed.to_string(), "Failed");
    }

    #[test]
    fn test_clean_record_rejects_blank_smiles() {
        let record = CompoundRecord::new(0, "Water");
        let blank = ResolutionResult::new(record.clone(), Resolution::success(962, "   ", true));
        assert!(CleanRecord::from_result(&blank).is_none());

        let failed = ResolutionResult::new(record.clone(), Resolution::failed());
        assert!(CleanRecord::from_result(&failed).is_none());

        let good = ResolutionResult::new(record, Resolution::success(962, "O", true));
        let clean = CleanRecord::from_result(&good).expect("should be clean");
        assert_eq!(clean.cid, 962);
        assert_eq!(clean.smiles, "O");
    }
}
