/// Column names and service defaults shared across the crate

// Input column that carries the compound name (exact, case-sensitive)
pub const NAME_COLUMN: &str = "Name";

// Resolution columns written after `Name`
pub const CID_COLUMN: &str = "CID";
pub const SMILES_COLUMN: &str = "Smiles";
pub const STATUS_COLUMN: &str = "Status";

pub const PUBCHEM_BASE_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";

/// Property names the service has used for the structure string, in preference order.
pub const SMILES_PROPERTY_KEYS: [&str; 4] = [
    "CanonicalSMILES",
    "SMILES",
    "ConnectivitySMILES",
    "IsomericSMILES",
];

pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_DELAY_MS: u64 = 500;
pub const DEFAULT_WORKERS: usize = 1;
pub const DEFAULT_OUTPUT_DIR: &str = "output";

pub const USER_AGENT: &str = concat!("compound_curator/", env!("CARGO_PKG_VERSION"));

// Output artifact names inside a run folder
pub const ALL_RESULTS_FILE: &str = "resolved_all.csv";
pub const CLEAN_RESULTS_FILE: &str = "resolved_clean.csv";
pub const RUN_LOG_FILE: &str = "process_log.txt";

pub const ERROR_DETAIL_MAX_CHARS: usize = 120;

/// Header names the resolver owns; pass-through columns may not reuse them.
pub fn resolution_columns() -> [&'static str; 4] {
    [NAME_COLUMN, CID_COLUMN, SMILES_COLUMN, STATUS_COLUMN]
}
