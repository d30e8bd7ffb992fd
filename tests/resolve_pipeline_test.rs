use anyhow::Result;
use async_trait::async_trait;
use compound_curator::app::ports::CompoundLookupPort;
use compound_curator::app::resolve_use_case::{ResolveRequest, ResolveUseCase};
use compound_curator::infra::RateLimiter;
use compound_curator::LookupError;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

/// Stable fake of the identifier service.
struct FakePubChem;

#[async_trait]
impl CompoundLookupPort for FakePubChem {
    async fn cids_by_name(&self, name: &str) -> std::result::Result<Vec<u64>, LookupError> {
        match name {
            "Caffeine" => Ok(vec![2519]),
            "alpha-Tocopherol" => Ok(vec![14985, 2116]),
            "Quercetin" => Ok(vec![5280343]),
            "Ghost" => Ok(vec![999]),
            "Flaky" => Err(LookupError::Transport("connection reset".to_string())),
            _ => Err(LookupError::NotFound),
        }
    }

    async fn smiles_by_cid(&self, cid: u64) -> std::result::Result<String, LookupError> {
        match cid {
            2519 => Ok("CN1C=NC2=C1C(=O)N(C(=O)N2C)C".to_string()),
            14985 => Ok("CC1=C(C)C2=C(CCC(C)(CCCC(C)CCCC(C)CCCC(C)C)O2)C(C)=C1O".to_string()),
            5280343 => Ok("C1=CC(=C(C=C1C2=C(C(=O)C3=C(C=C(C=C3O2)O)O)O)O)O".to_string()),
            _ => Err(LookupError::Malformed("missing PropertyTable.Properties".to_string())),
        }
    }
}

fn use_case(workers: usize) -> ResolveUseCase {
    ResolveUseCase::new(
        Arc::new(FakePubChem),
        Arc::new(RateLimiter::unlimited()),
        Duration::from_secs(5),
        workers,
    )
}

fn read_rows(path: &std::path::Path) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_path(path)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

const INPUT: &str = "Name,Plant,Part\n\
Caffeine,Coffea arabica,seed\n\
α-Tocopherol,Helianthus annuus,seed\n\
Unknownol,Nowhere,root\n\
Ghost,Ghost plant,leaf\n\
Flaky,Fern,frond\n\
Quercetin,Allium cepa,bulb\n";

#[tokio::test]
async fn test_full_run_writes_ordered_full_and_clean_tables() -> Result<()> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("compounds.csv");
    fs::write(&input, INPUT)?;

    let request = ResolveRequest {
        input,
        output_dir: temp_dir.path().join("output"),
        delimiter: b',',
        handoff: None,
    };
    let (summary, artifacts) = use_case(1).run(&request).await?;

    assert_eq!(summary.total, 6);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 3);
    assert_eq!(summary.clean, 3);
    assert_eq!(summary.failed_names, vec!["Unknownol", "Ghost", "Flaky"]);

    let all = read_rows(&artifacts.all_results)?;
    assert_eq!(all[0], vec!["Name", "CID", "Smiles", "Status", "Plant", "Part"]);
    assert_eq!(all.len(), 7);
    let names: Vec<&str> = all[1..].iter().map(|r| r[0].as_str()).collect();
    assert_eq!(names, vec!["Caffeine", "α-Tocopherol", "Unknownol", "Ghost", "Flaky", "Quercetin"]);
    assert_eq!(all[1][3], "SuccessOriginal");
    assert_eq!(all[2][1], "14985");
    assert_eq!(all[2][3], "SuccessVariant");
    assert_eq!(all[2][4], "Helianthus annuus");
    for failed in &all[3..6] {
        assert_eq!(failed[1], "");
        assert_eq!(failed[2], "");
        assert_eq!(failed[3], "Failed");
    }

    let clean = read_rows(&artifacts.clean_results)?;
    assert_eq!(clean[0], all[0]);
    assert_eq!(clean.len(), 4);
    for row in &clean[1..] {
        assert!(!row[2].trim().is_empty());
        assert!(all.contains(row), "clean row {:?} missing from full table", row);
    }

    let log = fs::read_to_string(&artifacts.run_log)?;
    assert!(log.contains("Trying candidate 2/2: 'alpha-Tocopherol'"));
    assert!(log.contains("FINAL SUMMARY:"));
    assert!(log.contains("   - Flaky"));
    Ok(())
}

#[tokio::test]
async fn test_worker_pool_matches_sequential_output() -> Result<()> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("compounds.csv");
    fs::write(&input, INPUT)?;

    let mut outputs = Vec::new();
    for workers in [1, 3] {
        let request = ResolveRequest {
            input: input.clone(),
            output_dir: temp_dir.path().join(format!("out_{}", workers)),
            delimiter: b',',
            handoff: None,
        };
        let (_, artifacts) = use_case(workers).run(&request).await?;
        outputs.push((read_rows(&artifacts.all_results)?, read_rows(&artifacts.clean_results)?));
    }
    assert_eq!(outputs[0], outputs[1]);
    Ok(())
}

#[tokio::test]
async fn test_header_only_input_produces_empty_tables() -> Result<()> {
    let temp_dir = tempdir()?;
    let input = temp_dir.path().join("compounds.csv");
    fs::write(&input, "Name,Plant\n")?;

    let request = ResolveRequest {
        input,
        output_dir: temp_dir.path().join("output"),
        delimiter: b',',
        handoff: None,
    };
    let (summary, artifacts) = use_case(1).run(&request).await?;
    assert_eq!(summary.total, 0);
    assert_eq!(summary.success_rate, 0.0);
    assert_eq!(read_rows(&artifacts.all_results)?, vec![vec!["Name", "CID", "Smiles", "Status", "Plant"]]);
    assert_eq!(read_rows(&artifacts.clean_results)?.len(), 1);
    Ok(())
}
