use crate::common::types::{CleanRecord, ResolutionResult};

/// Keep resolved results that carry a non-blank SMILES string, in input order.
///
/// Rejected results stay in the full table; they are only left out here.
pub fn filter_clean(results: &[ResolutionResult]) -> Vec<CleanRecord> {
    results.iter().filter_map(CleanRecord::from_result).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{CompoundRecord, Resolution};

    #[test]
    fn test_filter_keeps_order_and_drops_failures() {
        let results = vec![
            ResolutionResult::new(CompoundRecord::new(0, "Water"), Resolution::success(962, "O", true)),
            ResolutionResult::new(CompoundRecord::new(1, "Nothing"), Resolution::failed()),
            ResolutionResult::new(CompoundRecord::new(2, "Blank"), Resolution::success(1, " \t", true)),
            ResolutionResult::new(CompoundRecord::new(3, "Ethanol"), Resolution::success(702, "CCO", false)),
        ];

        let clean = filter_clean(&results);
        let names: Vec<&str> = clean.iter().map(|c| c.record.name.as_str()).collect();
        assert_eq!(names, vec!["Water", "Ethanol"]);
        assert!(clean.iter().all(|c| !c.smiles.trim().is_empty()));
    }

    #[test]
    fn test_filter_on_empty_input() {
        assert!(filter_clean(&[]).is_empty());
    }
}
