//! Term-id extraction from `phenotype_to_genes.txt` exports.

use std::collections::HashSet;

use crate::ids::is_valid_ontology_id;

/// Collect the distinct HPO term ids from a `phenotype_to_genes.txt` export.
///
/// Rows are tab-separated with the term id in the first column. Rows whose
/// first column is not a well-formed ontology id are skipped, which covers
/// the header line, blank lines and malformed rows uniformly. Duplicates
/// keep their first-seen position.
pub fn extract_term_ids(content: &str) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut ids = Vec::new();

    for line in content.lines() {
        let first = line.split('\t').next().unwrap_or("").trim();
        if is_valid_ontology_id(first) && seen.insert(first) {
            ids.push(first.to_string());
        }
    }

    ids
}
