//! Identifier shape validation.
//!
//! Pure predicates over the three identifier families the API accepts:
//! ontology terms (`HP:<digits>`), OMIM diseases (`OMIM:<digits>`) and
//! Entrez genes (bare digits). Validation happens before a ticket is
//! acquired or any request is made.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static ONTOLOGY_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^HP:[0-9]+$").unwrap());
static DISEASE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^OMIM:[0-9]+$").unwrap());
static GENE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());

/// True when `s` is an HPO term id (`HP:` followed by digits).
pub fn is_valid_ontology_id(s: &str) -> bool {
    ONTOLOGY_ID.is_match(s)
}

/// True when `s` is an OMIM disease id (`OMIM:` followed by digits).
pub fn is_valid_disease_id(s: &str) -> bool {
    DISEASE_ID.is_match(s)
}

/// True when `s` is an Entrez gene id (digits only).
pub fn is_valid_gene_id(s: &str) -> bool {
    GENE_ID.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_well_formed_ontology_ids() {
        assert!(is_valid_ontology_id("HP:0001166"));
        assert!(is_valid_ontology_id("HP:1"));
    }

    #[test]
    fn test_rejects_malformed_ontology_ids() {
        assert!(!is_valid_ontology_id(""));
        assert!(!is_valid_ontology_id("HP:"));
        assert!(!is_valid_ontology_id("hp:0001166"));
        assert!(!is_valid_ontology_id("HP:0001166 "));
        assert!(!is_valid_ontology_id(" HP:0001166"));
        assert!(!is_valid_ontology_id("HP:00011x6"));
        assert!(!is_valid_ontology_id("OMIM:154700"));
    }

    #[test]
    fn test_accepts_well_formed_disease_ids() {
        assert!(is_valid_disease_id("OMIM:154700"));
        assert!(is_valid_disease_id("OMIM:1"));
    }

    #[test]
    fn test_rejects_malformed_disease_ids() {
        assert!(!is_valid_disease_id(""));
        assert!(!is_valid_disease_id("OMIM:"));
        assert!(!is_valid_disease_id("omim:154700"));
        assert!(!is_valid_disease_id("ORPHA:915"));
        assert!(!is_valid_disease_id("OMIM:154700a"));
    }

    #[test]
    fn test_accepts_well_formed_gene_ids() {
        assert!(is_valid_gene_id("2200"));
        assert!(is_valid_gene_id("0"));
    }

    #[test]
    fn test_rejects_malformed_gene_ids() {
        assert!(!is_valid_gene_id(""));
        assert!(!is_valid_gene_id("FBN1"));
        assert!(!is_valid_gene_id("2200 "));
        assert!(!is_valid_gene_id("-2200"));
        assert!(!is_valid_gene_id("22.00"));
    }
}
