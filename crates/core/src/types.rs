//! Response models for the HPO API.
//!
//! Field names map 1:1 onto the service's camelCase wire format. Free-text
//! fields the service sometimes omits or nulls (definitions, comments,
//! synonyms) are optional; collections default to empty.

use serde::{Deserialize, Serialize};

// ============================================================================
// Term details
// ============================================================================

/// Full detail payload for one ontology term.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TermDetails {
    pub details: Term,
    pub relations: TermRelations,
}

/// Core attributes of an ontology term.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    pub name: String,
    /// Term id in `HP:<digits>` form.
    pub id: String,
    #[serde(default)]
    pub alt_term_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub is_obsolete: bool,
    #[serde(default)]
    pub xrefs: Vec<String>,
    #[serde(default)]
    pub pubmed_xrefs: Vec<String>,
}

/// Parent/child placement of a term within the ontology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TermRelations {
    pub term_count: i64,
    #[serde(default)]
    pub parents: Vec<RelatedTerm>,
    #[serde(default)]
    pub children: Vec<RelatedTerm>,
}

/// A term referenced from another term's relations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelatedTerm {
    pub name: String,
    /// Internal numeric id, distinct from the `HP:` ontology id.
    pub id: i64,
    pub children_count: i64,
    pub ontology_id: String,
}

/// A descendant of a term, as returned by the descendants endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Descendant {
    pub ontology_id: String,
    pub name: String,
}

// ============================================================================
// Associations
// ============================================================================

/// Source database of a disease record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiseaseDb {
    Omim,
    Orpha,
}

/// Diseases associated with every term of an intersecting-terms query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntersectingDiseaseAssociations {
    #[serde(default)]
    pub associations: Vec<DiseaseSummary>,
}

/// A disease reference with a typed source database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseSummary {
    pub disease_id: String,
    pub disease_name: String,
    pub db_id: i64,
    pub db: DiseaseDb,
}

/// Genes associated with a term, with the service's own pagination echo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneAssociations {
    #[serde(default)]
    pub genes: Vec<GeneAssociation>,
    pub gene_count: i64,
    pub offset: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneAssociation {
    pub entrez_gene_id: i64,
    pub entrez_gene_symbol: String,
    #[serde(default)]
    pub db_diseases: Vec<DbDisease>,
}

/// A disease row nested inside a gene association.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DbDisease {
    pub id: i64,
    pub disease_id: String,
    pub disease_name: String,
    pub db_id: i64,
    pub db: DiseaseDb,
}

/// Diseases associated with a term, with the service's own pagination echo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseAssociations {
    #[serde(default)]
    pub diseases: Vec<DiseaseAssociation>,
    pub disease_count: i64,
    pub offset: i64,
    pub max: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseAssociation {
    pub disease_id: String,
    pub disease_name: String,
    pub db_id: i64,
    pub db: DiseaseDb,
    #[serde(default)]
    pub db_genes: Vec<DbGene>,
}

/// A gene row nested inside a disease association.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DbGene {
    pub id: i64,
    pub entrez_gene_id: i64,
    pub entrez_gene_symbol: String,
}

// ============================================================================
// Disease / gene lookup
// ============================================================================

/// Full detail payload for one disease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseDetails {
    pub disease: DiseaseInfo,
    #[serde(default)]
    pub gene_assoc: Vec<GeneSummary>,
    /// Associated terms grouped by phenotypic category.
    #[serde(default)]
    pub cat_terms_map: Vec<CategoryTerms>,
}

/// Disease identity as reported by the lookup endpoint, where the source
/// database fields are plain strings rather than the typed [`DiseaseDb`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseInfo {
    pub disease_id: String,
    pub disease_name: String,
    pub db_id: String,
    pub db: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTerms {
    pub cat_label: String,
    #[serde(default)]
    pub terms: Vec<AnnotatedTerm>,
}

/// A term annotated with clinical qualifiers under a disease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedTerm {
    pub ontology_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<String>,
}

/// Full detail payload for one gene.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneDetails {
    pub gene: GeneSummary,
    #[serde(default)]
    pub term_assoc: Vec<TermSummary>,
    #[serde(default)]
    pub disease_assoc: Vec<DiseaseRef>,
}

/// Minimal gene identity, shared by lookups and search hits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneSummary {
    pub entrez_gene_id: i64,
    pub entrez_gene_symbol: String,
}

/// A term referenced from a gene's associations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TermSummary {
    pub ontology_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

/// A disease reference with untyped source database fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseRef {
    pub disease_id: String,
    pub disease_name: String,
    pub db_id: String,
    pub db: String,
}

// ============================================================================
// Search hits
// ============================================================================

/// A term search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TermSearchResult {
    pub name: String,
    /// Internal id; the ontology id lives in `ontology_id`.
    pub id: String,
    pub children_count: i64,
    pub ontology_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonym: Option<String>,
}

/// A disease search hit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiseaseSearchResult {
    pub db: String,
    pub db_name: String,
    pub db_ref: String,
    pub disease_id: String,
}

/// A gene search hit.
pub type GeneSearchResult = GeneSummary;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_term_details() {
        let json = r#"{
            "details": {
                "name": "Arachnodactyly",
                "id": "HP:0001166",
                "altTermIds": ["HP:0001505"],
                "definition": "Abnormally long and slender fingers.",
                "comment": null,
                "synonyms": ["Long slender fingers", "Spider fingers"],
                "isObsolete": false,
                "xrefs": ["UMLS:C0003706"],
                "pubmedXrefs": []
            },
            "relations": {
                "termCount": 13941,
                "parents": [
                    {
                        "name": "Slender finger",
                        "id": 8636,
                        "childrenCount": 1,
                        "ontologyId": "HP:0001238"
                    }
                ],
                "children": []
            }
        }"#;

        let details: TermDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.details.id, "HP:0001166");
        assert_eq!(details.details.alt_term_ids, vec!["HP:0001505"]);
        assert_eq!(details.details.comment, None);
        assert!(!details.details.is_obsolete);
        assert_eq!(details.relations.parents[0].ontology_id, "HP:0001238");
        assert!(details.relations.children.is_empty());
    }

    #[test]
    fn test_decodes_intersecting_associations_with_typed_db() {
        let json = r#"{
            "associations": [
                {
                    "diseaseId": "OMIM:100050",
                    "diseaseName": "AARSKOG SYNDROME",
                    "dbId": 100050,
                    "db": "OMIM"
                },
                {
                    "diseaseId": "ORPHA:915",
                    "diseaseName": "Aarskog syndrome",
                    "dbId": 915,
                    "db": "ORPHA"
                }
            ]
        }"#;

        let assoc: IntersectingDiseaseAssociations = serde_json::from_str(json).unwrap();
        assert_eq!(assoc.associations.len(), 2);
        assert_eq!(assoc.associations[0].db, DiseaseDb::Omim);
        assert_eq!(assoc.associations[1].db, DiseaseDb::Orpha);
    }

    #[test]
    fn test_decodes_gene_associations_envelope() {
        let json = r#"{
            "genes": [
                {
                    "entrezGeneId": 2200,
                    "entrezGeneSymbol": "FBN1",
                    "dbDiseases": [
                        {
                            "id": 7044,
                            "diseaseId": "OMIM:154700",
                            "diseaseName": "MARFAN SYNDROME",
                            "dbId": 154700,
                            "db": "OMIM"
                        }
                    ]
                }
            ],
            "geneCount": 27,
            "offset": 0,
            "max": -1
        }"#;

        let assoc: GeneAssociations = serde_json::from_str(json).unwrap();
        assert_eq!(assoc.gene_count, 27);
        assert_eq!(assoc.max, -1);
        assert_eq!(assoc.genes[0].entrez_gene_symbol, "FBN1");
        assert_eq!(assoc.genes[0].db_diseases[0].db, DiseaseDb::Omim);
    }

    #[test]
    fn test_decodes_disease_details_with_string_db_fields() {
        let json = r#"{
            "disease": {
                "diseaseId": "OMIM:154700",
                "diseaseName": "MARFAN SYNDROME",
                "dbId": "154700",
                "db": "OMIM"
            },
            "geneAssoc": [
                { "entrezGeneId": 2200, "entrezGeneSymbol": "FBN1" }
            ],
            "catTermsMap": [
                {
                    "catLabel": "Skeletal system",
                    "terms": [
                        {
                            "ontologyId": "HP:0001166",
                            "name": "Arachnodactyly",
                            "definition": "Abnormally long and slender fingers.",
                            "frequency": "Very frequent",
                            "onset": null,
                            "sources": "OMIM:154700"
                        }
                    ]
                }
            ]
        }"#;

        let disease: DiseaseDetails = serde_json::from_str(json).unwrap();
        assert_eq!(disease.disease.db_id, "154700");
        assert_eq!(disease.gene_assoc[0].entrez_gene_symbol, "FBN1");
        assert_eq!(disease.cat_terms_map[0].terms[0].onset, None);
    }

    #[test]
    fn test_decodes_search_hits_with_missing_optionals() {
        let term: TermSearchResult = serde_json::from_str(
            r#"{
                "name": "Arachnodactyly",
                "id": "HP:0001166",
                "childrenCount": 0,
                "ontologyId": "HP:0001166"
            }"#,
        )
        .unwrap();
        assert_eq!(term.synonym, None);

        let gene: GeneSearchResult =
            serde_json::from_str(r#"{ "entrezGeneId": 2200, "entrezGeneSymbol": "FBN1" }"#)
                .unwrap();
        assert_eq!(gene.entrez_gene_id, 2200);

        let disease: DiseaseSearchResult = serde_json::from_str(
            r#"{
                "db": "OMIM",
                "dbName": "Marfan syndrome",
                "dbRef": "154700",
                "diseaseId": "OMIM:154700"
            }"#,
        )
        .unwrap();
        assert_eq!(disease.db_ref, "154700");
    }

    #[test]
    fn test_term_roundtrips_through_serialization() {
        let term = Term {
            name: "Arachnodactyly".into(),
            id: "HP:0001166".into(),
            alt_term_ids: vec![],
            definition: None,
            comment: None,
            synonyms: vec!["Spider fingers".into()],
            is_obsolete: false,
            xrefs: vec![],
            pubmed_xrefs: vec![],
        };

        let json = serde_json::to_value(&term).unwrap();
        assert_eq!(json["isObsolete"], false);
        assert!(json.get("definition").is_none());

        let back: Term = serde_json::from_value(json).unwrap();
        assert_eq!(back, term);
    }
}
