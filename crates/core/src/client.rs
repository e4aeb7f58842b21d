//! Typed query operations over the HPO API.
//!
//! Every operation follows the same path: validate inputs, acquire a
//! dispatch permit (unless the caller opts into [`DispatchMode::Immediate`]),
//! perform the HTTP call, release the permit, decode. Two documented quirks
//! of the service are normalized here: the search endpoint swaps the meaning
//! of the `genes` and `diseases` category labels, and cannot paginate term
//! searches at all.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ClientConfig, DEFAULT_BASE_URL, SERVICE_MAX_REQUESTS_PER_SECOND};
use crate::dispatch::{DispatchError, DispatchMode, Dispatcher};
use crate::ids::{is_valid_disease_id, is_valid_gene_id, is_valid_ontology_id};
use crate::metrics;
use crate::pagination::{paginated_url, PageRequest, Paged};
use crate::transport::{HttpTransport, Transport, TransportError};
use crate::types::{
    Descendant, DiseaseAssociations, DiseaseDetails, DiseaseSearchResult, GeneAssociations,
    GeneDetails, GeneSearchResult, IntersectingDiseaseAssociations, TermDetails, TermSearchResult,
};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed identifier; raised before any ticket or network activity.
    #[error("invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("search query is empty")]
    EmptyQuery,

    #[error("no ontology ids were given")]
    EmptyIdList,

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response JSON did not match the typed model.
    #[error("failed to decode {operation} response: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}

/// Logical search category, as callers think of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCategory {
    Terms,
    Genes,
    Diseases,
}

impl SearchCategory {
    /// Category label sent on the wire, which is also the raw response field
    /// the hits arrive under. The service swaps the meaning of the `genes`
    /// and `diseases` labels, so the client requests (and reads back) the
    /// swapped one; `terms` is unaffected.
    fn wire_label(self) -> &'static str {
        match self {
            SearchCategory::Terms => "terms",
            SearchCategory::Genes => "diseases",
            SearchCategory::Diseases => "genes",
        }
    }

    fn operation(self) -> &'static str {
        match self {
            SearchCategory::Terms => "search_terms",
            SearchCategory::Genes => "search_genes",
            SearchCategory::Diseases => "search_diseases",
        }
    }
}

/// Rate-limited client for the HPO API.
///
/// Owns the dispatcher; queued calls are released strictly in submission
/// order at the configured requests-per-second budget. The dispatcher starts
/// stopped: call [`HpoClient::start`] before issuing queued calls and
/// [`HpoClient::stop`] before exiting.
pub struct HpoClient {
    base_url: String,
    dispatcher: Dispatcher,
    transport: Arc<dyn Transport>,
}

impl HpoClient {
    /// Build a client backed by the real HTTP transport.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Ok(Self::with_transport(config, transport))
    }

    /// Build a client over a caller-provided transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        if config.exceeds_service_limit() {
            warn!(
                requests_per_second = config.requests_per_second,
                service_limit = SERVICE_MAX_REQUESTS_PER_SECOND,
                "Configured rate exceeds the service's per-IP limit; requests may get this IP banned"
            );
        }

        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        let dispatcher = Dispatcher::new(
            config.requests_per_second,
            config.acquire_timeout_ms.map(Duration::from_millis),
        );

        Self {
            base_url,
            dispatcher,
            transport,
        }
    }

    /// Start the dispatch tick loop. Queued calls fail with
    /// [`DispatchError::NotRunning`] until this is called.
    pub fn start(&self) {
        self.dispatcher.start();
    }

    /// Stop the dispatch tick loop so the process can exit cleanly. Pending
    /// queued calls fail with [`DispatchError::NotRunning`].
    pub fn stop(&self) {
        self.dispatcher.stop();
    }

    pub fn is_running(&self) -> bool {
        self.dispatcher.is_running()
    }

    /// Tickets currently waiting for a dispatch slot.
    pub fn queue_depth(&self) -> usize {
        self.dispatcher.queue_depth()
    }

    // ----------------------------- terms ------------------------------

    /// Term details by ontology id (`GET /term/{id}`).
    pub async fn term_details(
        &self,
        ontology_id: &str,
        mode: DispatchMode,
    ) -> Result<TermDetails, ClientError> {
        let id = valid_ontology_id(ontology_id)?;
        let url = format!("{}/term/{}", self.base_url, urlencoding::encode(id));
        let value = self.dispatch_get("term_details", &url, mode).await?;
        decode("term_details", value)
    }

    /// All descendants of a term (`GET /term/{id}/descendants`).
    pub async fn term_descendants(
        &self,
        ontology_id: &str,
        mode: DispatchMode,
    ) -> Result<Vec<Descendant>, ClientError> {
        let id = valid_ontology_id(ontology_id)?;
        let url = format!(
            "{}/term/{}/descendants",
            self.base_url,
            urlencoding::encode(id)
        );
        let value = self.dispatch_get("term_descendants", &url, mode).await?;
        decode("term_descendants", value)
    }

    /// Diseases associated with every one of `ontology_ids`
    /// (`GET /term/intersecting?q={ids}`).
    pub async fn intersecting_disease_associations(
        &self,
        ontology_ids: &[String],
        mode: DispatchMode,
    ) -> Result<IntersectingDiseaseAssociations, ClientError> {
        if ontology_ids.is_empty() {
            return Err(ClientError::EmptyIdList);
        }
        let mut ids = Vec::with_capacity(ontology_ids.len());
        for id in ontology_ids {
            ids.push(valid_ontology_id(id)?);
        }

        let url = format!(
            "{}/term/intersecting?q={}",
            self.base_url,
            urlencoding::encode(&ids.join(","))
        );
        let value = self
            .dispatch_get("intersecting_disease_associations", &url, mode)
            .await?;
        decode("intersecting_disease_associations", value)
    }

    /// Genes associated with a term (`GET /term/{id}/genes?max=&offset=`).
    pub async fn gene_associations(
        &self,
        ontology_id: &str,
        page: PageRequest,
        mode: DispatchMode,
    ) -> Result<GeneAssociations, ClientError> {
        let id = valid_ontology_id(ontology_id)?;
        let url = paginated_url(
            &format!("{}/term/{}/genes", self.base_url, urlencoding::encode(id)),
            &page,
        );
        let value = self.dispatch_get("gene_associations", &url, mode).await?;
        decode("gene_associations", value)
    }

    /// Diseases associated with a term (`GET /term/{id}/diseases?max=&offset=`).
    pub async fn disease_associations(
        &self,
        ontology_id: &str,
        page: PageRequest,
        mode: DispatchMode,
    ) -> Result<DiseaseAssociations, ClientError> {
        let id = valid_ontology_id(ontology_id)?;
        let url = paginated_url(
            &format!(
                "{}/term/{}/diseases",
                self.base_url,
                urlencoding::encode(id)
            ),
            &page,
        );
        let value = self.dispatch_get("disease_associations", &url, mode).await?;
        decode("disease_associations", value)
    }

    // ------------------------ diseases & genes -------------------------

    /// Disease details by OMIM id (`GET /disease/{id}`).
    pub async fn disease(
        &self,
        disease_id: &str,
        mode: DispatchMode,
    ) -> Result<DiseaseDetails, ClientError> {
        let id = valid_disease_id(disease_id)?;
        let url = format!("{}/disease/{}", self.base_url, urlencoding::encode(id));
        let value = self.dispatch_get("disease", &url, mode).await?;
        decode("disease", value)
    }

    /// Gene details by Entrez id (`GET /gene/{id}`).
    pub async fn gene(
        &self,
        entrez_gene_id: &str,
        mode: DispatchMode,
    ) -> Result<GeneDetails, ClientError> {
        let id = valid_gene_id(entrez_gene_id)?;
        let url = format!("{}/gene/{}", self.base_url, urlencoding::encode(id));
        let value = self.dispatch_get("gene", &url, mode).await?;
        decode("gene", value)
    }

    // ----------------------------- search ------------------------------

    /// Search ontology terms (`GET /search/?q=&max=&offset=&category=terms`).
    ///
    /// The service cannot paginate term searches, so `page` is ignored, the
    /// full result set is requested, and `next` is always false.
    pub async fn search_terms(
        &self,
        query: &str,
        page: PageRequest,
        mode: DispatchMode,
    ) -> Result<Paged<TermSearchResult>, ClientError> {
        let (raw, page) = self.search(SearchCategory::Terms, query, page, mode).await?;
        decode_search_page(SearchCategory::Terms, raw, &page)
    }

    /// Search genes.
    ///
    /// Issues the request under the swapped `diseases` label and reads the
    /// hits back from the raw `diseases` field; the returned values are the
    /// logical gene results.
    pub async fn search_genes(
        &self,
        query: &str,
        page: PageRequest,
        mode: DispatchMode,
    ) -> Result<Paged<GeneSearchResult>, ClientError> {
        let (raw, page) = self.search(SearchCategory::Genes, query, page, mode).await?;
        decode_search_page(SearchCategory::Genes, raw, &page)
    }

    /// Search diseases (served under the swapped `genes` label).
    pub async fn search_diseases(
        &self,
        query: &str,
        page: PageRequest,
        mode: DispatchMode,
    ) -> Result<Paged<DiseaseSearchResult>, ClientError> {
        let (raw, page) = self
            .search(SearchCategory::Diseases, query, page, mode)
            .await?;
        decode_search_page(SearchCategory::Diseases, raw, &page)
    }

    async fn search(
        &self,
        category: SearchCategory,
        query: &str,
        page: PageRequest,
        mode: DispatchMode,
    ) -> Result<(serde_json::Value, PageRequest), ClientError> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return Err(ClientError::EmptyQuery);
        }

        // Term searches cannot be paginated upstream; request everything.
        let page = if category == SearchCategory::Terms {
            PageRequest::ALL
        } else {
            page
        };

        let url = format!(
            "{}/search/?q={}&{}&category={}",
            self.base_url,
            urlencoding::encode(&q),
            page.to_query(),
            category.wire_label()
        );
        let value = self.dispatch_get(category.operation(), &url, mode).await?;
        Ok((value, page))
    }

    /// Shared request path: acquire a dispatch permit, perform the call,
    /// release the permit whether the call succeeded or not.
    async fn dispatch_get(
        &self,
        operation: &'static str,
        url: &str,
        mode: DispatchMode,
    ) -> Result<serde_json::Value, ClientError> {
        let permit = self.dispatcher.acquire(mode).await?;

        let started = Instant::now();
        let result = self.transport.get_json(url).await;
        drop(permit);

        metrics::REQUEST_DURATION
            .with_label_values(&[operation])
            .observe(started.elapsed().as_secs_f64());
        let status = if result.is_ok() { "success" } else { "error" };
        metrics::REQUESTS_TOTAL
            .with_label_values(&[operation, status])
            .inc();
        debug!(operation, url, status, "API request finished");

        Ok(result?)
    }
}

fn valid_ontology_id(raw: &str) -> Result<&str, ClientError> {
    let id = raw.trim();
    if is_valid_ontology_id(id) {
        Ok(id)
    } else {
        Err(ClientError::InvalidId(raw.to_string()))
    }
}

fn valid_disease_id(raw: &str) -> Result<&str, ClientError> {
    let id = raw.trim();
    if is_valid_disease_id(id) {
        Ok(id)
    } else {
        Err(ClientError::InvalidId(raw.to_string()))
    }
}

fn valid_gene_id(raw: &str) -> Result<&str, ClientError> {
    let id = raw.trim();
    if is_valid_gene_id(id) {
        Ok(id)
    } else {
        Err(ClientError::InvalidId(raw.to_string()))
    }
}

fn decode<T: DeserializeOwned>(
    operation: &'static str,
    value: serde_json::Value,
) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode {
        operation,
        message: e.to_string(),
    })
}

/// Pull one logical category's hits and total count out of a raw search
/// response and wrap them as a page.
fn decode_search_page<T: DeserializeOwned>(
    category: SearchCategory,
    raw: serde_json::Value,
    page: &PageRequest,
) -> Result<Paged<T>, ClientError> {
    let field = category.wire_label();
    let total_count = raw
        .get(format!("{field}TotalCount"))
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(0);
    let values = match raw.get(field) {
        Some(hits) => decode(category.operation(), hits.clone())?,
        None => Vec::new(),
    };

    Ok(Paged::new(values, page, total_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_labels_swap_genes_and_diseases() {
        assert_eq!(SearchCategory::Terms.wire_label(), "terms");
        assert_eq!(SearchCategory::Genes.wire_label(), "diseases");
        assert_eq!(SearchCategory::Diseases.wire_label(), "genes");
    }

    #[test]
    fn test_decodes_gene_hits_from_swapped_diseases_field() {
        // With category=diseases on the wire, the hits under `diseases` are
        // gene-shaped; that is the upstream defect this client papers over.
        let raw = json!({
            "diseases": [
                { "entrezGeneId": 2200, "entrezGeneSymbol": "FBN1" }
            ],
            "diseasesTotalCount": 41,
            "genes": [],
            "genesTotalCount": 0
        });

        let page = PageRequest::new(20, 1);
        let result: Paged<GeneSearchResult> =
            decode_search_page(SearchCategory::Genes, raw, &page).unwrap();

        assert_eq!(result.values.len(), 1);
        assert_eq!(result.values[0].entrez_gene_symbol, "FBN1");
        assert!(result.next);
    }

    #[test]
    fn test_decodes_disease_hits_from_swapped_genes_field() {
        let raw = json!({
            "genes": [
                {
                    "db": "OMIM",
                    "dbName": "Marfan syndrome",
                    "dbRef": "154700",
                    "diseaseId": "OMIM:154700"
                }
            ],
            "genesTotalCount": 1
        });

        let result: Paged<DiseaseSearchResult> =
            decode_search_page(SearchCategory::Diseases, raw, &PageRequest::new(20, 1)).unwrap();

        assert_eq!(result.values[0].disease_id, "OMIM:154700");
        assert!(!result.next);
    }

    #[test]
    fn test_missing_search_fields_decode_as_empty_page() {
        let result: Paged<TermSearchResult> =
            decode_search_page(SearchCategory::Terms, json!({}), &PageRequest::ALL).unwrap();

        assert!(result.values.is_empty());
        assert!(!result.next);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let config = ClientConfig {
            base_url: Some("https://hpo.example.org/api/hpo/".to_string()),
            ..ClientConfig::default()
        };
        let client =
            HpoClient::with_transport(config, Arc::new(crate::testing::MockTransport::new()));
        assert_eq!(client.base_url, "https://hpo.example.org/api/hpo");
    }

    #[test]
    fn test_default_base_url_applies_when_unset() {
        let client = HpoClient::with_transport(
            ClientConfig::default(),
            Arc::new(crate::testing::MockTransport::new()),
        );
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_id_validation_trims_before_checking() {
        assert_eq!(valid_ontology_id("  HP:0001166  ").unwrap(), "HP:0001166");
        assert!(matches!(
            valid_ontology_id("HP-0001166"),
            Err(ClientError::InvalidId(_))
        ));
        assert_eq!(valid_disease_id(" OMIM:154700").unwrap(), "OMIM:154700");
        assert_eq!(valid_gene_id("2200 ").unwrap(), "2200");
    }
}
