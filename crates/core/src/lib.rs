pub mod client;
pub mod config;
pub mod dispatch;
pub mod ids;
pub mod metrics;
pub mod pagination;
pub mod termlist;
pub mod testing;
pub mod transport;
pub mod types;

pub use client::{ClientError, HpoClient, SearchCategory};
pub use config::{
    load_config, load_config_from_str, ClientConfig, ConfigError, DEFAULT_BASE_URL,
    SERVICE_MAX_REQUESTS_PER_SECOND,
};
pub use dispatch::{DispatchError, DispatchMode, Dispatcher, TicketId, TicketPermit, TicketQueue};
pub use pagination::{paginated_url, PageRequest, Paged};
pub use termlist::extract_term_ids;
pub use transport::{HttpTransport, Transport, TransportError};
pub use types::{
    AnnotatedTerm, CategoryTerms, DbDisease, DbGene, Descendant, DiseaseAssociation,
    DiseaseAssociations, DiseaseDb, DiseaseDetails, DiseaseInfo, DiseaseRef, DiseaseSearchResult,
    DiseaseSummary, GeneAssociation, GeneAssociations, GeneDetails, GeneSearchResult, GeneSummary,
    IntersectingDiseaseAssociations, RelatedTerm, Term, TermDetails, TermRelations,
    TermSearchResult, TermSummary,
};
