// Report storage contract - the core only needs keyed CRUD and filtered listing

pub mod memory;

pub use memory::InMemoryReportStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::report::{Report, ReportStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("report {0} not found")]
    NotFound(Uuid),
    #[error("report {0} already exists")]
    AlreadyExists(Uuid),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Filter for report listings. All conditions are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    /// Restrict to these entity references. `None` means no restriction.
    pub entity_refs: Option<Vec<String>>,
    pub limit: Option<usize>,
}

impl ReportFilter {
    fn matches(&self, report: &Report) -> bool {
        if let Some(status) = self.status {
            if report.status != status {
                return false;
            }
        }
        if let Some(refs) = &self.entity_refs {
            if !refs.iter().any(|r| r == &report.entity_ref) {
                return false;
            }
        }
        true
    }
}

/// Durable keyed storage for report entities. Persistence mechanics live
/// outside the core; the in-memory store is the reference implementation
/// used by tests and the demo binary.
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn create(&self, report: Report) -> Result<Report, StoreError>;
    async fn get(&self, id: Uuid) -> Result<Report, StoreError>;
    async fn update(&self, report: Report) -> Result<Report, StoreError>;
    async fn list(&self, filter: &ReportFilter) -> Result<Vec<Report>, StoreError>;
}
