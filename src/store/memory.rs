// In-memory reference store

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ReportFilter, ReportStore, StoreError};
use crate::report::Report;

/// Keyed in-memory store. Every call copies the report in or out, so callers
/// never hold a live reference into the map.
#[derive(Default)]
pub struct InMemoryReportStore {
    reports: RwLock<HashMap<Uuid, Report>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.reports.read().await.len()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn create(&self, report: Report) -> Result<Report, StoreError> {
        let mut reports = self.reports.write().await;
        if reports.contains_key(&report.id) {
            return Err(StoreError::AlreadyExists(report.id));
        }
        reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn get(&self, id: Uuid) -> Result<Report, StoreError> {
        self.reports
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, report: Report) -> Result<Report, StoreError> {
        let mut reports = self.reports.write().await;
        if !reports.contains_key(&report.id) {
            return Err(StoreError::NotFound(report.id));
        }
        reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn list(&self, filter: &ReportFilter) -> Result<Vec<Report>, StoreError> {
        let reports = self.reports.read().await;
        let mut matched: Vec<Report> = reports
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }
}
