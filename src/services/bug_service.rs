//! Bug service: pagination, lookup and CRUD over one storage backend.
//!
//! Every operation races the backend call against a cancellation token. A
//! cancelled call yields [`ApiError::Cancelled`], never a partial result.

use chrono::Utc;
use log::{debug, info, warn};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::constants::ERR_BUG_NOT_FOUND;
use crate::errors::ApiError;
use crate::models::{Bug, CreateBugRequest, UpdateBugRequest};
use crate::pagination::{Page, PageOutcome, PageRequest};
use crate::repositories::{Backend, BugRepository};
use crate::validators::validate_request;

pub struct BugService {
    backend: Backend,
    repository: Arc<dyn BugRepository>,
}

/// Run `operation` unless `cancel` fires first.
async fn cancellable<T, F>(cancel: &CancellationToken, operation: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApiError::Cancelled),
        result = operation => result,
    }
}

impl BugService {
    pub fn new(backend: Backend, repository: Arc<dyn BugRepository>) -> Self {
        Self {
            backend,
            repository,
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Backing repository, bypassing validation and cancellation.
    pub fn repository(&self) -> Arc<dyn BugRepository> {
        Arc::clone(&self.repository)
    }

    /// Provision the backend. Run once before serving traffic.
    pub async fn ensure_schema(&self) -> Result<(), ApiError> {
        info!("Ensuring schema for {} backend...", self.backend);
        self.repository.ensure_schema().await
    }

    /// Fetch one page plus the total count.
    ///
    /// Count and page are two independent reads; under concurrent writes the
    /// total may not match the page's snapshot.
    pub async fn get_paginated(
        &self,
        request: PageRequest,
        cancel: &CancellationToken,
    ) -> Result<PageOutcome<Bug>, ApiError> {
        debug!(
            "{}: page {} size {} skip {} {:?}",
            self.backend,
            request.page_number,
            request.page_size,
            request.skip(),
            request.sort
        );

        cancellable(cancel, async {
            let total = self.repository.count_all().await?;
            let items = self.repository.fetch_page(&request).await?;
            Ok(Page::build(items, total, request))
        })
        .await
    }

    pub async fn get_by_id(&self, id: Uuid, cancel: &CancellationToken) -> Result<Bug, ApiError> {
        debug!("{}: fetching bug by ID: {}", self.backend, id);
        cancellable(cancel, self.repository.find_by_id(id))
            .await?
            .ok_or_else(|| {
                warn!("{}: bug not found with id: {}", self.backend, id);
                ApiError::NotFound(ERR_BUG_NOT_FOUND.to_string())
            })
    }

    pub async fn create(
        &self,
        req: CreateBugRequest,
        cancel: &CancellationToken,
    ) -> Result<Bug, ApiError> {
        validate_request(&req).inspect_err(|e| {
            warn!("{}: create bug rejected: {}", self.backend, e);
        })?;

        let bug = Bug::new(
            req.title,
            req.description,
            req.report_time.unwrap_or_else(Utc::now),
        );
        cancellable(cancel, self.repository.insert(&bug)).await?;

        info!("{}: created bug {}", self.backend, bug.id);
        Ok(bug)
    }

    /// Apply a partial update. Absent fields keep their stored value.
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateBugRequest,
        cancel: &CancellationToken,
    ) -> Result<Bug, ApiError> {
        validate_request(&req).inspect_err(|e| {
            warn!("{}: update of bug {} rejected: {}", self.backend, id, e);
        })?;

        let updated = self.get_by_id(id, cancel).await?.apply(req);

        // The bug may have been deleted between the read and the write
        if !cancellable(cancel, self.repository.replace(&updated)).await? {
            warn!("{}: update failed, bug {} vanished", self.backend, id);
            return Err(ApiError::NotFound(ERR_BUG_NOT_FOUND.to_string()));
        }

        info!("{}: updated bug {}", self.backend, id);
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid, cancel: &CancellationToken) -> Result<(), ApiError> {
        if !cancellable(cancel, self.repository.delete_by_id(id)).await? {
            warn!("{}: delete failed, bug not found with id: {}", self.backend, id);
            return Err(ApiError::NotFound(ERR_BUG_NOT_FOUND.to_string()));
        }

        info!("{}: deleted bug {}", self.backend, id);
        Ok(())
    }
}
