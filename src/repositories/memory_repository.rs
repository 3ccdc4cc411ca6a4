//! In-memory bug repository for development and tests.

use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::Bug;
use crate::pagination::PageRequest;
use crate::repositories::BugRepository;

/// Bugs kept in a process-local map. Lost on restart.
#[derive(Clone, Default)]
pub struct MemoryBugRepository {
    bugs: Arc<RwLock<HashMap<Uuid, Bug>>>,
}

impl MemoryBugRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Order a slice of bugs by title, then cut out the requested page.
///
/// Equal titles keep whatever order the input had.
pub(crate) fn slice_page(mut bugs: Vec<Bug>, request: &PageRequest) -> Vec<Bug> {
    if request.sort.is_descending() {
        bugs.sort_by(|a, b| b.title.cmp(&a.title));
    } else {
        bugs.sort_by(|a, b| a.title.cmp(&b.title));
    }

    let skip = usize::try_from(request.skip()).unwrap_or(usize::MAX);
    bugs.into_iter()
        .skip(skip)
        .take(request.page_size as usize)
        .collect()
}

#[async_trait]
impl BugRepository for MemoryBugRepository {
    async fn ensure_schema(&self) -> Result<(), ApiError> {
        Ok(())
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Bug>, ApiError> {
        debug!(
            "Memory: fetching page {} (size {}, {:?})",
            request.page_number, request.page_size, request.sort
        );
        let bugs: Vec<Bug> = self.bugs.read().await.values().cloned().collect();
        Ok(slice_page(bugs, request))
    }

    async fn count_all(&self) -> Result<u64, ApiError> {
        Ok(self.bugs.read().await.len() as u64)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bug>, ApiError> {
        Ok(self.bugs.read().await.get(&id).cloned())
    }

    async fn insert(&self, bug: &Bug) -> Result<(), ApiError> {
        self.bugs.write().await.insert(bug.id, bug.clone());
        Ok(())
    }

    async fn replace(&self, bug: &Bug) -> Result<bool, ApiError> {
        let mut bugs = self.bugs.write().await;
        match bugs.get_mut(&bug.id) {
            Some(stored) => {
                *stored = bug.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ApiError> {
        Ok(self.bugs.write().await.remove(&id).is_some())
    }
}
