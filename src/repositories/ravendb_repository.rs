//! Bug repository for RavenDB, spoken to over its HTTP API.
//!
//! Pages are RQL queries against the `Bugs` collection; the total comes from
//! the collection statistics endpoint.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::constants::{ERR_MALFORMED_DOCUMENT, RAVEN_COLLECTION, RAVEN_DATABASE};
use crate::errors::ApiError;
use crate::models::Bug;
use crate::pagination::PageRequest;
use crate::repositories::http::{ensure_success, success_or_not_found, HttpEndpoint};
use crate::repositories::BugRepository;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RavenMetadata {
    #[serde(rename = "@collection")]
    collection: String,
    #[serde(rename = "@id", default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RavenBugDocument {
    title: String,
    description: String,
    report_time: DateTime<Utc>,
    #[serde(rename = "@metadata")]
    metadata: RavenMetadata,
}

impl From<&Bug> for RavenBugDocument {
    fn from(bug: &Bug) -> Self {
        Self {
            title: bug.title.clone(),
            description: bug.description.clone(),
            report_time: bug.report_time,
            metadata: RavenMetadata {
                collection: RAVEN_COLLECTION.to_string(),
                id: None,
            },
        }
    }
}

impl TryFrom<RavenBugDocument> for Bug {
    type Error = ApiError;

    fn try_from(document: RavenBugDocument) -> Result<Self, Self::Error> {
        let raw_id = document.metadata.id.unwrap_or_default();
        let id = Uuid::parse_str(&raw_id).map_err(|_| {
            ApiError::BackendOperationFailed(format!("{}: @id {}", ERR_MALFORMED_DOCUMENT, raw_id))
        })?;
        Ok(Bug {
            id,
            title: document.title,
            description: document.description,
            report_time: document.report_time,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QueryResult {
    results: Vec<RavenBugDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DocumentsResult {
    results: Vec<Option<RavenBugDocument>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CollectionStats {
    #[serde(default)]
    collections: HashMap<String, u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DatabaseNames {
    databases: Vec<String>,
}

/// RQL query body for one title-ordered page.
pub fn page_query(request: &PageRequest) -> Value {
    let direction = if request.sort.is_descending() {
        " desc"
    } else {
        ""
    };
    json!({
        "Query": format!(
            "from {} order by title{} limit $skip, $take",
            RAVEN_COLLECTION, direction
        ),
        "QueryParameters": {
            "skip": request.skip(),
            "take": request.page_size,
        },
    })
}

pub struct RavenDbBugRepository {
    endpoint: HttpEndpoint,
}

impl RavenDbBugRepository {
    pub fn new(endpoint: HttpEndpoint) -> Self {
        Self { endpoint }
    }

    fn docs_path() -> String {
        format!("databases/{}/docs", RAVEN_DATABASE)
    }
}

#[async_trait]
impl BugRepository for RavenDbBugRepository {
    async fn ensure_schema(&self) -> Result<(), ApiError> {
        let names: DatabaseNames = ensure_success(
            self.endpoint
                .request(Method::GET, "databases")?
                .query(&[("namesOnly", "true")])
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;

        if !names.databases.iter().any(|name| name == RAVEN_DATABASE) {
            info!("Creating RavenDB database '{}'...", RAVEN_DATABASE);
            let response = self
                .endpoint
                .request(Method::PUT, "admin/databases")?
                .query(&[("name", RAVEN_DATABASE), ("replicationFactor", "1")])
                .json(&json!({ "DatabaseName": RAVEN_DATABASE }))
                .send()
                .await?;
            // 409: created concurrently by another instance
            if response.status() != StatusCode::CONFLICT {
                ensure_success(response).await?;
            }
        }

        info!("RavenDB database '{}' is ready", RAVEN_DATABASE);
        Ok(())
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Bug>, ApiError> {
        let query = page_query(request);
        debug!("RavenDB: {}", query);

        let result: QueryResult = ensure_success(
            self.endpoint
                .request(Method::POST, &format!("databases/{}/queries", RAVEN_DATABASE))?
                .json(&query)
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;

        result.results.into_iter().map(Bug::try_from).collect()
    }

    async fn count_all(&self) -> Result<u64, ApiError> {
        let stats: CollectionStats = ensure_success(
            self.endpoint
                .request(
                    Method::GET,
                    &format!("databases/{}/collections/stats", RAVEN_DATABASE),
                )?
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;

        Ok(stats.collections.get(RAVEN_COLLECTION).copied().unwrap_or(0))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bug>, ApiError> {
        debug!("RavenDB: finding bug by ID: {}", id);
        let response = self
            .endpoint
            .request(Method::GET, &Self::docs_path())?
            .query(&[("id", id.to_string())])
            .send()
            .await?;

        let Some(response) = success_or_not_found(response).await? else {
            return Ok(None);
        };
        let result: DocumentsResult = response.json().await?;
        result
            .results
            .into_iter()
            .flatten()
            .next()
            .map(Bug::try_from)
            .transpose()
    }

    async fn insert(&self, bug: &Bug) -> Result<(), ApiError> {
        ensure_success(
            self.endpoint
                .request(Method::PUT, &Self::docs_path())?
                .query(&[("id", bug.id.to_string())])
                .json(&RavenBugDocument::from(bug))
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    async fn replace(&self, bug: &Bug) -> Result<bool, ApiError> {
        if self.find_by_id(bug.id).await?.is_none() {
            return Ok(false);
        }
        self.insert(bug).await?;
        Ok(true)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ApiError> {
        // DELETE answers 204 whether or not the document existed
        if self.find_by_id(id).await?.is_none() {
            return Ok(false);
        }
        ensure_success(
            self.endpoint
                .request(Method::DELETE, &Self::docs_path())?
                .query(&[("id", id.to_string())])
                .send()
                .await?,
        )
        .await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_query() {
        let ascending = PageRequest::normalize(Some(3), Some(10), Some(true));
        let query = page_query(&ascending);
        assert_eq!(query["Query"], "from Bugs order by title limit $skip, $take");
        assert_eq!(query["QueryParameters"]["skip"], 20);
        assert_eq!(query["QueryParameters"]["take"], 10);

        let descending = PageRequest::normalize(None, None, Some(false));
        assert_eq!(
            page_query(&descending)["Query"],
            "from Bugs order by title desc limit $skip, $take"
        );
    }

    #[test]
    fn test_document_id_comes_from_metadata() {
        let id = Uuid::new_v4();
        let document: RavenBugDocument = serde_json::from_value(json!({
            "title": "Crash",
            "description": "On start",
            "report_time": "2024-01-15T10:30:00Z",
            "@metadata": { "@collection": "Bugs", "@id": id.to_string() }
        }))
        .unwrap();

        assert_eq!(Bug::try_from(document).unwrap().id, id);
    }
}
