//! Bug repository for CouchDB, spoken to over its HTTP API.
//!
//! Pages come from a Mango `_find` query; the total is read from a reduce
//! view (`_design/bug/_view/count`) that `ensure_schema` provisions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::constants::{
    COUCH_COUNT_VIEW, COUCH_DATABASE, COUCH_DESIGN_DOC, COUCH_INDEX_TITLE, ERR_MALFORMED_DOCUMENT,
};
use crate::errors::ApiError;
use crate::models::Bug;
use crate::pagination::PageRequest;
use crate::repositories::http::{ensure_success, success_or_not_found, HttpEndpoint};
use crate::repositories::BugRepository;

/// Map function of the count view. Counts exactly the documents the `_find`
/// selector (`title > null`) pages over, empty titles and descriptions included.
const COUNT_MAP_FUNCTION: &str =
    "function(doc) { if (doc.title !== undefined && doc.title !== null) { emit(doc._id, 1); } }";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CouchBugDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_rev", default, skip_serializing_if = "Option::is_none")]
    rev: Option<String>,
    title: String,
    description: String,
    report_time: DateTime<Utc>,
}

impl CouchBugDocument {
    fn from_bug(bug: &Bug, rev: Option<String>) -> Self {
        Self {
            id: bug.id.to_string(),
            rev,
            title: bug.title.clone(),
            description: bug.description.clone(),
            report_time: bug.report_time,
        }
    }
}

impl TryFrom<CouchBugDocument> for Bug {
    type Error = ApiError;

    fn try_from(document: CouchBugDocument) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&document.id).map_err(|_| {
            ApiError::BackendOperationFailed(format!(
                "{}: _id {}",
                ERR_MALFORMED_DOCUMENT, document.id
            ))
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
struct FindResult {
    docs: Vec<CouchBugDocument>,
}

#[derive(Debug, Deserialize)]
struct CountView {
    rows: Vec<CountRow>,
}

#[derive(Debug, Deserialize)]
struct CountRow {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct IndexList {
    indexes: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
struct IndexEntry {
    name: String,
}

/// Mango query body for one title-ordered page.
pub fn find_query(request: &PageRequest) -> Value {
    let direction = if request.sort.is_descending() {
        "desc"
    } else {
        "asc"
    };
    json!({
        "selector": { "title": { "$gt": null } },
        "fields": ["_id", "_rev", "title", "description", "report_time"],
        "limit": request.page_size,
        "skip": request.skip(),
        "sort": [{ "title": direction }],
    })
}

/// Whether a stored design document already carries the current count view.
pub fn count_view_is_current(design: &Value) -> bool {
    design["views"][COUCH_COUNT_VIEW]["map"] == COUNT_MAP_FUNCTION
        && design["views"][COUCH_COUNT_VIEW]["reduce"] == "_count"
}

/// Design document holding the `_count` reduce view.
pub fn count_design_document() -> Value {
    json!({
        "_id": format!("_design/{}", COUCH_DESIGN_DOC),
        "language": "javascript",
        "views": {
            COUCH_COUNT_VIEW: {
                "map": COUNT_MAP_FUNCTION,
                "reduce": "_count",
            }
        }
    })
}

pub struct CouchDbBugRepository {
    endpoint: HttpEndpoint,
}

impl CouchDbBugRepository {
    pub fn new(endpoint: HttpEndpoint) -> Self {
        Self { endpoint }
    }

    fn doc_path(id: Uuid) -> String {
        format!("{}/{}", COUCH_DATABASE, id)
    }

    /// Current document with its revision, if any.
    async fn fetch_document(&self, id: Uuid) -> Result<Option<CouchBugDocument>, ApiError> {
        let response = self
            .endpoint
            .request(Method::GET, &Self::doc_path(id))?
            .send()
            .await?;
        match success_or_not_found(response).await? {
            Some(response) => Ok(Some(response.json().await?)),
            None => Ok(None),
        }
    }

    async fn ensure_database(&self) -> Result<(), ApiError> {
        let databases: Vec<String> = ensure_success(
            self.endpoint
                .request(Method::GET, "_all_dbs")?
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;

        if databases.iter().any(|name| name == COUCH_DATABASE) {
            return Ok(());
        }

        info!("Creating CouchDB database '{}'...", COUCH_DATABASE);
        let response = self
            .endpoint
            .request(Method::PUT, COUCH_DATABASE)?
            .send()
            .await?;
        // 412: created concurrently by another instance
        if response.status() != StatusCode::PRECONDITION_FAILED {
            ensure_success(response).await?;
        }
        Ok(())
    }

    async fn ensure_title_index(&self) -> Result<(), ApiError> {
        let path = format!("{}/_index", COUCH_DATABASE);
        let indexes: IndexList = ensure_success(
            self.endpoint.request(Method::GET, &path)?.send().await?,
        )
        .await?
        .json()
        .await?;

        if indexes.indexes.iter().any(|i| i.name == COUCH_INDEX_TITLE) {
            return Ok(());
        }

        info!("Creating CouchDB index '{}'...", COUCH_INDEX_TITLE);
        let index = json!({
            "index": { "fields": ["title"] },
            "name": COUCH_INDEX_TITLE,
            "type": "json",
        });
        ensure_success(
            self.endpoint
                .request(Method::POST, &path)?
                .json(&index)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    async fn ensure_count_view(&self) -> Result<(), ApiError> {
        let path = format!("{}/_design/{}", COUCH_DATABASE, COUCH_DESIGN_DOC);
        let response = self.endpoint.request(Method::GET, &path)?.send().await?;

        let mut design = count_design_document();
        match success_or_not_found(response).await? {
            None => info!("Creating CouchDB design document '{}'...", COUCH_DESIGN_DOC),
            Some(response) => {
                let stored: Value = response.json().await?;
                if count_view_is_current(&stored) {
                    return Ok(());
                }
                info!("Updating stale CouchDB design document '{}'...", COUCH_DESIGN_DOC);
                design["_rev"] = stored["_rev"].clone();
            }
        }

        ensure_success(
            self.endpoint
                .request(Method::PUT, &path)?
                .json(&design)
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl BugRepository for CouchDbBugRepository {
    async fn ensure_schema(&self) -> Result<(), ApiError> {
        self.ensure_database().await?;
        self.ensure_title_index().await?;
        self.ensure_count_view().await?;
        info!("CouchDB database '{}' is ready", COUCH_DATABASE);
        Ok(())
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Bug>, ApiError> {
        let query = find_query(request);
        debug!("CouchDB: _find {}", query);

        let result: FindResult = ensure_success(
            self.endpoint
                .request(Method::POST, &format!("{}/_find", COUCH_DATABASE))?
                .json(&query)
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;

        result.docs.into_iter().map(Bug::try_from).collect()
    }

    async fn count_all(&self) -> Result<u64, ApiError> {
        let path = format!(
            "{}/_design/{}/_view/{}",
            COUCH_DATABASE, COUCH_DESIGN_DOC, COUCH_COUNT_VIEW
        );
        let view: CountView = ensure_success(
            self.endpoint.request(Method::GET, &path)?.send().await?,
        )
        .await?
        .json()
        .await?;

        // An empty database reduces to no rows at all
        Ok(view.rows.first().map(|row| row.value).unwrap_or(0))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bug>, ApiError> {
        debug!("CouchDB: finding bug by ID: {}", id);
        self.fetch_document(id)
            .await?
            .map(Bug::try_from)
            .transpose()
    }

    async fn insert(&self, bug: &Bug) -> Result<(), ApiError> {
        ensure_success(
            self.endpoint
                .request(Method::PUT, &Self::doc_path(bug.id))?
                .json(&CouchBugDocument::from_bug(bug, None))
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    async fn replace(&self, bug: &Bug) -> Result<bool, ApiError> {
        let Some(current) = self.fetch_document(bug.id).await? else {
            return Ok(false);
        };

        ensure_success(
            self.endpoint
                .request(Method::PUT, &Self::doc_path(bug.id))?
                .json(&CouchBugDocument::from_bug(bug, current.rev))
                .send()
                .await?,
        )
        .await?;
        Ok(true)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ApiError> {
        let Some(current) = self.fetch_document(id).await? else {
            return Ok(false);
        };

        let response = self
            .endpoint
            .request(Method::DELETE, &Self::doc_path(id))?
            .query(&[("rev", current.rev.unwrap_or_default())])
            .send()
            .await?;
        Ok(success_or_not_found(response).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_query_for_second_page_descending() {
        let request = PageRequest::normalize(Some(2), Some(5), Some(false));
        let query = find_query(&request);

        assert_eq!(query["limit"], 5);
        assert_eq!(query["skip"], 5);
        assert_eq!(query["sort"], json!([{ "title": "desc" }]));
        assert_eq!(query["selector"], json!({ "title": { "$gt": null } }));
    }

    #[test]
    fn test_count_design_document_uses_builtin_reduce() {
        let design = count_design_document();
        assert_eq!(design["_id"], "_design/bug");
        assert_eq!(design["views"]["count"]["reduce"], "_count");
        assert!(count_view_is_current(&design));
    }

    #[test]
    fn test_count_view_counts_bugs_with_empty_description() {
        let map = count_design_document()["views"]["count"]["map"]
            .as_str()
            .unwrap()
            .to_string();
        // JavaScript truthiness would skip "" values
        assert!(!map.contains("doc.description"));
        assert!(!map.contains("if (doc.title &&"));
        assert!(map.contains("doc.title !== undefined"));
    }

    #[test]
    fn test_stale_count_view_is_detected() {
        let stale = json!({
            "_id": "_design/bug",
            "_rev": "1-abc",
            "views": { "count": {
                "map": "function(doc) { if (doc.title && doc.description) { emit(doc._id, 1); } }",
                "reduce": "_count"
            } }
        });
        assert!(!count_view_is_current(&stale));
        assert!(!count_view_is_current(&json!({ "_id": "_design/bug" })));
    }
}
