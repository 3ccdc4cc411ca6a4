//! Bug repository for Couchbase.
//!
//! Data access goes through the N1QL query service; provisioning of the
//! bucket, scope and collection goes through the cluster management API.
//! Count and page are separate round trips and, Couchbase being eventually
//! consistent, may disagree under concurrent writes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::constants::{
    COUCHBASE_BUCKET, COUCHBASE_BUCKET_RAM_QUOTA_MB, COUCHBASE_COLLECTION,
    COUCHBASE_PRIMARY_INDEX, COUCHBASE_SCOPE, COUCHBASE_TITLE_INDEX,
};
use crate::errors::ApiError;
use crate::models::Bug;
use crate::pagination::PageRequest;
use crate::repositories::http::{ensure_success, success_or_not_found, HttpEndpoint};
use crate::repositories::BugRepository;

const QUERY_SERVICE_PATH: &str = "query/service";

/// Document body stored under the bug's id.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CouchbaseBugDocument {
    id: Uuid,
    title: String,
    description: String,
    report_time: DateTime<Utc>,
}

impl From<&Bug> for CouchbaseBugDocument {
    fn from(bug: &Bug) -> Self {
        Self {
            id: bug.id,
            title: bug.title.clone(),
            description: bug.description.clone(),
            report_time: bug.report_time,
        }
    }
}

impl From<CouchbaseBugDocument> for Bug {
    fn from(document: CouchbaseBugDocument) -> Self {
        Bug {
            id: document.id,
            title: document.title,
            description: document.description,
            report_time: document.report_time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse<T> {
    status: String,
    #[serde(default = "Vec::new")]
    results: Vec<T>,
    #[serde(default)]
    errors: Vec<QueryError>,
}

#[derive(Debug, Deserialize)]
struct QueryError {
    code: i64,
    msg: String,
}

#[derive(Debug, Deserialize)]
struct CountResult {
    count: u64,
}

#[derive(Debug, Deserialize)]
struct ScopeList {
    scopes: Vec<ScopeEntry>,
}

#[derive(Debug, Deserialize)]
struct ScopeEntry {
    name: String,
    #[serde(default)]
    collections: Vec<CollectionEntry>,
}

#[derive(Debug, Deserialize)]
struct CollectionEntry {
    name: String,
}

/// Fully qualified, escaped keyspace of the bugs collection.
pub fn keyspace() -> String {
    format!(
        "`{}`.`{}`.`{}`",
        COUCHBASE_BUCKET, COUCHBASE_SCOPE, COUCHBASE_COLLECTION
    )
}

/// N1QL statement for one title-ordered page. Args: `$1` limit, `$2` offset.
pub fn page_statement(request: &PageRequest) -> String {
    format!(
        "SELECT b.* FROM {} AS b ORDER BY b.title {} LIMIT $1 OFFSET $2",
        keyspace(),
        request.sort.as_sql()
    )
}

pub fn count_statement() -> String {
    format!("SELECT COUNT(*) AS count FROM {}", keyspace())
}

pub struct CouchbaseBugRepository {
    management: HttpEndpoint,
    query: HttpEndpoint,
}

impl CouchbaseBugRepository {
    /// `management` is the cluster REST API (port 8091), `query` the N1QL
    /// service (port 8093).
    pub fn new(management: HttpEndpoint, query: HttpEndpoint) -> Self {
        Self { management, query }
    }

    /// Run one N1QL statement with positional arguments.
    async fn run<T: DeserializeOwned>(
        &self,
        statement: &str,
        args: Vec<Value>,
    ) -> Result<Vec<T>, ApiError> {
        debug!("Couchbase: {} {:?}", statement, args);
        let body = json!({ "statement": statement, "args": args });

        let response: QueryResponse<T> = ensure_success(
            self.query
                .request(Method::POST, QUERY_SERVICE_PATH)?
                .json(&body)
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;

        if response.status != "success" {
            let messages: Vec<String> = response
                .errors
                .iter()
                .map(|e| format!("{} {}", e.code, e.msg))
                .collect();
            return Err(ApiError::BackendOperationFailed(format!(
                "{}: {}",
                response.status,
                messages.join("; ")
            )));
        }
        Ok(response.results)
    }

    async fn ensure_bucket(&self) -> Result<(), ApiError> {
        let path = format!("pools/default/buckets/{}", COUCHBASE_BUCKET);
        let response = self.management.request(Method::GET, &path)?.send().await?;
        if success_or_not_found(response).await?.is_some() {
            return Ok(());
        }

        info!("Creating Couchbase bucket '{}'...", COUCHBASE_BUCKET);
        let ram_quota = COUCHBASE_BUCKET_RAM_QUOTA_MB.to_string();
        ensure_success(
            self.management
                .request(Method::POST, "pools/default/buckets")?
                .form(&[
                    ("name", COUCHBASE_BUCKET),
                    ("ramQuotaMB", ram_quota.as_str()),
                    ("bucketType", "couchbase"),
                ])
                .send()
                .await?,
        )
        .await?;
        Ok(())
    }

    async fn ensure_scope_and_collection(&self) -> Result<(), ApiError> {
        let scopes_path = format!("pools/default/buckets/{}/scopes", COUCHBASE_BUCKET);
        let scopes: ScopeList = ensure_success(
            self.management
                .request(Method::GET, &scopes_path)?
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;

        let scope = scopes.scopes.iter().find(|s| s.name == COUCHBASE_SCOPE);
        if scope.is_none() {
            info!("Creating Couchbase scope '{}'...", COUCHBASE_SCOPE);
            ensure_success(
                self.management
                    .request(Method::POST, &scopes_path)?
                    .form(&[("name", COUCHBASE_SCOPE)])
                    .send()
                    .await?,
            )
            .await?;
        }

        let has_collection = scope
            .map(|s| s.collections.iter().any(|c| c.name == COUCHBASE_COLLECTION))
            .unwrap_or(false);
        if !has_collection {
            info!("Creating Couchbase collection '{}'...", COUCHBASE_COLLECTION);
            ensure_success(
                self.management
                    .request(
                        Method::POST,
                        &format!("{}/{}/collections", scopes_path, COUCHBASE_SCOPE),
                    )?
                    .form(&[("name", COUCHBASE_COLLECTION)])
                    .send()
                    .await?,
            )
            .await?;
        }
        Ok(())
    }

    async fn ensure_indexes(&self) -> Result<(), ApiError> {
        let statements = [
            format!(
                "CREATE PRIMARY INDEX IF NOT EXISTS `{}` ON {}",
                COUCHBASE_PRIMARY_INDEX,
                keyspace()
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS `{}` ON {}(title)",
                COUCHBASE_TITLE_INDEX,
                keyspace()
            ),
        ];
        for statement in &statements {
            self.run::<Value>(statement, Vec::new()).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl BugRepository for CouchbaseBugRepository {
    async fn ensure_schema(&self) -> Result<(), ApiError> {
        self.ensure_bucket().await?;
        self.ensure_scope_and_collection().await?;
        // Freshly created collections take a moment to become queryable
        if let Err(e) = self.ensure_indexes().await {
            warn!("Couchbase index creation failed, retry on next start: {}", e);
        }
        info!("Couchbase keyspace {} is ready", keyspace());
        Ok(())
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Bug>, ApiError> {
        let documents: Vec<CouchbaseBugDocument> = self
            .run(
                &page_statement(request),
                vec![json!(request.limit()), json!(request.skip())],
            )
            .await?;
        Ok(documents.into_iter().map(Bug::from).collect())
    }

    async fn count_all(&self) -> Result<u64, ApiError> {
        let rows: Vec<CountResult> = self.run(&count_statement(), Vec::new()).await?;
        Ok(rows.first().map(|row| row.count).unwrap_or(0))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bug>, ApiError> {
        let statement = format!("SELECT b.* FROM {} AS b USE KEYS $1", keyspace());
        let documents: Vec<CouchbaseBugDocument> =
            self.run(&statement, vec![json!(id.to_string())]).await?;
        Ok(documents.into_iter().next().map(Bug::from))
    }

    async fn insert(&self, bug: &Bug) -> Result<(), ApiError> {
        let statement = format!("INSERT INTO {} (KEY, VALUE) VALUES ($1, $2)", keyspace());
        self.run::<Value>(
            &statement,
            vec![
                json!(bug.id.to_string()),
                json!(CouchbaseBugDocument::from(bug)),
            ],
        )
        .await?;
        Ok(())
    }

    async fn replace(&self, bug: &Bug) -> Result<bool, ApiError> {
        let statement = format!(
            "UPDATE {} AS b USE KEYS $1 SET b.title = $2, b.description = $3, b.report_time = $4 RETURNING META(b).id",
            keyspace()
        );
        let updated: Vec<Value> = self
            .run(
                &statement,
                vec![
                    json!(bug.id.to_string()),
                    json!(bug.title),
                    json!(bug.description),
                    json!(bug.report_time),
                ],
            )
            .await?;
        Ok(!updated.is_empty())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ApiError> {
        let statement = format!(
            "DELETE FROM {} AS b USE KEYS $1 RETURNING META(b).id",
            keyspace()
        );
        let deleted: Vec<Value> = self.run(&statement, vec![json!(id.to_string())]).await?;
        Ok(!deleted.is_empty())
    }
}
