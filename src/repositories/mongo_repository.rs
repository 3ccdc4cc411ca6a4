//! Bug repository for MongoDB and MongoDB-compatible servers (FerretDB).
//!
//! This repository encapsulates all database access logic for the bugs
//! collection. Database and collection are created implicitly on first write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use log::{debug, info};
use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ERR_MALFORMED_DOCUMENT, MONGO_COLLECTION_BUGS, MONGO_INDEX_TITLE};
use crate::errors::ApiError;
use crate::models::Bug;
use crate::pagination::PageRequest;
use crate::repositories::BugRepository;

/// Bug document stored in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BugDocument {
    #[serde(rename = "_id")]
    id: String,
    title: String,
    description: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    report_time: DateTime<Utc>,
}

impl From<&Bug> for BugDocument {
    fn from(bug: &Bug) -> Self {
        Self {
            id: bug.id.to_string(),
            title: bug.title.clone(),
            description: bug.description.clone(),
            report_time: bug.report_time,
        }
    }
}

impl TryFrom<BugDocument> for Bug {
    type Error = ApiError;

    fn try_from(document: BugDocument) -> Result<Self, Self::Error> {
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

/// Sort specification for the title ordering.
pub fn sort_document(request: &PageRequest) -> Document {
    let direction = if request.sort.is_descending() { -1 } else { 1 };
    doc! { "title": direction }
}

fn id_filter(id: Uuid) -> Document {
    doc! { "_id": id.to_string() }
}

/// Repository for bug-related MongoDB operations.
pub struct MongoBugRepository {
    database: Database,
    collection: Collection<BugDocument>,
}

impl MongoBugRepository {
    /// Create a new repository on an existing database handle.
    pub fn new(database: &Database) -> Self {
        Self {
            database: database.clone(),
            collection: database.collection(MONGO_COLLECTION_BUGS),
        }
    }

    /// Connect to `uri` and use `database_name`.
    pub async fn connect(uri: &str, database_name: &str) -> Result<Self, ApiError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self::new(&client.database(database_name)))
    }
}

#[async_trait]
impl BugRepository for MongoBugRepository {
    async fn ensure_schema(&self) -> Result<(), ApiError> {
        self.database.run_command(doc! { "ping": 1 }).await?;

        info!(
            "Creating index '{}' for collection '{}'...",
            MONGO_INDEX_TITLE, MONGO_COLLECTION_BUGS
        );
        let index = IndexModel::builder()
            .keys(doc! { "title": 1 })
            .options(
                IndexOptions::builder()
                    .name(MONGO_INDEX_TITLE.to_string())
                    .build(),
            )
            .build();
        self.collection.create_index(index).await?;
        info!("Collection '{}' is ready", MONGO_COLLECTION_BUGS);
        Ok(())
    }

    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Bug>, ApiError> {
        let sort = sort_document(request);
        debug!(
            "Repository: finding bugs sorted by {:?}, skip {}, limit {}",
            sort,
            request.skip(),
            request.limit()
        );
        let cursor = self
            .collection
            .find(doc! {})
            .sort(sort)
            .skip(request.skip())
            .limit(request.limit())
            .await?;

        let documents: Vec<BugDocument> = cursor.try_collect().await?;
        documents.into_iter().map(Bug::try_from).collect()
    }

    async fn count_all(&self) -> Result<u64, ApiError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bug>, ApiError> {
        debug!("Repository: finding bug by ID: {}", id);
        self.collection
            .find_one(id_filter(id))
            .await?
            .map(Bug::try_from)
            .transpose()
    }

    async fn insert(&self, bug: &Bug) -> Result<(), ApiError> {
        self.collection.insert_one(BugDocument::from(bug)).await?;
        Ok(())
    }

    async fn replace(&self, bug: &Bug) -> Result<bool, ApiError> {
        let result = self
            .collection
            .replace_one(id_filter(bug.id), BugDocument::from(bug))
            .await?;
        Ok(result.matched_count == 1)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = self.collection.delete_one(id_filter(id)).await?;
        Ok(result.deleted_count == 1)
    }
}
