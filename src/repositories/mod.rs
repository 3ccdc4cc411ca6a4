//! Repository layer for database operations.
//!
//! Every storage backend implements [`BugRepository`]; the service layer only
//! ever sees an `Arc<dyn BugRepository>` chosen at startup by configuration.

pub mod couchbase_repository;
pub mod couchdb_repository;
pub mod factory;
pub mod http;
pub mod memory_repository;
pub mod mongo_repository;
pub mod ravendb_repository;
pub mod sql_repository;

use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::Bug;
use crate::pagination::PageRequest;

pub use couchbase_repository::CouchbaseBugRepository;
pub use couchdb_repository::CouchDbBugRepository;
pub use factory::connect;
pub use memory_repository::MemoryBugRepository;
pub use mongo_repository::MongoBugRepository;
pub use ravendb_repository::RavenDbBugRepository;
pub use sql_repository::SqlBugRepository;

/// Storage backend behind a route group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// In-process map, for development and tests
    Memory,
    /// Relational store through sqlx
    Sql,
    MongoDb,
    /// MongoDB wire protocol on top of another engine
    FerretDb,
    CouchDb,
    Couchbase,
    RavenDb,
}

impl Backend {
    pub const ALL: [Backend; 7] = [
        Backend::Memory,
        Backend::Sql,
        Backend::MongoDb,
        Backend::FerretDb,
        Backend::CouchDb,
        Backend::Couchbase,
        Backend::RavenDb,
    ];

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::Sql => "sql",
            Backend::MongoDb => "mongodb",
            Backend::FerretDb => "ferretdb",
            Backend::CouchDb => "couchdb",
            Backend::Couchbase => "couchbase",
            Backend::RavenDb => "ravendb",
        }
    }

    /// Path prefix of the backend's route group.
    pub fn route_prefix(&self) -> String {
        format!("/{}/bug", self.as_str())
    }

    /// Name of the backend's by-id route, used for `Location` headers.
    pub fn by_id_route_name(&self) -> String {
        format!("{}_bug_by_id", self.as_str())
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "inmemory" => Ok(Backend::Memory),
            "sql" | "sqlite" => Ok(Backend::Sql),
            "mongodb" | "mongo" => Ok(Backend::MongoDb),
            "ferretdb" | "ferret" => Ok(Backend::FerretDb),
            "couchdb" | "couch" => Ok(Backend::CouchDb),
            "couchbase" => Ok(Backend::Couchbase),
            "ravendb" | "raven" => Ok(Backend::RavenDb),
            _ => Err(ApiError::BadRequest(format!("Unknown backend: {}", s))),
        }
    }
}

/// Capability set shared by every storage backend.
///
/// `fetch_page` and `count_all` are independent reads; callers must not
/// assume the count matches the page under concurrent writes.
#[async_trait]
pub trait BugRepository: Send + Sync {
    /// One-time, idempotent provisioning of whatever the backend needs
    /// (database, table, collection, indexes, views). Called once at startup.
    async fn ensure_schema(&self) -> Result<(), ApiError>;

    /// Fetch one title-ordered page.
    async fn fetch_page(&self, request: &PageRequest) -> Result<Vec<Bug>, ApiError>;

    /// Count every stored bug.
    async fn count_all(&self) -> Result<u64, ApiError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Bug>, ApiError>;

    async fn insert(&self, bug: &Bug) -> Result<(), ApiError>;

    /// Replace a stored bug. Returns `false` when no bug has that id.
    async fn replace(&self, bug: &Bug) -> Result<bool, ApiError>;

    /// Returns `false` when no bug has that id.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_names_round_trip() {
        for backend in Backend::ALL {
            assert_eq!(backend.as_str().parse::<Backend>().unwrap(), backend);
        }
    }

    #[test]
    fn test_backend_aliases() {
        assert_eq!("SQLite".parse::<Backend>().unwrap(), Backend::Sql);
        assert_eq!(" mongo ".parse::<Backend>().unwrap(), Backend::MongoDb);
        assert!("mssql2".parse::<Backend>().is_err());
    }

    #[test]
    fn test_route_prefix() {
        assert_eq!(Backend::Couchbase.route_prefix(), "/couchbase/bug");
        assert_eq!(Backend::RavenDb.by_id_route_name(), "ravendb_bug_by_id");
    }
}
