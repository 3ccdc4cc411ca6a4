//! Builds the repository for a configured backend.
//!
//! Construction only opens clients; provisioning is left to
//! [`BugRepository::ensure_schema`], which the caller runs once at startup.

use log::info;
use std::sync::Arc;

use crate::config::Config;
use crate::errors::ApiError;
use crate::repositories::http::HttpEndpoint;
use crate::repositories::{
    Backend, BugRepository, CouchDbBugRepository, CouchbaseBugRepository, MemoryBugRepository,
    MongoBugRepository, RavenDbBugRepository, SqlBugRepository,
};

/// Open a client handle for `backend` using the connection settings in `config`.
pub async fn connect(
    backend: Backend,
    config: &Config,
) -> Result<Arc<dyn BugRepository>, ApiError> {
    info!("Connecting to {} backend...", backend);

    let repository: Arc<dyn BugRepository> = match backend {
        Backend::Memory => Arc::new(MemoryBugRepository::new()),
        Backend::Sql => Arc::new(SqlBugRepository::connect(&config.sql_url).await?),
        Backend::MongoDb => Arc::new(
            MongoBugRepository::connect(&config.mongodb_uri, &config.mongodb_database).await?,
        ),
        Backend::FerretDb => Arc::new(
            MongoBugRepository::connect(&config.ferretdb_uri, &config.mongodb_database).await?,
        ),
        Backend::CouchDb => Arc::new(CouchDbBugRepository::new(HttpEndpoint::from_uri(
            &config.couchdb_uri,
            config.backend_timeout,
        )?)),
        Backend::Couchbase => {
            let management =
                HttpEndpoint::from_uri(&config.couchbase_uri, config.backend_timeout)?;
            let query = HttpEndpoint::from_uri(&config.couchbase_query_uri, config.backend_timeout)?
                .inherit_credentials(&management);
            Arc::new(CouchbaseBugRepository::new(management, query))
        }
        Backend::RavenDb => Arc::new(RavenDbBugRepository::new(HttpEndpoint::from_uri(
            &config.ravendb_uri,
            config.backend_timeout,
        )?)),
    };

    Ok(repository)
}
