//! Names of the databases, collections and indexes provisioned by each backend.

// SQL
pub const SQL_TABLE_BUGS: &str = "bugs";
pub const SQL_INDEX_TITLE: &str = "ix_bugs_title";

// MongoDB / FerretDB
pub const MONGO_DEFAULT_DATABASE: &str = "Squash";
pub const MONGO_COLLECTION_BUGS: &str = "bugs";
pub const MONGO_INDEX_TITLE: &str = "bugs_title";

// CouchDB
pub const COUCH_DATABASE: &str = "bugtracker";
pub const COUCH_INDEX_TITLE: &str = "bug_title";
pub const COUCH_DESIGN_DOC: &str = "bug";
pub const COUCH_COUNT_VIEW: &str = "count";

// Couchbase
pub const COUCHBASE_BUCKET: &str = "bugsStore";
pub const COUCHBASE_SCOPE: &str = "bugsScope";
pub const COUCHBASE_COLLECTION: &str = "bugsCollection";
pub const COUCHBASE_PRIMARY_INDEX: &str = "bugs-primary";
pub const COUCHBASE_TITLE_INDEX: &str = "bugs-title-secondary";
pub const COUCHBASE_BUCKET_RAM_QUOTA_MB: u32 = 100;

// RavenDB
pub const RAVEN_DATABASE: &str = "BugTracker";
pub const RAVEN_COLLECTION: &str = "Bugs";
