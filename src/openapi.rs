use utoipa::OpenApi;

use crate::models::{
    BugResponse, CreateBugRequest, DeletedBugResponse, ErrorResponse, HealthResponse,
    PageResponse, UpdateBugRequest,
};

/// OpenAPI documentation for the Squash bug tracker API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Squash Bug Tracker API",
        version = "1.0.0",
        description = "Bug tracker CRUD served over several storage backends, each mounted under /{backend}/bug with the same paging contract."
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Bugs", description = "Bug CRUD and paged listing, one route group per backend")
    ),
    paths(
        crate::handlers::get_bugs,
        crate::handlers::get_bug,
        crate::handlers::create_bug,
        crate::handlers::update_bug,
        crate::handlers::delete_bug,
        crate::routes::health_check
    ),
    components(
        schemas(
            CreateBugRequest,
            UpdateBugRequest,
            BugResponse,
            DeletedBugResponse,
            PageResponse<BugResponse>,
            ErrorResponse,
            HealthResponse
        )
    )
)]
pub struct ApiDoc;
