//! Bug handlers shared by every backend's route group.
//!
//! The backend is whatever `BugService` the enclosing scope registered as
//! app data, so one set of handlers serves `/memory/bug`, `/sql/bug`, ...

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info};
use tokio_util::sync::{CancellationToken, DropGuard};
use uuid::Uuid;

use crate::constants::{MSG_BUG_CREATED, MSG_BUG_DELETED, MSG_BUG_FOUND, MSG_BUG_UPDATED};
use crate::errors::ApiError;
use crate::models::{
    ApiResponse, BugResponse, CreateBugRequest, DeletedBugResponse, PageQuery, PageResponse,
    UpdateBugRequest,
};
use crate::pagination::PageOutcome;
use crate::services::BugService;

/// Per-request token, cancelled on server shutdown or when the request
/// future is dropped.
fn request_token(shutdown: &CancellationToken) -> (CancellationToken, DropGuard) {
    let token = shutdown.child_token();
    let guard = token.clone().drop_guard();
    (token, guard)
}

/// List bugs one page at a time, ordered by title
#[utoipa::path(
    get,
    path = "/{backend}/bug",
    tag = "Bugs",
    params(
        ("backend" = String, Path, description = "Backend: memory, sql, mongodb, ferretdb, couchdb, couchbase or ravendb"),
        PageQuery
    ),
    responses(
        (status = 200, description = "One page of bugs", body = PageResponse<BugResponse>),
        (status = 204, description = "The requested page is empty"),
        (status = 400, description = "Backend failure", body = crate::models::ErrorResponse)
    )
)]
pub async fn get_bugs(
    bug_service: web::Data<BugService>,
    shutdown: web::Data<CancellationToken>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let request = query.normalize();
    let (cancel, _guard) = request_token(&shutdown);

    match bug_service.get_paginated(request, &cancel).await? {
        PageOutcome::Content(page) => {
            let response = PageResponse::from(page.map(BugResponse::from));
            Ok(HttpResponse::Ok().json(response))
        }
        PageOutcome::Empty { total } => {
            debug!(
                "{}: page {} is empty (total {})",
                bug_service.backend(),
                request.page_number,
                total
            );
            Ok(HttpResponse::NoContent().finish())
        }
    }
}

/// Get a specific bug by ID
#[utoipa::path(
    get,
    path = "/{backend}/bug/{id}",
    tag = "Bugs",
    params(
        ("backend" = String, Path, description = "Backend name"),
        ("id" = Uuid, Path, description = "Bug ID")
    ),
    responses(
        (status = 200, description = "Bug found", body = BugResponse),
        (status = 404, description = "Bug not found", body = crate::models::ErrorResponse)
    )
)]
pub async fn get_bug(
    bug_service: web::Data<BugService>,
    shutdown: web::Data<CancellationToken>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let (cancel, _guard) = request_token(&shutdown);

    let bug = bug_service.get_by_id(id, &cancel).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MSG_BUG_FOUND, BugResponse::from(bug))))
}

/// Report a new bug
#[utoipa::path(
    post,
    path = "/{backend}/bug",
    tag = "Bugs",
    params(
        ("backend" = String, Path, description = "Backend name")
    ),
    request_body = CreateBugRequest,
    responses(
        (status = 201, description = "Bug created", body = BugResponse,
            headers(("Location" = String, description = "Path of the new bug"))),
        (status = 400, description = "Validation error or backend failure", body = crate::models::ErrorResponse)
    )
)]
pub async fn create_bug(
    bug_service: web::Data<BugService>,
    shutdown: web::Data<CancellationToken>,
    body: web::Json<CreateBugRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let (cancel, _guard) = request_token(&shutdown);

    let bug = bug_service.create(body.into_inner(), &cancel).await?;

    let backend = bug_service.backend();
    let location = req
        .url_for(&backend.by_id_route_name(), [bug.id.to_string()])
        .map(|url| url.path().to_string())
        .unwrap_or_else(|_| format!("{}/{}", backend.route_prefix(), bug.id));

    info!("Bug {} available at {}", bug.id, location);
    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, location))
        .json(ApiResponse::success(MSG_BUG_CREATED, BugResponse::from(bug))))
}

/// Update a bug's title and/or description
#[utoipa::path(
    put,
    path = "/{backend}/bug/{id}",
    tag = "Bugs",
    params(
        ("backend" = String, Path, description = "Backend name"),
        ("id" = Uuid, Path, description = "Bug ID")
    ),
    request_body = UpdateBugRequest,
    responses(
        (status = 200, description = "Bug updated", body = BugResponse),
        (status = 400, description = "Validation error or backend failure", body = crate::models::ErrorResponse),
        (status = 404, description = "Bug not found", body = crate::models::ErrorResponse)
    )
)]
pub async fn update_bug(
    bug_service: web::Data<BugService>,
    shutdown: web::Data<CancellationToken>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateBugRequest>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let (cancel, _guard) = request_token(&shutdown);

    let bug = bug_service.update(id, body.into_inner(), &cancel).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        MSG_BUG_UPDATED,
        BugResponse::from(bug),
    )))
}

/// Delete a bug
#[utoipa::path(
    delete,
    path = "/{backend}/bug/{id}",
    tag = "Bugs",
    params(
        ("backend" = String, Path, description = "Backend name"),
        ("id" = Uuid, Path, description = "Bug ID")
    ),
    responses(
        (status = 200, description = "Bug deleted", body = DeletedBugResponse),
        (status = 404, description = "Bug not found", body = crate::models::ErrorResponse)
    )
)]
pub async fn delete_bug(
    bug_service: web::Data<BugService>,
    shutdown: web::Data<CancellationToken>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let (cancel, _guard) = request_token(&shutdown);

    bug_service.delete(id, &cancel).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        MSG_BUG_DELETED,
        DeletedBugResponse { id },
    )))
}
