//! Route table: one `/{backend}/bug` group per mounted backend, plus health
//! and the OpenAPI document.

use actix_web::{web, HttpResponse};
use tokio_util::sync::CancellationToken;
use utoipa::OpenApi;

use crate::constants::{ERR_BUG_NOT_FOUND, MSG_SERVER_RUNNING};
use crate::errors::ApiError;
use crate::handlers;
use crate::middleware::BugActionLogger;
use crate::models::HealthResponse;
use crate::openapi::ApiDoc;
use crate::repositories::Backend;
use crate::services::BugService;

/// Backends served by this process, in mount order.
#[derive(Debug, Clone)]
pub struct MountedBackends(pub Vec<Backend>);

/// Register every route. `shutdown` is the root token that per-request
/// tokens are derived from.
pub fn configure_routes(
    cfg: &mut web::ServiceConfig,
    services: &[web::Data<BugService>],
    shutdown: &CancellationToken,
) {
    let mounted = MountedBackends(services.iter().map(|s| s.backend()).collect());

    cfg.app_data(web::Data::new(shutdown.clone()))
        .app_data(web::Data::new(mounted))
        // Extractor failures render as ErrorResponse JSON like every other error
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            ApiError::BadRequest(err.to_string()).into()
        }))
        .app_data(web::JsonConfig::default().error_handler(|err, _req| {
            ApiError::BadRequest(err.to_string()).into()
        }))
        // A malformed id cannot name a stored bug
        .app_data(web::PathConfig::default().error_handler(|_err, _req| {
            ApiError::NotFound(ERR_BUG_NOT_FOUND.to_string()).into()
        }))
        .route("/health", web::get().to(health_check))
        .route("/api-docs/openapi.json", web::get().to(openapi_json));

    for service in services {
        let backend = service.backend();
        // GET|POST /{backend}/bug and GET|PUT|DELETE /{backend}/bug/{id}
        cfg.service(
            web::scope(&backend.route_prefix())
                .app_data(service.clone())
                .wrap(BugActionLogger::new(backend))
                .service(
                    web::resource(["", "/"])
                        .route(web::get().to(handlers::get_bugs))
                        .route(web::post().to(handlers::create_bug)),
                )
                .service(
                    web::resource("/{id}")
                        .name(&backend.by_id_route_name())
                        .route(web::get().to(handlers::get_bug))
                        .route(web::put().to(handlers::update_bug))
                        .route(web::delete().to(handlers::delete_bug)),
                ),
        );
    }
}

/// Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Server is running", body = HealthResponse)
    )
)]
pub async fn health_check(mounted: web::Data<MountedBackends>) -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "OK".to_string(),
        message: MSG_SERVER_RUNNING.to_string(),
        backends: mounted.0.iter().map(|b| b.as_str().to_string()).collect(),
    })
}

async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
