use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info};
use std::io;
use tokio_util::sync::CancellationToken;

use squash::config::Config;
use squash::repositories::connect;
use squash::routes;
use squash::services::BugService;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize environment variables and logger
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(io::Error::other)?;

    let mut services = Vec::with_capacity(config.enabled_backends.len());
    for &backend in &config.enabled_backends {
        let repository = connect(backend, &config).await.map_err(|e| {
            error!("Failed to connect to {} backend: {}", backend, e);
            io::Error::other(e)
        })?;
        let service = BugService::new(backend, repository);
        service.ensure_schema().await.map_err(|e| {
            error!("Failed to prepare {} backend: {}", backend, e);
            io::Error::other(e)
        })?;
        info!("Mounted {} backend at {}", backend, backend.route_prefix());
        services.push(web::Data::new(service));
    }

    let shutdown = CancellationToken::new();
    let server_addr = config.server_addr();
    info!("Starting server at http://{}", server_addr);

    let app_shutdown = shutdown.clone();
    let result = HttpServer::new(move || {
        let services = services.clone();
        let shutdown = app_shutdown.clone();
        App::new()
            .wrap(Logger::default())
            .configure(move |cfg| routes::configure_routes(cfg, &services, &shutdown))
    })
    .bind(&server_addr)?
    .run()
    .await;

    // Cancel backend calls that outlived the workers
    shutdown.cancel();
    result
}
