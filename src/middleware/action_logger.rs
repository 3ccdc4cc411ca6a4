//! Logs the start and end of every action on a bug.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::{info, warn};
use std::rc::Rc;
use std::time::Instant;

use crate::repositories::Backend;

/// Wraps one backend's route group and brackets each request with
/// "Started"/"Finished" log lines.
#[derive(Debug, Clone, Copy)]
pub struct BugActionLogger {
    backend: Backend,
}

impl BugActionLogger {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BugActionLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = BugActionLoggerService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(BugActionLoggerService {
            service: Rc::new(service),
            backend: self.backend,
        })
    }
}

pub struct BugActionLoggerService<S> {
    service: Rc<S>,
    backend: Backend,
}

impl<S, B> Service<ServiceRequest> for BugActionLoggerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let backend = self.backend;
        let action = format!("{} {}", req.method(), req.path());

        Box::pin(async move {
            let started = Instant::now();
            info!("[{}] Started action on a bug: {}", backend, action);

            let result = service.call(req).await;
            let elapsed = started.elapsed();
            match &result {
                Ok(res) => info!(
                    "[{}] Finished action on a bug: {} -> {} in {:?}",
                    backend,
                    action,
                    res.status(),
                    elapsed
                ),
                Err(e) => warn!(
                    "[{}] Finished action on a bug: {} failed in {:?}: {}",
                    backend, action, elapsed, e
                ),
            }
            result
        })
    }
}
