use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use sqlx::PgPool;
use std::{
    future::{Ready, ready},
    rc::Rc,
};

use crate::session::{SESSION_COOKIE, SessionService};
use crate::types::{AccountError, Identity};

/// Middleware that resolves the session cookie and attaches the account's
/// identity to the request context.
///
/// The middleware never rejects a request: routes that require a login use
/// the [`CurrentUser`] extractor, and routes where identity is optional use
/// [`MaybeUser`]. Ownership decisions stay with the handlers.
pub struct IdentityMiddleware {
    pool: PgPool,
}

impl IdentityMiddleware {
    /// Creates the middleware over the given database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl<S, B> Transform<S, ServiceRequest> for IdentityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = IdentityMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityMiddlewareService {
            service: Rc::new(service),
            pool: self.pool.clone(),
        }))
    }
}

/// Service that implements the identity-resolution middleware logic
pub struct IdentityMiddlewareService<S> {
    service: Rc<S>,
    pool: PgPool,
}

impl<S, B> Service<ServiceRequest> for IdentityMiddlewareService<S>
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
        let service = self.service.clone();
        let pool = self.pool.clone();

        Box::pin(async move {
            let token = req.cookie(SESSION_COOKIE).map(|c| c.value().to_string());

            if let Some(token) = token {
                match SessionService::new(pool).resolve(&token).await {
                    Ok(Some(identity)) => {
                        req.extensions_mut().insert(identity);
                    }
                    // Unknown or expired session token: proceed anonymously
                    Ok(None) => {}
                    Err(e) => {
                        log::warn!("Failed to resolve session token: {}", e);
                    }
                }
            }

            service.call(req).await
        })
    }
}

/// Extractor for the authenticated identity; rejects with 401 when absent.
pub struct CurrentUser(pub Identity);

impl actix_web::FromRequest for CurrentUser {
    type Error = AccountError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let identity = req.extensions().get::<Identity>().cloned();

        ready(match identity {
            Some(identity) => Ok(CurrentUser(identity)),
            None => Err(AccountError::Unauthenticated),
        })
    }
}

/// Extractor for routes where the identity is optional.
pub struct MaybeUser(pub Option<Identity>);

impl actix_web::FromRequest for MaybeUser {
    type Error = AccountError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(MaybeUser(req.extensions().get::<Identity>().cloned())))
    }
}
