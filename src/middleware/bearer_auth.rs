//! Bearer authentication middleware.
//!
//! Runs the full authentication decision procedure (token verification,
//! session lookup, account status) and injects the resolved identity into
//! request extensions for route handlers. A missing header yields
//! "token missing", everything else that fails yields "token invalid".

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::HeaderMap,
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;
use std::rc::Rc;

use crate::auth::{authenticate, TokenCodec};

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

/// Middleware guarding routes that require an authenticated session.
pub struct RequireAuth {
    pool: PgPool,
    codec: TokenCodec,
}

impl RequireAuth {
    pub fn new(pool: PgPool, codec: TokenCodec) -> Self {
        Self { pool, codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RequireAuthService {
            service: Rc::new(service),
            pool: self.pool.clone(),
            codec: self.codec.clone(),
        }))
    }
}

pub struct RequireAuthService<S> {
    service: Rc<S>,
    pool: PgPool,
    codec: TokenCodec,
}

impl<S, B> Service<ServiceRequest> for RequireAuthService<S>
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
        let codec = self.codec.clone();

        Box::pin(async move {
            let bearer = bearer_token(req.headers());
            let user = authenticate(&pool, &codec, bearer.as_deref()).await?;

            tracing::debug!(
                user_id = user.user_id,
                username = %user.username,
                "request authenticated"
            );
            req.extensions_mut().insert(user);

            service.call(req).await
        })
    }
}
