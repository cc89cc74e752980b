//! Caller identity from bearer tokens.
//!
//! Identity is optional: a missing or unknown token makes the caller
//! anonymous rather than rejecting the request. The resolved identity is
//! attached to the request as a [`Caller`] extension.

use std::collections::HashMap;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use counsel_core::config::AuthConfig;
use counsel_core::types::CallerId;

use crate::state::AppState;

/// Maps a bearer token to a caller.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, token: &str) -> Option<CallerId>;
}

/// Resolver over a fixed token map from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenResolver {
    tokens: HashMap<String, CallerId>,
}

impl StaticTokenResolver {
    pub fn new(tokens: HashMap<String, CallerId>) -> Self {
        Self { tokens }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config
                .tokens
                .iter()
                .map(|(token, caller)| (token.clone(), CallerId(caller.clone())))
                .collect(),
        )
    }
}

impl IdentityResolver for StaticTokenResolver {
    fn resolve(&self, token: &str) -> Option<CallerId> {
        self.tokens.get(token).cloned()
    }
}

/// Identity attached to each request by [`resolve_identity`].
#[derive(Debug, Clone, Default)]
pub struct Caller(pub Option<CallerId>);

/// Token from an `Authorization: Bearer <token>` header, if well formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware that resolves the caller and never rejects.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let caller = bearer_token(req.headers()).and_then(|token| state.identity.resolve(token));
    if caller.is_none() && req.headers().contains_key(header::AUTHORIZATION) {
        tracing::debug!("Unrecognized bearer token; treating caller as anonymous");
    }
    req.extensions_mut().insert(Caller(caller));
    next.run(req).await
}
