//! Role-based access control.
//!
//! [`authorize`] is the pure check. [`access_guard`] is the middleware
//! stage that resolves the caller, authorizes it against the route's
//! [`RoleRequirement`] and hands the identity to the handler through the
//! request extensions.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::audit::AuditFields;
use crate::error::IntakeError;
use crate::http::request::request_id;
use crate::observability::metrics;
use crate::security::identity::{CallerIdentity, IdentityResolver};

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_CASE_WORKER: &str = "CaseWorker";

/// Roles allowed to invoke an operation. Order is irrelevant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRequirement(BTreeSet<String>);

impl RoleRequirement {
    pub fn any_of<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(roles.into_iter().map(Into::into).collect())
    }

    pub fn allows(&self, role: &str) -> bool {
        self.0.contains(role)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Valid identity, insufficient role.
///
/// Carries the required roles and the actual role for server-side logs.
/// Clients only ever see a bare "forbidden".
#[derive(Debug, Error, PartialEq, Eq)]
#[error("role '{actual}' is not permitted (requires one of: {})", .required.join(", "))]
pub struct AuthorizationError {
    pub required: Vec<String>,
    pub actual: String,
}

/// Pass `identity` through unchanged if its role is allowed.
pub fn authorize(
    identity: CallerIdentity,
    allowed: &RoleRequirement,
) -> Result<CallerIdentity, AuthorizationError> {
    if allowed.allows(&identity.role) {
        Ok(identity)
    } else {
        Err(AuthorizationError {
            required: allowed.roles().map(str::to_owned).collect(),
            actual: identity.role,
        })
    }
}

/// State for the access guard stage of one route.
#[derive(Clone)]
pub struct AccessGuard {
    resolver: Arc<dyn IdentityResolver>,
    requirement: Arc<RoleRequirement>,
}

impl AccessGuard {
    pub fn new(resolver: Arc<dyn IdentityResolver>, requirement: RoleRequirement) -> Self {
        Self {
            resolver,
            requirement: Arc::new(requirement),
        }
    }
}

/// Middleware: resolve identity, authorize, attach `CallerIdentity`.
pub async fn access_guard(
    State(guard): State<AccessGuard>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let request_id = request_id(req.headers()).unwrap_or("unknown").to_string();

    let identity = match guard.resolver.resolve(req.headers()) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!(request_id = %request_id, reason = %e, "Authentication failed");
            metrics::record_auth_failure(e.kind());
            return IntakeError::from(e).into_response();
        }
    };

    let caller_id = identity.id;
    match authorize(identity, &guard.requirement) {
        Ok(identity) => {
            tracing::debug!(request_id = %request_id, caller_id, role = %identity.role, "Caller authorized");
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, caller_id, reason = %e, "Authorization denied");
            metrics::record_auth_failure("forbidden");
            let fields = AuditFields::new()
                .with("caller_id", caller_id)
                .with("caller_role", e.actual.clone());
            let mut response = IntakeError::from(e).into_response();
            response.extensions_mut().insert(fields);
            response
        }
    }
}
