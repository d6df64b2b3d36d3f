//! Ordered access checks run before a handler.
//!
//! A route declares an [`AccessPolicy`]; the policy expands to a fixed
//! sequence of [`AccessStep`]s. Each step either enriches the
//! [`AccessContext`] or stops the chain with an [`AppError`].

use crate::database::DocumentStore;
use crate::models::User;
use crate::services::auth_service::{Claims, TokenService};
use crate::services::user_service;
use crate::utils::AppError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    Public,
    Authenticated,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStep {
    Authenticate,
    AuthorizeAdmin,
}

impl AccessPolicy {
    /// Steps in execution order. Authentication always precedes the admin check.
    pub fn steps(self) -> &'static [AccessStep] {
        match self {
            AccessPolicy::Public => &[],
            AccessPolicy::Authenticated => &[AccessStep::Authenticate],
            AccessPolicy::Admin => &[AccessStep::Authenticate, AccessStep::AuthorizeAdmin],
        }
    }
}

impl FromStr for AccessPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(AccessPolicy::Public),
            "authenticated" => Ok(AccessPolicy::Authenticated),
            "admin" => Ok(AccessPolicy::Admin),
            other => Err(format!(
                "Invalid access policy: {}. Supported: public, authenticated, admin",
                other
            )),
        }
    }
}

/// What the chain has established about the caller so far.
#[derive(Debug, Clone, Default)]
pub struct AccessContext {
    pub claims: Option<Claims>,
    pub identity: Option<User>,
}

/// Request inputs the steps read from.
pub struct AccessRequest<'a> {
    pub authorization: Option<&'a str>,
    pub tokens: &'a TokenService,
    pub store: &'a dyn DocumentStore,
}

fn forbidden() -> AppError {
    AppError::Forbidden("Forbidden access".to_string())
}

/// Verifies the bearer credential of the `Authorization` header value.
/// A missing header is `Unauthenticated`; anything that fails to verify is
/// `Forbidden`.
pub fn authenticate(authorization: Option<&str>, tokens: &TokenService) -> Result<Claims, AppError> {
    let header = authorization.ok_or_else(|| AppError::Unauthenticated("Unauthorized access".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            log::warn!("❌ Malformed Authorization header");
            forbidden()
        })?;

    tokens.verify(token)
}

/// Looks up the authenticated identity and requires the admin role.
/// One store read per call.
pub async fn authorize_admin(store: &dyn DocumentStore, claims: Option<&Claims>) -> Result<User, AppError> {
    let claims = claims.ok_or_else(|| {
        AppError::Internal("Admin check ran before authentication".to_string())
    })?;

    let email = claims.email.as_deref().ok_or_else(|| {
        log::warn!("❌ Admin check on a credential without email");
        forbidden()
    })?;

    match user_service::find_by_email(store, email).await? {
        Some(user) if user.is_admin() => Ok(user),
        Some(_) => {
            log::warn!("❌ {} is not an admin", email);
            Err(forbidden())
        }
        None => {
            log::warn!("❌ Admin check for unknown identity {}", email);
            Err(forbidden())
        }
    }
}

/// Restricts a route to the identity named in its path.
pub fn require_self(claims: &Claims, email: &str) -> Result<(), AppError> {
    if claims.email.as_deref() == Some(email) {
        Ok(())
    } else {
        log::warn!("❌ {:?} tried to access data of {}", claims.email, email);
        Err(forbidden())
    }
}

impl AccessStep {
    pub async fn apply(self, mut context: AccessContext, request: &AccessRequest<'_>) -> Result<AccessContext, AppError> {
        match self {
            AccessStep::Authenticate => {
                context.claims = Some(authenticate(request.authorization, request.tokens)?);
            }
            AccessStep::AuthorizeAdmin => {
                context.identity = Some(authorize_admin(request.store, context.claims.as_ref()).await?);
            }
        }
        Ok(context)
    }
}

/// Runs every step of `policy` in order, stopping at the first failure.
pub async fn run_chain(policy: AccessPolicy, request: &AccessRequest<'_>) -> Result<AccessContext, AppError> {
    let mut context = AccessContext::default();
    for step in policy.steps() {
        context = step.apply(context, request).await?;
    }
    Ok(context)
}
