//! Custom Axum extractors.
//!
//! - `CorrelationId`: extract or generate request correlation IDs
//! - `OperatorActor`: resolve the bearer token into an operator identity

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use encore_core::{Actor, RequestStore};
use uuid::Uuid;

/// Correlation ID for request tracing.
///
/// Extracts the correlation ID from the `X-Correlation-ID` header,
/// or generates a new UUID v4 if not present.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let correlation_id = parts
            .headers
            .get("X-Correlation-ID")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s).ok())
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

/// The authenticated operator behind an admin endpoint.
///
/// Reads the `Authorization: Bearer` header, resolves it through the
/// state's [`crate::ActorProvider`], and rejects non-operator roles. The
/// engine itself never re-checks the role; this extractor is the boundary.
#[derive(Debug, Clone, Copy)]
pub struct OperatorActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<AppState<S>> for OperatorActor
where
    S: RequestStore + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::unauthorized("missing bearer token"))?;

        let actor = state
            .actors
            .authenticate(token)
            .await
            .map_err(|_| AppError::forbidden("access denied"))?;

        if !actor.is_operator() {
            tracing::warn!(actor = %actor.id, "non-operator hit an operator endpoint");
            return Err(AppError::forbidden("operator role required"));
        }

        Ok(Self(actor))
    }
}
