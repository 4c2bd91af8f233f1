use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use super::AppState;
use crate::clients::Identity;
use crate::domain::order::OrderError;

/// Caller resolved from the bearer token by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: String,
}

impl From<Identity> for CallerIdentity {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.user_id,
        }
    }
}

impl FromRequest for CallerIdentity {
    type Error = OrderError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = extract_bearer_token(req).map(str::to_string);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let Some(token) = token else {
                return Err(OrderError::Unauthorized);
            };
            let Some(state) = state else {
                tracing::error!("Application state missing, cannot verify caller");
                return Err(OrderError::Unauthorized);
            };

            match state.auth.validate_token(&token).await {
                Ok(identity) => Ok(identity.into()),
                Err(e) => {
                    tracing::warn!(error = %e, "Caller identity rejected");
                    Err(OrderError::Unauthorized)
                }
            }
        })
    }
}

fn extract_bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}
