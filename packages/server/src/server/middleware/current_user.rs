use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::jwt_auth::AuthUser;
use crate::common::auth::{Actor, AuthError};
use crate::domains::users::models::User;
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// The authenticated, active user behind a request.
///
/// Reloaded from the database on every request so role changes and
/// deactivation take effect immediately.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn actor(&self) -> Actor {
        self.0.actor()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::AuthenticationRequired)?;
        let state = parts
            .extensions
            .get::<AppState>()
            .cloned()
            .ok_or_else(|| AuthError::InternalError(anyhow::anyhow!("application state missing")))?;

        let user = User::find_by_id(auth.user_id, &state.db_pool)
            .await
            .map_err(AuthError::InternalError)?
            .ok_or(AuthError::InvalidToken)?;
        if !user.actif {
            return Err(AuthError::AccountDisabled.into());
        }

        Ok(CurrentUser(user))
    }
}
