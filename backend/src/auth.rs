//! Bearer-token authentication.
//!
//! Account management lives outside this service; the server only needs to
//! map a presented token to the owner it stands for.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use taskify_shared::OwnerId;

use crate::api::AppState;
use crate::config::AccountConfig;
use crate::error::ApiError;
use crate::store::TaskStore;

#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    owners: HashMap<String, OwnerId>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_accounts(accounts: &[AccountConfig]) -> Self {
        accounts
            .iter()
            .fold(Self::new(), |dir, a| dir.with_account(a.token.clone(), a.owner))
    }

    #[must_use]
    pub fn with_account(mut self, token: impl Into<String>, owner: OwnerId) -> Self {
        self.owners.insert(token.into(), owner);
        self
    }

    pub fn resolve(&self, token: &str) -> Option<OwnerId> {
        self.owners.get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// The authenticated owner of the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub OwnerId);

#[async_trait]
impl<S: TaskStore> FromRequestParts<AppState<S>> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        bearer_token(parts)
            .and_then(|token| state.accounts.resolve(token))
            .map(Owner)
            .ok_or(ApiError::Unauthorized)
    }
}
