//! Resolving the acting user from an opaque bearer credential.
//!
//! Clients present an API token in the `Authorization: Bearer` header. Only the SHA-256 hash of
//! the token is stored, so resolving a credential means hashing it and looking the hash up in
//! the user table.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use rusqlite::Connection;
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    Error,
    user::{UserID, get_user_by_token_hash},
};

/// The user an operation is performed on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// The ID of the acting user.
    pub user_id: UserID,
    /// The acting user's display name.
    pub display_name: String,
}

/// Turns an opaque credential into the identity of the acting user.
pub trait IdentityResolver {
    /// Resolve `credential` to an [Identity].
    ///
    /// # Errors
    ///
    /// Returns [Error::Unauthorized] if the credential is missing, malformed or unknown, or
    /// [Error::StorageFailure] if the lookup itself failed.
    fn resolve(&self, credential: &str, connection: &Connection) -> Result<Identity, Error>;
}

/// Resolves API tokens against the hashes stored in the user table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiTokenResolver;

impl IdentityResolver for ApiTokenResolver {
    fn resolve(&self, credential: &str, connection: &Connection) -> Result<Identity, Error> {
        let credential = credential.trim();

        if credential.is_empty() {
            return Err(Error::Unauthorized);
        }

        let token_hash = TokenHash::from_credential(credential);

        match get_user_by_token_hash(&token_hash, connection) {
            Ok(user) => Ok(Identity {
                user_id: user.id,
                display_name: user.name,
            }),
            Err(Error::NotFound) => {
                tracing::debug!("rejected credential that matched no user");
                Err(Error::Unauthorized)
            }
            Err(error) => Err(error),
        }
    }
}

/// A freshly minted API token.
///
/// The plain text is only available at creation time, afterwards only its [TokenHash] is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Mint a new random token.
    pub fn generate() -> Self {
        Self(format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        ))
    }

    /// The hash to store for this token.
    pub fn hash(&self) -> TokenHash {
        TokenHash::from_credential(&self.0)
    }
}

impl AsRef<str> for ApiToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The lowercase hex SHA-256 digest of a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenHash(String);

impl TokenHash {
    /// Hash `credential`.
    pub fn from_credential(credential: &str) -> Self {
        Self(format!("{:x}", Sha256::digest(credential.as_bytes())))
    }
}

impl AsRef<str> for TokenHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The raw bearer credential sent with a request.
///
/// Extracting this only checks that a bearer token is present, resolving it to a user is left to
/// the operation so that an invalid credential fails before any store access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(pub String);

impl AsRef<str> for Credential {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Credential
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| Error::Unauthorized)?;

        Ok(Credential(bearer.token().to_owned()))
    }
}
