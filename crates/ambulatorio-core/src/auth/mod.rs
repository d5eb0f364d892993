//! Access gate: bearer tokens, the staff table and per-site checks.
//!
//! Every operation re-checks its target site against the caller's grant.
//! Nothing is cached between requests.

mod token;
mod users;

pub use token::*;
pub use users::*;

use serde::Serialize;
use thiserror::Error;

use crate::models::Site;

/// Authentication and authorization errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("Missing bearer token")]
    Missing,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("No access to site {0}")]
    SiteDenied(Site),

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// The authenticated identity behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    pub username: String,
    pub sites: Vec<Site>,
}

impl Caller {
    pub fn new(username: impl Into<String>, sites: Vec<Site>) -> Self {
        Self {
            username: username.into(),
            sites,
        }
    }

    pub fn can_access(&self, site: Site) -> bool {
        self.sites.contains(&site)
    }

    /// Fail unless `site` is in the caller's grant.
    pub fn ensure_site(&self, site: Site) -> AuthResult<()> {
        if self.can_access(site) {
            Ok(())
        } else {
            tracing::warn!(user = %self.username, site = %site, "site access denied");
            Err(AuthError::SiteDenied(site))
        }
    }
}

impl From<Claims> for Caller {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            sites: claims.sites,
        }
    }
}
