//! The fixed staff table.

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::{AuthError, AuthResult};
use crate::models::Site;

/// A staff account. Passwords are kept as hex SHA-256 digests.
#[derive(Debug)]
pub struct StaffUser {
    pub username: &'static str,
    password_sha256: &'static str,
    pub sites: &'static [Site],
}

/// Public view of a staff account.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub sites: Vec<Site>,
}

const BOTH_SITES: &[Site] = &[Site::PtaCentro, Site::VillaGinestre];
const CENTRO_ONLY: &[Site] = &[Site::PtaCentro];

// sha256("infermiere")
const DEFAULT_DIGEST: &str = "a3140eb11189d592b6edefdd7080bba6f6de7df95ed853b033e0cdcf3fc5bf2a";

static STAFF: &[StaffUser] = &[
    StaffUser {
        username: "Domenico",
        password_sha256: DEFAULT_DIGEST,
        sites: BOTH_SITES,
    },
    StaffUser {
        username: "Antonella",
        password_sha256: DEFAULT_DIGEST,
        sites: BOTH_SITES,
    },
    StaffUser {
        username: "Giovanna",
        password_sha256: DEFAULT_DIGEST,
        sites: CENTRO_ONLY,
    },
    StaffUser {
        username: "Oriana",
        password_sha256: DEFAULT_DIGEST,
        sites: CENTRO_ONLY,
    },
    StaffUser {
        username: "G.Domenico",
        password_sha256: DEFAULT_DIGEST,
        sites: CENTRO_ONLY,
    },
];

impl StaffUser {
    /// Stable identifier derived from the username.
    pub fn user_id(&self) -> String {
        user_id(self.username)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.user_id(),
            username: self.username.to_string(),
            sites: self.sites.to_vec(),
        }
    }

    fn password_matches(&self, password: &str) -> bool {
        hex::encode(Sha256::digest(password.as_bytes())) == self.password_sha256
    }
}

/// Lower-cased username with dots replaced by underscores.
pub fn user_id(username: &str) -> String {
    username.to_lowercase().replace('.', "_")
}

/// Look up a staff account by exact username.
pub fn find_user(username: &str) -> Option<&'static StaffUser> {
    STAFF.iter().find(|u| u.username == username)
}

/// Check credentials. Unknown users and wrong passwords fail the same way.
pub fn authenticate(username: &str, password: &str) -> AuthResult<&'static StaffUser> {
    match find_user(username) {
        Some(user) if user.password_matches(password) => Ok(user),
        _ => {
            tracing::warn!(user = %username, "login failed");
            Err(AuthError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticate() {
        let user = authenticate("Antonella", "infermiere").unwrap();
        assert_eq!(user.sites, BOTH_SITES);

        assert_eq!(
            authenticate("Antonella", "wrong").unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            authenticate("Nobody", "infermiere").unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_usernames_are_case_sensitive() {
        assert!(find_user("domenico").is_none());
        assert!(find_user("Domenico").is_some());
    }

    #[test]
    fn test_user_id() {
        assert_eq!(user_id("G.Domenico"), "g_domenico");
        assert_eq!(user_id("Oriana"), "oriana");
    }

    #[test]
    fn test_profile() {
        let profile = find_user("Giovanna").unwrap().profile();
        assert_eq!(profile.id, "giovanna");
        assert_eq!(profile.sites, vec![Site::PtaCentro]);
    }
}
