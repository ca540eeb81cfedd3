//! Thin access-guard types. Token issuance lives in the external auth
//! provider; this crate only validates bearer tokens and answers capability
//! questions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by the externally issued JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub admin: bool,
    pub exp: i64,
    pub iat: i64,
}

/// Capability a route can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Authenticated,
    Admin,
}

/// Validated caller context, injected into the request by the guard
/// middleware.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub admin: bool,
}

impl AuthUser {
    /// Boolean access decision for a required capability.
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Authenticated => true,
            Capability::Admin => self.admin,
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            admin: claims.admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_capability_requires_admin_flag() {
        let member = AuthUser { user_id: Uuid::new_v4(), admin: false };
        assert!(member.allows(Capability::Authenticated));
        assert!(!member.allows(Capability::Admin));

        let admin = AuthUser { user_id: Uuid::new_v4(), admin: true };
        assert!(admin.allows(Capability::Admin));
    }
}
