//! Permissions and profile attributes read from the session's id token.
//!
//! The token is only decoded, never verified: the API verifies it on every
//! call, the client just needs to know what to show.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use jsonwebtoken::{decode, DecodingKey, Validation};
use log::{debug, warn};
use serde::Deserialize;

use crate::error::DecodeError;
use crate::session::SessionManager;

/* ---------------- permissions ------------------------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    UserAdmin,
    TeamLeader,
}

impl Permission {
    /// Group name as carried in the token; `None` for groups this client
    /// does not know about.
    pub fn from_group(group: &str) -> Option<Self> {
        match group {
            "UserAdmin" => Some(Permission::UserAdmin),
            "TeamLeader" => Some(Permission::TeamLeader),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::UserAdmin => "UserAdmin",
            Permission::TeamLeader => "TeamLeader",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* ---------------- jeton ------------------------------------------------- */

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "cognito:groups", default)]
    pub groups:     Vec<String>,
    #[serde(default)]
    pub given_name: Option<String>,
}

/// Reads the claim set of a JWT without checking signature, expiry or
/// audience.
pub fn decode_token(token: &str) -> Result<TokenClaims, DecodeError> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

/* ---------------- claims ------------------------------------------------ */

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims {
    pub permissions: BTreeSet<Permission>,
    pub first_name:  String,
}

impl Claims {
    pub fn from_token_claims(claims: &TokenClaims) -> Self {
        Self {
            permissions: claims.groups.iter().filter_map(|g| Permission::from_group(g)).collect(),
            first_name:  claims.given_name.clone().unwrap_or_default(),
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// False for an empty list.
    pub fn has_any(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.has_permission(*p))
    }

    /// True for an empty list.
    pub fn has_all(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.has_permission(*p))
    }

    pub fn is_in_role(&self, permission: Permission) -> bool {
        self.has_permission(permission)
    }

    pub fn is_user_admin(&self) -> bool {
        self.is_in_role(Permission::UserAdmin)
    }

    pub fn is_team_leader(&self) -> bool {
        self.is_in_role(Permission::TeamLeader)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClaimsState {
    #[default]
    Loading,
    Ready(Claims),
}

impl ClaimsState {
    pub fn claims(&self) -> Option<&Claims> {
        match self {
            ClaimsState::Ready(claims) => Some(claims),
            ClaimsState::Loading => None,
        }
    }
}

/* ---------------- resolver ---------------------------------------------- */

pub struct ClaimsResolver {
    session: Rc<SessionManager>,
}

impl ClaimsResolver {
    pub fn new(session: Rc<SessionManager>) -> Self {
        Self { session }
    }

    /// Claims of the current token. Empty when signed out or when the token
    /// cannot be read; never an error.
    pub async fn resolve(&self) -> Claims {
        if !self.session.is_authenticated() {
            return Claims::default();
        }
        let Some(token) = self.session.get_token().await else {
            return Claims::default();
        };

        match decode_token(&token) {
            Ok(token_claims) => {
                let claims = Claims::from_token_claims(&token_claims);
                debug!("claims resolved: {:?}", claims.permissions);
                claims
            }
            Err(err) => {
                warn!("could not read token claims: {err}");
                Claims::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use jsonwebtoken::{encode, EncodingKey, Header};

    /// Signed with a key the client never sees.
    fn token(payload: serde_json::Value) -> String {
        encode(&Header::default(), &payload, &EncodingKey::from_secret(b"server-only")).unwrap()
    }

    #[test]
    fn unknown_groups_are_dropped() {
        let claims = decode_token(&token(json!({
            "cognito:groups": ["Unknown", "UserAdmin", "TeamLeader", "UserAdmin"],
            "given_name": "Ada"
        })))
        .map(|c| Claims::from_token_claims(&c))
        .unwrap();

        assert_eq!(
            claims.permissions,
            BTreeSet::from([Permission::TeamLeader, Permission::UserAdmin])
        );
        assert_eq!(claims.first_name, "Ada");
        assert!(claims.is_user_admin());
        assert!(claims.is_team_leader());
    }

    #[test]
    fn group_order_does_not_matter() {
        let a = TokenClaims { groups: vec!["TeamLeader".into(), "UserAdmin".into()], given_name: None };
        let b = TokenClaims { groups: vec!["UserAdmin".into(), "Other".into(), "TeamLeader".into()], given_name: None };
        assert_eq!(Claims::from_token_claims(&a), Claims::from_token_claims(&b));
    }

    #[test]
    fn missing_claims_mean_no_permissions() {
        let claims = Claims::from_token_claims(&decode_token(&token(json!({ "sub": "x" }))).unwrap());
        assert!(claims.permissions.is_empty());
        assert_eq!(claims.first_name, "");
    }

    #[test]
    fn expired_token_for_another_audience_still_reads() {
        let claims = decode_token(&token(json!({
            "given_name": "Bo",
            "exp": 1,
            "aud": "some-client-id"
        })))
        .unwrap();
        assert_eq!(claims.given_name.as_deref(), Some("Bo"));
    }

    #[test]
    fn malformed_tokens_are_errors() {
        assert!(matches!(decode_token("not-a-jwt"), Err(DecodeError::Jwt(_))));
        assert!(matches!(decode_token("a..c"), Err(DecodeError::Jwt(_))));
        assert!(matches!(decode_token("eyJhbGciOiJSUzI1NiJ9.!!!.c"), Err(DecodeError::Jwt(_))));
    }

    #[test]
    fn predicates_on_lists() {
        let claims = Claims {
            permissions: BTreeSet::from([Permission::TeamLeader]),
            first_name:  String::new(),
        };
        assert!(!claims.has_any(&[]));
        assert!(claims.has_all(&[]));
        assert!(claims.has_any(&[Permission::UserAdmin, Permission::TeamLeader]));
        assert!(!claims.has_all(&[Permission::UserAdmin, Permission::TeamLeader]));
        assert!(!claims.is_user_admin());
    }
}
