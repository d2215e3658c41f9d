use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::SessionIdentity;

/// Session claims issued by the external identity provider.
///
/// The token carries identity only. Tenant comes from the request and the
/// role from the tenant's role assignment, never from the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject at the identity provider.
    pub sub: String,

    pub email: String,

    pub name: String,

    #[serde(default)]
    pub avatar: Option<String>,

    pub issued_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

impl SessionClaims {
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            subject: self.sub.clone(),
            email: self.email.trim().to_lowercase(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("token has an empty subject")]
    MissingSubject,
}

/// Deterministically validate session claims.
///
/// Signature verification happens in [`crate::token`]; this checks content only.
pub fn validate_claims(
    claims: &SessionClaims,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.sub.trim().is_empty() {
        return Err(TokenValidationError::MissingSubject);
    }
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(issued_at: DateTime<Utc>, ttl: Duration) -> SessionClaims {
        SessionClaims {
            sub: "idp|42".to_string(),
            email: " Ada@Example.com ".to_string(),
            name: "Ada".to_string(),
            avatar: None,
            issued_at,
            expires_at: issued_at + ttl,
        }
    }

    #[test]
    fn valid_window_passes() {
        let now = Utc::now();
        let c = claims(now - Duration::minutes(1), Duration::minutes(10));
        assert_eq!(validate_claims(&c, now), Ok(()));
    }

    #[test]
    fn expired_and_future_tokens_fail() {
        let now = Utc::now();
        let expired = claims(now - Duration::hours(2), Duration::hours(1));
        assert_eq!(validate_claims(&expired, now), Err(TokenValidationError::Expired));

        let future = claims(now + Duration::minutes(5), Duration::hours(1));
        assert_eq!(validate_claims(&future, now), Err(TokenValidationError::NotYetValid));

        let inverted = claims(now, Duration::minutes(-1));
        assert_eq!(
            validate_claims(&inverted, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn identity_normalizes_email() {
        let c = claims(Utc::now(), Duration::minutes(5));
        assert_eq!(c.identity().email, "ada@example.com");
    }
}
