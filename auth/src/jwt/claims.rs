use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by an access token.
///
/// Tokens are self-contained: the subject and absolute expiry are all the server
/// needs to accept or reject one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a subject, expiring `validity` after `issued_at`.
    ///
    /// An expiry past the representable range saturates to the latest instant.
    pub fn for_subject(subject: impl ToString, issued_at: DateTime<Utc>, validity: Duration) -> Self {
        let expires_at = issued_at
            .checked_add_signed(validity)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// A token is expired from the `exp` second onwards. No leeway is applied.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_subject() {
        let issued_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = Claims::for_subject("alice", issued_at, Duration::hours(2));

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp - claims.iat, 2 * 60 * 60);
        assert_eq!(
            claims.expires_at(),
            DateTime::from_timestamp(1_700_000_000 + 7200, 0)
        );
    }

    #[test]
    fn test_for_subject_saturates_huge_validity() {
        let issued_at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let claims = Claims::for_subject("alice", issued_at, Duration::hours(100_000_000_000));

        assert_eq!(claims.exp, DateTime::<Utc>::MAX_UTC.timestamp());
        assert!(!claims.is_expired(issued_at.timestamp()));
    }

    #[test]
    fn test_is_expired() {
        let claims = Claims {
            sub: "alice".to_string(),
            iat: 0,
            exp: 1000,
        };

        assert!(!claims.is_expired(999));
        assert!(claims.is_expired(1000)); // Exactly at expiration
        assert!(claims.is_expired(1001));
    }
}
