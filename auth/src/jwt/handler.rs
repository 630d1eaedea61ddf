use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::AuthError;
use super::errors::JwtError;

/// JWT token handler for issuing and verifying access tokens.
///
/// Tokens are HS256-signed (HMAC with SHA-256) with a process-wide symmetric secret and
/// carry an absolute expiry. Verification is stateless: there is no revocation list, so a
/// token stays valid for its whole window once issued.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validity: Duration,
}

impl JwtHandler {
    pub const DEFAULT_VALIDITY_HOURS: i64 = 2;

    /// Create a new JWT handler with the default validity window.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self::with_validity(secret, Duration::hours(Self::DEFAULT_VALIDITY_HOURS))
    }

    /// Create a new JWT handler whose tokens expire `validity` after issuance.
    pub fn with_validity(secret: &[u8], validity: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            validity,
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issue a token for `subject`, valid from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(&self, subject: &str) -> Result<String, JwtError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a token for `subject` as if the current time were `issued_at`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_at(&self, subject: &str, issued_at: DateTime<Utc>) -> Result<String, JwtError> {
        let claims = Claims::for_subject(subject, issued_at, self.validity);
        let header = Header::new(self.algorithm);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a token against the wall clock and return its subject.
    ///
    /// # Errors
    /// * `Invalid` - Signature does not match or algorithm is not HS256
    /// * `Expired` - Current time is at or past `exp`
    /// * `Malformed` - Token segments or claims cannot be decoded
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now` and return its subject.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = self.decode(token)?;

        if claims.is_expired(now.timestamp()) {
            return Err(AuthError::Expired);
        }

        Ok(claims.sub)
    }

    /// Check the signature and decode the claims without judging expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked by the caller against an explicit clock with zero leeway.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::Invalid,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Malformed,
            })
    }
}
