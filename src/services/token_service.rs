use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token validity duration: {0}")]
    InvalidDuration(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Failed to generate token: {0}")]
    Signing(String),
}

// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,  // user id
    pub iat: usize,
    pub exp: usize,
}

/// Signs and verifies HS256 bearer tokens with the process secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user_id: &str, validity: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, validity, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: &str,
        validity: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let ttl = parse_validity(validity)?;
        let expires = now
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::InvalidDuration(validity.to_string()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: expires.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Checks the signature, then expiry against `now` with no leeway.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        if claims.exp as i64 <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

/// Parses a validity string such as `"15m"`, `"15 minutes"`, `"2 days"` or
/// `"1.5h"`. A bare number is milliseconds.
pub fn parse_validity(input: &str) -> Result<Duration, TokenError> {
    let invalid = || TokenError::InvalidDuration(input.to_string());
    let trimmed = input.trim();

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let value: f64 = number.parse().map_err(|_| invalid())?;

    let unit_ms: f64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => 1.0,
        "s" | "sec" | "secs" | "second" | "seconds" => 1_000.0,
        "m" | "min" | "mins" | "minute" | "minutes" => 60_000.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600_000.0,
        "d" | "day" | "days" => 86_400_000.0,
        "w" | "week" | "weeks" => 604_800_000.0,
        "y" | "yr" | "yrs" | "year" | "years" => 31_557_600_000.0,
        _ => return Err(invalid()),
    };

    let millis = (value * unit_ms).round();
    if millis <= 0.0 || !millis.is_finite() || millis > i64::MAX as f64 {
        return Err(invalid());
    }

    Duration::try_milliseconds(millis as i64).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_TOKEN_VALIDITY;

    #[test]
    fn parses_common_durations() {
        assert_eq!(parse_validity("15m").unwrap(), Duration::minutes(15));
        assert_eq!(parse_validity("15 minutes").unwrap(), Duration::minutes(15));
        assert_eq!(parse_validity("2 days").unwrap(), Duration::days(2));
        assert_eq!(parse_validity("1.5h").unwrap(), Duration::minutes(90));
        assert_eq!(parse_validity("10S").unwrap(), Duration::seconds(10));
        assert_eq!(parse_validity("1w").unwrap(), Duration::weeks(1));
        assert_eq!(parse_validity("500").unwrap(), Duration::milliseconds(500));
    }

    #[test]
    fn rejects_bad_durations() {
        for bad in ["", "m", "15 fortnights", "0m", "-5m", "abc"] {
            assert!(parse_validity(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn token_carries_subject() {
        let service = TokenService::new("test-secret");
        let token = service.issue("64b7f0c2a1b2c3d4e5f60718", "15m").unwrap();
        let claims = service.verify(&token).unwrap();
        assert_eq!(claims.sub, "64b7f0c2a1b2c3d4e5f60718");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn default_validity_expires_after_fifteen_minutes() {
        let service = TokenService::new("test-secret");
        let issued = Utc::now();
        let token = service.issue_at("user-1", DEFAULT_TOKEN_VALIDITY, issued).unwrap();

        assert!(service.verify_at(&token, issued + Duration::minutes(14)).is_ok());
        assert_eq!(
            service.verify_at(&token, issued + Duration::minutes(15)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = TokenService::new("one").issue("user-1", "15m").unwrap();
        let err = TokenService::new("two").verify(&token).unwrap_err();
        assert!(matches!(err, TokenError::Invalid(_)));
    }

    #[test]
    fn invalid_validity_fails_issuance() {
        let service = TokenService::new("s");
        assert!(matches!(
            service.issue("user-1", "soon"),
            Err(TokenError::InvalidDuration(_))
        ));
    }

    #[test]
    fn validity_past_the_calendar_is_rejected() {
        let tokens = TokenService::new("secret");
        assert!(parse_validity("290000y").is_ok());
        assert!(matches!(
            tokens.issue("user", "290000y"),
            Err(TokenError::InvalidDuration(_))
        ));
    }
}
