use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::{AuthSession, Claims};
use crate::{config::JwtConfig, error::AppError, state::AppState};

/// Signing and verification keys derived once from [`JwtConfig`].
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::seconds(cfg.ttl_seconds),
        }
    }

    /// Mints an access token for `user_id` valid for the configured lifetime.
    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    pub(crate) fn issue_at(&self, user_id: Uuid, now: OffsetDateTime) -> anyhow::Result<String> {
        let exp = now + self.ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    /// Verifies a raw `Authorization` value, with or without the `Bearer ` scheme.
    ///
    /// An expired token is always reported as [`AppError::ExpiredToken`]; any
    /// other defect is [`AppError::Unauthorized`].
    pub fn verify(&self, raw: &str) -> Result<AuthSession, AppError> {
        let raw = raw.trim();
        let token = raw
            .strip_prefix("Bearer ")
            .or_else(|| raw.strip_prefix("bearer "))
            .unwrap_or(raw)
            .trim();
        if token.is_empty() {
            return Err(AppError::Unauthorized);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => {
                    debug!("jwt expired");
                    AppError::ExpiredToken
                }
                _ => {
                    debug!(error = %e, "jwt rejected");
                    AppError::Unauthorized
                }
            }
        })?;

        let claims = data.claims;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::Unauthorized)?;
        let issued_at = unix_to_datetime(claims.iat)?;
        let expires_at = unix_to_datetime(claims.exp)?;
        debug!(user_id = %user_id, "jwt verified");

        Ok(AuthSession {
            user_id,
            issued_at,
            expires_at,
        })
    }
}

fn unix_to_datetime(ts: usize) -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::from_unix_timestamp(ts as i64).map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_seconds: 60,
        })
    }

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn issue_and_verify_roundtrip() {
        let keys = make_keys(SECRET, "iss", "aud");
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id).expect("sign");
        let session = keys.verify(&token).expect("verify");
        assert_eq!(session.user_id, user_id);
        assert_eq!(
            session.expires_at - session.issued_at,
            Duration::seconds(60)
        );
    }

    #[test]
    fn bearer_prefix_is_optional() {
        let keys = make_keys(SECRET, "iss", "aud");
        let user_id = Uuid::new_v4();
        let token = keys.issue(user_id).expect("sign");
        let session = keys.verify(&format!("Bearer {token}")).expect("verify");
        assert_eq!(session.user_id, user_id);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let keys = make_keys(SECRET, "iss", "aud");
        let issued = OffsetDateTime::now_utc() - Duration::seconds(120);
        let token = keys.issue_at(Uuid::new_v4(), issued).expect("sign");
        assert!(matches!(keys.verify(&token), Err(AppError::ExpiredToken)));
    }

    #[test]
    fn blank_header_is_unauthorized() {
        let keys = make_keys(SECRET, "iss", "aud");
        assert!(matches!(keys.verify(""), Err(AppError::Unauthorized)));
        assert!(matches!(keys.verify("Bearer   "), Err(AppError::Unauthorized)));
    }

    #[test]
    fn tampered_token_is_unauthorized() {
        let keys = make_keys(SECRET, "iss", "aud");
        let token = keys.issue(Uuid::new_v4()).expect("sign");
        assert!(matches!(
            keys.verify(&format!("{token}-o")),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn other_secret_is_unauthorized() {
        let keys = make_keys(SECRET, "iss", "aud");
        let other = make_keys("fedcba9876543210fedcba9876543210", "iss", "aud");
        let token = other.issue(Uuid::new_v4()).expect("sign");
        assert!(matches!(keys.verify(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn wrong_issuer_or_audience_is_unauthorized() {
        let good = make_keys(SECRET, "good-iss", "good-aud");
        let bad = make_keys(SECRET, "bad-iss", "bad-aud");
        let token = good.issue(Uuid::new_v4()).expect("sign");
        assert!(matches!(bad.verify(&token), Err(AppError::Unauthorized)));
    }
}
