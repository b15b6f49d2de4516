use anyhow::Context;
use serde::Deserialize;

/// HS256 needs a key at least as long as its 256-bit digest.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostConfig {
    pub banned_title_words: Vec<String>,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            banned_title_words: vec!["바보".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `None` runs the server on the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    pub posts: PostConfig,
}

impl JwtConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.secret.len() < MIN_SECRET_LEN {
            anyhow::bail!(
                "JWT_SECRET must be at least {} bytes, got {}",
                MIN_SECRET_LEN,
                self.secret.len()
            );
        }
        if self.ttl_seconds <= 0 {
            anyhow::bail!("JWT_TTL_SECONDS must be positive");
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "myblog".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "myblog-users".into()),
            ttl_seconds: std::env::var("JWT_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        jwt.validate()?;

        let posts = match std::env::var("POST_BANNED_WORDS") {
            Ok(v) => PostConfig {
                banned_title_words: parse_word_list(&v),
            },
            Err(_) => PostConfig::default(),
        };

        Ok(Self {
            database_url,
            jwt,
            posts,
        })
    }
}

fn parse_word_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(secret: &str, ttl_seconds: i64) -> JwtConfig {
        JwtConfig {
            secret: secret.into(),
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_seconds,
        }
    }

    #[test]
    fn rejects_short_secret() {
        let err = jwt("too-short", 60).validate().unwrap_err();
        assert!(err.to_string().contains("at least 32 bytes"));
    }

    #[test]
    fn rejects_non_positive_ttl() {
        assert!(jwt(&"k".repeat(32), 0).validate().is_err());
    }

    #[test]
    fn accepts_long_enough_secret() {
        jwt(&"k".repeat(32), 60).validate().expect("valid config");
    }

    #[test]
    fn word_list_skips_blanks() {
        assert_eq!(parse_word_list(" spam, ,eggs ,"), vec!["spam", "eggs"]);
    }
}
