/*
 * Responsibility
 * - load token settings from the environment (.env via dotenvy)
 * - validate them up front (missing keys fail at startup, not per request)
 */
use std::fmt;

use crate::error::ConfigError;

/// Upper bound for access token lifetimes: one year.
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Key material used to sign and verify tokens.
#[derive(Clone, PartialEq, Eq)]
pub enum SigningKeyConfig {
    /// HS256 shared secret.
    Hmac { secret: String },
    /// EdDSA key pair, both in PKCS#8 / SPKI PEM.
    Ed25519 {
        private_key_pem: String,
        public_key_pem: String,
    },
}

impl fmt::Debug for SigningKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        match self {
            Self::Hmac { .. } => f.write_str("Hmac(..)"),
            Self::Ed25519 { .. } => f.write_str("Ed25519(..)"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub app_env: AppEnv,
    pub issuer: String,
    pub audience: String,
    pub signing_key: SigningKeyConfig,
    pub access_token_ttl_seconds: u64,
    pub access_token_leeway_seconds: u64,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_env = AppEnv::parse(lookup("APP_ENV"));

        let issuer = non_empty(&lookup, "AUTH_ISSUER")?;
        let audience = non_empty(&lookup, "AUTH_AUDIENCE")?;

        let signing_key = match lookup("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => SigningKeyConfig::Hmac { secret },
            None => SigningKeyConfig::Ed25519 {
                private_key_pem: non_empty(&lookup, "JWT_PRIVATE_KEY_PEM")?.replace("\\n", "\n"),
                public_key_pem: non_empty(&lookup, "JWT_PUBLIC_KEY_PEM")?.replace("\\n", "\n"),
            },
        };

        let access_token_ttl_seconds = parse_or(&lookup, "ACCESS_TOKEN_TTL_SECONDS", 600)?; // 10 min
        if !(1..=MAX_ACCESS_TOKEN_TTL_SECONDS).contains(&access_token_ttl_seconds) {
            return Err(ConfigError::Invalid("ACCESS_TOKEN_TTL_SECONDS"));
        }
        let access_token_leeway_seconds = parse_or(&lookup, "ACCESS_TOKEN_LEEWAY_SECONDS", 60)?;

        Ok(Self {
            app_env,
            issuer,
            audience,
            signing_key,
            access_token_ttl_seconds,
            access_token_leeway_seconds,
        })
    }
}

fn non_empty<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parse_or<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
