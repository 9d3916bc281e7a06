use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{error, warn};

use crate::config::{AuthConfig, SigningKeyConfig};
use crate::error::TokenError;

/// Process-wide signing and verification material.
///
/// Parse once at startup and share by `Arc` with the per-request codecs.
#[derive(Clone)]
pub struct JwtKeys {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl_seconds: u64,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("JwtKeys")
            .field("algorithm", &self.algorithm)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl JwtKeys {
    pub fn from_config(config: &AuthConfig) -> Result<Self, TokenError> {
        let issuer = config.issuer.clone();
        let audience = config.audience.clone();
        let ttl = config.access_token_ttl_seconds;
        let leeway = config.access_token_leeway_seconds;

        match &config.signing_key {
            SigningKeyConfig::Hmac { secret } => {
                if config.app_env.is_production() {
                    warn!("signing tokens with a shared HS256 secret in production");
                }
                Ok(Self::hmac(secret.as_bytes(), issuer, audience, ttl, leeway))
            }
            SigningKeyConfig::Ed25519 {
                private_key_pem,
                public_key_pem,
            } => Self::ed25519(private_key_pem, public_key_pem, issuer, audience, ttl, leeway),
        }
    }

    /// HS256 with a shared secret.
    pub fn hmac(
        secret: &[u8],
        issuer: String,
        audience: String,
        ttl_seconds: u64,
        leeway_seconds: u64,
    ) -> Self {
        Self::build(
            Algorithm::HS256,
            EncodingKey::from_secret(secret),
            DecodingKey::from_secret(secret),
            issuer,
            audience,
            ttl_seconds,
            leeway_seconds,
        )
    }

    /// EdDSA. `private_key_pem` must be an Ed25519 private key in PKCS#8 PEM format.
    pub fn ed25519(
        private_key_pem: &str,
        public_key_pem: &str,
        issuer: String,
        audience: String,
        ttl_seconds: u64,
        leeway_seconds: u64,
    ) -> Result<Self, TokenError> {
        let encoding_key = EncodingKey::from_ed_pem(private_key_pem.as_bytes()).map_err(|e| {
            warn!(error = %e, "failed to parse JWT private key PEM (expected Ed25519 PKCS#8 PEM)");
            TokenError::InvalidKey(e.to_string())
        })?;
        let decoding_key = DecodingKey::from_ed_pem(public_key_pem.as_bytes()).map_err(|e| {
            warn!(error = %e, "failed to parse JWT public key PEM");
            TokenError::InvalidKey(e.to_string())
        })?;

        Ok(Self::build(
            Algorithm::EdDSA,
            encoding_key,
            decoding_key,
            issuer,
            audience,
            ttl_seconds,
            leeway_seconds,
        ))
    }

    fn build(
        algorithm: Algorithm,
        encoding_key: EncodingKey,
        decoding_key: DecodingKey,
        issuer: String,
        audience: String,
        ttl_seconds: u64,
        leeway_seconds: u64,
    ) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = leeway_seconds;

        Self {
            algorithm,
            encoding_key,
            decoding_key,
            validation,
            issuer,
            audience,
            ttl_seconds,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn sign<T: Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        let mut header = Header::new(self.algorithm);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            TokenError::Jwt(e)
        })
    }

    /// Signature, `exp` (with leeway), `iss` and `aud` are checked here.
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        let data = jsonwebtoken::decode::<T>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
