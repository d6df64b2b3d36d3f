use crate::utils::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Validity window of an issued credential.
pub const TOKEN_TTL_HOURS: i64 = 1;

/// Decoded credential: the identity payload plus the reserved claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    /// Remaining payload fields, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// The payload as it was supplied at issue time, without the reserved
    /// claims.
    pub fn identity(&self) -> Map<String, Value> {
        let mut identity = self.extra.clone();
        if let Some(email) = &self.email {
            identity.insert("email".to_string(), Value::String(email.clone()));
        }
        identity
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Signs and verifies HS256 bearer credentials. Stateless: nothing about
/// issued tokens is stored, expiry and signature are the only checks.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::hours(TOKEN_TTL_HOURS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Embeds any JSON object as the claims of a new credential.
    /// `iat`, `exp` and `jti` are always set here.
    pub fn issue(&self, payload: &Value) -> Result<String, AppError> {
        let Value::Object(identity) = payload else {
            return Err(AppError::InvalidRequest(
                "Identity payload must be a JSON object".to_string(),
            ));
        };

        let now = Utc::now();
        let mut claims = identity.clone();
        claims.insert("iat".to_string(), Value::from(now.timestamp()));
        claims.insert("exp".to_string(), Value::from((now + self.ttl).timestamp()));
        claims.insert("jti".to_string(), Value::String(Uuid::new_v4().to_string()));

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::warn!("❌ Token rejected: {}", e);
                AppError::Forbidden("Forbidden access".to_string())
            })
    }
}
