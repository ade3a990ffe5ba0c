//! API token formatting, parsing, and keyed verifier hashing.

use std::{fmt, str::FromStr};

use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::auth::UserUuid;

type HmacSha256 = Hmac<Sha256>;

/// API token identifier prefix.
pub const API_TOKEN_PREFIX: &str = "fo";

/// Number of secret bytes encoded in a token.
pub const API_TOKEN_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiTokenVersion {
    V1,
}

impl ApiTokenVersion {
    #[must_use]
    pub const fn as_i16(self) -> i16 {
        match self {
            Self::V1 => 1,
        }
    }

    #[must_use]
    pub const fn segment(self) -> &'static str {
        match self {
            Self::V1 => "v1",
        }
    }
}

impl TryFrom<i16> for ApiTokenVersion {
    type Error = ApiTokenError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::V1),
            _ => Err(ApiTokenError::UnsupportedVersion),
        }
    }
}

impl FromStr for ApiTokenVersion {
    type Err = ApiTokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "v1" => Ok(Self::V1),
            _ => Err(ApiTokenError::UnsupportedVersion),
        }
    }
}

#[derive(Clone)]
pub struct ApiTokenSecret {
    bytes: [u8; API_TOKEN_SECRET_BYTES],
}

impl ApiTokenSecret {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; API_TOKEN_SECRET_BYTES]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; API_TOKEN_SECRET_BYTES] {
        &self.bytes
    }
}

impl fmt::Debug for ApiTokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiTokenSecret(**redacted**)")
    }
}

impl Drop for ApiTokenSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

#[derive(Debug, Clone)]
pub struct ParsedApiToken {
    pub token_uuid: Uuid,
    pub version: ApiTokenVersion,
    pub secret: ApiTokenSecret,
}

#[derive(Debug, Error)]
pub enum ApiTokenError {
    #[error("api token format is invalid")]
    InvalidFormat,

    #[error("api token uses an unsupported version")]
    UnsupportedVersion,

    #[error("api token secret encoding is invalid")]
    InvalidSecretEncoding,

    #[error("token hashing key is invalid")]
    InvalidKey,
}

/// Keyed hasher producing and checking stored token verifiers.
#[derive(Clone)]
pub struct TokenHasher {
    key: Vec<u8>,
}

impl fmt::Debug for TokenHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenHasher(**redacted**)")
    }
}

impl Drop for TokenHasher {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl TokenHasher {
    /// # Errors
    ///
    /// Returns [`ApiTokenError::InvalidKey`] for an empty key.
    pub fn new(key: &[u8]) -> Result<Self, ApiTokenError> {
        if key.is_empty() {
            return Err(ApiTokenError::InvalidKey);
        }

        Ok(Self { key: key.to_vec() })
    }

    fn mac(&self) -> Result<HmacSha256, ApiTokenError> {
        HmacSha256::new_from_slice(&self.key).map_err(|_invalid| ApiTokenError::InvalidKey)
    }

    /// Hex verifier for `input`.
    ///
    /// # Errors
    ///
    /// Returns an error when the key cannot initialise the MAC.
    pub fn hash(&self, input: &[u8]) -> Result<String, ApiTokenError> {
        let mut mac = self.mac()?;
        mac.update(input);

        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Constant-time comparison of `input` against a stored hex verifier.
    ///
    /// # Errors
    ///
    /// Returns an error when the key cannot initialise the MAC.
    pub fn verify(&self, input: &[u8], verifier: &str) -> Result<bool, ApiTokenError> {
        let Ok(expected) = hex::decode(verifier) else {
            return Ok(false);
        };

        let mut mac = self.mac()?;
        mac.update(input);

        Ok(mac.verify_slice(&expected).is_ok())
    }
}

#[must_use]
pub fn generate_api_token_secret() -> ApiTokenSecret {
    let mut secret = [0_u8; API_TOKEN_SECRET_BYTES];

    OsRng.fill_bytes(&mut secret);

    ApiTokenSecret::from_bytes(secret)
}

#[must_use]
pub fn format_api_token(
    token_uuid: Uuid,
    version: ApiTokenVersion,
    secret: &ApiTokenSecret,
) -> String {
    format!(
        "{API_TOKEN_PREFIX}_{}_{}.{}",
        version.segment(),
        token_uuid.simple(),
        hex::encode(secret.as_bytes())
    )
}

/// # Errors
///
/// Returns an [`ApiTokenError`] when the token is malformed.
pub fn parse_api_token(token: &str) -> Result<ParsedApiToken, ApiTokenError> {
    let (prefix_and_id, secret_hex) = token.split_once('.').ok_or(ApiTokenError::InvalidFormat)?;

    let mut id_parts = prefix_and_id.splitn(3, '_');

    let prefix = id_parts.next().ok_or(ApiTokenError::InvalidFormat)?;
    let version_segment = id_parts.next().ok_or(ApiTokenError::InvalidFormat)?;
    let token_uuid_segment = id_parts.next().ok_or(ApiTokenError::InvalidFormat)?;

    if prefix != API_TOKEN_PREFIX {
        return Err(ApiTokenError::InvalidFormat);
    }

    let version = ApiTokenVersion::from_str(version_segment)?;

    let token_uuid =
        Uuid::try_parse(token_uuid_segment).map_err(|_invalid| ApiTokenError::InvalidFormat)?;

    let mut secret = [0_u8; API_TOKEN_SECRET_BYTES];

    hex::decode_to_slice(secret_hex, &mut secret)
        .map_err(|_invalid| ApiTokenError::InvalidSecretEncoding)?;

    Ok(ParsedApiToken {
        token_uuid,
        version,
        secret: ApiTokenSecret::from_bytes(secret),
    })
}

/// Build the canonical verifier input bytes for a token.
///
/// Format: `{token_uuid_hex}:{version_i16_decimal}:{user_uuid_hex}:{secret_hex}`
#[must_use]
pub fn build_verifier_input(
    token_uuid: &Uuid,
    version: ApiTokenVersion,
    user_uuid: &UserUuid,
    secret: &ApiTokenSecret,
) -> Vec<u8> {
    format!(
        "{}:{}:{}:{}",
        token_uuid.simple(),
        version.as_i16(),
        user_uuid.into_uuid().simple(),
        hex::encode(secret.as_bytes()),
    )
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format_round_trip() {
        let token_uuid = Uuid::nil();
        let secret = ApiTokenSecret::from_bytes([0xAB; API_TOKEN_SECRET_BYTES]);
        let token = format_api_token(token_uuid, ApiTokenVersion::V1, &secret);
        let parsed = parse_api_token(&token).expect("token should parse");

        assert_eq!(parsed.token_uuid, token_uuid);
        assert_eq!(parsed.version, ApiTokenVersion::V1);
        assert_eq!(parsed.secret.as_bytes(), secret.as_bytes());
    }

    #[test]
    fn parse_rejects_invalid_prefix() {
        assert!(parse_api_token("lt_v1_00000000000000000000000000000000.aa").is_err());
    }

    #[test]
    fn parse_rejects_short_secret() {
        assert!(matches!(
            parse_api_token("fo_v1_00000000000000000000000000000000.abcd"),
            Err(ApiTokenError::InvalidSecretEncoding)
        ));
    }

    #[test]
    fn hasher_verifies_its_own_output() {
        let hasher = TokenHasher::new(b"test-key").expect("key should be accepted");
        let other = TokenHasher::new(b"other-key").expect("key should be accepted");

        let user = UserUuid::from_uuid(Uuid::nil());
        let secret = ApiTokenSecret::from_bytes([0xCD; API_TOKEN_SECRET_BYTES]);
        let input = build_verifier_input(&Uuid::nil(), ApiTokenVersion::V1, &user, &secret);

        let verifier = hasher.hash(&input).expect("hash should succeed");

        assert!(hasher.verify(&input, &verifier).expect("verify should succeed"));
        assert!(!other.verify(&input, &verifier).expect("verify should succeed"));
        assert!(!hasher.verify(&input, "not-hex").expect("verify should succeed"));
    }

    #[test]
    fn empty_hasher_key_is_rejected() {
        assert!(matches!(TokenHasher::new(b""), Err(ApiTokenError::InvalidKey)));
    }
}
