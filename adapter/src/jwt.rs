// adapter/src/jwt.rs
//
// アクセストークンの発行と検証。HS256 で署名し、
// トークン自体に有効期限を埋め込むのでサーバー側の保存は不要。
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use kernel::model::{auth::AccessToken, id::UserId};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: u64,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: UserId) -> AppResult<AccessToken> {
        self.issue_at(user_id, Utc::now())
    }

    fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> AppResult<AccessToken> {
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl as i64)).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map(AccessToken)
            .map_err(AppError::JwtError)
    }

    pub fn verify(&self, token: &AccessToken) -> AppResult<UserId> {
        // 期限切れ 1 秒前のトークンを通し、1 秒後のトークンを落とすため
        // leeway は 0 にする
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(&token.0, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::MalformedToken,
            }
        })?;

        data.claims
            .sub
            .parse::<UserId>()
            .map_err(|_| AppError::MalformedToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_to_the_same_user() -> anyhow::Result<()> {
        let codec = TokenCodec::new("test-secret", 3600);
        let user_id = UserId::new();
        let token = codec.issue(user_id)?;
        assert_eq!(codec.verify(&token)?, user_id);
        Ok(())
    }

    #[test]
    fn token_one_second_before_expiry_is_accepted() -> anyhow::Result<()> {
        let codec = TokenCodec::new("test-secret", 1);
        let user_id = UserId::new();
        // 有効期限は now + 1 秒。直後の検証は期限の 1 秒前にあたる
        let token = codec.issue_at(user_id, Utc::now())?;
        assert_eq!(codec.verify(&token)?, user_id);
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected_as_expired() -> anyhow::Result<()> {
        let codec = TokenCodec::new("test-secret", 60);
        let user_id = UserId::new();
        let token = codec.issue_at(user_id, Utc::now() - Duration::seconds(120))?;
        assert!(matches!(codec.verify(&token), Err(AppError::ExpiredToken)));
        Ok(())
    }

    #[test]
    fn tampered_token_is_rejected_as_malformed() -> anyhow::Result<()> {
        let codec = TokenCodec::new("test-secret", 3600);
        let AccessToken(raw) = codec.issue(UserId::new())?;
        let tampered = AccessToken(format!("{raw}x"));
        assert!(matches!(
            codec.verify(&tampered),
            Err(AppError::MalformedToken)
        ));
        Ok(())
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() -> anyhow::Result<()> {
        let codec = TokenCodec::new("test-secret", 3600);
        let other = TokenCodec::new("other-secret", 3600);
        let token = other.issue(UserId::new())?;
        assert!(matches!(
            codec.verify(&token),
            Err(AppError::MalformedToken)
        ));
        Ok(())
    }
}
