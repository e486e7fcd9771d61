use actix_web::http::header;
use actix_web::HttpRequest;
use anyhow::anyhow;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub(crate) sub: i64,
    pub(crate) exp: i64,
}

const JWT_TTL: i64 = 60 * 60;

/// Stateless bearer-token session layer: issues HS256 tokens at
/// register/login and resolves the authenticated user id on every other
/// route.
pub struct JwtManager {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
}

impl JwtManager {
    pub fn new(secret_key: &str) -> JwtManager {
        JwtManager {
            decoding_key: DecodingKey::from_secret(secret_key.as_ref()),
            encoding_key: EncodingKey::from_secret(secret_key.as_ref()),
        }
    }

    pub fn issue_user_token(&self, user_id: i64) -> anyhow::Result<String> {
        let claims = Claims {
            sub: user_id,
            exp: chrono::Utc::now().timestamp() + JWT_TTL,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| err.into())
    }

    pub fn user_id_from_req(&self, req: &HttpRequest) -> anyhow::Result<i64> {
        let auth_header = req
            .headers()
            .get(header::AUTHORIZATION)
            .ok_or_else(|| anyhow!("missing authorization header"))?
            .to_str()?;
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| anyhow!("malformed authorization header"))?
            .trim();

        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.sub)
            .map_err(|err| err.into())
    }
}
