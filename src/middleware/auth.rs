use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::auth::{AuthUser, Capability, Claims};
use crate::context::AppContext;
use crate::error::ApiError;

/// Admin guard: validates the bearer token and requires the admin
/// capability before letting the request through. The validated caller
/// context is injected as a request extension.
pub async fn require_admin(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers).map_err(ApiError::unauthorized)?;
    let claims = validate_token(&token, &ctx.config.security.jwt_secret)
        .map_err(ApiError::unauthorized)?;

    let user = AuthUser::from(claims);
    if !user.allows(Capability::Admin) {
        return Err(ApiError::forbidden("admin access required"));
    }

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub(crate) fn extract_bearer(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err("Empty bearer token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}

pub(crate) fn validate_token(token: &str, secret: &str) -> Result<Claims, String> {
    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| format!("Invalid bearer token: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    fn token_for(admin: bool, secret: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            admin,
            exp: now + 3600,
            iat: now,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .unwrap()
    }

    #[test]
    fn bearer_extraction() {
        assert!(extract_bearer(&HeaderMap::new()).is_err());
        assert!(extract_bearer(&headers_with("Basic abc")).is_err());
        assert!(extract_bearer(&headers_with("Bearer ")).is_err());
        assert_eq!(extract_bearer(&headers_with("Bearer tok")).unwrap(), "tok");
    }

    #[test]
    fn validates_round_trip_and_rejects_wrong_secret() {
        let token = token_for(true, "s3cret");
        let claims = validate_token(&token, "s3cret").unwrap();
        assert!(claims.admin);

        assert!(validate_token(&token, "other").is_err());
        assert!(validate_token(&token, "").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            admin: true,
            exp: now - 120,
            iat: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();
        assert!(validate_token(&token, "s3cret").is_err());
    }
}
