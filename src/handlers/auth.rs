use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{self, Claims};
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::user_service;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - Authenticate a user and issue a JWT
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    let user = user_service::find_by_email(&payload.email).await?;

    let user = match user {
        Some(u) if u.is_active && auth::verify_password(&payload.password, &u.password_hash) => u,
        // Same message for unknown address, wrong password and inactive
        // account, so the endpoint doesn't reveal which one failed
        _ => return Err(ApiError::unauthorized("Identifiants invalides")),
    };

    let claims = Claims::new(user.id, user.email.clone(), user.name.clone());
    let token = auth::generate_jwt(&claims)?;

    Ok(ApiResponse::success(json!({
        "token": token,
        "user": user,
        "expiresIn": claims.exp - claims.iat,
    })))
}

/// GET /api/auth/whoami - Decode the bearer token back into its claims
pub async fn whoami(headers: HeaderMap) -> ApiResult<Claims> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("Jeton d'authentification manquant"))?;

    let claims = auth::verify_jwt(token)?;
    Ok(ApiResponse::success(claims))
}
