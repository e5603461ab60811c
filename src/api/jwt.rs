use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::services::token_service;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct TokenRequest {
    pub email: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /jwt - Issues a signed token asserting the supplied identity
#[utoipa::path(
    post,
    path = "/jwt",
    tag = "Auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse)
    )
)]
pub async fn create_token(body: web::Json<TokenRequest>) -> impl Responder {
    match token_service::issue_token(&body.email) {
        Ok(token) => HttpResponse::Ok().json(TokenResponse { token }),
        Err(e) => {
            log::error!("❌ Failed to issue token: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "message": e }))
        }
    }
}
