use actix_web::{web, HttpResponse};
use mongodb::bson::to_document;
use serde::Deserialize;

use crate::{
    database::MongoDB,
    services::{
        guard_service,
        token_service::Claims,
        user_service::{self, RegisterUserRequest},
    },
    utils::{page_params, AppError},
};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct UserListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub query: String,
}

/// POST /users - Idempotent registration (public, called on first sign-in)
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = RegisterUserRequest,
    responses(
        (status = 200, description = "User stored or already present"),
        (status = 400, description = "Malformed registration payload")
    )
)]
pub async fn create_user(
    db: web::Data<MongoDB>,
    body: web::Json<RegisterUserRequest>,
) -> Result<HttpResponse, AppError> {
    let user = to_document(&body.into_inner()).map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    match user_service::register_user(&db, user).await {
        Ok(()) => Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true }))),
        Err(e) if e == "email is required" => Err(AppError::InvalidRequest(e)),
        Err(e) => {
            log::error!("❌ Error registering user: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// GET /users - Paginated user list with optional text search (admin)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users and total count"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_users(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse, AppError> {
    guard_service::require_admin(&db, &user.sub).await?;

    let (limit, offset) = page_params(query.limit, query.offset);

    match user_service::list_users(&db, limit, offset, query.search.as_deref()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            log::error!("❌ Error listing users: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// GET /users/suggestions - Username/email lookup for the admin search box
pub async fn user_suggestions(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    query: web::Query<SuggestionQuery>,
) -> Result<HttpResponse, AppError> {
    guard_service::require_admin(&db, &user.sub).await?;

    match user_service::user_suggestions(&db, &query.query).await {
        Ok(suggestions) => Ok(HttpResponse::Ok().json(suggestions)),
        Err(e) => {
            log::error!("❌ Error fetching suggestions: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// GET /users/profile - The caller's own record plus meal count
pub async fn user_profile(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    match user_service::user_profile(&db, &user.sub).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(profile)),
        Err(e) => {
            log::error!("❌ Error fetching profile: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// GET /users/admin - Whether the caller holds the admin role
pub async fn admin_status(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    match user_service::is_admin(&db, &user.sub).await {
        Ok(admin) => Ok(HttpResponse::Ok().json(serde_json::json!({ "admin": admin }))),
        Err(e) => {
            log::error!("❌ Error checking admin role: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// GET /users/reviews - Meals the caller has reviewed, narrowed to their review
pub async fn my_reviews(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    match user_service::user_reviews(&db, &user.sub).await {
        Ok(meals) => Ok(HttpResponse::Ok().json(meals)),
        Err(e) => {
            log::error!("❌ Error fetching reviews: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// PUT /users/admin/{email} - Grants the admin role (admin)
pub async fn promote_admin(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    email: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    guard_service::require_admin(&db, &user.sub).await?;

    match user_service::promote_to_admin(&db, &email).await {
        Ok(modified) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({ "modifiedCount": modified })))
        }
        Err(e) => {
            log::error!("❌ Error promoting user: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}
