use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    database::MongoDB,
    services::{
        guard_service,
        request_service::{self, RequestOutcome},
        token_service::Claims,
    },
    utils::{parse_object_id, AppError},
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CreateRequestBody {
    #[serde(rename = "mealId")]
    pub meal_id: String,
}

/// POST /meals/request - Paid-tier users request a meal, once per meal
#[utoipa::path(
    post,
    path = "/meals/request",
    tag = "Requests",
    request_body = CreateRequestBody,
    responses(
        (status = 200, description = "Request created"),
        (status = 400, description = "Meal already requested"),
        (status = 402, description = "Caller is on the free tier")
    )
)]
pub async fn create_request(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    body: web::Json<CreateRequestBody>,
) -> Result<HttpResponse, AppError> {
    guard_service::require_paid(&db, &user.sub).await?;

    match request_service::create_request(&db, &body.meal_id, &user.sub).await {
        Ok(RequestOutcome::Created(id)) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "acknowledged": true,
            "insertedId": id
        }))),
        Ok(RequestOutcome::AlreadyRequested) => {
            Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "You have already requested this meal"
            })))
        }
        Err(e) => {
            log::error!("❌ Error creating meal request: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// GET /meals/request - The caller's requests joined with their meals
#[utoipa::path(
    get,
    path = "/meals/request",
    tag = "Requests",
    responses(
        (status = 200, description = "Requests with meal data, dangling entries removed"),
        (status = 402, description = "Caller is on the free tier")
    )
)]
pub async fn my_requests(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    guard_service::require_paid(&db, &user.sub).await?;

    match request_service::requests_for(&db, &user.sub).await {
        Ok(meals) => Ok(HttpResponse::Ok().json(meals)),
        Err(e) => {
            log::error!("❌ Error listing meal requests: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// GET /meals/serve - Every open request, for the serving dashboard
pub async fn serve_list(
    _user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    match request_service::all_requests(&db).await {
        Ok(meals) => Ok(HttpResponse::Ok().json(meals)),
        Err(e) => {
            log::error!("❌ Error listing serve queue: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// PUT /meals/serve/{id} - Marks a request Delivered (admin)
#[utoipa::path(
    put,
    path = "/meals/serve/{id}",
    tag = "Requests",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request delivered"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn serve_request(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    guard_service::require_admin(&db, &user.sub).await?;
    let request_id = parse_object_id(&id)?;

    match request_service::serve_request(&db, request_id).await {
        Ok(modified) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({ "modifiedCount": modified })))
        }
        Err(e) => {
            log::error!("❌ Error serving request {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// DELETE /meals/request/{id} - Cancels (deletes) a request
pub async fn cancel_request(
    _user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let request_id = parse_object_id(&id)?;

    match request_service::cancel_request(&db, request_id).await {
        Ok(deleted) => Ok(HttpResponse::Ok().json(serde_json::json!({ "deletedCount": deleted }))),
        Err(e) => {
            log::error!("❌ Error cancelling request {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}
