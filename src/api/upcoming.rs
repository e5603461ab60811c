use actix_web::{web, HttpResponse};
use mongodb::bson::to_document;
use serde::Deserialize;

use crate::{
    database::MongoDB,
    services::{
        guard_service,
        meal_service::CreateMealRequest,
        token_service::Claims,
        upcoming_service::{self, PromoteOutcome, UpcomingLikeOutcome},
    },
    utils::{parse_object_id, AppError},
};

#[derive(Debug, Deserialize)]
pub struct UpcomingListQuery {
    pub sort: Option<String>,
}

/// GET /meals/upcoming - Staged meals with review counts (public)
pub async fn list_upcoming(
    db: web::Data<MongoDB>,
    query: web::Query<UpcomingListQuery>,
) -> Result<HttpResponse, AppError> {
    match upcoming_service::list_upcoming(&db, query.sort.as_deref()).await {
        Ok(meals) => Ok(HttpResponse::Ok().json(meals)),
        Err(e) => {
            log::error!("❌ Error listing upcoming meals: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// GET /meals/upcoming/{id} - Single staged meal (public)
pub async fn get_upcoming(
    db: web::Data<MongoDB>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let meal_id = parse_object_id(&id)?;

    match upcoming_service::get_upcoming(&db, meal_id).await {
        Ok(Some(meal)) => Ok(HttpResponse::Ok().json(meal)),
        Ok(None) => Err(AppError::NotFound(format!("upcoming meal {}", id))),
        Err(e) => {
            log::error!("❌ Error fetching upcoming meal {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// POST /meals/upcoming - Stages a meal (admin)
pub async fn create_upcoming(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    body: web::Json<CreateMealRequest>,
) -> Result<HttpResponse, AppError> {
    guard_service::require_admin(&db, &user.sub).await?;

    let meal = to_document(&body.into_inner()).map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    match upcoming_service::create_upcoming(&db, meal).await {
        Ok(id) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "acknowledged": true,
            "insertedId": id
        }))),
        Err(e) => {
            log::error!("❌ Error creating upcoming meal: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// PUT /meals/upcoming/{id}/like - Paid-tier like; reaching the
/// threshold moves the meal into the catalog as a side effect
#[utoipa::path(
    put,
    path = "/meals/upcoming/{id}/like",
    tag = "Upcoming",
    params(("id" = String, Path, description = "Upcoming meal id")),
    responses(
        (status = 200, description = "Like counted, meal possibly promoted"),
        (status = 400, description = "Caller already liked this meal"),
        (status = 402, description = "Caller is on the free tier"),
        (status = 404, description = "No such upcoming meal")
    )
)]
pub async fn like_upcoming(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    guard_service::require_paid(&db, &user.sub).await?;
    let meal_id = parse_object_id(&id)?;

    match upcoming_service::like_upcoming(&db, meal_id, &user.sub).await {
        Ok(UpcomingLikeOutcome::Liked { promoted }) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "modifiedCount": 1,
                "promoted": promoted
            })))
        }
        Ok(UpcomingLikeOutcome::AlreadyLiked) => {
            Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "You have already liked this meal"
            })))
        }
        Ok(UpcomingLikeOutcome::NotFound) => {
            Err(AppError::NotFound(format!("upcoming meal {}", id)))
        }
        Err(e) => {
            log::error!("❌ Error liking upcoming meal {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// PUT /meals/upcoming/{id}/publish - Admin promotion at any like count
#[utoipa::path(
    put,
    path = "/meals/upcoming/{id}/publish",
    tag = "Upcoming",
    params(("id" = String, Path, description = "Upcoming meal id")),
    responses(
        (status = 200, description = "Meal moved into the catalog"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such upcoming meal")
    )
)]
pub async fn publish_upcoming(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    guard_service::require_admin(&db, &user.sub).await?;
    let meal_id = parse_object_id(&id)?;

    match upcoming_service::promote(&db, meal_id).await {
        Ok(PromoteOutcome::Promoted) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({ "acknowledged": true })))
        }
        Ok(PromoteOutcome::NotFound) => Err(AppError::NotFound(format!("upcoming meal {}", id))),
        Err(e) => {
            log::error!("❌ Error publishing upcoming meal {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// DELETE /meals/upcoming/{id} - Drops a staged meal (admin)
pub async fn delete_upcoming(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    guard_service::require_admin(&db, &user.sub).await?;
    let meal_id = parse_object_id(&id)?;

    match upcoming_service::delete_upcoming(&db, meal_id).await {
        Ok(deleted) => Ok(HttpResponse::Ok().json(serde_json::json!({ "deletedCount": deleted }))),
        Err(e) => {
            log::error!("❌ Error deleting upcoming meal {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}
