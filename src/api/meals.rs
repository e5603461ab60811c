use actix_web::{web, HttpResponse};
use mongodb::bson::{to_document, Document};
use serde::Deserialize;

use crate::{
    database::MongoDB,
    services::{
        guard_service,
        meal_service::{self, CreateMealRequest, LikeOutcome, MealListQuery, ReviewOutcome},
        token_service::Claims,
    },
    utils::{page_params, parse_object_id, AppError},
};

#[derive(Debug, Deserialize)]
pub struct AdminMealsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReviewRequest {
    pub review: String,
}

/// GET /meals - Filtered, sorted, paginated catalog (public)
#[utoipa::path(
    get,
    path = "/meals",
    tag = "Meals",
    params(MealListQuery),
    responses(
        (status = 200, description = "Meals and total count")
    )
)]
pub async fn list_meals(
    db: web::Data<MongoDB>,
    query: web::Query<MealListQuery>,
) -> Result<HttpResponse, AppError> {
    match meal_service::list_meals(&db, &query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            log::error!("❌ Error listing meals: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// GET /meals/admin - Whole catalog for the admin dashboard
pub async fn admin_meals(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    query: web::Query<AdminMealsQuery>,
) -> Result<HttpResponse, AppError> {
    guard_service::require_admin(&db, &user.sub).await?;

    let (limit, offset) = page_params(query.limit, query.offset);

    match meal_service::admin_meals(&db, limit, offset, query.sort.as_deref()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            log::error!("❌ Error listing meals: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// GET /meals/category/{category} - Up to 9 meals, "All" matches everything
pub async fn meals_by_category(
    db: web::Data<MongoDB>,
    category: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    match meal_service::meals_by_category(&db, &category).await {
        Ok(meals) => Ok(HttpResponse::Ok().json(meals)),
        Err(e) => {
            log::error!("❌ Error listing category {}: {}", category, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// GET /meals/{id} - Single meal (public)
#[utoipa::path(
    get,
    path = "/meals/{id}",
    tag = "Meals",
    params(("id" = String, Path, description = "Meal id")),
    responses(
        (status = 200, description = "The meal"),
        (status = 404, description = "No such meal")
    )
)]
pub async fn get_meal(
    db: web::Data<MongoDB>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let meal_id = parse_object_id(&id)?;

    match meal_service::get_meal(&db, meal_id).await {
        Ok(Some(meal)) => Ok(HttpResponse::Ok().json(meal)),
        Ok(None) => Err(AppError::NotFound(format!("meal {}", id))),
        Err(e) => {
            log::error!("❌ Error fetching meal {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// POST /meals - Adds a meal to the catalog (admin)
#[utoipa::path(
    post,
    path = "/meals",
    tag = "Meals",
    request_body = CreateMealRequest,
    responses(
        (status = 200, description = "Meal created"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn create_meal(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    body: web::Json<CreateMealRequest>,
) -> Result<HttpResponse, AppError> {
    guard_service::require_admin(&db, &user.sub).await?;

    let meal = to_document(&body.into_inner()).map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    match meal_service::create_meal(&db, meal).await {
        Ok(id) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "acknowledged": true,
            "insertedId": id
        }))),
        Err(e) => {
            log::error!("❌ Error creating meal: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// PUT /meals/{id} - Admin edit, replaces the supplied fields
pub async fn update_meal(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    id: web::Path<String>,
    body: web::Json<Document>,
) -> Result<HttpResponse, AppError> {
    guard_service::require_admin(&db, &user.sub).await?;
    let meal_id = parse_object_id(&id)?;

    match meal_service::update_meal(&db, meal_id, body.into_inner()).await {
        Ok(modified) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({ "modifiedCount": modified })))
        }
        Err(e) => {
            log::error!("❌ Error updating meal {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// DELETE /meals/{id} - Removes a meal (admin). Requests pointing at it
/// are cleaned up lazily on their next listing.
pub async fn delete_meal(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    guard_service::require_admin(&db, &user.sub).await?;
    let meal_id = parse_object_id(&id)?;

    match meal_service::delete_meal(&db, meal_id).await {
        Ok(deleted) => Ok(HttpResponse::Ok().json(serde_json::json!({ "deletedCount": deleted }))),
        Err(e) => {
            log::error!("❌ Error deleting meal {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// PUT /meals/{id}/like - At most one like per user per meal
#[utoipa::path(
    put,
    path = "/meals/{id}/like",
    tag = "Meals",
    params(("id" = String, Path, description = "Meal id")),
    responses(
        (status = 200, description = "Like counted"),
        (status = 400, description = "Caller already liked this meal"),
        (status = 404, description = "No such meal")
    )
)]
pub async fn like_meal(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let meal_id = parse_object_id(&id)?;

    match meal_service::like_meal(&db, meal_id, &user.sub).await {
        Ok(LikeOutcome::Liked) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({ "modifiedCount": 1 })))
        }
        Ok(LikeOutcome::AlreadyLiked) => Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "You have already liked this meal"
        }))),
        Ok(LikeOutcome::NotFound) => Err(AppError::NotFound(format!("meal {}", id))),
        Err(e) => {
            log::error!("❌ Error liking meal {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// PUT /meals/{id}/review - Upserts the caller's review
#[utoipa::path(
    put,
    path = "/meals/{id}/review",
    tag = "Meals",
    params(("id" = String, Path, description = "Meal id")),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review stored"),
        (status = 404, description = "No such meal")
    )
)]
pub async fn review_meal(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    id: web::Path<String>,
    body: web::Json<ReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let meal_id = parse_object_id(&id)?;

    match meal_service::review_meal(&db, meal_id, &user.sub, &body.review).await {
        Ok(ReviewOutcome::Updated) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({ "modifiedCount": 1 })))
        }
        Ok(ReviewOutcome::NotFound) => Err(AppError::NotFound(format!("meal {}", id))),
        Err(e) => {
            log::error!("❌ Error reviewing meal {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// DELETE /meals/{id}/review - Removes the caller's review
pub async fn delete_review(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let meal_id = parse_object_id(&id)?;

    match meal_service::delete_review(&db, meal_id, &user.sub).await {
        Ok(ReviewOutcome::Updated) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({ "modifiedCount": 1 })))
        }
        Ok(ReviewOutcome::NotFound) => Err(AppError::NotFound(format!("meal {}", id))),
        Err(e) => {
            log::error!("❌ Error deleting review on meal {}: {}", id, e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}
