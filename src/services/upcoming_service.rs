use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use serde_json::Value;

use crate::{
    database::{self, MongoDB},
    models::Meal,
    services::meal_service::build_meal_sort,
    utils::doc_to_json,
};

/// Like count at which a staged meal is promoted into the catalog.
pub const PROMOTION_THRESHOLD: i64 = 10;

#[derive(Debug, PartialEq)]
pub enum UpcomingLikeOutcome {
    Liked { promoted: bool },
    AlreadyLiked,
    NotFound,
}

#[derive(Debug, PartialEq)]
pub enum PromoteOutcome {
    Promoted,
    NotFound,
}

pub fn ready_for_promotion(likes: i64) -> bool {
    likes >= PROMOTION_THRESHOLD
}

pub async fn list_upcoming(db: &MongoDB, sort: Option<&str>) -> Result<Vec<Value>, String> {
    let collection = db.collection::<Document>(database::UPCOMING_MEALS);

    let pipeline = vec![
        doc! { "$addFields": { "reviewsCount": { "$size": { "$ifNull": ["$reviews", []] } } } },
        doc! { "$sort": build_meal_sort(sort) },
    ];

    let mut cursor = collection
        .aggregate(pipeline)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let mut meals = Vec::new();
    while let Some(result) = cursor.next().await {
        let doc = result.map_err(|e| format!("Cursor error: {}", e))?;
        meals.push(doc_to_json(doc));
    }

    Ok(meals)
}

pub async fn get_upcoming(db: &MongoDB, id: ObjectId) -> Result<Option<Value>, String> {
    let meal = db
        .collection::<Document>(database::UPCOMING_MEALS)
        .find_one(doc! { "_id": id })
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(meal.map(doc_to_json))
}

pub async fn create_upcoming(db: &MongoDB, mut meal: Document) -> Result<String, String> {
    meal.remove("_id");
    meal.entry("likes".to_string()).or_insert(0_i64.into());
    meal.entry("likedBy".to_string())
        .or_insert(Vec::<mongodb::bson::Bson>::new().into());
    meal.entry("reviews".to_string())
        .or_insert(Vec::<mongodb::bson::Bson>::new().into());

    let result = db
        .collection::<Document>(database::UPCOMING_MEALS)
        .insert_one(meal)
        .await
        .map_err(|e| format!("Failed to insert upcoming meal: {}", e))?;

    let id = result
        .inserted_id
        .as_object_id()
        .map(|oid| oid.to_hex())
        .unwrap_or_default();

    log::info!("✅ Upcoming meal created: {}", id);
    Ok(id)
}

pub async fn delete_upcoming(db: &MongoDB, id: ObjectId) -> Result<u64, String> {
    let result = db
        .collection::<Document>(database::UPCOMING_MEALS)
        .delete_one(doc! { "_id": id })
        .await
        .map_err(|e| format!("Failed to delete upcoming meal: {}", e))?;

    Ok(result.deleted_count)
}

/// Moves a staged meal into the catalog, keeping its identity. Insert
/// and delete run in one multi-document transaction so the meal can
/// never be lost between the two collections.
pub async fn promote(db: &MongoDB, id: ObjectId) -> Result<PromoteOutcome, String> {
    let upcoming = db.collection::<Document>(database::UPCOMING_MEALS);
    let meals = db.collection::<Document>(database::MEALS);

    let meal = upcoming
        .find_one(doc! { "_id": id })
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let meal = match meal {
        Some(meal) => meal,
        None => return Ok(PromoteOutcome::NotFound),
    };

    let mut session = db
        .client()
        .start_session()
        .await
        .map_err(|e| format!("Failed to start session: {}", e))?;

    session
        .start_transaction()
        .await
        .map_err(|e| format!("Failed to start transaction: {}", e))?;

    let moved = async {
        meals
            .insert_one(meal)
            .session(&mut session)
            .await
            .map_err(|e| format!("Failed to insert into catalog: {}", e))?;

        upcoming
            .delete_one(doc! { "_id": id })
            .session(&mut session)
            .await
            .map_err(|e| format!("Failed to remove from staging: {}", e))?;

        Ok::<(), String>(())
    }
    .await;

    if let Err(e) = moved {
        let _ = session.abort_transaction().await;
        return Err(e);
    }

    session
        .commit_transaction()
        .await
        .map_err(|e| format!("Failed to commit promotion: {}", e))?;

    log::info!("🚀 Upcoming meal {} promoted to catalog", id.to_hex());
    Ok(PromoteOutcome::Promoted)
}

/// Like with the same duplicate guard as the catalog, plus the
/// promotion trigger: once the updated count reaches the threshold the
/// meal is moved out of staging immediately.
pub async fn like_upcoming(
    db: &MongoDB,
    id: ObjectId,
    email: &str,
) -> Result<UpcomingLikeOutcome, String> {
    let collection = db.collection::<Meal>(database::UPCOMING_MEALS);

    let meal = collection
        .find_one(doc! { "_id": id })
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let meal = match meal {
        Some(meal) => meal,
        None => return Ok(UpcomingLikeOutcome::NotFound),
    };

    if meal.liked_by_user(email) {
        return Ok(UpcomingLikeOutcome::AlreadyLiked);
    }

    collection
        .update_one(
            doc! { "_id": id },
            doc! { "$inc": { "likes": 1 }, "$push": { "likedBy": email } },
        )
        .await
        .map_err(|e| format!("Failed to update likes: {}", e))?;

    let updated = collection
        .find_one(doc! { "_id": id })
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    if let Some(updated) = updated {
        if ready_for_promotion(updated.likes) {
            promote(db, id).await?;
            return Ok(UpcomingLikeOutcome::Liked { promoted: true });
        }
    }

    Ok(UpcomingLikeOutcome::Liked { promoted: false })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion_threshold() {
        assert!(!ready_for_promotion(0));
        assert!(!ready_for_promotion(9));
        assert!(ready_for_promotion(10));
        assert!(ready_for_promotion(11));
    }
}
