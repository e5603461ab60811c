use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use serde_json::Value;

use crate::{
    database::{self, MongoDB},
    models::{MealRequest, STATUS_DELIVERED, STATUS_REQUESTED},
    utils::doc_to_json,
};

#[derive(Debug, PartialEq)]
pub enum RequestOutcome {
    Created(String),
    AlreadyRequested,
}

/// Joins a request with its target meal. The request's own fields
/// (including `_id` and `status`) win over the meal's, so the caller
/// gets back a request row enriched with the meal data.
pub fn merge_request_with_meal(mut meal: Document, request: Document) -> Document {
    meal.remove("_id");
    for (key, value) in request {
        meal.insert(key, value);
    }
    meal
}

/// One active request per (email, mealId): a second submission for the
/// same pair is rejected. The check and the insert are separate round
/// trips; concurrent duplicates are a documented race.
pub async fn create_request(
    db: &MongoDB,
    meal_id: &str,
    email: &str,
) -> Result<RequestOutcome, String> {
    let collection = db.collection::<MealRequest>(database::MEAL_REQUESTS);

    let existing = collection
        .find_one(doc! { "email": email, "mealId": meal_id })
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    if existing.is_some() {
        return Ok(RequestOutcome::AlreadyRequested);
    }

    let request = MealRequest {
        id: None,
        meal_id: meal_id.to_string(),
        email: email.to_string(),
        status: STATUS_REQUESTED.to_string(),
    };

    let result = collection
        .insert_one(request)
        .await
        .map_err(|e| format!("Failed to insert request: {}", e))?;

    let id = result
        .inserted_id
        .as_object_id()
        .map(|oid| oid.to_hex())
        .unwrap_or_default();

    log::info!("🍽️  Meal {} requested by {}", meal_id, email);
    Ok(RequestOutcome::Created(id))
}

/// Resolves each request against the catalog. Requests whose target
/// meal no longer exists (or whose reference never parsed) are deleted
/// here and omitted from the result - dangling references are cleaned
/// up lazily on read, not eagerly on meal deletion.
pub async fn reconcile_requests(db: &MongoDB, filter: Document) -> Result<Vec<Value>, String> {
    let requests = db.collection::<Document>(database::MEAL_REQUESTS);
    let meals = db.collection::<Document>(database::MEALS);

    let mut cursor = requests
        .find(filter)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let mut pending = Vec::new();
    while let Some(result) = cursor.next().await {
        pending.push(result.map_err(|e| format!("Cursor error: {}", e))?);
    }

    let mut resolved = Vec::new();
    for request in pending {
        let target = request
            .get_str("mealId")
            .ok()
            .and_then(|id| ObjectId::parse_str(id).ok());

        let meal = match target {
            Some(meal_id) => meals
                .find_one(doc! { "_id": meal_id })
                .await
                .map_err(|e| format!("Database error: {}", e))?,
            None => None,
        };

        match meal {
            Some(meal) => resolved.push(doc_to_json(merge_request_with_meal(meal, request))),
            None => {
                if let Ok(request_id) = request.get_object_id("_id") {
                    requests
                        .delete_one(doc! { "_id": request_id })
                        .await
                        .map_err(|e| format!("Failed to delete dangling request: {}", e))?;
                    log::info!("🧹 Dangling meal request {} removed", request_id.to_hex());
                }
            }
        }
    }

    Ok(resolved)
}

pub async fn requests_for(db: &MongoDB, email: &str) -> Result<Vec<Value>, String> {
    reconcile_requests(db, doc! { "email": email }).await
}

pub async fn all_requests(db: &MongoDB) -> Result<Vec<Value>, String> {
    reconcile_requests(db, doc! {}).await
}

pub async fn serve_request(db: &MongoDB, id: ObjectId) -> Result<u64, String> {
    let result = db
        .collection::<Document>(database::MEAL_REQUESTS)
        .update_one(
            doc! { "_id": id },
            doc! { "$set": { "status": STATUS_DELIVERED } },
        )
        .await
        .map_err(|e| format!("Failed to update request: {}", e))?;

    log::info!("✅ Request {} marked {}", id.to_hex(), STATUS_DELIVERED);
    Ok(result.modified_count)
}

pub async fn cancel_request(db: &MongoDB, id: ObjectId) -> Result<u64, String> {
    let result = db
        .collection::<Document>(database::MEAL_REQUESTS)
        .delete_one(doc! { "_id": id })
        .await
        .map_err(|e| format!("Failed to delete request: {}", e))?;

    Ok(result.deleted_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_request_fields_win() {
        let request_id = ObjectId::new();
        let meal = doc! {
            "_id": ObjectId::new(),
            "title": "Pasta",
            "price": 12.0,
            "email": "admin@site.com",
        };
        let request = doc! {
            "_id": request_id,
            "mealId": "abc",
            "email": "user@site.com",
            "status": STATUS_REQUESTED,
        };

        let merged = merge_request_with_meal(meal, request);

        // The request's identity and requester replace the meal's
        assert_eq!(merged.get_object_id("_id").unwrap(), request_id);
        assert_eq!(merged.get_str("email").unwrap(), "user@site.com");
        assert_eq!(merged.get_str("status").unwrap(), STATUS_REQUESTED);
        // Meal data is carried along
        assert_eq!(merged.get_str("title").unwrap(), "Pasta");
        assert_eq!(merged.get_f64("price").unwrap(), 12.0);
    }
}
