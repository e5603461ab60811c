use futures::stream::StreamExt;
use mongodb::bson::{doc, Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    database::{self, MongoDB},
    models::ROLE_ADMIN,
    utils::doc_to_json,
};

/// First-sign-in payload. The auth provider always has an email; the
/// rest is filled in when known.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RegisterUserRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<Value>,
    #[serde(rename = "usersCount")]
    pub users_count: u64,
}

pub fn build_user_match(search: Option<&str>) -> Document {
    match search {
        Some(term) if !term.is_empty() => doc! { "$text": { "$search": term } },
        _ => doc! {},
    }
}

pub fn build_user_sort(searching: bool) -> Document {
    if searching {
        doc! { "score": { "$meta": "textScore" } }
    } else {
        doc! { "_id": 1 }
    }
}

/// Keeps only this email's entry in the meal's review array, so the
/// caller sees exactly their own review per meal.
pub fn narrow_reviews(mut meal: Document, email: &str) -> Document {
    let own_review = meal
        .get_array("reviews")
        .ok()
        .and_then(|reviews| {
            reviews.iter().find(|r| {
                r.as_document()
                    .and_then(|d| d.get_str("email").ok())
                    .map(|e| e == email)
                    .unwrap_or(false)
            })
        })
        .cloned();

    match own_review {
        Some(review) => meal.insert("reviews", review),
        None => meal.insert("reviews", Bson::Null),
    };
    meal
}

/// Idempotent registration: inserting an email that already exists is a no-op.
pub async fn register_user(db: &MongoDB, user: Document) -> Result<(), String> {
    let email = user
        .get_str("email")
        .map_err(|_| "email is required".to_string())?
        .to_string();

    let collection = db.collection::<Document>(database::USERS);

    let existing = collection
        .find_one(doc! { "email": &email })
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    if existing.is_some() {
        log::info!("ℹ️  User {} already registered, skipping insert", email);
        return Ok(());
    }

    collection
        .insert_one(user)
        .await
        .map_err(|e| format!("Failed to insert user: {}", e))?;

    log::info!("✅ User {} registered", email);
    Ok(())
}

pub async fn list_users(
    db: &MongoDB,
    limit: i64,
    offset: i64,
    search: Option<&str>,
) -> Result<UserListResponse, String> {
    let collection = db.collection::<Document>(database::USERS);

    let match_stage = build_user_match(search);
    let searching = !match_stage.is_empty();

    let pipeline = vec![
        doc! { "$match": match_stage.clone() },
        doc! { "$sort": build_user_sort(searching) },
        doc! { "$skip": offset },
        doc! { "$limit": limit },
    ];

    let mut cursor = collection
        .aggregate(pipeline)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let mut users = Vec::new();
    while let Some(result) = cursor.next().await {
        let doc = result.map_err(|e| format!("Cursor error: {}", e))?;
        users.push(doc_to_json(doc));
    }

    let users_count = collection
        .count_documents(match_stage)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(UserListResponse { users, users_count })
}

/// Case-insensitive prefix-style lookup over username and email, capped at 10.
pub async fn user_suggestions(db: &MongoDB, query: &str) -> Result<Vec<Value>, String> {
    let collection = db.collection::<Document>(database::USERS);

    let filter = doc! {
        "$or": [
            { "username": { "$regex": query, "$options": "i" } },
            { "email": { "$regex": query, "$options": "i" } },
        ]
    };

    let mut cursor = collection
        .find(filter)
        .limit(10)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let mut suggestions = Vec::new();
    while let Some(result) = cursor.next().await {
        let doc = result.map_err(|e| format!("Cursor error: {}", e))?;
        suggestions.push(doc_to_json(doc));
    }

    Ok(suggestions)
}

/// The caller's own record plus a count of meals they distributed.
pub async fn user_profile(db: &MongoDB, email: &str) -> Result<Value, String> {
    let users = db.collection::<Document>(database::USERS);

    let mut profile = users
        .find_one(doc! { "email": email })
        .await
        .map_err(|e| format!("Database error: {}", e))?
        .unwrap_or_default();

    let meal_count = db
        .collection::<Document>(database::MEALS)
        .count_documents(doc! { "email": email })
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    profile.insert("mealCount", meal_count as i64);
    Ok(doc_to_json(profile))
}

pub async fn is_admin(db: &MongoDB, email: &str) -> Result<bool, String> {
    let user = db
        .collection::<crate::models::User>(database::USERS)
        .find_one(doc! { "email": email })
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(user.map(|u| u.is_admin()).unwrap_or(false))
}

/// Meals this email has reviewed, each narrowed to that single review.
pub async fn user_reviews(db: &MongoDB, email: &str) -> Result<Vec<Value>, String> {
    let collection = db.collection::<Document>(database::MEALS);

    let filter = doc! {
        "reviews": { "$elemMatch": { "email": email } }
    };

    let mut cursor = collection
        .find(filter)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let mut meals = Vec::new();
    while let Some(result) = cursor.next().await {
        let doc = result.map_err(|e| format!("Cursor error: {}", e))?;
        meals.push(doc_to_json(narrow_reviews(doc, email)));
    }

    Ok(meals)
}

pub async fn promote_to_admin(db: &MongoDB, email: &str) -> Result<u64, String> {
    let collection = db.collection::<Document>(database::USERS);

    let result = collection
        .update_one(
            doc! { "email": email },
            doc! { "$set": { "role": ROLE_ADMIN } },
        )
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    log::info!("✅ User {} promoted to admin", email);
    Ok(result.modified_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_match_with_and_without_search() {
        assert_eq!(build_user_match(None), doc! {});
        assert_eq!(build_user_match(Some("")), doc! {});
        assert_eq!(
            build_user_match(Some("alice")),
            doc! { "$text": { "$search": "alice" } }
        );
    }

    #[test]
    fn test_user_sort_defaults_to_insertion_order() {
        assert_eq!(build_user_sort(false), doc! { "_id": 1 });
        assert_eq!(
            build_user_sort(true),
            doc! { "score": { "$meta": "textScore" } }
        );
    }

    #[test]
    fn test_narrow_reviews_keeps_only_own_entry() {
        let meal = doc! {
            "title": "Pasta",
            "reviews": [
                { "email": "a@b.com", "review": "good" },
                { "email": "c@d.com", "review": "bad" },
            ]
        };
        let narrowed = narrow_reviews(meal, "c@d.com");
        let review = narrowed.get_document("reviews").unwrap();
        assert_eq!(review.get_str("email").unwrap(), "c@d.com");
        assert_eq!(review.get_str("review").unwrap(), "bad");
    }

    #[test]
    fn test_narrow_reviews_without_matching_entry() {
        let meal = doc! {
            "title": "Pasta",
            "reviews": [ { "email": "a@b.com", "review": "good" } ]
        };
        let narrowed = narrow_reviews(meal, "x@y.com");
        assert_eq!(narrowed.get("reviews"), Some(&Bson::Null));
    }
}
