use futures::stream::StreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    database::{self, MongoDB},
    models::{Meal, Review},
    utils::{doc_to_json, page_params},
};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct MealListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub category: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<f64>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

/// Admin-supplied meal fields. Everything is optional; counters and
/// review state are initialized server-side on insert.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateMealRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(rename = "postTime", skip_serializing_if = "Option::is_none")]
    pub post_time: Option<String>,
    #[serde(rename = "distributorName", skip_serializing_if = "Option::is_none")]
    pub distributor_name: Option<String>,
    /// Distributing admin's email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MealListResponse {
    pub meals: Vec<Value>,
    #[serde(rename = "mealsCount")]
    pub meals_count: u64,
}

#[derive(Debug, PartialEq)]
pub enum LikeOutcome {
    Liked,
    AlreadyLiked,
    NotFound,
}

#[derive(Debug, PartialEq)]
pub enum ReviewOutcome {
    Updated,
    NotFound,
}

/// Category "All" matches everything; an absent bound leaves that side
/// of the price range open.
pub fn build_meal_match(
    category: Option<&str>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    search: Option<&str>,
) -> Document {
    let mut match_stage = doc! {};

    if let Some(category) = category {
        if category != "All" && !category.is_empty() {
            match_stage.insert("category", category);
        }
    }

    let mut price_filter = doc! {};
    if let Some(min) = min_price {
        price_filter.insert("$gte", min);
    }
    if let Some(max) = max_price {
        if max != 0.0 {
            price_filter.insert("$lte", max);
        }
    }
    if !price_filter.is_empty() {
        match_stage.insert("price", price_filter);
    }

    if let Some(term) = search {
        if !term.is_empty() {
            match_stage.insert("$text", doc! { "$search": term });
        }
    }

    match_stage
}

/// Recognized keys sort descending; anything else falls back to
/// document-insertion order.
pub fn build_meal_sort(sort: Option<&str>) -> Document {
    match sort {
        Some("likes") => doc! { "likes": -1 },
        Some("reviews") => doc! { "reviewsCount": -1 },
        _ => doc! { "_id": 1 },
    }
}

/// Replaces this email's review or appends a new one. Returns true when
/// an existing entry was replaced.
pub fn upsert_review(reviews: &mut Vec<Review>, email: &str, text: &str) -> bool {
    if let Some(existing) = reviews.iter_mut().find(|r| r.email == email) {
        existing.review = text.to_string();
        return true;
    }
    reviews.push(Review {
        email: email.to_string(),
        review: text.to_string(),
    });
    false
}

/// Removes this email's review. Returns true when an entry was removed.
pub fn remove_review(reviews: &mut Vec<Review>, email: &str) -> bool {
    let before = reviews.len();
    reviews.retain(|r| r.email != email);
    reviews.len() != before
}

fn aggregate_pipeline(match_stage: Document, sort: Document, offset: i64, limit: i64) -> Vec<Document> {
    vec![
        doc! { "$match": match_stage },
        // reviewsCount backs the "reviews" sort key
        doc! { "$addFields": { "reviewsCount": { "$size": { "$ifNull": ["$reviews", []] } } } },
        doc! { "$sort": sort },
        doc! { "$skip": offset },
        doc! { "$limit": limit },
    ]
}

pub async fn list_meals(db: &MongoDB, query: &MealListQuery) -> Result<MealListResponse, String> {
    let collection = db.collection::<Document>(database::MEALS);

    let match_stage = build_meal_match(
        query.category.as_deref(),
        query.min_price,
        query.max_price,
        query.search.as_deref(),
    );
    let sort = build_meal_sort(query.sort.as_deref());
    let (limit, offset) = page_params(query.limit, query.offset);

    let mut cursor = collection
        .aggregate(aggregate_pipeline(match_stage, sort, offset, limit))
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let mut meals = Vec::new();
    while let Some(result) = cursor.next().await {
        let doc = result.map_err(|e| format!("Cursor error: {}", e))?;
        meals.push(doc_to_json(doc));
    }

    let meals_count = collection
        .count_documents(doc! {})
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(MealListResponse { meals, meals_count })
}

/// Admin dashboard listing: whole catalog, sortable, no filters.
pub async fn admin_meals(
    db: &MongoDB,
    limit: i64,
    offset: i64,
    sort: Option<&str>,
) -> Result<MealListResponse, String> {
    let collection = db.collection::<Document>(database::MEALS);

    let mut cursor = collection
        .aggregate(aggregate_pipeline(doc! {}, build_meal_sort(sort), offset, limit))
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let mut meals = Vec::new();
    while let Some(result) = cursor.next().await {
        let doc = result.map_err(|e| format!("Cursor error: {}", e))?;
        meals.push(doc_to_json(doc));
    }

    let meals_count = collection
        .count_documents(doc! {})
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(MealListResponse { meals, meals_count })
}

pub async fn meals_by_category(db: &MongoDB, category: &str) -> Result<Vec<Value>, String> {
    let collection = db.collection::<Document>(database::MEALS);

    let filter = if category == "All" {
        doc! {}
    } else {
        doc! { "category": category }
    };

    let mut cursor = collection
        .find(filter)
        .limit(9)
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let mut meals = Vec::new();
    while let Some(result) = cursor.next().await {
        let doc = result.map_err(|e| format!("Cursor error: {}", e))?;
        meals.push(doc_to_json(doc));
    }

    Ok(meals)
}

pub async fn get_meal(db: &MongoDB, id: ObjectId) -> Result<Option<Value>, String> {
    let collection = db.collection::<Document>(database::MEALS);

    let meal = collection
        .find_one(doc! { "_id": id })
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    Ok(meal.map(doc_to_json))
}

pub async fn create_meal(db: &MongoDB, mut meal: Document) -> Result<String, String> {
    // Fresh catalog entries start without likes or reviews
    meal.remove("_id");
    meal.entry("likes".to_string()).or_insert(0_i64.into());
    meal.entry("likedBy".to_string())
        .or_insert(Vec::<mongodb::bson::Bson>::new().into());
    meal.entry("reviews".to_string())
        .or_insert(Vec::<mongodb::bson::Bson>::new().into());

    let result = db
        .collection::<Document>(database::MEALS)
        .insert_one(meal)
        .await
        .map_err(|e| format!("Failed to insert meal: {}", e))?;

    let id = result
        .inserted_id
        .as_object_id()
        .map(|oid| oid.to_hex())
        .unwrap_or_default();

    log::info!("✅ Meal created: {}", id);
    Ok(id)
}

pub async fn update_meal(db: &MongoDB, id: ObjectId, mut changes: Document) -> Result<u64, String> {
    changes.remove("_id");

    let result = db
        .collection::<Document>(database::MEALS)
        .update_one(doc! { "_id": id }, doc! { "$set": changes })
        .await
        .map_err(|e| format!("Failed to update meal: {}", e))?;

    Ok(result.modified_count)
}

pub async fn delete_meal(db: &MongoDB, id: ObjectId) -> Result<u64, String> {
    let result = db
        .collection::<Document>(database::MEALS)
        .delete_one(doc! { "_id": id })
        .await
        .map_err(|e| format!("Failed to delete meal: {}", e))?;

    log::info!("🗑️  Meal {} deleted ({} removed)", id.to_hex(), result.deleted_count);
    Ok(result.deleted_count)
}

/// At most one like per user per meal, enforced by a membership check
/// before the increment. The check and the update are separate round
/// trips, so two concurrent likes from the same user can both pass the
/// check; single-threaded behavior is correct.
pub async fn like_meal(db: &MongoDB, id: ObjectId, email: &str) -> Result<LikeOutcome, String> {
    let collection = db.collection::<Meal>(database::MEALS);

    let meal = collection
        .find_one(doc! { "_id": id })
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let meal = match meal {
        Some(meal) => meal,
        None => return Ok(LikeOutcome::NotFound),
    };

    if meal.liked_by_user(email) {
        return Ok(LikeOutcome::AlreadyLiked);
    }

    collection
        .update_one(
            doc! { "_id": id },
            doc! { "$inc": { "likes": 1 }, "$push": { "likedBy": email } },
        )
        .await
        .map_err(|e| format!("Failed to update likes: {}", e))?;

    log::info!("👍 Meal {} liked by {}", id.to_hex(), email);
    Ok(LikeOutcome::Liked)
}

pub async fn review_meal(
    db: &MongoDB,
    id: ObjectId,
    email: &str,
    text: &str,
) -> Result<ReviewOutcome, String> {
    let collection = db.collection::<Meal>(database::MEALS);

    let meal = collection
        .find_one(doc! { "_id": id })
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let mut meal = match meal {
        Some(meal) => meal,
        None => return Ok(ReviewOutcome::NotFound),
    };

    let replaced = upsert_review(&mut meal.reviews, email, text);

    let reviews = to_bson(&meal.reviews).map_err(|e| e.to_string())?;
    collection
        .update_one(doc! { "_id": id }, doc! { "$set": { "reviews": reviews } })
        .await
        .map_err(|e| format!("Failed to update reviews: {}", e))?;

    log::info!(
        "📝 Review {} for meal {} by {}",
        if replaced { "replaced" } else { "added" },
        id.to_hex(),
        email
    );
    Ok(ReviewOutcome::Updated)
}

pub async fn delete_review(
    db: &MongoDB,
    id: ObjectId,
    email: &str,
) -> Result<ReviewOutcome, String> {
    let collection = db.collection::<Meal>(database::MEALS);

    let meal = collection
        .find_one(doc! { "_id": id })
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let mut meal = match meal {
        Some(meal) => meal,
        None => return Ok(ReviewOutcome::NotFound),
    };

    remove_review(&mut meal.reviews, email);

    let reviews = to_bson(&meal.reviews).map_err(|e| e.to_string())?;
    collection
        .update_one(doc! { "_id": id }, doc! { "$set": { "reviews": reviews } })
        .await
        .map_err(|e| format!("Failed to update reviews: {}", e))?;

    Ok(ReviewOutcome::Updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_stage_with_all_filters() {
        let stage = build_meal_match(Some("Lunch"), Some(5.0), Some(20.0), Some("pasta"));
        assert_eq!(stage.get_str("category").unwrap(), "Lunch");
        let price = stage.get_document("price").unwrap();
        assert_eq!(price.get_f64("$gte").unwrap(), 5.0);
        assert_eq!(price.get_f64("$lte").unwrap(), 20.0);
        assert_eq!(
            stage.get_document("$text").unwrap().get_str("$search").unwrap(),
            "pasta"
        );
    }

    #[test]
    fn test_match_stage_category_all_matches_everything() {
        assert!(build_meal_match(Some("All"), None, None, None).is_empty());
        assert!(build_meal_match(None, None, None, None).is_empty());
    }

    #[test]
    fn test_match_stage_zero_max_price_leaves_range_open() {
        let stage = build_meal_match(None, Some(5.0), Some(0.0), None);
        let price = stage.get_document("price").unwrap();
        assert_eq!(price.get_f64("$gte").unwrap(), 5.0);
        assert!(price.get("$lte").is_none());
    }

    #[test]
    fn test_sort_keys() {
        assert_eq!(build_meal_sort(Some("likes")), doc! { "likes": -1 });
        assert_eq!(build_meal_sort(Some("reviews")), doc! { "reviewsCount": -1 });
        // Unknown or absent keys fall back to insertion order
        assert_eq!(build_meal_sort(Some("price")), doc! { "_id": 1 });
        assert_eq!(build_meal_sort(None), doc! { "_id": 1 });
    }

    #[test]
    fn test_upsert_review_appends_then_replaces() {
        let mut reviews = Vec::new();

        let replaced = upsert_review(&mut reviews, "a@b.com", "tasty");
        assert!(!replaced);
        assert_eq!(reviews.len(), 1);

        // Second submission from the same email replaces, not duplicates
        let replaced = upsert_review(&mut reviews, "a@b.com", "actually great");
        assert!(replaced);
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].review, "actually great");

        let replaced = upsert_review(&mut reviews, "c@d.com", "fine");
        assert!(!replaced);
        assert_eq!(reviews.len(), 2);
    }

    #[test]
    fn test_remove_review() {
        let mut reviews = vec![
            Review { email: "a@b.com".into(), review: "good".into() },
            Review { email: "c@d.com".into(), review: "bad".into() },
        ];
        assert!(remove_review(&mut reviews, "a@b.com"));
        assert_eq!(reviews.len(), 1);
        assert!(!remove_review(&mut reviews, "a@b.com"));
    }

    #[test]
    fn test_create_meal_request_skips_absent_fields() {
        let request = CreateMealRequest {
            title: None,
            category: Some("Lunch".into()),
            image: None,
            ingredients: None,
            description: None,
            price: Some(12.0),
            rating: None,
            post_time: None,
            distributor_name: None,
            email: None,
        };
        // Absent fields must not land in the stored document as nulls
        let doc = mongodb::bson::to_document(&request).unwrap();
        assert_eq!(doc.get_str("category").unwrap(), "Lunch");
        assert_eq!(doc.get_f64("price").unwrap(), 12.0);
        assert!(doc.get("title").is_none());
        assert!(doc.get("distributorName").is_none());
    }

    #[test]
    fn test_liked_by_user() {
        let meal = Meal {
            id: None,
            title: "Pasta".into(),
            category: "Lunch".into(),
            image: None,
            ingredients: None,
            description: None,
            price: 12.0,
            rating: None,
            post_time: None,
            distributor_name: None,
            likes: 1,
            liked_by: vec!["a@b.com".into()],
            reviews: vec![],
        };
        assert!(meal.liked_by_user("a@b.com"));
        assert!(!meal.liked_by_user("c@d.com"));
    }
}
