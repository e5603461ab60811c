use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One review per email, enforced by upsert on write.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, utoipa::ToSchema)]
pub struct Review {
    pub email: String,
    pub review: String,
}

/// Catalog document. Also the shape of the `upcomingMeals` staging collection.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Meal {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    // Admins can stage meals with only a few fields filled in, so every
    // field except the id tolerates being absent on read.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, rename = "postTime")]
    pub post_time: Option<String>,
    #[serde(default, rename = "distributorName")]
    pub distributor_name: Option<String>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default, rename = "likedBy")]
    pub liked_by: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Meal {
    pub fn liked_by_user(&self, email: &str) -> bool {
        self.liked_by.iter().any(|e| e == email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, from_document};

    #[test]
    fn test_sparse_document_deserializes() {
        // A staged meal created with only a category and a price must
        // still load for the like and review paths
        let doc = doc! { "category": "Lunch", "price": 12.0 };
        let meal: Meal = from_document(doc).unwrap();
        assert_eq!(meal.title, "");
        assert_eq!(meal.category, "Lunch");
        assert_eq!(meal.likes, 0);
        assert!(meal.liked_by.is_empty());
        assert!(meal.reviews.is_empty());
        assert!(!meal.liked_by_user("a@b.com"));
    }

    #[test]
    fn test_full_document_round_trip() {
        let doc = doc! {
            "title": "Pasta",
            "category": "Lunch",
            "price": 12.5,
            "likes": 3,
            "likedBy": ["a@b.com"],
            "reviews": [{ "email": "a@b.com", "review": "good" }],
        };
        let meal: Meal = from_document(doc).unwrap();
        assert_eq!(meal.likes, 3);
        assert!(meal.liked_by_user("a@b.com"));
        assert_eq!(meal.reviews[0].review, "good");
    }
}
