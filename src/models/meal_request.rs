use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const STATUS_REQUESTED: &str = "Requested";
pub const STATUS_DELIVERED: &str = "Delivered";

/// A paid user's request for a meal. `meal_id` is a weak reference: the
/// target meal may have been deleted since, in which case the request is
/// removed lazily on the next listing.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MealRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(rename = "mealId")]
    pub meal_id: String,
    pub email: String,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_status() -> String {
    STATUS_REQUESTED.to_string()
}
