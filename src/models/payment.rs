use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Payment log entry. Completing a payment overwrites the owning user's
/// badge with the value recorded here (last write wins).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Payment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub price: f64,
    pub badge: String,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<BsonDateTime>,
}
