use mongodb::bson::doc;

use crate::{
    database::{self, MongoDB},
    models::User,
    utils::AppError,
};

pub async fn find_user(db: &MongoDB, email: &str) -> Result<Option<User>, AppError> {
    db.collection::<User>(database::USERS)
        .find_one(doc! { "email": email })
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))
}

/// Admin authorization: the stored role must be "admin".
///
/// A missing user record is rejected cleanly with 403 instead of being
/// treated as a lookup failure.
pub async fn require_admin(db: &MongoDB, email: &str) -> Result<User, AppError> {
    let user = find_user(db, email).await?;
    match user {
        Some(user) if user.is_admin() => Ok(user),
        _ => Err(AppError::Authorization("forbidden access".to_string())),
    }
}

/// Tier authorization: the lowest badge ("Bronze") cannot use the
/// request/like features on promotable content.
pub async fn require_paid(db: &MongoDB, email: &str) -> Result<User, AppError> {
    let user = find_user(db, email).await?;
    match user {
        Some(user) if user.is_paid() => Ok(user),
        _ => Err(AppError::PaymentRequired("payment required".to_string())),
    }
}
