use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const ROLE_ADMIN: &str = "admin";
pub const BADGE_BRONZE: &str = "Bronze";

/// Account document. Created on first sign-in (upsert-by-email), never deleted.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    /// "member" or "admin"
    #[serde(default)]
    pub role: Option<String>,
    /// Subscription tier: "Bronze", "Silver", "Gold", "Platinum"
    #[serde(default)]
    pub badge: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ROLE_ADMIN)
    }

    /// Paid tier means any badge above the default "Bronze".
    pub fn is_paid(&self) -> bool {
        self.badge.as_deref().unwrap_or(BADGE_BRONZE) != BADGE_BRONZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Option<&str>, badge: Option<&str>) -> User {
        User {
            id: None,
            email: "a@b.com".to_string(),
            username: Some("a".to_string()),
            role: role.map(String::from),
            badge: badge.map(String::from),
        }
    }

    #[test]
    fn test_admin_predicate() {
        assert!(user(Some("admin"), None).is_admin());
        assert!(!user(Some("member"), None).is_admin());
        assert!(!user(None, None).is_admin());
    }

    #[test]
    fn test_paid_predicate() {
        assert!(user(None, Some("Gold")).is_paid());
        assert!(user(None, Some("Silver")).is_paid());
        assert!(!user(None, Some("Bronze")).is_paid());
        // Missing badge counts as the free tier
        assert!(!user(None, None).is_paid());
    }
}
