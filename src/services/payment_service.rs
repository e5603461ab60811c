use futures::stream::StreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;

use crate::{
    database::{self, MongoDB},
    models::Payment,
    utils::doc_to_json,
};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
    pub status: String,
    pub amount: i64,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RecordPaymentRequest {
    pub price: f64,
    pub badge: String,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PaymentIntentResponse {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

#[derive(Debug, PartialEq)]
pub enum PaymentOutcome {
    Recorded,
    VerificationFailed(String),
}

fn get_stripe_secret() -> Result<String, String> {
    env::var("STRIPE_SK_KEY").map_err(|_| "STRIPE_SK_KEY not found in environment".to_string())
}

/// Client prices are already in Stripe's minor unit (cents); this only
/// normalizes them to the integer Stripe requires.
pub fn rounded_amount(price: f64) -> i64 {
    price.round() as i64
}

/// The processor's own record must show a completed charge for the
/// claimed amount before a badge is granted.
pub fn check_intent(intent: &StripePaymentIntent, price: f64) -> Result<(), String> {
    if intent.status != "succeeded" {
        return Err(format!(
            "payment intent {} has status '{}', expected 'succeeded'",
            intent.id, intent.status
        ));
    }
    if intent.amount != rounded_amount(price) {
        return Err(format!(
            "payment intent {} amount {} does not match reported price {}",
            intent.id, intent.amount, price
        ));
    }
    Ok(())
}

pub async fn create_payment_intent(price: f64) -> Result<PaymentIntentResponse, String> {
    let secret = get_stripe_secret()?;
    let amount = rounded_amount(price);

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/payment_intents", STRIPE_API_BASE))
        .bearer_auth(&secret)
        .form(&[
            ("amount", amount.to_string()),
            ("currency", "usd".to_string()),
            ("payment_method_types[]", "card".to_string()),
        ])
        .send()
        .await
        .map_err(|e| format!("Stripe request failed: {}", e))?;

    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("Stripe rejected payment intent: {}", body));
    }

    let intent: StripePaymentIntent = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse Stripe response: {}", e))?;

    log::info!("💳 Payment intent {} created for {} cents", intent.id, amount);

    let client_secret = intent
        .client_secret
        .ok_or_else(|| "Stripe response missing client_secret".to_string())?;

    Ok(PaymentIntentResponse { client_secret })
}

pub async fn retrieve_payment_intent(intent_id: &str) -> Result<StripePaymentIntent, String> {
    let secret = get_stripe_secret()?;

    let client = reqwest::Client::new();
    let response = client
        .get(format!("{}/payment_intents/{}", STRIPE_API_BASE, intent_id))
        .bearer_auth(&secret)
        .send()
        .await
        .map_err(|e| format!("Stripe request failed: {}", e))?;

    if !response.status().is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("Stripe lookup failed: {}", body));
    }

    response
        .json()
        .await
        .map_err(|e| format!("Failed to parse Stripe response: {}", e))
}

/// Verifies the payment against Stripe, then writes the log entry and
/// overwrites the user's badge. Badge is last-write-wins; the payment
/// log is the only history.
pub async fn record_payment(
    db: &MongoDB,
    email: &str,
    request: RecordPaymentRequest,
) -> Result<PaymentOutcome, String> {
    let intent = retrieve_payment_intent(&request.transaction_id).await?;

    if let Err(reason) = check_intent(&intent, request.price) {
        log::warn!("⚠️ Payment verification failed for {}: {}", email, reason);
        return Ok(PaymentOutcome::VerificationFailed(reason));
    }

    let payment = Payment {
        id: None,
        email: email.to_string(),
        price: request.price,
        badge: request.badge.clone(),
        transaction_id: request.transaction_id,
        date: Some(BsonDateTime::now()),
    };

    db.collection::<Payment>(database::PAYMENTS)
        .insert_one(payment)
        .await
        .map_err(|e| format!("Failed to insert payment: {}", e))?;

    db.collection::<Document>(database::USERS)
        .update_one(
            doc! { "email": email },
            doc! { "$set": { "badge": &request.badge } },
        )
        .await
        .map_err(|e| format!("Failed to update badge: {}", e))?;

    log::info!("✅ Payment recorded for {}, badge set to {}", email, request.badge);
    Ok(PaymentOutcome::Recorded)
}

pub async fn payment_history(db: &MongoDB, email: &str) -> Result<Vec<Value>, String> {
    let collection = db.collection::<Document>(database::PAYMENTS);

    let mut cursor = collection
        .find(doc! { "email": email })
        .await
        .map_err(|e| format!("Database error: {}", e))?;

    let mut payments = Vec::new();
    while let Some(result) = cursor.next().await {
        let doc = result.map_err(|e| format!("Cursor error: {}", e))?;
        payments.push(doc_to_json(doc));
    }

    Ok(payments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(status: &str, amount: i64) -> StripePaymentIntent {
        StripePaymentIntent {
            id: "pi_test".to_string(),
            client_secret: None,
            status: status.to_string(),
            amount,
        }
    }

    #[test]
    fn test_rounded_amount_normalizes_to_integer_cents() {
        assert_eq!(rounded_amount(1200.0), 1200);
        assert_eq!(rounded_amount(1200.4), 1200);
        assert_eq!(rounded_amount(1200.6), 1201);
    }

    #[test]
    fn test_check_intent_requires_succeeded() {
        assert!(check_intent(&intent("succeeded", 1200), 1200.0).is_ok());
        assert!(check_intent(&intent("requires_payment_method", 1200), 1200.0).is_err());
        assert!(check_intent(&intent("processing", 1200), 1200.0).is_err());
    }

    #[test]
    fn test_check_intent_requires_matching_amount() {
        assert!(check_intent(&intent("succeeded", 999), 1200.0).is_err());
    }
}
