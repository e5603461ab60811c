use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::{
    database::MongoDB,
    services::{
        payment_service::{self, PaymentOutcome, RecordPaymentRequest},
        token_service::Claims,
    },
    utils::AppError,
};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct PaymentIntentRequest {
    pub price: f64,
}

/// POST /create-payment-intent - Opens a card payment with Stripe
#[utoipa::path(
    post,
    path = "/create-payment-intent",
    tag = "Payments",
    request_body = PaymentIntentRequest,
    responses(
        (status = 200, description = "Client secret for the payment flow",
         body = payment_service::PaymentIntentResponse)
    )
)]
pub async fn create_payment_intent(
    _user: web::ReqData<Claims>,
    body: web::Json<PaymentIntentRequest>,
) -> Result<HttpResponse, AppError> {
    match payment_service::create_payment_intent(body.price).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            log::error!("❌ Error creating payment intent: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// POST /payments - Records a completed payment after verifying it with
/// Stripe, then upgrades the caller's badge
#[utoipa::path(
    post,
    path = "/payments",
    tag = "Payments",
    request_body = RecordPaymentRequest,
    responses(
        (status = 200, description = "Payment recorded, badge updated"),
        (status = 400, description = "Stripe does not confirm this payment")
    )
)]
pub async fn record_payment(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
    body: web::Json<RecordPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    match payment_service::record_payment(&db, &user.sub, body.into_inner()).await {
        Ok(PaymentOutcome::Recorded) => {
            Ok(HttpResponse::Ok().json(serde_json::json!({ "success": true })))
        }
        Ok(PaymentOutcome::VerificationFailed(reason)) => {
            Ok(HttpResponse::BadRequest().json(serde_json::json!({ "message": reason })))
        }
        Err(e) => {
            log::error!("❌ Error recording payment: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}

/// GET /payment/history - The caller's payment log
pub async fn payment_history(
    user: web::ReqData<Claims>,
    db: web::Data<MongoDB>,
) -> Result<HttpResponse, AppError> {
    match payment_service::payment_history(&db, &user.sub).await {
        Ok(payments) => Ok(HttpResponse::Ok().json(payments)),
        Err(e) => {
            log::error!("❌ Error fetching payment history: {}", e);
            Ok(HttpResponse::InternalServerError().json(serde_json::json!({ "message": e })))
        }
    }
}
