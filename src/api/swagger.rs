use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Meal Service API",
        version = "1.0.0",
        description = "Backend API for the meal subscription platform.\n\n**Authentication:** Most endpoints require a JWT bearer token (or a `token` cookie).\n\n**Features:**\n- Token issuance and role/badge gated access\n- Meal catalog with likes and reviews\n- Upcoming meal staging and promotion\n- Meal request and serving workflow\n- Stripe payment processing with badge upgrades",
    ),
    paths(
        // Health
        crate::api::health::health_check,

        // Auth
        crate::api::jwt::create_token,

        // Users
        crate::api::users::create_user,
        crate::api::users::list_users,

        // Meals
        crate::api::meals::list_meals,
        crate::api::meals::get_meal,
        crate::api::meals::create_meal,
        crate::api::meals::like_meal,
        crate::api::meals::review_meal,

        // Upcoming meals
        crate::api::upcoming::like_upcoming,
        crate::api::upcoming::publish_upcoming,

        // Requests
        crate::api::requests::create_request,
        crate::api::requests::my_requests,
        crate::api::requests::serve_request,

        // Payments
        crate::api::payments::create_payment_intent,
        crate::api::payments::record_payment,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::api::jwt::TokenRequest,
            crate::api::jwt::TokenResponse,
            crate::api::meals::ReviewRequest,
            crate::services::meal_service::CreateMealRequest,
            crate::services::user_service::RegisterUserRequest,
            crate::api::requests::CreateRequestBody,
            crate::api::payments::PaymentIntentRequest,
            crate::services::payment_service::RecordPaymentRequest,
            crate::services::payment_service::PaymentIntentResponse,
            crate::models::Review,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service status."),
        (name = "Auth", description = "Token issuance. Tokens assert an email identity and carry no expiry."),
        (name = "Users", description = "Registration, role and badge management."),
        (name = "Meals", description = "Catalog browsing, likes and reviews."),
        (name = "Upcoming", description = "Staged meals and their promotion into the catalog."),
        (name = "Requests", description = "Meal request and serving workflow for paid users."),
        (name = "Payments", description = "Stripe payment intents and the payment log."),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
