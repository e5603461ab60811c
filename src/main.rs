mod api;
mod database;
mod middleware;
mod models;
mod services;
mod utils;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "5000".to_string());
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

    log::info!("🚀 Starting Meal Service...");

    // Serverless deployments skip the startup ping and connect lazily
    let eager_ping = app_env != "production";

    let db = database::MongoDB::new(&database_url, eager_ping)
        .await
        .expect("Failed to connect to MongoDB");

    let db_data = web::Data::new(db.clone());

    log::info!("✅ MongoDB connected successfully");
    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(db_data.clone())
            .wrap(middleware::AuthMiddleware)
            .wrap(cors)
            .wrap(Logger::default())
            // Swagger UI
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi))
            // Health / banner
            .route("/", web::get().to(api::health::root))
            .route("/health", web::get().to(api::health::health_check))
            // Token issuance
            .route("/jwt", web::post().to(api::jwt::create_token))
            // Users
            .service(
                web::resource("/users")
                    .route(web::post().to(api::users::create_user))
                    .route(web::get().to(api::users::list_users)),
            )
            .route("/users/suggestions", web::get().to(api::users::user_suggestions))
            .route("/users/profile", web::get().to(api::users::user_profile))
            .route("/users/reviews", web::get().to(api::users::my_reviews))
            .route("/users/admin", web::get().to(api::users::admin_status))
            .route("/users/admin/{email}", web::put().to(api::users::promote_admin))
            // Meals: literal paths before the {id} catch-alls
            .service(
                web::resource("/meals")
                    .route(web::get().to(api::meals::list_meals))
                    .route(web::post().to(api::meals::create_meal)),
            )
            .route("/meals/admin", web::get().to(api::meals::admin_meals))
            .service(
                web::resource("/meals/upcoming")
                    .route(web::get().to(api::upcoming::list_upcoming))
                    .route(web::post().to(api::upcoming::create_upcoming)),
            )
            .service(
                web::resource("/meals/request")
                    .route(web::get().to(api::requests::my_requests))
                    .route(web::post().to(api::requests::create_request)),
            )
            .route("/meals/request/{id}", web::delete().to(api::requests::cancel_request))
            .route("/meals/serve", web::get().to(api::requests::serve_list))
            .route("/meals/serve/{id}", web::put().to(api::requests::serve_request))
            .route("/meals/category/{category}", web::get().to(api::meals::meals_by_category))
            .route("/meals/upcoming/{id}/like", web::put().to(api::upcoming::like_upcoming))
            .route("/meals/upcoming/{id}/publish", web::put().to(api::upcoming::publish_upcoming))
            .service(
                web::resource("/meals/upcoming/{id}")
                    .route(web::get().to(api::upcoming::get_upcoming))
                    .route(web::delete().to(api::upcoming::delete_upcoming)),
            )
            .route("/meals/{id}/like", web::put().to(api::meals::like_meal))
            .service(
                web::resource("/meals/{id}/review")
                    .route(web::put().to(api::meals::review_meal))
                    .route(web::delete().to(api::meals::delete_review)),
            )
            .service(
                web::resource("/meals/{id}")
                    .route(web::get().to(api::meals::get_meal))
                    .route(web::put().to(api::meals::update_meal))
                    .route(web::delete().to(api::meals::delete_meal)),
            )
            // Payments
            .route(
                "/create-payment-intent",
                web::post().to(api::payments::create_payment_intent),
            )
            .route("/payments", web::post().to(api::payments::record_payment))
            .route("/payment/history", web::get().to(api::payments::payment_history))
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
