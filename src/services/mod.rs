pub mod guard_service;
pub mod meal_service;
pub mod payment_service;
pub mod request_service;
pub mod token_service;
pub mod upcoming_service;
pub mod user_service;
