pub mod health;
pub mod jwt;
pub mod meals;
pub mod payments;
pub mod requests;
pub mod swagger;
pub mod upcoming;
pub mod users;
